//! Supported raster formats.
//!
//! A file is a candidate for cropping when its extension appears in
//! [`SUPPORTED_FORMATS`], compared case-insensitively. The check is a pure
//! string predicate: no I/O, no content sniffing. Anything else, including a
//! missing extension, is simply not supported.
//!
//! The same table maps each extension to the `image` crate format used to
//! encode the output, so `photo.tif` is written back as TIFF and never
//! converted.

use image::ImageFormat;
use std::path::Path;

/// Extensions accepted for input, with the codec each one is written back as.
const FORMAT_TABLE: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("bmp", ImageFormat::Bmp),
    ("webp", ImageFormat::WebP),
    ("tiff", ImageFormat::Tiff),
    ("tif", ImageFormat::Tiff),
];

/// Lowercase extensions (without the dot) that [`is_supported`] accepts.
pub const SUPPORTED_FORMATS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp", "tiff", "tif"];

/// Returns `true` when `path` has a supported image extension.
pub fn is_supported(path: &Path) -> bool {
    format_for_path(path).is_some()
}

/// Codec for `path`, resolved from its extension.
pub fn format_for_path(path: &Path) -> Option<ImageFormat> {
    let ext = path.extension()?.to_str()?;
    FORMAT_TABLE
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(ext))
        .map(|(_, format)| *format)
}
