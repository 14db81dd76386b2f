//! Pure Rust codec backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, BMP, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Resize | `DynamicImage::resize_exact` with the configured [`ResampleFilter`] |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the configured [`Quality`] |
//! | Encode → everything else | `DynamicImage::save_with_format` |
//!
//! The output codec always matches the source extension, so no format
//! conversion takes place. When a codec cannot store the decoded color type
//! (JPEG has no alpha, the WebP and BMP encoders are 8-bit only), the image
//! is narrowed to the closest layout the encoder accepts, keeping RGB order.

use super::backend::{BackendError, ImageBackend};
use super::params::{Quality, ResampleFilter};
use crate::formats;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::borrow::Cow;
use std::path::Path;

/// Codec backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend {
    filter: ResampleFilter,
    quality: Quality,
}

impl RustBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: ResampleFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }
}

/// Narrow `image` to a color type the target encoder accepts.
fn encodable(image: &DynamicImage, format: ImageFormat) -> Cow<'_, DynamicImage> {
    match format {
        ImageFormat::Jpeg => match image {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => Cow::Borrowed(image),
            other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
        },
        ImageFormat::WebP | ImageFormat::Bmp => match image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => Cow::Borrowed(image),
            other if other.color().has_alpha() => {
                Cow::Owned(DynamicImage::ImageRgba8(other.to_rgba8()))
            }
            other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
        },
        _ => Cow::Borrowed(image),
    }
}

fn save_jpeg(image: &DynamicImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality.value() as u8);
    image
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {}", e)))
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| BackendError::Decode(format!("{}: {}", path.display(), e)))
    }

    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        image.resize_exact(width, height, self.filter.into())
    }

    fn save(&self, image: &DynamicImage, path: &Path) -> Result<(), BackendError> {
        let format = formats::format_for_path(path).ok_or_else(|| {
            BackendError::UnsupportedFormat(
                path.extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            )
        })?;
        let prepared = encodable(image, format);

        match format {
            ImageFormat::Jpeg => save_jpeg(&prepared, path, self.quality),
            other => prepared.save_with_format(path, other).map_err(|e| match e {
                image::ImageError::IoError(io) => BackendError::Io(io),
                e => BackendError::Encode(e.to_string()),
            }),
        }
    }
}
