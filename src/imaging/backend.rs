//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three codec operations the crop
//! pipeline needs: decode, resize, and save.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use a recording mock so orchestration logic can be exercised
//! without encoding real files.

use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// Trait for image codec backends.
///
/// Decoded images keep the color type of the source file. Implementations
/// must write an image back in that same channel layout; only the face
/// detector sees an RGB conversion.
pub trait ImageBackend: Sync {
    /// Read and decode an image file.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Scale to exactly `width × height`, ignoring aspect ratio.
    fn resize(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage;

    /// Encode and write, choosing the codec from the path's extension.
    fn save(&self, image: &DynamicImage, path: &Path) -> Result<(), BackendError>;
}
