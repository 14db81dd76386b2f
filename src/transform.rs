//! Single-image face-centered crop.
//!
//! [`FaceCropper::transform`] runs one source file through the pipeline:
//!
//! ```text
//! exists? → supported extension? → decode → detect faces → plan crop → crop → resize
//! ```
//!
//! Every step that can fail returns a [`TransformError`] for that image only.
//! Finding no face is not a failure: the crop falls back to the image center.
//! The result is an in-memory image; writing it is the caller's job.

use crate::detect::FaceLocator;
use crate::formats;
use crate::imaging::calculations::{DegenerateCrop, choose_center, plan_crop};
use crate::imaging::{BackendError, ImageBackend};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a single image could not be cropped or written.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Could not read {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("Empty crop for {path}: {source}")]
    DegenerateCrop {
        path: PathBuf,
        #[source]
        source: DegenerateCrop,
    },
    #[error("Could not save {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Crops images around the first detected face.
///
/// Holds borrowed capabilities only, so one cropper can be shared by every
/// worker of a batch.
pub struct FaceCropper<'a, B: ImageBackend> {
    backend: &'a B,
    locator: &'a dyn FaceLocator,
}

impl<'a, B: ImageBackend> FaceCropper<'a, B> {
    pub fn new(backend: &'a B, locator: &'a dyn FaceLocator) -> Self {
        Self { backend, locator }
    }

    pub fn backend(&self) -> &B {
        self.backend
    }

    /// Crop `source` to a square around its first face and scale it to
    /// exactly `size × size`.
    pub fn transform(&self, source: &Path, size: u32) -> Result<DynamicImage, TransformError> {
        if !source.is_file() {
            return Err(TransformError::NotFound(source.to_path_buf()));
        }
        if !formats::is_supported(source) {
            return Err(TransformError::UnsupportedFormat(source.to_path_buf()));
        }

        let image = self
            .backend
            .decode(source)
            .map_err(|source_err| TransformError::Decode {
                path: source.to_path_buf(),
                source: source_err,
            })?;
        let (width, height) = (image.width(), image.height());

        // The detector expects RGB; the decoded image keeps its own layout
        // for cropping and encoding.
        let faces = self.locator.detect(&image.to_rgb8());
        let name = display_name(source);
        if faces.is_empty() {
            warn!(image = %name, "No faces found, using center crop");
        } else {
            info!(image = %name, faces = faces.len(), "Found face(s)");
        }

        let center = choose_center(width, height, &faces);
        let region =
            plan_crop(width, height, center, size).map_err(|e| TransformError::DegenerateCrop {
                path: source.to_path_buf(),
                source: e,
            })?;
        debug!(
            image = %name,
            left = region.left,
            top = region.top,
            right = region.right,
            bottom = region.bottom,
            "Planned crop"
        );

        let cropped = image.crop_imm(region.left, region.top, region.width(), region.height());
        Ok(self.backend.resize(&cropped, size, size))
    }
}
