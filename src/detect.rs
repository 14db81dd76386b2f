//! Face detection.
//!
//! The detector is an oracle behind the [`FaceLocator`] trait: it receives an
//! RGB image and returns zero or more boxes in its own order. Callers use only
//! the first box. No ranking by size or score is applied, so when the oracle's
//! ordering varies between runs the chosen face can vary too.
//!
//! Two implementations ship with the crate:
//!
//! | Locator | Behavior |
//! |---|---|
//! | [`NoFaceLocator`] | Never finds a face; every crop falls back to the image center |
//! | [`SeetaFaceLocator`] | SeetaFace frontal cascade via `rustface`, loaded from a model file |

use image::RgbImage;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Failed to load face model {path}: {reason}")]
    Model { path: PathBuf, reason: String },
    #[error("Face model path is not valid UTF-8: {0}")]
    ModelPath(PathBuf),
}

/// Face bounding box in pixel coordinates of the detected image.
///
/// Coordinates are signed: a detector may report a box that pokes past the
/// top or left edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingBox {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Capability to find faces in an RGB image.
///
/// Shared by every worker of a batch, hence `Sync`.
pub trait FaceLocator: Send + Sync {
    fn detect(&self, image: &RgbImage) -> Vec<BoundingBox>;
}

/// Locator used when no detection model is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFaceLocator;

impl FaceLocator for NoFaceLocator {
    fn detect(&self, _image: &RgbImage) -> Vec<BoundingBox> {
        Vec::new()
    }
}

/// Tuning knobs for the SeetaFace cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeetaSettings {
    pub min_face_size: u32,
    pub score_threshold: f64,
}

impl Default for SeetaSettings {
    fn default() -> Self {
        Self {
            min_face_size: 40,
            score_threshold: 2.0,
        }
    }
}

/// SeetaFace frontal detector backed by `rustface`.
///
/// `rustface` detectors need `&mut self` to run and are not shared across
/// threads, so each worker thread builds its own from the model file on first
/// use and keeps it for later images.
pub struct SeetaFaceLocator {
    id: u64,
    model_path: String,
    settings: SeetaSettings,
}

static NEXT_LOCATOR_ID: AtomicU64 = AtomicU64::new(0);

struct ThreadDetector {
    owner: u64,
    detector: Box<dyn rustface::Detector>,
}

thread_local! {
    static THREAD_DETECTOR: RefCell<Option<ThreadDetector>> = const { RefCell::new(None) };
}

impl SeetaFaceLocator {
    /// Load the model once to validate it. The detector built here is kept
    /// for the calling thread.
    pub fn load(model_path: &Path, settings: SeetaSettings) -> Result<Self, DetectError> {
        let model_path = model_path
            .to_str()
            .ok_or_else(|| DetectError::ModelPath(model_path.to_path_buf()))?
            .to_string();
        let detector = build_detector(&model_path, settings)?;
        let id = NEXT_LOCATOR_ID.fetch_add(1, Ordering::Relaxed);
        THREAD_DETECTOR.with(|slot| {
            *slot.borrow_mut() = Some(ThreadDetector {
                owner: id,
                detector,
            });
        });
        Ok(Self {
            id,
            model_path,
            settings,
        })
    }
}

fn build_detector(
    model_path: &str,
    settings: SeetaSettings,
) -> Result<Box<dyn rustface::Detector>, DetectError> {
    let mut detector =
        rustface::create_detector(model_path).map_err(|e| DetectError::Model {
            path: PathBuf::from(model_path),
            reason: e.to_string(),
        })?;
    detector.set_min_face_size(settings.min_face_size);
    detector.set_score_thresh(settings.score_threshold);
    detector.set_pyramid_scale_factor(0.8);
    detector.set_slide_window_step(4, 4);
    Ok(detector)
}

fn run_detector(detector: &mut dyn rustface::Detector, image: &RgbImage) -> Vec<BoundingBox> {
    // The cascade works on 8-bit luma.
    let gray = image::imageops::grayscale(image);
    let data = rustface::ImageData::new(gray.as_raw(), gray.width(), gray.height());
    detector
        .detect(&data)
        .iter()
        .map(|face| {
            let rect = face.bbox();
            BoundingBox::new(
                rect.x(),
                rect.y(),
                rect.x() + rect.width() as i32,
                rect.y() + rect.height() as i32,
            )
        })
        .collect()
}

impl FaceLocator for SeetaFaceLocator {
    fn detect(&self, image: &RgbImage) -> Vec<BoundingBox> {
        THREAD_DETECTOR.with(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.as_ref().map(|t| t.owner) != Some(self.id) {
                match build_detector(&self.model_path, self.settings) {
                    Ok(detector) => {
                        *slot = Some(ThreadDetector {
                            owner: self.id,
                            detector,
                        })
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "could not create face detector");
                        return Vec::new();
                    }
                }
            }
            match slot.as_mut() {
                Some(t) => run_detector(t.detector.as_mut(), image),
                None => Vec::new(),
            }
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Locator that returns a fixed list of boxes and counts calls.
    /// Uses Mutex (not Cell) so it is Sync and works from rayon workers.
    #[derive(Default)]
    pub struct StubLocator {
        pub boxes: Vec<BoundingBox>,
        pub calls: Mutex<Vec<(u32, u32)>>,
    }

    impl StubLocator {
        pub fn with_boxes(boxes: Vec<BoundingBox>) -> Self {
            Self {
                boxes,
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Dimensions of every image the stub was asked about.
        pub fn seen(&self) -> Vec<(u32, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl FaceLocator for StubLocator {
        fn detect(&self, image: &RgbImage) -> Vec<BoundingBox> {
            self.calls
                .lock()
                .unwrap()
                .push((image.width(), image.height()));
            self.boxes.clone()
        }
    }

    #[test]
    fn no_face_locator_finds_nothing() {
        let image = RgbImage::new(64, 48);
        assert!(NoFaceLocator.detect(&image).is_empty());
    }

    #[test]
    fn stub_returns_boxes_in_given_order() {
        let stub = StubLocator::with_boxes(vec![
            BoundingBox::new(10, 10, 20, 20),
            BoundingBox::new(0, 0, 50, 50),
        ]);
        let found = stub.detect(&RgbImage::new(100, 80));
        assert_eq!(found[0], BoundingBox::new(10, 10, 20, 20));
        assert_eq!(stub.seen(), vec![(100, 80)]);
    }

    #[test]
    fn seeta_load_missing_model_is_error() {
        let result = SeetaFaceLocator::load(
            Path::new("/nonexistent/seeta_fd_frontal_v1.0.bin"),
            SeetaSettings::default(),
        );
        assert!(matches!(result, Err(DetectError::Model { .. })));
    }

    #[test]
    fn seeta_default_settings() {
        let settings = SeetaSettings::default();
        assert_eq!(settings.min_face_size, 40);
        assert_eq!(settings.score_threshold, 2.0);
    }
}
