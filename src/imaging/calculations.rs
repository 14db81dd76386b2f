//! Pure crop geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! The crop window is `size` pixels wide, centered on a point, and clamped to
//! the image independently on each edge:
//!
//! ```text
//! h      = size / 2            (truncating)
//! left   = max(cx - h, 0)      right  = min(cx + h, width)
//! top    = max(cy - h, 0)      bottom = min(cy + h, height)
//! ```
//!
//! The clamp is asymmetric. A window that runs past the left edge loses
//! those columns; it is not shifted right to keep its full width. Crops near
//! a border are therefore smaller than `size` and get stretched to
//! `size × size` by the resize step.

use crate::detect::BoundingBox;
use thiserror::Error;

/// Rectangular region of the source image, `left..right` × `top..bottom`.
///
/// Always non-empty and inside `[0, width] × [0, height]` of the image it
/// was planned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropRegion {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

/// The clamped window has no area.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("empty crop region ({left}, {top}) -> ({right}, {bottom})")]
pub struct DegenerateCrop {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

/// Integer midpoint of a face box, rounded toward negative infinity.
pub fn face_center(face: &BoundingBox) -> (i64, i64) {
    let x = (face.left as i64 + face.right as i64).div_euclid(2);
    let y = (face.top as i64 + face.bottom as i64).div_euclid(2);
    (x, y)
}

/// Geometric midpoint of an image.
pub fn image_center(width: u32, height: u32) -> (i64, i64) {
    (width as i64 / 2, height as i64 / 2)
}

/// Crop center for an image: the first face if any, else the image midpoint.
pub fn choose_center(width: u32, height: u32, faces: &[BoundingBox]) -> (i64, i64) {
    faces
        .first()
        .map(face_center)
        .unwrap_or_else(|| image_center(width, height))
}

/// Plan a `size`-wide window around `center`, clamped to the image.
///
/// # Errors
/// [`DegenerateCrop`] when the clamped window is empty, which happens for
/// zero-sized images, `size < 2`, or a center far outside the image.
pub fn plan_crop(
    width: u32,
    height: u32,
    center: (i64, i64),
    size: u32,
) -> Result<CropRegion, DegenerateCrop> {
    let (cx, cy) = center;
    let half = (size / 2) as i64;

    let left = (cx - half).max(0);
    let top = (cy - half).max(0);
    let right = (cx + half).min(width as i64);
    let bottom = (cy + half).min(height as i64);

    if right <= left || bottom <= top {
        return Err(DegenerateCrop {
            left,
            top,
            right,
            bottom,
        });
    }

    // Bounds checked above: 0 <= left < right <= width, same for y.
    Ok(CropRegion {
        left: left as u32,
        top: top as u32,
        right: right as u32,
        bottom: bottom as u32,
    })
}
