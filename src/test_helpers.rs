//! Shared test utilities for the facecrop test suite.
//!
//! Small writers for real image files plus a fixture-directory builder for
//! batch tests that run against the mock backend.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let photos = sample_dir(tmp.path(), &["a.png", "b.jpg", "notes.txt"]);
//! write_png(&photos.join("c.png"), 400, 300);
//! ```

use image::{ImageBuffer, Rgb, RgbImage, Rgba};
use std::path::{Path, PathBuf};

// =========================================================================
// Image writers
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// Write an RGB gradient PNG.
pub fn write_png(path: &Path, width: u32, height: u32) {
    gradient(width, height).save(path).unwrap();
}

/// Write an RGB gradient JPEG.
pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    gradient(width, height).save(path).unwrap();
}

/// Write a half-transparent RGBA PNG.
pub fn write_rgba_png(path: &Path, width: u32, height: u32) {
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_fn(width, height, |x, _| Rgba([40, 80, 160, (x % 256) as u8]));
    img.save(path).unwrap();
}

/// Create an empty file.
pub fn touch(path: &Path) {
    std::fs::write(path, b"").unwrap();
}

// =========================================================================
// Fixture setup
// =========================================================================

/// Create `root/photos/` holding one empty file per name and return it.
///
/// Contents are empty, so only the mock backend can "decode" them.
pub fn sample_dir(root: &Path, names: &[&str]) -> PathBuf {
    let dir = root.join("photos");
    std::fs::create_dir_all(&dir).unwrap();
    for name in names {
        touch(&dir.join(name));
    }
    dir
}
