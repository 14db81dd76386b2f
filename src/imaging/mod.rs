//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (JPEG, PNG, BMP, TIFF, WebP) |
//! | **Crop planning** | pure integer geometry in [`calculations`] |
//! | **Resize** | `DynamicImage::resize_exact` |
//! | **Encode** | `image` encoders, same format as the source |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop geometry (unit testable)
//! - **Parameters**: Resize filter and encode quality
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
pub mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{CropRegion, DegenerateCrop, plan_crop};
pub use params::{Quality, ResampleFilter};
pub use rust_backend::RustBackend;
