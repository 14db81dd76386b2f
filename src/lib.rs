//! # facecrop
//!
//! Batch face-centered square cropping. Point it at an image or a directory
//! of images; every image is cropped to a square around the first detected
//! face (or its center, when no face is found), scaled to an exact
//! `size × size`, and written next to the input as `<stem>.out.<ext>`.
//!
//! # Pipeline
//!
//! ```text
//! input path ─► enumerate ─► [ decode ─► detect ─► plan crop ─► crop ─► resize ─► save ] × N ─► summary
//!                 formats              detect    calculations            backend
//! ```
//!
//! The bracketed part runs once per image, in parallel across a worker pool.
//! Each image is isolated: a corrupt file, a failed write, or even a panic is
//! recorded as one failed outcome and the rest of the batch carries on.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`formats`] | Extension allow-list (`jpg jpeg png bmp webp tiff tif`, case-insensitive) |
//! | [`detect`] | [`FaceLocator`](detect::FaceLocator) capability, no-op and SeetaFace implementations |
//! | [`imaging`] | Crop geometry, the [`ImageBackend`](imaging::ImageBackend) codec trait and its `image`-crate implementation |
//! | [`transform`] | Single-image pipeline: [`FaceCropper`](transform::FaceCropper) |
//! | [`naming`] | `<stem>.out.<ext>` output names |
//! | [`batch`] | Enumeration, worker pool, error isolation, summary |
//! | [`config`] | `facecrop.toml` loading, validation, stock config |
//! | [`output`] | CLI output formatting for progress events |
//!
//! # Design Decisions
//!
//! ## Capabilities Are Injected
//!
//! Neither the detector nor the codec is global state. A
//! [`FaceCropper`](transform::FaceCropper) borrows one of each at
//! construction and shares them with every worker. Tests swap in a recording
//! `MockBackend` and a fixed-box `StubLocator`, so orchestration logic is
//! covered without real models or encoders.
//!
//! ## Pure Geometry
//!
//! Crop planning is a pure integer function of image size, face box, and
//! target size. The window is `size` wide around the face center, clamped to
//! the image independently on each side, so a face near an edge yields a
//! smaller, possibly non-square crop that the resize step stretches to the
//! exact target.
//!
//! ## Value-In, Value-Out Tasks
//!
//! Workers receive an owned [`ImageTask`](batch::ImageTask) and return an
//! owned [`TransformOutcome`](batch::TransformOutcome). Nothing mutable is
//! shared between tasks; the summary is derived from the collected outcomes
//! after the pool drains.

pub mod batch;
pub mod config;
pub mod detect;
pub mod formats;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_helpers;
