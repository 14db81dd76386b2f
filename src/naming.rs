//! Output file naming.
//!
//! Every output keeps its source's stem and extension with `.out` inserted
//! between them:
//!
//! - `portrait.jpg` → `portrait.out.jpg`
//! - `IMG_0042.PNG` → `IMG_0042.out.PNG` (case preserved)
//! - `scan.v2.tiff` → `scan.v2.out.tiff`
//!
//! Outputs land in a flat directory, so two sources with the same file name
//! from different runs overwrite each other.

use std::path::{Path, PathBuf};

/// Output file name for `source`, or `None` when it has no file name.
pub fn output_file_name(source: &Path) -> Option<String> {
    let stem = source.file_stem()?.to_string_lossy();
    Some(match source.extension() {
        Some(ext) => format!("{}.out.{}", stem, ext.to_string_lossy()),
        None => format!("{}.out", stem),
    })
}

/// Full output path for `source` inside `output_dir`.
pub fn output_path(source: &Path, output_dir: &Path) -> Option<PathBuf> {
    output_file_name(source).map(|name| output_dir.join(name))
}
