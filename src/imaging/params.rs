//! Parameter types for codec operations.
//!
//! These describe *how* pixels are resampled and encoded, independent of
//! which backend does the work:
//!
//! - [`Quality`]: lossy encoding quality (1–100, default 95). Clamped on construction.
//! - [`ResampleFilter`]: interpolation kernel used to scale the crop to the target size.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
///
/// Only JPEG output uses it; the other supported formats are lossless here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Interpolation kernel for the final resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    /// Bilinear.
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_95() {
        assert_eq!(Quality::default().value(), 95);
    }

    #[test]
    fn filter_default_is_bilinear() {
        assert_eq!(FilterType::from(ResampleFilter::default()), FilterType::Triangle);
    }

    #[test]
    fn filter_names_are_kebab_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            filter: ResampleFilter,
        }
        let parsed: Wrapper = toml::from_str(r#"filter = "catmull-rom""#).unwrap();
        assert_eq!(parsed.filter, ResampleFilter::CatmullRom);
        let parsed: Wrapper = toml::from_str(r#"filter = "lanczos3""#).unwrap();
        assert_eq!(parsed.filter, ResampleFilter::Lanczos3);
    }
}
