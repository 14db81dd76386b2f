//! Configuration module.
//!
//! Handles loading and validating `facecrop.toml`. Every value has a stock
//! default; a config file only needs the keys it wants to change, and CLI
//! flags override both.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [crop]
//! size = 224                # Output edge in pixels (64-4096)
//! filter = "triangle"       # nearest | triangle | catmull-rom | gaussian | lanczos3
//!
//! [output]
//! quality = 95              # JPEG quality (1-100)
//!
//! [processing]
//! max_workers = 4           # Parallel workers (omit for auto = CPU cores)
//!
//! [detector]
//! model_path = "seeta_fd_frontal_v1.0.bin"  # Omit to always center-crop
//! min_face_size = 40        # Smallest face the cascade looks for (>= 20)
//! score_threshold = 2.0     # Cascade score needed to accept a face
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::detect::SeetaSettings;
use crate::imaging::ResampleFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Smallest accepted output edge.
pub const MIN_SIZE: u32 = 64;
/// Largest accepted output edge.
pub const MAX_SIZE: u32 = 4096;
/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "facecrop.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `facecrop.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FaceCropConfig {
    /// Crop and resize settings.
    pub crop: CropConfig,
    /// Encoding settings.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Face detector settings.
    pub detector: DetectorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    pub size: u32,
    pub filter: ResampleFilter,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            size: 224,
            filter: ResampleFilter::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { quality: 95 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    pub max_workers: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectorConfig {
    /// SeetaFace model file. Without one, every image is center-cropped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_path: Option<PathBuf>,
    pub min_face_size: u32,
    pub score_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        let seeta = SeetaSettings::default();
        Self {
            model_path: None,
            min_face_size: seeta.min_face_size,
            score_threshold: seeta.score_threshold,
        }
    }
}

impl DetectorConfig {
    pub fn seeta_settings(&self) -> SeetaSettings {
        SeetaSettings {
            min_face_size: self.min_face_size,
            score_threshold: self.score_threshold,
        }
    }
}

impl FaceCropConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_size(self.crop.size)?;
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.processing.max_workers == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_workers must be >= 1".into(),
            ));
        }
        if self.detector.min_face_size < 20 {
            return Err(ConfigError::Validation(
                "detector.min_face_size must be >= 20".into(),
            ));
        }
        Ok(())
    }
}

/// Check an output edge against the accepted range.
pub fn validate_size(size: u32) -> Result<(), ConfigError> {
    if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
        return Err(ConfigError::Validation(format!(
            "size must be {MIN_SIZE}-{MAX_SIZE}, got {size}"
        )));
    }
    Ok(())
}

/// Resolve the worker count for a batch.
///
/// - `None` → all available cores
/// - `Some(n)` → `n`
///
/// Either way the result never exceeds the number of tasks and is at least 1.
pub fn effective_workers(requested: Option<usize>, task_count: usize) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    requested.unwrap_or(cores).min(task_count).max(1)
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<FaceCropConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: FaceCropConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load `facecrop.toml` from `dir` if present, else return stock defaults.
pub fn load_config_in(dir: &Path) -> Result<FaceCropConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(FaceCropConfig::default());
    }
    load_config(&path)
}

/// Returns a fully-commented stock `facecrop.toml` with all keys and explanations.
///
/// Used by the `--gen-config` CLI flag.
pub fn stock_config_toml() -> &'static str {
    r##"# FaceCrop Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Crop
# ---------------------------------------------------------------------------
[crop]
# Output edge in pixels. Every output is size x size. Range 64-4096.
size = 224

# Resize kernel: nearest, triangle (bilinear), catmull-rom, gaussian, lanczos3.
filter = "triangle"

# ---------------------------------------------------------------------------
# Output encoding
# ---------------------------------------------------------------------------
[output]
# JPEG quality (1 = worst, 100 = best). PNG, BMP, TIFF and WebP are lossless.
quality = 95

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_workers = 4

# ---------------------------------------------------------------------------
# Face detector
# ---------------------------------------------------------------------------
[detector]
# SeetaFace frontal model (seeta_fd_frontal_v1.0.bin).
# Without a model every image is cropped around its center.
# model_path = "seeta_fd_frontal_v1.0.bin"

# Smallest face, in pixels, the detector searches for (>= 20).
min_face_size = 40

# Minimum cascade score to accept a detection.
score_threshold = 2.0
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = FaceCropConfig::default();
        assert_eq!(config.crop.size, 224);
        assert_eq!(config.crop.filter, ResampleFilter::Triangle);
        assert_eq!(config.output.quality, 95);
        assert_eq!(config.processing.max_workers, None);
        assert_eq!(config.detector.model_path, None);
        assert_eq!(config.detector.min_face_size, 40);
    }

    #[test]
    fn stock_toml_parses_to_defaults() {
        let config: FaceCropConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, FaceCropConfig::default());
    }

    #[test]
    fn parse_partial_config() {
        let config: FaceCropConfig = toml::from_str(
            r#"
[crop]
size = 512
"#,
        )
        .unwrap();
        assert_eq!(config.crop.size, 512);
        assert_eq!(config.crop.filter, ResampleFilter::Triangle);
        assert_eq!(config.output.quality, 95);
    }

    #[test]
    fn parse_processing_and_detector() {
        let config: FaceCropConfig = toml::from_str(
            r#"
[processing]
max_workers = 3

[detector]
model_path = "models/seeta.bin"
score_threshold = 4.5
"#,
        )
        .unwrap();
        assert_eq!(config.processing.max_workers, Some(3));
        assert_eq!(
            config.detector.model_path,
            Some(PathBuf::from("models/seeta.bin"))
        );
        assert_eq!(config.detector.seeta_settings().score_threshold, 4.5);
        assert_eq!(config.detector.seeta_settings().min_face_size, 40);
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<FaceCropConfig, _> = toml::from_str("[crop]\nsizee = 100\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<FaceCropConfig, _> = toml::from_str("[thumbnails]\nsize = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_size() {
        for size in [0, 63, 4097] {
            let mut config = FaceCropConfig::default();
            config.crop.size = size;
            assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
        }
        for size in [64, 4096] {
            let mut config = FaceCropConfig::default();
            config.crop.size = size;
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn validate_rejects_zero_workers_and_bad_quality() {
        let mut config = FaceCropConfig::default();
        config.processing.max_workers = Some(0);
        assert!(config.validate().is_err());

        let mut config = FaceCropConfig::default();
        config.output.quality = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_tiny_face_size() {
        let mut config = FaceCropConfig::default();
        config.detector.min_face_size = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_in_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config_in(tmp.path()).unwrap();
        assert_eq!(config, FaceCropConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            "[crop]\nsize = 128\nfilter = \"lanczos3\"\n",
        )
        .unwrap();

        let config = load_config_in(tmp.path()).unwrap();
        assert_eq!(config.crop.size, 128);
        assert_eq!(config.crop.filter, ResampleFilter::Lanczos3);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.toml");
        fs::write(&path, "[crop\nsize = ").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("small.toml");
        fs::write(&path, "[crop]\nsize = 32\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_config_missing_file_is_io_error() {
        assert!(matches!(
            load_config(Path::new("/nonexistent/facecrop.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn effective_workers_auto_is_capped_by_tasks() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_workers(None, 1000), cores);
        assert_eq!(effective_workers(None, 1), 1);
    }

    #[test]
    fn effective_workers_user_value_capped_by_tasks() {
        assert_eq!(effective_workers(Some(8), 3), 3);
        assert_eq!(effective_workers(Some(2), 10), 2);
    }

    #[test]
    fn effective_workers_never_zero() {
        assert_eq!(effective_workers(Some(4), 0), 1);
        assert_eq!(effective_workers(None, 0), 1);
    }
}
