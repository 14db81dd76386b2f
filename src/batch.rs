//! Batch orchestration.
//!
//! [`run`] takes an input path (one image or a directory of images), crops
//! every supported image with a [`FaceCropper`], and writes the results to
//! an output directory. The run moves through fixed stages:
//!
//! ```text
//! enumerate → reject empty → prepare output dir → dispatch → collect → summarize
//! ```
//!
//! ## Enumeration
//!
//! A file input is a batch of one and must have a supported extension. A
//! directory input contributes its immediate regular files with supported
//! extensions, sorted by name; subdirectories are not visited. Files with
//! other extensions are skipped here and never count as failures.
//!
//! ## Output Structure
//!
//! ```text
//! photos/
//! ├── alice.jpg
//! ├── bob.png
//! ├── notes.txt               # ignored
//! └── output/                 # default output directory
//!     ├── alice.out.jpg       # size × size, same format as the source
//!     └── bob.out.png
//! ```
//!
//! An existing output directory is reused as-is; outputs with the same name
//! are overwritten.
//!
//! ## Parallel Processing
//!
//! With one worker or one task, images are processed in order on the calling
//! thread. Otherwise they run on a dedicated [rayon](https://docs.rs/rayon)
//! pool. Tasks share nothing mutable: each receives an [`ImageTask`] by value
//! and produces a [`TransformOutcome`]. Any error or panic inside a task is
//! caught at the task boundary and recorded as a failed outcome.
//!
//! ## Interruption
//!
//! Setting [`BatchOptions::cancel`] stops tasks that have not started yet.
//! In-flight tasks finish, files already written stay on disk, and `run`
//! returns [`BatchError::Interrupted`] with the partial summary.

use crate::config;
use crate::formats;
use crate::imaging::ImageBackend;
use crate::naming;
use crate::transform::{FaceCropper, TransformError};
use rayon::prelude::*;
use serde::Serialize;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Invalid target size: {0}")]
    InvalidSize(u32),
    #[error("Could not create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Interrupted after {} of {total} image(s)", .summary.total())]
    Interrupted { summary: BatchSummary, total: usize },
}

/// One image to crop. Built during enumeration, consumed by one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTask {
    pub source_path: PathBuf,
    pub target_size: u32,
    pub output_directory: PathBuf,
}

/// Result of one [`ImageTask`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformOutcome {
    pub success: bool,
    pub source_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Failure reason, for display only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransformOutcome {
    fn succeeded(source_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            success: true,
            source_path,
            output_path: Some(output_path),
            error: None,
        }
    }

    fn failed(source_path: PathBuf, reason: String) -> Self {
        Self {
            success: false,
            source_path,
            output_path: None,
            error: Some(reason),
        }
    }
}

/// Tally of a batch, derived from its outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Failed sources in outcome order.
    pub failed_paths: Vec<PathBuf>,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[TransformOutcome]) -> Self {
        let failed_paths: Vec<PathBuf> = outcomes
            .iter()
            .filter(|o| !o.success)
            .map(|o| o.source_path.clone())
            .collect();
        Self {
            succeeded: outcomes.len() - failed_paths.len(),
            failed: failed_paths.len(),
            failed_paths,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    /// At least one image written and none failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.succeeded > 0
    }
}

/// Progress events, sent while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        total: usize,
        workers: usize,
        output_directory: PathBuf,
    },
    /// `completed` counts tasks finished so far, not the task's position.
    ItemFinished {
        completed: usize,
        total: usize,
        outcome: TransformOutcome,
    },
    Finished {
        summary: BatchSummary,
    },
}

/// Knobs for one [`run`].
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub target_size: u32,
    /// Defaults to `output/` next to the input.
    pub output_directory: Option<PathBuf>,
    /// Defaults to the number of CPU cores.
    pub workers: Option<usize>,
    pub cancel: Arc<AtomicBool>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            target_size: 224,
            output_directory: None,
            workers: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Candidate images under `input`, or `None` after logging why there are none
/// to process.
fn enumerate(input: &Path) -> Option<Vec<PathBuf>> {
    if !input.exists() {
        error!(path = %input.display(), "Input not found");
        return None;
    }

    if !input.is_dir() {
        if !formats::is_supported(input) {
            error!(path = %input.display(), "Unsupported format");
            return None;
        }
        return Some(vec![input.to_path_buf()]);
    }

    let paths: Vec<PathBuf> = WalkDir::new(input)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && formats::is_supported(e.path()))
        .map(|e| e.into_path())
        .collect();

    if paths.is_empty() {
        error!(path = %input.display(), "No valid images");
        info!("Supported: {}", formats::SUPPORTED_FORMATS.join(", "));
        return None;
    }
    info!("Found {} image(s)", paths.len());
    Some(paths)
}

/// `output/` beside a file input, or inside a directory input.
pub fn default_output_directory(input: &Path) -> PathBuf {
    if input.is_dir() {
        return input.join("output");
    }
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join("output"),
        _ => PathBuf::from("output"),
    }
}

fn crop_and_save<B: ImageBackend>(
    cropper: &FaceCropper<'_, B>,
    task: &ImageTask,
) -> Result<PathBuf, TransformError> {
    let cropped = cropper.transform(&task.source_path, task.target_size)?;
    let output_path = naming::output_path(&task.source_path, &task.output_directory)
        .ok_or_else(|| TransformError::NotFound(task.source_path.clone()))?;
    cropper
        .backend()
        .save(&cropped, &output_path)
        .map_err(|source| TransformError::Save {
            path: output_path.clone(),
            source,
        })?;
    Ok(output_path)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run one task, turning every failure into a failed outcome.
pub fn process_task<B: ImageBackend>(
    cropper: &FaceCropper<'_, B>,
    task: ImageTask,
) -> TransformOutcome {
    match catch_unwind(AssertUnwindSafe(|| crop_and_save(cropper, &task))) {
        Ok(Ok(output_path)) => {
            info!(path = %output_path.display(), "Saved");
            TransformOutcome::succeeded(task.source_path, output_path)
        }
        Ok(Err(e)) => {
            error!("{}", e);
            TransformOutcome::failed(task.source_path, e.to_string())
        }
        Err(payload) => {
            let reason = format!(
                "Error processing {}: {}",
                task.source_path.display(),
                panic_message(&*payload)
            );
            error!("{}", reason);
            TransformOutcome::failed(task.source_path, reason)
        }
    }
}

/// Crop every image under `input` into the output directory.
///
/// A missing input, an unsupported single file, or a directory without
/// images ends the run early with an empty summary and no output directory.
///
/// # Errors
/// Only run-level problems: a zero target size, an output directory that
/// cannot be created, a pool that cannot start, or cancellation.
pub fn run<B: ImageBackend>(
    cropper: &FaceCropper<'_, B>,
    input: &Path,
    options: &BatchOptions,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    if options.target_size == 0 {
        return Err(BatchError::InvalidSize(options.target_size));
    }

    let Some(sources) = enumerate(input) else {
        return Ok(BatchSummary::default());
    };

    let output_directory = options
        .output_directory
        .clone()
        .unwrap_or_else(|| default_output_directory(input));
    std::fs::create_dir_all(&output_directory).map_err(|source| BatchError::OutputDir {
        path: output_directory.clone(),
        source,
    })?;

    let tasks: Vec<ImageTask> = sources
        .into_iter()
        .map(|source_path| ImageTask {
            source_path,
            target_size: options.target_size,
            output_directory: output_directory.clone(),
        })
        .collect();
    let total = tasks.len();
    let workers = config::effective_workers(options.workers, total);
    info!("Processing with {} worker(s)", workers);

    let send = |event: BatchEvent| {
        if let Some(tx) = &events {
            let _ = tx.send(event);
        }
    };
    send(BatchEvent::Started {
        total,
        workers,
        output_directory: output_directory.clone(),
    });

    let completed = AtomicUsize::new(0);
    let cancel = &options.cancel;
    let run_one = |task: ImageTask| -> Option<TransformOutcome> {
        if cancel.load(Ordering::SeqCst) {
            return None;
        }
        let outcome = process_task(cropper, task);
        send(BatchEvent::ItemFinished {
            completed: completed.fetch_add(1, Ordering::SeqCst) + 1,
            total,
            outcome: outcome.clone(),
        });
        Some(outcome)
    };

    let outcomes: Vec<TransformOutcome> = if workers == 1 || total == 1 {
        tasks.into_iter().map_while(run_one).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("facecrop-worker-{i}"))
            .build()?;
        pool.install(|| {
            tasks
                .into_par_iter()
                .map(run_one)
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .collect()
        })
    };

    let summary = BatchSummary::from_outcomes(&outcomes);
    if cancel.load(Ordering::SeqCst) {
        warn!(
            "Interrupted: {} of {} image(s) processed",
            summary.total(),
            total
        );
        return Err(BatchError::Interrupted { summary, total });
    }

    info!("Processed: {}/{}", summary.succeeded, total);
    for path in &summary.failed_paths {
        warn!("Failed: {}", path.display());
    }
    send(BatchEvent::Finished {
        summary: summary.clone(),
    });
    Ok(summary)
}
