//! CLI output formatting for batch progress.
//!
//! Progress is printed as the batch runs, one block per finished image,
//! followed by a summary:
//!
//! ```text
//! Cropping 3 images with 2 workers → photos/output
//! 001/003 alice.jpg → alice.out.jpg
//! 002/003 broken.png FAILED
//!     Error: Could not read photos/broken.png: ...
//! 003/003 carol.png → carol.out.png
//! Processed: 2/3
//! Failed:
//!     photos/broken.png
//! ```
//!
//! Each event has a `format_*` function returning `Vec<String>` so the text
//! can be tested without capturing stdout. Format functions are pure.

use crate::batch::{BatchEvent, BatchSummary, TransformOutcome};
use std::path::Path;

/// Format a 1-based counter against its total, both 3-digit zero-padded.
fn format_counter(completed: usize, total: usize) -> String {
    format!("{:0>3}/{:0>3}", completed, total)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

fn outcome_lines(completed: usize, total: usize, outcome: &TransformOutcome) -> Vec<String> {
    let counter = format_counter(completed, total);
    let source = file_name(&outcome.source_path);
    match (&outcome.output_path, outcome.success) {
        (Some(output), true) => vec![format!("{} {} \u{2192} {}", counter, source, file_name(output))],
        _ => {
            let mut lines = vec![format!("{} {} FAILED", counter, source)];
            if let Some(reason) = &outcome.error {
                lines.push(format!("    Error: {}", reason));
            }
            lines
        }
    }
}

/// Format the end-of-run tally.
pub fn format_summary(summary: &BatchSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Processed: {}/{}",
        summary.succeeded,
        summary.total()
    )];
    if !summary.failed_paths.is_empty() {
        lines.push("Failed:".to_string());
        lines.extend(
            summary
                .failed_paths
                .iter()
                .map(|p| format!("    {}", p.display())),
        );
    }
    lines
}

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started {
            total,
            workers,
            output_directory,
        } => vec![format!(
            "Cropping {} with {} \u{2192} {}",
            plural(*total, "image"),
            plural(*workers, "worker"),
            output_directory.display()
        )],
        BatchEvent::ItemFinished {
            completed,
            total,
            outcome,
        } => outcome_lines(*completed, *total, outcome),
        BatchEvent::Finished { summary } => format_summary(summary),
    }
}

/// Print a batch event to stdout.
pub fn print_batch_event(event: &BatchEvent) {
    for line in format_batch_event(event) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn counter_is_zero_padded() {
        assert_eq!(format_counter(1, 3), "001/003");
        assert_eq!(format_counter(42, 1000), "042/1000");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "image"), "1 image");
        assert_eq!(plural(0, "image"), "0 images");
        assert_eq!(plural(4, "worker"), "4 workers");
    }

    #[test]
    fn started_line() {
        let event = BatchEvent::Started {
            total: 3,
            workers: 1,
            output_directory: PathBuf::from("photos/output"),
        };
        assert_eq!(
            format_batch_event(&event),
            vec!["Cropping 3 images with 1 worker \u{2192} photos/output"]
        );
    }

    #[test]
    fn success_line_shows_output_name() {
        let event = BatchEvent::ItemFinished {
            completed: 2,
            total: 10,
            outcome: TransformOutcome {
                success: true,
                source_path: PathBuf::from("photos/alice.jpg"),
                output_path: Some(PathBuf::from("photos/output/alice.out.jpg")),
                error: None,
            },
        };
        assert_eq!(
            format_batch_event(&event),
            vec!["002/010 alice.jpg \u{2192} alice.out.jpg"]
        );
    }

    #[test]
    fn failure_lines_include_reason() {
        let event = BatchEvent::ItemFinished {
            completed: 1,
            total: 1,
            outcome: TransformOutcome {
                success: false,
                source_path: PathBuf::from("photos/broken.png"),
                output_path: None,
                error: Some("Could not read photos/broken.png".to_string()),
            },
        };
        let lines = format_batch_event(&event);
        assert_eq!(lines[0], "001/001 broken.png FAILED");
        assert_eq!(lines[1], "    Error: Could not read photos/broken.png");
    }

    #[test]
    fn summary_without_failures() {
        let summary = BatchSummary {
            succeeded: 3,
            failed: 0,
            failed_paths: vec![],
        };
        assert_eq!(format_summary(&summary), vec!["Processed: 3/3"]);
    }

    #[test]
    fn summary_lists_failed_paths() {
        let summary = BatchSummary {
            succeeded: 1,
            failed: 2,
            failed_paths: vec![PathBuf::from("a/x.png"), PathBuf::from("a/y.jpg")],
        };
        let event = BatchEvent::Finished { summary };
        assert_eq!(
            format_batch_event(&event),
            vec!["Processed: 1/3", "Failed:", "    a/x.png", "    a/y.jpg"]
        );
    }
}
