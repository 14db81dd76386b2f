use clap::Parser;
use facecrop::batch::{self, BatchError, BatchOptions, BatchSummary};
use facecrop::config::{self, FaceCropConfig};
use facecrop::detect::{FaceLocator, NoFaceLocator, SeetaFaceLocator};
use facecrop::imaging::{Quality, RustBackend};
use facecrop::output;
use facecrop::transform::FaceCropper;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: u8 = 1;
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser, Debug)]
#[command(name = "facecrop")]
#[command(about = "Crop images to squares centered on the first detected face")]
#[command(long_about = "\
Crop images to squares centered on the first detected face

Every supported image (jpg, jpeg, png, bmp, webp, tiff, tif) is cropped to a
square around the first face found, or around its center when there is none,
then scaled to exactly SIZE x SIZE and saved in its original format:

  photos/
  ├── alice.jpg
  ├── bob.png
  └── output/               # default output directory
      ├── alice.out.jpg
      └── bob.out.png

Face detection needs a SeetaFace model file, set as [detector] model_path in
facecrop.toml. Without one, every image is center-cropped.

Run 'facecrop --gen-config' to print a documented facecrop.toml.")]
#[command(version, allow_negative_numbers = true)]
struct Cli {
    /// Image file or directory of images
    #[arg(required_unless_present = "gen_config")]
    input: Option<PathBuf>,

    /// Output directory [default: <input>/output]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output edge in pixels, 64-4096 [default: 224]
    #[arg(short, long)]
    size: Option<i64>,

    /// Parallel workers [default: CPU cores]
    #[arg(short, long)]
    workers: Option<i64>,

    /// Only print warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print debug details such as planned crop regions
    #[arg(short, long)]
    verbose: bool,

    /// Config file [default: ./facecrop.toml if present]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the batch summary as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print a stock facecrop.toml with all options documented
    #[arg(long)]
    gen_config: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return ExitCode::SUCCESS;
    }

    init_logging(cli.quiet, cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("facecrop={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Range-check the raw numeric flags before anything touches the disk.
fn validate_args(
    size: Option<i64>,
    workers: Option<i64>,
) -> Result<(Option<u32>, Option<usize>), String> {
    let size = match size {
        Some(s) if s < config::MIN_SIZE as i64 || s > config::MAX_SIZE as i64 => {
            return Err(format!(
                "Size must be {}-{}, got {}",
                config::MIN_SIZE,
                config::MAX_SIZE,
                s
            ));
        }
        Some(s) => Some(s as u32),
        None => None,
    };
    let workers = match workers {
        Some(w) if w < 1 => return Err(format!("Workers must be >= 1, got {}", w)),
        Some(w) => Some(w as usize),
        None => None,
    };
    Ok((size, workers))
}

fn load_config(cli: &Cli) -> Result<FaceCropConfig, config::ConfigError> {
    match &cli.config {
        Some(path) => config::load_config(path),
        None => config::load_config_in(Path::new(".")),
    }
}

fn build_locator(cfg: &FaceCropConfig) -> Result<Box<dyn FaceLocator>, Box<dyn std::error::Error>> {
    match &cfg.detector.model_path {
        Some(path) => {
            let locator = SeetaFaceLocator::load(path, cfg.detector.seeta_settings())?;
            info!(model = %path.display(), "Face detector loaded");
            Ok(Box::new(locator))
        }
        None => {
            info!("No detector model configured, every image is center-cropped");
            Ok(Box::new(NoFaceLocator))
        }
    }
}

/// Set `cancel` on the first Ctrl-C; exit immediately on the second.
fn spawn_interrupt_listener(cancel: Arc<AtomicBool>) {
    let spawned = std::thread::Builder::new()
        .name("facecrop-signal".into())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    warn!("Ctrl-C handling unavailable: {}", e);
                    return;
                }
            };
            runtime.block_on(async {
                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
                warn!("Interrupted, finishing images already in progress");
                cancel.store(true, Ordering::SeqCst);
                if tokio::signal::ctrl_c().await.is_ok() {
                    std::process::exit(EXIT_INTERRUPTED as i32);
                }
            });
        });
    if let Err(e) = spawned {
        warn!("Ctrl-C handling unavailable: {}", e);
    }
}

fn write_report(path: &Path, summary: &BatchSummary) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), "Report written");
    Ok(())
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let (size, workers) = validate_args(cli.size, cli.workers)?;
    let cfg = load_config(cli)?;

    let target_size = size.unwrap_or(cfg.crop.size);
    let input = match &cli.input {
        Some(input) => input,
        None => return Err("No input path given".into()),
    };

    let locator = build_locator(&cfg)?;
    let backend = RustBackend::new()
        .with_filter(cfg.crop.filter)
        .with_quality(Quality::new(cfg.output.quality));
    let cropper = FaceCropper::new(&backend, locator.as_ref());

    let cancel = Arc::new(AtomicBool::new(false));
    spawn_interrupt_listener(cancel.clone());

    let options = BatchOptions {
        target_size,
        output_directory: cli.output.clone(),
        workers: workers.or(cfg.processing.max_workers),
        cancel,
    };

    let (tx, printer) = if cli.quiet {
        (None, None)
    } else {
        let (tx, rx) = std::sync::mpsc::channel();
        let printer = std::thread::spawn(move || {
            for event in rx {
                output::print_batch_event(&event);
            }
        });
        (Some(tx), Some(printer))
    };

    let result = batch::run(&cropper, input, &options, tx);
    if let Some(printer) = printer {
        let _ = printer.join();
    }

    let (summary, code) = match result {
        Ok(summary) => {
            let code = if summary.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_FAILURE)
            };
            (summary, code)
        }
        Err(BatchError::Interrupted { summary, .. }) => {
            (summary, ExitCode::from(EXIT_INTERRUPTED))
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(report) = &cli.report {
        write_report(report, &summary)?;
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("facecrop").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let cli = parse(&["photos"]);
        assert_eq!(cli.input, Some(PathBuf::from("photos")));
        assert_eq!(cli.size, None);
        assert_eq!(cli.workers, None);
        assert!(!cli.quiet);
    }

    #[test]
    fn short_flags() {
        let cli = parse(&["photos", "-o", "out", "-s", "128", "-w", "2", "-q"]);
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert_eq!(cli.size, Some(128));
        assert_eq!(cli.workers, Some(2));
        assert!(cli.quiet);
    }

    #[test]
    fn input_required_without_gen_config() {
        assert!(Cli::try_parse_from(["facecrop"]).is_err());
        assert!(parse(&["--gen-config"]).gen_config);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(Cli::try_parse_from(["facecrop", "x", "-q", "-v"]).is_err());
    }

    #[test]
    fn negative_numbers_reach_validation() {
        let cli = parse(&["photos", "-s", "-5", "-w", "-1"]);
        assert!(validate_args(cli.size, None).is_err());
        assert!(validate_args(None, cli.workers).is_err());
    }

    #[test]
    fn size_bounds_are_inclusive() {
        assert_eq!(validate_args(Some(64), None).unwrap().0, Some(64));
        assert_eq!(validate_args(Some(4096), None).unwrap().0, Some(4096));
        assert!(validate_args(Some(63), None).is_err());
        assert!(validate_args(Some(4097), None).is_err());
        assert!(validate_args(Some(0), None).is_err());
    }

    #[test]
    fn workers_must_be_positive() {
        assert_eq!(validate_args(None, Some(1)).unwrap().1, Some(1));
        assert!(validate_args(None, Some(0)).is_err());
    }
}
