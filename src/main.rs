use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use benthic_scan::config::{self, RunConfig};
use benthic_scan::{BatchRun, ConsoleObserver, FailurePolicy, RunOutcome, YoloLoader};

#[derive(Parser)]
#[command(name = "benthic_scan")]
#[command(about = "Batch object detection over folders of images and videos")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Process a folder from the terminal
    Run(RunArgs),
    /// Open the live dashboard
    #[cfg(feature = "gui")]
    Gui,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Folder containing raw images/videos
    #[arg(short, long, value_name = "DIR")]
    input: PathBuf,

    /// Folder receiving a new Run_<timestamp> directory
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// Detection model file
    #[arg(short, long, value_name = "FILE", default_value = config::DEFAULT_MODEL_PATH)]
    model: PathBuf,

    /// Class names, one per line (defaults to <model>.txt when present)
    #[arg(long, value_name = "FILE")]
    labels: Option<PathBuf>,

    /// Confidence threshold (lower = more detections)
    #[arg(short, long, default_value_t = config::DEFAULT_CONFIDENCE, value_parser = config::parse_confidence)]
    confidence: f32,

    /// Process every Nth video frame
    #[arg(
        short,
        long,
        default_value_t = config::DEFAULT_FRAME_STRIDE,
        value_parser = clap::value_parser!(u32).range(1..=30)
    )]
    stride: u32,

    /// Log and skip files the detector fails on instead of aborting
    #[arg(long)]
    continue_on_error: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "benthic_scan=debug" } else { "benthic_scan=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// The observer has already shown a failed run on stderr, so it only
/// turns into an exit code here.
fn run_batch(args: RunArgs) -> ExitCode {
    init_logging(args.verbose);

    let config = RunConfig {
        input_dir: args.input,
        output_dir: args.output,
        model_path: args.model,
        confidence: args.confidence,
        frame_stride: args.stride,
        labels_path: args.labels,
    };
    let policy = if args.continue_on_error {
        FailurePolicy::SkipFile
    } else {
        FailurePolicy::Abort
    };

    let loader = YoloLoader::default();
    let mut observer = ConsoleObserver::new(args.verbose);

    let outcome = match BatchRun::new(config)
        .with_verbose(args.verbose)
        .with_failure_policy(policy)
        .run(&loader, &mut observer)
    {
        Ok(outcome) => outcome,
        Err(_) => return ExitCode::FAILURE,
    };

    if let RunOutcome::Completed(summary) = &outcome {
        println!(
            "\nProcessed {} files, {} detections",
            summary.files_processed,
            summary.records.len()
        );
        if !summary.failures.is_empty() {
            println!("\nFailed files:");
            for failure in &summary.failures {
                println!("  {}: {}", failure.file, failure.error);
            }
        }
    }

    ExitCode::SUCCESS
}

#[cfg(feature = "gui")]
fn run_gui() -> ExitCode {
    init_logging(false);
    match benthic_scan::gui::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("GUI error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Run(args)) => run_batch(args),
        #[cfg(feature = "gui")]
        Some(Command::Gui) | None => run_gui(),
        #[cfg(not(feature = "gui"))]
        None => {
            use clap::CommandFactory;
            match Cli::command().print_help() {
                Ok(()) => ExitCode::SUCCESS,
                Err(_) => ExitCode::FAILURE,
            }
        }
    }
}
