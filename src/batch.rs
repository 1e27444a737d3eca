use std::path::PathBuf;

use crate::config::RunConfig;
use crate::detection::ModelLoader;
use crate::error::RunError;
use crate::media;
use crate::models::{DetectionRecord, FileFailure, TallyMap};
use crate::pipeline::{FailurePolicy, PipelineContext, run_detection};
use crate::report::{self, Report};
use crate::session;
use crate::status::{RunObserver, StatusLevel};

/// How a run ended when it did not fail.
#[derive(Debug)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// The input folder held no recognized media. Only the empty run
    /// directory was created.
    NoMedia { save_dir: PathBuf },
}

impl RunOutcome {
    pub fn save_dir(&self) -> &std::path::Path {
        match self {
            RunOutcome::Completed(summary) => &summary.save_dir,
            RunOutcome::NoMedia { save_dir } => save_dir,
        }
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub save_dir: PathBuf,
    pub files_processed: usize,
    pub tallies: TallyMap,
    pub records: Vec<DetectionRecord>,
    pub report: Option<Report>,
    pub failures: Vec<FileFailure>,
}

/// One batch run: initialize, enumerate, detect, report.
pub struct BatchRun {
    config: RunConfig,
    policy: FailurePolicy,
    verbose: bool,
    started_at: Option<time::OffsetDateTime>,
}

impl BatchRun {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            policy: FailurePolicy::default(),
            verbose: false,
            started_at: None,
        }
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fix the start time used for the run directory name.
    pub fn started_at(mut self, started_at: time::OffsetDateTime) -> Self {
        self.started_at = Some(started_at);
        self
    }

    pub fn run(
        &self,
        loader: &dyn ModelLoader,
        observer: &mut dyn RunObserver,
    ) -> Result<RunOutcome, RunError> {
        let started_at = self.started_at.unwrap_or_else(session::now);
        let (run_dir, mut detector) =
            session::initialize_at(&self.config, loader, observer, started_at)?;

        let files = media::list_media(&self.config.input_dir).map_err(|source| {
            let error = RunError::ListMedia {
                path: self.config.input_dir.clone(),
                source,
            };
            observer.status(StatusLevel::Error, &format!("❌ {}", error));
            error
        })?;

        if files.is_empty() {
            observer.status(
                StatusLevel::Warning,
                "⚠️ No compatible media found in input directory.",
            );
            tracing::debug!(dir = %self.config.input_dir.display(), "no compatible media");
            return Ok(RunOutcome::NoMedia {
                save_dir: run_dir.into_path(),
            });
        }

        if self.verbose {
            println!("Found {} media files", files.len());
        }

        let context = PipelineContext {
            config: &self.config,
            save_dir: run_dir.path(),
            policy: self.policy,
            verbose: self.verbose,
        };
        let output = run_detection(&files, detector.as_mut(), &context, observer)?;

        observer.status(
            StatusLevel::Success,
            &format!("Batch Complete! Saved to: {}", run_dir.name()),
        );
        tracing::info!(
            files = files.len(),
            detections = output.log.records().len(),
            failed = output.failures.len(),
            "batch complete"
        );

        let report = report::finalize(&output.log, run_dir.path(), observer)?;
        let (tallies, records) = output.log.into_parts();

        Ok(RunOutcome::Completed(RunSummary {
            save_dir: run_dir.into_path(),
            files_processed: files.len() - output.failures.len(),
            tallies,
            records,
            report,
            failures: output.failures,
        }))
    }
}
