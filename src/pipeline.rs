use std::path::Path;

use crate::config::RunConfig;
use crate::detection::{Detector, FrameResult, PredictOptions};
use crate::error::RunError;
use crate::models::{
    DetectionLog, DetectionRecord, FileFailure, FrameIndex, MediaFile, MediaKind,
    round_confidence, sorted_tallies,
};
use crate::status::{RunObserver, StatusLevel};

/// What to do when the detector fails on a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the whole batch on the first error.
    #[default]
    Abort,
    /// Report the error, keep what was already recorded, move to the next file.
    SkipFile,
}

/// Context shared by every file of a run.
pub struct PipelineContext<'a> {
    pub config: &'a RunConfig,
    pub save_dir: &'a Path,
    pub policy: FailurePolicy,
    pub verbose: bool,
}

impl PipelineContext<'_> {
    fn predict_options(&self) -> PredictOptions {
        PredictOptions {
            confidence: self.config.confidence,
            frame_stride: self.config.frame_stride,
            save_dir: Some(self.save_dir.to_path_buf()),
            exist_ok: true,
        }
    }
}

/// Result of the detection loop.
#[derive(Debug, Default)]
pub struct LoopOutput {
    pub log: DetectionLog,
    pub failures: Vec<FileFailure>,
}

/// Run every file through the detector, in order, updating counts and
/// the live surfaces after each result that contains detections.
pub fn run_detection(
    files: &[MediaFile],
    detector: &mut dyn Detector,
    context: &PipelineContext<'_>,
    observer: &mut dyn RunObserver,
) -> Result<LoopOutput, RunError> {
    let mut output = LoopOutput::default();
    let total = files.len();

    for (i, file) in files.iter().enumerate() {
        let name = file.file_name();
        observer.progress(i as f32 / total as f32);
        observer.status(
            StatusLevel::Info,
            &format!("🚀 Processing ({}/{}): {}", i + 1, total, name),
        );
        tracing::info!(file = %name, kind = %file.kind, index = i + 1, total, "processing");

        let before = output.log.records().len();
        match process_file(file, &name, detector, context, &mut output.log, observer) {
            Ok(results) => {
                if context.verbose {
                    println!(
                        "  {} results, {} detections",
                        results,
                        output.log.records().len() - before
                    );
                }
            }
            Err(source) => match context.policy {
                FailurePolicy::Abort => {
                    let error = RunError::Detection { file: name, source };
                    tracing::debug!(error = %error, "batch aborted");
                    observer.status(StatusLevel::Error, &format!("❌ {}", error));
                    return Err(error);
                }
                FailurePolicy::SkipFile => {
                    tracing::debug!(file = %name, error = %format!("{:#}", source), "skipping file");
                    observer.status(
                        StatusLevel::Warning,
                        &format!("Skipped {}: {:#}", name, source),
                    );
                    output.failures.push(FileFailure {
                        file: name,
                        error: format!("{:#}", source),
                    });
                }
            },
        }
    }

    observer.progress(1.0);
    Ok(output)
}

/// Stream one file's results. Returns how many results were consumed.
fn process_file(
    file: &MediaFile,
    name: &str,
    detector: &mut dyn Detector,
    context: &PipelineContext<'_>,
    log: &mut DetectionLog,
    observer: &mut dyn RunObserver,
) -> anyhow::Result<u64> {
    let options = context.predict_options();
    let stream = detector.predict(&file.path, &options)?;

    let mut frame_counter: u64 = 0;
    for result in stream {
        let result = result?;
        frame_counter += 1;

        if result.objects.is_empty() {
            continue;
        }

        let frame_index = match file.kind {
            MediaKind::Video => FrameIndex::Frame(frame_counter * u64::from(context.config.frame_stride)),
            MediaKind::Image => FrameIndex::NotApplicable,
        };
        record_result(&result, name, file.kind, frame_index, log);

        observer.tallies(&sorted_tallies(log.tallies()));

        let display = result.plot()?.to_display_rgba();
        observer.frame(&display, &format!("Processing: {}", name));
    }

    Ok(frame_counter)
}

/// Append one record per detected object and bump the matching tallies.
pub fn record_result(
    result: &FrameResult,
    file_name: &str,
    kind: MediaKind,
    frame_index: FrameIndex,
    log: &mut DetectionLog,
) {
    for object in &result.objects {
        let species = result.class_name(object);
        tracing::debug!(file = file_name, %species, confidence = object.confidence, %frame_index, "detection");
        log.push(DetectionRecord {
            file: file_name.to_string(),
            kind,
            species,
            confidence: round_confidence(object.confidence),
            frame_index,
        });
    }
}
