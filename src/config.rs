use std::path::PathBuf;

use crate::error::RunError;

pub const DEFAULT_MODEL_PATH: &str = "best.rten";
pub const DEFAULT_CONFIDENCE: f32 = 0.25;
pub const CONFIDENCE_STEP: f32 = 0.05;
pub const DEFAULT_FRAME_STRIDE: u32 = 5;
pub const MIN_FRAME_STRIDE: u32 = 1;
pub const MAX_FRAME_STRIDE: u32 = 30;

/// Settings for one run. Built once when the run starts and never changed.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub model_path: PathBuf,
    /// Minimum detector score, in [0, 1]
    pub confidence: f32,
    /// Every Nth video frame is handed to the detector
    pub frame_stride: u32,
    /// Class names file; falls back to a file next to the model
    pub labels_path: Option<PathBuf>,
}

/// Editable control panel state.
///
/// Paths are kept as raw strings and only checked for emptiness here;
/// existence checks happen when the run initializes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigForm {
    pub input_dir: String,
    pub output_dir: String,
    pub model_path: String,
    /// Optional class names file; empty means none
    pub labels_path: String,
    pub confidence: f32,
    pub frame_stride: u32,
}

impl Default for ConfigForm {
    fn default() -> Self {
        Self {
            input_dir: String::new(),
            output_dir: String::new(),
            model_path: DEFAULT_MODEL_PATH.to_string(),
            labels_path: String::new(),
            confidence: DEFAULT_CONFIDENCE,
            frame_stride: DEFAULT_FRAME_STRIDE,
        }
    }
}

impl ConfigForm {
    /// Set the confidence slider, clamped to [0, 1] and snapped to 0.05.
    pub fn set_confidence(&mut self, value: f32) {
        self.confidence = snap_confidence(value);
    }

    pub fn set_frame_stride(&mut self, value: u32) {
        self.frame_stride = value.clamp(MIN_FRAME_STRIDE, MAX_FRAME_STRIDE);
    }

    /// Freeze the form into a [`RunConfig`] for the start action.
    pub fn submit(&self) -> Result<RunConfig, RunError> {
        let input = self.input_dir.trim();
        let output = self.output_dir.trim();
        if input.is_empty() || output.is_empty() {
            return Err(RunError::MissingFolders);
        }

        let model = match self.model_path.trim() {
            "" => DEFAULT_MODEL_PATH,
            path => path,
        };

        Ok(RunConfig {
            input_dir: PathBuf::from(input),
            output_dir: PathBuf::from(output),
            model_path: PathBuf::from(model),
            confidence: snap_confidence(self.confidence),
            frame_stride: self.frame_stride.clamp(MIN_FRAME_STRIDE, MAX_FRAME_STRIDE),
            labels_path: match self.labels_path.trim() {
                "" => None,
                path => Some(PathBuf::from(path)),
            },
        })
    }
}

fn snap_confidence(value: f32) -> f32 {
    if !value.is_finite() {
        return DEFAULT_CONFIDENCE;
    }
    let steps = (value.clamp(0.0, 1.0) / CONFIDENCE_STEP).round();
    (steps * CONFIDENCE_STEP).clamp(0.0, 1.0)
}

/// Argument parser for `--confidence`.
pub fn parse_confidence(value: &str) -> Result<f32, String> {
    let parsed: f32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if !(0.0..=1.0).contains(&parsed) {
        return Err(format!("confidence must be within 0.0..=1.0, got {}", parsed));
    }
    Ok(parsed)
}
