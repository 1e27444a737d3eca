use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use benthic_scan::detection::{
    BoundingBox, ClassNames, DetectedObject, Detector, FrameResult, FrameStream, ModelLoader,
    PredictOptions,
};
use benthic_scan::{RunConfig, RunObserver, Report, SpeciesCount, StatusLevel};
use image::{Rgb, RgbImage, RgbaImage};
use tempfile::TempDir;

/// One scripted result: detections as (class id, score), or a detector error.
#[derive(Debug, Clone)]
pub enum Step {
    Detect(Vec<(usize, f32)>),
    Fail(String),
}

/// Detector replaying canned results per file name.
///
/// Files without a script yield one result with no detections.
#[derive(Clone)]
pub struct ScriptedDetector {
    names: ClassNames,
    scripts: HashMap<String, Vec<Step>>,
    pub calls: Arc<Mutex<Vec<(PathBuf, PredictOptions)>>>,
}

impl ScriptedDetector {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: ClassNames::new(names.iter().map(|n| n.to_string()).collect()),
            scripts: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn script(mut self, file_name: &str, steps: Vec<Step>) -> Self {
        self.scripts.insert(file_name.to_string(), steps);
        self
    }
}

impl Detector for ScriptedDetector {
    fn predict(&mut self, source: &Path, options: &PredictOptions) -> anyhow::Result<FrameStream<'_>> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((source.to_path_buf(), options.clone()));

        let file_name = source.file_name().unwrap().to_string_lossy().into_owned();
        let steps = self
            .scripts
            .get(&file_name)
            .cloned()
            .unwrap_or_else(|| vec![Step::Detect(vec![])]);
        let names = Arc::new(self.names.clone());
        let frame = Arc::new(RgbImage::from_pixel(8, 6, Rgb([10, 20, 30])));

        Ok(Box::new(steps.into_iter().map(move |step| match step {
            Step::Detect(objects) => Ok(FrameResult {
                objects: objects
                    .into_iter()
                    .map(|(class_id, confidence)| DetectedObject {
                        class_id,
                        confidence,
                        bbox: BoundingBox {
                            x1: 1.0,
                            y1: 1.0,
                            x2: 5.0,
                            y2: 4.0,
                        },
                    })
                    .collect(),
                names: Arc::clone(&names),
                frame: Arc::clone(&frame),
            }),
            Step::Fail(message) => Err(anyhow::anyhow!(message)),
        })))
    }
}

/// Loader handing out a clone of a scripted detector, or failing.
pub struct ScriptedLoader {
    pub detector: ScriptedDetector,
    pub fail_with: Option<String>,
    /// Labels path of every load call
    pub labels: Mutex<Vec<Option<PathBuf>>>,
}

impl ScriptedLoader {
    pub fn new(detector: ScriptedDetector) -> Self {
        Self {
            detector,
            fail_with: None,
            labels: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new(ScriptedDetector::new(&[]))
        }
    }
}

impl ModelLoader for ScriptedLoader {
    fn load(
        &self,
        _model_path: &Path,
        labels_path: Option<&Path>,
    ) -> anyhow::Result<Box<dyn Detector>> {
        self.labels
            .lock()
            .expect("labels lock")
            .push(labels_path.map(Path::to_path_buf));
        match &self.fail_with {
            Some(message) => Err(anyhow::anyhow!(message.clone())),
            None => Ok(Box::new(self.detector.clone())),
        }
    }
}

/// Observer keeping everything it is shown.
#[derive(Default)]
pub struct RecordingObserver {
    pub statuses: Vec<(StatusLevel, String)>,
    pub progress: Vec<f32>,
    pub tallies: Vec<Vec<SpeciesCount>>,
    pub frames: Vec<(u32, u32, String)>,
    pub reports: Vec<Report>,
}

impl RecordingObserver {
    pub fn last_status(&self) -> Option<&(StatusLevel, String)> {
        self.statuses.last()
    }

    pub fn has_status(&self, level: StatusLevel, needle: &str) -> bool {
        self.statuses
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }
}

impl RunObserver for RecordingObserver {
    fn status(&mut self, level: StatusLevel, message: &str) {
        self.statuses.push((level, message.to_string()));
    }

    fn progress(&mut self, fraction: f32) {
        self.progress.push(fraction);
    }

    fn tallies(&mut self, rows: &[SpeciesCount]) {
        self.tallies.push(rows.to_vec());
    }

    fn frame(&mut self, image: &RgbaImage, caption: &str) {
        self.frames.push((image.width(), image.height(), caption.to_string()));
    }

    fn report(&mut self, report: &Report) {
        self.reports.push(report.clone());
    }
}

/// Temp workspace with an input folder holding `files` (empty files),
/// a model file and an output folder path that does not exist yet.
pub fn make_workspace(files: &[&str]) -> (TempDir, RunConfig) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let input = dir.path().join("input");
    std::fs::create_dir_all(&input).expect("Failed to create input folder");
    for name in files {
        std::fs::write(input.join(name), b"").expect("Failed to create media file");
    }
    let model = dir.path().join("best.rten");
    std::fs::write(&model, b"model").expect("Failed to create model file");

    let config = RunConfig {
        input_dir: input,
        output_dir: dir.path().join("output"),
        model_path: model,
        confidence: 0.25,
        frame_stride: 5,
        labels_path: None,
    };
    (dir, config)
}

/// Names of the entries directly inside `dir`, sorted.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
