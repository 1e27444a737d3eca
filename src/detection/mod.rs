pub mod annotate;
pub mod mat;
pub mod video;
pub mod yolo;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbImage;

pub use annotate::{AnnotatedFrame, ChannelOrder};
pub use yolo::{YoloDetector, YoloLoader};

/// Axis-aligned box in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 { 0.0 } else { inter / union }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedObject {
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

/// Class index to name mapping of a loaded model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassNames(Vec<String>);

impl ClassNames {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    /// One name per non-empty line.
    pub fn from_lines(text: &str) -> Self {
        Self(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Name for `class_id`, or `class_<id>` if the model carries no label for it.
    pub fn name(&self, class_id: usize) -> String {
        self.0
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| format!("class_{}", class_id))
    }
}

/// One image, or one sampled video frame, after inference.
#[derive(Debug, Clone)]
pub struct FrameResult {
    pub objects: Vec<DetectedObject>,
    pub names: Arc<ClassNames>,
    pub frame: Arc<RgbImage>,
}

impl FrameResult {
    pub fn class_name(&self, object: &DetectedObject) -> String {
        self.names.name(object.class_id)
    }

    /// Render the labeled detections onto a copy of the frame.
    pub fn plot(&self) -> anyhow::Result<AnnotatedFrame> {
        annotate::plot(&self.frame, &self.objects, &self.names)
    }
}

/// Settings handed to the detector for one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictOptions {
    pub confidence: f32,
    /// Only applies to videos; images always yield exactly one result
    pub frame_stride: u32,
    /// Annotated output is written flat into this directory when set
    pub save_dir: Option<PathBuf>,
    pub exist_ok: bool,
}

/// Finite, one-pass sequence of results for one source, consumed in order.
pub type FrameStream<'a> = Box<dyn Iterator<Item = anyhow::Result<FrameResult>> + 'a>;

/// Inference backend.
pub trait Detector {
    /// Start streaming results for `source`.
    fn predict(&mut self, source: &Path, options: &PredictOptions) -> anyhow::Result<FrameStream<'_>>;
}

/// Builds a [`Detector`] from a model file.
pub trait ModelLoader {
    /// `labels_path` names the class names file; loaders pick their own
    /// fallback when it is `None`.
    fn load(
        &self,
        model_path: &Path,
        labels_path: Option<&Path>,
    ) -> anyhow::Result<Box<dyn Detector>>;
}
