//! YOLO-family object detector on the `rten` runtime.
//!
//! Expects a model exported with a single `[1, 3, S, S]` float input and a
//! single `[1, 4 + classes, boxes]` output (the transposed
//! `[1, boxes, 4 + classes]` layout is accepted too), boxes given as
//! center/size in input pixels.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{ImageReader, RgbImage};
use rten::Model;
use rten_tensor::prelude::*;
use rten_tensor::NdTensor;

use super::annotate::save_annotated_image;
use super::video::{CaptureSource, SampledFrames, VideoSink};
use super::{
    BoundingBox, ClassNames, DetectedObject, Detector, FrameResult, FrameStream, ModelLoader,
    PredictOptions,
};
use crate::media;
use crate::models::MediaKind;

pub const DEFAULT_INPUT_SIZE: u32 = 640;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.7;
pub const DEFAULT_MAX_DETECTIONS: usize = 300;
const PAD_VALUE: u8 = 114;

/// Loads `.rten` YOLO models plus their class names.
#[derive(Debug, Clone)]
pub struct YoloLoader {
    pub input_size: u32,
}

impl Default for YoloLoader {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_INPUT_SIZE,
        }
    }
}

/// Class names from `labels_path`, else from `<model>.txt` next to the
/// model, else none.
pub fn load_class_names(model_path: &Path, labels_path: Option<&Path>) -> Result<ClassNames> {
    let path = match labels_path {
        Some(path) => path.to_path_buf(),
        None => {
            let sidecar = model_path.with_extension("txt");
            if !sidecar.is_file() {
                tracing::warn!(
                    model = %model_path.display(),
                    "no labels file found, classes will be reported by index"
                );
                return Ok(ClassNames::default());
            }
            sidecar
        }
    };
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read labels file {}", path.display()))?;
    Ok(ClassNames::from_lines(&text))
}

impl ModelLoader for YoloLoader {
    fn load(&self, model_path: &Path, labels_path: Option<&Path>) -> Result<Box<dyn Detector>> {
        let model = Model::load_file(model_path)
            .with_context(|| format!("Failed to load model {}", model_path.display()))?;
        let names = load_class_names(model_path, labels_path)?;
        tracing::info!(
            model = %model_path.display(),
            classes = names.len(),
            input_size = self.input_size,
            "model loaded"
        );
        Ok(Box::new(YoloDetector {
            model,
            names: Arc::new(names),
            input_size: self.input_size,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            max_detections: DEFAULT_MAX_DETECTIONS,
        }))
    }
}

pub struct YoloDetector {
    model: Model,
    names: Arc<ClassNames>,
    input_size: u32,
    iou_threshold: f32,
    max_detections: usize,
}

impl YoloDetector {
    /// Run the model on one frame and return boxes in frame coordinates.
    pub fn infer(&self, frame: &RgbImage, confidence: f32) -> Result<Vec<DetectedObject>> {
        let (data, letterbox) = letterbox(frame, self.input_size);
        let size = self.input_size as usize;
        let input = NdTensor::from_data([1, 3, size, size], data);

        let output: NdTensor<f32, 3> = self
            .model
            .run_one(input.view().into(), None)
            .context("Model inference failed")?
            .try_into()
            .context("Unexpected model output type")?;

        let shape = output.shape();
        let values: Vec<f32> = output.iter().copied().collect();
        let candidates = decode_output(shape, &values, confidence, &letterbox);
        Ok(non_max_suppression(
            candidates,
            self.iou_threshold,
            self.max_detections,
        ))
    }

    fn frame_result(&self, frame: RgbImage, confidence: f32) -> Result<FrameResult> {
        let objects = self.infer(&frame, confidence)?;
        Ok(FrameResult {
            objects,
            names: Arc::clone(&self.names),
            frame: Arc::new(frame),
        })
    }

    fn predict_image(&self, source: &Path, options: &PredictOptions) -> Result<FrameResult> {
        let frame = ImageReader::open(source)
            .with_context(|| format!("Failed to open {}", source.display()))?
            .with_guessed_format()?
            .decode()
            .with_context(|| format!("Failed to decode image {}", source.display()))?
            .to_rgb8();

        let result = self.frame_result(frame, options.confidence)?;
        save_annotated_image(&result, source, options)?;
        Ok(result)
    }
}

impl Detector for YoloDetector {
    fn predict(&mut self, source: &Path, options: &PredictOptions) -> Result<FrameStream<'_>> {
        let detector: &YoloDetector = self;
        match media::classify(source) {
            Some(MediaKind::Video) => {
                let (capture, info) = CaptureSource::open(source)?;
                let mut sink = match &options.save_dir {
                    Some(save_dir) => Some(VideoSink::create(
                        save_dir,
                        source,
                        &info,
                        options.frame_stride,
                        options.exist_ok,
                    )?),
                    None => None,
                };
                let confidence = options.confidence;
                let frames = SampledFrames::new(capture, options.frame_stride);
                Ok(Box::new(frames.map(move |frame| {
                    let result = detector.frame_result(frame?, confidence)?;
                    if let Some(sink) = sink.as_mut() {
                        sink.write(&result.plot()?)?;
                    }
                    Ok(result)
                })))
            }
            _ => {
                let source = source.to_path_buf();
                let options = options.clone();
                Ok(Box::new(std::iter::once_with(move || {
                    detector.predict_image(&source, &options)
                })))
            }
        }
    }
}

/// Scale and padding applied when fitting a frame into the model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub source_width: u32,
    pub source_height: u32,
}

impl Letterbox {
    /// Map a model-space box back onto the source frame, clipped to it.
    pub fn unmap(&self, bbox: BoundingBox) -> BoundingBox {
        let max_x = self.source_width as f32;
        let max_y = self.source_height as f32;
        BoundingBox {
            x1: ((bbox.x1 - self.pad_x) / self.scale).clamp(0.0, max_x),
            y1: ((bbox.y1 - self.pad_y) / self.scale).clamp(0.0, max_y),
            x2: ((bbox.x2 - self.pad_x) / self.scale).clamp(0.0, max_x),
            y2: ((bbox.y2 - self.pad_y) / self.scale).clamp(0.0, max_y),
        }
    }
}

/// Fit `frame` into a `size`×`size` square keeping its aspect ratio.
///
/// Returns planar CHW data scaled to [0, 1] with gray padding.
pub fn letterbox(frame: &RgbImage, size: u32) -> (Vec<f32>, Letterbox) {
    let (width, height) = frame.dimensions();
    let scale = (size as f32 / width.max(1) as f32).min(size as f32 / height.max(1) as f32);
    let new_w = ((width as f32 * scale).round() as u32).clamp(1, size);
    let new_h = ((height as f32 * scale).round() as u32).clamp(1, size);
    let pad_x = (size - new_w) / 2;
    let pad_y = (size - new_h) / 2;

    let resized = image::imageops::resize(frame, new_w, new_h, FilterType::Triangle);

    let plane = (size * size) as usize;
    let mut data = vec![PAD_VALUE as f32 / 255.0; 3 * plane];
    for (x, y, pixel) in resized.enumerate_pixels() {
        let offset = ((y + pad_y) * size + (x + pad_x)) as usize;
        for channel in 0..3 {
            data[channel * plane + offset] = pixel[channel] as f32 / 255.0;
        }
    }

    (
        data,
        Letterbox {
            scale,
            pad_x: pad_x as f32,
            pad_y: pad_y as f32,
            source_width: width,
            source_height: height,
        },
    )
}

/// Turn raw model output into candidate boxes above `confidence`.
///
/// `shape` is `[1, attrs, boxes]`, or `[1, boxes, attrs]` when the second
/// axis is the longer one. `values` is the row-major tensor data.
pub fn decode_output(
    shape: [usize; 3],
    values: &[f32],
    confidence: f32,
    letterbox: &Letterbox,
) -> Vec<DetectedObject> {
    let [_, a, b] = shape;
    let transposed = a > b;
    let (attrs, boxes) = if transposed { (b, a) } else { (a, b) };
    if attrs <= 4 || values.len() < attrs * boxes {
        return Vec::new();
    }

    let value = |attr: usize, index: usize| {
        if transposed {
            values[index * attrs + attr]
        } else {
            values[attr * boxes + index]
        }
    };

    let mut detections = Vec::new();
    for index in 0..boxes {
        let (class_id, score) = (4..attrs)
            .map(|attr| (attr - 4, value(attr, index)))
            .fold((0, f32::MIN), |best, candidate| {
                if candidate.1 > best.1 { candidate } else { best }
            });
        if score < confidence {
            continue;
        }

        let (cx, cy, w, h) = (
            value(0, index),
            value(1, index),
            value(2, index),
            value(3, index),
        );
        let bbox = letterbox.unmap(BoundingBox {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
        });
        detections.push(DetectedObject {
            class_id,
            confidence: score,
            bbox,
        });
    }
    detections
}

/// Class-aware greedy NMS, highest score first.
pub fn non_max_suppression(
    mut candidates: Vec<DetectedObject>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<DetectedObject> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<DetectedObject> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept.iter().any(|existing| {
            existing.class_id == candidate.class_id
                && existing.bbox.iou(&candidate.bbox) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
