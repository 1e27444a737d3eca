use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{Rgb, RgbImage, RgbaImage};
use opencv::core::{self, Mat, Point, Scalar};
use opencv::imgproc;

use super::mat::{image_to_mat, mat_to_image, swap_channels};
use super::{BoundingBox, ClassNames, DetectedObject, FrameResult, PredictOptions};

/// Byte order of the three color channels in an [`AnnotatedFrame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// Rendered visualization of one result.
#[derive(Debug, Clone)]
pub struct AnnotatedFrame {
    pub pixels: RgbImage,
    pub order: ChannelOrder,
}

impl AnnotatedFrame {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Convert to RGBA for display, reversing the channels of BGR buffers.
    pub fn to_display_rgba(&self) -> RgbaImage {
        let (width, height) = self.pixels.dimensions();
        let reverse = self.order == ChannelOrder::Bgr;
        RgbaImage::from_fn(width, height, |x, y| {
            let [a, b, c] = self.pixels.get_pixel(x, y).0;
            if reverse {
                image::Rgba([c, b, a, 255])
            } else {
                image::Rgba([a, b, c, 255])
            }
        })
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        match self.order {
            ChannelOrder::Rgb => self.pixels.clone(),
            ChannelOrder::Bgr => {
                let mut rgb = self.pixels.clone();
                for pixel in rgb.pixels_mut() {
                    pixel.0.reverse();
                }
                rgb
            }
        }
    }

    /// BGR Mat as expected by OpenCV writers.
    pub fn to_bgr_mat(&self) -> Result<Mat> {
        let mat = image_to_mat(&self.pixels)?;
        match self.order {
            ChannelOrder::Bgr => Ok(mat),
            ChannelOrder::Rgb => swap_channels(&mat),
        }
    }
}

// Per-class box colors (RGB), cycled by class index.
const PALETTE: [[u8; 3]; 10] = [
    [255, 56, 56],
    [255, 157, 151],
    [255, 112, 31],
    [255, 178, 29],
    [207, 210, 49],
    [72, 249, 10],
    [26, 147, 52],
    [0, 212, 187],
    [44, 153, 168],
    [0, 194, 255],
];

const LINE_WIDTH: i32 = 2;
const FONT: i32 = imgproc::FONT_HERSHEY_SIMPLEX;
const FONT_SCALE: f64 = 0.5;
const TEXT_THICKNESS: i32 = 1;

pub fn class_color(class_id: usize) -> Rgb<u8> {
    Rgb(PALETTE[class_id % PALETTE.len()])
}

fn bgr_scalar(color: Rgb<u8>) -> Scalar {
    let [r, g, b] = color.0;
    Scalar::new(b as f64, g as f64, r as f64, 0.0)
}

fn to_rect(bbox: &BoundingBox) -> core::Rect {
    let x = bbox.x1.round() as i32;
    let y = bbox.y1.round() as i32;
    core::Rect::new(
        x,
        y,
        (bbox.x2.round() as i32 - x).max(1),
        (bbox.y2.round() as i32 - y).max(1),
    )
}

/// Draw every detection onto a copy of `frame`: a box plus a
/// `<class> <score>` tag above it.
///
/// Drawing happens on an OpenCV Mat, so the result is in BGR order.
pub fn plot(
    frame: &RgbImage,
    objects: &[DetectedObject],
    names: &ClassNames,
) -> Result<AnnotatedFrame> {
    let mut canvas = swap_channels(&image_to_mat(frame)?)?;

    for object in objects {
        let color = bgr_scalar(class_color(object.class_id));
        let rect = to_rect(&object.bbox);
        imgproc::rectangle(&mut canvas, rect, color, LINE_WIDTH, imgproc::LINE_8, 0)?;

        let label = format!("{} {:.2}", names.name(object.class_id), object.confidence);
        let mut baseline = 0;
        let size = imgproc::get_text_size(&label, FONT, FONT_SCALE, TEXT_THICKNESS, &mut baseline)?;
        let tag_height = size.height + baseline;
        let top = (rect.y - tag_height).max(0);
        let tag = core::Rect::new(rect.x, top, size.width, tag_height);
        imgproc::rectangle(&mut canvas, tag, color, imgproc::FILLED, imgproc::LINE_8, 0)?;
        imgproc::put_text(
            &mut canvas,
            &label,
            Point::new(rect.x, top + size.height),
            FONT,
            FONT_SCALE,
            Scalar::all(255.0),
            TEXT_THICKNESS,
            imgproc::LINE_AA,
            false,
        )?;
    }

    Ok(AnnotatedFrame {
        pixels: mat_to_image(&canvas)?,
        order: ChannelOrder::Bgr,
    })
}

/// Where an annotated copy of `file_name` goes inside `save_dir`.
///
/// Fails when the target exists and overwriting is not allowed.
pub fn output_target(save_dir: &Path, file_name: &str, exist_ok: bool) -> Result<PathBuf> {
    let target = save_dir.join(file_name);
    if target.exists() && !exist_ok {
        anyhow::bail!("Refusing to overwrite {}", target.display());
    }
    Ok(target)
}

/// Write the annotated copy of an image result next to the other run
/// artifacts. Returns the written path, or `None` when saving is off.
pub fn save_annotated_image(
    result: &FrameResult,
    source: &Path,
    options: &PredictOptions,
) -> Result<Option<PathBuf>> {
    let Some(save_dir) = &options.save_dir else {
        return Ok(None);
    };
    let file_name = source
        .file_name()
        .context("Source path has no file name")?
        .to_string_lossy();
    let target = output_target(save_dir, &file_name, options.exist_ok)?;

    result
        .plot()?
        .to_rgb_image()
        .save(&target)
        .with_context(|| format!("Failed to save annotated image {}", target.display()))?;
    tracing::debug!(path = %target.display(), "annotated image written");
    Ok(Some(target))
}
