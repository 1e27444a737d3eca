//! Video decoding and annotated-video encoding on OpenCV `videoio`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbImage;
use opencv::core::{self, Mat};
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture, VideoWriter};

use super::annotate::{AnnotatedFrame, output_target};
use super::mat::{mat_to_image, swap_channels};

/// Rate assumed when a container reports none.
pub const FALLBACK_FPS: f64 = 30.0;

/// Container-level properties of an opened video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub fps: f64,
    /// As reported by the container; decoded frames carry their own size
    pub width: u32,
    pub height: u32,
}

pub fn normalize_fps(fps: f64) -> f64 {
    if fps.is_finite() && fps > 0.0 {
        fps
    } else {
        FALLBACK_FPS
    }
}

/// Frame-by-frame access to a decoder.
pub trait FrameSource {
    /// Advance to the next frame without converting it. `false` at the end.
    fn grab(&mut self) -> Result<bool>;

    /// Convert the most recently grabbed frame.
    fn retrieve(&mut self) -> Result<RgbImage>;
}

/// The stride-th, 2·stride-th, … frames of a source.
///
/// Stops after the first error.
pub struct SampledFrames<S> {
    source: S,
    stride: u32,
    done: bool,
}

impl<S: FrameSource> SampledFrames<S> {
    pub fn new(source: S, stride: u32) -> Self {
        Self {
            source,
            stride: stride.max(1),
            done: false,
        }
    }
}

impl<S: FrameSource> Iterator for SampledFrames<S> {
    type Item = Result<RgbImage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        for _ in 0..self.stride {
            match self.source.grab() {
                Ok(true) => {}
                Ok(false) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
        let frame = self.source.retrieve();
        if frame.is_err() {
            self.done = true;
        }
        Some(frame)
    }
}

/// OpenCV capture over a video file.
pub struct CaptureSource {
    capture: VideoCapture,
    source: PathBuf,
}

impl CaptureSource {
    pub fn open(source: &Path) -> Result<(Self, VideoInfo)> {
        let path = source
            .to_str()
            .with_context(|| format!("Video path is not valid UTF-8: {}", source.display()))?;
        let capture = VideoCapture::from_file(path, videoio::CAP_ANY)
            .with_context(|| format!("Failed to open video {}", source.display()))?;
        if !capture.is_opened()? {
            anyhow::bail!("Failed to open video {}", source.display());
        }

        let info = VideoInfo {
            fps: normalize_fps(capture.get(videoio::CAP_PROP_FPS)?),
            width: capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32,
            height: capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32,
        };
        tracing::debug!(
            source = %source.display(),
            width = info.width,
            height = info.height,
            fps = info.fps,
            "video opened"
        );

        Ok((
            Self {
                capture,
                source: source.to_path_buf(),
            },
            info,
        ))
    }
}

impl FrameSource for CaptureSource {
    fn grab(&mut self) -> Result<bool> {
        self.capture
            .grab()
            .with_context(|| format!("Failed to read {}", self.source.display()))
    }

    fn retrieve(&mut self) -> Result<RgbImage> {
        let mut frame = Mat::default();
        if !self.capture.retrieve(&mut frame, 0)? || frame.empty() {
            anyhow::bail!("Failed to decode a frame of {}", self.source.display());
        }
        mat_to_image(&swap_channels(&frame)?)
    }
}

/// `save_dir/<source stem>.mp4`.
pub fn annotated_video_name(source: &Path) -> Result<String> {
    let stem = source.file_stem().context("Source path has no file name")?;
    Ok(format!("{}.mp4", stem.to_string_lossy()))
}

/// Annotated output video. The writer opens on the first frame, sized
/// from that frame.
pub struct VideoSink {
    path: PathBuf,
    fps: f64,
    writer: Option<VideoWriter>,
    size: (u32, u32),
}

impl VideoSink {
    /// Prepare `save_dir/<source stem>.mp4` at `fps / stride`.
    pub fn create(
        save_dir: &Path,
        source: &Path,
        info: &VideoInfo,
        stride: u32,
        exist_ok: bool,
    ) -> Result<Self> {
        let path = output_target(save_dir, &annotated_video_name(source)?, exist_ok)?;
        Ok(Self {
            path,
            fps: info.fps / stride.max(1) as f64,
            writer: None,
            size: (0, 0),
        })
    }

    fn open_writer(&self, size: (u32, u32)) -> Result<VideoWriter> {
        let path = self.path.to_str().context("Output path is not valid UTF-8")?;
        let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')?;
        let writer = VideoWriter::new(
            path,
            fourcc,
            self.fps,
            core::Size::new(size.0 as i32, size.1 as i32),
            true,
        )?;
        if !writer.is_opened()? {
            anyhow::bail!("Failed to create video {}", self.path.display());
        }
        Ok(writer)
    }

    pub fn write(&mut self, frame: &AnnotatedFrame) -> Result<()> {
        let size = (frame.width(), frame.height());
        if self.writer.is_none() {
            self.writer = Some(self.open_writer(size)?);
            self.size = size;
        } else if size != self.size {
            anyhow::bail!(
                "Frame size changed from {}x{} to {}x{} in {}",
                self.size.0,
                self.size.1,
                size.0,
                size.1,
                self.path.display()
            );
        }

        let mat = frame.to_bgr_mat()?;
        let writer = self.writer.as_mut().context("Video writer is not open")?;
        writer
            .write(&mat)
            .with_context(|| format!("Failed to write frame to {}", self.path.display()))
    }
}

impl Drop for VideoSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            match writer.release() {
                Ok(()) => tracing::debug!(path = %self.path.display(), "annotated video written"),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "failed to finalize video")
                }
            }
        }
    }
}
