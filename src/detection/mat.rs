//! Conversions between `image` buffers and OpenCV `Mat`s.
//!
//! OpenCV keeps 8-bit color frames as BGR. Byte copies here never reorder
//! channels; [`swap_channels`] does.

use anyhow::{Context, Result};
use image::RgbImage;
use opencv::core::{self, Mat, Scalar};
use opencv::imgproc;
use opencv::prelude::*;

/// Copy a three-channel buffer into a `CV_8UC3` Mat, bytes unchanged.
pub fn image_to_mat(image: &RgbImage) -> Result<Mat> {
    let (width, height) = image.dimensions();
    let mut mat = Mat::new_rows_cols_with_default(
        height as i32,
        width as i32,
        core::CV_8UC3,
        Scalar::all(0.0),
    )?;
    mat.data_bytes_mut()?.copy_from_slice(image.as_raw());
    Ok(mat)
}

/// Copy a `CV_8UC3` Mat into a buffer sized from the Mat itself.
pub fn mat_to_image(mat: &Mat) -> Result<RgbImage> {
    if mat.typ() != core::CV_8UC3 {
        anyhow::bail!("expected an 8-bit 3-channel frame, got Mat type {}", mat.typ());
    }
    let width = mat.cols() as u32;
    let height = mat.rows() as u32;
    let bytes = if mat.is_continuous() {
        mat.data_bytes()?.to_vec()
    } else {
        mat.try_clone()?.data_bytes()?.to_vec()
    };
    RgbImage::from_raw(width, height, bytes).context("Frame buffer does not match its size")
}

/// BGR to RGB, or back.
pub fn swap_channels(mat: &Mat) -> Result<Mat> {
    let mut swapped = Mat::default();
    imgproc::cvt_color(mat, &mut swapped, imgproc::COLOR_BGR2RGB, 0)?;
    Ok(swapped)
}
