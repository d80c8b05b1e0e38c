use std::path::Path;

use image::{GrayImage, ImageFormat};

use crate::error::{LumenError, Result};
use crate::frame::{luminance, ColorFrame, Frame};

/// Save a frame as 8-bit grayscale PNG.
pub fn save_png(frame: &Frame, path: &Path) -> Result<()> {
    let w = frame.width() as u32;
    let h = frame.height() as u32;
    let samples: Vec<u8> = frame.data.iter().copied().collect();

    let img = GrayImage::from_raw(w, h, samples)
        .ok_or(LumenError::InvalidDimensions { width: w, height: h })?;
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Load an image file as a color frame.
pub fn load_color_image(path: &Path) -> Result<ColorFrame> {
    let rgb = image::open(path)?.to_rgb8();
    let (w, h) = rgb.dimensions();
    ColorFrame::from_rgb24(w as usize, h as usize, rgb.as_raw())
}

/// Load an image file as grayscale, using the same luma weights as video frames.
pub fn load_image(path: &Path) -> Result<Frame> {
    Ok(luminance(&load_color_image(path)?))
}
