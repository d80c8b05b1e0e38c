use ndarray::Array2;
use std::path::PathBuf;

use crate::consts::{LUMA_B_FIXED, LUMA_G_FIXED, LUMA_R_FIXED, LUMA_SHIFT};
use crate::error::{LumenError, Result};

/// A single 8-bit grayscale frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<u8>,
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn new(data: Array2<u8>) -> Self {
        Self {
            data,
            metadata: FrameMetadata::default(),
        }
    }

    /// Build a frame from a row-major sample buffer.
    pub fn from_raw(width: usize, height: usize, samples: Vec<u8>) -> Result<Self> {
        let data = Array2::from_shape_vec((height, width), samples).map_err(|_| {
            LumenError::InvalidDimensions {
                width: width as u32,
                height: height as u32,
            }
        })?;
        Ok(Self::new(data))
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len()
    }

    /// Copy of this frame with new pixel data but the same metadata.
    pub fn with_data(&self, data: Array2<u8>) -> Self {
        Self {
            data,
            metadata: self.metadata.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameMetadata {
    pub frame_index: usize,
    pub timestamp_us: Option<u64>,
}

/// Color image composed of separate channel frames, as decoded from video.
#[derive(Clone, Debug)]
pub struct ColorFrame {
    pub red: Frame,
    pub green: Frame,
    pub blue: Frame,
}

impl ColorFrame {
    /// Split an interleaved `rgb24` buffer into channel planes.
    pub fn from_rgb24(width: usize, height: usize, raw: &[u8]) -> Result<Self> {
        if raw.len() != width * height * 3 {
            return Err(LumenError::Decode(format!(
                "expected {} bytes for a {}x{} rgb24 frame, got {}",
                width * height * 3,
                width,
                height,
                raw.len()
            )));
        }
        let plane = |offset: usize| -> Array2<u8> {
            Array2::from_shape_fn((height, width), |(row, col)| {
                raw[(row * width + col) * 3 + offset]
            })
        };
        Ok(Self {
            red: Frame::new(plane(0)),
            green: Frame::new(plane(1)),
            blue: Frame::new(plane(2)),
        })
    }

    /// A color frame whose three channels are the same gray plane.
    pub fn from_gray(gray: &Frame) -> Self {
        Self {
            red: gray.clone(),
            green: gray.clone(),
            blue: gray.clone(),
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.red.dim()
    }

    pub fn set_frame_index(&mut self, index: usize) {
        self.red.metadata.frame_index = index;
        self.green.metadata.frame_index = index;
        self.blue.metadata.frame_index = index;
    }
}

/// Convert a color frame to grayscale with BT.601 luma weights.
pub fn luminance(color: &ColorFrame) -> Frame {
    let (h, w) = color.dim();
    let half = 1u32 << (LUMA_SHIFT - 1);
    let data = Array2::from_shape_fn((h, w), |idx| {
        let y = LUMA_R_FIXED * color.red.data[idx] as u32
            + LUMA_G_FIXED * color.green.data[idx] as u32
            + LUMA_B_FIXED * color.blue.data[idx] as u32;
        ((y + half) >> LUMA_SHIFT).min(255) as u8
    });
    color.red.with_data(data)
}

/// Metadata about an opened video source.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub filename: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Frame count if the container reports one.
    pub total_frames: Option<usize>,
    pub fps: Option<f64>,
}
