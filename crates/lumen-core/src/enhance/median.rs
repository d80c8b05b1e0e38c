use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{LumenError, Result};
use crate::frame::Frame;

/// Square median filter with replicated borders.
///
/// `kernel` must be odd; a kernel of 1 returns the frame unchanged.
/// Parallelizes at the row level for frames >= 256x256.
pub fn median_filter(frame: &Frame, kernel: usize) -> Result<Frame> {
    if kernel == 0 || kernel % 2 == 0 {
        return Err(LumenError::InvalidKernel(kernel));
    }
    let (h, w) = frame.dim();
    if kernel == 1 || h == 0 || w == 0 {
        return Ok(frame.clone());
    }

    let rows: Vec<Vec<u8>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h)
            .into_par_iter()
            .map(|row| median_row(&frame.data, row, kernel))
            .collect()
    } else {
        (0..h).map(|row| median_row(&frame.data, row, kernel)).collect()
    };

    let samples: Vec<u8> = rows.into_iter().flatten().collect();
    let data = Array2::from_shape_vec((h, w), samples).map_err(|_| {
        LumenError::InvalidDimensions {
            width: w as u32,
            height: h as u32,
        }
    })?;
    Ok(frame.with_data(data))
}

fn median_row(data: &Array2<u8>, row: usize, kernel: usize) -> Vec<u8> {
    let (h, w) = data.dim();
    let radius = (kernel / 2) as isize;
    let mid = kernel * kernel / 2;
    let mut window = Vec::with_capacity(kernel * kernel);

    (0..w)
        .map(|col| {
            window.clear();
            for dy in -radius..=radius {
                let r = clamp_index(row as isize + dy, h);
                for dx in -radius..=radius {
                    let c = clamp_index(col as isize + dx, w);
                    window.push(data[[r, c]]);
                }
            }
            *window.select_nth_unstable(mid).1
        })
        .collect()
}

fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}
