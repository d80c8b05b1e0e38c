use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CLAHE_CLIP_LIMIT, DEFAULT_CLAHE_TILES, HISTOGRAM_BINS};
use crate::frame::Frame;

use super::histogram::{equalization_lut, identity_lut, Histogram};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClaheParams {
    /// Number of tile columns.
    pub tiles_x: usize,
    /// Number of tile rows.
    pub tiles_y: usize,
    /// Per-bin amplification bound, relative to a flat histogram.
    /// Zero, negative or infinite disables clipping.
    pub clip_limit: f32,
}

impl Default for ClaheParams {
    fn default() -> Self {
        Self {
            tiles_x: DEFAULT_CLAHE_TILES,
            tiles_y: DEFAULT_CLAHE_TILES,
            clip_limit: DEFAULT_CLAHE_CLIP_LIMIT,
        }
    }
}

type TileLuts = Vec<Vec<[u8; HISTOGRAM_BINS]>>;

/// Contrast-limited adaptive histogram equalization.
///
/// Tile lookup tables come from a copy of the frame padded with
/// reflect-101 borders up to a multiple of the tile grid; each output pixel
/// blends the four nearest tile tables bilinearly.
pub fn clahe(frame: &Frame, params: &ClaheParams) -> Frame {
    let (h, w) = frame.dim();
    if h == 0 || w == 0 {
        return frame.clone();
    }

    let grid_x = params.tiles_x.max(1);
    let grid_y = params.tiles_y.max(1);

    let padded = pad_reflect101(&frame.data, grid_x, grid_y);
    let (ph, pw) = padded.dim();
    let tile_w = pw / grid_x;
    let tile_h = ph / grid_y;

    let luts = tile_luts(&padded, grid_x, grid_y, tile_w, tile_h, params.clip_limit);
    frame.with_data(interpolate(&frame.data, &luts, grid_x, grid_y, tile_w, tile_h))
}

fn pad_reflect101(data: &Array2<u8>, grid_x: usize, grid_y: usize) -> Array2<u8> {
    let (h, w) = data.dim();
    let new_w = w.div_ceil(grid_x) * grid_x;
    let new_h = h.div_ceil(grid_y) * grid_y;
    if new_w == w && new_h == h {
        return data.clone();
    }

    Array2::from_shape_fn((new_h, new_w), |(row, col)| {
        data[[reflect101(row, h), reflect101(col, w)]]
    })
}

fn reflect101(x: usize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let period = 2 * len - 2;
    let r = x % period;
    if r >= len { period - r } else { r }
}

fn tile_luts(
    padded: &Array2<u8>,
    grid_x: usize,
    grid_y: usize,
    tile_w: usize,
    tile_h: usize,
    clip_limit: f32,
) -> TileLuts {
    (0..grid_y)
        .map(|ty| {
            (0..grid_x)
                .map(|tx| {
                    let mut hist = [0u64; HISTOGRAM_BINS];
                    for row in ty * tile_h..(ty + 1) * tile_h {
                        for col in tx * tile_w..(tx + 1) * tile_w {
                            hist[padded[[row, col]] as usize] += 1;
                        }
                    }
                    tile_lut(hist, (tile_w * tile_h) as u64, clip_limit)
                })
                .collect()
        })
        .collect()
}

fn tile_lut(mut hist: Histogram, area: u64, clip_limit: f32) -> [u8; HISTOGRAM_BINS] {
    // Flat tiles have nothing to equalize.
    if hist.iter().filter(|&&c| c > 0).count() <= 1 {
        return identity_lut();
    }

    if clip_limit > 0.0 && clip_limit.is_finite() {
        let limit =
            ((clip_limit as f64 * area as f64 / HISTOGRAM_BINS as f64).floor() as u64).max(1);
        clip_and_redistribute(&mut hist, limit);
    }

    equalization_lut(&hist, area)
}

fn clip_and_redistribute(hist: &mut Histogram, limit: u64) {
    let mut clipped = 0u64;
    for bin in hist.iter_mut() {
        if *bin > limit {
            clipped += *bin - limit;
            *bin = limit;
        }
    }

    let bins = HISTOGRAM_BINS as u64;
    let batch = clipped / bins;
    let mut residual = clipped % bins;
    for bin in hist.iter_mut() {
        *bin += batch;
    }
    if residual > 0 {
        let step = (bins / residual).max(1) as usize;
        let mut i = 0;
        while i < HISTOGRAM_BINS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

/// Tile pair around a pixel coordinate and the weight of the second tile.
fn neighbours(pos: usize, tile: usize, grid: usize) -> (usize, usize, f32) {
    let f = pos as f32 / tile as f32 - 0.5;
    let t1 = f.floor() as isize;
    let weight = f - t1 as f32;
    let first = t1.max(0) as usize;
    let second = if t1 + 1 < grid as isize {
        (t1 + 1) as usize
    } else {
        first
    };
    (first, second, weight)
}

fn interpolate(
    data: &Array2<u8>,
    luts: &TileLuts,
    grid_x: usize,
    grid_y: usize,
    tile_w: usize,
    tile_h: usize,
) -> Array2<u8> {
    let (h, w) = data.dim();
    let cols: Vec<(usize, usize, f32)> = (0..w).map(|x| neighbours(x, tile_w, grid_x)).collect();

    let mut out = Array2::<u8>::zeros((h, w));
    for row in 0..h {
        let (ty1, ty2, ya) = neighbours(row, tile_h, grid_y);
        for (col, &(tx1, tx2, xa)) in cols.iter().enumerate() {
            let v = data[[row, col]] as usize;
            let top = (1.0 - xa) * luts[ty1][tx1][v] as f32 + xa * luts[ty1][tx2][v] as f32;
            let bottom = (1.0 - xa) * luts[ty2][tx1][v] as f32 + xa * luts[ty2][tx2][v] as f32;
            let value = (1.0 - ya) * top + ya * bottom;
            out[[row, col]] = value.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}
