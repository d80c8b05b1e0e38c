use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_STRETCH_HIGH_PERCENTILE, DEFAULT_STRETCH_LOW_PERCENTILE};
use crate::frame::Frame;

use super::histogram::{intensity_histogram, min_max, percentile};

/// How the black and white points of a contrast stretch are chosen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum StretchMethod {
    /// Low/high percentiles of the frame (0..=100). Robust to outlier pixels.
    Percentile { low: f64, high: f64 },
    /// Exact minimum and maximum sample.
    MinMax,
}

impl Default for StretchMethod {
    fn default() -> Self {
        Self::Percentile {
            low: DEFAULT_STRETCH_LOW_PERCENTILE,
            high: DEFAULT_STRETCH_HIGH_PERCENTILE,
        }
    }
}

impl std::fmt::Display for StretchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percentile { low, high } => write!(f, "Percentile ({}/{})", low, high),
            Self::MinMax => write!(f, "Min/Max"),
        }
    }
}

/// Black and white points of `frame` under `method`.
pub fn stretch_bounds(frame: &Frame, method: &StretchMethod) -> Option<(f64, f64)> {
    let hist = intensity_histogram(frame);
    match *method {
        StretchMethod::Percentile { low, high } => {
            Some((percentile(&hist, low)?, percentile(&hist, high)?))
        }
        StretchMethod::MinMax => {
            let (lo, hi) = min_max(&hist)?;
            Some((lo as f64, hi as f64))
        }
    }
}

/// Linear stretch mapping [black_point, white_point] → [0, 255].
///
/// Samples outside the range are clamped. A degenerate range
/// (`white_point <= black_point`) leaves the frame unchanged.
pub fn linear_stretch(frame: &Frame, black_point: f64, white_point: f64) -> Frame {
    let range = white_point - black_point;
    if range <= 0.0 {
        return frame.clone();
    }

    let scale = 255.0 / range;
    frame.with_data(
        frame
            .data
            .mapv(|v| ((v as f64 - black_point) * scale).round().clamp(0.0, 255.0) as u8),
    )
}

/// Contrast stretch with bounds picked by `method`.
pub fn contrast_stretch(frame: &Frame, method: &StretchMethod) -> Frame {
    match stretch_bounds(frame, method) {
        Some((lo, hi)) => linear_stretch(frame, lo, hi),
        None => frame.clone(),
    }
}
