//! Per-pixel error metrics between an original frame and a processed one.

pub mod accumulator;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_PIXEL_VALUE;
use crate::error::{LumenError, Result};
use crate::frame::Frame;

/// Mean squared error and peak signal-to-noise ratio of one comparison.
///
/// `psnr` is `+inf` exactly when `mse` is zero.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricPair {
    pub mse: f64,
    pub psnr: f64,
}

impl MetricPair {
    pub fn identical() -> Self {
        Self {
            mse: 0.0,
            psnr: f64::INFINITY,
        }
    }
}

/// How PSNR is derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PsnrSource {
    /// `20·log10(255/√mse)` from the mean squared error.
    #[default]
    DerivedFromMse,
    /// `10·log10(255²·N/SSE)` straight from the sum of squared errors.
    Direct,
}

impl std::fmt::Display for PsnrSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DerivedFromMse => write!(f, "Derived from MSE"),
            Self::Direct => write!(f, "Direct"),
        }
    }
}

/// Sum of squared differences. Fits in u64 for any frame that fits in memory.
pub fn squared_error_sum(original: &Frame, processed: &Frame) -> Result<u64> {
    if original.dim() != processed.dim() {
        return Err(LumenError::DimensionMismatch {
            left: original.dim(),
            right: processed.dim(),
        });
    }

    Ok(original
        .data
        .iter()
        .zip(processed.data.iter())
        .map(|(&a, &b)| {
            let d = a.abs_diff(b) as u64;
            d * d
        })
        .sum())
}

pub fn mse(original: &Frame, processed: &Frame) -> Result<f64> {
    let sse = squared_error_sum(original, processed)?;
    let n = original.pixel_count();
    if n == 0 {
        return Ok(0.0);
    }
    Ok(sse as f64 / n as f64)
}

pub fn psnr_from_mse(mse: f64) -> f64 {
    if mse == 0.0 {
        f64::INFINITY
    } else {
        20.0 * (MAX_PIXEL_VALUE / mse.sqrt()).log10()
    }
}

/// Compare `processed` against `original`.
pub fn compute(original: &Frame, processed: &Frame, source: PsnrSource) -> Result<MetricPair> {
    let sse = squared_error_sum(original, processed)?;
    let n = original.pixel_count();
    if sse == 0 || n == 0 {
        return Ok(MetricPair::identical());
    }

    let mse = sse as f64 / n as f64;
    let psnr = match source {
        PsnrSource::DerivedFromMse => psnr_from_mse(mse),
        PsnrSource::Direct => {
            10.0 * (MAX_PIXEL_VALUE * MAX_PIXEL_VALUE * n as f64 / sse as f64).log10()
        }
    };
    Ok(MetricPair { mse, psnr })
}
