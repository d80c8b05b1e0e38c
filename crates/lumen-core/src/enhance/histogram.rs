use crate::consts::HISTOGRAM_BINS;
use crate::frame::Frame;

pub type Histogram = [u64; HISTOGRAM_BINS];

/// Count the samples of each intensity.
pub fn intensity_histogram(frame: &Frame) -> Histogram {
    let mut hist = [0u64; HISTOGRAM_BINS];
    for &v in frame.data.iter() {
        hist[v as usize] += 1;
    }
    hist
}

/// Identity lookup table.
pub fn identity_lut() -> [u8; HISTOGRAM_BINS] {
    let mut lut = [0u8; HISTOGRAM_BINS];
    for (i, v) in lut.iter_mut().enumerate() {
        *v = i as u8;
    }
    lut
}

/// Equalization mapping for a histogram of `total` samples.
///
/// The lowest populated intensity maps to 0 and the cumulative count above
/// it is spread linearly over [0, 255]. A histogram with a single populated
/// bin (or none) yields the identity mapping.
pub fn equalization_lut(hist: &Histogram, total: u64) -> [u8; HISTOGRAM_BINS] {
    let Some(first) = hist.iter().position(|&c| c > 0) else {
        return identity_lut();
    };
    if hist[first] >= total {
        return identity_lut();
    }

    let scale = 255.0 / (total - hist[first]) as f64;
    let mut lut = [0u8; HISTOGRAM_BINS];
    let mut sum = 0u64;
    for i in first + 1..HISTOGRAM_BINS {
        sum += hist[i];
        lut[i] = (sum as f64 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Remap every sample through `lut`.
pub fn apply_lut(frame: &Frame, lut: &[u8; HISTOGRAM_BINS]) -> Frame {
    frame.with_data(frame.data.mapv(|v| lut[v as usize]))
}

/// Global histogram equalization.
pub fn equalize_histogram(frame: &Frame) -> Frame {
    let hist = intensity_histogram(frame);
    let lut = equalization_lut(&hist, frame.pixel_count() as u64);
    apply_lut(frame, &lut)
}

/// Percentile `p` (0..=100) of the samples, linearly interpolated between
/// the two nearest order statistics.
pub fn percentile(hist: &Histogram, p: f64) -> Option<f64> {
    let total: u64 = hist.iter().sum();
    if total == 0 {
        return None;
    }

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (total - 1) as f64;
    let lo_rank = rank.floor() as u64;
    let hi_rank = rank.ceil() as u64;
    let lo = order_statistic(hist, lo_rank) as f64;
    let hi = order_statistic(hist, hi_rank) as f64;
    Some(lo + (hi - lo) * (rank - lo_rank as f64))
}

/// Value of the `k`-th smallest sample (zero-based).
fn order_statistic(hist: &Histogram, k: u64) -> u8 {
    let mut cumulative = 0u64;
    for (value, &count) in hist.iter().enumerate() {
        cumulative += count;
        if cumulative > k {
            return value as u8;
        }
    }
    255
}

/// Smallest and largest sample, or `None` for an empty frame.
pub fn min_max(hist: &Histogram) -> Option<(u8, u8)> {
    let lo = hist.iter().position(|&c| c > 0)?;
    let hi = hist.iter().rposition(|&c| c > 0)?;
    Some((lo as u8, hi as u8))
}
