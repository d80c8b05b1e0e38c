use serde::{Deserialize, Serialize};

use crate::enhance::Variant;

use super::MetricPair;

/// One metric pair per variant for a single frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMetrics {
    pub frame_index: usize,
    pairs: [MetricPair; 3],
}

impl FrameMetrics {
    pub fn new(frame_index: usize, pairs: [MetricPair; 3]) -> Self {
        Self { frame_index, pairs }
    }

    pub fn get(&self, variant: Variant) -> MetricPair {
        self.pairs[variant.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variant, MetricPair)> + '_ {
        Variant::ALL.iter().map(move |&v| (v, self.get(v)))
    }
}

/// Ordered metric pairs per variant, appended to and then averaged once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricAccumulator {
    values: [Vec<MetricPair>; 3],
}

impl MetricAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, variant: Variant, pair: MetricPair) {
        self.values[variant.index()].push(pair);
    }

    pub fn push_frame(&mut self, metrics: &FrameMetrics) {
        for (variant, pair) in metrics.iter() {
            self.push(variant, pair);
        }
    }

    /// Append every entry of `other`, keeping order.
    pub fn extend(&mut self, other: &MetricAccumulator) {
        for variant in Variant::ALL {
            self.values[variant.index()].extend_from_slice(other.values(variant));
        }
    }

    pub fn values(&self, variant: Variant) -> &[MetricPair] {
        &self.values[variant.index()]
    }

    pub fn len(&self, variant: Variant) -> usize {
        self.values(variant).len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Vec::is_empty)
    }

    /// Arithmetic mean per variant. MSE and PSNR are averaged separately;
    /// an empty list averages to 0.
    pub fn summary(&self) -> MetricSummary {
        let average = |variant: Variant| {
            let values = self.values(variant);
            if values.is_empty() {
                return VariantAverage::default();
            }
            let n = values.len() as f64;
            VariantAverage {
                mse: values.iter().map(|p| p.mse).sum::<f64>() / n,
                psnr: values.iter().map(|p| p.psnr).sum::<f64>() / n,
                samples: values.len(),
            }
        };

        MetricSummary {
            averages: [
                average(Variant::HistEq),
                average(Variant::ContrastStretch),
                average(Variant::Clahe),
            ],
        }
    }
}

/// Mean MSE and mean PSNR of one variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantAverage {
    pub mse: f64,
    pub psnr: f64,
    /// Number of values averaged.
    pub samples: usize,
}

impl VariantAverage {
    pub fn as_pair(&self) -> MetricPair {
        MetricPair {
            mse: self.mse,
            psnr: self.psnr,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    averages: [VariantAverage; 3],
}

impl MetricSummary {
    pub fn get(&self, variant: Variant) -> &VariantAverage {
        &self.averages[variant.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variant, &VariantAverage)> + '_ {
        Variant::ALL.iter().map(move |&v| (v, self.get(v)))
    }
}
