pub mod clahe;
pub mod histogram;
pub mod median;
pub mod stretch;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_MEDIAN_KERNEL;
use crate::error::Result;
use crate::frame::Frame;

use self::clahe::{clahe, ClaheParams};
use self::histogram::equalize_histogram;
use self::median::median_filter;
use self::stretch::{contrast_stretch, StretchMethod};

/// The enhancement methods tracked through the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    HistEq,
    ContrastStretch,
    Clahe,
}

impl Variant {
    /// Every variant, in report order.
    pub const ALL: [Variant; 3] = [Variant::HistEq, Variant::ContrastStretch, Variant::Clahe];

    /// Position in [`Variant::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::HistEq => 0,
            Self::ContrastStretch => 1,
            Self::Clahe => 2,
        }
    }

    /// Name used in output file names.
    pub fn slug(self) -> &'static str {
        match self {
            Self::HistEq => "hist_eq",
            Self::ContrastStretch => "contrast_stretch",
            Self::Clahe => "clahe",
        }
    }

    /// Name used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::HistEq => "Histogram Equalization",
            Self::ContrastStretch => "Contrast Stretching",
            Self::Clahe => "CLAHE",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    /// Odd median kernel applied to every enhanced variant.
    pub median_kernel: usize,
    pub stretch: StretchMethod,
    pub clahe: ClaheParams,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            median_kernel: DEFAULT_MEDIAN_KERNEL,
            stretch: StretchMethod::default(),
            clahe: ClaheParams::default(),
        }
    }
}

/// One variant: the enhanced frame and its median-filtered form.
#[derive(Clone, Debug)]
pub struct EnhancedVariant {
    pub variant: Variant,
    pub enhanced: Frame,
    pub filtered: Frame,
}

/// All three variants of one grayscale frame, in [`Variant::ALL`] order.
#[derive(Clone, Debug)]
pub struct EnhancedFrame {
    variants: [EnhancedVariant; 3],
}

impl EnhancedFrame {
    pub fn get(&self, variant: Variant) -> &EnhancedVariant {
        &self.variants[variant.index()]
    }

    pub fn enhanced(&self, variant: Variant) -> &Frame {
        &self.get(variant).enhanced
    }

    pub fn filtered(&self, variant: Variant) -> &Frame {
        &self.get(variant).filtered
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnhancedVariant> {
        self.variants.iter()
    }
}

/// Produces the enhanced and filtered variants of grayscale frames.
#[derive(Clone, Debug, Default)]
pub struct FrameEnhancer {
    config: EnhanceConfig,
}

impl FrameEnhancer {
    pub fn new(config: EnhanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EnhanceConfig {
        &self.config
    }

    /// Apply one enhancement method, without filtering.
    pub fn apply(&self, frame: &Frame, variant: Variant) -> Frame {
        match variant {
            Variant::HistEq => equalize_histogram(frame),
            Variant::ContrastStretch => contrast_stretch(frame, &self.config.stretch),
            Variant::Clahe => clahe(frame, &self.config.clahe),
        }
    }

    pub fn enhance(&self, frame: &Frame) -> Result<EnhancedFrame> {
        let build = |variant: Variant| -> Result<EnhancedVariant> {
            let enhanced = self.apply(frame, variant);
            let filtered = median_filter(&enhanced, self.config.median_kernel)?;
            Ok(EnhancedVariant {
                variant,
                enhanced,
                filtered,
            })
        };

        Ok(EnhancedFrame {
            variants: [
                build(Variant::HistEq)?,
                build(Variant::ContrastStretch)?,
                build(Variant::Clahe)?,
            ],
        })
    }
}
