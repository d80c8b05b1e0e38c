use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_VIDEO_EXTENSIONS;
use crate::enhance::stretch::StretchMethod;
use crate::enhance::EnhanceConfig;
use crate::error::{LumenError, Result};
use crate::metrics::PsnrSource;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding the input videos.
    pub input: PathBuf,
    /// Directory receiving per-video folders and the overall report.
    pub output: PathBuf,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub output_options: OutputConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub enhance: EnhanceConfig,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            metrics: MetricsConfig::default(),
            output_options: OutputConfig::default(),
            batch: BatchConfig::default(),
            enhance: EnhanceConfig::default(),
        }
    }

    /// Reject settings no frame could be processed with.
    pub fn validate(&self) -> Result<()> {
        let kernel = self.enhance.median_kernel;
        if kernel == 0 || kernel % 2 == 0 {
            return Err(LumenError::InvalidKernel(kernel));
        }
        if self.enhance.clahe.tiles_x == 0 || self.enhance.clahe.tiles_y == 0 {
            return Err(LumenError::Config("CLAHE tile grid must be at least 1x1".into()));
        }
        if let StretchMethod::Percentile { low, high } = self.enhance.stretch {
            if !(0.0..=100.0).contains(&low) || !(0.0..=100.0).contains(&high) || low >= high {
                return Err(LumenError::Config(format!(
                    "stretch percentiles must satisfy 0 <= low < high <= 100, got {}/{}",
                    low, high
                )));
            }
        }
        if self.batch.extensions.iter().all(|e| e.trim_start_matches('.').is_empty()) {
            return Err(LumenError::Config("no video extensions configured".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub psnr_source: PsnrSource,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write the filtered variants of every frame as PNG.
    pub save_enhanced_images: bool,
    pub naming: NamingRule,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_enhanced_images: true,
            naming: NamingRule::default(),
        }
    }
}

/// How a video's output folder name is derived from its file name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamingRule {
    /// Everything before the first '.': `my.video.mp4` → `my`.
    #[default]
    FirstDot,
    /// Only the last extension is removed: `my.video.mp4` → `my.video`.
    StripExtension,
}

impl NamingRule {
    pub fn base_name(&self, filename: &str) -> String {
        match self {
            Self::FirstDot => filename.split('.').next().unwrap_or(filename).to_string(),
            Self::StripExtension => Path::new(filename)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| filename.to_string()),
        }
    }
}

impl std::fmt::Display for NamingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstDot => write!(f, "First Dot"),
            Self::StripExtension => write!(f, "Strip Extension"),
        }
    }
}

/// How per-video results are folded into the overall report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateWeighting {
    /// Pool every frame of every video; long videos weigh more.
    #[default]
    PerFrame,
    /// Average the per-video means; videos without frames are left out.
    PerVideo,
}

impl std::fmt::Display for AggregateWeighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PerFrame => write!(f, "Per Frame"),
            Self::PerVideo => write!(f, "Per Video"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Recognized video extensions, without the leading dot.
    pub extensions: Vec<String>,
    pub case_insensitive_extensions: bool,
    pub aggregate_across_videos: bool,
    pub aggregate_weighting: AggregateWeighting,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            case_insensitive_extensions: false,
            aggregate_across_videos: true,
            aggregate_weighting: AggregateWeighting::default(),
        }
    }
}

impl BatchConfig {
    /// Whether `filename` ends with one of the recognized extensions.
    pub fn matches(&self, filename: &str) -> bool {
        let name = if self.case_insensitive_extensions {
            filename.to_ascii_lowercase()
        } else {
            filename.to_string()
        };
        self.extensions.iter().any(|ext| {
            let ext = ext.trim_start_matches('.');
            if ext.is_empty() {
                return false;
            }
            let suffix = if self.case_insensitive_extensions {
                format!(".{}", ext.to_ascii_lowercase())
            } else {
                format!(".{}", ext)
            };
            name.ends_with(&suffix)
        })
    }
}
