use std::fs;
use std::path::Path;

use tracing::debug;

use crate::consts::FRAME_INDEX_WIDTH;
use crate::enhance::{EnhancedFrame, FrameEnhancer, Variant};
use crate::error::Result;
use crate::frame::{luminance, ColorFrame, Frame};
use crate::io::image_io::save_png;
use crate::metrics::accumulator::FrameMetrics;
use crate::metrics::{self, PsnrSource};

use super::config::PipelineConfig;

/// `frame_0007` for frame index 7.
pub fn frame_dir_name(frame_index: usize) -> String {
    format!("frame_{:0width$}", frame_index, width = FRAME_INDEX_WIDTH)
}

/// `frame_0007_clahe.png` for frame index 7.
pub fn frame_file_name(frame_index: usize, variant: Variant) -> String {
    format!("{}_{}.png", frame_dir_name(frame_index), variant.slug())
}

/// Enhances, scores and optionally saves single frames.
#[derive(Clone, Debug)]
pub struct FrameProcessor {
    enhancer: FrameEnhancer,
    psnr_source: PsnrSource,
    save_images: bool,
}

impl FrameProcessor {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            enhancer: FrameEnhancer::new(config.enhance.clone()),
            psnr_source: config.metrics.psnr_source,
            save_images: config.output_options.save_enhanced_images,
        }
    }

    pub fn enhancer(&self) -> &FrameEnhancer {
        &self.enhancer
    }

    /// Process one decoded frame of a video whose output folder is `video_dir`.
    ///
    /// Every filtered variant is scored against the grayscale original, not
    /// against the unfiltered enhancement.
    pub fn process(
        &self,
        frame: &ColorFrame,
        frame_index: usize,
        video_dir: &Path,
    ) -> Result<FrameMetrics> {
        let mut gray = luminance(frame);
        gray.metadata.frame_index = frame_index;
        self.process_gray(&gray, frame_index, video_dir)
    }

    pub fn process_gray(
        &self,
        gray: &Frame,
        frame_index: usize,
        video_dir: &Path,
    ) -> Result<FrameMetrics> {
        let enhanced = self.enhancer.enhance(gray)?;

        let score = |variant: Variant| {
            metrics::compute(gray, enhanced.filtered(variant), self.psnr_source)
        };
        let metrics = FrameMetrics::new(
            frame_index,
            [
                score(Variant::HistEq)?,
                score(Variant::ContrastStretch)?,
                score(Variant::Clahe)?,
            ],
        );

        if self.save_images {
            self.save(&enhanced, frame_index, video_dir)?;
        }

        debug!(
            frame = frame_index,
            hist_eq_mse = metrics.get(Variant::HistEq).mse,
            contrast_stretch_mse = metrics.get(Variant::ContrastStretch).mse,
            clahe_mse = metrics.get(Variant::Clahe).mse,
            "Frame scored"
        );
        Ok(metrics)
    }

    fn save(&self, enhanced: &EnhancedFrame, frame_index: usize, video_dir: &Path) -> Result<()> {
        let frame_dir = video_dir.join(frame_dir_name(frame_index));
        fs::create_dir_all(&frame_dir)?;

        for v in enhanced.iter() {
            save_png(&v.filtered, &frame_dir.join(frame_file_name(frame_index, v.variant)))?;
        }
        Ok(())
    }
}
