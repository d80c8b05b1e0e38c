use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::Result;
use crate::frame::ColorFrame;
use crate::io::source::{default_opener, FrameSource, SourceOpener};
use crate::metrics::accumulator::MetricAccumulator;
use crate::report::{format_video_report, write_report};

use super::config::{NamingRule, PipelineConfig};
use super::frame::FrameProcessor;
use super::types::{NoOpReporter, ProgressReporter, VideoReport};

/// Runs every frame of one video through the [`FrameProcessor`] and writes
/// the per-video report.
pub struct VideoProcessor {
    frames: FrameProcessor,
    naming: NamingRule,
    reporter: Arc<dyn ProgressReporter>,
    opener: SourceOpener,
}

impl VideoProcessor {
    pub fn new(config: &PipelineConfig) -> Self {
        Self::with_reporter(config, Arc::new(NoOpReporter))
    }

    pub fn with_reporter(config: &PipelineConfig, reporter: Arc<dyn ProgressReporter>) -> Self {
        Self {
            frames: FrameProcessor::new(config),
            naming: config.output_options.naming,
            reporter,
            opener: default_opener(),
        }
    }

    /// Replace how video paths are turned into frame sources.
    pub fn with_opener(mut self, opener: SourceOpener) -> Self {
        self.opener = opener;
        self
    }

    /// The output folder name for `filename`.
    pub fn base_name(&self, filename: &str) -> String {
        self.naming.base_name(filename)
    }

    pub fn reporter(&self) -> &Arc<dyn ProgressReporter> {
        &self.reporter
    }

    /// Process `input_dir/filename` into `output_dir/<base name>/`.
    ///
    /// Returns `Ok(None)` when the video cannot be opened or its first frame
    /// cannot be decoded; nothing is written for it and other videos of a
    /// batch are unaffected. Image and report write failures are errors.
    pub fn process_video(
        &self,
        input_dir: &Path,
        filename: &str,
        output_dir: &Path,
    ) -> Result<Option<VideoReport>> {
        let path = input_dir.join(filename);
        let mut source = match (self.opener)(&path) {
            Ok(source) => source,
            Err(e) => {
                warn!("Cannot open video {}: {}", filename, e);
                return Ok(None);
            }
        };

        let first = match source.next_frame() {
            Ok(first) => first,
            Err(e) => {
                warn!("Cannot decode video {}: {}", filename, e);
                return Ok(None);
            }
        };

        let report = self.process_frames(source.as_mut(), first, filename, output_dir)?;
        Ok(Some(report))
    }

    /// Process an already opened source. The caller owns (and releases) it.
    ///
    /// A decode error on the first frame is returned; later decode errors end
    /// the video and the report covers the frames read so far.
    pub fn process_source(
        &self,
        source: &mut dyn FrameSource,
        filename: &str,
        output_dir: &Path,
    ) -> Result<VideoReport> {
        let first = source.next_frame()?;
        self.process_frames(source, first, filename, output_dir)
    }

    fn process_frames(
        &self,
        source: &mut dyn FrameSource,
        first: Option<ColorFrame>,
        filename: &str,
        output_dir: &Path,
    ) -> Result<VideoReport> {
        let base_name = self.naming.base_name(filename);
        let video_dir = output_dir.join(&base_name);
        fs::create_dir_all(&video_dir)?;

        info!(
            video = filename,
            width = source.info().width,
            height = source.info().height,
            frames = ?source.info().total_frames,
            "Processing video"
        );

        self.reporter.video_opened(source.info().total_frames);

        let mut accumulator = MetricAccumulator::new();
        let mut frame_index = 0usize;
        let mut next = Ok(first);
        loop {
            let frame = match next {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    warn!(
                        "Decoding stopped at frame {} of {}: {}",
                        frame_index, filename, e
                    );
                    break;
                }
            };

            let metrics = self.frames.process(&frame, frame_index, &video_dir)?;
            accumulator.push_frame(&metrics);
            frame_index += 1;
            self.reporter.advance(frame_index);
            next = source.next_frame();
        }

        let summary = accumulator.summary();
        let report_path = video_dir.join(format!("{}_metrics.txt", base_name));
        write_report(&report_path, &format_video_report(filename, &summary))?;

        info!(video = filename, frames = frame_index, "Metrics saved");
        for (variant, avg) in summary.iter() {
            info!(
                "  {} - MSE: {:.2}, PSNR: {:.2} dB",
                variant.label(),
                avg.mse,
                avg.psnr
            );
        }

        Ok(VideoReport {
            filename: filename.to_string(),
            base_name,
            output_dir: video_dir,
            report_path,
            frames: frame_index,
            summary,
            accumulator,
        })
    }
}
