use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use tracing::{info, warn};

use crate::consts::OVERALL_REPORT_FILENAME;
use crate::error::Result;
use crate::io::source::SourceOpener;
use crate::metrics::accumulator::{MetricAccumulator, MetricSummary};
use crate::report::{format_overall_report, write_report};

use super::config::{AggregateWeighting, PipelineConfig};
use super::types::{BatchReport, NoOpReporter, ProgressReporter, SkippedVideo, VideoReport};
use super::video::VideoProcessor;

/// Processes every recognized video of the input directory, one after another.
pub struct BatchRunner {
    config: PipelineConfig,
    videos: VideoProcessor,
}

impl BatchRunner {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_reporter(config, Arc::new(NoOpReporter))
    }

    pub fn with_reporter(config: PipelineConfig, reporter: Arc<dyn ProgressReporter>) -> Self {
        let videos = VideoProcessor::with_reporter(&config, reporter);
        Self { config, videos }
    }

    /// Replace how video paths are turned into frame sources.
    pub fn with_opener(mut self, opener: SourceOpener) -> Self {
        self.videos = self.videos.with_opener(opener);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// File names in the input directory with a recognized extension,
    /// sorted by name.
    pub fn list_videos(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.config.input)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if self.config.batch.matches(&name) => names.push(name),
                Ok(_) => {}
                Err(raw) => warn!("Skipping non UTF-8 file name {:?}", raw),
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn run(&self) -> Result<BatchReport> {
        self.config.validate()?;
        fs::create_dir_all(&self.config.output)?;

        let names = self.list_videos()?;
        info!(
            input = %self.config.input.display(),
            videos = names.len(),
            "Starting batch"
        );

        let reporter = self.videos.reporter();
        let mut report = BatchReport::default();
        let mut written_by: HashMap<String, String> = HashMap::new();
        for (index, name) in names.iter().enumerate() {
            reporter.begin_video(name, index, names.len());
            let base_name = self.videos.base_name(name);
            if let Some(previous) = written_by.get(&base_name) {
                warn!(
                    "{} writes to {}/ which already holds the report of {} from this run",
                    name, base_name, previous
                );
            }
            let result = self
                .videos
                .process_video(&self.config.input, name, &self.config.output);
            reporter.finish_video();

            match result? {
                Some(video) => {
                    let collided = written_by
                        .insert(video.base_name.clone(), name.clone())
                        .is_some();
                    if collided && !report.name_collisions.contains(&video.base_name) {
                        report.name_collisions.push(video.base_name.clone());
                    }
                    report.videos.push(video);
                }
                None => report.skipped.push(SkippedVideo {
                    filename: name.clone(),
                    reason: "could not be opened or decoded".into(),
                }),
            }
        }

        if self.config.batch.aggregate_across_videos {
            let overall = aggregate(&report.videos, self.config.batch.aggregate_weighting);
            let path = self.config.output.join(OVERALL_REPORT_FILENAME);
            write_report(&path, &format_overall_report(&overall))?;
            report.overall = Some(overall);
            report.overall_report_path = Some(path);
        }

        info!(
            processed = report.videos.len(),
            skipped = report.skipped.len(),
            frames = report.total_frames(),
            "Batch complete"
        );
        Ok(report)
    }
}

/// Fold per-video results into one summary.
pub fn aggregate(videos: &[VideoReport], weighting: AggregateWeighting) -> MetricSummary {
    let mut overall = MetricAccumulator::new();
    for video in videos {
        match weighting {
            AggregateWeighting::PerFrame => overall.extend(&video.accumulator),
            AggregateWeighting::PerVideo => {
                if video.frames == 0 {
                    continue;
                }
                for (variant, avg) in video.summary.iter() {
                    overall.push(variant, avg.as_pair());
                }
            }
        }
    }
    overall.summary()
}

/// Run a whole batch without progress reporting.
pub fn run_batch(config: &PipelineConfig) -> Result<BatchReport> {
    BatchRunner::new(config.clone()).run()
}

/// Run a whole batch with a thread-safe progress reporter.
pub fn run_batch_reported(
    config: &PipelineConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<BatchReport> {
    BatchRunner::with_reporter(config.clone(), reporter).run()
}
