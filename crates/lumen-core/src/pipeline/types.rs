use std::path::PathBuf;

use crate::metrics::accumulator::{MetricAccumulator, MetricSummary};

/// Result of processing one video.
#[derive(Clone, Debug)]
pub struct VideoReport {
    /// Input file name, as listed in the input directory.
    pub filename: String,
    /// Output folder name derived from `filename`.
    pub base_name: String,
    pub output_dir: PathBuf,
    pub report_path: PathBuf,
    pub frames: usize,
    pub summary: MetricSummary,
    /// Per-frame pairs, kept for cross-video aggregation.
    pub accumulator: MetricAccumulator,
}

/// A video the batch runner could not open or decode.
#[derive(Clone, Debug)]
pub struct SkippedVideo {
    pub filename: String,
    pub reason: String,
}

/// Result of a batch run.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    pub videos: Vec<VideoReport>,
    pub skipped: Vec<SkippedVideo>,
    /// Output folders written by more than one video of the run, such as
    /// `clip/` for both `clip.avi` and `clip.mp4`. The later video wins.
    pub name_collisions: Vec<String>,
    /// Cross-video means, when aggregation is enabled.
    pub overall: Option<MetricSummary>,
    pub overall_report_path: Option<PathBuf>,
}

impl BatchReport {
    pub fn total_frames(&self) -> usize {
        self.videos.iter().map(|v| v.frames).sum()
    }
}

/// Thread-safe progress reporting for the batch runner.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// Video `index` (zero-based) of `total_videos` is starting.
    fn begin_video(&self, _filename: &str, _index: usize, _total_videos: usize) {}

    /// The current video opened; `total_frames` is the container's frame
    /// count, if it reports one.
    fn video_opened(&self, _total_frames: Option<usize>) {}

    /// `frames_done` frames of the current video are processed.
    fn advance(&self, _frames_done: usize) {}

    /// The current video is finished (or was skipped).
    fn finish_video(&self) {}
}

/// No-op progress reporter, used when `run_batch` delegates.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
