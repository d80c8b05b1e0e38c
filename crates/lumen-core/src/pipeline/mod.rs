pub mod batch;
pub mod config;
pub mod frame;
mod types;
pub mod video;

pub use batch::{run_batch, run_batch_reported, BatchRunner};
pub use frame::FrameProcessor;
pub use types::{BatchReport, NoOpReporter, ProgressReporter, SkippedVideo, VideoReport};
pub use video::VideoProcessor;
