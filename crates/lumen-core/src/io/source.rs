use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{LumenError, Result};
use crate::frame::{ColorFrame, SourceInfo};

use super::ffmpeg::FfmpegSource;

/// A decoded stream of color frames.
///
/// Sources release whatever they hold (decoder processes, pipes) when
/// dropped.
pub trait FrameSource {
    fn info(&self) -> &SourceInfo;

    /// The next frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<ColorFrame>>;
}

/// Opens the frame source for a video path.
pub type SourceOpener = Arc<dyn Fn(&Path) -> Result<Box<dyn FrameSource>> + Send + Sync>;

/// Open a video file through ffmpeg.
pub fn open_source(path: &Path) -> Result<Box<dyn FrameSource>> {
    if !path.is_file() {
        return Err(LumenError::VideoOpen {
            path: path.display().to_string(),
            reason: "file not found".into(),
        });
    }
    Ok(Box::new(FfmpegSource::open(path)?))
}

/// The opener used unless a caller injects its own.
pub fn default_opener() -> SourceOpener {
    Arc::new(open_source)
}

/// Frames already held in memory.
pub struct MemorySource {
    info: SourceInfo,
    frames: VecDeque<ColorFrame>,
}

impl MemorySource {
    pub fn new(name: impl Into<PathBuf>, frames: Vec<ColorFrame>) -> Self {
        let (h, w) = frames.first().map(|f| f.dim()).unwrap_or((0, 0));
        Self {
            info: SourceInfo {
                filename: name.into(),
                width: w as u32,
                height: h as u32,
                total_frames: Some(frames.len()),
                fps: None,
            },
            frames: frames.into(),
        }
    }
}

impl FrameSource for MemorySource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Result<Option<ColorFrame>> {
        Ok(self.frames.pop_front())
    }
}
