#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use ndarray::Array2;

use lumen_core::error::{LumenError, Result};
use lumen_core::frame::{ColorFrame, Frame, SourceInfo};
use lumen_core::io::source::{FrameSource, MemorySource, SourceOpener};

type SourceFactory = Box<dyn Fn(&Path) -> Box<dyn FrameSource> + Send + Sync>;

/// In-memory videos served by file name through a [`SourceOpener`].
///
/// `install` writes an empty placeholder file per video so directory listing
/// finds it. Files in the input directory without an entry fail to open.
#[derive(Default)]
pub struct VideoLibrary {
    videos: HashMap<String, SourceFactory>,
}

impl VideoLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// A video that decodes `frames` and then ends.
    pub fn video(mut self, name: &str, frames: Vec<ColorFrame>) -> Self {
        self.videos.insert(
            name.to_string(),
            Box::new(move |path: &Path| -> Box<dyn FrameSource> {
                Box::new(MemorySource::new(path, frames.clone()))
            }),
        );
        self
    }

    /// A video that decodes `frames` and then fails.
    pub fn failing(mut self, name: &str, frames: Vec<ColorFrame>) -> Self {
        self.videos.insert(
            name.to_string(),
            Box::new(move |path: &Path| -> Box<dyn FrameSource> {
                Box::new(FailingSource::new(path, frames.clone()))
            }),
        );
        self
    }

    pub fn install(self, dir: &Path) -> SourceOpener {
        for name in self.videos.keys() {
            std::fs::write(dir.join(name), b"").expect("write placeholder video");
        }
        let videos = self.videos;
        Arc::new(move |path: &Path| {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            match videos.get(name) {
                Some(factory) => Ok(factory(path)),
                None => Err(LumenError::VideoOpen {
                    path: path.display().to_string(),
                    reason: "unsupported container".into(),
                }),
            }
        })
    }
}

/// Yields its frames, then a decode error on every later call.
pub struct FailingSource {
    frames: MemorySource,
    info: SourceInfo,
}

impl FailingSource {
    pub fn new(name: &Path, frames: Vec<ColorFrame>) -> Self {
        let frames = MemorySource::new(name, frames);
        let info = frames.info().clone();
        Self { frames, info }
    }
}

impl FrameSource for FailingSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Result<Option<ColorFrame>> {
        match self.frames.next_frame()? {
            Some(frame) => Ok(Some(frame)),
            None => Err(LumenError::Decode("corrupt packet".into())),
        }
    }
}

/// `count` noise frames of `width`x`height`, seeded from `seed`.
pub fn noise_video(count: u64, width: usize, height: usize, seed: u64) -> Vec<ColorFrame> {
    (0..count)
        .map(|i| gray_color(&noise_frame(width, height, seed + i)))
        .collect()
}

/// Deterministic pseudo-random 8-bit samples.
pub fn noise_samples(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 56) as u8
        })
        .collect()
}

/// Horizontal ramp from `lo` to `hi`.
pub fn gradient_frame(width: usize, height: usize, lo: u8, hi: u8) -> Frame {
    let span = (hi - lo) as f64;
    let denom = (width.max(2) - 1) as f64;
    Frame::new(Array2::from_shape_fn((height, width), |(_, col)| {
        (lo as f64 + span * col as f64 / denom).round() as u8
    }))
}

pub fn constant_frame(width: usize, height: usize, value: u8) -> Frame {
    Frame::new(Array2::from_elem((height, width), value))
}

pub fn noise_frame(width: usize, height: usize, seed: u64) -> Frame {
    Frame::from_raw(width, height, noise_samples(width * height, seed)).expect("noise frame")
}

pub fn gray_color(frame: &Frame) -> ColorFrame {
    ColorFrame::from_gray(frame)
}
