use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use lumen_core::pipeline::ProgressReporter;

/// One progress bar per video; a spinner when the frame count is unknown.
#[derive(Default)]
pub struct BarReporter {
    bar: Mutex<Option<ProgressBar>>,
    label: Mutex<String>,
}

impl BarReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(ref bar) = *guard {
                f(bar);
            }
        }
    }
}

impl ProgressReporter for BarReporter {
    fn begin_video(&self, filename: &str, index: usize, total_videos: usize) {
        if let Ok(mut label) = self.label.lock() {
            *label = format!("[{}/{}] {}", index + 1, total_videos, filename);
        }
    }

    fn video_opened(&self, total_frames: Option<usize>) {
        let label = self.label.lock().map(|l| l.clone()).unwrap_or_default();
        let bar = match total_frames {
            Some(n) => {
                let bar = ProgressBar::new(n as u64);
                if let Ok(style) = ProgressStyle::default_bar()
                    .template("{msg:30} [{bar:40}] {pos}/{len} frames")
                {
                    bar.set_style(style.progress_chars("=> "));
                }
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                if let Ok(style) =
                    ProgressStyle::default_spinner().template("{msg:30} {spinner} {pos} frames")
                {
                    bar.set_style(style);
                }
                bar
            }
        };
        bar.set_message(label);

        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn advance(&self, frames_done: usize) {
        self.with_bar(|bar| bar.set_position(frames_done as u64));
    }

    fn finish_video(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish();
            }
        }
    }
}
