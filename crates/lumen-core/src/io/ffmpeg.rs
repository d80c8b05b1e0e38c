use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::error::{LumenError, Result};
use crate::frame::{ColorFrame, SourceInfo};

use super::source::FrameSource;

/// Stream metadata reported by ffprobe.
#[derive(Clone, Debug)]
pub struct ProbeInfo {
    pub width: u32,
    pub height: u32,
    pub frame_count: Option<usize>,
    pub fps: Option<f64>,
    /// Display rotation in degrees from the display matrix or the legacy
    /// `rotate` tag. Decoding keeps the stored orientation.
    pub rotation: Option<i32>,
}

/// Run ffprobe on the first video stream of `path`.
pub fn probe(path: &Path) -> Result<ProbeInfo> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,nb_frames,r_frame_rate:stream_side_data=rotation:stream_tags=rotate",
            "-of",
            "json",
        ])
        .arg(path)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| open_error(path, format!("failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(open_error(path, format!("ffprobe failed: {}", stderr.trim())));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    debug!(path = %path.display(), output = %stdout, "ffprobe output");
    parse_probe_json(&stdout).map_err(|e| open_error(path, e.to_string()))
}

/// Parse the JSON printed by `ffprobe -of json -show_entries stream=...`.
///
/// Width and height are the coded size. Rotation metadata is reported
/// separately and never swaps them, matching `-noautorotate` decoding.
pub fn parse_probe_json(json: &str) -> Result<ProbeInfo> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let stream = &value["streams"][0];
    if stream.is_null() {
        return Err(LumenError::Decode("no video stream".into()));
    }

    let width = stream["width"]
        .as_u64()
        .ok_or_else(|| LumenError::Decode("missing width".into()))? as u32;
    let height = stream["height"]
        .as_u64()
        .ok_or_else(|| LumenError::Decode("missing height".into()))? as u32;
    if width == 0 || height == 0 {
        return Err(LumenError::InvalidDimensions { width, height });
    }

    let frame_count = stream["nb_frames"]
        .as_str()
        .and_then(|s| s.parse::<usize>().ok());
    let fps = stream["r_frame_rate"].as_str().and_then(parse_frame_rate);
    let rotation = parse_rotation(stream);

    Ok(ProbeInfo {
        width,
        height,
        frame_count,
        fps,
        rotation,
    })
}

fn parse_rotation(stream: &serde_json::Value) -> Option<i32> {
    let from_side_data = stream["side_data_list"].as_array().and_then(|list| {
        list.iter()
            .find_map(|entry| entry["rotation"].as_i64())
            .map(|r| r as i32)
    });
    from_side_data.or_else(|| {
        stream["tags"]["rotate"]
            .as_str()
            .and_then(|s| s.trim().parse::<i32>().ok())
    })
}

/// Parse a rate such as "30000/1001" or "25".
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 { None } else { Some(num / den) }
        }
        None => rate.trim().parse().ok(),
    }
}

/// The ffmpeg invocation that writes every frame of the first video stream
/// of `path` as raw `rgb24` to stdout.
///
/// Autorotation is disabled so frame sizes always match the probed coded size.
pub fn decode_command(path: &Path) -> Command {
    let mut command = Command::new("ffmpeg");
    command
        .args(["-v", "error", "-nostdin", "-noautorotate", "-i"])
        .arg(path)
        .args(["-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "rgb24", "-"]);
    command
}

fn open_error(path: &Path, reason: String) -> LumenError {
    LumenError::VideoOpen {
        path: path.display().to_string(),
        reason,
    }
}

/// Splits a byte stream of packed `rgb24` pictures into frames.
///
/// The underlying reader is dropped as soon as the stream ends, so a pipe is
/// closed without waiting for the reader itself to be dropped.
pub struct RawFrameReader<R> {
    reader: Option<R>,
    width: usize,
    height: usize,
    buffer: Vec<u8>,
    frames_read: usize,
}

impl<R: Read> RawFrameReader<R> {
    pub fn new(reader: R, width: u32, height: u32) -> Self {
        let (width, height) = (width as usize, height as usize);
        Self {
            reader: Some(reader),
            width,
            height,
            buffer: vec![0u8; width * height * 3],
            frames_read: 0,
        }
    }

    /// The next whole frame. A truncated trailing frame is dropped with a
    /// warning and ends the stream.
    pub fn read_frame(&mut self) -> Result<Option<ColorFrame>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };
        if self.buffer.is_empty() {
            self.reader = None;
            return Ok(None);
        }

        let filled = match read_full(reader, &mut self.buffer) {
            Ok(filled) => filled,
            Err(e) => {
                self.reader = None;
                return Err(e);
            }
        };
        if filled < self.buffer.len() {
            if filled > 0 {
                warn!(
                    "Dropping truncated trailing frame after {} frames ({} of {} bytes)",
                    self.frames_read,
                    filled,
                    self.buffer.len()
                );
            }
            self.reader = None;
            return Ok(None);
        }

        let mut frame = ColorFrame::from_rgb24(self.width, self.height, &self.buffer)?;
        frame.set_frame_index(self.frames_read);
        self.frames_read += 1;
        Ok(Some(frame))
    }

    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    /// True once the stream has ended and the reader was released.
    pub fn is_exhausted(&self) -> bool {
        self.reader.is_none()
    }

    /// Drop the underlying reader early.
    pub fn close(&mut self) {
        self.reader = None;
    }
}

/// Frames decoded by an ffmpeg child process writing raw `rgb24` to a pipe.
///
/// At end of stream the decoder is waited for and a failed exit status is
/// reported as [`LumenError::Decode`] carrying ffmpeg's stderr.
pub struct FfmpegSource {
    info: SourceInfo,
    frames: RawFrameReader<ChildStdout>,
    child: Option<Child>,
    stderr: Option<JoinHandle<String>>,
}

impl FfmpegSource {
    pub fn open(path: &Path) -> Result<Self> {
        let probe = probe(path)?;
        if let Some(rotation) = probe.rotation.filter(|r| r % 360 != 0) {
            info!(
                path = %path.display(),
                rotation,
                "Ignoring display rotation, frames keep the stored orientation"
            );
        }

        let info = SourceInfo {
            filename: path.to_path_buf(),
            width: probe.width,
            height: probe.height,
            total_frames: probe.frame_count,
            fps: probe.fps,
        };
        debug!(
            path = %path.display(),
            width = probe.width,
            height = probe.height,
            frames = ?probe.frame_count,
            "Opening ffmpeg decoder"
        );
        Self::spawn(decode_command(path), info)
    }

    /// Start `command` as the decoder. Its stdout must carry raw `rgb24`
    /// frames of the size given by `info`.
    pub fn spawn(mut command: Command, info: SourceInfo) -> Result<Self> {
        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| open_error(&info.filename, format!("failed to run decoder: {}", e)))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut text = String::new();
                let _ = pipe.read_to_string(&mut text);
                text
            })
        });
        let Some(stdout) = stdout else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(open_error(&info.filename, "decoder stdout unavailable".into()));
        };

        Ok(Self {
            frames: RawFrameReader::new(stdout, info.width, info.height),
            info,
            child: Some(child),
            stderr,
        })
    }

    fn collect_stderr(&mut self) -> String {
        self.stderr
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default()
    }

    /// Wait for a decoder whose output has ended and check how it exited.
    fn finish(&mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child.wait()?;
        let stderr = self.collect_stderr();
        if !status.success() {
            return Err(LumenError::Decode(format!(
                "ffmpeg exited with {} after {} frames: {}",
                status,
                self.frames.frames_read(),
                stderr.trim()
            )));
        }
        debug!(%status, frames = self.frames.frames_read(), "ffmpeg decoder exited");
        Ok(())
    }

    /// Close the pipe and stop a decoder that is still running. Safe to call
    /// more than once.
    fn release(&mut self) {
        self.frames.close();
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            match child.wait() {
                Ok(status) => debug!(%status, "ffmpeg decoder stopped"),
                Err(e) => warn!("Failed to reap ffmpeg decoder: {}", e),
            }
        }
        self.collect_stderr();
    }
}

impl FrameSource for FfmpegSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn next_frame(&mut self) -> Result<Option<ColorFrame>> {
        match self.frames.read_frame() {
            Ok(Some(frame)) => Ok(Some(frame)),
            Ok(None) => {
                self.finish()?;
                Ok(None)
            }
            Err(e) => {
                self.release();
                Err(e)
            }
        }
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        self.release();
    }
}

/// Read until `buf` is full or the stream ends; returns the bytes read.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
