use thiserror::Error;

#[derive(Error, Debug)]
pub enum LumenError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Cannot open video {path}: {reason}")]
    VideoOpen { path: String, reason: String },

    #[error("Frame decode error: {0}")]
    Decode(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Frame size mismatch: {left:?} vs {right:?}")]
    DimensionMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("Median kernel size must be odd and positive, got {0}")]
    InvalidKernel(usize),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Chart rendering error: {0}")]
    Plot(String),

    #[error("ffprobe output error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LumenError>;
