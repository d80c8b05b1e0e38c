pub mod ffmpeg;
pub mod image_io;
pub mod source;
