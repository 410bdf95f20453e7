pub mod ffmpeg;
pub mod image_seq;
pub mod ser;
pub mod source;

pub use source::{effective_fps, open_source, FrameSource};
