use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MotionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Frame shapes differ: {left:?} vs {right:?}")]
    DimensionMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("Could not open video source {path}: {reason}")]
    SourceOpen { path: PathBuf, reason: String },

    #[error("Could not read first frame: {path}")]
    EmptySource { path: PathBuf },

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Frame decode failed: {0}")]
    FrameDecode(String),

    #[error("No frame has been grabbed yet")]
    NothingGrabbed,

    #[error("ffmpeg error: {0}")]
    Ffmpeg(String),

    #[error("Invalid score list: {0}")]
    InvalidScores(String),

    #[error("Invalid segment record: start {start} > end {end}")]
    InvalidSegment { start: usize, end: usize },

    #[error("Invalid config value: {0}")]
    InvalidConfig(String),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MotionError>;
