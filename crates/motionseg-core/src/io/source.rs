use std::path::Path;

use tracing::warn;

use crate::consts::FALLBACK_FPS;
use crate::error::{MotionError, Result};
use crate::frame::{ColorFrame, SourceInfo};

use super::ffmpeg::FfmpegSource;
use super::image_seq::ImageSequenceSource;
use super::ser::SerSource;

/// Sequential access to the frames of a video.
///
/// `grab` advances past a frame without decoding it; `retrieve` decodes the
/// frame most recently grabbed. Skipping frames therefore costs no decode.
/// Implementations release their underlying handle on drop.
pub trait FrameSource {
    fn info(&self) -> SourceInfo;

    /// Advance one frame. `Ok(false)` means the stream is exhausted.
    fn grab(&mut self) -> Result<bool>;

    /// Decode the most recently grabbed frame.
    fn retrieve(&mut self) -> Result<ColorFrame>;

    /// Grab and decode the next frame.
    fn read(&mut self) -> Result<Option<ColorFrame>> {
        if !self.grab()? {
            return Ok(None);
        }
        self.retrieve().map(Some)
    }
}

/// The reported frame rate, or [`FALLBACK_FPS`] when it is missing or unusable.
pub fn effective_fps(reported: Option<f64>) -> f64 {
    match reported {
        Some(fps) if fps.is_finite() && fps > 0.0 => fps,
        other => {
            warn!(reported = ?other, fallback = FALLBACK_FPS, "Unusable frame rate, using fallback");
            FALLBACK_FPS
        }
    }
}

/// Open a source by path: a directory is read as an image sequence, `.ser`
/// files through the SER reader, anything else through ffmpeg.
pub fn open_source(path: &Path) -> Result<Box<dyn FrameSource>> {
    if path.is_dir() {
        return Ok(Box::new(ImageSequenceSource::open(path)?));
    }
    if !path.exists() {
        return Err(MotionError::SourceOpen {
            path: path.to_path_buf(),
            reason: "no such file or directory".into(),
        });
    }
    let is_ser = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ser"));
    if is_ser {
        Ok(Box::new(SerSource::open(path)?))
    } else {
        Ok(Box::new(FfmpegSource::open(path)?))
    }
}
