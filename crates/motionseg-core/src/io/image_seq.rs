use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::error::{MotionError, Result};
use crate::frame::{ColorFrame, SourceInfo, SourceKind};

use super::source::FrameSource;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp"];

/// A directory of still images played back in filename order.
pub struct ImageSequenceSource {
    dir: PathBuf,
    files: Vec<PathBuf>,
    fps: Option<f64>,
    next: usize,
    grabbed: Option<usize>,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| MotionError::SourceOpen {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image(p))
            .collect();
        files.sort();

        Ok(Self {
            dir: dir.to_path_buf(),
            files,
            fps: None,
            next: 0,
            grabbed: None,
        })
    }

    /// Image files carry no timing; the caller may supply a frame rate.
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

impl FrameSource for ImageSequenceSource {
    fn info(&self) -> SourceInfo {
        let (width, height) = self
            .files
            .first()
            .and_then(|p| image::image_dimensions(p).ok())
            .unwrap_or((0, 0));
        SourceInfo {
            path: self.dir.clone(),
            kind: SourceKind::ImageSequence,
            width,
            height,
            frame_count: Some(self.files.len()),
            fps: self.fps,
        }
    }

    fn grab(&mut self) -> Result<bool> {
        if self.next >= self.files.len() {
            return Ok(false);
        }
        self.grabbed = Some(self.next);
        self.next += 1;
        Ok(true)
    }

    fn retrieve(&mut self) -> Result<ColorFrame> {
        let index = self.grabbed.ok_or(MotionError::NothingGrabbed)?;
        let img = image::open(&self.files[index])?.to_rgb32f();
        let (w, h) = img.dimensions();
        let (w, h) = (w as usize, h as usize);

        let mut red = Array2::<f32>::zeros((h, w));
        let mut green = Array2::<f32>::zeros((h, w));
        let mut blue = Array2::<f32>::zeros((h, w));
        for (x, y, px) in img.enumerate_pixels() {
            let (row, col) = (y as usize, x as usize);
            red[[row, col]] = px.0[0];
            green[[row, col]] = px.0[1];
            blue[[row, col]] = px.0[2];
        }
        Ok(ColorFrame { red, green, blue })
    }
}
