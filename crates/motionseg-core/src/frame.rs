use ndarray::Array2;
use std::path::PathBuf;

/// A single-channel intensity frame.
/// Pixel values are f32 in [0.0, 1.0].
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
}

impl Frame {
    pub fn new(data: Array2<f32>) -> Self {
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }
}

/// Color image composed of separate channel planes, as delivered by a frame source.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorFrame {
    pub red: Array2<f32>,
    pub green: Array2<f32>,
    pub blue: Array2<f32>,
}

impl ColorFrame {
    /// A color frame whose three channels carry the same intensity plane.
    pub fn from_gray(plane: Array2<f32>) -> Self {
        Self {
            red: plane.clone(),
            green: plane.clone(),
            blue: plane,
        }
    }

    /// Build from interleaved 8-bit RGB bytes (`rgb24`).
    pub fn from_rgb8(raw: &[u8], height: usize, width: usize) -> Self {
        let mut red = Array2::<f32>::zeros((height, width));
        let mut green = Array2::<f32>::zeros((height, width));
        let mut blue = Array2::<f32>::zeros((height, width));

        for row in 0..height {
            for col in 0..width {
                let idx = (row * width + col) * 3;
                red[[row, col]] = raw[idx] as f32 / 255.0;
                green[[row, col]] = raw[idx + 1] as f32 / 255.0;
                blue[[row, col]] = raw[idx + 2] as f32 / 255.0;
            }
        }

        Self { red, green, blue }
    }

    pub fn width(&self) -> usize {
        self.red.ncols()
    }

    pub fn height(&self) -> usize {
        self.red.nrows()
    }
}

/// Which kind of container a source reads from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Ser,
    ImageSequence,
    Ffmpeg,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ser => write!(f, "SER"),
            Self::ImageSequence => write!(f, "Image sequence"),
            Self::Ffmpeg => write!(f, "ffmpeg"),
        }
    }
}

/// Metadata about a video source.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub width: u32,
    pub height: u32,
    pub frame_count: Option<usize>,
    pub fps: Option<f64>,
}
