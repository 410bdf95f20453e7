use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_MAX_WIDTH, DEFAULT_MERGE_GAP_FRAMES, DEFAULT_MIN_SEGMENT_FRAMES, DEFAULT_SENSITIVITY,
    DEFAULT_TILE_GRID,
};
use crate::error::MotionError;

/// Which score function reduces a frame pair to a motion intensity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionMode {
    /// Whole-frame mean of the blurred difference.
    Global,
    /// Mean of the most active tiles of a tile grid.
    #[default]
    Detail,
}

impl fmt::Display for MotionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "Global"),
            Self::Detail => write!(f, "Detail"),
        }
    }
}

impl FromStr for MotionMode {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "detail" => Ok(Self::Detail),
            other => Err(MotionError::InvalidConfig(format!(
                "unknown motion mode '{other}'"
            ))),
        }
    }
}

/// Rows x columns partition used by the detail score.
///
/// Accepts `"8x8"`, `"8,8"` or `"8"` as text, a bare integer, or a
/// `[rows, cols]` pair. Counts below 1 are raised to 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TileGridRepr", into = "String")]
pub struct TileGrid {
    pub rows: usize,
    pub cols: usize,
}

impl TileGrid {
    pub fn new(rows: i64, cols: i64) -> Self {
        Self {
            rows: rows.max(1) as usize,
            cols: cols.max(1) as usize,
        }
    }

    pub fn square(n: i64) -> Self {
        Self::new(n, n)
    }

    pub fn tile_count(&self) -> usize {
        self.rows * self.cols
    }
}

impl Default for TileGrid {
    fn default() -> Self {
        Self {
            rows: DEFAULT_TILE_GRID,
            cols: DEFAULT_TILE_GRID,
        }
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

impl FromStr for TileGrid {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        let parse = |part: &str| -> Result<i64, MotionError> {
            part.parse::<i64>()
                .map_err(|_| MotionError::InvalidConfig(format!("tile grid '{s}'")))
        };

        if let Some((a, b)) = compact.split_once('x').or_else(|| compact.split_once(',')) {
            Ok(Self::new(parse(a)?, parse(b)?))
        } else {
            Ok(Self::square(parse(&compact)?))
        }
    }
}

impl From<TileGrid> for String {
    fn from(grid: TileGrid) -> Self {
        grid.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TileGridRepr {
    Square(i64),
    Pair([i64; 2]),
    Text(String),
}

impl TryFrom<TileGridRepr> for TileGrid {
    type Error = MotionError;

    fn try_from(repr: TileGridRepr) -> Result<Self, Self::Error> {
        match repr {
            TileGridRepr::Square(n) => Ok(Self::square(n)),
            TileGridRepr::Pair([rows, cols]) => Ok(Self::new(rows, cols)),
            TileGridRepr::Text(s) => s.parse(),
        }
    }
}

/// Parameters of one detection run. Immutable once the run starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// A frame is in motion when its score is at or above this value.
    pub sensitivity: f64,
    /// Merged segments shorter than this are dropped.
    pub min_segment_frames: usize,
    /// Segments separated by at most this many still frames are joined.
    pub merge_gap_frames: usize,
    /// Only every Nth frame is decoded and scored.
    pub sample_every_n: usize,
    pub tile_grid: TileGrid,
    pub motion_mode: MotionMode,
    /// Frames wider than this are downscaled before scoring.
    pub max_width: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            min_segment_frames: DEFAULT_MIN_SEGMENT_FRAMES,
            merge_gap_frames: DEFAULT_MERGE_GAP_FRAMES,
            sample_every_n: 1,
            tile_grid: TileGrid::default(),
            motion_mode: MotionMode::default(),
            max_width: DEFAULT_MAX_WIDTH,
        }
    }
}

impl DetectionConfig {
    /// Clamp every field into its valid range instead of rejecting the config.
    pub fn normalized(&self) -> Self {
        let sensitivity = if self.sensitivity.is_finite() {
            self.sensitivity
        } else {
            DEFAULT_SENSITIVITY
        };
        Self {
            sensitivity,
            sample_every_n: self.sample_every_n.max(1),
            tile_grid: TileGrid {
                rows: self.tile_grid.rows.max(1),
                cols: self.tile_grid.cols.max(1),
            },
            max_width: self.max_width.max(1),
            ..self.clone()
        }
    }
}
