pub mod detail;
pub mod diff;
pub mod global;

use crate::error::Result;
use crate::frame::Frame;
use crate::pipeline::config::{MotionMode, TileGrid};

/// Score a pair of consecutive preprocessed frames with the selected strategy.
pub fn score_pair(prev: &Frame, curr: &Frame, mode: MotionMode, grid: &TileGrid) -> Result<f64> {
    match mode {
        MotionMode::Global => global::score_global(prev, curr),
        MotionMode::Detail => detail::score_detail(prev, curr, grid),
    }
}
