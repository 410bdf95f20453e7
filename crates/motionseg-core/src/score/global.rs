use crate::error::Result;
use crate::frame::Frame;

use super::diff::blurred_abs_diff;

/// Whole-frame motion score: mean of the blurred absolute difference.
///
/// Pixels are already normalized to [0, 1], so the mean is on the same scale
/// as an 8-bit difference divided by 255. Cheap, but small localized motion is
/// diluted by the static remainder of the frame.
pub fn score_global(prev: &Frame, curr: &Frame) -> Result<f64> {
    let diff = blurred_abs_diff(prev, curr)?;
    Ok(diff.iter().map(|&v| v as f64).sum::<f64>() / diff.len() as f64)
}
