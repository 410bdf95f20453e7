use ndarray::{Array2, Zip};

use crate::consts::{DIFF_BLUR_KSIZE, DIFF_BLUR_SIGMA};
use crate::error::{MotionError, Result};
use crate::filters::gaussian_blur::gaussian_blur_array;
use crate::frame::Frame;

/// Per-pixel absolute difference of two frames, lightly blurred so isolated
/// single-pixel flicker does not register as motion.
pub fn blurred_abs_diff(prev: &Frame, curr: &Frame) -> Result<Array2<f32>> {
    if prev.dim() != curr.dim() {
        return Err(MotionError::DimensionMismatch {
            left: prev.dim(),
            right: curr.dim(),
        });
    }

    let mut diff = Array2::<f32>::zeros(prev.dim());
    Zip::from(&mut diff)
        .and(&prev.data)
        .and(&curr.data)
        .for_each(|d, &a, &b| *d = (a - b).abs());

    Ok(gaussian_blur_array(&diff, DIFF_BLUR_KSIZE, DIFF_BLUR_SIGMA))
}
