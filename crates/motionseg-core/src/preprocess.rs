use ndarray::{Array2, Zip};

use crate::consts::{LUMINANCE_B, LUMINANCE_G, LUMINANCE_R};
use crate::filters::area_resize::resize_area;
use crate::frame::{ColorFrame, Frame};

/// Convert a color frame to BT.601 luminance.
pub fn luminance(color: &ColorFrame) -> Array2<f32> {
    let mut data = Array2::<f32>::zeros(color.red.dim());
    Zip::from(&mut data)
        .and(&color.red)
        .and(&color.green)
        .and(&color.blue)
        .for_each(|out, &r, &g, &b| {
            *out = LUMINANCE_R * r + LUMINANCE_G * g + LUMINANCE_B * b;
        });
    data
}

/// Output dimensions `(height, width)` after limiting the width to `max_width`.
pub fn working_size(height: usize, width: usize, max_width: usize) -> (usize, usize) {
    if max_width == 0 || width <= max_width {
        return (height, width);
    }
    let scale = max_width as f64 / width as f64;
    let new_h = ((height as f64 * scale) as usize).max(1);
    (new_h, max_width)
}

/// Grayscale + optional area downscale so frames wider than `max_width`
/// are scored at a bounded working resolution.
///
/// # Panics
/// Panics on an empty frame; sources never produce one.
pub fn preprocess(color: &ColorFrame, max_width: usize) -> Frame {
    assert!(
        color.width() > 0 && color.height() > 0,
        "cannot preprocess an empty frame"
    );
    let gray = luminance(color);
    let (h, w) = gray.dim();
    let (new_h, new_w) = working_size(h, w, max_width);
    if (new_h, new_w) == (h, w) {
        Frame::new(gray)
    } else {
        Frame::new(resize_area(&gray, new_h, new_w))
    }
}
