use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Apply a `ksize` x `ksize` Gaussian blur using separable 1D convolution.
///
/// Borders are reflected without repeating the edge sample (`dcb|abcd|cba`).
pub fn gaussian_blur_array(data: &Array2<f32>, ksize: usize, sigma: f32) -> Array2<f32> {
    let kernel = make_gaussian_kernel(ksize, sigma);
    let row_pass = convolve(data, &kernel, Axis::Cols);
    convolve(&row_pass, &kernel, Axis::Rows)
}

/// Normalized 1D Gaussian kernel. Even sizes are bumped to the next odd size.
pub fn make_gaussian_kernel(ksize: usize, sigma: f32) -> Vec<f32> {
    let size = ksize.max(1) | 1;
    let radius = size / 2;
    let mut kernel = vec![0.0f32; size];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        *k = (-x * x / s2).exp();
        sum += *k;
    }

    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

#[derive(Clone, Copy)]
enum Axis {
    Rows,
    Cols,
}

/// Mirror an out-of-range index back into `[0, len)` without repeating the edge.
fn reflect_101(idx: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let period = 2 * last;
    let mut i = idx.rem_euclid(period);
    if i > last {
        i = period - i;
    }
    i as usize
}

fn convolve(data: &Array2<f32>, kernel: &[f32], axis: Axis) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() as isize / 2;

    let sample = |row: usize, col: usize| -> f32 {
        let mut sum = 0.0f32;
        for (ki, &kv) in kernel.iter().enumerate() {
            let offset = ki as isize - radius;
            let v = match axis {
                Axis::Cols => data[[row, reflect_101(col as isize + offset, w)]],
                Axis::Rows => data[[reflect_101(row as isize + offset, h), col]],
            };
            sum += v * kv;
        }
        sum
    };

    let mut result = Array2::<f32>::zeros((h, w));
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        result
            .axis_iter_mut(ndarray::Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, mut out)| {
                for col in 0..w {
                    out[col] = sample(row, col);
                }
            });
    } else {
        for row in 0..h {
            for col in 0..w {
                result[[row, col]] = sample(row, col);
            }
        }
    }
    result
}
