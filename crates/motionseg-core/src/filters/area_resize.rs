use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Source contributions `(source index, weight)` for each destination sample.
fn area_weights(src_len: usize, dst_len: usize) -> Vec<Vec<(usize, f32)>> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let lo = d as f64 * scale;
            let hi = ((d + 1) as f64 * scale).min(src_len as f64);
            let first = lo.floor() as usize;
            let last = (hi.ceil() as usize).min(src_len);
            (first..last)
                .filter_map(|s| {
                    let overlap = (hi.min((s + 1) as f64) - lo.max(s as f64)).max(0.0);
                    (overlap > 0.0).then_some((s, (overlap / (hi - lo)) as f32))
                })
                .collect()
        })
        .collect()
}

/// Resize by pixel-area averaging: every destination pixel is the coverage-weighted
/// mean of the source pixels its footprint overlaps.
pub fn resize_area(data: &Array2<f32>, new_h: usize, new_w: usize) -> Array2<f32> {
    let (h, w) = data.dim();
    let new_h = new_h.max(1);
    let new_w = new_w.max(1);
    if (h, w) == (new_h, new_w) {
        return data.clone();
    }

    let col_weights = area_weights(w, new_w);
    let row_weights = area_weights(h, new_h);

    // Horizontal pass: (h, w) -> (h, new_w)
    let mut horizontal = Array2::<f32>::zeros((h, new_w));
    let fill_row = |row: usize, out: &mut ndarray::ArrayViewMut1<f32>| {
        for (dc, taps) in col_weights.iter().enumerate() {
            out[dc] = taps.iter().map(|&(sc, wt)| data[[row, sc]] * wt).sum();
        }
    };
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        horizontal
            .axis_iter_mut(ndarray::Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(row, mut out)| fill_row(row, &mut out));
    } else {
        for (row, mut out) in horizontal.axis_iter_mut(ndarray::Axis(0)).enumerate() {
            fill_row(row, &mut out);
        }
    }

    // Vertical pass: (h, new_w) -> (new_h, new_w)
    let mut result = Array2::<f32>::zeros((new_h, new_w));
    for (dr, taps) in row_weights.iter().enumerate() {
        for col in 0..new_w {
            result[[dr, col]] = taps.iter().map(|&(sr, wt)| horizontal[[sr, col]] * wt).sum();
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_integer_factor_is_block_mean() {
        let data = Array2::from_shape_vec((2, 4), vec![0.0, 1.0, 0.2, 0.4, 1.0, 0.0, 0.6, 0.8])
            .unwrap();
        let out = resize_area(&data, 1, 2);
        assert_eq!(out.dim(), (1, 2));
        assert_abs_diff_eq!(out[[0, 0]], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(out[[0, 1]], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_fractional_factor_weights_partial_pixels() {
        // 3 -> 2: dst 0 covers src 0 fully and half of src 1.
        let data = Array2::from_shape_vec((1, 3), vec![0.0, 0.6, 0.9]).unwrap();
        let out = resize_area(&data, 1, 2);
        assert_abs_diff_eq!(out[[0, 0]], (0.0 + 0.5 * 0.6) / 1.5, epsilon = 1e-6);
        assert_abs_diff_eq!(out[[0, 1]], (0.5 * 0.6 + 0.9) / 1.5, epsilon = 1e-6);
    }

    #[test]
    fn test_flat_stays_flat() {
        let data = Array2::<f32>::from_elem((30, 50), 0.7);
        let out = resize_area(&data, 13, 21);
        for v in out.iter() {
            assert_abs_diff_eq!(*v, 0.7, epsilon = 1e-5);
        }
    }
}
