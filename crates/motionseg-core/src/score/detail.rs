use ndarray::{s, Array2};

use crate::consts::DETAIL_TOP_FRACTION;
use crate::error::Result;
use crate::frame::Frame;
use crate::pipeline::config::TileGrid;

use super::diff::blurred_abs_diff;

/// Pixel bounds `[start, end)` of each of `count` bands over `len` pixels.
/// Bands are `len / count` wide; the last band absorbs the remainder.
/// `count` is capped at `len` so no band is ever empty.
pub fn band_bounds(len: usize, count: usize) -> Vec<(usize, usize)> {
    let count = count.clamp(1, len.max(1));
    let step = (len / count).max(1);
    (0..count)
        .map(|i| {
            let start = i * step;
            let end = if i + 1 == count { len } else { (i + 1) * step };
            (start, end)
        })
        .collect()
}

/// Mean value of every tile of `grid` over `data`, row-major.
pub fn tile_means(data: &Array2<f32>, grid: &TileGrid) -> Vec<f64> {
    let (h, w) = data.dim();
    let row_bands = band_bounds(h, grid.rows);
    let col_bands = band_bounds(w, grid.cols);

    let mut means = Vec::with_capacity(row_bands.len() * col_bands.len());
    for &(y0, y1) in &row_bands {
        for &(x0, x1) in &col_bands {
            let tile = data.slice(s![y0..y1, x0..x1]);
            let sum: f64 = tile.iter().map(|&v| v as f64).sum();
            means.push(sum / tile.len().max(1) as f64);
        }
    }
    means
}

/// Number of tiles averaged out of `tile_count`: 15% rounded up, at least one.
pub fn top_count(tile_count: usize) -> usize {
    ((tile_count as f64 * DETAIL_TOP_FRACTION).ceil() as usize).clamp(1, tile_count.max(1))
}

/// Mean of the `k` largest values, found by selection rather than a full sort.
pub fn mean_of_top_k(values: &mut [f64], k: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let k = k.clamp(1, values.len());
    let pivot = values.len() - k;
    values.select_nth_unstable_by(pivot, |a, b| a.total_cmp(b));
    values[pivot..].iter().sum::<f64>() / k as f64
}

/// Tile-localized motion score.
///
/// The blurred difference is split into a rows x cols grid and the score is
/// the mean of the most active ~15% of tiles, so a blink in one corner is not
/// averaged away by an otherwise static frame.
pub fn score_detail(prev: &Frame, curr: &Frame, grid: &TileGrid) -> Result<f64> {
    let diff = blurred_abs_diff(prev, curr)?;
    let mut means = tile_means(&diff, grid);
    let k = top_count(means.len());
    Ok(mean_of_top_k(&mut means, k))
}
