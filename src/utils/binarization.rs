//! Ink/background separation
//!
//! Works on [`InkGrid`]s, where ink is always the bright side, so one code
//! path serves both polarities.

use crate::models::{BitMatrix, InkGrid};

/// Summed-area table over a grid, `(width + 1) x (height + 1)` entries
pub struct IntegralImage {
    width: usize,
    height: usize,
    sums: Vec<u64>,
}

impl IntegralImage {
    /// Build the table
    pub fn new(values: &[u8], width: usize, height: usize) -> Self {
        let stride = width + 1;
        let mut sums = vec![0u64; stride * (height + 1)];
        for y in 0..height {
            let mut row_sum = 0u64;
            for x in 0..width {
                row_sum += values[y * width + x] as u64;
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row_sum;
            }
        }
        Self {
            width,
            height,
            sums,
        }
    }

    /// Sum and pixel count of the window centered on (x, y), clipped to the grid
    pub fn window(&self, x: usize, y: usize, radius: usize) -> (u64, u64) {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius + 1).min(self.width);
        let y1 = (y + radius + 1).min(self.height);
        let stride = self.width + 1;
        let sum = self.sums[y1 * stride + x1] + self.sums[y0 * stride + x0]
            - self.sums[y0 * stride + x1]
            - self.sums[y1 * stride + x0];
        (sum, ((x1 - x0) * (y1 - y0)) as u64)
    }
}

/// Window radius used by [`adaptive_binarize`] for a frame of this size
pub fn adaptive_radius(width: usize, height: usize) -> usize {
    (width.min(height) / 10).max(8)
}

/// Mark pixels whose ink exceeds the local mean by more than `constant`.
///
/// The comparison is done on integer sums (`ink * n > sum + constant * n`),
/// so a frame and its exact tonal inverse binarize identically once each is
/// read under the matching polarity.
pub fn adaptive_binarize(ink: &InkGrid, radius: usize, constant: u8) -> BitMatrix {
    let (width, height) = (ink.width(), ink.height());
    let integral = IntegralImage::new(ink.data(), width, height);
    let mut binary = BitMatrix::new(width, height);
    let constant = constant as u64;

    for y in 0..height {
        for x in 0..width {
            let (sum, count) = integral.window(x, y, radius);
            let value = ink.get(x, y) as u64;
            if value * count > sum + constant * count {
                binary.set(x, y, true);
            }
        }
    }

    binary
}

/// Otsu's optimal threshold over a histogram of 256 bins.
///
/// Returns the smallest level `t` such that values `>= t` form the upper
/// class, or `None` when the histogram holds a single level.
pub fn otsu_threshold(histogram: &[u32; 256]) -> Option<u8> {
    let total: u64 = histogram.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return None;
    }
    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut best: Option<(f64, u8)> = None;
    let mut lower_count = 0u64;
    let mut lower_sum = 0f64;

    for threshold in 1..256usize {
        lower_count += histogram[threshold - 1] as u64;
        lower_sum += (threshold - 1) as f64 * histogram[threshold - 1] as f64;
        let upper_count = total - lower_count;
        if lower_count == 0 || upper_count == 0 {
            continue;
        }
        let lower_mean = lower_sum / lower_count as f64;
        let upper_mean = (weighted_total - lower_sum) / upper_count as f64;
        let variance =
            lower_count as f64 * upper_count as f64 * (lower_mean - upper_mean).powi(2);
        if best.is_none_or(|(v, _)| variance > v) {
            best = Some((variance, threshold as u8));
        }
    }

    best.map(|(_, t)| t)
}
