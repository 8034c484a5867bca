//! Sampled min, max and mean of a frame, used to drive the stretch.

use tracing::debug;

use crate::image_pipeline::pixels::{Channels, PixelArray, PixelOrder};
use crate::image_pipeline::stretch::sampling::for_each_sample;

/// Sampled pixel statistics, luminance based for colour frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Largest value representable at `bits_per_pixel`.
pub fn bit_depth_max(bits_per_pixel: u32) -> f64 {
    2f64.powi(bits_per_pixel.min(64) as i32) - 1.0
}

impl PixelStats {
    /// Full-range statistics used when nothing usable was sampled.
    pub fn fallback(bits_per_pixel: u32) -> Self {
        let max = bit_depth_max(bits_per_pixel);
        Self {
            min: 0.0,
            max,
            mean: max / 2.0,
        }
    }
}

/// Computes min, max and mean over the sampling grid.
///
/// Non-finite samples are ignored. An empty frame, or one with no finite
/// samples, yields [`PixelStats::fallback`].
pub fn compute_stats(
    data: &PixelArray<'_>,
    width: usize,
    height: usize,
    channels: Channels,
    order: PixelOrder,
    bits_per_pixel: u32,
) -> PixelStats {
    if width == 0 || height == 0 || data.is_empty() {
        return PixelStats::fallback(bits_per_pixel);
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut count = 0usize;

    for_each_sample(data, width, height, channels, order, |v| {
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
            sum += v;
            count += 1;
        }
    });

    if count == 0 {
        debug!(width, height, "No finite samples, using fallback statistics");
        return PixelStats::fallback(bits_per_pixel);
    }

    let mean = (sum / count as f64).clamp(min, max);
    debug!(min, max, mean, samples = count, "Computed pixel statistics");
    PixelStats { min, max, mean }
}
