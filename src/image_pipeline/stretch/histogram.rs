//! Binned value distribution of a frame for the histogram display.

use crate::image_pipeline::pixels::{Channels, PixelArray, PixelOrder};
use crate::image_pipeline::stretch::sampling::for_each_sample;

/// Bins sampled values (luminance for colour frames) over `[min, max]`.
///
/// Uses the same grid as the statistics. Values outside the range land in
/// the first or last bin, NaN samples are skipped, and a non-positive range
/// yields all-zero bins.
#[allow(clippy::too_many_arguments)]
pub fn histogram(
    data: &PixelArray<'_>,
    width: usize,
    height: usize,
    min: f64,
    max: f64,
    bin_count: usize,
    channels: Channels,
    order: PixelOrder,
) -> Vec<u32> {
    let mut bins = vec![0u32; bin_count];
    let range = max - min;
    if bin_count == 0 || !(range > 0.0) {
        return bins;
    }

    let scale = (bin_count - 1) as f64 / range;
    let last = (bin_count - 1) as f64;
    for_each_sample(data, width, height, channels, order, |v| {
        if v.is_nan() {
            return;
        }
        let bin = ((v - min) * scale).floor().clamp(0.0, last) as usize;
        bins[bin] += 1;
    });
    bins
}
