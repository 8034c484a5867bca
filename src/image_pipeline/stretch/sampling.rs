//! Sparse sampling grid shared by statistics and histogram.

use crate::image_pipeline::pixels::{Channels, PixelArray, PixelOrder, Sample};

/// Frames up to this many pixels are scanned in full.
pub const FULL_SCAN_LIMIT: usize = 1_000_000;

/// Approximate sample count for larger frames.
const TARGET_SAMPLES: f64 = 1000.0;

/// Grid step used in both axes for a frame of `pixel_count` pixels.
pub fn sample_step(pixel_count: usize) -> usize {
    if pixel_count <= FULL_SCAN_LIMIT {
        return 1;
    }
    ((pixel_count as f64 / TARGET_SAMPLES).sqrt().floor() as usize).max(1)
}

/// Calls `visit` with the value of every grid sample that lies inside
/// `data`. Colour samples are the unweighted mean of R, G and B, always read
/// row-major; mono samples honour `order`.
pub(crate) fn for_each_sample(
    data: &PixelArray<'_>,
    width: usize,
    height: usize,
    channels: Channels,
    order: PixelOrder,
    mut visit: impl FnMut(f64),
) {
    let step = sample_step(width.saturating_mul(height));
    crate::with_samples!(data, |s| walk(s, width, height, step, channels, order, &mut visit))
}

fn walk<S: Sample>(
    s: &[S],
    width: usize,
    height: usize,
    step: usize,
    channels: Channels,
    order: PixelOrder,
    visit: &mut impl FnMut(f64),
) {
    for y in (0..height).step_by(step) {
        for x in (0..width).step_by(step) {
            let value = match channels {
                Channels::Mono => s.get(order.index(x, y, width, height)).map(|v| v.to_f64_lossy()),
                Channels::Rgb => {
                    let base = (y * width + x) * 3;
                    s.get(base..base + 3).map(|rgb| {
                        (rgb[0].to_f64_lossy() + rgb[1].to_f64_lossy() + rgb[2].to_f64_lossy()) / 3.0
                    })
                }
            };
            if let Some(value) = value {
                visit(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_frames_are_fully_scanned() {
        assert_eq!(sample_step(0), 1);
        assert_eq!(sample_step(1_000_000), 1);
    }

    #[test]
    fn test_large_frames_step() {
        assert_eq!(sample_step(1_000_001), 31);
        assert_eq!(sample_step(4_000_000), 63);
        assert_eq!(sample_step(16_000_000), 126);
    }

    #[test]
    fn test_mono_column_major_visit_order() {
        let data = PixelArray::from(vec![0u8, 1, 2, 3, 4, 5]);
        let mut seen = Vec::new();
        for_each_sample(&data, 3, 2, Channels::Mono, PixelOrder::ColumnMajor, |v| seen.push(v));
        // Row 0 is x*2, row 1 is x*2+1.
        assert_eq!(seen, vec![0.0, 2.0, 4.0, 1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_rgb_luminance_is_unweighted_mean() {
        let data = PixelArray::from(vec![30u16, 60, 90, 3, 3, 3]);
        let mut seen = Vec::new();
        for_each_sample(&data, 2, 1, Channels::Rgb, PixelOrder::RowMajor, |v| seen.push(v));
        assert_eq!(seen, vec![60.0, 3.0]);
    }

    #[test]
    fn test_short_buffer_skips_missing_samples() {
        let data = PixelArray::from(vec![7u8, 8]);
        let mut count = 0;
        for_each_sample(&data, 2, 2, Channels::Mono, PixelOrder::RowMajor, |_| count += 1);
        assert_eq!(count, 2);
    }
}
