use rayon::prelude::*;
use tracing::debug;

use crate::image_pipeline::pixels::{Channels, PixelArray, PixelOrder, Sample};
use crate::image_pipeline::stretch::StretchLut;

/// Bytes per output pixel.
pub const RGBA_BYTES: usize = 4;

/// Applies `lut` to every pixel and returns an RGBA8 buffer of
/// `width * height * 4` bytes in row-major order.
///
/// Mono input is read column-major and replicated to R, G and B; RGB input
/// is read row-major with each channel looked up independently. Samples
/// missing from a short buffer render as the LUT value for 0.
pub fn render_display(
    data: &PixelArray<'_>,
    width: usize,
    height: usize,
    lut: &StretchLut,
    channels: Channels,
) -> Vec<u8> {
    let mut rgba = vec![0u8; width * height * RGBA_BYTES];
    if rgba.is_empty() {
        return rgba;
    }
    crate::with_samples!(data, |s| {
        for (y, row) in rgba.chunks_mut(width * RGBA_BYTES).enumerate() {
            render_row(s, width, height, y, lut, channels, row);
        }
    });
    rgba
}

/// Same output as [`render_display`], with rows split across the current
/// rayon pool.
pub fn render_display_parallel(
    data: &PixelArray<'_>,
    width: usize,
    height: usize,
    lut: &StretchLut,
    channels: Channels,
) -> Vec<u8> {
    let mut rgba = vec![0u8; width * height * RGBA_BYTES];
    if rgba.is_empty() {
        return rgba;
    }
    debug!(width, height, threads = rayon::current_num_threads(), "Rendering rows in parallel");
    crate::with_samples!(data, |s| {
        rgba.par_chunks_mut(width * RGBA_BYTES)
            .enumerate()
            .for_each(|(y, row)| render_row(s, width, height, y, lut, channels, row));
    });
    rgba
}

fn render_row<S: Sample>(
    s: &[S],
    width: usize,
    height: usize,
    y: usize,
    lut: &StretchLut,
    channels: Channels,
    row: &mut [u8],
) {
    let sample = |i: usize| s.get(i).map_or(0.0, |v| v.to_f64_lossy());
    for (x, px) in row.chunks_exact_mut(RGBA_BYTES).enumerate() {
        match channels {
            Channels::Mono => {
                let v = lut.lookup(sample(PixelOrder::ColumnMajor.index(x, y, width, height)));
                px.copy_from_slice(&[v, v, v, 255]);
            }
            Channels::Rgb => {
                let base = (y * width + x) * 3;
                px[0] = lut.lookup(sample(base));
                px[1] = lut.lookup(sample(base + 1));
                px[2] = lut.lookup(sample(base + 2));
                px[3] = 255;
            }
        }
    }
}
