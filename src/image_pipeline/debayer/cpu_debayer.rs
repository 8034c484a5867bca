//! Bilinear demosaicing.
//!
//! The input mosaic is column-major (`x * height + y`), the output is
//! row-major interleaved RGB. Photosites outside the frame read as zero and
//! still count toward the averaging divisor.

use num_traits::{Bounded, NumCast};
use tracing::{debug, info};

use crate::image_pipeline::debayer::types::{BayerPattern, CfaColor, RgbImageData};
use crate::image_pipeline::pixels::{PixelArray, Sample};

pub struct CpuDebayer {
    pattern: BayerPattern,
}

impl CpuDebayer {
    pub fn new(pattern: BayerPattern) -> Self {
        Self { pattern }
    }

    pub fn pattern(&self) -> BayerPattern {
        self.pattern
    }

    pub fn process(
        &self,
        mosaic: &PixelArray<'_>,
        width: usize,
        height: usize,
        bits_per_pixel: u32,
    ) -> RgbImageData {
        info!(
            "Starting CPU debayering for image {}x{} ({}, {} bpp)",
            width, height, self.pattern, bits_per_pixel
        );
        let (data, bits_per_sample) = debayer(mosaic, width, height, self.pattern, bits_per_pixel);
        debug!(output_bits = bits_per_sample, samples = data.len(), "Debayer complete");

        RgbImageData {
            width,
            height,
            data,
            bits_per_sample,
        }
    }
}

/// Demosaics a column-major mosaic into row-major RGB.
///
/// The output container follows the input depth: up to 8 bits gives `U8`,
/// up to 16 bits gives `U16`, anything wider gives `U32` and reports 32
/// output bits.
pub fn debayer(
    mosaic: &PixelArray<'_>,
    width: usize,
    height: usize,
    pattern: BayerPattern,
    bits_per_pixel: u32,
) -> (PixelArray<'static>, u32) {
    crate::with_samples!(mosaic, |src| {
        if bits_per_pixel <= 8 {
            (PixelArray::from(demosaic::<_, u8>(src, width, height, pattern)), bits_per_pixel)
        } else if bits_per_pixel <= 16 {
            (PixelArray::from(demosaic::<_, u16>(src, width, height, pattern)), bits_per_pixel)
        } else {
            (PixelArray::from(demosaic::<_, u32>(src, width, height, pattern)), 32)
        }
    })
}

struct Mosaic<'a, S> {
    src: &'a [S],
    width: usize,
    height: usize,
}

impl<S: Sample> Mosaic<'_, S> {
    #[inline]
    fn at(&self, x: isize, y: isize) -> f64 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return 0.0;
        }
        self.src
            .get(x as usize * self.height + y as usize)
            .map_or(0.0, |v| v.to_f64_lossy())
    }

    #[inline]
    fn horizontal(&self, x: isize, y: isize) -> f64 {
        (self.at(x - 1, y) + self.at(x + 1, y)) / 2.0
    }

    #[inline]
    fn vertical(&self, x: isize, y: isize) -> f64 {
        (self.at(x, y - 1) + self.at(x, y + 1)) / 2.0
    }

    #[inline]
    fn cross(&self, x: isize, y: isize) -> f64 {
        (self.at(x - 1, y) + self.at(x + 1, y) + self.at(x, y - 1) + self.at(x, y + 1)) / 4.0
    }

    #[inline]
    fn diagonal(&self, x: isize, y: isize) -> f64 {
        (self.at(x - 1, y - 1) + self.at(x + 1, y - 1) + self.at(x - 1, y + 1) + self.at(x + 1, y + 1))
            / 4.0
    }

    /// Reconstructed `[r, g, b]` at photosite `(x, y)`.
    fn rgb(&self, pattern: BayerPattern, x: usize, y: usize) -> [f64; 3] {
        let (xi, yi) = (x as isize, y as isize);
        let own = self.at(xi, yi);
        match pattern.color_at(x, y) {
            CfaColor::Red => [own, self.cross(xi, yi), self.diagonal(xi, yi)],
            CfaColor::Blue => [self.diagonal(xi, yi), self.cross(xi, yi), own],
            CfaColor::Green => match pattern.row_chroma(y) {
                CfaColor::Red => [self.horizontal(xi, yi), own, self.vertical(xi, yi)],
                _ => [self.vertical(xi, yi), own, self.horizontal(xi, yi)],
            },
        }
    }
}

#[inline]
fn quantize<O: Sample + Bounded + NumCast>(value: f64) -> O {
    let max = <O as Bounded>::max_value().to_f64_lossy();
    let clamped = if value.is_nan() { 0.0 } else { value.round().clamp(0.0, max) };
    <O as NumCast>::from(clamped).unwrap_or_else(O::zeroed)
}

fn demosaic<S: Sample, O: Sample + Bounded + NumCast>(
    src: &[S],
    width: usize,
    height: usize,
    pattern: BayerPattern,
) -> Vec<O> {
    let mosaic = Mosaic { src, width, height };
    let mut out = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            for channel in mosaic.rgb(pattern, x, y) {
                out.push(quantize::<O>(channel));
            }
        }
    }
    out
}
