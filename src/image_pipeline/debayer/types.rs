//! Types for debayering operations

use std::fmt;
use std::str::FromStr;

use crate::image_pipeline::pixels::PixelArray;

/// Colour filter over one sensor photosite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfaColor {
    Red,
    Green,
    Blue,
}

/// 2x2 colour filter tiling, named by its top row then bottom row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BayerPattern {
    #[default]
    Rggb,
    Grbg,
    Gbrg,
    Bggr,
}

impl BayerPattern {
    pub const ALL: [BayerPattern; 4] = [
        BayerPattern::Rggb,
        BayerPattern::Grbg,
        BayerPattern::Gbrg,
        BayerPattern::Bggr,
    ];

    /// Cell colours indexed `[y % 2][x % 2]`.
    fn cell(self) -> [[CfaColor; 2]; 2] {
        use CfaColor::*;
        match self {
            BayerPattern::Rggb => [[Red, Green], [Green, Blue]],
            BayerPattern::Grbg => [[Green, Red], [Blue, Green]],
            BayerPattern::Gbrg => [[Green, Blue], [Red, Green]],
            BayerPattern::Bggr => [[Blue, Green], [Green, Red]],
        }
    }

    #[inline]
    pub fn color_at(self, x: usize, y: usize) -> CfaColor {
        self.cell()[y & 1][x & 1]
    }

    /// The non-green colour sharing row `y` with the green photosites.
    #[inline]
    pub fn row_chroma(self, y: usize) -> CfaColor {
        match self.cell()[y & 1] {
            [CfaColor::Green, other] | [other, _] => other,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            BayerPattern::Rggb => "RGGB",
            BayerPattern::Grbg => "GRBG",
            BayerPattern::Gbrg => "GBRG",
            BayerPattern::Bggr => "BGGR",
        }
    }
}

impl fmt::Display for BayerPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for BayerPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BayerPattern::ALL
            .into_iter()
            .find(|p| p.tag().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown Bayer pattern: {}", s))
    }
}

/// RGB image data after debayering
#[derive(Debug, Clone)]
pub struct RgbImageData {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Row-major RGB samples interleaved [R, G, B, R, G, B, ...]
    pub data: PixelArray<'static>,
    /// Bits per channel of `data`; 32 for anything wider than 16-bit input
    pub bits_per_sample: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_cells() {
        assert_eq!(BayerPattern::Rggb.color_at(0, 0), CfaColor::Red);
        assert_eq!(BayerPattern::Rggb.color_at(1, 1), CfaColor::Blue);
        assert_eq!(BayerPattern::Grbg.color_at(1, 0), CfaColor::Red);
        assert_eq!(BayerPattern::Gbrg.color_at(0, 1), CfaColor::Red);
        assert_eq!(BayerPattern::Bggr.color_at(3, 3), CfaColor::Red);
    }

    #[test]
    fn test_row_chroma() {
        assert_eq!(BayerPattern::Rggb.row_chroma(0), CfaColor::Red);
        assert_eq!(BayerPattern::Rggb.row_chroma(1), CfaColor::Blue);
        assert_eq!(BayerPattern::Grbg.row_chroma(0), CfaColor::Red);
        assert_eq!(BayerPattern::Gbrg.row_chroma(0), CfaColor::Blue);
        assert_eq!(BayerPattern::Bggr.row_chroma(2), CfaColor::Blue);
    }

    #[test]
    fn test_tag_parsing() {
        for p in BayerPattern::ALL {
            assert_eq!(p.tag().parse::<BayerPattern>(), Ok(p));
        }
        assert_eq!("gbrg".parse::<BayerPattern>(), Ok(BayerPattern::Gbrg));
        assert!("RGBG".parse::<BayerPattern>().is_err());
    }
}
