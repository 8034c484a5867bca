//! Processed frame types

use crate::image_pipeline::image_bytes::ImageMetadata;
use crate::image_pipeline::pixels::{Channels, PixelArray, PixelOrder};
use crate::image_pipeline::stretch::PixelStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Monochrome,
    Color,
}

/// A decoded frame with its statistics, ready for display.
#[derive(Debug, Clone)]
pub struct ProcessedImageData<'a> {
    pub width: usize,
    pub height: usize,
    pub channels: Channels,
    /// Row-major interleaved RGB for colour frames, otherwise the
    /// column-major mono payload as received.
    pub pixel_data: PixelArray<'a>,
    pub is_debayered: bool,
    pub image_type: ImageType,
    /// Bits per channel of `pixel_data`.
    pub bits_per_pixel: u32,
    pub min_pixel_value: f64,
    pub max_pixel_value: f64,
    pub mean_pixel_value: f64,
    pub metadata: ImageMetadata,
}

impl<'a> ProcessedImageData<'a> {
    /// A 0x0 frame signalling that nothing can be displayed.
    pub fn empty(metadata: ImageMetadata, bits_per_pixel: u32) -> Self {
        let stats = PixelStats::fallback(bits_per_pixel);
        Self {
            width: 0,
            height: 0,
            channels: Channels::Mono,
            pixel_data: PixelArray::from(Vec::<u16>::new()),
            is_debayered: false,
            image_type: ImageType::Monochrome,
            bits_per_pixel,
            min_pixel_value: stats.min,
            max_pixel_value: stats.max,
            mean_pixel_value: stats.mean,
            metadata,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Layout of `pixel_data`. Colour data is always row-major.
    pub fn pixel_order(&self) -> PixelOrder {
        match self.channels {
            Channels::Mono => PixelOrder::ColumnMajor,
            Channels::Rgb => PixelOrder::RowMajor,
        }
    }

    pub fn stats(&self) -> PixelStats {
        PixelStats {
            min: self.min_pixel_value,
            max: self.max_pixel_value,
            mean: self.mean_pixel_value,
        }
    }

    /// Detaches the frame from the buffer it was decoded from.
    pub fn into_owned(self) -> ProcessedImageData<'static> {
        ProcessedImageData {
            width: self.width,
            height: self.height,
            channels: self.channels,
            pixel_data: self.pixel_data.into_owned(),
            is_debayered: self.is_debayered,
            image_type: self.image_type,
            bits_per_pixel: self.bits_per_pixel,
            min_pixel_value: self.min_pixel_value,
            max_pixel_value: self.max_pixel_value,
            mean_pixel_value: self.mean_pixel_value,
            metadata: self.metadata,
        }
    }
}
