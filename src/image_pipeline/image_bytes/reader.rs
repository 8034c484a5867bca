use tracing::{debug, warn};

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::image_bytes::extract::extract_pixels;
use crate::image_pipeline::image_bytes::header::parse_header;
use crate::image_pipeline::image_bytes::types::{HeaderFallback, ImageMetadata, DEFAULT_MAX_PIXELS};
use crate::image_pipeline::pixels::PixelArray;

/// Header plus the typed payload it describes.
#[derive(Debug, Clone)]
pub struct DecodedFrame<'a> {
    pub metadata: ImageMetadata,
    pub pixels: PixelArray<'a>,
}

pub trait FrameReader {
    fn read_frame<'a>(&self, data: &'a [u8]) -> Result<DecodedFrame<'a>>;
}

/// Reads Alpaca ImageBytes payloads.
///
/// Always succeeds: a bad header degrades to the fallback geometry and a
/// short payload is zero padded. A header describing more than
/// `max_pixels` elements yields an empty payload.
#[derive(Debug, Clone)]
pub struct ImageBytesReader {
    pub fallback: HeaderFallback,
    pub max_pixels: Option<usize>,
}

impl Default for ImageBytesReader {
    fn default() -> Self {
        Self::new(HeaderFallback::default())
    }
}

impl ImageBytesReader {
    pub fn new(fallback: HeaderFallback) -> Self {
        Self {
            fallback,
            max_pixels: Some(DEFAULT_MAX_PIXELS),
        }
    }

    pub fn with_max_pixels(mut self, max_pixels: Option<usize>) -> Self {
        self.max_pixels = max_pixels;
        self
    }
}

impl FrameReader for ImageBytesReader {
    fn read_frame<'a>(&self, data: &'a [u8]) -> Result<DecodedFrame<'a>> {
        let metadata = parse_header(data, &self.fallback);
        let count = if metadata.within_limits(self.max_pixels) {
            metadata.element_count().unwrap_or(0)
        } else {
            warn!(
                width = metadata.width(),
                height = metadata.height(),
                planes = metadata.planes(),
                max_pixels = ?self.max_pixels,
                "Header describes a frame too large to decode"
            );
            0
        };

        debug!(
            bytes = data.len(),
            count,
            element_type = ?metadata.transmission_element_type,
            "Extracting pixel payload"
        );

        let pixels = extract_pixels(data, metadata.transmission_element_type, metadata.data_start, count);
        Ok(DecodedFrame { metadata, pixels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::image_bytes::{encode_image_bytes, ElementType};

    #[test]
    fn test_reads_header_and_payload() {
        let metadata = ImageMetadata {
            metadata_version: 1,
            error_number: 0,
            data_start: 44,
            image_element_type: ElementType::UInt16,
            transmission_element_type: ElementType::Byte,
            rank: 2,
            dimension1: 2,
            dimension2: 2,
            dimension3: 0,
            has_metadata: true,
        };
        let bytes = encode_image_bytes(&metadata, &PixelArray::from(vec![9u8, 8, 7, 6]));

        let frame = ImageBytesReader::default().read_frame(&bytes).unwrap();
        assert_eq!(frame.metadata, metadata);
        assert_eq!(frame.pixels, PixelArray::from(vec![9u8, 8, 7, 6]));
    }

    #[test]
    fn test_headerless_buffer_is_one_image() {
        let reader = ImageBytesReader::new(HeaderFallback {
            width: 2,
            height: 2,
            element_type: ElementType::Byte,
        });
        let frame = reader.read_frame(&[1, 2, 3, 4]).unwrap();
        assert!(!frame.metadata.has_metadata);
        assert_eq!(frame.pixels, PixelArray::from(vec![1u8, 2, 3, 4]));
    }

    #[test]
    fn test_oversized_header_decodes_no_pixels() {
        let metadata = ImageMetadata {
            metadata_version: 1,
            error_number: 0,
            data_start: 44,
            image_element_type: ElementType::UInt16,
            transmission_element_type: ElementType::UInt16,
            rank: 2,
            dimension1: i32::MAX as usize,
            dimension2: i32::MAX as usize,
            dimension3: 0,
            has_metadata: true,
        };
        let bytes = encode_image_bytes(&metadata, &PixelArray::from(vec![1u16; 10]));
        assert_eq!(bytes.len(), 64);

        let frame = ImageBytesReader::default().read_frame(&bytes).unwrap();
        assert!(frame.metadata.has_metadata);
        assert_eq!(frame.metadata.width(), i32::MAX as usize);
        assert!(frame.pixels.is_empty());
    }

    #[test]
    fn test_max_pixels_caps_small_frames() {
        let reader = ImageBytesReader::new(HeaderFallback {
            width: 2,
            height: 2,
            element_type: ElementType::Byte,
        });
        assert!(reader.clone().with_max_pixels(Some(3)).read_frame(&[1, 2, 3, 4]).unwrap().pixels.is_empty());
        assert_eq!(reader.with_max_pixels(None).read_frame(&[1, 2, 3, 4]).unwrap().pixels.len(), 4);
    }
}
