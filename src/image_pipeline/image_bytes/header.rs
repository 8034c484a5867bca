//! ImageBytes header parsing.

use tracing::{debug, warn};

use crate::image_pipeline::image_bytes::types::{ElementType, HeaderFallback, ImageMetadata};

/// Size of the fixed header. Offsets 8..16 are reserved.
pub const HEADER_LEN: usize = 44;

const METADATA_VERSION: usize = 0;
const ERROR_NUMBER: usize = 4;
const DATA_START: usize = 16;
const IMAGE_ELEMENT_TYPE: usize = 20;
const TRANSMISSION_ELEMENT_TYPE: usize = 24;
const RANK: usize = 28;
const DIMENSION1: usize = 32;
const DIMENSION2: usize = 36;
const DIMENSION3: usize = 40;

#[inline]
fn read_i32(buffer: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes([
        buffer[offset],
        buffer[offset + 1],
        buffer[offset + 2],
        buffer[offset + 3],
    ])
}

/// Parses the header of an ImageBytes payload.
///
/// Never fails: a short buffer or a header that does not validate yields
/// [`ImageMetadata::fallback`], which treats the whole buffer as one image.
pub fn parse_header(buffer: &[u8], fallback: &HeaderFallback) -> ImageMetadata {
    if buffer.len() < HEADER_LEN {
        warn!(
            len = buffer.len(),
            "Buffer shorter than ImageBytes header, using fallback metadata"
        );
        return ImageMetadata::fallback(fallback);
    }

    let metadata_version = read_i32(buffer, METADATA_VERSION);
    let error_number = read_i32(buffer, ERROR_NUMBER);
    let data_start = read_i32(buffer, DATA_START);
    let image_element_type = read_i32(buffer, IMAGE_ELEMENT_TYPE);
    let transmission_element_type = read_i32(buffer, TRANSMISSION_ELEMENT_TYPE);
    let rank = read_i32(buffer, RANK);
    let dimension1 = read_i32(buffer, DIMENSION1);
    let dimension2 = read_i32(buffer, DIMENSION2);
    let dimension3 = read_i32(buffer, DIMENSION3);

    let valid = metadata_version > 0
        && data_start >= HEADER_LEN as i32
        && (data_start as usize) < buffer.len()
        && dimension1 > 0
        && dimension2 > 0;

    if !valid {
        warn!(
            metadata_version,
            data_start,
            dimension1,
            dimension2,
            len = buffer.len(),
            "Invalid ImageBytes header, using fallback metadata"
        );
        return ImageMetadata::fallback(fallback);
    }

    let metadata = ImageMetadata {
        metadata_version,
        error_number,
        data_start: data_start as usize,
        image_element_type: ElementType::from_code(image_element_type),
        transmission_element_type: ElementType::from_code(transmission_element_type),
        rank: u32::try_from(rank).unwrap_or(0),
        dimension1: dimension1 as usize,
        dimension2: dimension2 as usize,
        dimension3: usize::try_from(dimension3).unwrap_or(0),
        has_metadata: true,
    };

    debug!(
        width = metadata.dimension1,
        height = metadata.dimension2,
        rank = metadata.rank,
        image_type = ?metadata.image_element_type,
        transmission_type = ?metadata.transmission_element_type,
        "Parsed ImageBytes header"
    );

    metadata
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(fields: [(usize, i32); 9], total_len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; total_len];
        for (offset, value) in fields {
            buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        }
        buf
    }

    fn valid_fields() -> [(usize, i32); 9] {
        [
            (METADATA_VERSION, 1),
            (ERROR_NUMBER, 0),
            (DATA_START, 44),
            (IMAGE_ELEMENT_TYPE, 2),
            (TRANSMISSION_ELEMENT_TYPE, 8),
            (RANK, 2),
            (DIMENSION1, 4),
            (DIMENSION2, 3),
            (DIMENSION3, 0),
        ]
    }

    #[test]
    fn test_parse_valid_header() {
        let buf = header(valid_fields(), 44 + 24);
        let meta = parse_header(&buf, &HeaderFallback::default());

        assert!(meta.has_metadata);
        assert_eq!(meta.metadata_version, 1);
        assert_eq!(meta.data_start, 44);
        assert_eq!(meta.image_element_type, ElementType::Int32);
        assert_eq!(meta.transmission_element_type, ElementType::UInt16);
        assert_eq!(meta.rank, 2);
        assert_eq!((meta.width(), meta.height()), (4, 3));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let buf = header(valid_fields(), 100);
        let fallback = HeaderFallback::default();
        assert_eq!(parse_header(&buf, &fallback), parse_header(&buf, &fallback));
    }

    #[test]
    fn test_reserved_bytes_are_ignored() {
        let mut buf = header(valid_fields(), 100);
        buf[8..16].copy_from_slice(&[0xFF; 8]);
        let meta = parse_header(&buf, &HeaderFallback::default());
        assert!(meta.has_metadata);
        assert_eq!(meta.error_number, 0);
    }

    #[test]
    fn test_short_buffers_fall_back() {
        let fallback = HeaderFallback {
            width: 7,
            height: 5,
            element_type: ElementType::Byte,
        };
        for len in 0..HEADER_LEN {
            let meta = parse_header(&vec![1u8; len], &fallback);
            assert!(!meta.has_metadata);
            assert_eq!(meta.data_start, 0);
            assert_eq!(meta.rank, 2);
            assert_eq!(meta.dimension3, 1);
            assert_eq!((meta.width(), meta.height()), (7, 5));
        }
    }

    #[test]
    fn test_validation_failures_fall_back() {
        let cases: [(usize, i32); 6] = [
            (METADATA_VERSION, 0),
            (DATA_START, 43),
            (DATA_START, 100),
            (DATA_START, -1),
            (DIMENSION1, 0),
            (DIMENSION2, -4),
        ];
        for (offset, value) in cases {
            let mut buf = header(valid_fields(), 100);
            buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
            let meta = parse_header(&buf, &HeaderFallback::default());
            assert!(!meta.has_metadata, "offset {} value {}", offset, value);
            assert_eq!(meta.data_start, 0);
        }
    }

    #[test]
    fn test_unknown_element_code() {
        let mut fields = valid_fields();
        fields[4] = (TRANSMISSION_ELEMENT_TYPE, 77);
        let meta = parse_header(&header(fields, 100), &HeaderFallback::default());
        assert!(meta.has_metadata);
        assert_eq!(meta.transmission_element_type, ElementType::Unknown);
    }
}
