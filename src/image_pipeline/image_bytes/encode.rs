//! ImageBytes payload encoding, used to build frames for tests, benches
//! and replay tooling.

use crate::image_pipeline::image_bytes::header::HEADER_LEN;
use crate::image_pipeline::image_bytes::types::ImageMetadata;
use crate::image_pipeline::pixels::PixelArray;

fn clamp_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Serialises `metadata` into a 44-byte header followed by `pixels` at
/// `metadata.data_start` (never earlier than the end of the header).
pub fn encode_image_bytes(metadata: &ImageMetadata, pixels: &PixelArray<'_>) -> Vec<u8> {
    let data_start = metadata.data_start.max(HEADER_LEN);
    let payload = pixels.to_le_bytes();

    let mut out = Vec::with_capacity(data_start + payload.len());
    let fields: [i32; 11] = [
        metadata.metadata_version,
        metadata.error_number,
        0,
        0,
        clamp_i32(data_start),
        metadata.image_element_type.code(),
        metadata.transmission_element_type.code(),
        clamp_i32(metadata.rank as usize),
        clamp_i32(metadata.dimension1),
        clamp_i32(metadata.dimension2),
        clamp_i32(metadata.dimension3),
    ];
    for field in fields {
        out.extend_from_slice(&field.to_le_bytes());
    }
    out.resize(data_start, 0);
    out.extend_from_slice(&payload);
    out
}
