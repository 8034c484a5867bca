//! Typed pixel extraction from the raw payload.
//!
//! The payload start is rounded up to the element's natural alignment
//! before reading. When the aligned range is fully present and the slice is
//! suitably aligned in memory, the samples are borrowed in place; otherwise
//! every element is decoded with explicit little-endian reads and elements
//! past the end of the buffer decode as zero.

use std::borrow::Cow;

use tracing::{debug, warn};

use crate::image_pipeline::image_bytes::types::ElementType;
use crate::image_pipeline::pixels::{PixelArray, Sample};

/// Rounds `offset` up to a multiple of `align`.
#[inline]
pub fn align_offset(offset: usize, align: usize) -> usize {
    offset.next_multiple_of(align.max(1))
}

/// Extracts `count` elements of `element_type` starting at `offset`.
///
/// `Int16` and `Int32` payloads carry unsigned sensor readings in signed
/// containers; they come back as `U16` and `U32` respectively.
pub fn extract_pixels(
    buffer: &[u8],
    element_type: ElementType,
    offset: usize,
    count: usize,
) -> PixelArray<'_> {
    match element_type {
        ElementType::Byte => PixelArray::U8(view_or_decode(buffer, offset, count)),
        ElementType::UInt16 => PixelArray::U16(view_or_decode(buffer, offset, count)),
        ElementType::Int16 => PixelArray::U16(signed16_as_unsigned(view_or_decode(buffer, offset, count))),
        ElementType::UInt32 => PixelArray::U32(view_or_decode(buffer, offset, count)),
        ElementType::Int32 => PixelArray::U32(signed32_as_unsigned(view_or_decode(buffer, offset, count))),
        ElementType::Single => PixelArray::F32(view_or_decode(buffer, offset, count)),
        ElementType::Double => PixelArray::F64(view_or_decode(buffer, offset, count)),
        ElementType::Int64 => PixelArray::I64(view_or_decode(buffer, offset, count)),
        ElementType::UInt64 => PixelArray::U64(view_or_decode(buffer, offset, count)),
        ElementType::Unknown => {
            warn!(count, "Unknown element type, pixels decode as zero");
            PixelArray::U16(Cow::Owned(vec![0; count]))
        }
    }
}

fn view_or_decode<T: Sample>(buffer: &[u8], offset: usize, count: usize) -> Cow<'_, [T]> {
    let start = align_offset(offset, T::BYTES);

    if cfg!(target_endian = "little") {
        let view = count
            .checked_mul(T::BYTES)
            .and_then(|len| start.checked_add(len))
            .and_then(|end| buffer.get(start..end))
            .and_then(|bytes| bytemuck::try_cast_slice::<u8, T>(bytes).ok());
        if let Some(samples) = view {
            return Cow::Borrowed(samples);
        }
    }

    debug!(
        offset = start,
        count,
        available = buffer.len().saturating_sub(start),
        "Decoding pixels element by element"
    );
    Cow::Owned(decode_le(buffer, start, count))
}

fn decode_le<T: Sample>(buffer: &[u8], start: usize, count: usize) -> Vec<T> {
    (0..count)
        .map(|i| {
            i.checked_mul(T::BYTES)
                .and_then(|rel| start.checked_add(rel))
                .and_then(|at| buffer.get(at..at.checked_add(T::BYTES)?))
                .map(T::read_le)
                .unwrap_or_else(T::zeroed)
        })
        .collect()
}

/// Equivalent to `value & 0xFFFF` on each element.
fn signed16_as_unsigned(samples: Cow<'_, [i16]>) -> Cow<'_, [u16]> {
    match samples {
        Cow::Borrowed(s) => Cow::Borrowed(bytemuck::cast_slice(s)),
        Cow::Owned(v) => Cow::Owned(v.into_iter().map(|x| x as u16).collect()),
    }
}

/// Two's complement reinterpretation of each element.
fn signed32_as_unsigned(samples: Cow<'_, [i32]>) -> Cow<'_, [u32]> {
    match samples {
        Cow::Borrowed(s) => Cow::Borrowed(bytemuck::cast_slice(s)),
        Cow::Owned(v) => Cow::Owned(v.into_iter().map(|x| x as u32).collect()),
    }
}
