//! Alpaca ImageBytes wire format
//!
//! This module decodes the binary camera payload: the fixed little-endian
//! header and the typed pixel array that follows it.

mod encode;
mod extract;
mod header;
mod reader;
pub mod types;

pub use encode::encode_image_bytes;
pub use extract::{align_offset, extract_pixels};
pub use header::{parse_header, HEADER_LEN};
pub use reader::{DecodedFrame, FrameReader, ImageBytesReader};
pub use types::{ElementType, HeaderFallback, ImageMetadata, DEFAULT_MAX_PIXELS};
