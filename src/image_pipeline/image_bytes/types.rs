//! ImageBytes header types

/// Default cap on decoded elements, large enough for any sensor in use.
pub const DEFAULT_MAX_PIXELS: usize = 1 << 28;

/// Numeric element type codes used by the Alpaca ImageBytes header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementType {
    #[default]
    Unknown,
    Int16,
    Int32,
    Double,
    /// 32-bit float
    Single,
    UInt64,
    Byte,
    Int64,
    UInt16,
    UInt32,
}

impl ElementType {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => ElementType::Int16,
            2 => ElementType::Int32,
            3 => ElementType::Double,
            4 => ElementType::Single,
            5 => ElementType::UInt64,
            6 => ElementType::Byte,
            7 => ElementType::Int64,
            8 => ElementType::UInt16,
            9 => ElementType::UInt32,
            _ => ElementType::Unknown,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            ElementType::Unknown => 0,
            ElementType::Int16 => 1,
            ElementType::Int32 => 2,
            ElementType::Double => 3,
            ElementType::Single => 4,
            ElementType::UInt64 => 5,
            ElementType::Byte => 6,
            ElementType::Int64 => 7,
            ElementType::UInt16 => 8,
            ElementType::UInt32 => 9,
        }
    }

    /// Bit width of one element. `Unknown` is treated as 16-bit.
    pub fn bits(self) -> u32 {
        match self {
            ElementType::Byte => 8,
            ElementType::Int16 | ElementType::UInt16 | ElementType::Unknown => 16,
            ElementType::Int32 | ElementType::UInt32 | ElementType::Single => 32,
            ElementType::Int64 | ElementType::UInt64 | ElementType::Double => 64,
        }
    }

    /// Natural alignment in bytes.
    pub fn alignment(self) -> usize {
        (self.bits() / 8) as usize
    }
}

/// Values substituted when a buffer carries no usable header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderFallback {
    pub width: usize,
    pub height: usize,
    pub element_type: ElementType,
}

impl Default for HeaderFallback {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            element_type: ElementType::UInt16,
        }
    }
}

/// Parsed ImageBytes header.
///
/// When `has_metadata` is true the header passed validation:
/// `data_start >= 44`, `data_start` lies inside the buffer and both
/// dimensions are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageMetadata {
    pub metadata_version: i32,
    pub error_number: i32,
    /// Byte offset of the pixel payload.
    pub data_start: usize,
    /// Sensor-native element type.
    pub image_element_type: ElementType,
    /// Element type actually present on the wire.
    pub transmission_element_type: ElementType,
    pub rank: u32,
    /// Width
    pub dimension1: usize,
    /// Height
    pub dimension2: usize,
    /// Depth or colour planes, 1 for rank-2 frames.
    pub dimension3: usize,
    pub has_metadata: bool,
}

impl ImageMetadata {
    /// Record used when no valid header is present: the whole buffer is
    /// pixel data of the fallback size and type.
    pub fn fallback(fallback: &HeaderFallback) -> Self {
        Self {
            metadata_version: 0,
            error_number: 0,
            data_start: 0,
            image_element_type: fallback.element_type,
            transmission_element_type: fallback.element_type,
            rank: 2,
            dimension1: fallback.width,
            dimension2: fallback.height,
            dimension3: 1,
            has_metadata: false,
        }
    }

    pub fn width(&self) -> usize {
        self.dimension1
    }

    pub fn height(&self) -> usize {
        self.dimension2
    }

    /// Planes per pixel; anything other than rank 3 has a single plane.
    pub fn planes(&self) -> usize {
        if self.rank == 3 { self.dimension3.max(1) } else { 1 }
    }

    /// Number of elements the payload should hold, `None` on overflow.
    pub fn element_count(&self) -> Option<usize> {
        self.dimension1
            .checked_mul(self.dimension2)?
            .checked_mul(self.planes())
    }

    /// Bytes the decoded payload occupies, `None` past `isize::MAX`.
    pub fn payload_bytes(&self) -> Option<usize> {
        let bytes = self
            .element_count()?
            .checked_mul(self.transmission_element_type.alignment())?;
        (bytes <= isize::MAX as usize).then_some(bytes)
    }

    /// Whether decoding this frame stays within `max_pixels` elements
    /// and an addressable allocation.
    pub fn within_limits(&self, max_pixels: Option<usize>) -> bool {
        match (self.element_count(), self.payload_bytes()) {
            (Some(count), Some(_)) => max_pixels.is_none_or(|max| count <= max),
            _ => false,
        }
    }

    /// Whether the frame already carries three colour planes.
    pub fn is_color(&self) -> bool {
        self.rank == 3 && self.dimension3 == 3
    }
}
