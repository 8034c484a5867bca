//! Typed pixel buffers shared by every pipeline stage.
//!
//! A frame's samples are held in a [`PixelArray`], a closed union over the
//! numeric types the ImageBytes format can carry. Stages that need to be
//! generic over the sample type go through [`Sample`] and the
//! [`with_samples!`](crate::with_samples) dispatcher instead of matching on
//! every variant themselves.

use std::borrow::Cow;

use bytemuck::Pod;
use num_traits::ToPrimitive;

/// A numeric sample type that can appear on the wire.
pub trait Sample: Pod + ToPrimitive + Send + Sync + 'static {
    /// Size of one element in bytes, which is also its natural alignment.
    const BYTES: usize = std::mem::size_of::<Self>();

    /// Decodes one little-endian element. `bytes` must hold at least
    /// `Self::BYTES` bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Appends the little-endian encoding of `self`.
    fn write_le(self, out: &mut Vec<u8>);

    #[inline]
    fn to_f64_lossy(self) -> f64 {
        self.to_f64().unwrap_or(0.0)
    }
}

macro_rules! impl_sample {
    ($($t:ty),* $(,)?) => {
        $(
            impl Sample for $t {
                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$t>()];
                    raw.copy_from_slice(&bytes[..std::mem::size_of::<$t>()]);
                    <$t>::from_le_bytes(raw)
                }

                #[inline]
                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_sample!(u8, i16, u16, i32, u32, i64, u64, f32, f64);

/// Memory layout of a single-channel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelOrder {
    /// `index = x * height + y`, the ImageBytes wire layout.
    ColumnMajor,
    /// `index = y * width + x`.
    RowMajor,
}

impl PixelOrder {
    #[inline]
    pub fn index(self, x: usize, y: usize, width: usize, height: usize) -> usize {
        match self {
            PixelOrder::ColumnMajor => x * height + y,
            PixelOrder::RowMajor => y * width + x,
        }
    }
}

/// Number of interleaved channels in a pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Mono,
    Rgb,
}

impl Channels {
    pub fn count(self) -> usize {
        match self {
            Channels::Mono => 1,
            Channels::Rgb => 3,
        }
    }
}

/// Flat pixel samples, either borrowed straight from the wire buffer or
/// owned after a copy.
///
/// `Int16` and `Int32` payloads never show up here as signed arrays: the
/// extractor reinterprets them as `U16`/`U32`.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelArray<'a> {
    U8(Cow<'a, [u8]>),
    U16(Cow<'a, [u16]>),
    U32(Cow<'a, [u32]>),
    I64(Cow<'a, [i64]>),
    U64(Cow<'a, [u64]>),
    F32(Cow<'a, [f32]>),
    F64(Cow<'a, [f64]>),
}

/// Runs `$body` with `$s` bound to the variant's `&[T]`.
#[macro_export]
macro_rules! with_samples {
    ($array:expr, |$s:ident| $body:expr) => {
        match $array {
            $crate::image_pipeline::PixelArray::U8(v) => { let $s: &[u8] = &v[..]; $body }
            $crate::image_pipeline::PixelArray::U16(v) => { let $s: &[u16] = &v[..]; $body }
            $crate::image_pipeline::PixelArray::U32(v) => { let $s: &[u32] = &v[..]; $body }
            $crate::image_pipeline::PixelArray::I64(v) => { let $s: &[i64] = &v[..]; $body }
            $crate::image_pipeline::PixelArray::U64(v) => { let $s: &[u64] = &v[..]; $body }
            $crate::image_pipeline::PixelArray::F32(v) => { let $s: &[f32] = &v[..]; $body }
            $crate::image_pipeline::PixelArray::F64(v) => { let $s: &[f64] = &v[..]; $body }
        }
    };
}

impl<'a> PixelArray<'a> {
    pub fn len(&self) -> usize {
        crate::with_samples!(self, |s| s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the samples still point into the source buffer.
    pub fn is_borrowed(&self) -> bool {
        match self {
            PixelArray::U8(v) => matches!(v, Cow::Borrowed(_)),
            PixelArray::U16(v) => matches!(v, Cow::Borrowed(_)),
            PixelArray::U32(v) => matches!(v, Cow::Borrowed(_)),
            PixelArray::I64(v) => matches!(v, Cow::Borrowed(_)),
            PixelArray::U64(v) => matches!(v, Cow::Borrowed(_)),
            PixelArray::F32(v) => matches!(v, Cow::Borrowed(_)),
            PixelArray::F64(v) => matches!(v, Cow::Borrowed(_)),
        }
    }

    /// Sample `index` widened to `f64`, `None` past the end.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        crate::with_samples!(self, |s| s.get(index).map(|v| v.to_f64_lossy()))
    }

    pub fn into_owned(self) -> PixelArray<'static> {
        match self {
            PixelArray::U8(v) => PixelArray::U8(Cow::Owned(v.into_owned())),
            PixelArray::U16(v) => PixelArray::U16(Cow::Owned(v.into_owned())),
            PixelArray::U32(v) => PixelArray::U32(Cow::Owned(v.into_owned())),
            PixelArray::I64(v) => PixelArray::I64(Cow::Owned(v.into_owned())),
            PixelArray::U64(v) => PixelArray::U64(Cow::Owned(v.into_owned())),
            PixelArray::F32(v) => PixelArray::F32(Cow::Owned(v.into_owned())),
            PixelArray::F64(v) => PixelArray::F64(Cow::Owned(v.into_owned())),
        }
    }

    /// Little-endian bytes of every sample, in storage order.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        crate::with_samples!(self, |s| {
            let mut out = Vec::with_capacity(std::mem::size_of_val(s));
            for &v in s {
                v.write_le(&mut out);
            }
            out
        })
    }

    /// Copies samples into a new array of the same variant using `pick`
    /// to select the source index of each output element.
    pub(crate) fn gather(&self, len: usize, pick: impl Fn(usize) -> usize) -> PixelArray<'static> {
        fn take<T: Sample + Default>(s: &[T], len: usize, pick: &dyn Fn(usize) -> usize) -> Vec<T> {
            (0..len).map(|i| s.get(pick(i)).copied().unwrap_or_default()).collect()
        }
        match self {
            PixelArray::U8(v) => PixelArray::U8(Cow::Owned(take(v, len, &pick))),
            PixelArray::U16(v) => PixelArray::U16(Cow::Owned(take(v, len, &pick))),
            PixelArray::U32(v) => PixelArray::U32(Cow::Owned(take(v, len, &pick))),
            PixelArray::I64(v) => PixelArray::I64(Cow::Owned(take(v, len, &pick))),
            PixelArray::U64(v) => PixelArray::U64(Cow::Owned(take(v, len, &pick))),
            PixelArray::F32(v) => PixelArray::F32(Cow::Owned(take(v, len, &pick))),
            PixelArray::F64(v) => PixelArray::F64(Cow::Owned(take(v, len, &pick))),
        }
    }
}

impl From<Vec<u8>> for PixelArray<'static> {
    fn from(v: Vec<u8>) -> Self {
        PixelArray::U8(Cow::Owned(v))
    }
}

impl From<Vec<u16>> for PixelArray<'static> {
    fn from(v: Vec<u16>) -> Self {
        PixelArray::U16(Cow::Owned(v))
    }
}

impl From<Vec<u32>> for PixelArray<'static> {
    fn from(v: Vec<u32>) -> Self {
        PixelArray::U32(Cow::Owned(v))
    }
}

impl From<Vec<f32>> for PixelArray<'static> {
    fn from(v: Vec<f32>) -> Self {
        PixelArray::F32(Cow::Owned(v))
    }
}

impl From<Vec<f64>> for PixelArray<'static> {
    fn from(v: Vec<f64>) -> Self {
        PixelArray::F64(Cow::Owned(v))
    }
}
