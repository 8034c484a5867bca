//! Display rendering module
//!
//! Turns stretched pixel data into interleaved RGBA8 buffers ready for a
//! texture upload or a canvas.

mod renderer;

pub use renderer::{render_display, render_display_parallel, RGBA_BYTES};

use crate::image_pipeline::stretch::{PixelStats, StretchLut};

/// Everything a viewer needs to show one frame.
#[derive(Debug, Clone)]
pub struct DisplayFrame {
    pub width: usize,
    pub height: usize,
    /// Row-major RGBA8, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
    pub histogram: Vec<u32>,
    pub lut: StretchLut,
    pub stats: PixelStats,
}
