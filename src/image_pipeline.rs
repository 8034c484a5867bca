//! Image processing pipeline module
//!
//! This module turns Alpaca ImageBytes camera payloads into display-ready
//! frames, with separate modules for wire decoding, debayering, tone
//! stretching, rendering, background workers and orchestration.

pub mod common;
pub mod config;
pub mod conversions;
pub mod debayer;
pub mod display;
pub mod image_bytes;
pub mod pixels;
pub mod stretch;
pub mod timing;
pub mod worker;

pub use common::{ProcessingError, Result, SubmitError};

pub use config::{PipelineConfig, PipelineConfigBuilder};

pub use conversions::{ImageBytesPipeline, ImageType, ProcessedImageData};

pub use debayer::{debayer, BayerPattern, CpuDebayer};

pub use display::{render_display, DisplayFrame};

pub use image_bytes::{
    encode_image_bytes, extract_pixels, parse_header, ElementType, FrameReader, HeaderFallback,
    ImageBytesReader, ImageMetadata,
};

pub use pixels::{Channels, PixelArray, PixelOrder};

pub use stretch::{compute_stats, histogram, PixelStats, StretchLut, StretchMethod};

pub use timing::{PipelineStage, PipelineTimings};

pub use worker::{FrameSequencer, RenderRequest, RenderResponse, Worker};
