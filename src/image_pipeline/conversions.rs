//! Pipeline conversions module
//!
//! Orchestrates decoding, optional debayering, statistics and display
//! rendering for ImageBytes frames.

mod image_bytes_pipeline;
mod types;

#[cfg(test)]
mod tests;

pub use image_bytes_pipeline::ImageBytesPipeline;
pub use types::{ImageType, ProcessedImageData};
