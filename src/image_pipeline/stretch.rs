//! Tone stretching module
//!
//! Sampled statistics, stretch lookup tables and histograms that turn
//! sensor values into 8-bit display values.

mod histogram;
mod lut;
mod sampling;
mod statistics;

pub use histogram::histogram;
pub use lut::{lut_size, StretchLut, StretchMethod, MAX_LUT_SIZE};
pub use sampling::{sample_step, FULL_SCAN_LIMIT};
pub use statistics::{bit_depth_max, compute_stats, PixelStats};
