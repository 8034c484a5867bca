//! Debayering module for converting Bayer pattern mosaics to RGB

pub mod cpu_debayer;
pub mod types;

pub use cpu_debayer::{debayer, CpuDebayer};
pub use types::{BayerPattern, CfaColor, RgbImageData};
