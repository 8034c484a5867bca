//! Stretch lookup tables mapping sensor values to 8-bit display values.

use std::fmt;
use std::str::FromStr;

/// Largest table ever built, regardless of bit depth.
pub const MAX_LUT_SIZE: usize = 65536;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StretchMethod {
    #[default]
    Linear,
    Log,
    /// Raw bit-depth rescale, ignoring min and max.
    None,
}

impl fmt::Display for StretchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StretchMethod::Linear => "linear",
            StretchMethod::Log => "log",
            StretchMethod::None => "none",
        })
    }
}

impl FromStr for StretchMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(StretchMethod::Linear),
            "log" | "logarithmic" => Ok(StretchMethod::Log),
            "none" => Ok(StretchMethod::None),
            other => Err(format!("unknown stretch method: {}", other)),
        }
    }
}

/// Number of entries for a given per-channel bit depth.
pub fn lut_size(bits_per_pixel: u32) -> usize {
    if bits_per_pixel >= 16 {
        MAX_LUT_SIZE
    } else {
        1usize << bits_per_pixel
    }
}

#[inline]
fn to_display(value: f64) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.round().clamp(0.0, 255.0) as u8
    }
}

/// Dense table of display values indexed by sensor value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StretchLut {
    table: Vec<u8>,
}

impl StretchLut {
    /// Builds the table for `[min, max]`. A non-positive range yields an
    /// all-zero table for every method.
    pub fn build(min: f64, max: f64, method: StretchMethod, bits_per_pixel: u32) -> Self {
        let size = lut_size(bits_per_pixel);
        let range = max - min;
        if !(range > 0.0) {
            return Self { table: vec![0; size] };
        }

        let table = match method {
            StretchMethod::Linear => (0..size)
                .map(|i| {
                    let v = (i as f64).clamp(min, max);
                    to_display((v - min) / range * 255.0)
                })
                .collect(),
            StretchMethod::Log => {
                let log_min = min.max(1.0).ln();
                let log_range = max.max(2.0).ln() - log_min;
                (0..size)
                    .map(|i| {
                        let v = i as f64;
                        if v <= 0.0 || !(log_range > 0.0) {
                            0
                        } else {
                            to_display((v.max(1.0).ln() - log_min) / log_range * 255.0)
                        }
                    })
                    .collect()
            }
            StretchMethod::None => {
                let last = (size - 1).max(1) as f64;
                (0..size).map(|i| to_display(i as f64 / last * 255.0)).collect()
            }
        };

        Self { table }
    }

    pub fn from_table(table: Vec<u8>) -> Self {
        Self { table }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.table
    }

    /// Display value for a sensor sample, clamped into the table's domain.
    #[inline]
    pub fn lookup(&self, value: f64) -> u8 {
        let Some(last) = self.table.len().checked_sub(1) else {
            return 0;
        };
        let index = if value.is_nan() || value <= 0.0 {
            0
        } else {
            (value as usize).min(last)
        };
        self.table[index]
    }
}
