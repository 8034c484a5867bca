//! Pipeline configuration types

use crate::image_pipeline::debayer::BayerPattern;
use crate::image_pipeline::image_bytes::{HeaderFallback, DEFAULT_MAX_PIXELS};
use crate::image_pipeline::stretch::{StretchMethod, FULL_SCAN_LIMIT};

/// Configuration for ImageBytes processing and display
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Whether to debayer single-channel frames to RGB
    pub debayer: bool,
    /// Colour filter layout used when debayering
    pub bayer_pattern: BayerPattern,
    /// Tone mapping applied when building the display LUT
    pub stretch: StretchMethod,
    /// Number of histogram bins produced per frame
    pub histogram_bins: usize,
    /// Geometry and element type assumed when the header is unusable
    pub fallback: HeaderFallback,
    /// Whether to reject frames larger than `max_dimension`
    pub validate_dimensions: bool,
    /// Largest accepted width or height when validation is enabled
    pub max_dimension: Option<usize>,
    /// Largest element count decoded from a header; bigger frames come back empty
    pub max_pixels: Option<usize>,
    /// Pixel count above which rendering is split across threads
    pub parallel_render_threshold: usize,
    /// Requests a worker accepts before `submit` reports it busy
    pub max_in_flight: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debayer: false,
            bayer_pattern: BayerPattern::Rggb,
            stretch: StretchMethod::Linear,
            histogram_bins: 256,
            fallback: HeaderFallback::default(),
            validate_dimensions: false,
            max_dimension: None,
            max_pixels: Some(DEFAULT_MAX_PIXELS),
            parallel_render_threshold: FULL_SCAN_LIMIT,
            max_in_flight: 4,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    debayer: Option<bool>,
    bayer_pattern: Option<BayerPattern>,
    stretch: Option<StretchMethod>,
    histogram_bins: Option<usize>,
    fallback: Option<HeaderFallback>,
    validate_dimensions: Option<bool>,
    max_dimension: Option<Option<usize>>,
    max_pixels: Option<Option<usize>>,
    parallel_render_threshold: Option<usize>,
    max_in_flight: Option<usize>,
}

impl PipelineConfigBuilder {
    pub fn debayer(mut self, enable: bool) -> Self {
        self.debayer = Some(enable);
        self
    }

    pub fn bayer_pattern(mut self, pattern: BayerPattern) -> Self {
        self.bayer_pattern = Some(pattern);
        self
    }

    pub fn stretch(mut self, method: StretchMethod) -> Self {
        self.stretch = Some(method);
        self
    }

    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    pub fn fallback(mut self, fallback: HeaderFallback) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn max_dimension(mut self, max: Option<usize>) -> Self {
        self.max_dimension = Some(max);
        self
    }

    pub fn max_pixels(mut self, max: Option<usize>) -> Self {
        self.max_pixels = Some(max);
        self
    }

    pub fn parallel_render_threshold(mut self, pixels: usize) -> Self {
        self.parallel_render_threshold = Some(pixels);
        self
    }

    pub fn max_in_flight(mut self, requests: usize) -> Self {
        self.max_in_flight = Some(requests);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let default = PipelineConfig::default();
        PipelineConfig {
            debayer: self.debayer.unwrap_or(default.debayer),
            bayer_pattern: self.bayer_pattern.unwrap_or(default.bayer_pattern),
            stretch: self.stretch.unwrap_or(default.stretch),
            histogram_bins: self.histogram_bins.unwrap_or(default.histogram_bins),
            fallback: self.fallback.unwrap_or(default.fallback),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            max_dimension: self.max_dimension.unwrap_or(default.max_dimension),
            max_pixels: self.max_pixels.unwrap_or(default.max_pixels),
            parallel_render_threshold: self
                .parallel_render_threshold
                .unwrap_or(default.parallel_render_threshold),
            max_in_flight: self.max_in_flight.unwrap_or(default.max_in_flight).max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::image_bytes::ElementType;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert!(!config.debayer);
        assert_eq!(config.bayer_pattern, BayerPattern::Rggb);
        assert_eq!(config.stretch, StretchMethod::Linear);
        assert_eq!(config.histogram_bins, 256);
        assert_eq!(config.fallback.element_type, ElementType::UInt16);
        assert!(!config.validate_dimensions);
        assert_eq!(config.max_pixels, Some(1 << 28));
        assert_eq!(config.parallel_render_threshold, 1_000_000);
        assert_eq!(config.max_in_flight, 4);
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::builder()
            .debayer(true)
            .bayer_pattern(BayerPattern::Gbrg)
            .stretch(StretchMethod::Log)
            .histogram_bins(64)
            .validate_dimensions(true)
            .max_dimension(Some(10000))
            .max_pixels(None)
            .max_in_flight(0)
            .build();

        assert!(config.debayer);
        assert_eq!(config.bayer_pattern, BayerPattern::Gbrg);
        assert_eq!(config.stretch, StretchMethod::Log);
        assert_eq!(config.histogram_bins, 64);
        assert!(config.validate_dimensions);
        assert_eq!(config.max_dimension, Some(10000));
        assert_eq!(config.max_pixels, None);
        assert_eq!(config.max_in_flight, 1);
    }
}
