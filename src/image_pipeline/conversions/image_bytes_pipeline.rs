use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::image_pipeline::{
    common::error::{ProcessingError, Result},
    config::PipelineConfig,
    conversions::types::{ImageType, ProcessedImageData},
    debayer::CpuDebayer,
    display::{render_display, render_display_parallel, DisplayFrame},
    image_bytes::{DecodedFrame, FrameReader, ImageBytesReader, ImageMetadata},
    pixels::{Channels, PixelArray},
    stretch::{compute_stats, histogram, StretchLut},
    timing::{PipelineStage, PipelineTimings},
};

pub struct ImageBytesPipeline<R: FrameReader> {
    reader: R,
    config: PipelineConfig,
}

impl ImageBytesPipeline<ImageBytesReader> {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            reader: ImageBytesReader::new(config.fallback).with_max_pixels(config.max_pixels),
            config,
        }
    }
}

impl<R: FrameReader> ImageBytesPipeline<R> {
    pub fn with_custom(reader: R, config: PipelineConfig) -> Self {
        Self { reader, config }
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if let Some(max) = self.config.max_dimension {
            if width > max || height > max {
                warn!("Image dimensions {}x{} exceed maximum {}", width, height, max);
                return Err(ProcessingError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    /// Decodes an ImageBytes payload and computes its statistics.
    ///
    /// Malformed payloads degrade instead of failing; errors come only from
    /// the reader or from dimension validation.
    pub fn process<'a>(&self, input_data: &'a [u8]) -> Result<ProcessedImageData<'a>> {
        self.process_with_timings(input_data).map(|(image, _)| image)
    }

    #[instrument(skip(self, input_data), fields(input_size = input_data.len()))]
    pub fn process_with_timings<'a>(
        &self,
        input_data: &'a [u8],
    ) -> Result<(ProcessedImageData<'a>, PipelineTimings)> {
        let mut timings = PipelineTimings::new();

        let frame = {
            let _span = tracing::info_span!("decode_image_bytes").entered();
            timings.time(PipelineStage::Decode, || self.reader.read_frame(input_data))?
        };
        let DecodedFrame { metadata, pixels } = frame;
        let (width, height) = (metadata.width(), metadata.height());
        let bits_per_pixel = metadata.transmission_element_type.bits();

        self.validate_dimensions(width, height)?;

        if !metadata.within_limits(self.config.max_pixels) {
            warn!(
                width,
                height,
                planes = metadata.planes(),
                max_pixels = ?self.config.max_pixels,
                "Frame exceeds pixel limit, skipping"
            );
            return Ok((ProcessedImageData::empty(metadata, bits_per_pixel), timings));
        }

        if width == 0 || height == 0 || pixels.is_empty() {
            warn!(width, height, has_metadata = metadata.has_metadata, "No displayable image in payload");
            return Ok((ProcessedImageData::empty(metadata, bits_per_pixel), timings));
        }

        let mut image = self.assemble(metadata, pixels, bits_per_pixel, &mut timings);

        let stats = {
            let _span = tracing::info_span!("compute_stats", width, height).entered();
            timings.time(PipelineStage::Statistics, || {
                compute_stats(
                    &image.pixel_data,
                    width,
                    height,
                    image.channels,
                    image.pixel_order(),
                    image.bits_per_pixel,
                )
            })
        };
        image.min_pixel_value = stats.min;
        image.max_pixel_value = stats.max;
        image.mean_pixel_value = stats.mean;

        info!(
            width,
            height,
            channels = image.channels.count(),
            bits_per_pixel = image.bits_per_pixel,
            debayered = image.is_debayered,
            "Frame processed"
        );
        Ok((image, timings))
    }

    /// Chooses the frame's colour layout: native RGB planes, a debayered
    /// mosaic, or the mono payload untouched.
    fn assemble<'a>(
        &self,
        metadata: ImageMetadata,
        pixels: PixelArray<'a>,
        bits_per_pixel: u32,
        timings: &mut PipelineTimings,
    ) -> ProcessedImageData<'a> {
        let (width, height) = (metadata.width(), metadata.height());
        let planes = metadata.planes();
        let mut image = ProcessedImageData {
            width,
            height,
            channels: Channels::Mono,
            pixel_data: pixels,
            is_debayered: false,
            image_type: ImageType::Monochrome,
            bits_per_pixel,
            min_pixel_value: 0.0,
            max_pixel_value: 0.0,
            mean_pixel_value: 0.0,
            metadata,
        };

        if metadata.is_color() {
            debug!("Reordering colour planes to row-major RGB");
            // Wire layout is [x][y][c] with the plane index fastest.
            image.pixel_data = image.pixel_data.gather(width * height * 3, |j| {
                let (p, c) = (j / 3, j % 3);
                let (x, y) = (p % width, p / width);
                (x * height + y) * 3 + c
            });
            image.channels = Channels::Rgb;
            image.image_type = ImageType::Color;
        } else if planes > 1 {
            debug!(planes, "Unsupported plane count, using plane 0");
            image.pixel_data = image.pixel_data.gather(width * height, |j| j * planes);
        } else if self.config.debayer {
            let _span = tracing::info_span!("debayer", pattern = %self.config.bayer_pattern).entered();
            let rgb = timings.time(PipelineStage::Debayer, || {
                CpuDebayer::new(self.config.bayer_pattern).process(&image.pixel_data, width, height, bits_per_pixel)
            });
            image.pixel_data = rgb.data;
            image.bits_per_pixel = rgb.bits_per_sample;
            image.channels = Channels::Rgb;
            image.image_type = ImageType::Color;
            image.is_debayered = true;
        }

        image
    }

    /// Reads and processes an ImageBytes file. The result owns its pixels.
    #[instrument(skip(self, input_path))]
    pub fn process_file<P: AsRef<Path>>(&self, input_path: P) -> Result<ProcessedImageData<'static>> {
        let input_path = input_path.as_ref();
        info!(input = %input_path.display(), "Processing file");

        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                ProcessingError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };

        Ok(self.process(&input_data)?.into_owned())
    }

    /// Builds the stretch LUT, histogram and RGBA buffer for a processed frame.
    pub fn render(&self, image: &ProcessedImageData<'_>) -> DisplayFrame {
        let mut timings = PipelineTimings::new();
        self.render_with_timings(image, &mut timings)
    }

    #[instrument(skip_all, fields(width = image.width, height = image.height))]
    pub fn render_with_timings(&self, image: &ProcessedImageData<'_>, timings: &mut PipelineTimings) -> DisplayFrame {
        let stats = image.stats();
        let (width, height) = (image.width, image.height);

        let lut = timings.time(PipelineStage::Lut, || {
            StretchLut::build(stats.min, stats.max, self.config.stretch, image.bits_per_pixel)
        });

        let bins = timings.time(PipelineStage::Histogram, || {
            histogram(
                &image.pixel_data,
                width,
                height,
                stats.min,
                stats.max,
                self.config.histogram_bins,
                image.channels,
                image.pixel_order(),
            )
        });

        let rgba = timings.time(PipelineStage::Render, || {
            if width.saturating_mul(height) > self.config.parallel_render_threshold {
                render_display_parallel(&image.pixel_data, width, height, &lut, image.channels)
            } else {
                render_display(&image.pixel_data, width, height, &lut, image.channels)
            }
        });

        DisplayFrame {
            width,
            height,
            rgba,
            histogram: bins,
            lut,
            stats,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Replaces the processing options. A reader built by [`new`](ImageBytesPipeline::new)
    /// keeps the header fallback it was created with.
    pub fn set_config(&mut self, config: PipelineConfig) {
        self.config = config;
    }
}
