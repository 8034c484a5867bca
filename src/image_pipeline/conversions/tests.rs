use std::io::Write;

use crate::image_pipeline::common::error::{ProcessingError, Result};
use crate::image_pipeline::config::PipelineConfig;
use crate::image_pipeline::conversions::{ImageBytesPipeline, ImageType};
use crate::image_pipeline::debayer::BayerPattern;
use crate::image_pipeline::image_bytes::{
    encode_image_bytes, DecodedFrame, ElementType, FrameReader, HeaderFallback, ImageMetadata,
};
use crate::image_pipeline::pixels::{Channels, PixelArray};
use crate::image_pipeline::stretch::StretchMethod;
use crate::image_pipeline::timing::PipelineStage;

struct MockReader {
    should_fail: bool,
    frame: Option<DecodedFrame<'static>>,
}

impl FrameReader for MockReader {
    fn read_frame<'a>(&self, _data: &'a [u8]) -> Result<DecodedFrame<'a>> {
        if self.should_fail {
            return Err(ProcessingError::InputReadError("Mock read error".to_string()));
        }
        Ok(self.frame.clone().unwrap_or_else(|| DecodedFrame {
            metadata: header(100, 100, ElementType::UInt16),
            pixels: PixelArray::from(vec![0u16; 100 * 100]),
        }))
    }
}

fn header(width: usize, height: usize, element_type: ElementType) -> ImageMetadata {
    ImageMetadata {
        metadata_version: 1,
        error_number: 0,
        data_start: 44,
        image_element_type: element_type,
        transmission_element_type: element_type,
        rank: 2,
        dimension1: width,
        dimension2: height,
        dimension3: 0,
        has_metadata: true,
    }
}

fn colour_header(width: usize, height: usize, planes: usize) -> ImageMetadata {
    ImageMetadata {
        rank: 3,
        dimension3: planes,
        ..header(width, height, ElementType::UInt16)
    }
}

#[test]
fn test_end_to_end_mono_uint16() {
    let scale = 4096u16;
    let values: Vec<u16> = (0..16).map(|v| v * scale).collect();
    let bytes = encode_image_bytes(&header(4, 4, ElementType::UInt16), &PixelArray::from(values.clone()));

    let pipeline = ImageBytesPipeline::new(PipelineConfig::default());
    let image = pipeline.process(&bytes).unwrap();

    assert!(image.metadata.has_metadata);
    assert_eq!((image.width, image.height), (4, 4));
    assert_eq!(image.channels, Channels::Mono);
    assert_eq!(image.image_type, ImageType::Monochrome);
    assert!(!image.is_debayered);
    assert_eq!(image.bits_per_pixel, 16);
    assert_eq!(image.pixel_data, PixelArray::from(values));
    assert_eq!(image.min_pixel_value, 0.0);
    assert_eq!(image.max_pixel_value, 15.0 * scale as f64);
    assert_eq!(image.mean_pixel_value, 7.5 * scale as f64);
}

#[test]
fn test_end_to_end_rggb_debayer() {
    // Column-major 2x2: (0,0)=100 R, (0,1)=150 G, (1,0)=150 G, (1,1)=200 B
    let bytes = encode_image_bytes(
        &header(2, 2, ElementType::UInt16),
        &PixelArray::from(vec![100u16, 150, 150, 200]),
    );
    let config = PipelineConfig::builder()
        .debayer(true)
        .bayer_pattern(BayerPattern::Rggb)
        .build();
    let image = ImageBytesPipeline::new(config).process(&bytes).unwrap();

    assert!(image.is_debayered);
    assert_eq!(image.channels, Channels::Rgb);
    assert_eq!(image.image_type, ImageType::Color);
    assert_eq!(image.bits_per_pixel, 16);
    assert!(matches!(image.pixel_data, PixelArray::U16(_)));

    let px = |x: usize, y: usize, c: usize| image.pixel_data.get_f64((y * 2 + x) * 3 + c).unwrap();
    assert_eq!(px(0, 0, 0), 100.0);
    assert_eq!(px(1, 0, 1), 150.0);
    assert_eq!(px(0, 1, 1), 150.0);
    assert_eq!(px(1, 1, 2), 200.0);
}

#[test]
fn test_rank3_colour_is_reordered_row_major() {
    let (width, height) = (3, 2);
    let value = |x: usize, y: usize, c: usize| (100 * x + 10 * y + c) as u16;
    let mut wire = Vec::new();
    for x in 0..width {
        for y in 0..height {
            for c in 0..3 {
                wire.push(value(x, y, c));
            }
        }
    }
    let bytes = encode_image_bytes(&colour_header(width, height, 3), &PixelArray::from(wire));

    let image = ImageBytesPipeline::new(PipelineConfig::default()).process(&bytes).unwrap();
    assert_eq!(image.channels, Channels::Rgb);
    assert_eq!(image.image_type, ImageType::Color);
    assert!(!image.is_debayered);

    for y in 0..height {
        for x in 0..width {
            for c in 0..3 {
                let got = image.pixel_data.get_f64((y * width + x) * 3 + c).unwrap();
                assert_eq!(got, value(x, y, c) as f64, "x={} y={} c={}", x, y, c);
            }
        }
    }
}

#[test]
fn test_rank3_other_depth_uses_first_plane() {
    let wire: Vec<u16> = vec![1, 90, 2, 90, 3, 90, 4, 90];
    let bytes = encode_image_bytes(&colour_header(2, 2, 2), &PixelArray::from(wire));

    let image = ImageBytesPipeline::new(PipelineConfig::default()).process(&bytes).unwrap();
    assert_eq!(image.channels, Channels::Mono);
    assert_eq!(image.pixel_data, PixelArray::from(vec![1u16, 2, 3, 4]));
    assert_eq!(image.max_pixel_value, 4.0);
}

#[test]
fn test_corrupt_header_yields_empty_frame() {
    let pipeline = ImageBytesPipeline::new(PipelineConfig::default());
    let image = pipeline.process(&[0xFF; 20]).unwrap();

    assert!(image.is_empty());
    assert!(!image.metadata.has_metadata);
    assert_eq!(image.min_pixel_value, 0.0);
    assert_eq!(image.max_pixel_value, 65535.0);
    assert_eq!(image.mean_pixel_value, 32767.5);
}

#[test]
fn test_huge_header_on_tiny_buffer_degrades_to_empty() {
    let huge = header(i32::MAX as usize, i32::MAX as usize, ElementType::UInt16);
    let bytes = encode_image_bytes(&huge, &PixelArray::from(vec![1u16; 10]));
    assert_eq!(bytes.len(), 64);

    let image = ImageBytesPipeline::new(PipelineConfig::default()).process(&bytes).unwrap();
    assert!(image.is_empty());
    assert!(image.metadata.has_metadata);
    assert_eq!(image.max_pixel_value, 65535.0);
}

#[test]
fn test_max_pixels_applies_to_custom_readers() {
    let reader = MockReader { should_fail: false, frame: None };
    let config = PipelineConfig::builder().max_pixels(Some(100 * 99)).build();

    let image = ImageBytesPipeline::with_custom(reader, config).process(b"fake image bytes").unwrap();
    assert!(image.is_empty());
    assert_eq!(image.metadata.width(), 100);
    assert!(image.pixel_data.is_empty());
}

#[test]
fn test_headerless_buffer_uses_fallback_geometry() {
    let config = PipelineConfig::builder()
        .fallback(HeaderFallback {
            width: 2,
            height: 2,
            element_type: ElementType::Byte,
        })
        .build();
    let image = ImageBytesPipeline::new(config).process(&[5, 6, 7, 8]).unwrap();

    assert_eq!((image.width, image.height), (2, 2));
    assert_eq!(image.bits_per_pixel, 8);
    assert_eq!(image.min_pixel_value, 5.0);
    assert_eq!(image.max_pixel_value, 8.0);
}

#[test]
fn test_reader_failure() {
    let reader = MockReader { should_fail: true, frame: None };
    let pipeline = ImageBytesPipeline::with_custom(reader, PipelineConfig::default());

    let result = pipeline.process(b"fake image bytes");
    assert!(matches!(result.unwrap_err(), ProcessingError::InputReadError(_)));
}

#[test]
fn test_dimension_validation_success() {
    let reader = MockReader { should_fail: false, frame: None };
    let config = PipelineConfig::builder()
        .validate_dimensions(true)
        .max_dimension(Some(2000))
        .build();

    let pipeline = ImageBytesPipeline::with_custom(reader, config);
    assert!(pipeline.process(b"fake image bytes").is_ok());
}

#[test]
fn test_dimension_validation_failure() {
    let reader = MockReader {
        should_fail: false,
        frame: Some(DecodedFrame {
            metadata: header(10000, 10000, ElementType::UInt16),
            pixels: PixelArray::from(vec![0u16; 100]),
        }),
    };
    let config = PipelineConfig::builder()
        .validate_dimensions(true)
        .max_dimension(Some(5000))
        .build();

    let pipeline = ImageBytesPipeline::with_custom(reader, config);
    let result = pipeline.process(b"fake image bytes");
    assert!(matches!(result.unwrap_err(), ProcessingError::InvalidDimensions(10000, 10000)));
}

#[test]
fn test_dimension_validation_disabled() {
    let reader = MockReader {
        should_fail: false,
        frame: Some(DecodedFrame {
            metadata: header(3000, 10, ElementType::UInt16),
            pixels: PixelArray::from(vec![7u16; 100]),
        }),
    };
    let config = PipelineConfig::builder().max_dimension(Some(5)).build();

    let pipeline = ImageBytesPipeline::with_custom(reader, config);
    let image = pipeline.process(b"fake image bytes").unwrap();
    assert_eq!(image.width, 3000);
}

#[test]
fn test_render_display_frame() {
    let values: Vec<u16> = (0..16).map(|v| v * 4096).collect();
    let bytes = encode_image_bytes(&header(4, 4, ElementType::UInt16), &PixelArray::from(values));
    let config = PipelineConfig::builder()
        .stretch(StretchMethod::Linear)
        .histogram_bins(16)
        .build();
    let pipeline = ImageBytesPipeline::new(config);

    let image = pipeline.process(&bytes).unwrap();
    let frame = pipeline.render(&image);

    assert_eq!(frame.rgba.len(), 4 * 4 * 4);
    assert_eq!(frame.lut.len(), 65536);
    assert_eq!(frame.histogram.len(), 16);
    assert_eq!(frame.histogram.iter().sum::<u32>(), 16);
    assert_eq!(frame.stats, image.stats());
    // Top-left is the minimum, bottom-right (column 3, row 3) the maximum.
    assert_eq!(&frame.rgba[..4], &[0, 0, 0, 255]);
    assert_eq!(&frame.rgba[60..], &[255, 255, 255, 255]);
}

#[test]
fn test_parallel_render_matches_sequential() {
    let values: Vec<u16> = (0..64 * 48).map(|v| (v * 17 % 65536) as u16).collect();
    let bytes = encode_image_bytes(&header(64, 48, ElementType::UInt16), &PixelArray::from(values));

    let sequential = ImageBytesPipeline::new(PipelineConfig::default());
    let parallel = ImageBytesPipeline::new(PipelineConfig::builder().parallel_render_threshold(0).build());

    let image = sequential.process(&bytes).unwrap();
    assert_eq!(sequential.render(&image).rgba, parallel.render(&image).rgba);
}

#[test]
fn test_process_with_timings_records_stages() {
    let bytes = encode_image_bytes(&header(2, 2, ElementType::UInt16), &PixelArray::from(vec![1u16, 2, 3, 4]));
    let pipeline = ImageBytesPipeline::new(PipelineConfig::builder().debayer(true).build());

    let (_, timings) = pipeline.process_with_timings(&bytes).unwrap();
    assert!(timings.get(PipelineStage::Decode).is_some());
    assert!(timings.get(PipelineStage::Debayer).is_some());
    assert!(timings.get(PipelineStage::Statistics).is_some());
}

#[test]
fn test_process_file() {
    let bytes = encode_image_bytes(&header(2, 1, ElementType::Byte), &PixelArray::from(vec![10u8, 20]));
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();

    let pipeline = ImageBytesPipeline::new(PipelineConfig::default());
    let image = pipeline.process_file(file.path()).unwrap();
    assert_eq!(image.pixel_data, PixelArray::from(vec![10u8, 20]));
    assert!(!image.pixel_data.is_borrowed());
}

#[test]
fn test_process_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = ImageBytesPipeline::new(PipelineConfig::default());

    let result = pipeline.process_file(dir.path().join("missing.bin"));
    assert!(matches!(result.unwrap_err(), ProcessingError::InputReadError(_)));
}
