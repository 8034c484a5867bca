use std::time::Duration;

use alpaca_imagebytes_rs::image_pipeline::{
    encode_image_bytes, ElementType, FrameSequencer, ImageBytesPipeline, ImageMetadata, PipelineConfig,
    PixelArray, ProcessedImageData, RenderRequest, StretchLut,
};
use alpaca_imagebytes_rs::image_pipeline::worker::spawn_render_worker;
use alpaca_imagebytes_rs::logger;

use anyhow::Context;
use tracing::{info, warn};

const SYNTHETIC_WIDTH: usize = 640;
const SYNTHETIC_HEIGHT: usize = 480;

/// A 16-bit gradient frame used when no input file is given.
fn synthetic_frame() -> Vec<u8> {
    let metadata = ImageMetadata {
        metadata_version: 1,
        error_number: 0,
        data_start: 44,
        image_element_type: ElementType::UInt16,
        transmission_element_type: ElementType::UInt16,
        rank: 2,
        dimension1: SYNTHETIC_WIDTH,
        dimension2: SYNTHETIC_HEIGHT,
        dimension3: 0,
        has_metadata: true,
    };
    let pixels: Vec<u16> = (0..SYNTHETIC_WIDTH)
        .flat_map(|x| (0..SYNTHETIC_HEIGHT).map(move |y| ((x * 97 + y * 61) % 60000) as u16))
        .collect();
    encode_image_bytes(&metadata, &PixelArray::from(pixels))
}

fn render_on_worker(config: &PipelineConfig, image: &ProcessedImageData<'_>) -> anyhow::Result<()> {
    let worker = spawn_render_worker(config).context("starting render worker")?;
    let mut sequencer = FrameSequencer::new();

    let lut = StretchLut::build(
        image.min_pixel_value,
        image.max_pixel_value,
        config.stretch,
        image.bits_per_pixel,
    );
    let id = sequencer.next_id();
    worker.submit(RenderRequest {
        id,
        data: image.pixel_data.clone().into_owned(),
        width: image.width,
        height: image.height,
        lut,
        channels: image.channels,
    })?;

    match worker.recv_timeout(Duration::from_secs(10))? {
        Some(response) if sequencer.accept(response.id) => {
            info!(id = response.id, bytes = response.output_data.len(), "Worker render complete");
        }
        Some(response) => warn!(
            id = response.id,
            latest = ?sequencer.latest_issued(),
            "Dropped stale render"
        ),
        None => warn!("Render worker timed out"),
    }
    worker.shutdown();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    logger::init();

    info!("Starting alpaca_imagebytes...");

    let config = PipelineConfig::builder().debayer(false).build();
    let pipeline = ImageBytesPipeline::new(config.clone());

    info!("ImageBytes pipeline initialized");
    info!("Stretch: {}", pipeline.config().stretch);
    info!(
        "Debayering: {}",
        if pipeline.config().debayer {
            "enabled"
        } else {
            "disabled"
        }
    );

    let input = match std::env::args().nth(1) {
        Some(path) => std::fs::read(&path).with_context(|| format!("reading {}", path))?,
        None => {
            info!("No input file given, using a synthetic {}x{} frame", SYNTHETIC_WIDTH, SYNTHETIC_HEIGHT);
            synthetic_frame()
        }
    };

    let (image, mut timings) = pipeline.process_with_timings(&input)?;
    info!(
        width = image.width,
        height = image.height,
        min = image.min_pixel_value,
        max = image.max_pixel_value,
        mean = image.mean_pixel_value,
        "Statistics"
    );

    let frame = pipeline.render_with_timings(&image, &mut timings);
    info!(rgba_bytes = frame.rgba.len(), bins = frame.histogram.len(), "Display frame ready");
    timings.log_summary();

    if !image.is_empty() {
        render_on_worker(&config, &image)?;
    }

    Ok(())
}
