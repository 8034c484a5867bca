//! Background workers module
//!
//! Rendering and histogram binning can run off the caller's thread. Each
//! worker owns its kernel, receives pixel buffers by move and sends results
//! back over a channel.

mod handle;
mod kernel;
mod kernels;
mod sequencer;

pub use handle::Worker;
pub use kernel::{Kernel, KernelHost};
pub use kernels::{
    HistogramKernel, HistogramRequest, HistogramResponse, RenderKernel, RenderRequest, RenderResponse,
};
pub use sequencer::FrameSequencer;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::config::PipelineConfig;

/// Starts a render worker whose kernel uses the rayon default thread count.
pub fn spawn_render_worker(config: &PipelineConfig) -> Result<Worker<RenderKernel>> {
    let threshold = config.parallel_render_threshold;
    Worker::spawn("render-worker", config.max_in_flight, move || {
        Ok(RenderKernel::new(0, threshold))
    })
}

pub fn spawn_histogram_worker(config: &PipelineConfig) -> Result<Worker<HistogramKernel>> {
    Worker::spawn("histogram-worker", config.max_in_flight, || Ok(HistogramKernel))
}
