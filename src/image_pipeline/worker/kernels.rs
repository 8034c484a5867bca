use tracing::{debug, warn};

use crate::image_pipeline::display::{render_display, render_display_parallel};
use crate::image_pipeline::pixels::{Channels, PixelArray, PixelOrder};
use crate::image_pipeline::stretch::{histogram, StretchLut};
use crate::image_pipeline::worker::kernel::Kernel;

/// Frame to render. The pixel buffer is moved into the worker.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub id: u64,
    pub data: PixelArray<'static>,
    pub width: usize,
    pub height: usize,
    pub lut: StretchLut,
    pub channels: Channels,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResponse {
    pub id: u64,
    /// Row-major RGBA8.
    pub output_data: Vec<u8>,
}

/// Applies display LUTs, splitting large frames across a private rayon pool.
pub struct RenderKernel {
    pool: Option<rayon::ThreadPool>,
    parallel_threshold: usize,
}

impl RenderKernel {
    /// Builds the kernel with a pool of `threads` threads (0 picks the rayon
    /// default). If the pool cannot be created every frame is rendered on
    /// the worker thread instead.
    pub fn new(threads: usize, parallel_threshold: usize) -> Self {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("render-{}", i))
            .build();
        match pool {
            Ok(pool) => {
                debug!(threads = pool.current_num_threads(), "Render pool ready");
                Self {
                    pool: Some(pool),
                    parallel_threshold,
                }
            }
            Err(e) => {
                warn!(error = %e, "Render pool unavailable, rendering sequentially");
                Self::sequential()
            }
        }
    }

    pub fn sequential() -> Self {
        Self {
            pool: None,
            parallel_threshold: usize::MAX,
        }
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }
}

impl Kernel for RenderKernel {
    type Request = RenderRequest;
    type Response = RenderResponse;

    fn handle(&mut self, request: RenderRequest) -> RenderResponse {
        let RenderRequest {
            id,
            data,
            width,
            height,
            lut,
            channels,
        } = request;

        let output_data = match &self.pool {
            Some(pool) if width.saturating_mul(height) > self.parallel_threshold => {
                pool.install(|| render_display_parallel(&data, width, height, &lut, channels))
            }
            _ => render_display(&data, width, height, &lut, channels),
        };
        RenderResponse { id, output_data }
    }
}

#[derive(Debug, Clone)]
pub struct HistogramRequest {
    pub id: u64,
    pub data: PixelArray<'static>,
    pub width: usize,
    pub height: usize,
    pub min: f64,
    pub max: f64,
    pub bin_count: usize,
    pub channels: Channels,
    pub order: PixelOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramResponse {
    pub id: u64,
    pub bins: Vec<u32>,
}

/// Bins frames off the render path. Stateless, so it is ready immediately.
#[derive(Debug, Default)]
pub struct HistogramKernel;

impl Kernel for HistogramKernel {
    type Request = HistogramRequest;
    type Response = HistogramResponse;

    fn handle(&mut self, request: HistogramRequest) -> HistogramResponse {
        let bins = histogram(
            &request.data,
            request.width,
            request.height,
            request.min,
            request.max,
            request.bin_count,
            request.channels,
            request.order,
        );
        HistogramResponse { id: request.id, bins }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::stretch::StretchMethod;

    fn request(id: u64, width: usize, height: usize) -> RenderRequest {
        RenderRequest {
            id,
            data: PixelArray::from((0..width * height).map(|i| (i % 256) as u8).collect::<Vec<_>>()),
            width,
            height,
            lut: StretchLut::build(0.0, 255.0, StretchMethod::Linear, 8),
            channels: Channels::Mono,
        }
    }

    #[test]
    fn test_parallel_and_sequential_kernels_agree() {
        let mut parallel = RenderKernel::new(2, 0);
        let mut sequential = RenderKernel::sequential();
        assert!(!sequential.is_parallel());

        let a = parallel.handle(request(1, 40, 30));
        let b = sequential.handle(request(1, 40, 30));
        assert_eq!(a, b);
        assert_eq!(a.output_data.len(), 40 * 30 * 4);
    }

    #[test]
    fn test_histogram_kernel_keeps_id() {
        let mut kernel = HistogramKernel;
        let response = kernel.handle(HistogramRequest {
            id: 9,
            data: PixelArray::from(vec![0u8, 255, 255, 128]),
            width: 2,
            height: 2,
            min: 0.0,
            max: 255.0,
            bin_count: 2,
            channels: Channels::Mono,
            order: PixelOrder::ColumnMajor,
        });
        assert_eq!(response, HistogramResponse { id: 9, bins: vec![2, 2] });
    }
}
