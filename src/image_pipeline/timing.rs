//! Per-stage wall clock timings for a processed frame.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Decode,
    Debayer,
    Statistics,
    Lut,
    Histogram,
    Render,
}

impl PipelineStage {
    pub fn name(self) -> &'static str {
        match self {
            PipelineStage::Decode => "decode",
            PipelineStage::Debayer => "debayer",
            PipelineStage::Statistics => "statistics",
            PipelineStage::Lut => "lut",
            PipelineStage::Histogram => "histogram",
            PipelineStage::Render => "render",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StageTiming {
    pub stage: PipelineStage,
    pub duration: Duration,
}

#[derive(Debug, Default, Clone)]
pub struct PipelineTimings {
    stages: Vec<StageTiming>,
}

impl PipelineTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, stage: PipelineStage, duration: Duration) {
        self.stages.push(StageTiming { stage, duration });
    }

    /// Runs `f`, recording its duration under `stage`.
    pub fn time<T>(&mut self, stage: PipelineStage, f: impl FnOnce() -> T) -> T {
        let timer = Timer::start(stage);
        let out = f();
        let (stage, duration) = timer.stop();
        self.add(stage, duration);
        out
    }

    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }

    /// Summed duration of every entry recorded for `stage`.
    pub fn get(&self, stage: PipelineStage) -> Option<Duration> {
        let mut matching = self.stages.iter().filter(|s| s.stage == stage).peekable();
        matching.peek()?;
        Some(matching.map(|s| s.duration).sum())
    }

    pub fn stages(&self) -> &[StageTiming] {
        &self.stages
    }

    pub fn log_summary(&self) {
        let total = self.total_duration();
        for s in &self.stages {
            let share = if total.is_zero() {
                0.0
            } else {
                s.duration.as_secs_f64() / total.as_secs_f64() * 100.0
            };
            info!(
                stage = s.stage.name(),
                ms = s.duration.as_secs_f64() * 1000.0,
                share_pct = share,
                "Stage timing"
            );
        }
        info!(total_ms = total.as_secs_f64() * 1000.0, "Pipeline total");
    }
}

pub struct Timer {
    start: Instant,
    stage: PipelineStage,
}

impl Timer {
    pub fn start(stage: PipelineStage) -> Self {
        Self {
            start: Instant::now(),
            stage,
        }
    }

    pub fn stop(self) -> (PipelineStage, Duration) {
        (self.stage, self.start.elapsed())
    }
}
