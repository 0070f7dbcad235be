use std::time::{Duration, Instant};

use crate::config;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PerformanceMetrics {
    /// Ticks per wall-clock second over the last sample window.
    pub fps: f32,
    pub frame_time_ms: f32,
    pub physics_time_ms: f32,
    pub particle_count: usize,
    pub field_count: usize,
    pub collision_checks: usize,
    pub collisions: usize,
    pub ticks: u64,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct TickCounts {
    pub particles: usize,
    pub fields: usize,
    pub collision_checks: usize,
    pub collisions: usize,
}

#[derive(Debug)]
pub(crate) struct PerfTracker {
    metrics: PerformanceMetrics,
    window_start: Instant,
    window_ticks: u32,
}

impl PerfTracker {
    pub fn new(now: Instant) -> Self {
        Self {
            metrics: PerformanceMetrics::default(),
            window_start: now,
            window_ticks: 0,
        }
    }

    pub fn record_frame(&mut self, frame: Duration) {
        self.metrics.frame_time_ms = frame.as_secs_f32() * 1000.0;
    }

    pub fn record_tick(&mut self, elapsed: Duration, counts: TickCounts) {
        self.metrics.physics_time_ms = elapsed.as_secs_f32() * 1000.0;
        self.metrics.particle_count = counts.particles;
        self.metrics.field_count = counts.fields;
        self.metrics.collision_checks = counts.collision_checks;
        self.metrics.collisions = counts.collisions;
        self.metrics.ticks += 1;
        self.window_ticks += 1;
    }

    /// Closes the sample window once it is at least `PERF_SAMPLE_SECS` old.
    pub fn sample(&mut self, now: Instant) -> Option<PerformanceMetrics> {
        let secs = now.saturating_duration_since(self.window_start).as_secs_f32();
        if secs < config::PERF_SAMPLE_SECS {
            return None;
        }
        self.metrics.fps = self.window_ticks as f32 / secs;
        self.window_ticks = 0;
        self.window_start = now;
        Some(self.metrics)
    }

    pub fn metrics(&self) -> PerformanceMetrics {
        self.metrics
    }

    pub fn reset(&mut self, now: Instant) {
        *self = Self::new(now);
    }
}
