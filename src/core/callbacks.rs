use std::fmt;

use super::{collision::CollisionEvent, perf::PerformanceMetrics};
use crate::{error::EngineError, store::Particle};

type ParticleCallback = Box<dyn FnMut(&Particle)>;
type CollisionCallback = Box<dyn FnMut(&CollisionEvent)>;
type PerformanceCallback = Box<dyn FnMut(&PerformanceMetrics)>;
type ErrorCallback = Box<dyn FnMut(&EngineError)>;

/// Synchronous observers. Each hook fires exactly once per event, before the
/// engine call that caused it returns.
#[derive(Default)]
pub struct EngineCallbacks {
    on_particle_created: Option<ParticleCallback>,
    on_particle_destroyed: Option<ParticleCallback>,
    on_collision: Option<CollisionCallback>,
    on_performance_update: Option<PerformanceCallback>,
    on_error: Option<ErrorCallback>,
}

impl EngineCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_particle_created(mut self, f: impl FnMut(&Particle) + 'static) -> Self {
        self.on_particle_created = Some(Box::new(f));
        self
    }

    pub fn on_particle_destroyed(mut self, f: impl FnMut(&Particle) + 'static) -> Self {
        self.on_particle_destroyed = Some(Box::new(f));
        self
    }

    pub fn on_collision(mut self, f: impl FnMut(&CollisionEvent) + 'static) -> Self {
        self.on_collision = Some(Box::new(f));
        self
    }

    pub fn on_performance_update(mut self, f: impl FnMut(&PerformanceMetrics) + 'static) -> Self {
        self.on_performance_update = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnMut(&EngineError) + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub(crate) fn particle_created(&mut self, particle: &Particle) {
        if let Some(cb) = self.on_particle_created.as_mut() {
            cb(particle);
        }
    }

    pub(crate) fn particle_destroyed(&mut self, particle: &Particle) {
        if let Some(cb) = self.on_particle_destroyed.as_mut() {
            cb(particle);
        }
    }

    pub(crate) fn collision(&mut self, event: &CollisionEvent) {
        if let Some(cb) = self.on_collision.as_mut() {
            cb(event);
        }
    }

    pub(crate) fn performance(&mut self, metrics: &PerformanceMetrics) {
        if let Some(cb) = self.on_performance_update.as_mut() {
            cb(metrics);
        }
    }

    pub(crate) fn error(&mut self, err: &EngineError) {
        if let Some(cb) = self.on_error.as_mut() {
            cb(err);
        }
    }
}

impl fmt::Debug for EngineCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineCallbacks")
            .field("on_particle_created", &self.on_particle_created.is_some())
            .field("on_particle_destroyed", &self.on_particle_destroyed.is_some())
            .field("on_collision", &self.on_collision.is_some())
            .field("on_performance_update", &self.on_performance_update.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
