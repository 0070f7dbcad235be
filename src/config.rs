use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    types::{Bounds, Vec2},
};

pub const SIM_HZ: f32 = 60.0;
pub const RENDER_HZ: f32 = 30.0;
pub const DT: f32 = 1.0 / SIM_HZ;

pub const MAX_STEPS_PER_FRAME: u32 = 5;
pub const MAX_FRAME_DT: f32 = 1.0 / 15.0;

pub const DEFAULT_GRAVITY: Vec2 = Vec2 { x: 0.0, y: 0.5 };
pub const DEFAULT_AIR_RESISTANCE: f32 = 0.99;
pub const DEFAULT_MAX_PARTICLES: usize = 1000;
pub const DEFAULT_MAX_LIFE: f32 = 1.0;

pub const ORBITAL_FORCE_SCALE: f32 = 0.1;
pub const CHAOTIC_FORCE_SCALE: f32 = 0.1;
pub const SPIRAL_PHASE_RATE: f32 = 2.0;

pub const EXPONENTIAL_FALLOFF_RATE: f32 = 3.0;

pub const ATTRACT_RANGE: f32 = 100.0;
pub const REPEL_RANGE: f32 = 50.0;
pub const INTERACTION_SOFTENING: f32 = 1.0;

pub const SPLIT_PARTS_MIN: usize = 2;
pub const SPLIT_PARTS_MAX: usize = 4;
pub const SPLIT_SPEED_FACTOR: f32 = 0.5;

pub const COLLISION_HISTORY_LIMIT: usize = 100;
pub const PERF_SAMPLE_SECS: f32 = 1.0;

/// Global simulation settings. Changes apply from the next tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: Vec2,
    pub air_resistance: f32,
    pub time_step: f32,
    pub fixed_time_step: bool,
    pub max_particles: usize,
    pub bounds: Bounds,
    pub enable_collisions: bool,
    pub enable_fields: bool,
    pub enable_interactions: bool,
    pub performance_monitoring: bool,
    pub seed: Option<u64>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            air_resistance: DEFAULT_AIR_RESISTANCE,
            time_step: DT,
            fixed_time_step: true,
            max_particles: DEFAULT_MAX_PARTICLES,
            bounds: Bounds::default(),
            enable_collisions: true,
            enable_fields: true,
            enable_interactions: true,
            performance_monitoring: true,
            seed: None,
        }
    }
}

impl PhysicsConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: PhysicsConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.air_resistance > 0.0 && self.air_resistance <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "air_resistance must be in (0, 1], got {}",
                self.air_resistance
            )));
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }
        if self.max_particles == 0 {
            return Err(ConfigError::Invalid("max_particles must be non-zero".into()));
        }
        if !(self.bounds.width > 0.0 && self.bounds.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "bounds must have positive extent, got {}x{}",
                self.bounds.width, self.bounds.height
            )));
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::Invalid("gravity must be finite".into()));
        }
        Ok(())
    }

    /// Merges every field set in `patch`. Out-of-range values are clamped;
    /// non-finite or degenerate ones are ignored, so the result always
    /// passes [`validate`](Self::validate).
    pub fn apply(&mut self, patch: PhysicsConfigPatch) {
        if let Some(gravity) = patch.gravity {
            if gravity.is_finite() {
                self.gravity = gravity;
            }
        }
        if let Some(air) = patch.air_resistance {
            if air.is_finite() {
                self.air_resistance = air.clamp(f32::EPSILON, 1.0);
            }
        }
        if let Some(step) = patch.time_step {
            if step.is_finite() && step > 0.0 {
                self.time_step = step;
            }
        }
        if let Some(fixed) = patch.fixed_time_step {
            self.fixed_time_step = fixed;
        }
        if let Some(max) = patch.max_particles {
            self.max_particles = max.max(1);
        }
        if let Some(bounds) = patch.bounds {
            let finite = [bounds.x, bounds.y, bounds.width, bounds.height]
                .iter()
                .all(|v| v.is_finite());
            if finite && bounds.width > 0.0 && bounds.height > 0.0 {
                self.bounds = bounds;
            }
        }
        if let Some(on) = patch.enable_collisions {
            self.enable_collisions = on;
        }
        if let Some(on) = patch.enable_fields {
            self.enable_fields = on;
        }
        if let Some(on) = patch.enable_interactions {
            self.enable_interactions = on;
        }
        if let Some(on) = patch.performance_monitoring {
            self.performance_monitoring = on;
        }
    }
}

/// Partial update for [`PhysicsConfig`]; `None` leaves a setting untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfigPatch {
    pub gravity: Option<Vec2>,
    pub air_resistance: Option<f32>,
    pub time_step: Option<f32>,
    pub fixed_time_step: Option<bool>,
    pub max_particles: Option<usize>,
    pub bounds: Option<Bounds>,
    pub enable_collisions: Option<bool>,
    pub enable_fields: Option<bool>,
    pub enable_interactions: Option<bool>,
    pub performance_monitoring: Option<bool>,
}
