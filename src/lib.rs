//! Real-time 2D particle simulation: typed particles, energy fields,
//! pairwise collisions and affinity forces on a fixed-step clock.

pub mod config;
pub mod core;
pub mod error;
pub mod hooks;
pub mod presets;
pub mod registry;
pub mod store;
pub mod types;

pub use crate::{
    config::{PhysicsConfig, PhysicsConfigPatch},
    core::{CollisionEvent, Engine, EngineCallbacks, PerformanceMetrics},
    error::{ConfigError, EngineError, HookError, HookResult},
    registry::{CollisionResponse, MovementKind, ParticleType},
    store::{EnergyField, FieldKind, FieldSpec, Falloff, Particle, SpawnRequest},
    types::{Bounds, Color, FieldId, ParticleId, Vec2},
};
