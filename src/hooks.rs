//! Plugin points for user-supplied behavior.
//!
//! Hooks are shared, immutable closures. Every invocation goes through
//! [`guard`], so a hook that errors or panics only fails its own
//! particle/pair/field and never the surrounding tick.

use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use crate::{
    error::{EngineError, HookResult, HookSite},
    store::{EnergyField, Particle},
    types::{FieldId, Vec2},
};

type MovementFn = dyn Fn(&mut Particle, f32) -> HookResult + Send + Sync;
type InteractionFn = dyn Fn(&mut Particle, &mut Particle) -> HookResult + Send + Sync;
type FieldForceFn = dyn Fn(&Particle, &EnergyField, f32) -> HookResult<Vec2> + Send + Sync;
type FalloffFn = dyn Fn(f32, f32, f32) -> HookResult<f32> + Send + Sync;

pub(crate) fn guard<T>(
    site: HookSite,
    call: impl FnOnce() -> HookResult<T>,
) -> Result<T, EngineError> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(EngineError::Hook { site, source }),
        Err(_) => Err(EngineError::HookPanicked { site }),
    }
}

/// Per-tick movement for `MovementKind::Custom`; receives the particle and `dt`.
#[derive(Clone)]
pub struct MovementHook(Arc<MovementFn>);

impl MovementHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Particle, f32) -> HookResult + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub(crate) fn run(&self, particle: &mut Particle, dt: f32) -> Result<(), EngineError> {
        let site = HookSite::Movement {
            particle: particle.id,
        };
        guard(site, || (self.0)(particle, dt))
    }
}

impl fmt::Debug for MovementHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MovementHook(..)")
    }
}

/// Collision handler for `CollisionResponse::Custom`.
#[derive(Clone)]
pub struct InteractionHook(Arc<InteractionFn>);

impl InteractionHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Particle, &mut Particle) -> HookResult + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub(crate) fn run(&self, a: &mut Particle, b: &mut Particle) -> Result<(), EngineError> {
        let site = HookSite::Interaction { a: a.id, b: b.id };
        guard(site, || (self.0)(a, b))
    }
}

impl fmt::Debug for InteractionHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InteractionHook(..)")
    }
}

/// Force for `FieldKind::Custom`; returns the acceleration to add.
#[derive(Clone)]
pub struct FieldForceHook(Arc<FieldForceFn>);

impl FieldForceHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Particle, &EnergyField, f32) -> HookResult<Vec2> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub(crate) fn run(
        &self,
        particle: &Particle,
        field: &EnergyField,
        distance: f32,
    ) -> Result<Vec2, EngineError> {
        let site = HookSite::Field {
            field: field.id,
            particle: particle.id,
        };
        guard(site, || (self.0)(particle, field, distance))
    }
}

impl fmt::Debug for FieldForceHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldForceHook(..)")
    }
}

/// Magnitude curve for `Falloff::Custom`: `(distance, radius, strength) -> magnitude`.
#[derive(Clone)]
pub struct FalloffHook(Arc<FalloffFn>);

impl FalloffHook {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f32, f32, f32) -> HookResult<f32> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub(crate) fn run(
        &self,
        field: FieldId,
        distance: f32,
        radius: f32,
        strength: f32,
    ) -> Result<f32, EngineError> {
        guard(HookSite::Falloff { field }, || (self.0)(distance, radius, strength))
    }
}

impl fmt::Debug for FalloffHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FalloffHook(..)")
    }
}
