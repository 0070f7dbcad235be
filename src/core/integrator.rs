use std::sync::Arc;

use rand::{Rng, rngs::StdRng};

use crate::{
    config::{self, PhysicsConfig},
    error::EngineError,
    registry::MovementKind,
    store::Particle,
    types::{Bounds, ParticleId, Vec2},
};

#[derive(Debug, Default)]
pub(crate) struct IntegrationPass {
    /// Particles that died or escaped; removed once the pass is over.
    pub expired: Vec<ParticleId>,
    pub errors: Vec<EngineError>,
}

pub(crate) fn integrate(
    particles: &mut [Particle],
    config: &PhysicsConfig,
    dt: f32,
    rng: &mut StdRng,
) -> IntegrationPass {
    let bounds = config.bounds;
    let center = bounds.center();
    let mut pass = IntegrationPass::default();

    for particle in particles.iter_mut() {
        particle.acceleration += config.gravity + Vec2::new(0.0, particle.kind.physics.gravity);
        particle.velocity = particle.velocity * config.air_resistance;
        particle.velocity += particle.acceleration * dt;
        particle.position += particle.velocity * dt;
        particle.acceleration = Vec2::ZERO;

        if let Err(err) = apply_movement(particle, center, dt, rng) {
            pass.errors.push(err);
        }

        reflect(particle, &bounds);
        particle.record_trail();
        particle.advance_age(dt);

        let escaped = !bounds.contains_with_margin(particle.position, 2.0 * particle.radius);
        if !particle.is_alive() || escaped {
            pass.expired.push(particle.id);
        }
    }

    pass
}

/// Adds the type's steering acceleration for the next tick.
fn apply_movement(
    particle: &mut Particle,
    center: Vec2,
    dt: f32,
    rng: &mut StdRng,
) -> Result<(), EngineError> {
    let kind = Arc::clone(&particle.kind);
    let behavior = &kind.behavior;
    let strength = kind.physics.field_strength;

    match &behavior.movement {
        MovementKind::Linear => {
            particle.acceleration += Vec2::from_angle(behavior.direction) * behavior.acceleration;
        }
        MovementKind::Orbital => {
            let radial = (particle.position - center).normalize();
            particle.acceleration += radial.perp() * (strength * config::ORBITAL_FORCE_SCALE);
        }
        MovementKind::Spiral => {
            let radial = (particle.position - center).normalize();
            let scale = strength * config::ORBITAL_FORCE_SCALE;
            let phase = particle.age * config::SPIRAL_PHASE_RATE;
            particle.acceleration += radial.perp() * scale;
            particle.acceleration -= radial * (scale * phase);
        }
        MovementKind::Chaotic => {
            let jitter = Vec2::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5));
            particle.acceleration += jitter * (strength * config::CHAOTIC_FORCE_SCALE);
        }
        MovementKind::Custom(hook) => hook.run(particle, dt)?,
    }
    Ok(())
}

/// Clamps the particle inside `bounds` and reflects only the violated axis.
pub(crate) fn reflect(particle: &mut Particle, bounds: &Bounds) {
    let r = particle.radius;
    let restitution = particle.restitution();

    if particle.position.x - r < bounds.left() {
        particle.position.x = bounds.left() + r;
        particle.velocity.x = particle.velocity.x.abs() * restitution;
    } else if particle.position.x + r > bounds.right() {
        particle.position.x = bounds.right() - r;
        particle.velocity.x = -particle.velocity.x.abs() * restitution;
    }

    if particle.position.y - r < bounds.top() {
        particle.position.y = bounds.top() + r;
        particle.velocity.y = particle.velocity.y.abs() * restitution;
    } else if particle.position.y + r > bounds.bottom() {
        particle.position.y = bounds.bottom() - r;
        particle.velocity.y = -particle.velocity.y.abs() * restitution;
    }
}
