use crate::{
    error::EngineError,
    store::{EnergyField, FieldKind, Particle},
    types::Vec2,
};

/// Adds the force of every active field to the particles inside its radius.
pub(crate) fn apply_fields(fields: &[EnergyField], particles: &mut [Particle]) -> Vec<EngineError> {
    let mut errors = Vec::new();
    for field in fields.iter().filter(|f| f.active) {
        for particle in particles.iter_mut() {
            match field_force(field, particle) {
                Ok(Some(force)) => particle.acceleration += force,
                Ok(None) => {}
                Err(err) => errors.push(err),
            }
        }
    }
    errors
}

/// Force `field` exerts on `particle`, or `None` outside the radius or at the
/// exact center.
pub(crate) fn field_force(
    field: &EnergyField,
    particle: &Particle,
) -> Result<Option<Vec2>, EngineError> {
    let delta = field.position - particle.position;
    let distance = delta.length();
    if distance > field.radius || distance == 0.0 {
        return Ok(None);
    }

    let dir = delta / distance;
    let magnitude = || {
        field
            .falloff
            .magnitude(field.id, field.strength, distance, field.radius)
    };
    let force = match &field.kind {
        FieldKind::Attraction => dir * magnitude()?,
        FieldKind::Repulsion => -dir * magnitude()?,
        FieldKind::Gravity => dir * (magnitude()? * particle.mass),
        FieldKind::Magnetic => dir.perp() * (magnitude()? * particle.charge),
        FieldKind::Electric => dir * (magnitude()? * particle.charge),
        FieldKind::Custom(hook) => hook.run(particle, field, distance)?,
    };
    Ok(Some(force))
}
