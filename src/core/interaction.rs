use crate::{config, store::Particle, types::Vec2};

/// Non-contact affinity forces. Each ordered pair is evaluated on its own:
/// the particle whose type lists the other is the one that gets pushed.
/// Returns how many pair forces were applied.
pub(crate) fn apply_interactions(particles: &mut [Particle], acc: &mut Vec<Vec2>) -> usize {
    acc.clear();
    acc.resize(particles.len(), Vec2::ZERO);
    let mut applied = 0;

    for (i, a) in particles.iter().enumerate() {
        let rules = &a.kind.interactions;
        if rules.attracts.is_empty() && rules.repels.is_empty() {
            continue;
        }
        let mut total = Vec2::ZERO;
        for (j, b) in particles.iter().enumerate() {
            if i == j {
                continue;
            }
            let delta = b.position - a.position;
            let dist_sq = delta.length_sq();
            if dist_sq == 0.0 {
                continue;
            }
            let distance = dist_sq.sqrt();
            let dir = delta / distance;
            let force =
                a.field_strength() * b.field_strength() / (dist_sq + config::INTERACTION_SOFTENING);

            if distance < config::ATTRACT_RANGE && rules.attracts(b.type_id()) {
                total += dir * force;
                applied += 1;
            }
            if distance < config::REPEL_RANGE && rules.repels(b.type_id()) {
                total -= dir * force;
                applied += 1;
            }
        }
        acc[i] = total;
    }

    for (particle, extra) in particles.iter_mut().zip(acc.iter()) {
        particle.acceleration += *extra;
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        registry::{Interactions, ParticleType},
        store::ParticleMetadata,
    };
    use std::sync::Arc;

    fn kind(id: &str, attracts: &[&str], repels: &[&str]) -> Arc<ParticleType> {
        let ty = ParticleType::new(id, id).with_interactions(Interactions {
            attracts: attracts.iter().map(|s| s.to_string()).collect(),
            repels: repels.iter().map(|s| s.to_string()).collect(),
            ..Interactions::default()
        });
        Arc::new(ty)
    }

    fn at(id: u64, kind: Arc<ParticleType>, x: f32) -> Particle {
        Particle::from_type(
            id,
            kind,
            Vec2::new(x, 0.0),
            Vec2::ZERO,
            1.0,
            ParticleMetadata::default(),
        )
    }

    #[test]
    fn attraction_pulls_declaring_particle_toward_target() {
        let mut particles = vec![at(1, kind("a", &["b"], &[]), 0.0), at(2, kind("b", &[], &[]), 10.0)];
        let mut acc = Vec::new();
        let applied = apply_interactions(&mut particles, &mut acc);
        assert_eq!(applied, 1);
        let expected = 1.0 / (100.0 + config::INTERACTION_SOFTENING);
        assert!((particles[0].acceleration.x - expected).abs() < 1e-6);
        assert_eq!(particles[1].acceleration, Vec2::ZERO);
    }

    #[test]
    fn attraction_has_limited_range() {
        let mut particles = vec![
            at(1, kind("a", &["b"], &[]), 0.0),
            at(2, kind("b", &[], &[]), config::ATTRACT_RANGE + 1.0),
        ];
        let applied = apply_interactions(&mut particles, &mut Vec::new());
        assert_eq!(applied, 0);
        assert_eq!(particles[0].acceleration, Vec2::ZERO);
    }

    #[test]
    fn repulsion_range_is_shorter_than_attraction() {
        let mut particles = vec![
            at(1, kind("a", &[], &["b"]), 0.0),
            at(2, kind("b", &[], &[]), 60.0),
        ];
        assert_eq!(apply_interactions(&mut particles, &mut Vec::new()), 0);

        particles[1].position.x = 20.0;
        apply_interactions(&mut particles, &mut Vec::new());
        assert!(particles[0].acceleration.x < 0.0);
    }

    #[test]
    fn directions_are_independent() {
        let mut particles = vec![
            at(1, kind("a", &["b"], &[]), 0.0),
            at(2, kind("b", &[], &["a"]), 10.0),
        ];
        let applied = apply_interactions(&mut particles, &mut Vec::new());
        assert_eq!(applied, 2);
        // a chases b, b flees a: both accelerate in +x
        assert!(particles[0].acceleration.x > 0.0);
        assert!(particles[1].acceleration.x > 0.0);
    }

    #[test]
    fn inverse_square_weakens_with_distance() {
        let mut near = vec![at(1, kind("a", &["b"], &[]), 0.0), at(2, kind("b", &[], &[]), 5.0)];
        let mut far = vec![at(1, kind("a", &["b"], &[]), 0.0), at(2, kind("b", &[], &[]), 20.0)];
        apply_interactions(&mut near, &mut Vec::new());
        apply_interactions(&mut far, &mut Vec::new());
        assert!(near[0].acceleration.x > far[0].acceleration.x * 10.0);
    }
}
