use std::{
    collections::{HashSet, VecDeque},
    f32::consts::TAU,
    sync::Arc,
};

use rand::{Rng, rngs::StdRng};

use crate::{
    config,
    error::EngineError,
    registry::CollisionResponse,
    store::{Offspring, Particle, ParticleOrigin},
    types::{ParticleId, Vec2},
};

/// A detected overlap, with both particles as they were on contact.
#[derive(Clone, Debug)]
pub struct CollisionEvent {
    pub a: Particle,
    pub b: Particle,
    /// Midpoint between the two centers.
    pub point: Vec2,
    /// Unit vector from `a` towards `b`.
    pub normal: Vec2,
    /// `b.velocity - a.velocity`.
    pub relative_velocity: Vec2,
    pub impact: f32,
    pub response: CollisionResponse,
    /// Simulation clock in seconds.
    pub timestamp: f32,
}

#[derive(Clone, Copy, Debug)]
struct Contact {
    point: Vec2,
    normal: Vec2,
    overlap: f32,
}

#[derive(Debug, Default)]
pub(crate) struct CollisionPass {
    pub events: Vec<CollisionEvent>,
    /// Particles removed by merge/destroy/split, in detection order.
    pub consumed: Vec<ParticleId>,
    pub offspring: Vec<Offspring>,
    pub errors: Vec<EngineError>,
    pub checks: usize,
}

/// Pairwise overlap test over every live particle. Structural changes are
/// only recorded here; the caller applies them after the pass.
pub(crate) fn resolve(particles: &mut [Particle], now: f32, rng: &mut StdRng) -> CollisionPass {
    let mut pass = CollisionPass::default();
    let mut consumed: HashSet<ParticleId> = HashSet::new();

    for i in 0..particles.len() {
        for j in (i + 1)..particles.len() {
            if consumed.contains(&particles[i].id) {
                break;
            }
            if consumed.contains(&particles[j].id) {
                continue;
            }
            pass.checks += 1;

            let (left, right) = particles.split_at_mut(j);
            let a = &mut left[i];
            let b = &mut right[0];

            let Some(contact) = detect(a, b) else {
                continue;
            };
            let response = a
                .kind
                .interactions
                .collision
                .resolve(b.kind.interactions.collision);
            let relative_velocity = b.velocity - a.velocity;
            pass.events.push(CollisionEvent {
                a: a.clone(),
                b: b.clone(),
                point: contact.point,
                normal: contact.normal,
                relative_velocity,
                impact: relative_velocity.dot(contact.normal).abs(),
                response,
                timestamp: now,
            });

            match response {
                CollisionResponse::Bounce => bounce(a, b, &contact),
                CollisionResponse::Merge => {
                    pass.offspring.push(merge(a, b, contact.point));
                    consume(&mut consumed, &mut pass.consumed, a.id, b.id);
                }
                CollisionResponse::Destroy => {
                    consume(&mut consumed, &mut pass.consumed, a.id, b.id);
                }
                CollisionResponse::Split => {
                    split(a, contact.point, rng, &mut pass.offspring);
                    split(b, contact.point, rng, &mut pass.offspring);
                    consume(&mut consumed, &mut pass.consumed, a.id, b.id);
                }
                CollisionResponse::Custom => {
                    let kind = Arc::clone(&a.kind);
                    if let Some(hook) = &kind.interactions.custom {
                        if let Err(err) = hook.run(a, b) {
                            pass.errors.push(err);
                        }
                    }
                }
            }
        }
    }

    pass
}

fn consume(
    seen: &mut HashSet<ParticleId>,
    order: &mut Vec<ParticleId>,
    a: ParticleId,
    b: ParticleId,
) {
    for id in [a, b] {
        if seen.insert(id) {
            order.push(id);
        }
    }
}

fn detect(a: &Particle, b: &Particle) -> Option<Contact> {
    let delta = b.position - a.position;
    let distance = delta.length();
    let min_distance = a.radius + b.radius;
    if distance <= 0.0 || distance >= min_distance {
        return None;
    }
    Some(Contact {
        point: (a.position + b.position) * 0.5,
        normal: delta / distance,
        overlap: min_distance - distance,
    })
}

/// Impulse along the normal using averaged restitution, then symmetric
/// positional separation.
fn bounce(a: &mut Particle, b: &mut Particle, contact: &Contact) {
    let normal = contact.normal;
    let rel_along = (b.velocity - a.velocity).dot(normal);
    if rel_along < 0.0 {
        let restitution = (a.restitution() + b.restitution()) * 0.5;
        let inv_mass_a = 1.0 / a.mass;
        let inv_mass_b = 1.0 / b.mass;
        let impulse_mag = -(1.0 + restitution) * rel_along / (inv_mass_a + inv_mass_b);
        let impulse = normal * impulse_mag;
        a.velocity -= impulse * inv_mass_a;
        b.velocity += impulse * inv_mass_b;
    }

    let push = normal * (contact.overlap * 0.5);
    a.position -= push;
    b.position += push;
}

fn merge(a: &Particle, b: &Particle, point: Vec2) -> Offspring {
    let total_mass = a.mass + b.mass;
    let velocity = (a.velocity * a.mass + b.velocity * b.mass) / total_mass;
    let kind = if b.energy > a.energy {
        Arc::clone(&b.kind)
    } else {
        Arc::clone(&a.kind)
    };
    Offspring {
        kind,
        position: point,
        velocity,
        mass: Some(total_mass),
        energy: Some(a.energy + b.energy),
        max_life: a.max_life.max(b.max_life),
        origin: ParticleOrigin::Merge,
    }
}

/// Fans 2..=4 children of the parent's type out from `point`.
fn split(parent: &Particle, point: Vec2, rng: &mut StdRng, out: &mut Vec<Offspring>) {
    let parts = rng.gen_range(config::SPLIT_PARTS_MIN..=config::SPLIT_PARTS_MAX);
    let speed = parent.kind.behavior.speed * config::SPLIT_SPEED_FACTOR;
    for k in 0..parts {
        let angle = TAU * k as f32 / parts as f32;
        out.push(Offspring {
            kind: Arc::clone(&parent.kind),
            position: point,
            velocity: Vec2::from_angle(angle) * speed,
            mass: None,
            energy: None,
            max_life: parent.max_life,
            origin: ParticleOrigin::Split,
        });
    }
}

/// Bounded collision history; the oldest events fall off first.
#[derive(Debug)]
pub(crate) struct CollisionLog {
    events: VecDeque<CollisionEvent>,
    limit: usize,
}

impl CollisionLog {
    pub fn new(limit: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn push(&mut self, event: CollisionEvent) {
        if self.limit == 0 {
            return;
        }
        if self.events.len() >= self.limit {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn snapshot(&self) -> Vec<CollisionEvent> {
        self.events.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hooks::InteractionHook,
        registry::{Behavior, Interactions, ParticleType},
        store::ParticleMetadata,
    };
    use rand::SeedableRng;

    fn kind(id: &str, response: CollisionResponse, mass: f32) -> Arc<ParticleType> {
        let mut ty = ParticleType::new(id, id);
        ty.physics.mass = mass;
        ty.physics.restitution = 1.0;
        ty.appearance.size = 5.0;
        ty.behavior = Behavior {
            speed: 4.0,
            ..Behavior::default()
        };
        ty.interactions = Interactions {
            collision: response,
            ..Interactions::default()
        };
        Arc::new(ty)
    }

    fn particle(id: ParticleId, kind: Arc<ParticleType>, x: f32, vx: f32) -> Particle {
        Particle::from_type(
            id,
            kind,
            Vec2::new(x, 0.0),
            Vec2::new(vx, 0.0),
            1.0,
            ParticleMetadata::default(),
        )
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(9)
    }

    mod resolve {
        use super::*;

        #[test]
        fn separated_particles_do_not_collide() {
            let k = kind("a", CollisionResponse::Bounce, 1.0);
            let mut particles = vec![particle(1, k.clone(), 0.0, 0.0), particle(2, k, 20.0, 0.0)];
            let pass = resolve(&mut particles, 0.0, &mut rng());
            assert!(pass.events.is_empty());
            assert_eq!(pass.checks, 1);
        }

        #[test]
        fn bounce_exchanges_velocity_for_equal_masses() {
            let k = kind("a", CollisionResponse::Bounce, 1.0);
            let mut particles = vec![particle(1, k.clone(), 0.0, 2.0), particle(2, k, 8.0, -2.0)];
            let pass = resolve(&mut particles, 1.5, &mut rng());
            assert_eq!(pass.events.len(), 1);
            assert!(pass.consumed.is_empty());
            assert!((particles[0].velocity.x + 2.0).abs() < 1e-5);
            assert!((particles[1].velocity.x - 2.0).abs() < 1e-5);
            // overlap of 2 split evenly
            assert!((particles[0].position.x + 1.0).abs() < 1e-5);
            assert!((particles[1].position.x - 9.0).abs() < 1e-5);
            let event = &pass.events[0];
            assert_eq!(event.point, Vec2::new(4.0, 0.0));
            assert_eq!(event.normal, Vec2::new(1.0, 0.0));
            assert_eq!(event.impact, 4.0);
            assert_eq!(event.timestamp, 1.5);
        }

        #[test]
        fn separating_pair_only_gets_pushed_apart() {
            let k = kind("a", CollisionResponse::Bounce, 1.0);
            let mut particles = vec![particle(1, k.clone(), 0.0, -1.0), particle(2, k, 8.0, 1.0)];
            resolve(&mut particles, 0.0, &mut rng());
            assert_eq!(particles[0].velocity.x, -1.0);
            assert_eq!(particles[1].velocity.x, 1.0);
        }

        #[test]
        fn destroy_beats_bounce() {
            let mut particles = vec![
                particle(1, kind("b", CollisionResponse::Bounce, 1.0), 0.0, 0.0),
                particle(2, kind("d", CollisionResponse::Destroy, 1.0), 5.0, 0.0),
            ];
            let pass = resolve(&mut particles, 0.0, &mut rng());
            assert_eq!(pass.events[0].response, CollisionResponse::Destroy);
            assert_eq!(pass.consumed, vec![1, 2]);
            assert!(pass.offspring.is_empty());
        }

        #[test]
        fn merge_conserves_momentum() {
            let mut a = particle(1, kind("light", CollisionResponse::Merge, 2.0), 0.0, 3.0);
            let mut b = particle(2, kind("heavy", CollisionResponse::Merge, 4.0), 6.0, -1.5);
            a.velocity.y = 1.0;
            b.energy = 5.0;
            let mut particles = vec![a, b];
            let pass = resolve(&mut particles, 0.0, &mut rng());
            assert_eq!(pass.offspring.len(), 1);
            let child = &pass.offspring[0];
            let expected = (Vec2::new(3.0, 1.0) * 2.0 + Vec2::new(-1.5, 0.0) * 4.0) / 6.0;
            assert!((child.velocity - expected).length() < 1e-6);
            assert_eq!(child.mass, Some(6.0));
            assert_eq!(child.kind.id, "heavy");
            assert_eq!(child.position, Vec2::new(3.0, 0.0));
            assert_eq!(pass.consumed, vec![1, 2]);
        }

        #[test]
        fn split_replaces_each_parent_with_fanned_children() {
            let k = kind("s", CollisionResponse::Split, 1.0);
            let mut particles = vec![particle(1, k.clone(), 0.0, 0.0), particle(2, k, 4.0, 0.0)];
            let pass = resolve(&mut particles, 0.0, &mut rng());
            let n = pass.offspring.len();
            assert!((4..=8).contains(&n), "unexpected child count {n}");
            for child in &pass.offspring {
                assert!((child.velocity.length() - 2.0).abs() < 1e-5);
                assert_eq!(child.position, Vec2::new(2.0, 0.0));
                assert_eq!(child.origin, ParticleOrigin::Split);
            }
            assert_eq!(pass.consumed, vec![1, 2]);
        }

        #[test]
        fn consumed_particle_takes_no_further_collisions() {
            let d = kind("d", CollisionResponse::Destroy, 1.0);
            let mut particles = vec![
                particle(1, d.clone(), 0.0, 0.0),
                particle(2, d.clone(), 4.0, 0.0),
                particle(3, d, 2.0, 0.0),
            ];
            let pass = resolve(&mut particles, 0.0, &mut rng());
            assert_eq!(pass.events.len(), 1);
            assert_eq!(pass.consumed, vec![1, 2]);
        }

        #[test]
        fn custom_response_calls_first_type_hook() {
            let mut ty = (*kind("c", CollisionResponse::Custom, 1.0)).clone();
            ty.interactions.custom = Some(InteractionHook::new(|a, b| {
                a.energy = 42.0;
                b.energy = 24.0;
                Ok(())
            }));
            let c = Arc::new(ty);
            let mut particles = vec![
                particle(1, c, 0.0, 0.0),
                particle(2, kind("m", CollisionResponse::Merge, 1.0), 4.0, 0.0),
            ];
            let pass = resolve(&mut particles, 0.0, &mut rng());
            assert_eq!(pass.events[0].response, CollisionResponse::Custom);
            assert_eq!(particles[0].energy, 42.0);
            assert_eq!(particles[1].energy, 24.0);
            assert!(pass.consumed.is_empty());
        }

        #[test]
        fn coincident_particles_are_ignored() {
            let k = kind("a", CollisionResponse::Destroy, 1.0);
            let mut particles = vec![particle(1, k.clone(), 3.0, 0.0), particle(2, k, 3.0, 0.0)];
            let pass = resolve(&mut particles, 0.0, &mut rng());
            assert!(pass.events.is_empty());
        }
    }

    mod collision_log {
        use super::*;

        fn event(ts: f32) -> CollisionEvent {
            let k = kind("a", CollisionResponse::Bounce, 1.0);
            CollisionEvent {
                a: particle(1, k.clone(), 0.0, 0.0),
                b: particle(2, k, 1.0, 0.0),
                point: Vec2::ZERO,
                normal: Vec2::new(1.0, 0.0),
                relative_velocity: Vec2::ZERO,
                impact: 0.0,
                response: CollisionResponse::Bounce,
                timestamp: ts,
            }
        }

        #[test]
        fn drops_oldest_when_full() {
            let mut log = CollisionLog::new(2);
            for ts in [1.0, 2.0, 3.0] {
                log.push(event(ts));
            }
            let stamps: Vec<f32> = log.snapshot().iter().map(|e| e.timestamp).collect();
            assert_eq!(stamps, vec![2.0, 3.0]);
        }

        #[test]
        fn clear_empties_history() {
            let mut log = CollisionLog::new(4);
            log.push(event(1.0));
            log.clear();
            assert!(log.snapshot().is_empty());
        }
    }
}
