use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use crate::{
    config,
    error::EngineError,
    registry::ParticleType,
    types::{Color, ParticleId, Vec2},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParticleOrigin {
    #[default]
    Spawned,
    Merge,
    Split,
}

#[derive(Clone, Debug, Default)]
pub struct ParticleMetadata {
    /// Simulation clock (seconds) at creation.
    pub created_at: f32,
    pub origin: ParticleOrigin,
    pub source: Option<String>,
    pub custom: HashMap<String, f32>,
}

/// Host-facing creation request.
#[derive(Clone, Debug)]
pub struct SpawnRequest {
    pub type_id: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub max_life: f32,
    pub source: Option<String>,
    pub custom: HashMap<String, f32>,
}

impl SpawnRequest {
    pub fn new(type_id: impl Into<String>, position: Vec2) -> Self {
        Self {
            type_id: type_id.into(),
            position,
            velocity: Vec2::ZERO,
            max_life: config::DEFAULT_MAX_LIFE,
            source: None,
            custom: HashMap::new(),
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_max_life(mut self, max_life: f32) -> Self {
        self.max_life = max_life;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_custom(mut self, key: impl Into<String>, value: f32) -> Self {
        self.custom.insert(key.into(), value);
        self
    }
}

/// Particle produced by a collision response; carries its parent's frozen type.
#[derive(Clone, Debug)]
pub(crate) struct Offspring {
    pub kind: Arc<ParticleType>,
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: Option<f32>,
    pub energy: Option<f32>,
    pub max_life: f32,
    pub origin: ParticleOrigin,
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub id: ParticleId,
    /// Type definition frozen at creation time.
    pub kind: Arc<ParticleType>,
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub mass: f32,
    pub radius: f32,
    pub color: Color,
    pub opacity: f32,
    /// Fraction of `max_life` remaining, in [0, 1].
    pub life: f32,
    pub max_life: f32,
    pub age: f32,
    pub energy: f32,
    pub charge: f32,
    pub temperature: f32,
    /// Recent positions, newest first. Empty unless the type enables trails.
    pub trail: VecDeque<Vec2>,
    pub metadata: ParticleMetadata,
}

impl Particle {
    pub(crate) fn from_type(
        id: ParticleId,
        kind: Arc<ParticleType>,
        position: Vec2,
        velocity: Vec2,
        max_life: f32,
        metadata: ParticleMetadata,
    ) -> Self {
        let physics = kind.physics;
        let appearance = kind.appearance;
        let max_life = if max_life.is_finite() && max_life > 0.0 {
            max_life
        } else {
            config::DEFAULT_MAX_LIFE
        };
        Self {
            id,
            position,
            velocity,
            acceleration: Vec2::ZERO,
            mass: physics.mass,
            radius: appearance.size,
            color: appearance.color,
            opacity: appearance.opacity.clamp(0.0, 1.0),
            life: 1.0,
            max_life,
            age: 0.0,
            energy: physics.energy,
            charge: physics.charge,
            temperature: physics.temperature,
            trail: VecDeque::with_capacity(appearance.trail_length),
            metadata,
            kind,
        }
    }

    pub fn type_id(&self) -> &str {
        &self.kind.id
    }

    pub fn restitution(&self) -> f32 {
        self.kind.physics.restitution.clamp(0.0, 1.0)
    }

    pub fn field_strength(&self) -> f32 {
        self.kind.physics.field_strength
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    pub(crate) fn advance_age(&mut self, dt: f32) {
        self.age += dt;
        self.life = (1.0 - self.age / self.max_life).clamp(0.0, 1.0);
    }

    pub(crate) fn record_trail(&mut self) {
        let appearance = &self.kind.appearance;
        if !appearance.trail || appearance.trail_length == 0 {
            return;
        }
        self.trail.push_front(self.position);
        self.trail.truncate(appearance.trail_length);
    }
}

/// Live particles ordered by id (creation order), bounded by `capacity`.
#[derive(Debug)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    capacity: usize,
    next_id: ParticleId,
}

impl ParticleStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::new(),
            capacity,
            next_id: 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the limit and returns the oldest particles that no longer fit.
    pub fn set_capacity(&mut self, capacity: usize) -> Vec<Particle> {
        self.capacity = capacity;
        let excess = self.particles.len().saturating_sub(capacity);
        self.particles.drain(..excess).collect()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.particles.len() >= self.capacity
    }

    pub(crate) fn allocate_id(&mut self) -> ParticleId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn insert(&mut self, particle: Particle) -> Result<&Particle, EngineError> {
        if self.is_full() {
            return Err(EngineError::CapacityReached { max: self.capacity });
        }
        debug_assert!(
            self.particles.last().is_none_or(|last| last.id < particle.id),
            "particle ids must be inserted in increasing order"
        );
        self.particles.push(particle);
        let last = self.particles.len() - 1;
        Ok(&self.particles[last])
    }

    pub(crate) fn remove(&mut self, id: ParticleId) -> Option<Particle> {
        let idx = self.find_index(id)?;
        Some(self.particles.remove(idx))
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.find_index(id).map(|idx| &self.particles[idx])
    }

    pub(crate) fn get_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.find_index(id).map(|idx| &mut self.particles[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn snapshot(&self) -> Vec<Particle> {
        self.particles.clone()
    }

    pub fn count_of_type(&self, type_id: &str) -> usize {
        self.particles
            .iter()
            .filter(|p| p.type_id() == type_id)
            .count()
    }

    pub(crate) fn drain_all(&mut self) -> Vec<Particle> {
        std::mem::take(&mut self.particles)
    }

    fn find_index(&self, id: ParticleId) -> Option<usize> {
        self.particles.binary_search_by_key(&id, |p| p.id).ok()
    }
}
