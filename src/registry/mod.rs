use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use crate::{
    error::EngineError,
    hooks::{InteractionHook, MovementHook},
    types::Color,
};

/// How a particle steers itself every tick.
#[derive(Clone, Debug)]
pub enum MovementKind {
    Linear,
    Orbital,
    Spiral,
    Chaotic,
    Custom(MovementHook),
}

impl MovementKind {
    pub fn label(&self) -> &'static str {
        match self {
            MovementKind::Linear => "linear",
            MovementKind::Orbital => "orbital",
            MovementKind::Spiral => "spiral",
            MovementKind::Chaotic => "chaotic",
            MovementKind::Custom(_) => "custom",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Behavior {
    pub movement: MovementKind,
    pub speed: f32,
    /// Heading in radians.
    pub direction: f32,
    pub acceleration: f32,
    pub damping: f32,
    pub bounce: f32,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            movement: MovementKind::Linear,
            speed: 1.0,
            direction: 0.0,
            acceleration: 0.0,
            damping: 1.0,
            bounce: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsProps {
    pub gravity: f32,
    pub friction: f32,
    pub restitution: f32,
    pub mass: f32,
    pub charge: f32,
    pub temperature: f32,
    pub energy: f32,
    pub field_strength: f32,
}

impl Default for PhysicsProps {
    fn default() -> Self {
        Self {
            gravity: 0.0,
            friction: 0.0,
            restitution: 0.8,
            mass: 1.0,
            charge: 0.0,
            temperature: 20.0,
            energy: 1.0,
            field_strength: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Star,
    Diamond,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
    pub color: Color,
    pub size: f32,
    pub opacity: f32,
    pub glow: bool,
    pub trail: bool,
    pub trail_length: usize,
    pub shape: Shape,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            size: 4.0,
            opacity: 1.0,
            glow: false,
            trail: false,
            trail_length: 0,
            shape: Shape::Circle,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionResponse {
    Bounce,
    Merge,
    Destroy,
    Split,
    Custom,
}

impl CollisionResponse {
    pub fn destructiveness(self) -> u8 {
        match self {
            CollisionResponse::Bounce => 1,
            CollisionResponse::Merge | CollisionResponse::Custom => 2,
            CollisionResponse::Split => 3,
            CollisionResponse::Destroy => 4,
        }
    }

    /// Picks the response applied when `self` (first particle) meets `other`.
    /// The more destructive one wins; equal ranks keep `self`.
    pub fn resolve(self, other: CollisionResponse) -> CollisionResponse {
        if other.destructiveness() > self.destructiveness() {
            other
        } else {
            self
        }
    }
}

#[derive(Clone, Debug)]
pub struct Interactions {
    pub attracts: Vec<String>,
    pub repels: Vec<String>,
    pub neutral: Vec<String>,
    pub collision: CollisionResponse,
    pub custom: Option<InteractionHook>,
}

impl Default for Interactions {
    fn default() -> Self {
        Self {
            attracts: Vec::new(),
            repels: Vec::new(),
            neutral: Vec::new(),
            collision: CollisionResponse::Bounce,
            custom: None,
        }
    }
}

impl Interactions {
    pub fn attracts(&self, type_id: &str) -> bool {
        !self.is_neutral(type_id) && self.attracts.iter().any(|t| t == type_id)
    }

    pub fn repels(&self, type_id: &str) -> bool {
        !self.is_neutral(type_id) && self.repels.iter().any(|t| t == type_id)
    }

    pub fn is_neutral(&self, type_id: &str) -> bool {
        self.neutral.iter().any(|t| t == type_id)
    }
}

/// Template particles are instantiated from. Published definitions are
/// immutable; re-registering the id swaps in a new definition.
#[derive(Clone, Debug)]
pub struct ParticleType {
    pub id: String,
    pub name: String,
    pub behavior: Behavior,
    pub physics: PhysicsProps,
    pub appearance: Appearance,
    pub interactions: Interactions,
}

impl ParticleType {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            behavior: Behavior::default(),
            physics: PhysicsProps::default(),
            appearance: Appearance::default(),
            interactions: Interactions::default(),
        }
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_physics(mut self, physics: PhysicsProps) -> Self {
        self.physics = physics;
        self
    }

    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = appearance;
        self
    }

    pub fn with_interactions(mut self, interactions: Interactions) -> Self {
        self.interactions = interactions;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.id.trim().is_empty() {
            return Err(EngineError::InvalidType("id must not be empty".into()));
        }
        if !(self.physics.mass.is_finite() && self.physics.mass > 0.0) {
            return Err(EngineError::InvalidType(format!(
                "`{}` mass must be positive, got {}",
                self.id, self.physics.mass
            )));
        }
        if !(self.appearance.size.is_finite() && self.appearance.size > 0.0) {
            return Err(EngineError::InvalidType(format!(
                "`{}` size must be positive, got {}",
                self.id, self.appearance.size
            )));
        }
        Ok(())
    }
}

/// Named particle types in registration order.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: Vec<Arc<ParticleType>>,
    index: HashMap<String, usize>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces by id, returning the definition that was replaced.
    /// A replaced type keeps its registration slot.
    pub fn insert(
        &mut self,
        particle_type: ParticleType,
    ) -> Result<Option<Arc<ParticleType>>, EngineError> {
        particle_type.validate()?;
        let id = particle_type.id.clone();
        let particle_type = Arc::new(particle_type);
        match self.index.get(&id) {
            Some(&slot) => {
                debug!(type_id = %id, "particle type replaced");
                Ok(Some(std::mem::replace(&mut self.types[slot], particle_type)))
            }
            None => {
                debug!(type_id = %id, "particle type registered");
                self.index.insert(id, self.types.len());
                self.types.push(particle_type);
                Ok(None)
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&Arc<ParticleType>> {
        self.index.get(id).map(|&slot| &self.types[slot])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Arc<ParticleType>> {
        let slot = self.index.remove(id)?;
        let removed = self.types.remove(slot);
        for idx in self.index.values_mut() {
            if *idx > slot {
                *idx -= 1;
            }
        }
        Some(removed)
    }

    /// Point-in-time copy; later registry changes do not show through.
    pub fn snapshot(&self) -> Vec<Arc<ParticleType>> {
        self.types.clone()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn clear(&mut self) {
        self.types.clear();
        self.index.clear();
    }
}
