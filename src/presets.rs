//! Built-in particle types. Between them they cover every movement kind
//! and every collision response, so hosts get a playable set out of the box.

use std::f32::consts::FRAC_PI_2;

use crate::{
    hooks::{InteractionHook, MovementHook},
    registry::{
        Appearance, Behavior, CollisionResponse, Interactions, MovementKind, ParticleType,
        PhysicsProps, Shape,
    },
    types::Color,
};

pub const SPARK: &str = "spark";
pub const PLASMA: &str = "plasma";
pub const DUST: &str = "dust";
pub const EMBER: &str = "ember";
pub const VOID: &str = "void";

const VOID_DRAG: f32 = 0.98;
const VOID_ABSORB: f32 = 0.5;

pub fn catalogue() -> Vec<ParticleType> {
    vec![spark(), plasma(), dust(), ember(), void()]
}

pub fn find(id: &str) -> Option<ParticleType> {
    catalogue().into_iter().find(|t| t.id == id)
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Jittery, short-lived, shatters on contact.
pub fn spark() -> ParticleType {
    ParticleType::new(SPARK, "Spark")
        .with_behavior(Behavior {
            movement: MovementKind::Chaotic,
            speed: 40.0,
            ..Behavior::default()
        })
        .with_physics(PhysicsProps {
            mass: 0.5,
            energy: 2.0,
            field_strength: 8.0,
            temperature: 600.0,
            ..PhysicsProps::default()
        })
        .with_appearance(Appearance {
            color: Color::rgb(255, 230, 90),
            size: 2.0,
            glow: true,
            trail: true,
            trail_length: 6,
            shape: Shape::Star,
            ..Appearance::default()
        })
        .with_interactions(Interactions {
            repels: ids(&[EMBER]),
            collision: CollisionResponse::Split,
            ..Interactions::default()
        })
}

/// Circles the middle of the bounds and fuses with whatever it touches.
pub fn plasma() -> ParticleType {
    ParticleType::new(PLASMA, "Plasma")
        .with_behavior(Behavior {
            movement: MovementKind::Orbital,
            speed: 20.0,
            ..Behavior::default()
        })
        .with_physics(PhysicsProps {
            mass: 2.0,
            charge: 1.0,
            energy: 5.0,
            field_strength: 30.0,
            ..PhysicsProps::default()
        })
        .with_appearance(Appearance {
            color: Color::rgb(200, 80, 255),
            size: 5.0,
            glow: true,
            trail: true,
            trail_length: 10,
            ..Appearance::default()
        })
        .with_interactions(Interactions {
            attracts: ids(&[SPARK, PLASMA]),
            repels: ids(&[VOID]),
            collision: CollisionResponse::Merge,
            ..Interactions::default()
        })
}

/// Heavy, falls, bounces off everything and ignores its neighbours.
pub fn dust() -> ParticleType {
    ParticleType::new(DUST, "Dust")
        .with_behavior(Behavior {
            movement: MovementKind::Linear,
            speed: 5.0,
            direction: FRAC_PI_2,
            acceleration: 2.0,
            ..Behavior::default()
        })
        .with_physics(PhysicsProps {
            gravity: 3.0,
            mass: 3.0,
            restitution: 0.4,
            friction: 0.2,
            ..PhysicsProps::default()
        })
        .with_appearance(Appearance {
            color: Color::rgb(150, 140, 120),
            size: 3.0,
            opacity: 0.8,
            shape: Shape::Square,
            ..Appearance::default()
        })
        .with_interactions(Interactions {
            neutral: ids(&[SPARK, PLASMA, EMBER, VOID]),
            collision: CollisionResponse::Bounce,
            ..Interactions::default()
        })
}

/// Spirals inward and burns out whatever it hits.
pub fn ember() -> ParticleType {
    ParticleType::new(EMBER, "Ember")
        .with_behavior(Behavior {
            movement: MovementKind::Spiral,
            speed: 15.0,
            ..Behavior::default()
        })
        .with_physics(PhysicsProps {
            gravity: -0.5,
            temperature: 900.0,
            energy: 3.0,
            field_strength: 12.0,
            ..PhysicsProps::default()
        })
        .with_appearance(Appearance {
            color: Color::rgb(255, 110, 30),
            size: 3.0,
            glow: true,
            trail: true,
            trail_length: 4,
            shape: Shape::Triangle,
            ..Appearance::default()
        })
        .with_interactions(Interactions {
            attracts: ids(&[DUST]),
            collision: CollisionResponse::Destroy,
            ..Interactions::default()
        })
}

/// Sluggish sink that drains half the energy of anything it touches.
pub fn void() -> ParticleType {
    let drag = MovementHook::new(|particle, _dt| {
        particle.velocity = particle.velocity * VOID_DRAG;
        Ok(())
    });
    let absorb = InteractionHook::new(|a, b| {
        let taken = b.energy * VOID_ABSORB;
        a.energy += taken;
        b.energy -= taken;
        b.velocity = -b.velocity;
        Ok(())
    });

    ParticleType::new(VOID, "Void")
        .with_behavior(Behavior {
            movement: MovementKind::Custom(drag),
            speed: 2.0,
            ..Behavior::default()
        })
        .with_physics(PhysicsProps {
            mass: 8.0,
            charge: -1.0,
            energy: 0.5,
            field_strength: 20.0,
            temperature: -200.0,
            ..PhysicsProps::default()
        })
        .with_appearance(Appearance {
            color: Color::rgb(60, 60, 110),
            size: 6.0,
            shape: Shape::Diamond,
            ..Appearance::default()
        })
        .with_interactions(Interactions {
            attracts: ids(&[SPARK, EMBER]),
            collision: CollisionResponse::Custom,
            custom: Some(absorb),
            ..Interactions::default()
        })
}
