mod fields;
mod particles;

pub use fields::{EnergyField, Falloff, FieldAppearance, FieldKind, FieldSpec, FieldStore};
pub(crate) use particles::Offspring;
pub use particles::{Particle, ParticleMetadata, ParticleOrigin, ParticleStore, SpawnRequest};
