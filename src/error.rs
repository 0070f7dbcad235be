use std::{fmt, io};

use thiserror::Error;

use crate::types::{FieldId, ParticleId};

/// Boxed error returned by user-supplied hooks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;
pub type HookResult<T = ()> = Result<T, HookError>;

/// Where a custom hook was invoked from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HookSite {
    Movement { particle: ParticleId },
    Interaction { a: ParticleId, b: ParticleId },
    Field { field: FieldId, particle: ParticleId },
    Falloff { field: FieldId },
}

impl fmt::Display for HookSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookSite::Movement { particle } => write!(f, "movement hook of particle {particle}"),
            HookSite::Interaction { a, b } => {
                write!(f, "interaction hook between particles {a} and {b}")
            }
            HookSite::Field { field, particle } => {
                write!(f, "force hook of field {field} on particle {particle}")
            }
            HookSite::Falloff { field } => write!(f, "falloff hook of field {field}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("particle limit of {max} reached")]
    CapacityReached { max: usize },
    #[error("unknown particle type `{0}`")]
    UnknownType(String),
    #[error("particle type `{id}` is still referenced by {live} live particles")]
    TypeInUse { id: String, live: usize },
    #[error("invalid particle type: {0}")]
    InvalidType(String),
    #[error("invalid energy field: {0}")]
    InvalidField(String),
    #[error("invalid particle: {0}")]
    InvalidParticle(String),
    #[error("{site} failed: {source}")]
    Hook {
        site: HookSite,
        #[source]
        source: HookError,
    },
    #[error("{site} panicked")]
    HookPanicked { site: HookSite },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
