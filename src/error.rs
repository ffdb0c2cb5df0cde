//! Error types for spatial-sound

use crate::emitter::EmitterId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpatialSoundError {
    #[error("Invalid asset id: {0}")]
    InvalidAsset(String),

    #[error("Unresolvable target: {0}")]
    UnresolvableTarget(String),

    #[error("Target lost for emitter {0}")]
    TargetLost(EmitterId),

    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Capacity exceeded: {0} emitters already registered")]
    CapacityExceeded(usize),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Engine error: {0}")]
    Engine(String),
}

pub type Result<T> = std::result::Result<T, SpatialSoundError>;
