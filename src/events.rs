//! Event types for spatial-sound

use crate::emitter::{EmitterId, FinishReason};

#[derive(Debug, Clone, PartialEq)]
pub enum SpatialSoundEvent {
    /// Emitter became visible to the update loop
    EmitterRegistered { emitter_id: EmitterId },
    /// Emitter stopped being updated
    EmitterFinished {
        emitter_id: EmitterId,
        reason: FinishReason,
    },
    /// Emitter left the registry and its owned resources were released
    EmitterRemoved { emitter_id: EmitterId },
    /// `attach` was called with a sound that cannot be tracked
    AttachIgnored { reason: String },
    /// An emitter failed during a frame; the frame carried on without it
    EmitterError {
        emitter_id: EmitterId,
        error: String,
    },
}

impl SpatialSoundEvent {
    pub fn emitter_id(&self) -> Option<EmitterId> {
        match self {
            Self::EmitterRegistered { emitter_id }
            | Self::EmitterFinished { emitter_id, .. }
            | Self::EmitterRemoved { emitter_id }
            | Self::EmitterError { emitter_id, .. } => Some(*emitter_id),
            Self::AttachIgnored { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::AttachIgnored { .. } | Self::EmitterError { .. }
        )
    }
}
