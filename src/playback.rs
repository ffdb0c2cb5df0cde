//! Audio playback integration.
//!
//! The host's audio subsystem is consumed through two traits:
//! - [`SoundBackend`]: creates sounds for an asset, parented to a scene node
//! - [`Sound`]: a playing (or loading) sound handle with an effect chain
//!
//! [`PlayState`] is what the update loop reads every frame to decide whether an
//! emitter has finished.

use crate::asset::AssetId;
use crate::error::Result;
use crate::scene::SceneNode;
use crate::spatial::Attenuation;
use std::sync::Arc;

/// Represents the current playback state of a sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    /// Asset is still loading; the sound is not playable yet
    Loading,
    /// Sound is currently playing
    Playing,
    /// Sound is paused (retains playback position)
    Paused,
    /// Sound reached its end or was stopped
    Stopped,
    /// Asset could not be loaded or played
    Failed,
}

impl PlayState {
    /// Whether the sound will make no further progress on its own.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }
}

/// Handle to a sound owned by the host's audio subsystem.
///
/// Handles are shared between the host and this crate, so every method takes
/// `&self`; implementations use interior mutability.
pub trait Sound: Send + Sync {
    /// Current playback state.
    fn play_state(&self) -> PlayState;

    /// Whether the sound restarts when it reaches the end.
    fn is_looped(&self) -> bool;

    /// Scene node the sound is parented to, if any.
    fn parent(&self) -> Option<Arc<dyn SceneNode>>;

    /// Start (or resume) playback.
    fn play(&self) -> Result<()>;

    /// Stop playback.
    fn stop(&self) -> Result<()>;

    /// Push a new attenuation parameter set into the sound's effect chain.
    fn apply_attenuation(&self, attenuation: &Attenuation) -> Result<()>;

    /// Remove any attenuation previously applied by this crate.
    fn clear_attenuation(&self) -> Result<()>;

    /// Release the sound. Only called for sounds this crate created.
    fn destroy(&self);
}

/// Factory for sounds, implemented by the host's audio subsystem.
///
/// `create_sound` must not block on asset loading: return a handle in
/// [`PlayState::Loading`] and let it become playable later.
pub trait SoundBackend: Send + Sync {
    fn create_sound(
        &self,
        asset: &AssetId,
        parent: Arc<dyn SceneNode>,
        looped: bool,
    ) -> Result<Arc<dyn Sound>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(PlayState::Stopped.is_terminal());
        assert!(PlayState::Failed.is_terminal());
        assert!(!PlayState::Loading.is_terminal());
        assert!(!PlayState::Playing.is_terminal());
        assert!(!PlayState::Paused.is_terminal());
    }
}
