//! Spatial sound emitters.
//!
//! An emitter couples a sound handle with the target it follows. Emitters are
//! created by [`SpatialSoundSystem::create`](crate::SpatialSoundSystem::create)
//! and [`SpatialSoundSystem::attach`](crate::SpatialSoundSystem::attach) and
//! are mutated only by the update loop.

use crate::config::AttenuationConfig;
use crate::error::{Result, SpatialSoundError};
use crate::math::{Pose, Vec3};
use crate::playback::{PlayState, Sound};
use crate::scene::{Anchor, AnchorRef, TrackingTarget};
use crate::spatial::{Attenuation, compute_attenuation};
use std::sync::Arc;
use uuid::Uuid;

/// Opaque handle identifying one emitter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EmitterId(Uuid);

impl EmitterId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for EmitterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmitterId({})", self.0)
    }
}

/// Lifecycle state of an emitter. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterState {
    Active,
    Finished(FinishReason),
}

/// Why an emitter stopped being updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The sound played to its end
    Completed,
    /// The scene object the emitter followed was destroyed
    TargetLost,
    /// The sound failed to load, play or accept attenuation
    PlaybackFailed,
    /// Stopped through [`SpatialSoundSystem::stop`](crate::SpatialSoundSystem::stop)
    Stopped,
}

impl From<&SpatialSoundError> for FinishReason {
    fn from(error: &SpatialSoundError) -> Self {
        match error {
            SpatialSoundError::TargetLost(_) | SpatialSoundError::UnresolvableTarget(_) => {
                Self::TargetLost
            }
            _ => Self::PlaybackFailed,
        }
    }
}

/// Sound handle plus who owns it.
#[derive(Clone)]
pub(crate) enum EmitterSound {
    /// Created by this crate; destroyed when the emitter is removed
    Owned(Arc<dyn Sound>),
    /// Attached by the host; left alive, only its attenuation is cleared
    External(Arc<dyn Sound>),
}

impl EmitterSound {
    pub(crate) fn handle(&self) -> &Arc<dyn Sound> {
        match self {
            Self::Owned(sound) | Self::External(sound) => sound,
        }
    }
}

pub(crate) struct Emitter {
    id: EmitterId,
    target: TrackingTarget,
    sound: EmitterSound,
    anchor: Option<Arc<Anchor>>,
    looped: bool,
    state: EmitterState,
    last_position: Option<Vec3>,
    last_attenuation: Option<Attenuation>,
}

impl Emitter {
    pub(crate) fn new(
        id: EmitterId,
        target: TrackingTarget,
        sound: EmitterSound,
        anchor: Option<Arc<Anchor>>,
        looped: bool,
    ) -> Self {
        Self {
            id,
            target,
            sound,
            anchor,
            looped,
            state: EmitterState::Active,
            last_position: None,
            last_attenuation: None,
        }
    }

    pub(crate) fn id(&self) -> EmitterId {
        self.id
    }

    pub(crate) fn state(&self) -> EmitterState {
        self.state
    }

    pub(crate) fn is_active(&self) -> bool {
        self.state == EmitterState::Active
    }

    pub(crate) fn sound(&self) -> &EmitterSound {
        &self.sound
    }

    pub(crate) fn last_position(&self) -> Option<Vec3> {
        self.last_position
    }

    pub(crate) fn last_attenuation(&self) -> Option<Attenuation> {
        self.last_attenuation
    }

    /// Resolves the target and, given a listener, recomputes attenuation for this frame.
    ///
    /// Target loss is detected with or without a listener. The effect chain is
    /// only touched when the parameter set changed since the previous frame.
    pub(crate) fn update(
        &mut self,
        config: &AttenuationConfig,
        listener: Option<&Pose>,
    ) -> Result<()> {
        let position = self
            .target
            .resolve()
            .ok_or(SpatialSoundError::TargetLost(self.id))?;
        self.last_position = Some(position);

        let Some(listener) = listener else {
            return Ok(());
        };
        let attenuation = compute_attenuation(config, listener, position);
        if self.last_attenuation != Some(attenuation) {
            self.sound.handle().apply_attenuation(&attenuation)?;
            self.last_attenuation = Some(attenuation);
        }
        Ok(())
    }

    /// Reports whether the sound has ended in a way that finishes the emitter.
    pub(crate) fn playback_finished(&self) -> Option<FinishReason> {
        match self.sound.handle().play_state() {
            PlayState::Stopped if !self.looped => Some(FinishReason::Completed),
            PlayState::Failed => Some(FinishReason::PlaybackFailed),
            _ => None,
        }
    }

    pub(crate) fn finish(&mut self, reason: FinishReason) {
        if self.is_active() {
            log::debug!("Emitter {} finished: {:?}", self.id, reason);
            self.state = EmitterState::Finished(reason);
        }
    }

    /// Finished emitters are removed unless they loop; looped ones linger
    /// until stopped explicitly.
    pub(crate) fn should_remove(&self) -> bool {
        match self.state {
            EmitterState::Active => false,
            EmitterState::Finished(FinishReason::Stopped) => true,
            EmitterState::Finished(_) => !self.looped,
        }
    }

    /// Stops an owned sound in response to an explicit stop request.
    pub(crate) fn stop(&mut self) {
        if let EmitterSound::Owned(sound) = &self.sound {
            if let Err(e) = sound.stop() {
                log::warn!("Failed to stop sound of emitter {}: {}", self.id, e);
            }
        }
        // Stopping overrides any earlier finish reason so a lingering looped emitter is removed.
        self.state = EmitterState::Finished(FinishReason::Stopped);
    }

    /// Releases everything this emitter owns.
    pub(crate) fn release(&mut self) {
        match &self.sound {
            EmitterSound::Owned(sound) => sound.destroy(),
            EmitterSound::External(sound) => {
                if let Err(e) = sound.clear_attenuation() {
                    log::warn!(
                        "Failed to clear attenuation on attached sound of emitter {}: {}",
                        self.id,
                        e
                    );
                }
            }
        }
        if let Some(anchor) = self.anchor.take() {
            anchor.destroy();
        }
        log::debug!("Emitter {} released", self.id);
    }
}

/// Handle returned by [`SpatialSoundSystem::create`](crate::SpatialSoundSystem::create).
///
/// Exposes the anchor the sound is parented to and the sound itself.
#[derive(Clone)]
pub struct EmitterRef {
    id: EmitterId,
    anchor: AnchorRef,
    sound: Arc<dyn Sound>,
}

impl EmitterRef {
    pub(crate) fn new(id: EmitterId, anchor: AnchorRef, sound: Arc<dyn Sound>) -> Self {
        Self { id, anchor, sound }
    }

    pub fn id(&self) -> EmitterId {
        self.id
    }

    pub fn anchor(&self) -> &AnchorRef {
        &self.anchor
    }

    pub fn sound(&self) -> &Arc<dyn Sound> {
        &self.sound
    }

    /// Current position of the anchor, `None` once it has been destroyed.
    pub fn position(&self) -> Option<Vec3> {
        self.anchor.position()
    }
}

impl std::fmt::Debug for EmitterRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmitterRef")
            .field("id", &self.id)
            .field("anchor", &self.anchor)
            .field("play_state", &self.sound.play_state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Pose;
    use crate::scene::SceneNode;
    use crate::test_support::{MockNode, MockSound};

    fn owned_emitter(sound: &Arc<MockSound>, looped: bool) -> (Emitter, Arc<Anchor>) {
        let anchor = Arc::new(Anchor::new(Pose::from_position(Vec3::new(0.0, 0.0, -5.0))));
        let emitter = Emitter::new(
            EmitterId::new(),
            TrackingTarget::Fixed(anchor.pose()),
            EmitterSound::Owned(sound.clone()),
            Some(anchor.clone()),
            looped,
        );
        (emitter, anchor)
    }

    #[test]
    fn test_update_applies_only_on_change() {
        let sound = MockSound::playing(false);
        let (mut emitter, _anchor) = owned_emitter(&sound, false);
        let config = AttenuationConfig::default();

        emitter.update(&config, Some(&Pose::identity())).unwrap();
        emitter.update(&config, Some(&Pose::identity())).unwrap();
        assert_eq!(sound.applied().len(), 1);

        emitter
            .update(&config, Some(&Pose::from_position(Vec3::new(0.0, 0.0, 20.0))))
            .unwrap();
        assert_eq!(sound.applied().len(), 2);
        assert_eq!(emitter.last_position(), Some(Vec3::new(0.0, 0.0, -5.0)));
    }

    #[test]
    fn test_lost_target_is_reported() {
        let node = MockNode::at(Vec3::ONE);
        let as_node: Arc<dyn SceneNode> = node.clone();
        let sound = MockSound::playing(false);
        let mut emitter = Emitter::new(
            EmitterId::new(),
            TrackingTarget::Tracking(Arc::downgrade(&as_node)),
            EmitterSound::External(sound.clone()),
            None,
            false,
        );
        let config = AttenuationConfig::default();
        assert!(emitter.update(&config, Some(&Pose::identity())).is_ok());

        node.destroy();
        let err = emitter.update(&config, Some(&Pose::identity())).unwrap_err();
        assert!(matches!(err, SpatialSoundError::TargetLost(_)));
        assert_eq!(FinishReason::from(&err), FinishReason::TargetLost);
    }

    #[test]
    fn test_update_without_listener_only_resolves() {
        let node = MockNode::at(Vec3::new(3.0, 0.0, 0.0));
        let as_node: Arc<dyn SceneNode> = node.clone();
        let sound = MockSound::playing(false);
        let mut emitter = Emitter::new(
            EmitterId::new(),
            TrackingTarget::Tracking(Arc::downgrade(&as_node)),
            EmitterSound::External(sound.clone()),
            None,
            false,
        );
        let config = AttenuationConfig::default();

        emitter.update(&config, None).unwrap();
        assert_eq!(emitter.last_position(), Some(Vec3::new(3.0, 0.0, 0.0)));
        assert!(sound.applied().is_empty());

        node.destroy();
        assert!(matches!(
            emitter.update(&config, None),
            Err(SpatialSoundError::TargetLost(_))
        ));
    }

    #[test]
    fn test_finish_and_removal_rules() {
        let sound = MockSound::playing(false);
        let (mut once, _a) = owned_emitter(&sound, false);
        assert_eq!(once.playback_finished(), None);
        sound.set_state(PlayState::Stopped);
        assert_eq!(once.playback_finished(), Some(FinishReason::Completed));
        once.finish(FinishReason::Completed);
        assert!(once.should_remove());

        let looped_sound = MockSound::playing(true);
        let (mut looped, _b) = owned_emitter(&looped_sound, true);
        looped_sound.set_state(PlayState::Stopped);
        assert_eq!(looped.playback_finished(), None);
        looped.finish(FinishReason::TargetLost);
        assert!(!looped.should_remove());
        looped.stop();
        assert!(looped.should_remove());
        assert_eq!(looped.state(), EmitterState::Finished(FinishReason::Stopped));
    }

    #[test]
    fn test_release_owned_destroys_sound_and_anchor() {
        let sound = MockSound::playing(false);
        let (mut emitter, anchor) = owned_emitter(&sound, false);
        emitter.release();
        assert!(sound.is_destroyed());
        assert!(anchor.is_destroyed());
    }

    #[test]
    fn test_release_external_only_clears_attenuation() {
        let sound = MockSound::playing(false);
        let mut emitter = Emitter::new(
            EmitterId::new(),
            TrackingTarget::Fixed(Pose::identity()),
            EmitterSound::External(sound.clone()),
            None,
            false,
        );
        emitter.release();
        assert!(!sound.is_destroyed());
        assert!(sound.was_cleared());
    }
}
