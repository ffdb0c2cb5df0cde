//! In-memory scene and audio doubles for tests

use crate::asset::AssetId;
use crate::error::{Result, SpatialSoundError};
use crate::math::{Pose, Vec3};
use crate::playback::{PlayState, Sound, SoundBackend};
use crate::scene::SceneNode;
use crate::spatial::Attenuation;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) struct MockNode {
    pose: Mutex<Option<Pose>>,
    alive: AtomicBool,
}

impl MockNode {
    pub(crate) fn at(position: Vec3) -> Arc<Self> {
        Arc::new(Self {
            pose: Mutex::new(Some(Pose::from_position(position))),
            alive: AtomicBool::new(true),
        })
    }

    /// A node without a position, like a folder or model container.
    pub(crate) fn container() -> Arc<Self> {
        Arc::new(Self {
            pose: Mutex::new(None),
            alive: AtomicBool::new(true),
        })
    }

    pub(crate) fn move_to(&self, position: Vec3) {
        *self.pose.lock().unwrap() = Some(Pose::from_position(position));
    }

    pub(crate) fn destroy(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

impl SceneNode for MockNode {
    fn world_pose(&self) -> Option<Pose> {
        *self.pose.lock().unwrap()
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

pub(crate) struct MockSound {
    state: Mutex<PlayState>,
    looped: bool,
    parent: Mutex<Option<Arc<dyn SceneNode>>>,
    asset: Option<AssetId>,
    applied: Mutex<Vec<Attenuation>>,
    play_requested: AtomicBool,
    fail_apply: AtomicBool,
    cleared: AtomicBool,
    destroyed: AtomicBool,
}

impl MockSound {
    pub(crate) fn new(state: PlayState, looped: bool) -> Arc<Self> {
        Arc::new(Self::build(state, looped, None, None))
    }

    pub(crate) fn playing(looped: bool) -> Arc<Self> {
        Self::new(PlayState::Playing, looped)
    }

    pub(crate) fn with_parent(looped: bool, parent: Arc<dyn SceneNode>) -> Arc<Self> {
        Arc::new(Self::build(PlayState::Playing, looped, Some(parent), None))
    }

    fn build(
        state: PlayState,
        looped: bool,
        parent: Option<Arc<dyn SceneNode>>,
        asset: Option<AssetId>,
    ) -> Self {
        Self {
            state: Mutex::new(state),
            looped,
            parent: Mutex::new(parent),
            asset,
            applied: Mutex::new(Vec::new()),
            play_requested: AtomicBool::new(false),
            fail_apply: AtomicBool::new(false),
            cleared: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
        }
    }

    pub(crate) fn state(&self) -> PlayState {
        *self.state.lock().unwrap()
    }

    pub(crate) fn set_state(&self, state: PlayState) {
        *self.state.lock().unwrap() = state;
    }

    /// Loading completes; the sound starts if `play` was requested meanwhile.
    pub(crate) fn finish_loading(&self) {
        let next = if self.play_requested.load(Ordering::SeqCst) {
            PlayState::Playing
        } else {
            PlayState::Stopped
        };
        self.set_state(next);
    }

    pub(crate) fn asset(&self) -> Option<&AssetId> {
        self.asset.as_ref()
    }

    pub(crate) fn applied(&self) -> Vec<Attenuation> {
        self.applied.lock().unwrap().clone()
    }

    pub(crate) fn last_applied(&self) -> Option<Attenuation> {
        self.applied.lock().unwrap().last().copied()
    }

    pub(crate) fn set_fail_apply(&self, fail: bool) {
        self.fail_apply.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn was_cleared(&self) -> bool {
        self.cleared.load(Ordering::SeqCst)
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl Sound for MockSound {
    fn play_state(&self) -> PlayState {
        self.state()
    }

    fn is_looped(&self) -> bool {
        self.looped
    }

    fn parent(&self) -> Option<Arc<dyn SceneNode>> {
        self.parent.lock().unwrap().clone()
    }

    fn play(&self) -> Result<()> {
        self.play_requested.store(true, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        match *state {
            PlayState::Failed => Err(SpatialSoundError::Playback("sound failed to load".into())),
            PlayState::Loading => Ok(()),
            _ => {
                *state = PlayState::Playing;
                Ok(())
            }
        }
    }

    fn stop(&self) -> Result<()> {
        self.set_state(PlayState::Stopped);
        Ok(())
    }

    fn apply_attenuation(&self, attenuation: &Attenuation) -> Result<()> {
        if self.fail_apply.load(Ordering::SeqCst) {
            return Err(SpatialSoundError::Playback("effect chain rejected update".into()));
        }
        self.applied.lock().unwrap().push(*attenuation);
        Ok(())
    }

    fn clear_attenuation(&self) -> Result<()> {
        self.cleared.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
        self.set_state(PlayState::Stopped);
        *self.parent.lock().unwrap() = None;
    }
}

/// Backend creating [`MockSound`]s in a fixed initial state.
pub(crate) struct MockBackend {
    initial_state: PlayState,
    fail_create: AtomicBool,
    created: Mutex<Vec<Arc<MockSound>>>,
}

impl MockBackend {
    pub(crate) fn new() -> Arc<Self> {
        Self::with_initial_state(PlayState::Stopped)
    }

    pub(crate) fn with_initial_state(initial_state: PlayState) -> Arc<Self> {
        Arc::new(Self {
            initial_state,
            fail_create: AtomicBool::new(false),
            created: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn created(&self) -> Vec<Arc<MockSound>> {
        self.created.lock().unwrap().clone()
    }

    pub(crate) fn last(&self) -> Arc<MockSound> {
        self.created
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no sound created")
    }
}

impl SoundBackend for MockBackend {
    fn create_sound(
        &self,
        asset: &AssetId,
        parent: Arc<dyn SceneNode>,
        looped: bool,
    ) -> Result<Arc<dyn Sound>> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(SpatialSoundError::Playback(format!(
                "backend refused to create {}",
                asset
            )));
        }
        let sound = Arc::new(MockSound::build(
            self.initial_state,
            looped,
            Some(parent),
            Some(asset.clone()),
        ));
        self.created.lock().unwrap().push(sound.clone());
        Ok(sound)
    }
}
