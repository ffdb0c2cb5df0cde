use crate::asset::AssetId;
use crate::config::SpatialSoundDesc;
use crate::emitter::{
    Emitter, EmitterId, EmitterRef, EmitterSound, EmitterState, FinishReason,
};
use crate::error::{Result, SpatialSoundError};
use crate::events::SpatialSoundEvent;
use crate::math::{Pose, Vec3};
use crate::playback::{Sound, SoundBackend};
use crate::registry::EmitterRegistry;
use crate::scene::{Anchor, AnchorRef, SceneNode, Target, TrackingTarget};
use crate::spatial::Attenuation;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const EVENT_QUEUE_CAPACITY: usize = 4096;

/// Registry mutations queued by the public API and applied at frame start.
pub(crate) enum RegistryCommand {
    Register(Emitter),
    Stop(EmitterId),
    Detach(Arc<dyn Sound>),
    StopAll,
}

/// Statistics for one pass of the update loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number, starting at 1
    pub frame: u64,
    /// Emitters that became visible this frame
    pub registered: usize,
    /// Emitters whose attenuation was recomputed
    pub updated: usize,
    /// Emitters that transitioned to finished
    pub finished: usize,
    /// Emitters removed from the registry
    pub removed: usize,
    /// Emitters that failed this frame
    pub errors: usize,
    /// Emitters left in the registry after the pass
    pub remaining: usize,
}

/// Client-side spatial sound system.
///
/// `SpatialSoundSystem` binds sounds to positions or scene objects and, once per
/// rendered frame, recomputes each sound's attenuation relative to the listener.
/// Non-looped sounds are cleaned up automatically once they finish.
///
/// # Frame model
///
/// [`create`](Self::create), [`attach`](Self::attach) and [`stop`](Self::stop)
/// only queue work. The queue is drained at the start of the next
/// [`tick`](Self::tick), so a new emitter becomes visible in one piece, and
/// queries such as [`contains`](Self::contains) reflect the registry as of the
/// last tick.
///
/// Methods take `&self`; the system can be shared behind an `Arc` between the
/// code creating sounds and the [`UpdateLoop`](crate::UpdateLoop). Query
/// methods must not be called from inside [`Sound`] callbacks.
pub struct SpatialSoundSystem {
    desc: SpatialSoundDesc,
    backend: Arc<dyn SoundBackend>,
    registry: Mutex<EmitterRegistry>,
    listener: Mutex<SpatialSoundListener>,
    registered: AtomicUsize,
    pending_registrations: AtomicUsize,
    frame: AtomicU64,
    command_sender: Sender<RegistryCommand>,
    command_receiver: Receiver<RegistryCommand>,
    event_sender: Sender<SpatialSoundEvent>,
    event_receiver: Receiver<SpatialSoundEvent>,
}

impl SpatialSoundSystem {
    pub fn new(desc: SpatialSoundDesc, backend: Arc<dyn SoundBackend>) -> Result<Self> {
        desc.validate()?;
        let (command_sender, command_receiver) = crossbeam_channel::unbounded();
        let (event_sender, event_receiver) = crossbeam_channel::bounded(EVENT_QUEUE_CAPACITY);

        log::info!(
            "Spatial sound system created (max_emitters: {}, curve: {:?}, range: {}..{})",
            desc.max_emitters,
            desc.attenuation.curve,
            desc.attenuation.min_distance,
            desc.attenuation.max_distance
        );

        Ok(Self {
            desc,
            backend,
            registry: Mutex::new(EmitterRegistry::new()),
            listener: Mutex::new(SpatialSoundListener::default()),
            registered: AtomicUsize::new(0),
            pending_registrations: AtomicUsize::new(0),
            frame: AtomicU64::new(0),
            command_sender,
            command_receiver,
            event_sender,
            event_receiver,
        })
    }

    pub fn desc(&self) -> &SpatialSoundDesc {
        &self.desc
    }

    /// Starts tracking a sound the host already owns.
    ///
    /// The sound must be parented to a position-bearing scene node; the emitter
    /// follows that node. Sounds that cannot be tracked are logged and ignored,
    /// as are sounds that are already attached. The sound is never destroyed by
    /// this system.
    pub fn attach(&self, sound: Arc<dyn Sound>) {
        if let Err(e) = self.try_attach(sound) {
            log::warn!("Ignoring attach: {}", e);
            self.emit(SpatialSoundEvent::AttachIgnored {
                reason: e.to_string(),
            });
        }
    }

    fn try_attach(&self, sound: Arc<dyn Sound>) -> Result<()> {
        let parent = sound.parent().ok_or_else(|| {
            SpatialSoundError::UnresolvableTarget("sound has no parent".into())
        })?;
        if !has_position(parent.as_ref()) {
            return Err(SpatialSoundError::UnresolvableTarget(
                "sound parent carries no position".into(),
            ));
        }

        self.reserve_slot()?;
        let looped = sound.is_looped();
        let emitter = Emitter::new(
            EmitterId::new(),
            TrackingTarget::Tracking(Arc::downgrade(&parent)),
            EmitterSound::External(sound),
            None,
            looped,
        );
        log::debug!("Attaching external sound as emitter {}", emitter.id());
        self.enqueue_registration(emitter)
    }

    /// Creates a new sound for `asset_id` that follows `target`.
    ///
    /// A point or pose target gets a new anchor at that fixed pose; a scene
    /// node target is followed live. The sound is started right away unless
    /// [`SpatialSoundDesc::autoplay`] is off.
    ///
    /// # Errors
    ///
    /// - [`SpatialSoundError::InvalidAsset`] for an empty or malformed id
    /// - [`SpatialSoundError::UnresolvableTarget`] if the target has no position
    /// - [`SpatialSoundError::CapacityExceeded`] if `max_emitters` is reached
    /// - [`SpatialSoundError::Playback`] if the backend cannot create or start the sound
    ///
    /// Nothing is registered when an error is returned.
    pub fn create(
        &self,
        asset_id: &str,
        target: impl Into<Target>,
        looped: bool,
    ) -> Result<EmitterRef> {
        let asset = AssetId::parse(asset_id, &self.desc.asset_scheme)?;
        let target: Target = target.into();

        let (anchor, tracking, parent): (AnchorRef, TrackingTarget, Arc<dyn SceneNode>) =
            match target {
                Target::Point(point) => owned_anchor(Pose::from_position(point))?,
                Target::Pose(pose) => owned_anchor(pose)?,
                Target::Node(node) => {
                    if !has_position(node.as_ref()) {
                        return Err(SpatialSoundError::UnresolvableTarget(
                            "target node carries no position".into(),
                        ));
                    }
                    let weak = Arc::downgrade(&node);
                    (
                        AnchorRef::Node(weak.clone()),
                        TrackingTarget::Tracking(weak),
                        node,
                    )
                }
            };
        let owned = match &anchor {
            AnchorRef::Owned(anchor) => Some(anchor.clone()),
            AnchorRef::Node(_) => None,
        };

        self.reserve_slot()?;
        let sound = match self.start_sound(&asset, parent, looped) {
            Ok(sound) => sound,
            Err(e) => {
                self.release_slot();
                if let Some(anchor) = &owned {
                    anchor.destroy();
                }
                log::error!("Failed to create sound for {}: {}", asset, e);
                return Err(e);
            }
        };

        let id = EmitterId::new();
        let emitter = Emitter::new(
            id,
            tracking,
            EmitterSound::Owned(sound.clone()),
            owned,
            looped,
        );
        log::debug!("Created emitter {} for {} (looped: {})", id, asset, looped);
        self.enqueue_registration(emitter)?;

        Ok(EmitterRef::new(id, anchor, sound))
    }

    fn start_sound(
        &self,
        asset: &AssetId,
        parent: Arc<dyn SceneNode>,
        looped: bool,
    ) -> Result<Arc<dyn Sound>> {
        let sound = self.backend.create_sound(asset, parent, looped)?;
        if self.desc.autoplay {
            if let Err(e) = sound.play() {
                sound.destroy();
                return Err(e);
            }
        }
        Ok(sound)
    }

    /// Stops an emitter. Owned sounds are stopped and destroyed; attached
    /// sounds are handed back to the host untouched apart from their
    /// attenuation being cleared. This is the only way to end a looped emitter.
    ///
    /// Takes effect on the next tick.
    pub fn stop(&self, id: EmitterId) -> Result<()> {
        self.enqueue(RegistryCommand::Stop(id))
    }

    /// Stops tracking an attached sound. Takes effect on the next tick.
    pub fn detach(&self, sound: &Arc<dyn Sound>) -> Result<()> {
        self.enqueue(RegistryCommand::Detach(sound.clone()))
    }

    /// Stops every emitter, including ones still waiting to be registered.
    pub fn stop_all(&self) -> Result<()> {
        self.enqueue(RegistryCommand::StopAll)
    }

    /// Runs one frame of the update loop with the given listener pose.
    ///
    /// Applies queued registrations and stops, recomputes attenuation for every
    /// active emitter, finishes emitters whose sound ended or whose target was
    /// destroyed, and removes finished non-looped emitters. A failing emitter
    /// never stops the pass for the others.
    pub fn tick(&self, listener: Pose) -> FrameReport {
        let frame = self.frame.fetch_add(1, Ordering::Relaxed) + 1;
        lock(&self.listener).set_pose(listener);

        let mut registry = lock(&self.registry);
        let mut report = FrameReport {
            frame,
            ..Default::default()
        };
        self.apply_commands(&mut registry, &mut report);

        let listener = if listener.is_finite() {
            Some(listener)
        } else {
            log::warn!("Frame {}: listener pose is not finite, skipping attenuation", frame);
            None
        };
        self.update_emitters(&mut registry, listener.as_ref(), &mut report);

        report.removed = self.sweep(&mut registry);
        report.remaining = registry.len();
        self.registered.store(registry.len(), Ordering::Release);

        if report.registered + report.finished + report.removed + report.errors > 0 {
            log::debug!("Frame {}: {:?}", frame, report);
        }
        report
    }

    /// Runs one frame with the listener pose last set through
    /// [`set_listener_pose`](Self::set_listener_pose).
    pub fn tick_with_listener(&self) -> FrameReport {
        let pose = lock(&self.listener).pose();
        self.tick(pose)
    }

    fn update_emitters(
        &self,
        registry: &mut EmitterRegistry,
        listener: Option<&Pose>,
        report: &mut FrameReport,
    ) {
        let config = &self.desc.attenuation;
        for emitter in registry.iter_mut().filter(|emitter| emitter.is_active()) {
            if let Err(e) = emitter.update(config, listener) {
                let reason = FinishReason::from(&e);
                if reason == FinishReason::TargetLost {
                    log::info!("Emitter {} lost its target", emitter.id());
                } else {
                    log::warn!("Emitter {} failed: {}", emitter.id(), e);
                    report.errors += 1;
                    self.emit(SpatialSoundEvent::EmitterError {
                        emitter_id: emitter.id(),
                        error: e.to_string(),
                    });
                }
                self.finish(emitter, reason, report);
                continue;
            }
            if listener.is_some() {
                report.updated += 1;
            }

            if let Some(reason) = emitter.playback_finished() {
                if reason == FinishReason::PlaybackFailed {
                    log::warn!("Emitter {} sound failed to play", emitter.id());
                    report.errors += 1;
                }
                self.finish(emitter, reason, report);
            }
        }
    }

    fn finish(&self, emitter: &mut Emitter, reason: FinishReason, report: &mut FrameReport) {
        emitter.finish(reason);
        report.finished += 1;
        self.emit(SpatialSoundEvent::EmitterFinished {
            emitter_id: emitter.id(),
            reason,
        });
    }

    /// Applies the commands queued before this call; later ones wait for the next frame.
    fn apply_commands(&self, registry: &mut EmitterRegistry, report: &mut FrameReport) {
        let queued = self.command_receiver.len();
        for command in self.command_receiver.try_iter().take(queued) {
            match command {
                RegistryCommand::Register(emitter) => {
                    if let EmitterSound::External(sound) = emitter.sound() {
                        if registry.tracks_sound(sound) {
                            self.release_slot();
                            log::warn!("Ignoring attach: sound is already attached");
                            self.emit(SpatialSoundEvent::AttachIgnored {
                                reason: "sound is already attached".into(),
                            });
                            continue;
                        }
                    }
                    let emitter_id = emitter.id();
                    registry.insert(emitter);
                    // Count the slot as registered before releasing it from pending.
                    self.registered.fetch_add(1, Ordering::AcqRel);
                    self.release_slot();
                    report.registered += 1;
                    self.emit(SpatialSoundEvent::EmitterRegistered { emitter_id });
                }
                RegistryCommand::Stop(id) => match registry.get_mut(id) {
                    Some(emitter) => self.stop_emitter(emitter, report),
                    None => log::debug!("Stop requested for unknown emitter {}", id),
                },
                RegistryCommand::Detach(sound) => {
                    let found = registry.iter_mut().find(|emitter| {
                        matches!(emitter.sound(), EmitterSound::External(s) if Arc::ptr_eq(s, &sound))
                    });
                    match found {
                        Some(emitter) => self.stop_emitter(emitter, report),
                        None => log::debug!("Detach requested for a sound that is not attached"),
                    }
                }
                RegistryCommand::StopAll => {
                    for emitter in registry.iter_mut() {
                        self.stop_emitter(emitter, report);
                    }
                }
            }
        }
    }

    fn stop_emitter(&self, emitter: &mut Emitter, report: &mut FrameReport) {
        let was_active = emitter.is_active();
        emitter.stop();
        if was_active {
            report.finished += 1;
            self.emit(SpatialSoundEvent::EmitterFinished {
                emitter_id: emitter.id(),
                reason: FinishReason::Stopped,
            });
        }
    }

    fn sweep(&self, registry: &mut EmitterRegistry) -> usize {
        registry.sweep(|emitter| {
            emitter.release();
            self.emit(SpatialSoundEvent::EmitterRemoved {
                emitter_id: emitter.id(),
            });
        })
    }

    /// Stops and releases every emitter immediately, without waiting for a frame.
    pub fn shutdown(&self) {
        let mut registry = lock(&self.registry);
        let mut report = FrameReport::default();
        self.apply_commands(&mut registry, &mut report);
        for emitter in registry.iter_mut() {
            self.stop_emitter(emitter, &mut report);
        }
        let removed = self.sweep(&mut registry);
        self.registered.store(registry.len(), Ordering::Release);
        if removed > 0 {
            log::info!("Spatial sound system shut down, released {} emitters", removed);
        }
    }

    /// Returns all events emitted since the last call.
    pub fn poll_events(&self) -> Vec<SpatialSoundEvent> {
        self.event_receiver.try_iter().collect()
    }

    /// Whether `id` is in the registry as of the last tick.
    pub fn contains(&self, id: EmitterId) -> bool {
        lock(&self.registry).contains(id)
    }

    /// Number of registered emitters as of the last tick.
    pub fn len(&self) -> usize {
        self.registered.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of created or attached emitters waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.pending_registrations.load(Ordering::Acquire)
    }

    pub fn emitter_ids(&self) -> Vec<EmitterId> {
        lock(&self.registry).ids()
    }

    pub fn emitter_state(&self, id: EmitterId) -> Option<EmitterState> {
        lock(&self.registry).get(id).map(Emitter::state)
    }

    /// World position the emitter resolved to on its last update.
    pub fn emitter_position(&self, id: EmitterId) -> Option<Vec3> {
        lock(&self.registry).get(id).and_then(Emitter::last_position)
    }

    /// Attenuation last applied to the emitter's sound.
    pub fn attenuation(&self, id: EmitterId) -> Option<Attenuation> {
        lock(&self.registry)
            .get(id)
            .and_then(Emitter::last_attenuation)
    }

    /// Number of frames ticked so far.
    pub fn frame_count(&self) -> u64 {
        self.frame.load(Ordering::Relaxed)
    }

    pub fn set_listener_pose(&self, pose: Pose) {
        lock(&self.listener).set_pose(pose);
    }

    /// Returns a copy of the current listener.
    pub fn listener(&self) -> SpatialSoundListener {
        lock(&self.listener).clone()
    }

    fn reserve_slot(&self) -> Result<()> {
        let pending = self.pending_registrations.fetch_add(1, Ordering::AcqRel) + 1;
        if self.registered.load(Ordering::Acquire) + pending > self.desc.max_emitters {
            self.release_slot();
            return Err(SpatialSoundError::CapacityExceeded(self.desc.max_emitters));
        }
        Ok(())
    }

    fn release_slot(&self) {
        self.pending_registrations.fetch_sub(1, Ordering::AcqRel);
    }

    fn enqueue_registration(&self, emitter: Emitter) -> Result<()> {
        self.enqueue(RegistryCommand::Register(emitter))
            .inspect_err(|_| self.release_slot())
    }

    fn enqueue(&self, command: RegistryCommand) -> Result<()> {
        self.command_sender.send(command).map_err(|e| {
            SpatialSoundError::Engine(format!("Failed to send registry command: {}", e))
        })
    }

    fn emit(&self, event: SpatialSoundEvent) {
        if let Err(TrySendError::Full(event)) = self.event_sender.try_send(event) {
            log::debug!("Event queue full, dropping {:?}", event);
        }
    }
}

impl Drop for SpatialSoundSystem {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The reference pose (typically the camera) attenuation is computed against.
#[derive(Debug, Clone, Default)]
pub struct SpatialSoundListener {
    pose: Pose,
}

impl SpatialSoundListener {
    pub fn new(pose: Pose) -> Self {
        Self { pose }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }
}

fn owned_anchor(pose: Pose) -> Result<(AnchorRef, TrackingTarget, Arc<dyn SceneNode>)> {
    if !pose.is_finite() {
        return Err(SpatialSoundError::UnresolvableTarget(format!(
            "target pose {:?} is not finite",
            pose
        )));
    }
    let anchor = Arc::new(Anchor::new(pose));
    let parent: Arc<dyn SceneNode> = anchor.clone();
    Ok((
        AnchorRef::Owned(anchor),
        TrackingTarget::Fixed(pose),
        parent,
    ))
}

fn has_position(node: &dyn SceneNode) -> bool {
    node.is_alive()
        && node
            .world_pose()
            .is_some_and(|pose| pose.position.is_finite())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
