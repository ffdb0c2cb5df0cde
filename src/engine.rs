//! Frame-driven update loop.
//!
//! The host's render scheduler is abstracted as a [`FrameScheduler`]: each call
//! to [`FrameScheduler::next_frame`] waits for the next rendered frame and
//! returns the listener (camera) pose for it. [`UpdateLoop`] turns that into
//! one [`SpatialSoundSystem::tick`] per frame.

use crate::error::{Result, SpatialSoundError};
use crate::math::Pose;
use crate::system::{FrameReport, SpatialSoundSystem};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::JoinHandle;

/// Source of per-frame ticks.
pub trait FrameScheduler: Send {
    /// Waits for the next frame and returns the listener pose for it.
    ///
    /// Returns `None` once the host stops rendering, which ends the loop.
    fn next_frame(&mut self) -> Option<Pose>;
}

impl<F> FrameScheduler for F
where
    F: FnMut() -> Option<Pose> + Send,
{
    fn next_frame(&mut self) -> Option<Pose> {
        self()
    }
}

/// Creates a scheduler fed from the host's render callback.
pub fn frame_channel() -> (FrameSender, ChannelScheduler) {
    let (sender, receiver) = crossbeam_channel::unbounded();
    (FrameSender { sender }, ChannelScheduler { receiver })
}

/// Render-callback side of [`frame_channel`]. Never blocks.
#[derive(Clone)]
pub struct FrameSender {
    sender: Sender<Pose>,
}

impl FrameSender {
    /// Signals that a frame was rendered with the camera at `listener`.
    pub fn send_frame(&self, listener: Pose) -> Result<()> {
        self.sender.send(listener).map_err(|e| {
            SpatialSoundError::Engine(format!("Failed to send frame signal: {}", e))
        })
    }
}

/// Loop side of [`frame_channel`].
///
/// Frames that pile up while the loop is busy are coalesced: only the most
/// recent listener pose is used.
pub struct ChannelScheduler {
    receiver: Receiver<Pose>,
}

impl FrameScheduler for ChannelScheduler {
    fn next_frame(&mut self) -> Option<Pose> {
        let first = self.receiver.recv().ok()?;
        let latest = self.receiver.try_iter().last().unwrap_or(first);
        Some(latest)
    }
}

/// Drives a [`SpatialSoundSystem`] from a [`FrameScheduler`].
pub struct UpdateLoop<S: FrameScheduler> {
    system: Arc<SpatialSoundSystem>,
    scheduler: S,
    is_running: Arc<AtomicBool>,
    frames_processed: Arc<AtomicUsize>,
}

impl<S: FrameScheduler> UpdateLoop<S> {
    pub fn new(system: Arc<SpatialSoundSystem>, scheduler: S) -> Self {
        Self {
            system,
            scheduler,
            is_running: Arc::new(AtomicBool::new(false)),
            frames_processed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Waits for one frame and ticks the system. `None` if the scheduler ended.
    pub fn step(&mut self) -> Option<FrameReport> {
        let listener = self.scheduler.next_frame()?;
        let report = self.system.tick(listener);
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
        Some(report)
    }

    /// Ticks once per frame until the scheduler ends or [`LoopHandle::stop`]
    /// is called. Returns the number of frames processed by this call.
    ///
    /// A stop request is noticed when the next frame arrives.
    pub fn run(&mut self) -> usize {
        self.is_running.store(true, Ordering::Release);
        self.run_until_stopped()
    }

    /// Loop body shared by [`run`](Self::run) and [`spawn`](UpdateLoop::spawn);
    /// never re-arms the running flag.
    fn run_until_stopped(&mut self) -> usize {
        log::info!("Spatial sound update loop started");

        let mut frames = 0;
        while self.is_running.load(Ordering::Acquire) {
            let Some(listener) = self.scheduler.next_frame() else {
                break;
            };
            if !self.is_running.load(Ordering::Acquire) {
                break;
            }
            self.system.tick(listener);
            self.frames_processed.fetch_add(1, Ordering::Relaxed);
            frames += 1;
        }

        self.is_running.store(false, Ordering::Release);
        log::info!("Spatial sound update loop stopped after {} frames", frames);
        frames
    }

    /// Handle for stopping the loop from another thread.
    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            is_running: self.is_running.clone(),
            frames_processed: self.frames_processed.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
    }

    /// Total number of frames processed since the loop was created.
    pub fn frames_processed(&self) -> usize {
        self.frames_processed.load(Ordering::Relaxed)
    }

    pub fn system(&self) -> &Arc<SpatialSoundSystem> {
        &self.system
    }
}

impl<S: FrameScheduler + 'static> UpdateLoop<S> {
    /// Runs the loop on a dedicated thread.
    pub fn spawn(mut self) -> Result<(LoopHandle, JoinHandle<usize>)> {
        let handle = self.handle();
        // Marked running before the thread starts so a stop issued right away is not lost.
        self.is_running.store(true, Ordering::Release);
        let join = std::thread::Builder::new()
            .name("spatial-sound-update".into())
            .spawn(move || self.run_until_stopped())
            .map_err(|e| {
                SpatialSoundError::Engine(format!("Failed to spawn update loop thread: {}", e))
            })?;
        Ok((handle, join))
    }
}

/// Shared view of a running [`UpdateLoop`].
#[derive(Clone)]
pub struct LoopHandle {
    is_running: Arc<AtomicBool>,
    frames_processed: Arc<AtomicUsize>,
}

impl LoopHandle {
    pub fn stop(&self) {
        self.is_running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Acquire)
    }

    pub fn frames_processed(&self) -> usize {
        self.frames_processed.load(Ordering::Relaxed)
    }
}
