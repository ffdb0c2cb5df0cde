//! # spatial-sound
//!
//! Client-side spatial sound emitters for games. Sounds are bound to fixed
//! positions or to scene objects, and once per rendered frame their volume,
//! balance and tone are recomputed from where they sit relative to the
//! listener (usually the camera). Non-looped sounds clean up after themselves.
//!
//! The host engine stays in charge of the heavy lifting and plugs in through
//! traits:
//!
//! - [`SceneNode`]: position-bearing scene objects (parts, attachments, entities)
//! - [`SoundBackend`] / [`Sound`]: the audio playback subsystem
//! - [`FrameScheduler`]: the render loop's per-frame signal
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spatial_sound::*;
//! use std::sync::Arc;
//!
//! // Your engine's audio subsystem
//! let backend: Arc<dyn SoundBackend> = Arc::new(MyBackend::new());
//! let system = Arc::new(SpatialSoundSystem::new(SpatialSoundDesc::default(), backend)?);
//!
//! // Positional one-shot at a fixed point
//! let emitter = system.create("123456789", Vec3::new(10.0, 5.0, 0.0), false)?;
//!
//! // Track a sound that already lives on a part
//! system.attach(part_sound);
//!
//! // Drive the system from the render loop
//! let (frames, scheduler) = frame_channel();
//! let (handle, join) = UpdateLoop::new(system.clone(), scheduler).spawn()?;
//! frames.send_frame(camera_pose)?;
//!
//! for event in system.poll_events() {
//!     if let SpatialSoundEvent::EmitterRemoved { emitter_id } = event {
//!         println!("{} cleaned up", emitter_id);
//!     }
//! }
//! # Ok::<(), SpatialSoundError>(())
//! ```
//!
//! ## Attenuation
//!
//! The attenuation policy lives in [`AttenuationConfig`]: a falloff curve over
//! a `[min_distance, max_distance]` range, a directional bias making sources
//! behind the listener quieter and more muffled, and air absorption muffling
//! distant sources. Every curve is continuous and monotonic in distance.

pub mod asset;
pub mod config;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod events;
pub mod math;
pub mod playback;
mod registry;
pub mod scene;
pub mod spatial;
mod system;

#[cfg(test)]
pub(crate) mod test_support;

pub use asset::AssetId;
pub use config::{AttenuationConfig, FalloffCurve, SpatialSoundDesc};
pub use emitter::{EmitterId, EmitterRef, EmitterState, FinishReason};
pub use engine::{
    ChannelScheduler, FrameScheduler, FrameSender, LoopHandle, UpdateLoop, frame_channel,
};
pub use error::{Result, SpatialSoundError};
pub use events::SpatialSoundEvent;
pub use math::{Pose, Quat, Vec3};
pub use playback::{PlayState, Sound, SoundBackend};
pub use scene::{Anchor, AnchorRef, SceneNode, Target};
pub use spatial::{Attenuation, Equalizer};
pub use system::{FrameReport, SpatialSoundListener, SpatialSoundSystem};
