//! Scene graph integration.
//!
//! Emitters follow positions supplied by the host's scene graph. The host
//! implements [`SceneNode`] for its parts, attachments or entities; this crate
//! only ever keeps [`Weak`](std::sync::Weak) references to them and checks
//! liveness every frame, so an emitter never keeps a destroyed object alive.
//!
//! - [`SceneNode`]: trait the host implements for position-bearing objects
//! - [`Anchor`]: fixed-pose node created for point/pose targets
//! - [`Target`]: what an emitter should follow when it is created

mod anchor;
mod target;

pub use anchor::{Anchor, AnchorRef};
pub use target::Target;
pub(crate) use target::TrackingTarget;

use crate::math::Pose;

/// A host scene object an emitter can follow.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the update loop may run on a
/// different thread than the one that registered the emitter.
pub trait SceneNode: Send + Sync {
    /// Current world pose of the node.
    ///
    /// Returns `None` when the node does not carry a position (a folder or
    /// model container, for example) or is no longer part of the scene.
    fn world_pose(&self) -> Option<Pose>;

    /// Whether the node still exists in the scene.
    ///
    /// Hosts that destroy objects while handles are still around should
    /// return `false` once destroyed. Default implementation returns `true`.
    fn is_alive(&self) -> bool {
        true
    }
}
