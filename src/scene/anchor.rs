use super::SceneNode;
use crate::math::{Pose, Vec3};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// Fixed-pose scene node owned by an emitter.
///
/// Created when an emitter is given a raw point or pose instead of an existing
/// scene object. The anchor is destroyed together with its emitter.
#[derive(Debug)]
pub struct Anchor {
    pose: Pose,
    destroyed: AtomicBool,
}

impl Anchor {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            destroyed: AtomicBool::new(false),
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn position(&self) -> Vec3 {
        self.pose.position
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    pub(crate) fn destroy(&self) {
        if !self.destroyed.swap(true, Ordering::AcqRel) {
            log::debug!("Anchor at {} destroyed", self.pose.position);
        }
    }
}

impl SceneNode for Anchor {
    fn world_pose(&self) -> Option<Pose> {
        (!self.is_destroyed()).then_some(self.pose)
    }

    fn is_alive(&self) -> bool {
        !self.is_destroyed()
    }
}

/// The anchor an emitter follows, as handed back to the caller.
#[derive(Clone)]
pub enum AnchorRef {
    /// Anchor created for a point/pose target, destroyed with the emitter
    Owned(Arc<Anchor>),
    /// Existing host scene node, never destroyed by this crate
    Node(Weak<dyn SceneNode>),
}

impl AnchorRef {
    /// Current world position, or `None` once the anchor is gone.
    pub fn position(&self) -> Option<Vec3> {
        self.pose().map(|pose| pose.position)
    }

    pub fn pose(&self) -> Option<Pose> {
        match self {
            Self::Owned(anchor) => anchor.world_pose(),
            Self::Node(node) => node
                .upgrade()
                .filter(|node| node.is_alive())
                .and_then(|node| node.world_pose()),
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }
}

impl std::fmt::Debug for AnchorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owned(anchor) => f.debug_tuple("Owned").field(anchor).finish(),
            Self::Node(_) => f.debug_tuple("Node").field(&self.position()).finish(),
        }
    }
}
