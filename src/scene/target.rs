use super::{Anchor, SceneNode};
use crate::math::{Pose, Vec3};
use std::sync::{Arc, Weak};

/// What a newly created emitter should follow.
#[derive(Clone)]
pub enum Target {
    /// Fixed world point; a new anchor is created there
    Point(Vec3),
    /// Fixed world pose; a new anchor is created there
    Pose(Pose),
    /// Existing scene object, followed live every frame
    Node(Arc<dyn SceneNode>),
}

impl From<Vec3> for Target {
    fn from(point: Vec3) -> Self {
        Self::Point(point)
    }
}

impl From<Pose> for Target {
    fn from(pose: Pose) -> Self {
        Self::Pose(pose)
    }
}

impl From<Arc<dyn SceneNode>> for Target {
    fn from(node: Arc<dyn SceneNode>) -> Self {
        Self::Node(node)
    }
}

impl From<Arc<Anchor>> for Target {
    fn from(anchor: Arc<Anchor>) -> Self {
        Self::Node(anchor)
    }
}

/// Resolved form of a target, stored on the emitter.
pub(crate) enum TrackingTarget {
    Fixed(Pose),
    Tracking(Weak<dyn SceneNode>),
}

impl TrackingTarget {
    /// World position for this frame, `None` if a tracked node is gone.
    pub(crate) fn resolve(&self) -> Option<Vec3> {
        match self {
            Self::Fixed(pose) => Some(pose.position),
            Self::Tracking(node) => {
                let node = node.upgrade()?;
                if !node.is_alive() {
                    return None;
                }
                node.world_pose()
                    .map(|pose| pose.position)
                    .filter(|position| position.is_finite())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_target_is_constant() {
        let target = TrackingTarget::Fixed(Pose::from_position(Vec3::new(10.0, 5.0, 0.0)));
        assert_eq!(target.resolve(), Some(Vec3::new(10.0, 5.0, 0.0)));
        assert_eq!(target.resolve(), Some(Vec3::new(10.0, 5.0, 0.0)));
    }

    #[test]
    fn test_tracking_target_follows_liveness() {
        let anchor = Arc::new(Anchor::new(Pose::from_position(Vec3::X)));
        let node: Arc<dyn SceneNode> = anchor.clone();
        let target = TrackingTarget::Tracking(Arc::downgrade(&node));
        assert_eq!(target.resolve(), Some(Vec3::X));

        anchor.destroy();
        assert_eq!(target.resolve(), None);
    }

    #[test]
    fn test_conversions() {
        assert!(matches!(Target::from(Vec3::ONE), Target::Point(_)));
        assert!(matches!(Target::from(Pose::identity()), Target::Pose(_)));
        let anchor = Arc::new(Anchor::new(Pose::identity()));
        assert!(matches!(Target::from(anchor), Target::Node(_)));
    }
}
