//! Grabbable objects and the registry the controller resolves them through.
//!
//! The controller never owns a grabbable. It holds [`ObjectId`] handles and
//! looks objects up through [`GrabbableLookup`] every frame, so a destroyed
//! object simply stops resolving instead of leaving a dangling reference.

mod state;
mod store;

pub use state::InteractionState;
pub use store::GrabbableStore;

use crate::axis_lock::AxisLock;
use crate::hand::Handedness;
use crate::pose::Pose;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Handle identifying a grabbable in its registry.
pub type ObjectId = Uuid;

/// Lifecycle notification sent by the controller to a grabbable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GrabEvent {
    /// The object became the controller's selection.
    Selected,
    /// The object is no longer selected.
    Deselected,
    /// A hand closed on the object.
    GrabStarted,
    /// The hand let go. `velocity` is the smoothed fingertip velocity in
    /// metres per frame, to be used as a throw impulse.
    GrabStopped { velocity: Vec3 },
}

/// Capabilities the controller needs from a grabbable object.
pub trait Grabbable {
    /// Which hand this object is assigned to.
    fn handedness(&self) -> Handedness;

    /// Position axes frozen during manipulation.
    fn axis_lock(&self) -> AxisLock;

    /// Current world pose.
    fn pose(&self) -> Pose;

    /// Overwrite the world pose. Only the controller writes this while the
    /// object is grabbed.
    fn set_pose(&mut self, pose: Pose);

    /// Receive a lifecycle notification.
    fn on_grab_event(&mut self, event: &GrabEvent);
}

/// Resolves object handles. A missing entry means the object was destroyed.
pub trait GrabbableLookup {
    /// Look up an object.
    fn grabbable(&self, id: ObjectId) -> Option<&dyn Grabbable>;

    /// Look up an object for mutation.
    fn grabbable_mut(&mut self, id: ObjectId) -> Option<&mut dyn Grabbable>;

    /// Check whether the handle still resolves.
    fn contains(&self, id: ObjectId) -> bool {
        self.grabbable(id).is_some()
    }
}

/// A plain grabbable body: pose, hand assignment, lock and throw settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrabbableObject {
    /// World pose.
    pub pose: Pose,
    /// Hand allowed to grab this object.
    pub handedness: Handedness,
    /// Locked position axes.
    #[serde(default)]
    pub axis_lock: AxisLock,
    /// Multiplier applied to the release velocity when thrown.
    #[serde(default = "default_throw_power")]
    pub throw_power: f32,
    /// Interaction state driven by grab events.
    #[serde(skip)]
    pub state: InteractionState,
    /// Velocity to hand to physics after the last release.
    #[serde(skip)]
    pub throw_velocity: Option<Vec3>,
}

fn default_throw_power() -> f32 {
    1.0
}

impl GrabbableObject {
    /// Create an object assigned to `handedness` at `pose`.
    pub fn new(pose: Pose, handedness: Handedness) -> Self {
        Self {
            pose,
            handedness,
            axis_lock: AxisLock::NONE,
            throw_power: default_throw_power(),
            state: InteractionState::Normal,
            throw_velocity: None,
        }
    }

    /// Set the locked axes.
    pub fn with_axis_lock(mut self, axis_lock: AxisLock) -> Self {
        self.axis_lock = axis_lock;
        self
    }

    /// Set the throw multiplier.
    pub fn with_throw_power(mut self, throw_power: f32) -> Self {
        self.throw_power = throw_power;
        self
    }
}

impl Grabbable for GrabbableObject {
    fn handedness(&self) -> Handedness {
        self.handedness
    }

    fn axis_lock(&self) -> AxisLock {
        self.axis_lock
    }

    fn pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    fn on_grab_event(&mut self, event: &GrabEvent) {
        self.state = self.state.apply(event);
        match event {
            GrabEvent::GrabStarted => self.throw_velocity = None,
            GrabEvent::GrabStopped { velocity } => {
                self.throw_velocity = Some(*velocity * self.throw_power);
            }
            GrabEvent::Selected | GrabEvent::Deselected => {}
        }
    }
}
