//! PalmGrab Core Library
//!
//! Hand-tracked grab, move, rotate and throw for VR objects. A
//! [`GrabController`] consumes per-hand gesture labels and joint poses each
//! frame and drives one selected object at a time.

pub mod axis_lock;
pub mod config;
pub mod controller;
pub mod gesture;
pub mod grabbable;
pub mod hand;
pub mod manipulation;
pub mod pose;

pub use axis_lock::{AxisLock, POS_LOCK_X, POS_LOCK_Y, POS_LOCK_Z};
pub use config::{ConfigError, ConfigResult, GrabConfig};
pub use controller::{GrabController, ReleaseEvent, COOLDOWN_INACTIVE};
pub use gesture::Gesture;
pub use grabbable::{
    GrabEvent, Grabbable, GrabbableLookup, GrabbableObject, GrabbableStore, InteractionState, ObjectId,
};
pub use hand::{HandChannel, HandFrame, HandRig, HandTracker, Handedness};
pub use manipulation::ManipulationState;
pub use pose::Pose;

pub use glam::{Quat, Vec3};
