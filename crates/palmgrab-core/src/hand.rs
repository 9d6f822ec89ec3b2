//! Per-hand tracking input and grab candidate queues.

use crate::gesture::Gesture;
use crate::grabbable::ObjectId;
use crate::pose::Pose;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Left or right hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Both hands, in selection priority order.
    pub const PRIORITY: [Handedness; 2] = [Handedness::Right, Handedness::Left];

    /// The other hand.
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Resolved joints of one tracked hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandRig {
    /// Palm pose, reported with release events.
    pub palm: Pose,
    /// Palm-anchored manipulation origin.
    pub grab_point: Pose,
    /// Index fingertip position.
    pub index_tip: Vec3,
    /// Thumb tip position.
    pub thumb_tip: Vec3,
}

impl HandRig {
    /// Distance between thumb and index fingertips.
    pub fn tip_distance(&self) -> f32 {
        self.index_tip.distance(self.thumb_tip)
    }

    /// Midpoint of the thumb and index fingertips.
    pub fn tip_center(&self) -> Vec3 {
        (self.index_tip + self.thumb_tip) / 2.0
    }

    /// Move every joint by `offset`.
    pub fn translated(mut self, offset: Vec3) -> Self {
        self.palm = self.palm.translated(offset);
        self.grab_point = self.grab_point.translated(offset);
        self.index_tip += offset;
        self.thumb_tip += offset;
        self
    }
}

/// One tracking sample for a hand: its buffered gesture and joints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    pub gesture: Gesture,
    pub rig: HandRig,
}

impl HandFrame {
    pub fn new(gesture: Gesture, rig: HandRig) -> Self {
        Self { gesture, rig }
    }
}

/// Source of per-frame hand samples, typically the hand tracker plus the
/// gesture classifier.
pub trait HandTracker {
    /// Latest sample for `hand`, or `None` while the hand is not tracked.
    fn sample(&mut self, hand: Handedness) -> Option<HandFrame>;
}

/// Tracking input and waiting queue for one hand.
#[derive(Debug, Clone)]
pub struct HandChannel {
    handedness: Handedness,
    /// Latest sample; `None` until the hand is resolved.
    frame: Option<HandFrame>,
    /// Objects waiting to be selected, oldest first.
    queue: Vec<ObjectId>,
}

impl HandChannel {
    /// Create an untracked channel with an empty queue.
    pub fn new(handedness: Handedness) -> Self {
        Self {
            handedness,
            frame: None,
            queue: Vec::new(),
        }
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    /// Replace the tracking sample.
    pub fn set_frame(&mut self, frame: Option<HandFrame>) {
        self.frame = frame;
    }

    pub fn frame(&self) -> Option<&HandFrame> {
        self.frame.as_ref()
    }

    /// Buffered gesture, or `None` while the hand is not tracked.
    pub fn gesture(&self) -> Option<Gesture> {
        self.frame.map(|frame| frame.gesture)
    }

    /// Resolved joints, or `None` while the hand is not tracked.
    pub fn rig(&self) -> Option<&HandRig> {
        self.frame.as_ref().map(|frame| &frame.rig)
    }

    /// Append an object to the queue. Returns false if it was already queued.
    pub fn enqueue(&mut self, id: ObjectId) -> bool {
        if self.queue.contains(&id) {
            return false;
        }
        self.queue.push(id);
        true
    }

    /// Remove an object from the queue. Returns false if it was not queued.
    pub fn remove(&mut self, id: ObjectId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|queued| *queued != id);
        self.queue.len() != before
    }

    /// Keep only queued objects matching `keep`; returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(ObjectId) -> bool) -> usize {
        let before = self.queue.len();
        self.queue.retain(|id| keep(*id));
        before - self.queue.len()
    }

    /// Oldest queued object.
    pub fn head(&self) -> Option<ObjectId> {
        self.queue.first().copied()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.queue.contains(&id)
    }

    /// Queued objects, oldest first.
    pub fn queue(&self) -> &[ObjectId] {
        &self.queue
    }

    /// Drop the queue and the tracking sample.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.frame = None;
    }
}
