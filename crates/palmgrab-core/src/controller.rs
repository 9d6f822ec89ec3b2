//! Grab controller: selection arbitration, gesture transitions and
//! per-frame manipulation of the selected object.

use crate::config::GrabConfig;
use crate::grabbable::{GrabEvent, GrabbableLookup, ObjectId};
use crate::hand::{HandChannel, HandFrame, HandTracker, Handedness};
use crate::manipulation::ManipulationState;
use crate::pose::Pose;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Cooldown value meaning "not counting down".
pub const COOLDOWN_INACTIVE: f32 = -1.0;

/// Emitted whenever a held object is let go.
///
/// Also emitted when a held object is destroyed mid-grab; in that case the
/// handle no longer resolves and `last_grabbed` is not updated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReleaseEvent {
    /// Hand that released the object.
    pub hand: Handedness,
    /// Palm pose of that hand, `None` if the hand was no longer tracked.
    pub reference_point: Option<Pose>,
    /// The released object.
    pub object: ObjectId,
    /// Smoothed release velocity, metres per frame.
    pub velocity: Vec3,
}

/// Drives grabbing for both hands, one object at a time.
///
/// Call [`GrabController::update`] once per frame after feeding the latest
/// hand samples. The controller holds object handles only; every access goes
/// through the [`GrabbableLookup`] passed in.
#[derive(Debug, Clone)]
pub struct GrabController {
    config: GrabConfig,
    left: HandChannel,
    right: HandChannel,
    /// Object currently selected, if any.
    selected: Option<ObjectId>,
    /// Whether the selected object is held.
    grabbing: bool,
    /// Seconds left before a regrab, or [`COOLDOWN_INACTIVE`].
    regrab_cooldown: f32,
    /// Reused for every grab.
    manipulation: ManipulationState,
    /// Most recently released object.
    last_grabbed: Option<ObjectId>,
    /// Release events not yet polled.
    release_events: Vec<ReleaseEvent>,
}

impl Default for GrabController {
    fn default() -> Self {
        Self::new(GrabConfig::default())
    }
}

impl GrabController {
    /// Create a controller with untracked hands and empty queues.
    pub fn new(config: GrabConfig) -> Self {
        Self {
            config,
            left: HandChannel::new(Handedness::Left),
            right: HandChannel::new(Handedness::Right),
            selected: None,
            grabbing: false,
            regrab_cooldown: COOLDOWN_INACTIVE,
            manipulation: ManipulationState::new(),
            last_grabbed: None,
            release_events: Vec::new(),
        }
    }

    pub fn config(&self) -> &GrabConfig {
        &self.config
    }

    /// Channel for one hand.
    pub fn hand(&self, hand: Handedness) -> &HandChannel {
        match hand {
            Handedness::Left => &self.left,
            Handedness::Right => &self.right,
        }
    }

    fn hand_mut(&mut self, hand: Handedness) -> &mut HandChannel {
        match hand {
            Handedness::Left => &mut self.left,
            Handedness::Right => &mut self.right,
        }
    }

    // --- Tracking input ---

    /// Store the latest sample for a hand; `None` marks it untracked.
    pub fn set_hand_frame(&mut self, hand: Handedness, frame: Option<HandFrame>) {
        self.hand_mut(hand).set_frame(frame);
    }

    /// Pull fresh samples for both hands from `tracker`.
    pub fn track<T: HandTracker + ?Sized>(&mut self, tracker: &mut T) {
        for hand in Handedness::PRIORITY {
            let frame = tracker.sample(hand);
            self.set_hand_frame(hand, frame);
        }
    }

    // --- Queue membership ---

    /// Put an object in its hand's waiting queue.
    ///
    /// Idempotent. Returns true if the object was newly queued. Unknown
    /// handles are ignored.
    pub fn request_queue<L: GrabbableLookup + ?Sized>(&mut self, objects: &L, id: ObjectId) -> bool {
        let Some(object) = objects.grabbable(id) else {
            return false;
        };
        let hand = object.handedness();
        // The hand assignment may have changed since an earlier request.
        self.hand_mut(hand.opposite()).remove(id);
        self.hand_mut(hand).enqueue(id)
    }

    /// Remove an object from its queue, releasing and deselecting it first
    /// if the controller is working with it.
    pub fn withdraw_from_queue<L: GrabbableLookup + ?Sized>(&mut self, objects: &mut L, id: ObjectId) {
        self.deselect(objects, id);
        self.left.remove(id);
        self.right.remove(id);
    }

    // --- Per-frame update ---

    /// Advance one frame. `dt` is the frame duration in seconds.
    pub fn update<L: GrabbableLookup + ?Sized>(&mut self, objects: &mut L, dt: f32) {
        if self.regrab_cooldown > 0.0 {
            self.regrab_cooldown -= dt;
        }

        self.clear_stale_handles(&*objects);

        if self.selected.is_none() {
            let candidate = Handedness::PRIORITY
                .into_iter()
                .find_map(|hand| self.hand(hand).head());
            match candidate {
                Some(id) => self.select(objects, id),
                None => return,
            }
        }

        if self.grabbing {
            if self.is_release_gesture() {
                self.end_grab(objects);
            } else {
                self.manipulate_selected(objects);
            }
        } else if self.is_grab_gesture(&*objects) {
            self.start_grab(objects);
        }
    }

    /// Drop handles whose objects no longer exist.
    fn clear_stale_handles<L: GrabbableLookup + ?Sized>(&mut self, objects: &L) {
        for channel in [&mut self.left, &mut self.right] {
            let dropped = channel.retain(|id| objects.contains(id));
            if dropped > 0 {
                log::debug!("Dropped {} destroyed object(s) from {:?} queue", dropped, channel.handedness());
            }
        }

        if let Some(id) = self.selected {
            if !objects.contains(id) {
                log::warn!("Selected object {} was destroyed, clearing selection", id);
                if self.grabbing {
                    // No GrabStopped: the object is gone.
                    self.push_release_event(id);
                    self.regrab_cooldown = self.config.regrab_cooldown_secs;
                }
                self.selected = None;
                self.grabbing = false;
            }
        }

        if let Some(id) = self.last_grabbed {
            if !objects.contains(id) {
                self.last_grabbed = None;
            }
        }
    }

    fn select<L: GrabbableLookup + ?Sized>(&mut self, objects: &mut L, id: ObjectId) {
        let Some(object) = objects.grabbable_mut(id) else {
            return;
        };
        self.selected = Some(id);
        object.on_grab_event(&GrabEvent::Selected);
        // A new selection cancels any pending cooldown.
        self.regrab_cooldown = COOLDOWN_INACTIVE;
        log::debug!("Selected object {}", id);
    }

    fn deselect<L: GrabbableLookup + ?Sized>(&mut self, objects: &mut L, id: ObjectId) {
        if self.selected != Some(id) {
            return;
        }
        if self.grabbing {
            self.end_grab(objects);
        }
        self.selected = None;
        if let Some(object) = objects.grabbable_mut(id) {
            object.on_grab_event(&GrabEvent::Deselected);
        }
        log::debug!("Deselected object {}", id);
    }

    fn is_grab_gesture<L: GrabbableLookup + ?Sized>(&self, objects: &L) -> bool {
        let Some(object) = self.selected.and_then(|id| objects.grabbable(id)) else {
            return false;
        };
        self.hand(object.handedness())
            .gesture()
            .is_some_and(|gesture| gesture.is_grab())
    }

    fn is_release_gesture(&self) -> bool {
        if self.selected.is_none() {
            return false;
        }
        let Some(frame) = self.hand(self.manipulation.hand()).frame() else {
            return false;
        };
        frame
            .gesture
            .is_release(frame.rig.tip_distance(), self.config.release_tip_distance)
    }

    fn start_grab<L: GrabbableLookup + ?Sized>(&mut self, objects: &mut L) {
        if self.grabbing {
            return;
        }
        let Some(id) = self.selected else {
            return;
        };
        if self.config.enforce_regrab_cooldown && self.is_cooling_down() {
            log::debug!("Grab of {} held back by cooldown ({:.3}s left)", id, self.regrab_cooldown);
            return;
        }
        let Some(object) = objects.grabbable_mut(id) else {
            return;
        };
        let hand = object.handedness();
        let Some(rig) = self.hand(hand).rig().copied() else {
            return;
        };

        object.on_grab_event(&GrabEvent::GrabStarted);
        self.manipulation.begin(hand, &rig, object.pose().position);
        self.grabbing = true;
        log::info!("Start grab of {} with {:?} hand", id, hand);
    }

    fn end_grab<L: GrabbableLookup + ?Sized>(&mut self, objects: &mut L) {
        if !self.grabbing {
            return;
        }
        let Some(id) = self.selected else {
            return;
        };

        let velocity = self.manipulation.release_velocity();
        if let Some(object) = objects.grabbable_mut(id) {
            object.on_grab_event(&GrabEvent::GrabStopped { velocity });
        }
        self.grabbing = false;
        self.regrab_cooldown = self.config.regrab_cooldown_secs;
        self.last_grabbed = Some(id);
        self.push_release_event(id);
        log::info!("End grab of {}, release velocity {:?}", id, velocity);
    }

    fn push_release_event(&mut self, object: ObjectId) {
        let hand = self.manipulation.hand();
        self.release_events.push(ReleaseEvent {
            hand,
            reference_point: self.hand(hand).rig().map(|rig| rig.palm),
            object,
            velocity: self.manipulation.release_velocity(),
        });
    }

    /// Move the held object with the hand and sample the release velocity.
    fn manipulate_selected<L: GrabbableLookup + ?Sized>(&mut self, objects: &mut L) {
        if !self.grabbing {
            return;
        }
        let Some(id) = self.selected else {
            return;
        };
        let Some(rig) = self.hand(self.manipulation.hand()).rig().copied() else {
            return;
        };
        let Some(object) = objects.grabbable_mut(id) else {
            return;
        };

        let next = self.manipulation.step(&rig, object.pose(), object.axis_lock());
        object.set_pose(next);
        self.manipulation.sample_release_velocity(&rig);
    }

    // --- Lifecycle ---

    /// Release and deselect whatever is active, then clear both queues,
    /// forget hand samples and reinitialize the manipulation state.
    pub fn reset<L: GrabbableLookup + ?Sized>(&mut self, objects: &mut L) {
        if let Some(id) = self.selected {
            self.deselect(objects, id);
        }
        self.left.clear();
        self.right.clear();
        self.manipulation = ManipulationState::new();
        self.regrab_cooldown = COOLDOWN_INACTIVE;
    }

    /// Tear the controller down. It can be reused afterwards as if new.
    pub fn shutdown<L: GrabbableLookup + ?Sized>(&mut self, objects: &mut L) {
        self.reset(objects);
        self.last_grabbed = None;
        self.release_events.clear();
        log::debug!("Grab controller shut down");
    }

    // --- Queries ---

    /// Whether an object is currently held.
    pub fn is_grabbing(&self) -> bool {
        self.grabbing
    }

    /// Currently selected object.
    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    /// Currently held object; `None` unless grabbing.
    pub fn grabbed_object(&self) -> Option<ObjectId> {
        if self.grabbing { self.selected } else { None }
    }

    /// Most recently released object.
    pub fn last_grabbed(&self) -> Option<ObjectId> {
        self.last_grabbed
    }

    /// Seconds left on the regrab cooldown, negative when inactive.
    pub fn regrab_cooldown(&self) -> f32 {
        self.regrab_cooldown
    }

    pub fn is_cooling_down(&self) -> bool {
        self.regrab_cooldown > 0.0
    }

    /// Manipulation data of the current (or last) grab.
    pub fn manipulation(&self) -> &ManipulationState {
        &self.manipulation
    }

    /// Take all release events since the last poll.
    pub fn poll_release_events(&mut self) -> Vec<ReleaseEvent> {
        std::mem::take(&mut self.release_events)
    }
}
