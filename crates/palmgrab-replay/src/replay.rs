//! Drives a [`GrabController`] through a recorded session.

use crate::error::{ReplayError, ReplayResult};
use crate::session::{Session, SessionFrame};
use palmgrab_core::{
    GrabController, GrabbableObject, GrabbableStore, Handedness, InteractionState, ObjectId, Pose, Vec3,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A release observed during playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    /// Frame index the release happened on.
    pub frame: usize,
    pub object: String,
    pub hand: Handedness,
    pub velocity: Vec3,
}

/// Final state of one surviving object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectReport {
    pub pose: Pose,
    pub state: InteractionState,
    pub throw_velocity: Option<Vec3>,
}

/// Outcome of a playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Frames played.
    pub frames: usize,
    pub releases: Vec<ReleaseRecord>,
    /// Objects still alive at the end, by name.
    pub objects: BTreeMap<String, ObjectReport>,
    pub selected: Option<String>,
    pub grabbing: bool,
    pub last_grabbed: Option<String>,
}

/// Playback state: the controller, the scene and the name mapping.
pub struct Replay {
    controller: GrabController,
    store: GrabbableStore<GrabbableObject>,
    ids: BTreeMap<String, ObjectId>,
    frame: usize,
    releases: Vec<ReleaseRecord>,
}

impl Replay {
    /// Build the scene described by `session`.
    pub fn new(session: &Session) -> Self {
        let mut store = GrabbableStore::new();
        let ids = session
            .objects
            .iter()
            .map(|(name, object)| (name.clone(), store.insert(object.clone())))
            .collect();

        Self {
            controller: GrabController::new(session.config.clone()),
            store,
            ids,
            frame: 0,
            releases: Vec::new(),
        }
    }

    /// Validate and play a whole session, then report the result.
    pub fn run(session: &Session) -> ReplayResult<ReplayReport> {
        session.validate()?;
        let mut replay = Self::new(session);
        for frame in &session.frames {
            replay.step(frame)?;
        }
        log::info!(
            "Replayed {} frames, {} release(s)",
            replay.frame,
            replay.releases.len()
        );
        Ok(replay.report())
    }

    /// Apply one frame: scene changes first, then tracking, then the update.
    pub fn step(&mut self, frame: &SessionFrame) -> ReplayResult<()> {
        for name in &frame.destroy {
            let id = self.id(name)?;
            if self.store.remove(id).is_some() {
                log::debug!("Frame {}: destroyed {}", self.frame, name);
            }
        }
        for name in &frame.withdraw {
            let id = self.id(name)?;
            self.controller.withdraw_from_queue(&mut self.store, id);
        }
        for name in &frame.enqueue {
            let id = self.id(name)?;
            if !self.controller.request_queue(&self.store, id) {
                log::debug!("Frame {}: {} already queued or gone", self.frame, name);
            }
        }

        let mut hands = frame.hands;
        self.controller.track(&mut hands);
        self.controller.update(&mut self.store, frame.dt);

        for event in self.controller.poll_release_events() {
            let object = self.name_of(event.object).unwrap_or_default();
            log::info!(
                "Frame {}: {:?} hand released {} at {:?}",
                self.frame,
                event.hand,
                object,
                event.velocity
            );
            self.releases.push(ReleaseRecord {
                frame: self.frame,
                object,
                hand: event.hand,
                velocity: event.velocity,
            });
        }

        self.frame += 1;
        Ok(())
    }

    /// The controller being driven.
    pub fn controller(&self) -> &GrabController {
        &self.controller
    }

    /// Current state of a named object, `None` if destroyed.
    pub fn object(&self, name: &str) -> Option<&GrabbableObject> {
        self.ids.get(name).and_then(|id| self.store.get(*id))
    }

    /// Snapshot of the playback so far.
    pub fn report(&self) -> ReplayReport {
        let objects = self
            .ids
            .iter()
            .filter_map(|(name, id)| {
                let object = self.store.get(*id)?;
                Some((
                    name.clone(),
                    ObjectReport {
                        pose: object.pose,
                        state: object.state,
                        throw_velocity: object.throw_velocity,
                    },
                ))
            })
            .collect();

        ReplayReport {
            frames: self.frame,
            releases: self.releases.clone(),
            objects,
            selected: self.controller.selected().and_then(|id| self.name_of(id)),
            grabbing: self.controller.is_grabbing(),
            last_grabbed: self.controller.last_grabbed().and_then(|id| self.name_of(id)),
        }
    }

    fn id(&self, name: &str) -> ReplayResult<ObjectId> {
        self.ids.get(name).copied().ok_or_else(|| ReplayError::UnknownObject {
            frame: self.frame,
            name: name.to_string(),
        })
    }

    fn name_of(&self, id: ObjectId) -> Option<String> {
        self.ids
            .iter()
            .find(|(_, known)| **known == id)
            .map(|(name, _)| name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palmgrab_core::{AxisLock, Gesture, HandFrame, HandRig, POS_LOCK_Y, Quat};
    use crate::session::RecordedHands;

    const EPSILON: f32 = 1e-5;

    fn right_hand(gesture: Gesture, position: Vec3) -> RecordedHands {
        RecordedHands {
            left: None,
            right: Some(HandFrame::new(
                gesture,
                HandRig {
                    palm: Pose::from_position(position),
                    grab_point: Pose::from_position(position),
                    index_tip: position + Vec3::new(0.01, 0.0, 0.0),
                    thumb_tip: position - Vec3::new(0.01, 0.0, 0.0),
                },
            )),
        }
    }

    fn frame(hands: RecordedHands) -> SessionFrame {
        SessionFrame {
            dt: 1.0 / 60.0,
            hands,
            enqueue: Vec::new(),
            withdraw: Vec::new(),
            destroy: Vec::new(),
        }
    }

    fn throw_session(axis_lock: AxisLock) -> Session {
        let mut objects = BTreeMap::new();
        objects.insert(
            "ball".to_string(),
            GrabbableObject::new(Pose::from_position(Vec3::new(0.0, 0.0, 0.2)), Handedness::Right)
                .with_axis_lock(axis_lock)
                .with_throw_power(3.0),
        );

        let step = Vec3::new(0.01, 0.01, 0.0);
        let mut frames = Vec::new();
        let mut first = frame(right_hand(Gesture::Neutral, Vec3::ZERO));
        first.enqueue.push("ball".to_string());
        frames.push(first);
        frames.push(frame(right_hand(Gesture::Pinch, Vec3::ZERO)));
        for tick in 1..=3 {
            frames.push(frame(right_hand(Gesture::Pinch, step * tick as f32)));
        }
        frames.push(frame(right_hand(Gesture::Palm, step * 3.0)));

        Session {
            config: Default::default(),
            objects,
            frames,
        }
    }

    #[test]
    fn test_throw_session() {
        let report = Replay::run(&throw_session(AxisLock::NONE)).unwrap();

        assert_eq!(report.frames, 6);
        assert_eq!(report.releases.len(), 1);
        let release = &report.releases[0];
        assert_eq!(release.frame, 5);
        assert_eq!(release.object, "ball");
        assert!(release.velocity.abs_diff_eq(Vec3::new(0.0075, 0.0075, 0.0), EPSILON));

        let ball = &report.objects["ball"];
        assert!(ball.pose.position.abs_diff_eq(Vec3::new(0.03, 0.03, 0.2), EPSILON));
        assert_eq!(ball.state, InteractionState::Selected);
        assert!(ball.throw_velocity.unwrap().abs_diff_eq(Vec3::new(0.0225, 0.0225, 0.0), EPSILON));
        assert_eq!(report.last_grabbed.as_deref(), Some("ball"));
        assert_eq!(report.selected.as_deref(), Some("ball"));
        assert!(!report.grabbing);
    }

    #[test]
    fn test_locked_axis_in_session() {
        let report = Replay::run(&throw_session(AxisLock::NONE.with_lock(POS_LOCK_Y))).unwrap();
        let ball = &report.objects["ball"];
        assert!(ball.pose.position.abs_diff_eq(Vec3::new(0.03, 0.0, 0.2), EPSILON));
    }

    #[test]
    fn test_destroy_mid_grab() {
        let mut session = throw_session(AxisLock::NONE);
        session.frames[3].destroy.push("ball".to_string());

        let report = Replay::run(&session).unwrap();
        assert!(report.objects.is_empty());
        assert_eq!(report.releases.len(), 1);
        assert_eq!(report.releases[0].frame, 3);
        assert_eq!(report.releases[0].object, "ball");
        assert!(report.last_grabbed.is_none());
        assert!(report.selected.is_none());
        assert!(!report.grabbing);
    }

    #[test]
    fn test_withdraw_mid_grab_releases() {
        let mut session = throw_session(AxisLock::NONE);
        session.frames[3].withdraw.push("ball".to_string());

        let mut replay = Replay::new(&session);
        for frame in &session.frames[..4] {
            replay.step(frame).unwrap();
        }
        let report = replay.report();
        assert_eq!(report.releases.len(), 1);
        assert_eq!(report.releases[0].frame, 3);
        assert!(report.selected.is_none());
        assert_eq!(replay.object("ball").unwrap().state, InteractionState::Normal);
    }

    #[test]
    fn test_unknown_name_in_step() {
        let session = throw_session(AxisLock::NONE);
        let mut replay = Replay::new(&session);
        let mut bad = frame(RecordedHands::default());
        bad.enqueue.push("nope".to_string());
        assert!(matches!(replay.step(&bad), Err(ReplayError::UnknownObject { .. })));
    }

    #[test]
    fn test_bundled_sample_session() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../sessions/pinch_throw.json");
        let session = Session::load(&path).unwrap();
        let report = Replay::run(&session).unwrap();

        assert_eq!(report.releases.len(), 1);
        assert_eq!(report.releases[0].object, "mug");
        assert_eq!(report.releases[0].frame, 7);
        assert!((report.releases[0].velocity.x - 0.01875).abs() < 1e-4);
        assert!(report.selected.is_none());
        assert_eq!(report.objects["mug"].state, InteractionState::Normal);
        assert_eq!(report.objects["lever"].state, InteractionState::Normal);
    }

    #[test]
    fn test_run_rejects_unvalidated_session() {
        let mut session = throw_session(AxisLock::NONE);
        if let Some(right) = session.frames[2].hands.right.as_mut() {
            right.rig.grab_point.rotation = Quat::from_xyzw(0.5, 0.0, 0.0, 0.5);
        }
        assert!(matches!(
            Replay::run(&session),
            Err(ReplayError::InvalidFrame { frame: 2, .. })
        ));
    }
}
