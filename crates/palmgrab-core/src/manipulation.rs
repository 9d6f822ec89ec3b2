//! Per-grab manipulation math and release velocity smoothing.

use crate::axis_lock::AxisLock;
use crate::hand::{HandRig, Handedness};
use crate::pose::{unit_rotation, Pose};
use glam::{Quat, Vec3};

/// Transient data for the grab in progress.
///
/// The controller keeps a single instance and overwrites it on every grab.
#[derive(Debug, Clone)]
pub struct ManipulationState {
    /// Object position minus grab-point position, re-rotated each frame.
    pub delta_offset: Vec3,
    /// Inverse of the grab-point rotation seen on the previous frame.
    pub inverse_reference_rotation: Quat,
    /// Hand whose joints drive the grab.
    hand: Handedness,
    /// Smoothed fingertip velocity, metres per frame.
    release_velocity: Vec3,
    /// Fingertip midpoint from the previous sample.
    last_tip_center: Vec3,
    /// No sample taken since the grab started.
    first_sample: bool,
}

impl Default for ManipulationState {
    fn default() -> Self {
        Self {
            delta_offset: Vec3::ZERO,
            inverse_reference_rotation: Quat::IDENTITY,
            hand: Handedness::Right,
            release_velocity: Vec3::ZERO,
            last_tip_center: Vec3::ZERO,
            first_sample: true,
        }
    }
}

impl ManipulationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor a new grab on `rig` without snapping the object to the hand.
    pub fn begin(&mut self, hand: Handedness, rig: &HandRig, object_position: Vec3) {
        self.hand = hand;
        self.reset_velocity();
        self.update_reference(rig);
        self.delta_offset = object_position - rig.grab_point.position;
    }

    /// Hand driving the current grab.
    pub fn hand(&self) -> Handedness {
        self.hand
    }

    /// Grab-point rotation since the last reference snapshot.
    pub fn frame_rotation(&self, rig: &HandRig) -> Quat {
        unit_rotation(rig.grab_point.rotation) * self.inverse_reference_rotation
    }

    /// Turn the stored offset with the hand.
    pub fn rotate_offset(&mut self, rotation: Quat) {
        self.delta_offset = rotation * self.delta_offset;
    }

    /// Where the object should be for the current grab-point.
    pub fn target_position(&self, rig: &HandRig) -> Vec3 {
        rig.grab_point.position + self.delta_offset
    }

    /// Snapshot the grab-point rotation for the next frame's delta.
    ///
    /// Tracker rotations are rescaled to unit length first; inverting a
    /// non-unit quaternion would turn a still hand into a shrinking offset.
    pub fn update_reference(&mut self, rig: &HandRig) {
        self.inverse_reference_rotation = unit_rotation(rig.grab_point.rotation).inverse();
    }

    /// Compute the object's pose for this frame.
    ///
    /// Must run once per frame; it consumes the rotation delta and refreshes
    /// the reference snapshot after the motion is applied.
    pub fn step(&mut self, rig: &HandRig, object: Pose, lock: AxisLock) -> Pose {
        let object = object.normalized();
        let rotation = self.frame_rotation(rig);
        self.rotate_offset(rotation);

        let delta = self.target_position(rig) - object.position;
        let delta = constrain_delta(delta, &object, lock);

        let next = Pose {
            position: object.position + delta,
            rotation: (rotation * object.rotation).normalize(),
        };
        self.update_reference(rig);
        next
    }

    /// Forget previous velocity samples.
    pub fn reset_velocity(&mut self) {
        self.release_velocity = Vec3::ZERO;
        self.last_tip_center = Vec3::ZERO;
        self.first_sample = true;
    }

    /// Feed the fingertip midpoint for this frame and return the smoothed
    /// velocity.
    ///
    /// The first sample after [`ManipulationState::begin`] only records the
    /// midpoint. Later samples average the frame displacement with the
    /// previous estimate, which damps tracking jitter.
    pub fn sample_release_velocity(&mut self, rig: &HandRig) -> Vec3 {
        let center = rig.tip_center();
        if self.first_sample {
            self.first_sample = false;
        } else {
            self.release_velocity = ((center - self.last_tip_center) + self.release_velocity) / 2.0;
        }
        self.last_tip_center = center;
        self.release_velocity
    }

    /// Smoothed velocity to report on release.
    pub fn release_velocity(&self) -> Vec3 {
        self.release_velocity
    }
}

/// Zero the components of a world-space `delta` along `object`'s locked
/// local axes.
pub fn constrain_delta(delta: Vec3, object: &Pose, lock: AxisLock) -> Vec3 {
    if lock.is_unconstrained() {
        return delta;
    }
    let local = object.inverse_transform_direction(delta) * lock.position_lock_vector();
    object.transform_direction(local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis_lock::{POS_LOCK_X, POS_LOCK_Y};
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    fn rig_at(grab_point: Pose) -> HandRig {
        HandRig {
            palm: grab_point,
            grab_point,
            index_tip: grab_point.position + Vec3::new(0.01, 0.0, 0.0),
            thumb_tip: grab_point.position - Vec3::new(0.01, 0.0, 0.0),
        }
    }

    #[test]
    fn test_begin_anchors_offset() {
        let rig = rig_at(Pose::new(Vec3::new(0.1, 1.2, 0.3), Quat::from_rotation_y(0.4)));
        let object = Vec3::new(0.15, 1.1, 0.5);
        let mut state = ManipulationState::new();
        state.begin(Handedness::Left, &rig, object);

        assert_eq!(state.hand(), Handedness::Left);
        assert!((rig.grab_point.position + state.delta_offset).abs_diff_eq(object, EPSILON));
        assert!(state.frame_rotation(&rig).abs_diff_eq(Quat::IDENTITY, EPSILON));
    }

    #[test]
    fn test_translation_follows_hand() {
        let start = rig_at(Pose::from_position(Vec3::ZERO));
        let object = Pose::from_position(Vec3::new(0.0, 0.0, 0.2));
        let mut state = ManipulationState::new();
        state.begin(Handedness::Right, &start, object.position);

        let moved = start.translated(Vec3::new(0.05, -0.02, 0.01));
        let next = state.step(&moved, object, AxisLock::NONE);
        assert!(next.position.abs_diff_eq(Vec3::new(0.05, -0.02, 0.21), EPSILON));
        assert!(next.rotation.abs_diff_eq(Quat::IDENTITY, EPSILON));
    }

    #[test]
    fn test_rotation_orbits_object_around_grab_point() {
        let start = rig_at(Pose::from_position(Vec3::ZERO));
        let object = Pose::from_position(Vec3::new(0.0, 0.0, -0.3));
        let mut state = ManipulationState::new();
        state.begin(Handedness::Right, &start, object.position);

        let turn = Quat::from_rotation_y(FRAC_PI_2);
        let turned = rig_at(Pose::new(Vec3::ZERO, turn));
        let next = state.step(&turned, object, AxisLock::NONE);

        assert!(next.position.abs_diff_eq(turn * Vec3::new(0.0, 0.0, -0.3), EPSILON));
        assert!(next.rotation.abs_diff_eq(turn, EPSILON));

        // Holding still afterwards applies no further rotation.
        let again = state.step(&turned, next, AxisLock::NONE);
        assert!(again.position.abs_diff_eq(next.position, EPSILON));
        assert!(again.rotation.abs_diff_eq(next.rotation, EPSILON));
    }

    #[test]
    fn test_rotation_compounds_over_frames() {
        let start = rig_at(Pose::from_position(Vec3::ZERO));
        let object = Pose::from_position(Vec3::new(0.2, 0.0, 0.0));
        let mut state = ManipulationState::new();
        state.begin(Handedness::Right, &start, object.position);

        let mut pose = object;
        for step in 1..=4 {
            let rig = rig_at(Pose::new(Vec3::ZERO, Quat::from_rotation_z(0.1 * step as f32)));
            pose = state.step(&rig, pose, AxisLock::NONE);
        }
        assert!(pose.rotation.abs_diff_eq(Quat::from_rotation_z(0.4), EPSILON));
        assert!(pose.position.abs_diff_eq(Quat::from_rotation_z(0.4) * Vec3::new(0.2, 0.0, 0.0), EPSILON));
    }

    #[test]
    fn test_unconstrained_lock_moves_freely() {
        let object = Pose::new(Vec3::ZERO, Quat::from_rotation_x(0.3));
        let delta = Vec3::new(0.01, 0.02, 0.03);
        assert_eq!(constrain_delta(delta, &object, AxisLock::NONE), delta);
    }

    #[test]
    fn test_locked_local_axis_blocks_motion() {
        // Object turned 90° about Y: local X points along world -Z.
        let object = Pose::new(Vec3::ZERO, Quat::from_rotation_y(FRAC_PI_2));
        let lock = AxisLock::NONE.with_lock(POS_LOCK_X);
        let delta = Vec3::new(0.02, 0.03, 0.04);

        let constrained = constrain_delta(delta, &object, lock);
        let local = object.inverse_transform_direction(constrained);
        assert!(local.x.abs() < EPSILON);
        let expected = object.inverse_transform_direction(delta);
        assert!((local.y - expected.y).abs() < EPSILON);
        assert!((local.z - expected.z).abs() < EPSILON);
    }

    #[test]
    fn test_step_respects_lock() {
        let start = rig_at(Pose::from_position(Vec3::ZERO));
        let object = Pose::from_position(Vec3::new(0.0, 0.0, 0.1));
        let mut state = ManipulationState::new();
        state.begin(Handedness::Right, &start, object.position);

        let lock = AxisLock::NONE.with_lock(POS_LOCK_Y);
        let next = state.step(&start.translated(Vec3::new(0.1, 0.1, 0.1)), object, lock);
        assert!(next.position.abs_diff_eq(Vec3::new(0.1, 0.0, 0.2), EPSILON));
    }

    #[test]
    fn test_first_velocity_sample_is_zero() {
        let mut state = ManipulationState::new();
        let rig = rig_at(Pose::from_position(Vec3::new(1.0, 1.0, 1.0)));
        state.begin(Handedness::Right, &rig, Vec3::ZERO);
        assert_eq!(state.sample_release_velocity(&rig), Vec3::ZERO);
    }

    #[test]
    fn test_velocity_converges_to_constant_motion() {
        let step = Vec3::new(0.01, 0.0, -0.005);
        let mut rig = rig_at(Pose::from_position(Vec3::ZERO));
        let mut state = ManipulationState::new();
        state.begin(Handedness::Right, &rig, Vec3::ZERO);

        state.sample_release_velocity(&rig);
        for _ in 0..12 {
            rig = rig.translated(step);
            state.sample_release_velocity(&rig);
        }
        assert!(state.release_velocity().abs_diff_eq(step, 1e-5));
    }

    #[test]
    fn test_velocity_smoothing_halves_each_frame() {
        let step = Vec3::new(0.0, 0.02, 0.0);
        let mut rig = rig_at(Pose::from_position(Vec3::ZERO));
        let mut state = ManipulationState::new();
        state.begin(Handedness::Right, &rig, Vec3::ZERO);
        state.sample_release_velocity(&rig);

        rig = rig.translated(step);
        assert!(state.sample_release_velocity(&rig).abs_diff_eq(step * 0.5, EPSILON));
        rig = rig.translated(step);
        assert!(state.sample_release_velocity(&rig).abs_diff_eq(step * 0.75, EPSILON));
    }

    #[test]
    fn test_begin_resets_velocity() {
        let mut rig = rig_at(Pose::from_position(Vec3::ZERO));
        let mut state = ManipulationState::new();
        state.begin(Handedness::Right, &rig, Vec3::ZERO);
        state.sample_release_velocity(&rig);
        rig = rig.translated(Vec3::X * 0.1);
        state.sample_release_velocity(&rig);
        assert!(state.release_velocity().length() > 0.0);

        state.begin(Handedness::Left, &rig, Vec3::ZERO);
        assert_eq!(state.release_velocity(), Vec3::ZERO);
        rig = rig.translated(Vec3::X * 0.1);
        assert_eq!(state.sample_release_velocity(&rig), Vec3::ZERO);
    }

    #[test]
    fn test_non_unit_grab_rotation_holds_still() {
        let skewed = Pose::new(Vec3::ZERO, Quat::from_xyzw(0.5, 0.0, 0.0, 0.5));
        let rig = rig_at(skewed);
        let mut object = Pose::from_position(Vec3::new(0.0, 0.0, 0.3));
        let mut state = ManipulationState::new();
        state.begin(Handedness::Right, &rig, object.position);

        for _ in 0..4 {
            object = state.step(&rig, object, AxisLock::NONE);
        }
        assert!(object.position.abs_diff_eq(Vec3::new(0.0, 0.0, 0.3), EPSILON));
        assert!(object.rotation.abs_diff_eq(Quat::IDENTITY, EPSILON));
    }

    #[test]
    fn test_non_unit_object_rotation_is_normalized() {
        let rig = rig_at(Pose::IDENTITY);
        let object = Pose::new(Vec3::new(0.0, 0.0, 0.3), Quat::from_xyzw(0.0, 0.5, 0.0, 0.5));
        let mut state = ManipulationState::new();
        state.begin(Handedness::Right, &rig, object.position);

        let next = state.step(&rig, object, AxisLock::NONE);
        assert!(next.rotation.is_normalized());
        assert!(next.position.abs_diff_eq(object.position, EPSILON));
    }
}
