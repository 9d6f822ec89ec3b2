//! Per-object position axis locks.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Lock flag for the local X axis.
pub const POS_LOCK_X: u32 = 1 << 0;
/// Lock flag for the local Y axis.
pub const POS_LOCK_Y: u32 = 1 << 1;
/// Lock flag for the local Z axis.
pub const POS_LOCK_Z: u32 = 1 << 2;

const ALL_LOCKS: u32 = POS_LOCK_X | POS_LOCK_Y | POS_LOCK_Z;

/// Which local position axes of a grabbable stay frozen while it is held.
///
/// Stored packed in an integer so it serializes as a single number.
/// Rotation is never locked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct AxisLock {
    raw: u32,
}

impl AxisLock {
    /// No axis locked.
    pub const NONE: Self = Self { raw: 0 };

    /// Build from persisted lock bits. Unknown bits are dropped.
    pub fn from_raw(raw: u32) -> Self {
        Self { raw: raw & ALL_LOCKS }
    }

    /// Packed lock bits, suitable for persisting.
    pub fn raw(&self) -> u32 {
        self.raw
    }

    /// Check whether every axis in `flag` is locked.
    pub fn is_locked(&self, flag: u32) -> bool {
        let flag = flag & ALL_LOCKS;
        flag != 0 && self.raw & flag == flag
    }

    /// Lock or unlock the axes in `flag`.
    pub fn set_lock(&mut self, flag: u32, locked: bool) {
        let flag = flag & ALL_LOCKS;
        if locked {
            self.raw |= flag;
        } else {
            self.raw &= !flag;
        }
    }

    /// Builder form of [`AxisLock::set_lock`].
    pub fn with_lock(mut self, flag: u32) -> Self {
        self.set_lock(flag, true);
        self
    }

    /// True when no axis is locked, so the lock transform can be skipped.
    pub fn is_unconstrained(&self) -> bool {
        self.raw == 0
    }

    /// Component-wise scale: 0 for a locked axis, 1 for a free one.
    pub fn position_lock_vector(&self) -> Vec3 {
        let axis = |flag| if self.is_locked(flag) { 0.0 } else { 1.0 };
        Vec3::new(axis(POS_LOCK_X), axis(POS_LOCK_Y), axis(POS_LOCK_Z))
    }
}

impl From<u32> for AxisLock {
    fn from(raw: u32) -> Self {
        Self::from_raw(raw)
    }
}

impl From<AxisLock> for u32 {
    fn from(lock: AxisLock) -> Self {
        lock.raw
    }
}
