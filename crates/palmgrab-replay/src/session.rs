//! Recorded hand-tracking sessions.

use crate::error::{ReplayError, ReplayResult};
use palmgrab_core::{GrabConfig, GrabbableObject, HandFrame, HandRig, HandTracker, Handedness};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Frame duration used when a recorded frame omits `dt`.
pub const DEFAULT_FRAME_DT: f32 = 1.0 / 60.0;

/// A recorded session: the scene's grabbables and one entry per frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Controller settings; defaults when omitted.
    #[serde(default)]
    pub config: GrabConfig,
    /// Grabbables keyed by a session-local name.
    pub objects: BTreeMap<String, GrabbableObject>,
    /// Frames in playback order.
    pub frames: Vec<SessionFrame>,
}

/// Hand samples recorded for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedHands {
    #[serde(default)]
    pub left: Option<HandFrame>,
    #[serde(default)]
    pub right: Option<HandFrame>,
}

impl HandTracker for RecordedHands {
    fn sample(&mut self, hand: Handedness) -> Option<HandFrame> {
        match hand {
            Handedness::Left => self.left,
            Handedness::Right => self.right,
        }
    }
}

/// One recorded frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFrame {
    /// Frame duration in seconds.
    #[serde(default = "default_dt")]
    pub dt: f32,
    #[serde(flatten)]
    pub hands: RecordedHands,
    /// Objects that became eligible this frame.
    #[serde(default)]
    pub enqueue: Vec<String>,
    /// Objects that stopped being eligible this frame.
    #[serde(default)]
    pub withdraw: Vec<String>,
    /// Objects destroyed this frame.
    #[serde(default)]
    pub destroy: Vec<String>,
}

fn default_dt() -> f32 {
    DEFAULT_FRAME_DT
}

impl Session {
    /// Parse a session from JSON and validate it.
    pub fn from_json(json: &str) -> ReplayResult<Self> {
        let session: Self = serde_json::from_str(json)?;
        session.validate()?;
        Ok(session)
    }

    /// Load a session file.
    pub fn load(path: &Path) -> ReplayResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check the config, the recorded poses and that every frame names
    /// known objects.
    pub fn validate(&self) -> ReplayResult<()> {
        self.config.validate()?;
        for (name, object) in &self.objects {
            if !object.pose.is_valid() {
                return Err(ReplayError::InvalidObject {
                    name: name.clone(),
                    reason: format!("pose needs a finite position and unit rotation, got {:?}", object.pose),
                });
            }
        }
        for (index, frame) in self.frames.iter().enumerate() {
            if !frame.dt.is_finite() || frame.dt < 0.0 {
                return Err(ReplayError::InvalidFrame {
                    frame: index,
                    reason: format!("dt must be a non-negative number, got {}", frame.dt),
                });
            }
            let samples = [
                (Handedness::Left, &frame.hands.left),
                (Handedness::Right, &frame.hands.right),
            ];
            for (hand, sample) in samples {
                if let Some(sample) = sample {
                    check_rig(&sample.rig).map_err(|joint| ReplayError::InvalidFrame {
                        frame: index,
                        reason: format!("{:?} hand {} is non-finite or has a non-unit rotation", hand, joint),
                    })?;
                }
            }
            let names = frame.enqueue.iter().chain(&frame.withdraw).chain(&frame.destroy);
            for name in names {
                if !self.objects.contains_key(name) {
                    return Err(ReplayError::UnknownObject {
                        frame: index,
                        name: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Name of the first malformed joint in `rig`, if any.
fn check_rig(rig: &HandRig) -> Result<(), &'static str> {
    if !rig.palm.is_valid() {
        return Err("palm");
    }
    if !rig.grab_point.is_valid() {
        return Err("grab_point");
    }
    if !rig.index_tip.is_finite() {
        return Err("index_tip");
    }
    if !rig.thumb_tip.is_finite() {
        return Err("thumb_tip");
    }
    Ok(())
}
