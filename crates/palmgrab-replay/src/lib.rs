//! PalmGrab Replay
//!
//! Plays recorded hand-tracking sessions through the grab controller, for
//! regression checks and tuning without a headset.

mod error;
mod replay;
mod session;

pub use error::{ReplayError, ReplayResult};
pub use replay::{ObjectReport, ReleaseRecord, Replay, ReplayReport};
pub use session::{DEFAULT_FRAME_DT, RecordedHands, Session, SessionFrame};
