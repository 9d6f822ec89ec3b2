//! Buffered gesture labels reported by the hand classifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gesture label for one hand, as buffered by the external classifier.
///
/// Unknown labels parse as [`Gesture::Neutral`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gesture {
    /// Thumb and index fingertips together.
    Pinch,
    /// All fingers curled.
    Fist,
    /// Open hand.
    Palm,
    /// Index finger extended.
    Point,
    /// Thumb up, other fingers curled.
    ThumbsUp,
    /// Anything the grab system does not care about.
    #[default]
    Neutral,
}

impl Gesture {
    /// Parse a classifier label.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "pinch" => Self::Pinch,
            "fist" => Self::Fist,
            "palm" => Self::Palm,
            "point" => Self::Point,
            "thumbs_up" | "thumbsup" => Self::ThumbsUp,
            _ => Self::Neutral,
        }
    }

    /// Classifier label for this gesture.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pinch => "pinch",
            Self::Fist => "fist",
            Self::Palm => "palm",
            Self::Point => "point",
            Self::ThumbsUp => "thumbs_up",
            Self::Neutral => "neutral",
        }
    }

    /// Whether this gesture starts a grab.
    pub fn is_grab(&self) -> bool {
        matches!(self, Self::Pinch | Self::Fist)
    }

    /// Whether this gesture ends a grab in progress.
    ///
    /// An open palm always releases. Otherwise the fingertips must be more
    /// than `release_distance` apart and the hand must not still read as a
    /// grab gesture, so a fist with spread fingertips keeps holding.
    pub fn is_release(&self, tip_distance: f32, release_distance: f32) -> bool {
        *self == Self::Palm || (tip_distance > release_distance && !self.is_grab())
    }
}

impl From<&str> for Gesture {
    fn from(label: &str) -> Self {
        Self::from_label(label)
    }
}

impl From<String> for Gesture {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<Gesture> for String {
    fn from(gesture: Gesture) -> Self {
        gesture.as_str().to_string()
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
