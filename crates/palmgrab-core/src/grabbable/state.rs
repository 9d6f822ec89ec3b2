//! Interaction state of a grabbable.

use super::GrabEvent;
use serde::{Deserialize, Serialize};

/// How the user is currently interacting with an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionState {
    /// Not selected.
    #[default]
    Normal,
    /// Selected and waiting for a grab gesture.
    Selected,
    /// Held by a hand.
    Grabbed,
}

impl InteractionState {
    /// State after receiving `event`.
    pub fn apply(self, event: &GrabEvent) -> Self {
        match event {
            GrabEvent::Selected => Self::Selected,
            GrabEvent::Deselected => Self::Normal,
            GrabEvent::GrabStarted => Self::Grabbed,
            // Releasing keeps the selection until the object withdraws.
            GrabEvent::GrabStopped { .. } => Self::Selected,
        }
    }

    /// Check if the object is selected (held objects count as selected).
    pub fn is_selected(&self) -> bool {
        matches!(self, Self::Selected | Self::Grabbed)
    }

    /// Check if the object is held.
    pub fn is_grabbed(&self) -> bool {
        matches!(self, Self::Grabbed)
    }
}
