use serde::{Deserialize, Serialize};

use super::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    MouseDown,
    MouseUp,
    Click,
    Input,
    Change,
    Blur,
}

impl EventKind {
    /// Whether the event propagates to ancestors, matching browser defaults.
    pub fn bubbles(self) -> bool {
        !matches!(self, EventKind::Blur)
    }
}

/// One event dispatched against the page, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomEvent {
    pub target: NodeId,
    pub kind: EventKind,
    pub bubbles: bool,
}
