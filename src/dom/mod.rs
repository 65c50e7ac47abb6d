//! In-memory model of the booking page.
//!
//! The resolver never talks to a browser directly: it reads and mutates a
//! [`Document`] that mirrors the page markup, and every simulated interaction
//! is recorded as a [`DomEvent`].

pub mod document;
pub mod events;
pub mod geometry;

use serde::{Deserialize, Serialize};

pub use document::Document;
pub use events::{DomEvent, EventKind};
pub use geometry::BoundingBox;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
}
