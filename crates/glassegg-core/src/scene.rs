#![forbid(unsafe_code)]

//! Presentation commands emitted by the manager.
//!
//! The manager never owns visual nodes. Each operation queues zero or more
//! [`SceneCommand`]s that the host drains with
//! [`OverlayManager::take_commands`](crate::manager::OverlayManager::take_commands)
//! and applies in order.

use std::time::Duration;

use crate::geometry::Transform;
use crate::panel::PanelId;

/// Pointer affordance shown over a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Grab,
    Grabbing,
}

impl Cursor {
    /// CSS `cursor` value.
    #[must_use]
    pub const fn css(self) -> &'static str {
        match self {
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
        }
    }
}

/// Everything a host needs to build a panel's visual node.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub id: PanelId,
    pub size: f64,
    pub transform: Transform,
    pub image_src: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    /// Create and attach a node; it starts with [`Cursor::Grab`].
    Insert(PanelView),
    /// Detach the node and release its listeners.
    Remove(PanelId),
    SetTransform(PanelId, Transform),
    SetCursor(PanelId, Cursor),
    /// Start the shrink-and-rotate exit transition.
    BeginExit { id: PanelId, duration: Duration },
}

impl SceneCommand {
    /// Panel the command targets.
    #[must_use]
    pub fn panel(&self) -> PanelId {
        match self {
            Self::Insert(view) => view.id,
            Self::Remove(id)
            | Self::SetTransform(id, _)
            | Self::SetCursor(id, _)
            | Self::BeginExit { id, .. } => *id,
        }
    }
}
