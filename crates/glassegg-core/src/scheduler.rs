#![forbid(unsafe_code)]

//! Frame and removal scheduling, per panel.
//!
//! The manager never touches a display clock directly. It asks a
//! [`FrameScheduler`] for "one more frame for this panel" or "remove this
//! panel after `d`", and the host calls back into
//! [`OverlayManager::on_frame`](crate::manager::OverlayManager::on_frame) /
//! [`OverlayManager::finish_exit`](crate::manager::OverlayManager::finish_exit)
//! when they fire.
//!
//! # Invariants
//!
//! 1. At most one pending frame and one pending removal per panel.
//!    Requesting again replaces the pending one.
//! 2. Cancelling something that is not pending is a no-op.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::panel::PanelId;

pub trait FrameScheduler {
    /// Ask for one stepper invocation for `panel` on the next refresh.
    fn request_frame(&mut self, panel: PanelId);

    fn cancel_frame(&mut self, panel: PanelId);

    /// Ask for `panel` to be finalized once `after` has elapsed.
    fn schedule_removal(&mut self, panel: PanelId, after: Duration);

    fn cancel_removal(&mut self, panel: PanelId);
}

/// Deterministic, host-free scheduler.
///
/// Frames fire only when drained with [`take_due_frames`](Self::take_due_frames);
/// removals fire when the internal clock is moved past their deadline with
/// [`advance`](Self::advance).
#[derive(Debug, Default, Clone)]
pub struct ManualScheduler {
    now: Duration,
    frames: BTreeSet<PanelId>,
    removals: Vec<(PanelId, Duration)>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_frame_pending(&self, panel: PanelId) -> bool {
        self.frames.contains(&panel)
    }

    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_removal_pending(&self, panel: PanelId) -> bool {
        self.removals.iter().any(|(id, _)| *id == panel)
    }

    /// Drain every pending frame, in panel-id order.
    pub fn take_due_frames(&mut self) -> Vec<PanelId> {
        std::mem::take(&mut self.frames).into_iter().collect()
    }

    /// Move the clock forward and return removals whose deadline passed,
    /// earliest first.
    pub fn advance(&mut self, dt: Duration) -> Vec<PanelId> {
        self.now = self.now.saturating_add(dt);
        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.removals.drain(..).partition(|(_, at)| *at <= now);
        self.removals = pending;
        due.sort_by_key(|(id, at)| (*at, *id));
        due.into_iter().map(|(id, _)| id).collect()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self, panel: PanelId) {
        self.frames.insert(panel);
    }

    fn cancel_frame(&mut self, panel: PanelId) {
        self.frames.remove(&panel);
    }

    fn schedule_removal(&mut self, panel: PanelId, after: Duration) {
        self.cancel_removal(panel);
        self.removals.push((panel, self.now.saturating_add(after)));
    }

    fn cancel_removal(&mut self, panel: PanelId) {
        self.removals.retain(|(id, _)| *id != panel);
    }
}
