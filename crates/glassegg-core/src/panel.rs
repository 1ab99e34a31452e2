#![forbid(unsafe_code)]

//! A single glass panel and its interaction phase.

use std::fmt;

use crate::geometry::{Bounds, Transform, Vec2, Viewport};
use crate::inertia::{InertiaParams, Kinematics, StepOutcome};

/// Identifier assigned at creation; never reused by one manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PanelId(pub u64);

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panel#{}", self.0)
    }
}

/// Where a panel is in its interaction lifecycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelPhase {
    /// Not held. Settling under inertia if still moving, otherwise at rest.
    Idle,
    /// Held by the pointer; inertia is suspended.
    Dragging { last_pointer: Vec2 },
    /// Playing its exit transition; ignores further input.
    Exiting,
}

#[derive(Debug, Clone)]
pub struct Panel {
    id: PanelId,
    size: f64,
    kinematics: Kinematics,
    phase: PanelPhase,
}

impl Panel {
    #[must_use]
    pub fn new(id: PanelId, size: f64, position: Vec2) -> Self {
        Self {
            id,
            size,
            kinematics: Kinematics::at(position),
            phase: PanelPhase::Idle,
        }
    }

    #[must_use]
    pub fn id(&self) -> PanelId {
        self.id
    }

    /// Edge length in pixels; panels are square.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.size
    }

    #[must_use]
    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    #[must_use]
    pub fn phase(&self) -> PanelPhase {
        self.phase
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, PanelPhase::Dragging { .. })
    }

    #[must_use]
    pub fn is_exiting(&self) -> bool {
        self.phase == PanelPhase::Exiting
    }

    #[must_use]
    pub fn transform(&self) -> Transform {
        self.kinematics.transform()
    }

    pub(crate) fn grab(&mut self, pointer: Vec2) {
        self.phase = PanelPhase::Dragging {
            last_pointer: pointer,
        };
    }

    /// Apply a pointer move. Returns `false` if the panel is not held.
    pub(crate) fn drag_to(&mut self, pointer: Vec2, params: &InertiaParams) -> bool {
        let PanelPhase::Dragging { last_pointer } = self.phase else {
            return false;
        };
        self.kinematics.drag_by(pointer - last_pointer, params);
        self.phase = PanelPhase::Dragging {
            last_pointer: pointer,
        };
        true
    }

    pub(crate) fn release(&mut self) {
        if self.is_dragging() {
            self.phase = PanelPhase::Idle;
        }
    }

    pub(crate) fn begin_exit(&mut self) {
        self.phase = PanelPhase::Exiting;
    }

    pub(crate) fn step(&mut self, viewport: Viewport, params: &InertiaParams) -> StepOutcome {
        let bounds = Bounds::for_panel(viewport, self.size);
        self.kinematics.step(bounds, params)
    }
}
