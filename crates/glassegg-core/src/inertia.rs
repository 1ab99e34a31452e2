#![forbid(unsafe_code)]

//! Drag and inertia kinematics for a single panel.
//!
//! A minimal rigid-body-like model: position and rotation are driven
//! directly by pointer deltas while dragging, then released into a damped
//! free flight that bounces off the viewport edges.
//!
//! # Frame step
//!
//! One [`Kinematics::step`] is one display refresh (dt is implicitly one
//! frame):
//!
//! 1. Damp linear and angular velocity by [`InertiaParams::damping`].
//! 2. Euler-integrate position and rotation.
//! 3. While still moving on either axis, re-derive angular velocity as
//!    `spin_coupling * vx`. Rotation stays coupled to horizontal motion;
//!    this is not torque physics.
//! 4. Per axis, if the position left `[0, max]`, clamp it to the nearer
//!    bound and multiply that axis' velocity and the angular velocity by
//!    [`InertiaParams::bounce`].
//! 5. Report whether any speed is still above the rest threshold.
//!
//! # Invariants
//!
//! 1. After `step`, each coordinate lies in `[0, max]` for its axis whenever
//!    `max >= 0`.
//! 2. With no wall contact, linear velocity after `n` steps is `v0 * damping^n`.
//! 3. Rotation accumulates without wraparound.
//! 4. Speeds are never clamped; only damping bounds them.
//!
//! # Failure Modes
//!
//! - Viewport smaller than the panel (`max < 0`): the position alternates
//!   between `0` and `max` while the velocity decays. Cosmetic only.

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Transform, Vec2};

/// Tunables for the drag/inertia model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InertiaParams {
    /// Per-frame velocity multiplier (exponential decay toward rest).
    pub damping: f64,
    /// Velocity multiplier on wall contact. Negative reflects.
    pub bounce: f64,
    /// Angular velocity per pixel of horizontal motion.
    pub spin_coupling: f64,
    /// Speeds at or below this count as stopped.
    pub rest_threshold: f64,
}

impl Default for InertiaParams {
    fn default() -> Self {
        Self {
            damping: 0.95,
            bounce: -0.7,
            spin_coupling: 0.2,
            rest_threshold: 0.1,
        }
    }
}

/// Result of one frame step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Still above the rest threshold; schedule another frame.
    Moving,
    /// Settled; do not reschedule until the next interaction.
    AtRest,
}

/// Position, rotation, and their velocities.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kinematics {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Degrees.
    pub rotation: f64,
    /// Degrees per frame.
    pub angular_velocity: f64,
}

impl Kinematics {
    #[must_use]
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn transform(&self) -> Transform {
        Transform {
            x: self.position.x,
            y: self.position.y,
            rotation_deg: self.rotation,
        }
    }

    /// Apply one pointer delta while held.
    ///
    /// The released velocity is exactly the last delta, not a smoothed
    /// average.
    pub fn drag_by(&mut self, delta: Vec2, params: &InertiaParams) {
        self.position.x += delta.x;
        self.position.y += delta.y;
        self.velocity = delta;
        self.angular_velocity = delta.x * params.spin_coupling;
        self.rotation += self.angular_velocity;
    }

    /// Whether any speed is above the rest threshold.
    #[must_use]
    pub fn is_moving(&self, params: &InertiaParams) -> bool {
        self.is_translating(params) || self.angular_velocity.abs() > params.rest_threshold
    }

    fn is_translating(&self, params: &InertiaParams) -> bool {
        self.velocity.x.abs() > params.rest_threshold
            || self.velocity.y.abs() > params.rest_threshold
    }

    /// Advance one frame of free flight inside `bounds`.
    pub fn step(&mut self, bounds: Bounds, params: &InertiaParams) -> StepOutcome {
        self.velocity.x *= params.damping;
        self.velocity.y *= params.damping;
        self.angular_velocity *= params.damping;

        self.position.x += self.velocity.x;
        self.position.y += self.velocity.y;
        self.rotation += self.angular_velocity;

        if self.is_translating(params) {
            self.angular_velocity = self.velocity.x * params.spin_coupling;
        }

        if self.position.x < 0.0 || self.position.x > bounds.max_x {
            self.velocity.x *= params.bounce;
            self.angular_velocity *= params.bounce;
            self.position.x = if self.position.x < 0.0 { 0.0 } else { bounds.max_x };
        }
        if self.position.y < 0.0 || self.position.y > bounds.max_y {
            self.velocity.y *= params.bounce;
            self.angular_velocity *= params.bounce;
            self.position.y = if self.position.y < 0.0 { 0.0 } else { bounds.max_y };
        }

        if self.is_moving(params) {
            StepOutcome::Moving
        } else {
            StepOutcome::AtRest
        }
    }
}
