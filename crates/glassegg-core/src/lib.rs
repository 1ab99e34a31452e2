#![forbid(unsafe_code)]

//! Core: key-sequence matching, glass panel lifecycle, and drag/inertia
//! simulation.
//!
//! # Role
//! `glassegg-core` is the platform-independent half of the overlay easter
//! egg. It has no JS or DOM types; `glassegg-web` binds it to a page.
//!
//! # Primary responsibilities
//! - **SequenceMatcher**: sliding-window match of the secret key code.
//! - **OverlayManager**: panel factory, FIFO capacity policy, and dispatch of
//!   pointer, double-click, and frame callbacks.
//! - **Kinematics**: pure drag, damping, and wall-bounce math.
//! - **FrameScheduler**: per-panel "next frame" and "remove later" requests,
//!   with a deterministic [`scheduler::ManualScheduler`] for tests.
//!
//! # How it fits in the system
//! The host forwards input and scheduler callbacks into the manager, then
//! drains [`scene::SceneCommand`]s and applies them to its visual tree.

pub mod config;
pub mod error;
pub mod geometry;
pub mod inertia;
pub mod manager;
pub mod panel;
pub mod scene;
pub mod scheduler;
pub mod sequence;

pub use config::OverlayConfig;
pub use error::{OverlayError, Result};
pub use geometry::{Transform, Vec2, Viewport};
pub use manager::{DispatchOutcome, IgnoredReason, OverlayManager};
pub use panel::{Panel, PanelId, PanelPhase};
pub use scene::{Cursor, PanelView, SceneCommand};
pub use scheduler::{FrameScheduler, ManualScheduler};
