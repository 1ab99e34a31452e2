#![forbid(unsafe_code)]

//! WASM frontend for the glass overlay easter egg.
//!
//! This crate provides `GlassOverlay`, a `wasm-bindgen`-exported struct
//! that owns a `glassegg_core::OverlayManager` and binds it to the page:
//! document-level `keydown`/`mousemove`/`mouseup` listeners, per-panel
//! `mousedown`/`dblclick` listeners, `requestAnimationFrame` stepping, and
//! DOM application of the manager's scene commands.
//!
//! ```js
//! import init, { GlassOverlay } from "./glassegg_web.js";
//! await init();
//! // Keep the handle alive: dropping it uninstalls the overlay.
//! const overlay = new GlassOverlay();
//! overlay.install();
//! ```

pub mod style;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::GlassOverlay;
