#![forbid(unsafe_code)]

//! Pixel-space geometry shared by the simulation and the host.
//!
//! All values are CSS pixels as `f64`, matching what the browser reports for
//! `window.innerWidth` and `MouseEvent.clientX`.

/// A 2D vector in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Current visible area of the page.
///
/// Read fresh by the host on every creation and frame step; a resize only
/// affects future work.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Allowed range for a panel's top-left corner.
///
/// `max_x`/`max_y` may be negative when the viewport is smaller than the
/// panel; the stepper still clamps against them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    #[must_use]
    pub fn for_panel(viewport: Viewport, size: f64) -> Self {
        Self {
            max_x: viewport.width - size,
            max_y: viewport.height - size,
        }
    }
}

/// Translate + rotate transform written to a panel's visual node.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub rotation_deg: f64,
}

impl Transform {
    /// CSS `transform` value.
    #[must_use]
    pub fn css(&self) -> String {
        format!(
            "translate({}px, {}px) rotate({}deg)",
            self.x, self.y, self.rotation_deg
        )
    }
}
