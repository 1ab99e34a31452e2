#![forbid(unsafe_code)]

//! Inline CSS for panel nodes and the injected keyframes sheet.
//!
//! Kept free of DOM types so the generated text is testable natively.

use std::time::Duration;

use glassegg_core::Transform;

pub const PANEL_CLASS: &str = "glassegg-panel";
pub const STYLE_ELEMENT_ID: &str = "glassegg-keyframes";
pub const ENTER_KEYFRAMES: &str = "glassegg-scale-in";
pub const EXIT_KEYFRAMES: &str = "glassegg-scale-out";

/// Entry and exit keyframes.
///
/// The entry animation is part of [`panel_css`]; the exit one is set by
/// [`exit_animation`] and replaces it.
///
/// They animate the individual `scale`/`rotate` properties, which compose
/// with the inline `transform` instead of replacing it, so an exiting panel
/// shrinks in place.
pub const KEYFRAMES_CSS: &str = "\
@keyframes glassegg-scale-in {
    from { scale: 0; rotate: -180deg; }
    to { scale: 1; rotate: 0deg; }
}
@keyframes glassegg-scale-out {
    from { scale: 1; rotate: 0deg; }
    to { scale: 0; rotate: 180deg; }
}
";

pub const IMAGE_CSS: &str = "\
max-width: 100%; \
max-height: 100%; \
border-radius: 10px; \
object-fit: cover; \
pointer-events: none;";

/// Inline style for a panel node of edge `size` at `transform`.
///
/// `box-sizing: border-box` keeps the node's rendered extent equal to
/// `size`, which is what the stepper bounds against.
#[must_use]
pub fn panel_css(size: f64, transform: &Transform) -> String {
    format!(
        "position: fixed; \
         left: 0; \
         top: 0; \
         width: {size}px; \
         height: {size}px; \
         box-sizing: border-box; \
         background: rgba(255, 255, 255, 0.2); \
         backdrop-filter: blur(10px); \
         -webkit-backdrop-filter: blur(10px); \
         border-radius: 15px; \
         padding: 20px; \
         box-shadow: 0 8px 32px rgba(31, 38, 135, 0.37); \
         border: 1px solid rgba(255, 255, 255, 0.18); \
         transform: {transform}; \
         animation: {ENTER_KEYFRAMES} 0.3s ease-out; \
         z-index: 1000; \
         overflow: hidden; \
         display: flex; \
         align-items: center; \
         justify-content: center; \
         user-select: none; \
         touch-action: none; \
         cursor: grab;",
        transform = transform.css(),
    )
}

/// CSS `animation` value for the exit transition.
#[must_use]
pub fn exit_animation(duration: Duration) -> String {
    format!(
        "{EXIT_KEYFRAMES} {}s ease-in forwards",
        duration.as_secs_f64()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_animation_uses_seconds() {
        assert_eq!(
            exit_animation(Duration::from_millis(300)),
            "glassegg-scale-out 0.3s ease-in forwards"
        );
    }

    #[test]
    fn panel_css_carries_size_and_transform() {
        let css = panel_css(
            180.0,
            &Transform {
                x: 10.0,
                y: 20.0,
                rotation_deg: 0.0,
            },
        );
        assert!(css.contains("width: 180px;"));
        assert!(css.contains("height: 180px;"));
        assert!(css.contains("transform: translate(10px, 20px) rotate(0deg);"));
        assert!(css.contains("box-sizing: border-box;"));
        assert!(css.contains("cursor: grab;"));
    }

    #[test]
    fn panel_css_plays_entry_animation() {
        let css = panel_css(150.0, &Transform::default());
        assert!(css.contains("animation: glassegg-scale-in 0.3s ease-out;"));
        assert!(KEYFRAMES_CSS.contains(&format!("@keyframes {ENTER_KEYFRAMES}")));
    }

    #[test]
    fn keyframes_define_exit_animation() {
        assert!(KEYFRAMES_CSS.contains(&format!("@keyframes {EXIT_KEYFRAMES}")));
    }
}
