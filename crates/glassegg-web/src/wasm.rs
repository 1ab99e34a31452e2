//! `wasm-bindgen` exports and DOM binding for the glass overlay.
//!
//! Only compiled on `wasm32` targets. All state lives in one
//! `Rc<RefCell<Shell>>`; listeners and scheduler callbacks hold a `Weak`
//! to it, borrow it for the duration of one callback, and flush the
//! manager's scene commands before returning.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use gloo::events::EventListener;
use gloo::render::{AnimationFrame, request_animation_frame};
use gloo::timers::callback::Timeout;
use js_sys::Reflect;
use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlImageElement, KeyboardEvent, MouseEvent, Window};

use glassegg_core::{
    FrameScheduler, OverlayConfig, OverlayManager, PanelId, PanelView, SceneCommand, Vec2,
    Viewport,
};

use crate::style;

type SharedShell = Rc<RefCell<Shell>>;
type WeakShell = Weak<RefCell<Shell>>;

/// `console.error(msg)`, resolved through `Reflect`.
fn console_error(msg: &str) {
    let Ok(console) = Reflect::get(&js_sys::global(), &"console".into()) else {
        return;
    };
    let Some(error) = Reflect::get(&console, &"error".into())
        .ok()
        .and_then(|f| f.dyn_into::<js_sys::Function>().ok())
    else {
        return;
    };
    let _ = error.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    static HOOK: std::sync::Once = std::sync::Once::new();
    // The hook info's Display already carries the panic location.
    HOOK.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            console_error(&format!("glassegg-web panicked: {info}"));
        }));
    });
}

/// Run `f` against the shell if it is still alive and not already borrowed.
fn with_shell(weak: &WeakShell, f: impl FnOnce(&mut Shell)) {
    let Some(shell) = weak.upgrade() else {
        return;
    };
    let Ok(mut shell) = shell.try_borrow_mut() else {
        warn!("overlay shell busy; dropping re-entrant callback");
        return;
    };
    f(&mut *shell);
    shell.flush();
}

fn pointer_of(event: &web_sys::Event) -> Option<Vec2> {
    let event = event.dyn_ref::<MouseEvent>()?;
    Some(Vec2::new(
        f64::from(event.client_x()),
        f64::from(event.client_y()),
    ))
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// `requestAnimationFrame` / `setTimeout` backed scheduler.
///
/// Dropping a gloo handle cancels it, so cancellation is map removal.
struct RafScheduler {
    shell: WeakShell,
    frames: HashMap<PanelId, AnimationFrame>,
    removals: HashMap<PanelId, Timeout>,
}

impl RafScheduler {
    fn new() -> Self {
        Self {
            shell: Weak::new(),
            frames: HashMap::new(),
            removals: HashMap::new(),
        }
    }

    fn frame_fired(&mut self, panel: PanelId) {
        self.frames.remove(&panel);
    }

    fn removal_fired(&mut self, panel: PanelId) {
        self.removals.remove(&panel);
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self, panel: PanelId) {
        let shell = self.shell.clone();
        let handle = request_animation_frame(move |_timestamp| {
            with_shell(&shell, |s| {
                s.manager.scheduler_mut().frame_fired(panel);
                let viewport = s.viewport();
                s.manager.on_frame(panel, viewport);
            });
        });
        self.frames.insert(panel, handle);
    }

    fn cancel_frame(&mut self, panel: PanelId) {
        self.frames.remove(&panel);
    }

    fn schedule_removal(&mut self, panel: PanelId, after: Duration) {
        let shell = self.shell.clone();
        let millis = u32::try_from(after.as_millis()).unwrap_or(u32::MAX);
        let handle = Timeout::new(millis, move || {
            with_shell(&shell, |s| {
                s.manager.scheduler_mut().removal_fired(panel);
                s.manager.finish_exit(panel);
            });
        });
        self.removals.insert(panel, handle);
    }

    fn cancel_removal(&mut self, panel: PanelId) {
        self.removals.remove(&panel);
    }
}

// ---------------------------------------------------------------------------
// Shell
// ---------------------------------------------------------------------------

/// A panel's DOM node together with the listeners bound to it.
struct PanelNode {
    element: HtmlElement,
    _listeners: [EventListener; 2],
}

struct Shell {
    this: WeakShell,
    manager: OverlayManager<RafScheduler>,
    window: Window,
    document: Document,
    nodes: HashMap<PanelId, PanelNode>,
    global_listeners: Vec<EventListener>,
    style_element: Option<Element>,
}

impl Shell {
    fn new_shared(config: OverlayConfig) -> Result<SharedShell, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;
        // 53 bits is all the entropy Math.random() carries.
        let seed = (js_sys::Math::random() * 9_007_199_254_740_992.0) as u64;
        let manager = OverlayManager::new(config, seed, RafScheduler::new())
            .map_err(|err| JsValue::from_str(&err.to_string()))?;

        let shell = Rc::new(RefCell::new(Self {
            this: Weak::new(),
            manager,
            window,
            document,
            nodes: HashMap::new(),
            global_listeners: Vec::new(),
            style_element: None,
        }));
        {
            let mut s = shell.borrow_mut();
            s.this = Rc::downgrade(&shell);
            s.manager.scheduler_mut().shell = Rc::downgrade(&shell);
        }
        Ok(shell)
    }

    fn viewport(&self) -> Viewport {
        let read = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64());
        Viewport::new(
            read(self.window.inner_width()).unwrap_or(0.0),
            read(self.window.inner_height()).unwrap_or(0.0),
        )
    }

    fn is_installed(&self) -> bool {
        !self.global_listeners.is_empty()
    }

    fn install(&mut self) -> Result<(), JsValue> {
        if self.is_installed() {
            return Ok(());
        }

        let style_element = self.document.create_element("style")?;
        style_element.set_id(style::STYLE_ELEMENT_ID);
        style_element.set_text_content(Some(style::KEYFRAMES_CSS));
        let head = self
            .document
            .head()
            .ok_or_else(|| JsValue::from_str("document has no <head>"))?;
        head.append_child(&style_element)?;
        self.style_element = Some(style_element);

        let weak = self.this.clone();
        let keydown = EventListener::new(&self.document, "keydown", move |event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let key = event.key();
            with_shell(&weak, |s| {
                let viewport = s.viewport();
                s.manager.handle_key(&key, viewport);
            });
        });

        let weak = self.this.clone();
        let mousemove = EventListener::new(&self.document, "mousemove", move |event| {
            let Some(pointer) = pointer_of(event) else {
                return;
            };
            with_shell(&weak, |s| {
                s.manager.pointer_move(pointer);
            });
        });

        let weak = self.this.clone();
        let mouseup = EventListener::new(&self.document, "mouseup", move |_event| {
            with_shell(&weak, |s| {
                s.manager.pointer_up();
            });
        });

        self.global_listeners = vec![keydown, mousemove, mouseup];
        info!("glass overlay installed");
        Ok(())
    }

    fn destroy(&mut self) {
        self.global_listeners.clear();
        self.manager.teardown();
        self.flush();
        if let Some(style_element) = self.style_element.take() {
            style_element.remove();
        }
        // Anything the manager no longer knows about.
        for (_, node) in self.nodes.drain() {
            node.element.remove();
        }
        info!("glass overlay destroyed");
    }

    /// Apply queued scene commands to the DOM.
    fn flush(&mut self) {
        for command in self.manager.take_commands() {
            if let Err(err) = self.apply(command) {
                warn!(?err, "failed to apply scene command");
            }
        }
    }

    fn apply(&mut self, command: SceneCommand) -> Result<(), JsValue> {
        match command {
            SceneCommand::Insert(view) => self.insert_node(&view)?,
            SceneCommand::Remove(id) => {
                if let Some(node) = self.nodes.remove(&id) {
                    node.element.remove();
                    debug!(panel = %id, "panel node detached");
                }
            }
            SceneCommand::SetTransform(id, transform) => {
                if let Some(node) = self.nodes.get(&id) {
                    node.element
                        .style()
                        .set_property("transform", &transform.css())?;
                }
            }
            SceneCommand::SetCursor(id, cursor) => {
                if let Some(node) = self.nodes.get(&id) {
                    node.element.style().set_property("cursor", cursor.css())?;
                }
            }
            SceneCommand::BeginExit { id, duration } => {
                if let Some(node) = self.nodes.get(&id) {
                    node.element
                        .style()
                        .set_property("animation", &style::exit_animation(duration))?;
                }
            }
        }
        Ok(())
    }

    fn insert_node(&mut self, view: &PanelView) -> Result<(), JsValue> {
        let element: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        element.set_class_name(style::PANEL_CLASS);
        element
            .style()
            .set_css_text(&style::panel_css(view.size, &view.transform));

        let image: HtmlImageElement = self.document.create_element("img")?.dyn_into()?;
        image.set_src(&view.image_src);
        image.set_alt("");
        image.style().set_css_text(style::IMAGE_CSS);
        element.append_child(&image)?;

        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no <body>"))?;
        body.append_child(&element)?;

        let id = view.id;
        let weak = self.this.clone();
        let mousedown = EventListener::new(&element, "mousedown", move |event| {
            let Some(pointer) = pointer_of(event) else {
                return;
            };
            with_shell(&weak, |s| {
                s.manager.pointer_down(id, pointer);
            });
        });
        let weak = self.this.clone();
        let dblclick = EventListener::new(&element, "dblclick", move |_event| {
            with_shell(&weak, |s| {
                s.manager.double_activate(id);
            });
        });

        self.nodes.insert(
            id,
            PanelNode {
                element,
                _listeners: [mousedown, dblclick],
            },
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Konami-code glass overlay bound to the current page.
///
/// ```js
/// const overlay = new GlassOverlay();
/// overlay.install();
/// // ...
/// overlay.destroy();
/// ```
#[wasm_bindgen]
pub struct GlassOverlay {
    shell: SharedShell,
}

#[wasm_bindgen]
impl GlassOverlay {
    /// Create an overlay with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<GlassOverlay, JsValue> {
        install_panic_hook();
        Ok(Self {
            shell: Shell::new_shared(OverlayConfig::default())?,
        })
    }

    /// Create an overlay from a (partial) JSON configuration.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str) -> Result<GlassOverlay, JsValue> {
        install_panic_hook();
        let config =
            OverlayConfig::from_json(json).map_err(|err| JsValue::from_str(&err.to_string()))?;
        Ok(Self {
            shell: Shell::new_shared(config)?,
        })
    }

    /// Inject the keyframes sheet and start listening for the secret code.
    /// Calling it again is a no-op.
    pub fn install(&self) -> Result<(), JsValue> {
        self.shell
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("overlay is busy"))?
            .install()
    }

    /// Remove every panel, listener, and injected style.
    pub fn destroy(&self) {
        match self.shell.try_borrow_mut() {
            Ok(mut shell) => shell.destroy(),
            Err(_) => warn!("overlay busy; destroy skipped"),
        }
    }

    /// Number of panels currently on the page.
    #[wasm_bindgen(js_name = panelCount)]
    pub fn panel_count(&self) -> usize {
        self.shell.try_borrow().map_or(0, |shell| shell.manager.len())
    }
}

impl Drop for GlassOverlay {
    fn drop(&mut self) {
        self.destroy();
    }
}
