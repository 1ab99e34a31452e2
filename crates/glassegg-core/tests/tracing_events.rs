//! Lifecycle events are reported through `tracing`.

use std::sync::{Arc, Mutex};

use glassegg_core::{ManualScheduler, OverlayConfig, OverlayManager, Viewport};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Clone, Default)]
struct Messages(Arc<Mutex<Vec<String>>>);

struct MessageVisitor<'a>(&'a mut Option<String>);

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: Subscriber> Layer<S> for Messages {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = None;
        event.record(&mut MessageVisitor(&mut message));
        if let Some(message) = message {
            self.0.lock().expect("log lock").push(message);
        }
    }
}

#[test]
fn eviction_and_exit_are_logged() {
    let messages = Messages::default();
    let subscriber = tracing_subscriber::registry().with(messages.clone());

    tracing::subscriber::with_default(subscriber, || {
        let mut m = OverlayManager::new(
            OverlayConfig {
                max_panels: 1,
                ..OverlayConfig::default()
            },
            3,
            ManualScheduler::new(),
        )
        .expect("valid config");
        let view = Viewport::new(800.0, 600.0);
        m.spawn_panel(view);
        let second = m.spawn_panel(view);
        m.double_activate(second);
        m.teardown();
    });

    let logged = messages.0.lock().expect("log lock").clone();
    for expected in [
        "panel spawned",
        "evicting oldest panel",
        "panel exiting",
        "overlay manager torn down",
    ] {
        assert!(
            logged.iter().any(|m| m == expected),
            "missing {expected:?} in {logged:?}"
        );
    }
}
