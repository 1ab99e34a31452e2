#![forbid(unsafe_code)]

//! The overlay manager: sequence matching, panel lifecycle, and per-panel
//! drag/inertia dispatch.
//!
//! The manager is host-driven. The embedding environment forwards key,
//! pointer, and double-click input, calls [`OverlayManager::on_frame`] /
//! [`OverlayManager::finish_exit`] when the [`FrameScheduler`] fires, and
//! drains [`SceneCommand`]s after every call.
//!
//! # Invariants
//!
//! 1. `len() <= config.max_panels` after every operation; the oldest panel
//!    is evicted first.
//! 2. A removed panel has no pending frame or removal left in the scheduler.
//! 3. A dragging or exiting panel is never stepped.
//! 4. Panel ids strictly increase in creation order.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use crate::config::OverlayConfig;
use crate::error::Result;
use crate::geometry::{Vec2, Viewport};
use crate::inertia::StepOutcome;
use crate::panel::{Panel, PanelId};
use crate::scene::{Cursor, PanelView, SceneCommand};
use crate::scheduler::FrameScheduler;
use crate::sequence::SequenceMatcher;

/// Why an input was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    /// The panel was already removed (stale event or frame).
    UnknownPanel,
    /// The panel is playing its exit transition.
    PanelExiting,
    /// No panel is held by the pointer.
    NotDragging,
    /// The panel is held, so inertia is suspended.
    PanelDragging,
}

/// Outcome of one dispatched input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied,
    Ignored(IgnoredReason),
}

impl DispatchOutcome {
    #[must_use]
    pub const fn applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

pub struct OverlayManager<S> {
    config: OverlayConfig,
    matcher: SequenceMatcher,
    panels: VecDeque<Panel>,
    scheduler: S,
    rng: SmallRng,
    next_id: u64,
    commands: Vec<SceneCommand>,
}

impl<S> std::fmt::Debug for OverlayManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayManager")
            .field("panels", &self.panels.len())
            .field("buffered_keys", &self.matcher.buffered_len())
            .field("pending_commands", &self.commands.len())
            .finish()
    }
}

impl<S: FrameScheduler> OverlayManager<S> {
    /// Validate `config` and build a manager.
    ///
    /// `seed` drives panel size and placement; hosts pass entropy, tests pass
    /// a constant.
    pub fn new(config: OverlayConfig, seed: u64, scheduler: S) -> Result<Self> {
        config.validate()?;
        let matcher = SequenceMatcher::new(config.secret_code.iter().cloned());
        let panels = VecDeque::with_capacity(config.max_panels);
        Ok(Self {
            config,
            matcher,
            panels,
            scheduler,
            rng: SmallRng::seed_from_u64(seed),
            next_id: 1,
            commands: Vec::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    #[must_use]
    pub fn matcher(&self) -> &SequenceMatcher {
        &self.matcher
    }

    #[must_use]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Active panels, oldest first.
    pub fn panels(&self) -> impl Iterator<Item = &Panel> + '_ {
        self.panels.iter()
    }

    #[must_use]
    pub fn panel_ids(&self) -> Vec<PanelId> {
        self.panels.iter().map(Panel::id).collect()
    }

    #[must_use]
    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.panels.iter().find(|p| p.id() == id)
    }

    fn panel_mut(&mut self, id: PanelId) -> Option<&mut Panel> {
        self.panels.iter_mut().find(|p| p.id() == id)
    }

    /// Drain queued presentation commands, in emission order.
    pub fn take_commands(&mut self) -> Vec<SceneCommand> {
        std::mem::take(&mut self.commands)
    }

    // -----------------------------------------------------------------------
    // Keys and creation
    // -----------------------------------------------------------------------

    /// Feed one key-down. Spawns a panel when the secret code completes.
    pub fn handle_key(&mut self, key: &str, viewport: Viewport) -> Option<PanelId> {
        if !self.matcher.push(key) {
            return None;
        }
        info!("secret code matched");
        Some(self.spawn_panel(viewport))
    }

    /// Create one panel inside `viewport`, evicting the oldest if full.
    pub fn spawn_panel(&mut self, viewport: Viewport) -> PanelId {
        while self.panels.len() >= self.config.max_panels {
            self.evict_oldest();
        }

        let size = f64::from(
            self.rng
                .random_range(self.config.min_size..self.config.max_size),
        );
        let x = self.rng.random::<f64>() * (viewport.width - size).max(0.0);
        let y = self.rng.random::<f64>() * (viewport.height - size).max(0.0);

        let id = PanelId(self.next_id);
        self.next_id += 1;
        let panel = Panel::new(id, size, Vec2::new(x, y));
        debug!(panel = %id, size, x, y, "panel spawned");

        self.commands.push(SceneCommand::Insert(PanelView {
            id,
            size,
            transform: panel.transform(),
            image_src: self.config.image_src.clone(),
        }));
        self.panels.push_back(panel);
        id
    }

    fn evict_oldest(&mut self) {
        if let Some(oldest) = self.panels.pop_front() {
            debug!(panel = %oldest.id(), "evicting oldest panel");
            self.release_resources(oldest.id());
        }
    }

    fn release_resources(&mut self, id: PanelId) {
        self.scheduler.cancel_frame(id);
        self.scheduler.cancel_removal(id);
        self.commands.push(SceneCommand::Remove(id));
    }

    // -----------------------------------------------------------------------
    // Pointer input
    // -----------------------------------------------------------------------

    /// Grab `id` at `pointer`. Suspends its inertia.
    pub fn pointer_down(&mut self, id: PanelId, pointer: Vec2) -> DispatchOutcome {
        let Some(panel) = self.panel_mut(id) else {
            trace!(panel = %id, "pointer_down on unknown panel");
            return DispatchOutcome::Ignored(IgnoredReason::UnknownPanel);
        };
        if panel.is_exiting() {
            return DispatchOutcome::Ignored(IgnoredReason::PanelExiting);
        }
        panel.grab(pointer);
        self.scheduler.cancel_frame(id);
        self.commands.push(SceneCommand::SetCursor(id, Cursor::Grabbing));
        DispatchOutcome::Applied
    }

    /// Move whichever panel is held.
    pub fn pointer_move(&mut self, pointer: Vec2) -> DispatchOutcome {
        let params = self.config.physics;
        let mut moved = false;
        for panel in &mut self.panels {
            if panel.drag_to(pointer, &params) {
                self.commands
                    .push(SceneCommand::SetTransform(panel.id(), panel.transform()));
                moved = true;
            }
        }
        if moved {
            DispatchOutcome::Applied
        } else {
            DispatchOutcome::Ignored(IgnoredReason::NotDragging)
        }
    }

    /// Release every held panel into free flight.
    pub fn pointer_up(&mut self) -> DispatchOutcome {
        let params = self.config.physics;
        let mut released = false;
        for panel in &mut self.panels {
            if !panel.is_dragging() {
                continue;
            }
            panel.release();
            released = true;
            self.commands
                .push(SceneCommand::SetCursor(panel.id(), Cursor::Grab));
            if panel.kinematics().is_moving(&params) {
                self.scheduler.request_frame(panel.id());
            }
        }
        if released {
            DispatchOutcome::Applied
        } else {
            DispatchOutcome::Ignored(IgnoredReason::NotDragging)
        }
    }

    /// Start the exit transition; the panel is removed once the scheduled
    /// removal fires.
    pub fn double_activate(&mut self, id: PanelId) -> DispatchOutcome {
        let duration = self.config.exit_duration();
        let Some(panel) = self.panel_mut(id) else {
            return DispatchOutcome::Ignored(IgnoredReason::UnknownPanel);
        };
        if panel.is_exiting() {
            return DispatchOutcome::Ignored(IgnoredReason::PanelExiting);
        }
        let was_held = panel.is_dragging();
        panel.begin_exit();
        debug!(panel = %id, ?duration, was_held, "panel exiting");
        self.scheduler.cancel_frame(id);
        self.scheduler.schedule_removal(id, duration);
        if was_held {
            // The release that follows is ignored for an exiting panel.
            self.commands.push(SceneCommand::SetCursor(id, Cursor::Grab));
        }
        self.commands.push(SceneCommand::BeginExit { id, duration });
        DispatchOutcome::Applied
    }

    /// Finalize an exiting panel.
    pub fn finish_exit(&mut self, id: PanelId) -> DispatchOutcome {
        let Some(index) = self.panels.iter().position(|p| p.id() == id) else {
            trace!(panel = %id, "removal fired for unknown panel");
            return DispatchOutcome::Ignored(IgnoredReason::UnknownPanel);
        };
        if !self.panels[index].is_exiting() {
            return DispatchOutcome::Ignored(IgnoredReason::UnknownPanel);
        }
        self.panels.remove(index);
        debug!(panel = %id, "panel removed");
        self.release_resources(id);
        DispatchOutcome::Applied
    }

    // -----------------------------------------------------------------------
    // Frames
    // -----------------------------------------------------------------------

    /// One inertia step for `id`. Reschedules itself while still moving.
    pub fn on_frame(&mut self, id: PanelId, viewport: Viewport) -> DispatchOutcome {
        let params = self.config.physics;
        let Some(panel) = self.panel_mut(id) else {
            trace!(panel = %id, "frame for unknown panel");
            return DispatchOutcome::Ignored(IgnoredReason::UnknownPanel);
        };
        if panel.is_dragging() {
            return DispatchOutcome::Ignored(IgnoredReason::PanelDragging);
        }
        if panel.is_exiting() {
            return DispatchOutcome::Ignored(IgnoredReason::PanelExiting);
        }
        let outcome = panel.step(viewport, &params);
        let transform = panel.transform();
        self.commands.push(SceneCommand::SetTransform(id, transform));
        match outcome {
            StepOutcome::Moving => self.scheduler.request_frame(id),
            StepOutcome::AtRest => trace!(panel = %id, "panel at rest"),
        }
        DispatchOutcome::Applied
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Remove every panel and forget partial key input.
    pub fn teardown(&mut self) {
        while let Some(panel) = self.panels.pop_front() {
            self.release_resources(panel.id());
        }
        self.matcher.reset();
        info!("overlay manager torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use crate::sequence::KONAMI_CODE;
    use std::time::Duration;

    const VIEW: Viewport = Viewport::new(1280.0, 800.0);

    fn manager() -> OverlayManager<ManualScheduler> {
        OverlayManager::new(OverlayConfig::default(), 7, ManualScheduler::new())
            .expect("default config")
    }

    fn flight(m: &mut OverlayManager<ManualScheduler>) -> usize {
        let mut frames = 0;
        loop {
            let due = m.scheduler_mut().take_due_frames();
            if due.is_empty() {
                return frames;
            }
            for id in due {
                m.on_frame(id, VIEW);
                frames += 1;
            }
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let config = OverlayConfig {
            max_panels: 0,
            ..OverlayConfig::default()
        };
        assert!(OverlayManager::new(config, 0, ManualScheduler::new()).is_err());
    }

    #[test]
    fn konami_spawns_one_panel() {
        let mut m = manager();
        let spawned: Vec<_> = KONAMI_CODE
            .iter()
            .filter_map(|k| m.handle_key(k, VIEW))
            .collect();
        assert_eq!(spawned, vec![PanelId(1)]);
        assert_eq!(m.matcher().buffered_len(), 0);
        let cmds = m.take_commands();
        assert!(matches!(&cmds[..], [SceneCommand::Insert(v)] if v.id == PanelId(1)));
    }

    #[test]
    fn spawned_panel_fits_viewport() {
        let mut m = manager();
        for _ in 0..50 {
            let id = m.spawn_panel(VIEW);
            let p = m.panel(id).expect("just spawned");
            let k = p.kinematics();
            assert!((150.0..300.0).contains(&p.size()));
            assert!(k.position.x >= 0.0 && k.position.x + p.size() <= VIEW.width);
            assert!(k.position.y >= 0.0 && k.position.y + p.size() <= VIEW.height);
        }
    }

    #[test]
    fn tiny_viewport_pins_to_origin() {
        let mut m = manager();
        let id = m.spawn_panel(Viewport::new(100.0, 100.0));
        assert_eq!(m.panel(id).expect("spawned").kinematics().position, Vec2::ZERO);
    }

    #[test]
    fn insert_carries_image_and_transform() {
        let mut m = manager();
        let id = m.spawn_panel(VIEW);
        let panel = m.panel(id).expect("spawned").clone();
        let cmds = m.take_commands();
        let [SceneCommand::Insert(view)] = &cmds[..] else {
            panic!("expected a single insert, got {cmds:?}");
        };
        assert_eq!(view.image_src, m.config().image_src);
        assert_eq!(view.size, panel.size());
        assert_eq!(view.transform, panel.transform());
    }

    #[test]
    fn eviction_cancels_pending_work() {
        let mut m = manager();
        let first = m.spawn_panel(VIEW);
        m.pointer_down(first, Vec2::new(0.0, 0.0));
        m.pointer_move(Vec2::new(30.0, 0.0));
        m.pointer_up();
        assert!(m.scheduler().is_frame_pending(first));

        for _ in 0..5 {
            m.spawn_panel(VIEW);
        }
        assert!(m.panel(first).is_none());
        assert!(!m.scheduler().is_frame_pending(first));
        assert!(m.take_commands().contains(&SceneCommand::Remove(first)));
    }

    #[test]
    fn drag_release_and_settle() {
        let mut m = manager();
        let id = m.spawn_panel(VIEW);
        let start = m.panel(id).expect("spawned").kinematics().position;
        m.take_commands();

        assert!(m.pointer_down(id, Vec2::new(400.0, 400.0)).applied());
        assert!(m.pointer_move(Vec2::new(405.0, 402.0)).applied());
        let k = *m.panel(id).expect("held").kinematics();
        assert_eq!(k.position, Vec2::new(start.x + 5.0, start.y + 2.0));
        assert_eq!(k.velocity, Vec2::new(5.0, 2.0));

        assert!(m.pointer_up().applied());
        assert_eq!(
            m.take_commands(),
            vec![
                SceneCommand::SetCursor(id, Cursor::Grabbing),
                SceneCommand::SetTransform(id, k.transform()),
                SceneCommand::SetCursor(id, Cursor::Grab),
            ]
        );

        let frames = flight(&mut m);
        assert!(frames > 10, "expected a glide, got {frames} frames");
        let panel = m.panel(id).expect("still active");
        assert!(!panel.kinematics().is_moving(&m.config().physics));
        assert_eq!(m.scheduler().pending_frames(), 0);
    }

    #[test]
    fn release_without_motion_schedules_nothing() {
        let mut m = manager();
        let id = m.spawn_panel(VIEW);
        m.pointer_down(id, Vec2::new(10.0, 10.0));
        m.pointer_up();
        assert!(!m.scheduler().is_frame_pending(id));
    }

    #[test]
    fn grab_cancels_pending_frame() {
        let mut m = manager();
        let id = m.spawn_panel(VIEW);
        m.pointer_down(id, Vec2::ZERO);
        m.pointer_move(Vec2::new(20.0, 20.0));
        m.pointer_up();
        assert!(m.scheduler().is_frame_pending(id));

        m.pointer_down(id, Vec2::new(20.0, 20.0));
        assert!(!m.scheduler().is_frame_pending(id));
        assert_eq!(
            m.on_frame(id, VIEW),
            DispatchOutcome::Ignored(IgnoredReason::PanelDragging)
        );
    }

    #[test]
    fn move_without_grab_is_ignored() {
        let mut m = manager();
        m.spawn_panel(VIEW);
        assert_eq!(
            m.pointer_move(Vec2::new(1.0, 1.0)),
            DispatchOutcome::Ignored(IgnoredReason::NotDragging)
        );
        assert_eq!(
            m.pointer_up(),
            DispatchOutcome::Ignored(IgnoredReason::NotDragging)
        );
    }

    #[test]
    fn double_activation_exits_then_removes() {
        let mut m = manager();
        let id = m.spawn_panel(VIEW);
        m.take_commands();

        assert!(m.double_activate(id).applied());
        assert_eq!(
            m.double_activate(id),
            DispatchOutcome::Ignored(IgnoredReason::PanelExiting)
        );
        assert_eq!(
            m.pointer_down(id, Vec2::ZERO),
            DispatchOutcome::Ignored(IgnoredReason::PanelExiting)
        );
        assert_eq!(m.len(), 1);

        assert!(m.scheduler_mut().advance(Duration::from_millis(299)).is_empty());
        let due = m.scheduler_mut().advance(Duration::from_millis(1));
        assert_eq!(due, vec![id]);
        for id in due {
            assert!(m.finish_exit(id).applied());
        }
        assert!(m.is_empty());
        assert_eq!(
            m.take_commands(),
            vec![
                SceneCommand::BeginExit {
                    id,
                    duration: Duration::from_millis(300)
                },
                SceneCommand::Remove(id),
            ]
        );
    }

    #[test]
    fn double_activation_while_dragging() {
        let mut m = manager();
        let id = m.spawn_panel(VIEW);
        m.pointer_down(id, Vec2::ZERO);
        m.take_commands();
        assert!(m.double_activate(id).applied());
        assert_eq!(
            m.pointer_move(Vec2::new(5.0, 5.0)),
            DispatchOutcome::Ignored(IgnoredReason::NotDragging)
        );
        assert_eq!(
            m.pointer_up(),
            DispatchOutcome::Ignored(IgnoredReason::NotDragging)
        );
        assert_eq!(
            m.take_commands(),
            vec![
                SceneCommand::SetCursor(id, Cursor::Grab),
                SceneCommand::BeginExit {
                    id,
                    duration: Duration::from_millis(300),
                },
            ]
        );
    }

    #[test]
    fn double_activation_while_idle_leaves_cursor_alone() {
        let mut m = manager();
        let id = m.spawn_panel(VIEW);
        m.take_commands();
        m.double_activate(id);
        assert!(
            !m.take_commands()
                .iter()
                .any(|c| matches!(c, SceneCommand::SetCursor(..)))
        );
    }

    #[test]
    fn finish_exit_requires_exiting_panel() {
        let mut m = manager();
        let id = m.spawn_panel(VIEW);
        assert!(!m.finish_exit(id).applied());
        assert_eq!(m.len(), 1);
        assert!(!m.finish_exit(PanelId(99)).applied());
    }

    #[test]
    fn evicting_exiting_panel_cancels_removal() {
        let mut m = OverlayManager::new(
            OverlayConfig {
                max_panels: 1,
                ..OverlayConfig::default()
            },
            1,
            ManualScheduler::new(),
        )
        .expect("valid config");
        let first = m.spawn_panel(VIEW);
        m.double_activate(first);
        m.spawn_panel(VIEW);
        assert!(!m.scheduler().is_removal_pending(first));
        assert!(m.scheduler_mut().advance(Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn stale_frame_is_ignored() {
        let mut m = manager();
        assert_eq!(
            m.on_frame(PanelId(42), VIEW),
            DispatchOutcome::Ignored(IgnoredReason::UnknownPanel)
        );
    }

    #[test]
    fn teardown_removes_everything() {
        let mut m = manager();
        let a = m.spawn_panel(VIEW);
        let b = m.spawn_panel(VIEW);
        m.double_activate(b);
        m.handle_key("ArrowUp", VIEW);
        m.take_commands();

        m.teardown();

        assert!(m.is_empty());
        assert_eq!(m.matcher().buffered_len(), 0);
        assert!(!m.scheduler().is_removal_pending(b));
        assert_eq!(
            m.take_commands(),
            vec![SceneCommand::Remove(a), SceneCommand::Remove(b)]
        );
    }

    #[test]
    fn ids_increase_across_evictions() {
        let mut m = manager();
        let ids: Vec<_> = (0..8).map(|_| m.spawn_panel(VIEW)).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(m.panel_ids(), ids[3..].to_vec());
    }
}
