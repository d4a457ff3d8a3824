#![forbid(unsafe_code)]

//! The panel-snapping scroll controller.
//!
//! [`ScrollController`] owns the panel registry, the input normalizer and the
//! transition gate, and drives a [`Backend`] to execute transitions. It is
//! host-driven: it never schedules anything itself. The host feeds it input
//! events, asks [`next_deadline`](ScrollController::next_deadline) when to
//! wake up, and calls [`tick`](ScrollController::tick) (or
//! [`motion_complete`](ScrollController::motion_complete) when the viewport
//! reports the end of a smooth scroll).
//!
//! # Lifecycle
//!
//! ```text
//! new ──► initialize ──► attach ◄──► detach
//!            │
//!            └─ no panels: InitializationError, everything stays inert
//! ```
//!
//! On a non-interactive host every lifecycle call is a no-op.
//!
//! # Transition
//!
//! An accepted request takes the lock, moves the current index, clears the
//! other panels, arms the target, syncs indicators and starts a smooth
//! scroll. Settling releases the lock and restarts the target's entrance
//! animations. Backend failures along the way are logged and skipped; the
//! settle is still scheduled so the lock is always released.

use core::time::Duration;

use panelsnap_backend::{
    Backend, BackendClock, IndicatorSet, PanelSurface, ScrollBehavior, Viewport,
};
use panelsnap_core::config::{SnapConfig, UnlockPolicy};
use panelsnap_core::error::{ConfigError, InitializationError};
use panelsnap_core::event::Event;
use panelsnap_core::gate::TransitionGate;
use panelsnap_core::gesture::{InputNormalizer, Intent};
use panelsnap_core::panel::{PanelFlags, PanelRegistry};
use tracing::{debug, error, info, trace, warn};

use crate::outcome::{
    AttachOutcome, EventDispatch, IgnoredReason, InitOutcome, SettleRecord, SettleTrigger,
    TransitionOutcome, TransitionRecord,
};

/// Log target for controller records.
pub const LOG_TARGET: &str = "panelsnap.controller";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    sequence: u64,
    index: usize,
    started_at: Duration,
    deadline: Duration,
}

/// Panel-snapping scroll controller generic over its backend.
#[derive(Debug)]
pub struct ScrollController<B: Backend> {
    backend: B,
    config: SnapConfig,
    normalizer: InputNormalizer,
    gate: TransitionGate,
    registry: Option<PanelRegistry>,
    indicators: usize,
    attached: bool,
    sequence: u64,
    in_flight: Option<InFlight>,
}

impl<B: Backend> ScrollController<B> {
    /// Create a controller. Validates `config`; touches nothing in the
    /// backend.
    pub fn new(backend: B, config: SnapConfig) -> Result<Self, ConfigError> {
        let config = config.validated()?;
        Ok(Self {
            backend,
            normalizer: InputNormalizer::new(config.gesture),
            gate: TransitionGate::new(config.cooldown),
            config,
            registry: None,
            indicators: 0,
            attached: false,
            sequence: 0,
            in_flight: None,
        })
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Discover panels and indicators and apply the initial state.
    ///
    /// Panel 0 becomes active without a transition: no lock and no scroll.
    /// Its entrance animation starts immediately. Calling this again after a
    /// successful initialization returns the known panel count.
    pub fn initialize(&mut self) -> Result<InitOutcome, InitializationError> {
        if !self.backend.environment().is_interactive() {
            debug!(target: LOG_TARGET, "non-interactive host, initialization skipped");
            return Ok(InitOutcome::Skipped);
        }
        if let Some(registry) = self.registry {
            return Ok(InitOutcome::Ready {
                panels: registry.len(),
            });
        }

        let discovered = match self.backend.panels().discover() {
            Ok(count) => count,
            Err(err) => {
                warn!(target: LOG_TARGET, error = %err, "panel discovery failed");
                0
            }
        };
        let registry = match PanelRegistry::new(discovered) {
            Ok(registry) => registry,
            Err(err) => {
                error!(
                    target: LOG_TARGET,
                    selector = %self.config.markup.panel_selector,
                    "{err}"
                );
                return Err(err);
            }
        };

        self.indicators = match self.backend.indicators().discover() {
            Ok(count) => count,
            Err(err) => {
                warn!(target: LOG_TARGET, error = %err, "indicator discovery failed");
                0
            }
        };
        self.registry = Some(registry);

        for index in 0..registry.len() {
            let flags = registry.flags_for(index);
            let result = self.backend.panels().set_flags(index, flags);
            self.check_backend(result, "set_flags", index);
        }
        let current = registry.current();
        let result = self.backend.indicators().sync(current);
        self.check_backend(result, "sync_indicators", current);
        let animated = self.entrance(current);

        info!(
            target: LOG_TARGET,
            panels = registry.len(),
            indicators = self.indicators,
            animated,
            "scroll controller initialized"
        );
        Ok(InitOutcome::Ready {
            panels: registry.len(),
        })
    }

    /// Start accepting input events.
    pub fn attach(&mut self) -> AttachOutcome {
        if !self.backend.environment().is_interactive() {
            return AttachOutcome::SkippedNonInteractive;
        }
        if self.registry.is_none() {
            trace!(target: LOG_TARGET, "attach before successful initialization");
            return AttachOutcome::NotInitialized;
        }
        if self.attached {
            return AttachOutcome::AlreadyAttached;
        }
        self.attached = true;
        debug!(target: LOG_TARGET, "input attached");
        AttachOutcome::Attached
    }

    /// Stop accepting input events and drop any half-finished gesture.
    ///
    /// An in-flight transition still settles. Returns `false` if the
    /// controller was not attached.
    pub fn detach(&mut self) -> bool {
        if !self.attached {
            return false;
        }
        self.attached = false;
        self.normalizer.reset();
        debug!(target: LOG_TARGET, in_flight = self.in_flight.is_some(), "input detached");
        true
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Feed one raw input event.
    pub fn handle_event(&mut self, event: &Event) -> EventDispatch {
        if !self.attached {
            trace!(target: LOG_TARGET, reason = IgnoredReason::Detached.as_str(), "event ignored");
            return EventDispatch::detached();
        }
        let normalized = self.normalizer.process(event);
        let outcome = normalized.intent.map(|intent| self.navigate(intent));
        if matches!(event, Event::Touch(_)) && outcome.is_some_and(|o| o.is_accepted()) {
            self.normalizer.consume_gesture();
        }
        EventDispatch {
            prevent_default: normalized.prevent_default,
            intent: normalized.intent,
            outcome,
        }
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Transition to panel `index`.
    pub fn scroll_to_panel(&mut self, index: usize) -> TransitionOutcome {
        self.request(index, IgnoredReason::AlreadyActive)
    }

    /// Transition to the next panel. No-op on the last one.
    pub fn go_to_next_section(&mut self) -> TransitionOutcome {
        self.navigate(Intent::Advance)
    }

    /// Transition to the previous panel. No-op on the first one.
    pub fn go_to_prev_section(&mut self) -> TransitionOutcome {
        self.navigate(Intent::Retreat)
    }

    fn navigate(&mut self, intent: Intent) -> TransitionOutcome {
        let Some(registry) = self.registry else {
            return Self::ignore(IgnoredReason::NotInitialized, None);
        };
        self.request(registry.target_for(intent), IgnoredReason::AtBoundary)
    }

    fn request(&mut self, target: usize, unchanged: IgnoredReason) -> TransitionOutcome {
        let Some(registry) = self.registry else {
            return Self::ignore(IgnoredReason::NotInitialized, Some(target));
        };
        if !registry.contains(target) {
            return Self::ignore(IgnoredReason::OutOfRange, Some(target));
        }
        let now = self.backend.clock().now_mono();
        if let Err(rejection) = self.gate.check(now) {
            return Self::ignore(rejection.into(), Some(target));
        }
        if target == registry.current() {
            return Self::ignore(unchanged, Some(target));
        }
        self.execute(registry, target, now)
    }

    fn ignore(reason: IgnoredReason, target: Option<usize>) -> TransitionOutcome {
        trace!(target: LOG_TARGET, reason = reason.as_str(), ?target, "navigation ignored");
        TransitionOutcome::Ignored(reason)
    }

    fn execute(
        &mut self,
        mut registry: PanelRegistry,
        target: usize,
        now: Duration,
    ) -> TransitionOutcome {
        if let Err(rejection) = self.gate.try_acquire(now) {
            return Self::ignore(rejection.into(), Some(target));
        }
        let Some(from) = registry.set_current(target) else {
            self.gate.release();
            return Self::ignore(IgnoredReason::OutOfRange, Some(target));
        };
        self.registry = Some(registry);
        self.sequence += 1;
        let sequence = self.sequence;

        let _span = tracing::debug_span!(
            "panelsnap.transition",
            sequence,
            from,
            to = target,
        )
        .entered();

        for index in (0..registry.len()).filter(|&i| i != target) {
            let result = self.backend.panels().set_flags(index, PanelFlags::empty());
            self.check_backend(result, "set_flags", index);
            if self.config.clear_stale_animations {
                let result = self
                    .backend
                    .panels()
                    .clear_animations(index, &self.config.vocabulary);
                self.check_backend(result, "clear_animations", index);
            }
        }
        let result = self.backend.panels().set_flags(target, PanelFlags::TARGET);
        self.check_backend(result, "set_flags", target);

        let result = self.backend.indicators().sync(target);
        self.check_backend(result, "sync_indicators", target);

        let result = self.backend.panels().document_top(target);
        let scroll_top = self.check_backend(result, "document_top", target);
        if let Some(top) = scroll_top {
            let result = self.backend.viewport().scroll_to(top, ScrollBehavior::Smooth);
            self.check_backend(result, "scroll_to", target);
        }

        let deadline = now.saturating_add(self.config.transition_duration);
        self.in_flight = Some(InFlight {
            sequence,
            index: target,
            started_at: now,
            deadline,
        });

        debug!(
            target: LOG_TARGET,
            sequence,
            from,
            to = target,
            scroll_top,
            deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
            "transition started"
        );
        TransitionOutcome::Accepted(TransitionRecord {
            sequence,
            from,
            to: target,
            scroll_top,
            deadline,
        })
    }

    // -----------------------------------------------------------------------
    // Settling
    // -----------------------------------------------------------------------

    /// Settle the in-flight transition if its deadline has passed.
    pub fn tick(&mut self) -> Option<SettleRecord> {
        let in_flight = self.in_flight?;
        let now = self.backend.clock().now_mono();
        if now < in_flight.deadline {
            return None;
        }
        Some(self.settle(SettleTrigger::Deadline))
    }

    /// The viewport finished moving.
    ///
    /// Settles the in-flight transition under
    /// [`UnlockPolicy::MotionCompleteOrTimeout`], provided at least the
    /// cooldown has passed since the transition started. Earlier signals
    /// belong to a previous motion and are ignored.
    pub fn motion_complete(&mut self) -> Option<SettleRecord> {
        let in_flight = self.in_flight?;
        if self.config.unlock_policy != UnlockPolicy::MotionCompleteOrTimeout {
            return None;
        }
        let elapsed = self
            .backend
            .clock()
            .now_mono()
            .saturating_sub(in_flight.started_at);
        if elapsed < self.config.cooldown {
            trace!(
                target: LOG_TARGET,
                sequence = in_flight.sequence,
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                "motion complete signal too early"
            );
            return None;
        }
        Some(self.settle(SettleTrigger::MotionComplete))
    }

    /// Unconditionally settle the in-flight transition, as if its deadline
    /// had passed. Used by hosts tearing down with a pending timer.
    pub fn settle_now(&mut self) -> Option<SettleRecord> {
        self.in_flight?;
        Some(self.settle(SettleTrigger::Deadline))
    }

    fn settle(&mut self, trigger: SettleTrigger) -> SettleRecord {
        let record = match self.in_flight.take() {
            Some(in_flight) => {
                self.gate.release();
                let animated = self.entrance(in_flight.index);
                SettleRecord {
                    sequence: in_flight.sequence,
                    index: in_flight.index,
                    trigger,
                    animated,
                }
            }
            None => SettleRecord {
                sequence: self.sequence,
                index: self.current_index(),
                trigger,
                animated: 0,
            },
        };
        debug!(
            target: LOG_TARGET,
            sequence = record.sequence,
            index = record.index,
            trigger = ?record.trigger,
            animated = record.animated,
            "transition settled"
        );
        record
    }

    fn entrance(&mut self, index: usize) -> usize {
        let result = self
            .backend
            .panels()
            .trigger_entrance(index, &self.config.vocabulary);
        self.check_backend(result, "trigger_entrance", index)
            .unwrap_or(0)
    }

    fn check_backend<T>(
        &self,
        result: Result<T, B::Error>,
        operation: &'static str,
        index: usize,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    target: LOG_TARGET,
                    operation,
                    index,
                    error = %err,
                    "backend operation failed"
                );
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// When the host should call [`tick`](Self::tick) next.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.in_flight.map(|f| f.deadline)
    }

    /// Current panel index (0 before initialization).
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.registry.map_or(0, |r| r.current())
    }

    /// Number of panels (0 before initialization).
    #[must_use]
    pub fn panel_count(&self) -> usize {
        self.registry.map_or(0, |r| r.len())
    }

    /// Number of indicators found at initialization.
    #[must_use]
    pub fn indicator_count(&self) -> usize {
        self.indicators
    }

    /// Whether a transition holds the lock.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        self.gate.is_locked()
    }

    /// Sequence number of the in-flight transition, if any.
    #[must_use]
    pub fn in_flight_sequence(&self) -> Option<u64> {
        self.in_flight.map(|f| f.sequence)
    }

    /// Whether initialization succeeded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.registry.is_some()
    }

    /// Whether input events are accepted.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    /// Shared access to the backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelsnap_backend::mock::{MOCK_PANEL_HEIGHT, MockBackend};
    use panelsnap_core::event::{KeyCode, KeyEvent, TouchEvent, WheelEvent};

    fn ready(panels: usize) -> ScrollController<MockBackend> {
        ready_with(panels, SnapConfig::default())
    }

    fn ready_with(panels: usize, config: SnapConfig) -> ScrollController<MockBackend> {
        let mut c = ScrollController::new(MockBackend::new(panels), config).unwrap();
        c.initialize().unwrap();
        c.attach();
        c
    }

    fn advance(c: &ScrollController<MockBackend>, ms: u64) {
        c.backend().mock_clock().advance_ms(ms);
    }

    fn wheel(delta: f64) -> Event {
        Event::Wheel(WheelEvent::new(delta))
    }

    // --- Construction / lifecycle ---

    #[test]
    fn invalid_config_is_rejected() {
        let config = SnapConfig::default().with_transition_duration(Duration::ZERO);
        let err = ScrollController::new(MockBackend::new(3), config).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn initialize_activates_first_panel() {
        let c = ready(4);
        assert_eq!(c.panel_count(), 4);
        assert_eq!(c.current_index(), 0);
        assert!(!c.is_transitioning());
        let backend = c.backend();
        assert_eq!(backend.panel_state().active(), vec![0]);
        assert_eq!(backend.panel_state().flags[0], PanelFlags::TARGET);
        assert_eq!(backend.indicator_state().active_indices(), vec![0]);
        assert_eq!(backend.panel_state().entrances, vec![1, 0, 0, 0]);
        assert!(backend.viewport_state().commands.is_empty());
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut c = ready(3);
        assert_eq!(c.initialize(), Ok(InitOutcome::Ready { panels: 3 }));
        assert_eq!(c.backend().panel_state().discover_calls, 1);
    }

    #[test]
    fn zero_panels_fail_and_stay_inert() {
        let mut c = ScrollController::new(MockBackend::new(0), SnapConfig::default()).unwrap();
        assert_eq!(c.initialize(), Err(InitializationError::NoPanels));
        assert_eq!(c.attach(), AttachOutcome::NotInitialized);
        assert_eq!(
            c.scroll_to_panel(0),
            TransitionOutcome::Ignored(IgnoredReason::NotInitialized)
        );
        assert_eq!(
            c.go_to_next_section(),
            TransitionOutcome::Ignored(IgnoredReason::NotInitialized)
        );
        assert!(!c.is_transitioning());
    }

    #[test]
    fn discovery_failure_counts_as_no_panels() {
        let mut backend = MockBackend::new(3);
        backend.fail_operation("discover");
        let mut c = ScrollController::new(backend, SnapConfig::default()).unwrap();
        assert_eq!(c.initialize(), Err(InitializationError::NoPanels));
    }

    #[test]
    fn non_interactive_host_skips_everything() {
        let mut c = ScrollController::new(MockBackend::new(3).non_interactive(), SnapConfig::default())
            .unwrap();
        assert_eq!(c.initialize(), Ok(InitOutcome::Skipped));
        assert_eq!(c.attach(), AttachOutcome::SkippedNonInteractive);
        assert!(!c.detach());
        assert_eq!(c.backend().panel_state().discover_calls, 0);
        assert_eq!(
            c.scroll_to_panel(1),
            TransitionOutcome::Ignored(IgnoredReason::NotInitialized)
        );
    }

    #[test]
    fn attach_and_detach_are_idempotent() {
        let mut c = ready(3);
        assert!(c.is_attached());
        assert_eq!(c.attach(), AttachOutcome::AlreadyAttached);
        assert!(c.detach());
        assert!(!c.detach());
        assert_eq!(c.attach(), AttachOutcome::Attached);
    }

    // --- Transition executor ---

    #[test]
    fn accepted_transition_updates_everything() {
        let mut c = ready(5);
        let outcome = c.scroll_to_panel(2);
        let record = *outcome.accepted().unwrap();
        assert_eq!(record.sequence, 1);
        assert_eq!((record.from, record.to), (0, 2));
        assert_eq!(record.scroll_top, Some(2.0 * MOCK_PANEL_HEIGHT));
        assert_eq!(record.deadline, Duration::from_millis(1000));

        assert_eq!(c.current_index(), 2);
        assert!(c.is_transitioning());
        let backend = c.backend();
        assert_eq!(backend.panel_state().active(), vec![2]);
        assert_eq!(backend.indicator_state().active_indices(), vec![2]);
        assert_eq!(backend.panel_state().cleared, vec![0, 1, 3, 4]);
        assert_eq!(
            backend.viewport_state().commands,
            vec![(2.0 * MOCK_PANEL_HEIGHT, ScrollBehavior::Smooth)]
        );
        // Entrance fires only on settle.
        assert_eq!(backend.panel_state().entrances[2], 0);
    }

    #[test]
    fn stale_animation_clearing_can_be_disabled() {
        let mut c = ready_with(3, SnapConfig::default().with_clear_stale_animations(false));
        c.scroll_to_panel(1);
        assert!(c.backend().panel_state().cleared.is_empty());
    }

    #[test]
    fn current_index_request_is_a_silent_noop() {
        let mut c = ready(3);
        assert_eq!(
            c.scroll_to_panel(0),
            TransitionOutcome::Ignored(IgnoredReason::AlreadyActive)
        );
        assert!(!c.is_transitioning());
        assert!(c.backend().viewport_state().commands.is_empty());
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut c = ready(3);
        assert_eq!(
            c.scroll_to_panel(3),
            TransitionOutcome::Ignored(IgnoredReason::OutOfRange)
        );
        assert_eq!(c.current_index(), 0);
    }

    #[test]
    fn locked_request_has_no_effect() {
        let mut c = ready(5);
        c.scroll_to_panel(1);
        advance(&c, 500);
        assert_eq!(
            c.scroll_to_panel(3),
            TransitionOutcome::Ignored(IgnoredReason::Locked)
        );
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.backend().panel_state().active(), vec![1]);
        assert_eq!(c.backend().indicator_state().active_indices(), vec![1]);
        assert_eq!(c.backend().viewport_state().commands.len(), 1);
    }

    #[test]
    fn boundaries_clamp_without_wrap() {
        let mut c = ready(2);
        assert_eq!(
            c.go_to_prev_section(),
            TransitionOutcome::Ignored(IgnoredReason::AtBoundary)
        );
        assert!(c.go_to_next_section().is_accepted());
        advance(&c, 1000);
        c.tick();
        assert_eq!(
            c.go_to_next_section(),
            TransitionOutcome::Ignored(IgnoredReason::AtBoundary)
        );
        assert_eq!(c.current_index(), 1);
    }

    #[test]
    fn backend_failures_do_not_wedge_the_lock() {
        let mut c = ready(3);
        c.backend_mut().fail_operation("scroll_to");
        c.backend_mut().fail_operation("set_active");
        c.backend_mut().fail_operation("trigger_entrance");
        assert!(c.scroll_to_panel(2).is_accepted());
        assert_eq!(c.current_index(), 2);
        advance(&c, 1000);
        let settled = c.tick().unwrap();
        assert_eq!(settled.animated, 0);
        assert!(!c.is_transitioning());
    }

    #[test]
    fn unmeasurable_target_skips_scroll() {
        let mut c = ready(3);
        c.backend_mut().fail_operation("document_top");
        let record = *c.scroll_to_panel(1).accepted().unwrap();
        assert_eq!(record.scroll_top, None);
        assert!(c.backend().viewport_state().commands.is_empty());
        assert!(c.is_transitioning());
    }

    // --- Settling ---

    #[test]
    fn tick_settles_at_deadline_and_fires_entrance() {
        let mut c = ready(3);
        c.scroll_to_panel(1);
        assert_eq!(c.next_deadline(), Some(Duration::from_millis(1000)));
        advance(&c, 999);
        assert_eq!(c.tick(), None);
        advance(&c, 1);
        let settled = c.tick().unwrap();
        assert_eq!(
            settled,
            SettleRecord {
                sequence: 1,
                index: 1,
                trigger: SettleTrigger::Deadline,
                animated: 1,
            }
        );
        assert!(!c.is_transitioning());
        assert_eq!(c.next_deadline(), None);
        assert_eq!(c.backend().panel_state().entrances, vec![1, 1, 0]);
        assert_eq!(c.tick(), None);
    }

    #[test]
    fn motion_complete_settles_early() {
        let mut c = ready_with(
            3,
            SnapConfig::default().with_unlock_policy(UnlockPolicy::MotionCompleteOrTimeout),
        );
        c.scroll_to_panel(1);
        advance(&c, 50);
        assert_eq!(c.motion_complete(), None, "before cooldown");
        advance(&c, 250);
        let settled = c.motion_complete().unwrap();
        assert_eq!(settled.trigger, SettleTrigger::MotionComplete);
        assert!(!c.is_transitioning());
        assert!(c.go_to_next_section().is_accepted());
    }

    #[test]
    fn timed_policy_ignores_motion_complete() {
        let mut c = ready_with(3, SnapConfig::default().with_unlock_policy(UnlockPolicy::Timed));
        c.scroll_to_panel(1);
        advance(&c, 600);
        assert_eq!(c.motion_complete(), None);
        assert!(c.is_transitioning());
    }

    #[test]
    fn default_config_holds_lock_for_full_duration() {
        let mut c = ready(3);
        c.scroll_to_panel(1);
        advance(&c, 999);
        assert_eq!(c.motion_complete(), None);
        assert_eq!(c.tick(), None);
        assert_eq!(
            c.scroll_to_panel(2).ignored_reason(),
            Some(IgnoredReason::Locked)
        );
        advance(&c, 1);
        assert_eq!(c.tick().map(|s| s.trigger), Some(SettleTrigger::Deadline));
    }

    #[test]
    fn motion_complete_without_transition_is_noop() {
        let mut c = ready(3);
        advance(&c, 5000);
        assert_eq!(c.motion_complete(), None);
    }

    #[test]
    fn settle_now_releases_pending_lock() {
        let mut c = ready(3);
        c.scroll_to_panel(2);
        assert_eq!(c.settle_now().map(|s| s.index), Some(2));
        assert!(!c.is_transitioning());
        assert_eq!(c.settle_now(), None);
    }

    #[test]
    fn cooldown_applies_after_fast_settle() {
        let config = SnapConfig::default()
            .with_cooldown(Duration::from_millis(200))
            .with_transition_duration(Duration::from_millis(100));
        let mut c = ready_with(4, config);
        c.scroll_to_panel(1);
        advance(&c, 100);
        c.tick().unwrap();
        assert!(matches!(
            c.go_to_next_section(),
            TransitionOutcome::Ignored(IgnoredReason::CoolingDown { .. })
        ));
        advance(&c, 100);
        assert!(c.go_to_next_section().is_accepted());
    }

    // --- Input dispatch ---

    #[test]
    fn detached_controller_ignores_input() {
        let mut c = ready(3);
        c.detach();
        let d = c.handle_event(&wheel(10.0));
        assert!(!d.prevent_default);
        assert_eq!(
            d.outcome,
            Some(TransitionOutcome::Ignored(IgnoredReason::Detached))
        );
        assert_eq!(c.current_index(), 0);
    }

    #[test]
    fn detached_controller_still_navigates_programmatically() {
        let mut c = ready(3);
        c.detach();
        assert!(c.go_to_next_section().is_accepted());
    }

    #[test]
    fn wheel_burst_yields_one_transition() {
        let config = SnapConfig::default().with_cooldown(Duration::from_millis(200));
        let mut c = ready_with(5, config);
        let mut accepted = 0;
        for _ in 0..3 {
            if c.handle_event(&wheel(100.0)).started_transition() {
                accepted += 1;
            }
            advance(&c, 20);
        }
        assert_eq!(accepted, 1);
        assert_eq!(c.current_index(), 1);
    }

    #[test]
    fn non_navigation_key_is_not_suppressed() {
        let mut c = ready(3);
        let d = c.handle_event(&Event::Key(KeyEvent::new(KeyCode::Tab)));
        assert!(!d.prevent_default);
        assert_eq!(d.outcome, None);
        let d = c.handle_event(&Event::Key(KeyEvent::new(KeyCode::PageDown)));
        assert!(d.prevent_default);
        assert!(d.started_transition());
    }

    #[test]
    fn accepted_swipe_consumes_the_gesture() {
        let mut c = ready_with(5, SnapConfig::default().with_transition_duration(Duration::from_millis(100)));
        c.handle_event(&Event::Touch(TouchEvent::start(600.0)));
        assert!(c.handle_event(&Event::Touch(TouchEvent::moved(540.0))).started_transition());
        advance(&c, 150);
        c.tick().unwrap();
        // Same finger keeps moving: no second transition.
        let d = c.handle_event(&Event::Touch(TouchEvent::moved(300.0)));
        assert_eq!(d.intent, None);
        assert_eq!(c.current_index(), 1);
        // A new gesture works again.
        c.handle_event(&Event::Touch(TouchEvent::end(300.0)));
        c.handle_event(&Event::Touch(TouchEvent::start(600.0)));
        assert!(c.handle_event(&Event::Touch(TouchEvent::moved(500.0))).started_transition());
        assert_eq!(c.current_index(), 2);
    }

    #[test]
    fn rejected_swipe_keeps_gesture_live() {
        let mut c = ready(5);
        c.scroll_to_panel(1);
        c.handle_event(&Event::Touch(TouchEvent::start(600.0)));
        let d = c.handle_event(&Event::Touch(TouchEvent::moved(540.0)));
        assert_eq!(
            d.outcome,
            Some(TransitionOutcome::Ignored(IgnoredReason::Locked))
        );
        advance(&c, 1000);
        c.tick();
        assert!(c.handle_event(&Event::Touch(TouchEvent::moved(530.0))).started_transition());
        assert_eq!(c.current_index(), 2);
    }

    #[test]
    fn sequence_numbers_increase() {
        let mut c = ready(4);
        let first = c.scroll_to_panel(1).accepted().map(|r| r.sequence);
        advance(&c, 1000);
        c.tick();
        let second = c.scroll_to_panel(3).accepted().map(|r| r.sequence);
        assert_eq!((first, second), (Some(1), Some(2)));
        assert_eq!(c.in_flight_sequence(), Some(2));
    }
}
