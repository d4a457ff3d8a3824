//! End-to-end navigation scenarios against the in-memory page.
//!
//! Each test drives a `ScrollController<WebBackend>` the way a browser host
//! would: raw events in, clock advanced explicitly, smooth scrolls completed
//! by the viewport.

use core::time::Duration;

use panelsnap_backend::Viewport;
use panelsnap_core::{
    Event, InitializationError, KeyCode, KeyEvent, SnapConfig, TouchEvent, UnlockPolicy,
    WheelEvent,
};
use panelsnap_runtime::{AttachOutcome, IgnoredReason, InitOutcome, ScrollController, TransitionOutcome};
use panelsnap_web::{DEFAULT_PANEL_HEIGHT, PageSpec, WebBackend};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn controller(page: &PageSpec, config: SnapConfig) -> ScrollController<WebBackend> {
    let mut c = ScrollController::new(WebBackend::new(page), config).unwrap();
    c.initialize().unwrap();
    assert_eq!(c.attach(), AttachOutcome::Attached);
    c
}

fn advance(c: &mut ScrollController<WebBackend>, ms: u64) {
    c.backend_mut()
        .clock_mut()
        .advance(Duration::from_millis(ms));
}

fn wheel(delta: f64) -> Event {
    Event::Wheel(WheelEvent::new(delta))
}

#[test]
fn wheel_burst_produces_one_transition() {
    let config = SnapConfig::default().with_cooldown(Duration::from_millis(200));
    let mut c = controller(&PageSpec::new(5), config);

    let mut accepted = 0;
    for _ in 0..3 {
        let dispatch = c.handle_event(&wheel(100.0));
        assert!(dispatch.prevent_default);
        if dispatch.started_transition() {
            accepted += 1;
        }
        advance(&mut c, 20);
    }

    assert_eq!(accepted, 1);
    assert_eq!(c.current_index(), 1);
    assert_eq!(c.backend().viewport_state().commands().len(), 1);
}

#[test]
fn short_swipe_is_ignored_and_long_swipe_advances() {
    let mut c = controller(&PageSpec::new(3), SnapConfig::default());

    c.handle_event(&Event::Touch(TouchEvent::start(500.0)));
    let short = c.handle_event(&Event::Touch(TouchEvent::moved(470.0)));
    assert_eq!(short.outcome, None);
    c.handle_event(&Event::Touch(TouchEvent::end(470.0)));
    assert_eq!(c.current_index(), 0);

    c.handle_event(&Event::Touch(TouchEvent::start(500.0)));
    let long = c.handle_event(&Event::Touch(TouchEvent::moved(440.0)));
    assert!(long.started_transition());
    assert_eq!(c.current_index(), 1);
}

#[test]
fn swipe_down_retreats() {
    let mut c = controller(&PageSpec::new(3), SnapConfig::default());
    c.scroll_to_panel(2);
    c.settle_now();
    advance(&mut c, 2000);

    c.handle_event(&Event::Touch(TouchEvent::start(100.0)));
    let swipe = c.handle_event(&Event::Touch(TouchEvent::moved(200.0)));
    assert!(swipe.started_transition());
    assert_eq!(c.current_index(), 1);
}

#[test]
fn next_at_last_panel_is_a_no_op() {
    let mut c = controller(&PageSpec::new(5), SnapConfig::default());
    assert!(c.scroll_to_panel(4).is_accepted());
    c.settle_now();
    advance(&mut c, 2000);

    let before = c.backend().state_checksum();
    assert_eq!(
        c.go_to_next_section(),
        TransitionOutcome::Ignored(IgnoredReason::AtBoundary)
    );
    assert_eq!(c.current_index(), 4);
    assert_eq!(c.backend().state_checksum(), before);
}

#[test]
fn empty_page_fails_setup_and_ignores_navigation() {
    let mut c = ScrollController::new(WebBackend::new(&PageSpec::new(0)), SnapConfig::default())
        .unwrap();
    assert_eq!(c.initialize(), Err(InitializationError::NoPanels));
    assert_eq!(c.attach(), AttachOutcome::NotInitialized);
    assert_eq!(
        c.go_to_next_section(),
        TransitionOutcome::Ignored(IgnoredReason::NotInitialized)
    );
    assert_eq!(
        c.handle_event(&wheel(100.0)).outcome,
        Some(TransitionOutcome::Ignored(IgnoredReason::Detached))
    );
}

#[test]
fn prerendered_page_is_left_alone() {
    let mut c = ScrollController::new(
        WebBackend::new(&PageSpec::new(3).non_interactive()),
        SnapConfig::default(),
    )
    .unwrap();
    assert_eq!(c.initialize(), Ok(InitOutcome::Skipped));
    assert_eq!(c.attach(), AttachOutcome::SkippedNonInteractive);
    assert!(c.backend().panel_state().active().is_empty());
}

#[test]
fn keyboard_navigation_scrolls_viewport() {
    let mut c = controller(&PageSpec::new(3), SnapConfig::default());
    let dispatch = c.handle_event(&Event::Key(KeyEvent::new(KeyCode::PageDown)));
    assert!(dispatch.prevent_default);
    assert!(c.backend().viewport_state().is_moving());

    c.backend_mut().viewport_mut().complete_motion();
    assert_eq!(
        c.backend().viewport_state().scroll_offset(),
        DEFAULT_PANEL_HEIGHT
    );

    let other = c.handle_event(&Event::Key(KeyEvent::new(KeyCode::Char('a'))));
    assert!(!other.prevent_default);
    assert_eq!(other.outcome, None);
}

#[test]
fn motion_complete_unlocks_early() {
    let config = SnapConfig::default()
        .with_cooldown(Duration::from_millis(200))
        .with_unlock_policy(UnlockPolicy::MotionCompleteOrTimeout);
    let mut c = controller(&PageSpec::new(3), config);
    c.go_to_next_section();

    advance(&mut c, 300);
    c.backend_mut().viewport_mut().complete_motion();
    assert!(c.motion_complete().is_some());
    assert!(!c.is_transitioning());
    assert!(c.go_to_next_section().is_accepted());
}

#[test]
fn timed_policy_waits_for_deadline() {
    let config = SnapConfig::default()
        .with_cooldown(Duration::from_millis(200))
        .with_unlock_policy(UnlockPolicy::Timed);
    let mut c = controller(&PageSpec::new(3), config);
    c.go_to_next_section();

    advance(&mut c, 300);
    c.backend_mut().viewport_mut().complete_motion();
    assert_eq!(c.motion_complete(), None);
    assert!(c.is_transitioning());

    advance(&mut c, 700);
    assert!(c.tick().is_some());
    assert!(!c.is_transitioning());
}

#[test]
fn re_entry_restarts_entrance_animation() {
    let page = PageSpec::new(2).with_animation(1, "animate__fadeInUp");
    let mut c = controller(&page, SnapConfig::default());

    c.go_to_next_section();
    c.settle_now();
    advance(&mut c, 2000);
    c.go_to_prev_section();
    let element = &c.backend().panel_state().page()[1].animated[0];
    assert!(element.classes.is_empty());

    c.settle_now();
    advance(&mut c, 2000);
    c.go_to_next_section();
    c.settle_now();
    let panel = &c.backend().panel_state().page()[1];
    assert_eq!(panel.entrances, 2);
    assert!(panel.animated[0].has_class("animate__fadeInUp"));
}

#[test]
fn detached_controller_ignores_input_but_not_api() {
    let mut c = controller(&PageSpec::new(3), SnapConfig::default());
    assert!(c.detach());
    let dispatch = c.handle_event(&wheel(100.0));
    assert!(!dispatch.prevent_default);
    assert_eq!(c.current_index(), 0);
    assert!(c.scroll_to_panel(2).is_accepted());
}

proptest! {
    #[test]
    fn viewport_offset_stays_within_document(
        panels in 1usize..8,
        targets in prop::collection::vec(0usize..10, 0..30),
    ) {
        let mut c = controller(&PageSpec::new(panels), SnapConfig::default());
        let max = (panels - 1) as f64 * DEFAULT_PANEL_HEIGHT;
        for target in targets {
            c.scroll_to_panel(target);
            c.backend_mut().viewport_mut().complete_motion();
            c.settle_now();
            advance(&mut c, 1000);
            let offset = c.backend().viewport_state().scroll_offset();
            prop_assert!((0.0..=max).contains(&offset));
            prop_assert_eq!(offset, c.current_index() as f64 * DEFAULT_PANEL_HEIGHT);
        }
    }
}
