#![forbid(unsafe_code)]

//! Log level policy for the scroll controller.
//!
//! - `error`: initialization found no panels.
//! - `warn`: a backend operation failed.
//! - `info`: setup succeeded.
//! - `debug`: transitions started and settled.
//! - `trace`: ignored requests (never above trace).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use panelsnap_backend::mock::{MockBackend, MockClock};
use panelsnap_core::SnapConfig;
use panelsnap_runtime::{LOG_TARGET, ScrollController};
use pretty_assertions::assert_eq;
use tracing_subscriber::layer::SubscriberExt;
use tracing_test::traced_test;

// ============================================================================
// Capture layer
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    message: String,
    fields: HashMap<String, String>,
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.get("message").cloned().unwrap_or_default();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message,
            fields,
        });
    }
}

fn with_captured_events<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(EventCapture {
            events: events.clone(),
        });
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
        .into_iter()
        .filter(|e| e.target == LOG_TARGET)
        .collect()
}

fn controller(panels: usize) -> ScrollController<MockBackend> {
    ScrollController::new(MockBackend::new(panels), SnapConfig::default()).unwrap()
}

fn clock(c: &ScrollController<MockBackend>) -> &MockClock {
    c.backend().mock_clock()
}

// ============================================================================
// tracing-test assertions
// ============================================================================

#[traced_test]
#[test]
fn missing_panels_are_logged_as_error() {
    let mut c = controller(0);
    assert!(c.initialize().is_err());
    assert!(logs_contain("no panel elements found"));
    assert!(logs_contain(".panel"));
}

#[traced_test]
#[test]
fn successful_setup_is_logged() {
    let mut c = controller(3);
    c.initialize().unwrap();
    assert!(logs_contain("scroll controller initialized"));
}

// ============================================================================
// Level policy
// ============================================================================

#[test]
fn levels_follow_policy() {
    let events = with_captured_events(|| {
        let mut c = controller(3);
        c.initialize().unwrap();
        c.attach();
        c.scroll_to_panel(1);
        c.scroll_to_panel(2);
        clock(&c).advance_ms(1000);
        c.tick();
    });

    let level_of = |message: &str| {
        events
            .iter()
            .find(|e| e.message == message)
            .map(|e| e.level)
    };
    assert_eq!(
        level_of("scroll controller initialized"),
        Some(tracing::Level::INFO)
    );
    assert_eq!(level_of("transition started"), Some(tracing::Level::DEBUG));
    assert_eq!(level_of("navigation ignored"), Some(tracing::Level::TRACE));
    assert_eq!(level_of("transition settled"), Some(tracing::Level::DEBUG));
    assert!(events.iter().all(|e| e.level != tracing::Level::WARN));
    assert!(events.iter().all(|e| e.level != tracing::Level::ERROR));
}

#[test]
fn ignored_requests_never_log_above_trace() {
    let events = with_captured_events(|| {
        let mut c = controller(2);
        c.initialize().unwrap();
        c.scroll_to_panel(0);
        c.scroll_to_panel(9);
        c.go_to_prev_section();
        c.scroll_to_panel(1);
        c.scroll_to_panel(0);
    });
    let ignored: Vec<_> = events
        .iter()
        .filter(|e| e.message == "navigation ignored")
        .collect();
    let reasons: Vec<&str> = ignored
        .iter()
        .filter_map(|e| e.fields.get("reason").map(String::as_str))
        .collect();
    assert_eq!(
        reasons,
        vec!["already_active", "out_of_range", "at_boundary", "locked"]
    );
    assert!(ignored.iter().all(|e| e.level == tracing::Level::TRACE));
}

#[test]
fn backend_failures_are_warnings() {
    let events = with_captured_events(|| {
        let mut c = controller(3);
        c.initialize().unwrap();
        c.backend_mut().fail_operation("scroll_to");
        c.scroll_to_panel(1);
    });
    let warning = events
        .iter()
        .find(|e| e.level == tracing::Level::WARN)
        .expect("a warning");
    assert_eq!(warning.message, "backend operation failed");
    assert_eq!(warning.fields.get("operation").map(String::as_str), Some("scroll_to"));
    assert!(
        warning
            .fields
            .get("error")
            .is_some_and(|e| e.contains("mock failure"))
    );
}

#[test]
fn oversized_deadline_saturates_in_log_fields() {
    let events = with_captured_events(|| {
        let config = SnapConfig::default().with_transition_duration(Duration::MAX);
        let mut c = ScrollController::new(MockBackend::new(3), config).unwrap();
        c.initialize().unwrap();
        c.scroll_to_panel(1);
    });
    let started = events
        .iter()
        .find(|e| e.message == "transition started")
        .expect("a transition");
    assert_eq!(
        started.fields.get("deadline_ms").map(String::as_str),
        Some(u64::MAX.to_string().as_str())
    );
}
