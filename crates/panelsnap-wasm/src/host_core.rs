#![forbid(unsafe_code)]

//! Platform-independent half of the browser binding.
//!
//! [`HostCore`] owns the controller and the setup lifecycle, and maps raw
//! DOM event payloads to canonical events. It compiles natively so the
//! wiring can be tested without a browser; `wasm.rs` only moves data between
//! `web-sys` and this module.

use core::time::Duration;

use panelsnap_backend::{Backend, BackendClock};
use panelsnap_core::{
    ConfigError, Event, InitializationError, KeyCode, KeyEvent, KeyEventKind, SnapConfig,
    TouchEvent, TouchPhase, WheelDeltaMode, WheelEvent,
};
use panelsnap_runtime::{
    AttachOutcome, EventDispatch, InitOutcome, LOG_TARGET, ScrollController, SettleRecord,
};

/// Parse the optional JSON configuration handed over by JavaScript.
pub(crate) fn parse_config(json: Option<&str>) -> Result<SnapConfig, ConfigError> {
    match json.map(str::trim) {
        None | Some("") => SnapConfig::default().validated(),
        Some(json) => SnapConfig::from_json_str(json),
    }
}

/// Log level for the console subscriber. Unknown names fall back to `info`.
pub(crate) fn log_level(name: Option<&str>) -> tracing::Level {
    name.and_then(|n| n.trim().parse().ok())
        .unwrap_or(tracing::Level::INFO)
}

// ---------------------------------------------------------------------------
// Listener table
// ---------------------------------------------------------------------------

/// Object a listener is registered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListenerTarget {
    Window,
    Document,
}

/// Every DOM listener the controller installs while attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DomListener {
    Wheel,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
    KeyDown,
    ScrollEnd,
}

impl DomListener {
    pub(crate) const ALL: [Self; 7] = [
        Self::Wheel,
        Self::TouchStart,
        Self::TouchMove,
        Self::TouchEnd,
        Self::TouchCancel,
        Self::KeyDown,
        Self::ScrollEnd,
    ];

    pub(crate) const fn event_type(self) -> &'static str {
        match self {
            Self::Wheel => "wheel",
            Self::TouchStart => "touchstart",
            Self::TouchMove => "touchmove",
            Self::TouchEnd => "touchend",
            Self::TouchCancel => "touchcancel",
            Self::KeyDown => "keydown",
            Self::ScrollEnd => "scrollend",
        }
    }

    /// Listeners that may call `preventDefault()` must not be passive.
    pub(crate) const fn passive(self) -> bool {
        !matches!(self, Self::Wheel | Self::TouchMove | Self::KeyDown)
    }

    pub(crate) const fn target(self) -> ListenerTarget {
        match self {
            Self::ScrollEnd => ListenerTarget::Document,
            _ => ListenerTarget::Window,
        }
    }

    pub(crate) const fn touch_phase(self) -> Option<TouchPhase> {
        match self {
            Self::TouchStart => Some(TouchPhase::Start),
            Self::TouchMove => Some(TouchPhase::Move),
            Self::TouchEnd => Some(TouchPhase::End),
            Self::TouchCancel => Some(TouchPhase::Cancel),
            _ => None,
        }
    }
}

/// Raw payload extracted from a DOM event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum DomInput<'a> {
    Wheel { delta_y: f64, delta_mode: u32 },
    /// `client_y` of the first touch point, when the event has one.
    Touch { phase: TouchPhase, client_y: Option<f64> },
    Key { key: &'a str, repeat: bool },
    ScrollEnd,
}

impl DomInput<'_> {
    /// Canonical event for this payload. `None` for scroll end and for
    /// touches that carry no touch point.
    pub(crate) fn to_event(self) -> Option<Event> {
        match self {
            Self::Wheel {
                delta_y,
                delta_mode,
            } => Some(Event::Wheel(
                WheelEvent::new(delta_y).with_mode(WheelDeltaMode::from_dom(delta_mode)),
            )),
            Self::Touch { phase, client_y } => match (phase, client_y) {
                (TouchPhase::Start, Some(y)) => Some(Event::Touch(TouchEvent::start(y))),
                (TouchPhase::Move, Some(y)) => Some(Event::Touch(TouchEvent::moved(y))),
                (TouchPhase::End, y) => Some(Event::Touch(TouchEvent::end(y.unwrap_or(0.0)))),
                (TouchPhase::Cancel, _) => Some(Event::Touch(TouchEvent::cancel())),
                (TouchPhase::Start | TouchPhase::Move, None) => None,
            },
            Self::Key { key, repeat } => {
                let kind = if repeat {
                    KeyEventKind::Repeat
                } else {
                    KeyEventKind::Press
                };
                Some(Event::Key(
                    KeyEvent::new(KeyCode::from_dom_key(key)).with_kind(kind),
                ))
            }
            Self::ScrollEnd => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Host core
// ---------------------------------------------------------------------------

/// Setup lifecycle of a browser host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetupPhase {
    Idle,
    Waiting,
    Ready,
    Failed,
    Skipped,
    /// Torn down. Terminal: setup and attach are refused from here.
    Destroyed,
}

impl SetupPhase {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Waiting => "waiting",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Destroyed => "destroyed",
        }
    }
}

/// Controller plus setup lifecycle, independent of `web-sys`.
pub(crate) struct HostCore<B: Backend> {
    controller: ScrollController<B>,
    phase: SetupPhase,
    setup_error: Option<InitializationError>,
}

impl<B: Backend> HostCore<B> {
    pub(crate) fn new(backend: B, config: SnapConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            controller: ScrollController::new(backend, config)?,
            phase: SetupPhase::Idle,
            setup_error: None,
        })
    }

    /// Begin delayed setup. Returns the delay to wait before calling
    /// [`complete_setup`](Self::complete_setup), or `None` when nothing
    /// should be scheduled.
    pub(crate) fn start(&mut self) -> Option<Duration> {
        if self.phase != SetupPhase::Idle {
            return None;
        }
        if !self.controller.backend().environment().is_interactive() {
            self.phase = SetupPhase::Skipped;
            tracing::debug!(target: LOG_TARGET, "non-interactive host, setup not scheduled");
            return None;
        }
        self.phase = SetupPhase::Waiting;
        Some(self.controller.config().init_delay)
    }

    /// Initialize and attach. Safe to call without `start`. After
    /// [`teardown`](Self::teardown) this does nothing and reports `Skipped`.
    pub(crate) fn complete_setup(&mut self) -> Result<InitOutcome, InitializationError> {
        if self.phase == SetupPhase::Destroyed {
            tracing::debug!(target: LOG_TARGET, "host torn down, setup ignored");
            return Ok(InitOutcome::Skipped);
        }
        match self.controller.initialize() {
            Ok(InitOutcome::Ready { panels }) => {
                self.phase = SetupPhase::Ready;
                self.controller.attach();
                Ok(InitOutcome::Ready { panels })
            }
            Ok(InitOutcome::Skipped) => {
                self.phase = SetupPhase::Skipped;
                Ok(InitOutcome::Skipped)
            }
            Err(err) => {
                self.phase = SetupPhase::Failed;
                self.setup_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Detach, settle any in-flight transition and refuse further setup.
    pub(crate) fn teardown(&mut self) -> Option<SettleRecord> {
        self.phase = SetupPhase::Destroyed;
        self.controller.detach();
        self.controller.settle_now()
    }

    /// Console line for a failed setup that no `tracing` subscriber has
    /// recorded. `None` when setup did not fail or a subscriber is installed.
    pub(crate) fn unlogged_failure(&self, subscriber_installed: bool) -> Option<String> {
        if subscriber_installed {
            return None;
        }
        let err = self.setup_error.as_ref()?;
        Some(format!(
            "panelsnap: {err} (selector `{}`)",
            self.controller.config().markup.panel_selector
        ))
    }

    pub(crate) fn setup_error(&self) -> Option<&InitializationError> {
        self.setup_error.as_ref()
    }

    /// Feed one DOM payload. Returns the dispatch for input events and
    /// `None` for scroll end.
    pub(crate) fn on_input(&mut self, input: DomInput<'_>) -> Option<EventDispatch> {
        if input == DomInput::ScrollEnd {
            self.controller.motion_complete();
            return None;
        }
        input
            .to_event()
            .map(|event| self.controller.handle_event(&event))
    }

    /// The settle timer fired.
    pub(crate) fn on_timer(&mut self) -> Option<SettleRecord> {
        self.controller.tick()
    }

    /// How long until the settle timer should fire, if a transition is in
    /// flight.
    pub(crate) fn timer_delay(&self) -> Option<Duration> {
        let deadline = self.controller.next_deadline()?;
        let now = self.controller.backend().clock().now_mono();
        Some(deadline.saturating_sub(now))
    }

    /// `None` once torn down.
    pub(crate) fn attach(&mut self) -> Option<AttachOutcome> {
        if self.phase == SetupPhase::Destroyed {
            return None;
        }
        Some(self.controller.attach())
    }

    pub(crate) fn phase(&self) -> SetupPhase {
        self.phase
    }

    pub(crate) fn controller(&self) -> &ScrollController<B> {
        &self.controller
    }

    pub(crate) fn controller_mut(&mut self) -> &mut ScrollController<B> {
        &mut self.controller
    }
}
