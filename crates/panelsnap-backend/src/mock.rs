#![forbid(unsafe_code)]

//! Minimal in-memory backend for controller tests.
//!
//! Every component records what was asked of it. Time only moves when a test
//! calls [`MockClock::advance`]. Any operation can be made to fail by name
//! with [`MockBackend::fail_operation`].

use core::cell::Cell;
use core::fmt;
use core::time::Duration;

use panelsnap_core::animation::AnimationVocabulary;
use panelsnap_core::environment::HostEnvironment;
use panelsnap_core::panel::PanelFlags;

use crate::{Backend, BackendClock, IndicatorSet, PanelSurface, ScrollBehavior, Viewport};

/// Panel height used to derive document offsets.
pub const MOCK_PANEL_HEIGHT: f64 = 800.0;

/// Error returned by failing mock operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockError(pub String);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mock failure: {}", self.0)
    }
}

impl std::error::Error for MockError {}

fn check(failing: &[&'static str], operation: &'static str) -> Result<(), MockError> {
    if failing.contains(&operation) {
        Err(MockError(operation.to_owned()))
    } else {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Manually advanced clock. Interior mutability lets tests move time through
/// a shared reference to the backend.
#[derive(Debug, Default)]
pub struct MockClock {
    now: Cell<Duration>,
}

impl MockClock {
    /// Move time forward.
    pub fn advance(&self, dt: Duration) {
        self.now.set(self.now.get().saturating_add(dt));
    }

    /// Move time forward by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Jump to an absolute time.
    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }
}

impl BackendClock for MockClock {
    fn now_mono(&self) -> Duration {
        self.now.get()
    }
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

/// Recording panel surface.
#[derive(Debug, Default)]
pub struct MockPanels {
    available: usize,
    failing: Vec<&'static str>,
    /// Flags per discovered panel.
    pub flags: Vec<PanelFlags>,
    /// Entrance trigger count per discovered panel.
    pub entrances: Vec<u32>,
    /// Panels whose animations were cleared, in call order.
    pub cleared: Vec<usize>,
    /// Number of `discover` calls.
    pub discover_calls: usize,
}

impl MockPanels {
    /// Indices of panels carrying the active flag.
    #[must_use]
    pub fn active(&self) -> Vec<usize> {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, f)| f.contains(PanelFlags::ACTIVE))
            .map(|(i, _)| i)
            .collect()
    }
}

impl PanelSurface for MockPanels {
    type Error = MockError;

    fn discover(&mut self) -> Result<usize, Self::Error> {
        self.discover_calls += 1;
        check(&self.failing, "discover")?;
        self.flags = vec![PanelFlags::empty(); self.available];
        self.entrances = vec![0; self.available];
        Ok(self.available)
    }

    fn count(&self) -> usize {
        self.flags.len()
    }

    fn set_flags(&mut self, index: usize, flags: PanelFlags) -> Result<(), Self::Error> {
        check(&self.failing, "set_flags")?;
        self.flags[index] = flags;
        Ok(())
    }

    fn clear_animations(
        &mut self,
        index: usize,
        _vocabulary: &AnimationVocabulary,
    ) -> Result<usize, Self::Error> {
        check(&self.failing, "clear_animations")?;
        self.cleared.push(index);
        Ok(1)
    }

    fn trigger_entrance(
        &mut self,
        index: usize,
        _vocabulary: &AnimationVocabulary,
    ) -> Result<usize, Self::Error> {
        check(&self.failing, "trigger_entrance")?;
        self.entrances[index] += 1;
        Ok(1)
    }

    fn document_top(&self, index: usize) -> Result<f64, Self::Error> {
        check(&self.failing, "document_top")?;
        Ok(index as f64 * MOCK_PANEL_HEIGHT)
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Viewport that jumps to every requested offset and records the request.
#[derive(Debug, Default)]
pub struct MockViewport {
    failing: Vec<&'static str>,
    offset: f64,
    /// Every `scroll_to` call, in order.
    pub commands: Vec<(f64, ScrollBehavior)>,
}

impl Viewport for MockViewport {
    type Error = MockError;

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) -> Result<(), Self::Error> {
        check(&self.failing, "scroll_to")?;
        self.offset = top;
        self.commands.push((top, behavior));
        Ok(())
    }

    fn scroll_offset(&self) -> f64 {
        self.offset
    }
}

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Recording indicator set.
#[derive(Debug, Default)]
pub struct MockIndicators {
    available: usize,
    failing: Vec<&'static str>,
    /// Active state per discovered indicator.
    pub active: Vec<bool>,
}

impl MockIndicators {
    /// Indices of active indicators.
    #[must_use]
    pub fn active_indices(&self) -> Vec<usize> {
        self.active
            .iter()
            .enumerate()
            .filter(|(_, a)| **a)
            .map(|(i, _)| i)
            .collect()
    }
}

impl IndicatorSet for MockIndicators {
    type Error = MockError;

    fn discover(&mut self) -> Result<usize, Self::Error> {
        check(&self.failing, "discover_indicators")?;
        self.active = vec![false; self.available];
        Ok(self.available)
    }

    fn count(&self) -> usize {
        self.active.len()
    }

    fn set_active(&mut self, index: usize, active: bool) -> Result<(), Self::Error> {
        check(&self.failing, "set_active")?;
        self.active[index] = active;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// In-memory backend with `panels` panels and as many indicators.
#[derive(Debug)]
pub struct MockBackend {
    environment: HostEnvironment,
    clock: MockClock,
    panels: MockPanels,
    viewport: MockViewport,
    indicators: MockIndicators,
}

impl MockBackend {
    /// Interactive backend exposing `panels` panels and as many indicators.
    #[must_use]
    pub fn new(panels: usize) -> Self {
        Self {
            environment: HostEnvironment::Browser,
            clock: MockClock::default(),
            panels: MockPanels {
                available: panels,
                ..MockPanels::default()
            },
            viewport: MockViewport::default(),
            indicators: MockIndicators {
                available: panels,
                ..MockIndicators::default()
            },
        }
    }

    /// Mark the host as non-interactive.
    #[must_use]
    pub fn non_interactive(mut self) -> Self {
        self.environment = HostEnvironment::NonInteractive;
        self
    }

    /// Override the indicator count.
    #[must_use]
    pub fn with_indicators(mut self, count: usize) -> Self {
        self.indicators.available = count;
        self
    }

    /// Make the named operation fail from now on.
    ///
    /// Names: `discover`, `set_flags`, `clear_animations`,
    /// `trigger_entrance`, `document_top`, `scroll_to`,
    /// `discover_indicators`, `set_active`.
    pub fn fail_operation(&mut self, operation: &'static str) {
        self.panels.failing.push(operation);
        self.viewport.failing.push(operation);
        self.indicators.failing.push(operation);
    }

    /// Shared access to the panels, for assertions.
    #[must_use]
    pub fn panel_state(&self) -> &MockPanels {
        &self.panels
    }

    /// Shared access to the viewport, for assertions.
    #[must_use]
    pub fn viewport_state(&self) -> &MockViewport {
        &self.viewport
    }

    /// Shared access to the indicators, for assertions.
    #[must_use]
    pub fn indicator_state(&self) -> &MockIndicators {
        &self.indicators
    }

    /// The clock, for advancing time through a shared reference.
    #[must_use]
    pub fn mock_clock(&self) -> &MockClock {
        &self.clock
    }
}

impl Backend for MockBackend {
    type Error = MockError;
    type Clock = MockClock;
    type Panels = MockPanels;
    type Viewport = MockViewport;
    type Indicators = MockIndicators;

    fn environment(&self) -> HostEnvironment {
        self.environment
    }

    fn clock(&self) -> &Self::Clock {
        &self.clock
    }

    fn panels(&mut self) -> &mut Self::Panels {
        &mut self.panels
    }

    fn viewport(&mut self) -> &mut Self::Viewport {
        &mut self.viewport
    }

    fn indicators(&mut self) -> &mut Self::Indicators {
        &mut self.indicators
    }
}
