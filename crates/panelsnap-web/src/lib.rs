#![forbid(unsafe_code)]

//! `panelsnap-web` provides a deterministic, host-driven page backend for
//! panelsnap.
//!
//! Design goals:
//! - **Host-driven time**: the embedding environment advances a monotonic
//!   clock explicitly.
//! - **Observable page**: panels, animated elements, indicators, and the
//!   viewport are plain data that tests and replay tooling can inspect.
//! - **Explicit motion**: a smooth scroll stays pending until the host
//!   completes it, which is where a browser would fire `scrollend`.
//!
//! The live browser binding lives in `panelsnap-wasm`. This crate drives the
//! same controller without a DOM, for tests, session replay, and hosts that
//! want the navigation logic without a browser.

pub mod session_record;

use core::time::Duration;
use std::collections::BTreeSet;

use panelsnap_backend::{
    Backend, BackendClock, IndicatorSet, PanelSurface, ScrollBehavior, Viewport,
};
use panelsnap_core::animation::AnimationVocabulary;
use panelsnap_core::environment::HostEnvironment;
use panelsnap_core::panel::PanelFlags;

/// Default panel (and viewport) height in CSS pixels.
pub const DEFAULT_PANEL_HEIGHT: f64 = 800.0;

/// Web backend error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebBackendError {
    /// A panel index outside the discovered range.
    NoSuchPanel(usize),
    /// An indicator index outside the discovered range.
    NoSuchIndicator(usize),
    /// The host made this operation fail.
    Injected(&'static str),
}

impl core::fmt::Display for WebBackendError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoSuchPanel(index) => write!(f, "no panel at index {index}"),
            Self::NoSuchIndicator(index) => write!(f, "no indicator at index {index}"),
            Self::Injected(operation) => write!(f, "injected failure: {operation}"),
        }
    }
}

impl std::error::Error for WebBackendError {}

// FNV-1a constants, shared with session_record.
pub(crate) const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

pub(crate) fn fnv1a64_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

pub(crate) fn fnv1a64_u64(hash: u64, v: u64) -> u64 {
    fnv1a64_bytes(hash, &v.to_le_bytes())
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

impl BackendClock for DeterministicClock {
    fn now_mono(&self) -> Duration {
        self.now
    }
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

/// An element inside a panel that declares an entrance effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimatedElement {
    /// Effect class the element asks for (its `data-animate` value).
    pub effect: String,
    /// Classes currently on the element.
    pub classes: BTreeSet<String>,
}

impl AnimatedElement {
    /// Element declaring `effect`, with no classes yet.
    #[must_use]
    pub fn new(effect: impl Into<String>) -> Self {
        Self {
            effect: effect.into(),
            classes: BTreeSet::new(),
        }
    }

    /// Whether the element carries `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
}

/// One full-screen panel of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePanel {
    /// Document-relative top offset.
    pub top: f64,
    /// Visual state.
    pub flags: PanelFlags,
    /// Animated descendants.
    pub animated: Vec<AnimatedElement>,
    /// How many times the entrance trigger ran.
    pub entrances: u32,
}

/// Panel surfaces of the in-memory page.
#[derive(Debug, Clone, Default)]
pub struct WebPanels {
    page: Vec<PagePanel>,
    discovered: usize,
    failing: Vec<&'static str>,
}

impl WebPanels {
    fn check(&self, operation: &'static str) -> Result<(), WebBackendError> {
        if self.failing.contains(&operation) {
            return Err(WebBackendError::Injected(operation));
        }
        Ok(())
    }

    fn panel_mut(&mut self, index: usize) -> Result<&mut PagePanel, WebBackendError> {
        if index >= self.discovered {
            return Err(WebBackendError::NoSuchPanel(index));
        }
        self.page
            .get_mut(index)
            .ok_or(WebBackendError::NoSuchPanel(index))
    }

    /// Every panel on the page, discovered or not.
    #[must_use]
    pub fn page(&self) -> &[PagePanel] {
        &self.page
    }

    /// Indices of panels carrying the active flag.
    #[must_use]
    pub fn active(&self) -> Vec<usize> {
        self.page
            .iter()
            .enumerate()
            .filter(|(_, p)| p.flags.contains(PanelFlags::ACTIVE))
            .map(|(i, _)| i)
            .collect()
    }
}

impl PanelSurface for WebPanels {
    type Error = WebBackendError;

    fn discover(&mut self) -> Result<usize, Self::Error> {
        self.check("discover")?;
        self.discovered = self.page.len();
        Ok(self.discovered)
    }

    fn count(&self) -> usize {
        self.discovered
    }

    fn set_flags(&mut self, index: usize, flags: PanelFlags) -> Result<(), Self::Error> {
        self.check("set_flags")?;
        self.panel_mut(index)?.flags = flags;
        Ok(())
    }

    fn clear_animations(
        &mut self,
        index: usize,
        vocabulary: &AnimationVocabulary,
    ) -> Result<usize, Self::Error> {
        self.check("clear_animations")?;
        let panel = self.panel_mut(index)?;
        for element in &mut panel.animated {
            for class in vocabulary.classes() {
                element.classes.remove(class);
            }
        }
        Ok(panel.animated.len())
    }

    fn trigger_entrance(
        &mut self,
        index: usize,
        vocabulary: &AnimationVocabulary,
    ) -> Result<usize, Self::Error> {
        self.check("trigger_entrance")?;
        let panel = self.panel_mut(index)?;
        panel.entrances += 1;
        let mut animated = 0;
        for element in &mut panel.animated {
            if let Some(classes) = vocabulary.entrance_classes(&element.effect) {
                for class in classes {
                    element.classes.insert(class.to_owned());
                }
                animated += 1;
            }
        }
        Ok(animated)
    }

    fn document_top(&self, index: usize) -> Result<f64, Self::Error> {
        self.check("document_top")?;
        if index >= self.discovered {
            return Err(WebBackendError::NoSuchPanel(index));
        }
        self.page
            .get(index)
            .map(|p| p.top)
            .ok_or(WebBackendError::NoSuchPanel(index))
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// A viewport movement requested by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCommand {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

/// Viewport of the in-memory page.
///
/// Instant scrolls land immediately. Smooth scrolls stay pending until
/// [`complete_motion`](Self::complete_motion) is called.
#[derive(Debug, Clone, Default)]
pub struct WebViewport {
    offset: f64,
    max_offset: f64,
    pending: Option<f64>,
    commands: Vec<ScrollCommand>,
    failing: Vec<&'static str>,
}

impl WebViewport {
    /// Land a pending smooth scroll. Returns `true` if one was pending.
    pub fn complete_motion(&mut self) -> bool {
        match self.pending.take() {
            Some(top) => {
                self.offset = top;
                true
            }
            None => false,
        }
    }

    /// Whether a smooth scroll is under way.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.pending.is_some()
    }

    /// Every command received, in order.
    #[must_use]
    pub fn commands(&self) -> &[ScrollCommand] {
        &self.commands
    }

    fn clamp(&self, top: f64) -> f64 {
        top.clamp(0.0, self.max_offset)
    }
}

impl Viewport for WebViewport {
    type Error = WebBackendError;

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) -> Result<(), Self::Error> {
        if self.failing.contains(&"scroll_to") {
            return Err(WebBackendError::Injected("scroll_to"));
        }
        self.commands.push(ScrollCommand { top, behavior });
        let top = self.clamp(top);
        match behavior {
            ScrollBehavior::Smooth => self.pending = Some(top),
            ScrollBehavior::Instant => {
                self.pending = None;
                self.offset = top;
            }
        }
        Ok(())
    }

    fn scroll_offset(&self) -> f64 {
        self.offset
    }
}

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Indicator markers of the in-memory page.
#[derive(Debug, Clone, Default)]
pub struct WebIndicators {
    available: usize,
    active: Vec<bool>,
    failing: Vec<&'static str>,
}

impl WebIndicators {
    /// Indices of active indicators.
    #[must_use]
    pub fn active(&self) -> Vec<usize> {
        self.active
            .iter()
            .enumerate()
            .filter(|(_, a)| **a)
            .map(|(i, _)| i)
            .collect()
    }
}

impl IndicatorSet for WebIndicators {
    type Error = WebBackendError;

    fn discover(&mut self) -> Result<usize, Self::Error> {
        self.active = vec![false; self.available];
        Ok(self.available)
    }

    fn count(&self) -> usize {
        self.active.len()
    }

    fn set_active(&mut self, index: usize, active: bool) -> Result<(), Self::Error> {
        if self.failing.contains(&"set_active") {
            return Err(WebBackendError::Injected("set_active"));
        }
        let slot = self
            .active
            .get_mut(index)
            .ok_or(WebBackendError::NoSuchIndicator(index))?;
        *slot = active;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Shape of an in-memory page: enough to rebuild it for replay.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSpec {
    /// Number of panels.
    pub panels: usize,
    /// Height of each panel and of the viewport.
    pub panel_height: f64,
    /// Number of indicators.
    pub indicators: usize,
    /// `(panel, effect)` pairs, one animated element each.
    pub animations: Vec<(usize, String)>,
    /// Whether the page is interactive.
    pub interactive: bool,
}

impl PageSpec {
    /// `panels` stacked panels of the default height with one indicator each.
    #[must_use]
    pub fn new(panels: usize) -> Self {
        Self {
            panels,
            panel_height: DEFAULT_PANEL_HEIGHT,
            indicators: panels,
            animations: Vec::new(),
            interactive: true,
        }
    }

    /// Set the panel height.
    #[must_use]
    pub fn with_panel_height(mut self, height: f64) -> Self {
        self.panel_height = height;
        self
    }

    /// Set the indicator count.
    #[must_use]
    pub fn with_indicators(mut self, count: usize) -> Self {
        self.indicators = count;
        self
    }

    /// Add an animated element declaring `effect` to `panel`.
    #[must_use]
    pub fn with_animation(mut self, panel: usize, effect: impl Into<String>) -> Self {
        self.animations.push((panel, effect.into()));
        self
    }

    /// Mark the page as non-interactive (prerendering).
    #[must_use]
    pub fn non_interactive(mut self) -> Self {
        self.interactive = false;
        self
    }
}

/// A host-driven in-memory page backend.
///
/// The host:
/// - advances time via [`Self::clock_mut`]
/// - completes smooth scrolls via [`Self::viewport_mut`]
/// - inspects panels, indicators, and the viewport through the accessors
#[derive(Debug, Clone)]
pub struct WebBackend {
    environment: HostEnvironment,
    clock: DeterministicClock,
    panels: WebPanels,
    viewport: WebViewport,
    indicators: WebIndicators,
}

impl WebBackend {
    /// Build a page from `layout`.
    #[must_use]
    pub fn new(layout: &PageSpec) -> Self {
        let height = layout.panel_height.max(0.0);
        let mut page: Vec<PagePanel> = (0..layout.panels)
            .map(|i| PagePanel {
                top: i as f64 * height,
                flags: PanelFlags::empty(),
                animated: Vec::new(),
                entrances: 0,
            })
            .collect();
        for (panel, effect) in &layout.animations {
            if let Some(p) = page.get_mut(*panel) {
                p.animated.push(AnimatedElement::new(effect.clone()));
            }
        }
        Self {
            environment: if layout.interactive {
                HostEnvironment::Browser
            } else {
                HostEnvironment::NonInteractive
            },
            clock: DeterministicClock::new(),
            panels: WebPanels {
                page,
                ..WebPanels::default()
            },
            viewport: WebViewport {
                max_offset: layout.panels.saturating_sub(1) as f64 * height,
                ..WebViewport::default()
            },
            indicators: WebIndicators {
                available: layout.indicators,
                ..WebIndicators::default()
            },
        }
    }

    /// Mutably access the clock.
    pub fn clock_mut(&mut self) -> &mut DeterministicClock {
        &mut self.clock
    }

    /// Read the panels.
    #[must_use]
    pub fn panel_state(&self) -> &WebPanels {
        &self.panels
    }

    /// Read the viewport.
    #[must_use]
    pub fn viewport_state(&self) -> &WebViewport {
        &self.viewport
    }

    /// Mutably access the viewport (to complete motion).
    pub fn viewport_mut(&mut self) -> &mut WebViewport {
        &mut self.viewport
    }

    /// Read the indicators.
    #[must_use]
    pub fn indicator_state(&self) -> &WebIndicators {
        &self.indicators
    }

    /// Make the named operation fail from now on.
    pub fn fail_operation(&mut self, operation: &'static str) {
        self.panels.failing.push(operation);
        self.viewport.failing.push(operation);
        self.indicators.failing.push(operation);
    }

    /// FNV-1a checksum of everything visible on the page: panel flags,
    /// entrance counts, animation classes, indicator states, and the
    /// viewport offset.
    #[must_use]
    pub fn state_checksum(&self) -> u64 {
        let mut hash = FNV_OFFSET_BASIS;
        for panel in &self.panels.page {
            hash = fnv1a64_bytes(hash, &[panel.flags.bits()]);
            hash = fnv1a64_u64(hash, u64::from(panel.entrances));
            for element in &panel.animated {
                for class in &element.classes {
                    hash = fnv1a64_bytes(hash, class.as_bytes());
                    hash = fnv1a64_bytes(hash, &[0]);
                }
                hash = fnv1a64_bytes(hash, &[0xff]);
            }
        }
        for &active in &self.indicators.active {
            hash = fnv1a64_bytes(hash, &[u8::from(active)]);
        }
        hash = fnv1a64_u64(hash, self.viewport.offset.to_bits());
        hash = fnv1a64_bytes(hash, &[u8::from(self.viewport.pending.is_some())]);
        hash
    }
}

impl Backend for WebBackend {
    type Error = WebBackendError;

    type Clock = DeterministicClock;
    type Panels = WebPanels;
    type Viewport = WebViewport;
    type Indicators = WebIndicators;

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

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn discovered(layout: &PageSpec) -> WebBackend {
        let mut backend = WebBackend::new(layout);
        backend.panels().discover().unwrap();
        backend.indicators().discover().unwrap();
        backend
    }

    #[test]
    fn deterministic_clock_advances_monotonically() {
        let mut c = DeterministicClock::new();
        assert_eq!(c.now_mono(), Duration::ZERO);

        c.advance(Duration::from_millis(10));
        assert_eq!(c.now_mono(), Duration::from_millis(10));

        // Saturation: don't panic or wrap.
        c.set(Duration::MAX);
        c.advance(Duration::from_secs(1));
        assert_eq!(c.now_mono(), Duration::MAX);
    }

    #[test]
    fn panels_are_stacked() {
        let backend = discovered(&PageSpec::new(3).with_panel_height(600.0));
        assert_eq!(backend.panels.count(), 3);
        assert_eq!(backend.panels.document_top(2).unwrap(), 1200.0);
        assert_eq!(
            backend.panels.document_top(3),
            Err(WebBackendError::NoSuchPanel(3))
        );
    }

    #[test]
    fn undiscovered_panels_reject_mutation() {
        let mut backend = WebBackend::new(&PageSpec::new(2));
        assert_eq!(
            backend.panels().set_flags(0, PanelFlags::ACTIVE),
            Err(WebBackendError::NoSuchPanel(0))
        );
    }

    #[test]
    fn entrance_adds_base_and_effect_then_clear_removes_them() {
        let layout = PageSpec::new(2)
            .with_animation(1, "animate__fadeInUp")
            .with_animation(1, "not-an-effect");
        let mut backend = discovered(&layout);
        let vocab = AnimationVocabulary::default();

        assert_eq!(backend.panels().trigger_entrance(1, &vocab).unwrap(), 1);
        let panel = &backend.panel_state().page()[1];
        assert_eq!(panel.entrances, 1);
        assert!(panel.animated[0].has_class("animate__animated"));
        assert!(panel.animated[0].has_class("animate__fadeInUp"));
        assert!(panel.animated[1].classes.is_empty());

        assert_eq!(backend.panels().clear_animations(1, &vocab).unwrap(), 2);
        assert!(backend.panel_state().page()[1].animated[0].classes.is_empty());
    }

    #[test]
    fn smooth_scroll_waits_for_completion() {
        let mut backend = discovered(&PageSpec::new(3));
        backend
            .viewport()
            .scroll_to(800.0, ScrollBehavior::Smooth)
            .unwrap();
        assert_eq!(backend.viewport_state().scroll_offset(), 0.0);
        assert!(backend.viewport_state().is_moving());
        assert!(backend.viewport_mut().complete_motion());
        assert_eq!(backend.viewport_state().scroll_offset(), 800.0);
        assert!(!backend.viewport_mut().complete_motion());
    }

    #[test]
    fn scroll_is_clamped_to_document() {
        let mut backend = discovered(&PageSpec::new(2));
        backend
            .viewport()
            .scroll_to(5000.0, ScrollBehavior::Instant)
            .unwrap();
        assert_eq!(backend.viewport_state().scroll_offset(), 800.0);
        assert_eq!(
            backend.viewport_state().commands(),
            &[ScrollCommand {
                top: 5000.0,
                behavior: ScrollBehavior::Instant
            }]
        );
    }

    #[test]
    fn indicators_may_be_fewer_than_panels() {
        let mut backend = discovered(&PageSpec::new(4).with_indicators(2));
        assert_eq!(backend.indicators().sync(3).unwrap(), 2);
        assert!(backend.indicator_state().active().is_empty());
        assert_eq!(
            backend.indicators().set_active(2, true),
            Err(WebBackendError::NoSuchIndicator(2))
        );
    }

    #[test]
    fn injected_failures_are_reported() {
        let mut backend = discovered(&PageSpec::new(2));
        backend.fail_operation("scroll_to");
        let err = backend
            .viewport()
            .scroll_to(0.0, ScrollBehavior::Smooth)
            .unwrap_err();
        assert_eq!(err.to_string(), "injected failure: scroll_to");
    }

    #[test]
    fn checksum_tracks_visible_state() {
        let mut backend = discovered(&PageSpec::new(3));
        let before = backend.state_checksum();
        assert_eq!(before, backend.clone().state_checksum());

        backend.panels().set_flags(1, PanelFlags::TARGET).unwrap();
        let flagged = backend.state_checksum();
        assert_ne!(before, flagged);

        backend.indicators().sync(1).unwrap();
        assert_ne!(flagged, backend.state_checksum());
    }

    #[test]
    fn non_interactive_spec_sets_environment() {
        let backend = WebBackend::new(&PageSpec::new(1).non_interactive());
        assert_eq!(backend.environment(), HostEnvironment::NonInteractive);
    }
}
