#![forbid(unsafe_code)]
#![doc = "Backend traits for panelsnap: platform abstraction for panels, viewport, indicators, and time."]
#![doc = ""]
#![doc = "This crate defines the boundary between the panelsnap runtime and platform-specific"]
#![doc = "implementations (the live DOM via `panelsnap-wasm`, an in-memory page via `panelsnap-web`)."]

use core::time::Duration;

use panelsnap_core::animation::AnimationVocabulary;
use panelsnap_core::environment::HostEnvironment;
use panelsnap_core::panel::PanelFlags;

#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;

/// Monotonic clock abstraction.
///
/// Browser backends use `performance.now()`; deterministic backends advance
/// time explicitly. The runtime never reads wall time directly; all time
/// flows through this trait.
pub trait BackendClock {
    /// Returns elapsed time since an unspecified epoch, monotonically increasing.
    fn now_mono(&self) -> Duration;
}

/// How the viewport moves to a new offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollBehavior {
    /// Animated scroll; completion is signalled asynchronously.
    #[default]
    Smooth,
    /// Jump immediately.
    Instant,
}

/// The ordered set of panel surfaces in the container scope.
///
/// Panels are discovered once. The count is fixed afterwards; indices passed
/// to the other methods are always `< count()`.
pub trait PanelSurface {
    /// Platform-specific error type.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Find the panel surfaces and return how many there are.
    fn discover(&mut self) -> Result<usize, Self::Error>;

    /// Number of panels found by the last `discover`.
    fn count(&self) -> usize;

    /// Replace the visual flags of panel `index`.
    fn set_flags(&mut self, index: usize, flags: PanelFlags) -> Result<(), Self::Error>;

    /// Remove every vocabulary class from the animated elements of panel
    /// `index`. Returns the number of elements touched.
    fn clear_animations(
        &mut self,
        index: usize,
        vocabulary: &AnimationVocabulary,
    ) -> Result<usize, Self::Error>;

    /// Start the entrance animations of panel `index`: each animated element
    /// gets the base class plus the effect it declares, if the effect is in
    /// the vocabulary. Returns the number of elements animated.
    fn trigger_entrance(
        &mut self,
        index: usize,
        vocabulary: &AnimationVocabulary,
    ) -> Result<usize, Self::Error>;

    /// Document-relative top offset of panel `index`, measured now.
    fn document_top(&self, index: usize) -> Result<f64, Self::Error>;
}

/// The scrollable viewport.
pub trait Viewport {
    /// Platform-specific error type.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Scroll so that the viewport top sits at `top`.
    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) -> Result<(), Self::Error>;

    /// Current vertical scroll offset.
    fn scroll_offset(&self) -> f64;
}

/// Position markers mirroring the current panel.
///
/// Indicators are optional: a page without any is valid, and their count
/// need not match the panel count.
pub trait IndicatorSet {
    /// Platform-specific error type.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Find the indicators and return how many there are.
    fn discover(&mut self) -> Result<usize, Self::Error>;

    /// Number of indicators found by the last `discover`.
    fn count(&self) -> usize;

    /// Mark indicator `index` active or inactive.
    fn set_active(&mut self, index: usize, active: bool) -> Result<(), Self::Error>;

    /// Make indicator `active` the only active one. Returns the number of
    /// indicators updated.
    fn sync(&mut self, active: usize) -> Result<usize, Self::Error> {
        let count = self.count();
        for index in 0..count {
            self.set_active(index, index == active)?;
        }
        Ok(count)
    }
}

/// Unified backend combining clock, panels, viewport, and indicators.
///
/// The `ScrollController` runtime is generic over this trait. Concrete
/// implementations:
/// - `panelsnap-wasm`: live DOM through `web-sys`.
/// - `panelsnap-web`: deterministic in-memory page for tests and replay.
pub trait Backend {
    /// Platform-specific error type shared across sub-traits.
    type Error: core::fmt::Debug + core::fmt::Display;

    /// Clock implementation.
    type Clock: BackendClock;

    /// Panel surface implementation.
    type Panels: PanelSurface<Error = Self::Error>;

    /// Viewport implementation.
    type Viewport: Viewport<Error = Self::Error>;

    /// Indicator implementation.
    type Indicators: IndicatorSet<Error = Self::Error>;

    /// Where this backend runs. Non-interactive hosts get no wiring at all.
    fn environment(&self) -> HostEnvironment;

    /// Access the monotonic clock.
    fn clock(&self) -> &Self::Clock;

    /// Access the panel surfaces.
    fn panels(&mut self) -> &mut Self::Panels;

    /// Access the viewport.
    fn viewport(&mut self) -> &mut Self::Viewport;

    /// Access the indicators.
    fn indicators(&mut self) -> &mut Self::Indicators;
}
