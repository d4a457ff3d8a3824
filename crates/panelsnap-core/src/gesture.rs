#![forbid(unsafe_code)]

//! Input normalization: collapses raw events into discrete navigation intent.
//!
//! [`InputNormalizer`] is a small stateful processor that turns wheel, touch
//! and keyboard [`Event`]s into at most one [`Intent`] each, and tells the
//! host whether the event's default browser action must be suppressed.
//!
//! # Channels
//!
//! - **Wheel**: the sign of the vertical delta picks the direction. Zero never
//!   qualifies; a configurable minimum magnitude may gate small deltas.
//! - **Touch**: a gesture starts on touch-start. Intent is classified once the
//!   finger has travelled strictly more than the touch threshold from the
//!   start point. Direction is inverse to finger movement (finger up means
//!   advance). A gesture that produced an accepted transition is consumed
//!   until the next touch-start.
//! - **Keyboard**: `ArrowDown`/`PageDown` advance, `ArrowUp`/`PageUp`
//!   retreat. Key releases and every other key are ignored.
//!
//! # Invariants
//!
//! 1. `process` returns at most one intent per event.
//! 2. Wheel and touch-move always request default suppression.
//! 3. Keyboard events request suppression only for the four navigation keys.
//! 4. After [`reset`](InputNormalizer::reset), no gesture is tracked.

use crate::event::{Event, KeyCode, KeyEvent, KeyEventKind, TouchEvent, TouchPhase, WheelEvent};

/// Default touch travel (CSS pixels) before a swipe is classified.
pub const DEFAULT_TOUCH_THRESHOLD: f64 = 50.0;

/// Discrete navigation intent, independent of input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Move to the next panel.
    Advance,
    /// Move to the previous panel.
    Retreat,
}

impl Intent {
    /// Target index for this intent, clamped to `[0, count - 1]`.
    ///
    /// Never wraps. Returns `current` unchanged at the boundaries.
    #[must_use]
    pub fn target(self, current: usize, count: usize) -> usize {
        let last = count.saturating_sub(1);
        match self {
            Self::Advance => current.saturating_add(1).min(last),
            Self::Retreat => current.saturating_sub(1).min(last),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds for input normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config-serde", serde(default))]
pub struct GestureConfig {
    /// Minimum absolute wheel delta (pixels) that qualifies (default: 0, meaning
    /// any non-zero delta).
    pub wheel_threshold: f64,
    /// Touch travel (pixels) that must be exceeded before a swipe classifies
    /// (default: 50).
    pub touch_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            wheel_threshold: 0.0,
            touch_threshold: DEFAULT_TOUCH_THRESHOLD,
        }
    }
}

/// Output of one normalization step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Normalized {
    /// Navigation intent, if the event expressed one.
    pub intent: Option<Intent>,
    /// Whether the host must call `preventDefault()` on the source event.
    pub prevent_default: bool,
}

impl Normalized {
    const fn pass() -> Self {
        Self {
            intent: None,
            prevent_default: false,
        }
    }

    const fn suppress(intent: Option<Intent>) -> Self {
        Self {
            intent,
            prevent_default: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct TouchTracker {
    start_y: f64,
    last_y: f64,
    consumed: bool,
}

// ---------------------------------------------------------------------------
// InputNormalizer
// ---------------------------------------------------------------------------

/// Stateful normalizer that maps raw events to navigation intent.
#[derive(Debug, Clone)]
pub struct InputNormalizer {
    config: GestureConfig,
    touch: Option<TouchTracker>,
}

impl InputNormalizer {
    /// Create a normalizer with the given thresholds.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            touch: None,
        }
    }

    /// Normalize one raw event.
    pub fn process(&mut self, event: &Event) -> Normalized {
        match event {
            Event::Wheel(wheel) => self.on_wheel(wheel),
            Event::Touch(touch) => self.on_touch(touch),
            Event::Key(key) => Self::on_key(key),
        }
    }

    /// Mark the current touch gesture as spent. Further moves in the same
    /// gesture produce no intent until the next touch-start.
    pub fn consume_gesture(&mut self) {
        if let Some(touch) = self.touch.as_mut() {
            touch.consumed = true;
        }
    }

    /// Whether a touch gesture is in progress.
    #[inline]
    #[must_use]
    pub fn is_tracking_touch(&self) -> bool {
        self.touch.is_some()
    }

    /// Signed travel of the current gesture (`last_y - start_y`), if any.
    #[must_use]
    pub fn touch_travel(&self) -> Option<f64> {
        self.touch.map(|t| t.last_y - t.start_y)
    }

    /// Drop all gesture state.
    pub fn reset(&mut self) {
        self.touch = None;
    }

    /// Get a reference to the current configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Update the configuration.
    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }
}

// ---------------------------------------------------------------------------
// Per-channel handlers
// ---------------------------------------------------------------------------

impl InputNormalizer {
    fn on_wheel(&self, wheel: &WheelEvent) -> Normalized {
        let delta = wheel.delta_y;
        if delta == 0.0 || !delta.is_finite() {
            return Normalized::suppress(None);
        }
        if wheel.pixel_delta().abs() < self.config.wheel_threshold {
            #[cfg(feature = "tracing")]
            tracing::trace!(delta, threshold = self.config.wheel_threshold, "wheel below threshold");
            return Normalized::suppress(None);
        }
        let intent = if delta > 0.0 {
            Intent::Advance
        } else {
            Intent::Retreat
        };
        Normalized::suppress(Some(intent))
    }

    fn on_touch(&mut self, touch: &TouchEvent) -> Normalized {
        match touch.phase {
            TouchPhase::Start => {
                self.touch = Some(TouchTracker {
                    start_y: touch.y,
                    last_y: touch.y,
                    consumed: false,
                });
                Normalized::pass()
            }
            TouchPhase::Move => {
                let Some(tracker) = self.touch.as_mut() else {
                    // Move without a start: begin tracking here.
                    self.touch = Some(TouchTracker {
                        start_y: touch.y,
                        last_y: touch.y,
                        consumed: false,
                    });
                    return Normalized::suppress(None);
                };
                tracker.last_y = touch.y;
                if tracker.consumed {
                    return Normalized::suppress(None);
                }
                let travel = touch.y - tracker.start_y;
                if travel.abs() <= self.config.touch_threshold {
                    return Normalized::suppress(None);
                }
                let intent = if touch.y < tracker.start_y {
                    Intent::Advance
                } else {
                    Intent::Retreat
                };
                #[cfg(feature = "tracing")]
                tracing::trace!(travel, ?intent, "touch swipe classified");
                Normalized::suppress(Some(intent))
            }
            TouchPhase::End | TouchPhase::Cancel => {
                self.touch = None;
                Normalized::pass()
            }
        }
    }

    fn on_key(key: &KeyEvent) -> Normalized {
        if key.kind == KeyEventKind::Release {
            return Normalized::pass();
        }
        match key.code {
            KeyCode::Down | KeyCode::PageDown => Normalized::suppress(Some(Intent::Advance)),
            KeyCode::Up | KeyCode::PageUp => Normalized::suppress(Some(Intent::Retreat)),
            _ => Normalized::pass(),
        }
    }
}
