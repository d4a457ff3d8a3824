#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! Browser hosts translate `wheel`, `touch*`, and `keydown` DOM events into
//! these values before handing them to the controller. All events derive
//! `Clone` and `PartialEq` for use in tests and session traces.
//!
//! # Design Notes
//!
//! - Wheel deltas keep the DOM sign convention: positive `delta_y` scrolls
//!   toward the end of the page.
//! - Touch events carry the `clientY` of the first touch point only; the
//!   controller does not track multi-finger gestures.
//! - `KeyEventKind` distinguishes auto-repeat from a fresh press so hosts can
//!   forward `KeyboardEvent.repeat` faithfully.

/// Approximate pixel height of one wheel "line" (`WheelEvent.DOM_DELTA_LINE`).
pub const LINE_HEIGHT_PX: f64 = 16.0;

/// Approximate pixel height of one wheel "page" (`WheelEvent.DOM_DELTA_PAGE`).
pub const PAGE_HEIGHT_PX: f64 = 800.0;

/// Canonical input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A mouse wheel or trackpad scroll.
    Wheel(WheelEvent),

    /// A touch lifecycle signal.
    Touch(TouchEvent),

    /// A keyboard event.
    Key(KeyEvent),
}

/// Unit of a wheel delta, mirroring `WheelEvent.deltaMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WheelDeltaMode {
    /// Delta is in pixels (mode `0`).
    #[default]
    Pixel,
    /// Delta is in lines (mode `1`).
    Line,
    /// Delta is in pages (mode `2`).
    Page,
}

impl WheelDeltaMode {
    /// Map a DOM `deltaMode` value. Unknown values fall back to pixels.
    #[must_use]
    pub const fn from_dom(mode: u32) -> Self {
        match mode {
            1 => Self::Line,
            2 => Self::Page,
            _ => Self::Pixel,
        }
    }

    const fn scale(self) -> f64 {
        match self {
            Self::Pixel => 1.0,
            Self::Line => LINE_HEIGHT_PX,
            Self::Page => PAGE_HEIGHT_PX,
        }
    }
}

/// A vertical wheel event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Raw vertical delta as reported by the host.
    pub delta_y: f64,
    /// Unit of `delta_y`.
    pub mode: WheelDeltaMode,
}

impl WheelEvent {
    /// Create a pixel-mode wheel event.
    #[must_use]
    pub const fn new(delta_y: f64) -> Self {
        Self {
            delta_y,
            mode: WheelDeltaMode::Pixel,
        }
    }

    /// Set the delta unit.
    #[must_use]
    pub const fn with_mode(mut self, mode: WheelDeltaMode) -> Self {
        self.mode = mode;
        self
    }

    /// Delta converted to approximate pixels. Used only for magnitude checks;
    /// direction always comes from the raw sign.
    #[must_use]
    pub fn pixel_delta(&self) -> f64 {
        self.delta_y * self.mode.scale()
    }
}

/// Phase of a touch lifecycle signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    /// `touchstart`.
    Start,
    /// `touchmove`.
    Move,
    /// `touchend`.
    End,
    /// `touchcancel`.
    Cancel,
}

/// A single-point touch signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    /// Lifecycle phase.
    pub phase: TouchPhase,
    /// `clientY` of the first touch point, in CSS pixels.
    pub y: f64,
}

impl TouchEvent {
    /// A `touchstart` at `y`.
    #[must_use]
    pub const fn start(y: f64) -> Self {
        Self {
            phase: TouchPhase::Start,
            y,
        }
    }

    /// A `touchmove` to `y`.
    #[must_use]
    pub const fn moved(y: f64) -> Self {
        Self {
            phase: TouchPhase::Move,
            y,
        }
    }

    /// A `touchend` at `y`.
    #[must_use]
    pub const fn end(y: f64) -> Self {
        Self {
            phase: TouchPhase::End,
            y,
        }
    }

    /// A `touchcancel`.
    #[must_use]
    pub const fn cancel() -> Self {
        Self {
            phase: TouchPhase::Cancel,
            y: 0.0,
        }
    }
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key that was pressed.
    pub code: KeyCode,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Key codes for keyboard events.
///
/// Only the keys a landing page cares about are named; everything else is
/// carried as [`KeyCode::Char`] or [`KeyCode::Unidentified`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character key.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Escape key.
    Escape,
    /// Tab key.
    Tab,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page Up key.
    PageUp,
    /// Page Down key.
    PageDown,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Any key without a mapping above.
    Unidentified,
}

impl KeyCode {
    /// Map a DOM `KeyboardEvent.key` string.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "ArrowUp" => Self::Up,
            "ArrowDown" => Self::Down,
            "ArrowLeft" => Self::Left,
            "ArrowRight" => Self::Right,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Home" => Self::Home,
            "End" => Self::End,
            "Enter" => Self::Enter,
            "Escape" => Self::Escape,
            "Tab" => Self::Tab,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Unidentified,
                }
            }
        }
    }
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}
