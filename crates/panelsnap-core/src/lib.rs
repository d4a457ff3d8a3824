#![forbid(unsafe_code)]

//! Core: input events, gesture normalization, gating, and panel state.
//!
//! # Role in panelsnap
//! `panelsnap-core` is the input and policy layer. It owns the canonical
//! event types, the normalizer that collapses wheel/touch/keyboard input into
//! a discrete navigation [`Intent`](gesture::Intent), the lock/cooldown gate,
//! and the small amount of panel bookkeeping the controller needs.
//!
//! # Primary responsibilities
//! - **Event**: canonical input events (wheel, touch, key).
//! - **InputNormalizer**: thresholds and direction mapping per channel.
//! - **TransitionGate**: at most one transition in flight, with a cooldown.
//! - **PanelRegistry**: fixed panel count and the current index.
//! - **SnapConfig**: every tunable, with validation and optional loading.
//!
//! # How it fits in the system
//! Nothing in this crate reads a clock or touches a DOM. The runtime
//! (`panelsnap-runtime`) feeds it events and timestamps obtained through the
//! backend traits (`panelsnap-backend`), which keeps every decision here
//! deterministic and testable without a browser.

pub mod animation;
pub mod config;
pub mod environment;
pub mod error;
pub mod event;
pub mod gate;
pub mod gesture;
pub mod panel;

pub use animation::AnimationVocabulary;
pub use config::{MarkupConfig, SnapConfig, UnlockPolicy};
pub use environment::HostEnvironment;
pub use error::{ConfigError, InitializationError};
pub use event::{
    Event, KeyCode, KeyEvent, KeyEventKind, TouchEvent, TouchPhase, WheelDeltaMode, WheelEvent,
};
pub use gate::{GateRejection, TransitionGate};
pub use gesture::{GestureConfig, InputNormalizer, Intent, Normalized};
pub use panel::{PanelFlags, PanelRegistry};
