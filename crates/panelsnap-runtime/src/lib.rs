#![forbid(unsafe_code)]

//! Runtime: the panel-snapping scroll controller.
//!
//! # Role in panelsnap
//! `panelsnap-runtime` ties the pieces together. [`ScrollController`] takes
//! raw input events from the host, runs them through the input normalizer
//! and the transition gate from `panelsnap-core`, and executes accepted
//! transitions against any [`Backend`](panelsnap_backend::Backend).
//!
//! # Driving the controller
//! The controller never sleeps or schedules. A host:
//! 1. waits `config().init_delay`, then calls
//!    [`initialize`](ScrollController::initialize) and
//!    [`attach`](ScrollController::attach);
//! 2. forwards input through [`handle_event`](ScrollController::handle_event)
//!    and honors [`EventDispatch::prevent_default`];
//! 3. arms one timer for [`next_deadline`](ScrollController::next_deadline)
//!    and calls [`tick`](ScrollController::tick) when it fires;
//! 4. forwards the viewport's scroll-end signal to
//!    [`motion_complete`](ScrollController::motion_complete).
//!
//! Every entry point returns a record (accepted, or ignored with an
//! [`IgnoredReason`]) so hosts and tests can observe decisions directly.

pub mod controller;
pub mod outcome;

pub use controller::{LOG_TARGET, ScrollController};
pub use outcome::{
    AttachOutcome, EventDispatch, IgnoredReason, InitOutcome, SettleRecord, SettleTrigger,
    TransitionOutcome, TransitionRecord,
};
