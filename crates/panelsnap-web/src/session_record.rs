#![forbid(unsafe_code)]

//! Deterministic session recording and replay.
//!
//! [`SessionRecorder`] drives a [`ScrollController`] over an in-memory
//! [`WebBackend`] and records every input event, programmatic navigation,
//! clock advance, and motion completion together with a checksum of the
//! visible page after each one. [`replay`] feeds the same records through a
//! fresh controller and reports the first checkpoint whose checksum differs.
//!
//! # Trace layout
//!
//! - **Header**: page shape (must be first).
//! - **Input**: timestamped raw input event.
//! - **Navigate**: timestamped programmatic navigation.
//! - **Tick**: explicit time advancement.
//! - **MotionComplete**: the viewport finished a smooth scroll.
//! - **Checkpoint**: page checksum with FNV-1a chaining.
//! - **Summary**: checkpoint count and final chain (must be last).
//!
//! # Determinism contract
//!
//! Time only advances through recorded timestamps and the page only changes
//! through the controller, so the same trace and configuration produce the
//! same checksums on every run.
//!
//! # Example
//!
//! ```ignore
//! let mut recorder = SessionRecorder::new(PageSpec::new(5), SnapConfig::default())?;
//! recorder.init()?;
//! recorder.push_event(0, Event::Wheel(WheelEvent::new(120.0)));
//! recorder.advance_time(1_000_000_000);
//!
//! let trace = recorder.finish();
//! let result = replay(SnapConfig::default(), &trace)?;
//! assert!(result.ok());
//! ```

use core::time::Duration;

use panelsnap_backend::{Backend, BackendClock};
use panelsnap_core::{ConfigError, Event, InitializationError, SnapConfig};
use panelsnap_runtime::{
    EventDispatch, InitOutcome, ScrollController, SettleRecord, TransitionOutcome,
};

use crate::{FNV_OFFSET_BASIS, PageSpec, WebBackend, fnv1a64_u64};

/// Schema version for session traces.
pub const SCHEMA_VERSION: &str = "panelsnap-trace-v1";

fn fnv1a64_pair(prev: u64, next: u64) -> u64 {
    let hash = FNV_OFFSET_BASIS;
    let hash = fnv1a64_u64(hash, prev);
    fnv1a64_u64(hash, next)
}

/// A programmatic navigation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    /// `go_to_next_section`.
    Next,
    /// `go_to_prev_section`.
    Prev,
    /// `scroll_to_panel(index)`.
    ToPanel(usize),
}

/// A single record in a session trace.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceRecord {
    /// Session header (must be first).
    Header { schema: String, page: PageSpec },
    /// A raw input event at a specific timestamp.
    Input { ts_ns: u64, event: Event },
    /// A programmatic navigation at a specific timestamp.
    Navigate { ts_ns: u64, command: NavCommand },
    /// Explicit time advancement.
    Tick { ts_ns: u64 },
    /// The viewport finished moving.
    MotionComplete { ts_ns: u64 },
    /// Page checkpoint with checksum.
    Checkpoint {
        step: u64,
        ts_ns: u64,
        checksum: u64,
        checksum_chain: u64,
    },
    /// Trace summary (must be last).
    Summary {
        total_checkpoints: u64,
        final_checksum_chain: u64,
    },
}

/// A complete recorded session trace.
#[derive(Debug, Clone)]
pub struct SessionTrace {
    pub records: Vec<TraceRecord>,
}

impl SessionTrace {
    /// Number of checkpoints in the trace.
    pub fn checkpoint_count(&self) -> u64 {
        self.records
            .iter()
            .filter(|r| matches!(r, TraceRecord::Checkpoint { .. }))
            .count() as u64
    }

    /// Extract the final checksum chain from the summary record.
    pub fn final_checksum_chain(&self) -> Option<u64> {
        self.records.iter().rev().find_map(|r| match r {
            TraceRecord::Summary {
                final_checksum_chain,
                ..
            } => Some(*final_checksum_chain),
            _ => None,
        })
    }
}

/// What applying one action record produced.
#[derive(Debug, Clone, Copy, PartialEq)]
enum StepEffect {
    Input(EventDispatch),
    Navigate(TransitionOutcome),
    Settle(Option<SettleRecord>),
}

fn set_time(controller: &mut ScrollController<WebBackend>, ts_ns: u64) {
    let now = Duration::from_nanos(ts_ns);
    if now > controller.backend().clock().now_mono() {
        controller.backend_mut().clock_mut().set(now);
    }
}

/// Apply one action record. Non-action records return `None`.
fn apply(controller: &mut ScrollController<WebBackend>, record: &TraceRecord) -> Option<StepEffect> {
    match record {
        TraceRecord::Input { ts_ns, event } => {
            set_time(controller, *ts_ns);
            Some(StepEffect::Input(controller.handle_event(event)))
        }
        TraceRecord::Navigate { ts_ns, command } => {
            set_time(controller, *ts_ns);
            let outcome = match command {
                NavCommand::Next => controller.go_to_next_section(),
                NavCommand::Prev => controller.go_to_prev_section(),
                NavCommand::ToPanel(index) => controller.scroll_to_panel(*index),
            };
            Some(StepEffect::Navigate(outcome))
        }
        TraceRecord::Tick { ts_ns } => {
            set_time(controller, *ts_ns);
            Some(StepEffect::Settle(controller.tick()))
        }
        TraceRecord::MotionComplete { ts_ns } => {
            set_time(controller, *ts_ns);
            controller.backend_mut().viewport_mut().complete_motion();
            Some(StepEffect::Settle(controller.motion_complete()))
        }
        TraceRecord::Header { .. }
        | TraceRecord::Checkpoint { .. }
        | TraceRecord::Summary { .. } => None,
    }
}

/// Records a session for deterministic replay.
///
/// Every action is followed by a checkpoint of the page state.
pub struct SessionRecorder {
    controller: ScrollController<WebBackend>,
    records: Vec<TraceRecord>,
    checksum_chain: u64,
    current_ts_ns: u64,
    step: u64,
}

impl SessionRecorder {
    /// Create a recorder for a page of shape `page`.
    pub fn new(page: PageSpec, config: SnapConfig) -> Result<Self, ConfigError> {
        let controller = ScrollController::new(WebBackend::new(&page), config)?;
        Ok(Self {
            controller,
            records: vec![TraceRecord::Header {
                schema: SCHEMA_VERSION.to_string(),
                page,
            }],
            checksum_chain: 0,
            current_ts_ns: 0,
            step: 0,
        })
    }

    /// Initialize and attach the controller, then record the first
    /// checkpoint.
    pub fn init(&mut self) -> Result<InitOutcome, InitializationError> {
        let outcome = self.controller.initialize()?;
        self.controller.attach();
        self.record_checkpoint();
        Ok(outcome)
    }

    /// Record an input event at the given timestamp (nanoseconds since start).
    pub fn push_event(&mut self, ts_ns: u64, event: Event) -> Option<EventDispatch> {
        match self.record(TraceRecord::Input { ts_ns, event }) {
            Some(StepEffect::Input(dispatch)) => Some(dispatch),
            _ => None,
        }
    }

    /// Record a programmatic navigation at the given timestamp.
    pub fn navigate(&mut self, ts_ns: u64, command: NavCommand) -> Option<TransitionOutcome> {
        match self.record(TraceRecord::Navigate { ts_ns, command }) {
            Some(StepEffect::Navigate(outcome)) => Some(outcome),
            _ => None,
        }
    }

    /// Record a time advancement to `ts_ns`.
    pub fn advance_time(&mut self, ts_ns: u64) -> Option<SettleRecord> {
        match self.record(TraceRecord::Tick { ts_ns }) {
            Some(StepEffect::Settle(settle)) => settle,
            _ => None,
        }
    }

    /// Record the end of the pending smooth scroll at `ts_ns`.
    pub fn complete_motion(&mut self, ts_ns: u64) -> Option<SettleRecord> {
        match self.record(TraceRecord::MotionComplete { ts_ns }) {
            Some(StepEffect::Settle(settle)) => settle,
            _ => None,
        }
    }

    /// Finish recording and return the completed trace.
    pub fn finish(mut self) -> SessionTrace {
        self.records.push(TraceRecord::Summary {
            total_checkpoints: self.step,
            final_checksum_chain: self.checksum_chain,
        });
        SessionTrace {
            records: self.records,
        }
    }

    /// Access the underlying controller.
    pub fn controller(&self) -> &ScrollController<WebBackend> {
        &self.controller
    }

    fn record(&mut self, record: TraceRecord) -> Option<StepEffect> {
        let effect = apply(&mut self.controller, &record);
        if let TraceRecord::Input { ts_ns, .. }
        | TraceRecord::Navigate { ts_ns, .. }
        | TraceRecord::Tick { ts_ns }
        | TraceRecord::MotionComplete { ts_ns } = record
        {
            self.current_ts_ns = ts_ns;
        }
        self.records.push(record);
        self.record_checkpoint();
        effect
    }

    fn record_checkpoint(&mut self) {
        let checksum = self.controller.backend().state_checksum();
        let chain = fnv1a64_pair(self.checksum_chain, checksum);
        self.records.push(TraceRecord::Checkpoint {
            step: self.step,
            ts_ns: self.current_ts_ns,
            checksum,
            checksum_chain: chain,
        });
        self.checksum_chain = chain;
        self.step += 1;
    }
}

/// Result of replaying a session trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayResult {
    /// Total checkpoints replayed.
    pub total_checkpoints: u64,
    /// Final checksum chain from replay.
    pub final_checksum_chain: u64,
    /// First checkpoint where a checksum mismatch was detected, if any.
    pub first_mismatch: Option<ReplayMismatch>,
}

impl ReplayResult {
    /// Whether the replay produced identical checksums.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.first_mismatch.is_none()
    }
}

/// Description of a checksum mismatch during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayMismatch {
    /// Checkpoint where the mismatch occurred.
    pub step: u64,
    /// Expected checksum from the trace.
    pub expected: u64,
    /// Actual checksum from replay.
    pub actual: u64,
}

/// Errors that can occur during replay.
#[derive(Debug)]
pub enum ReplayError {
    /// The trace is missing a header record.
    MissingHeader,
    /// The trace was written by an incompatible schema.
    UnsupportedSchema(String),
    /// The replay configuration is invalid.
    Config(ConfigError),
    /// The replayed page could not be initialized.
    Initialization(InitializationError),
}

impl core::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "trace missing header record"),
            Self::UnsupportedSchema(schema) => write!(f, "unsupported trace schema: {schema}"),
            Self::Config(e) => write!(f, "config error: {e}"),
            Self::Initialization(e) => write!(f, "initialization error: {e}"),
        }
    }
}

impl std::error::Error for ReplayError {}

impl From<ConfigError> for ReplayError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<InitializationError> for ReplayError {
    fn from(e: InitializationError) -> Self {
        Self::Initialization(e)
    }
}

/// Replay a recorded session trace through a fresh controller.
///
/// Rebuilds the page from the header, then applies every action record in
/// order and compares each checkpoint against the recorded checksum.
pub fn replay(config: SnapConfig, trace: &SessionTrace) -> Result<ReplayResult, ReplayError> {
    let page = trace
        .records
        .first()
        .and_then(|r| match r {
            TraceRecord::Header { schema, page } => Some((schema, page)),
            _ => None,
        })
        .ok_or(ReplayError::MissingHeader)
        .and_then(|(schema, page)| {
            if schema == SCHEMA_VERSION {
                Ok(page)
            } else {
                Err(ReplayError::UnsupportedSchema(schema.clone()))
            }
        })?;

    let mut controller = ScrollController::new(WebBackend::new(page), config)?;
    controller.initialize()?;
    controller.attach();

    let mut replayed: u64 = 0;
    let mut checksum_chain: u64 = 0;
    let mut first_mismatch: Option<ReplayMismatch> = None;

    for record in &trace.records {
        if let TraceRecord::Checkpoint {
            step,
            checksum: expected,
            ..
        } = record
        {
            let actual = controller.backend().state_checksum();
            checksum_chain = fnv1a64_pair(checksum_chain, actual);
            if actual != *expected && first_mismatch.is_none() {
                first_mismatch = Some(ReplayMismatch {
                    step: *step,
                    expected: *expected,
                    actual,
                });
            }
            replayed += 1;
        } else {
            apply(&mut controller, record);
        }
    }

    Ok(ReplayResult {
        total_checkpoints: replayed,
        final_checksum_chain: checksum_chain,
        first_mismatch,
    })
}
