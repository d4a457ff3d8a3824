#![forbid(unsafe_code)]

//! Structured records returned by every controller entry point.

use core::time::Duration;

use panelsnap_core::gate::GateRejection;
use panelsnap_core::gesture::Intent;

/// Deterministic reason why a navigation request had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    /// Initialization has not succeeded (or was skipped).
    NotInitialized,
    /// Input arrived while no listeners were attached.
    Detached,
    /// The requested index names no panel.
    OutOfRange,
    /// The requested index is already the current panel.
    AlreadyActive,
    /// Next/previous was requested at the first or last panel.
    AtBoundary,
    /// A transition is in flight.
    Locked,
    /// The last accepted transition was too recent.
    CoolingDown {
        /// Time left until requests are admitted again.
        remaining: Duration,
    },
}

impl IgnoredReason {
    /// Stable name used in log records and session traces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotInitialized => "not_initialized",
            Self::Detached => "detached",
            Self::OutOfRange => "out_of_range",
            Self::AlreadyActive => "already_active",
            Self::AtBoundary => "at_boundary",
            Self::Locked => "locked",
            Self::CoolingDown { .. } => "cooling_down",
        }
    }
}

impl From<GateRejection> for IgnoredReason {
    fn from(rejection: GateRejection) -> Self {
        match rejection {
            GateRejection::Locked => Self::Locked,
            GateRejection::CoolingDown { remaining } => Self::CoolingDown { remaining },
        }
    }
}

/// An accepted transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionRecord {
    /// Sequence number, starting at 1.
    pub sequence: u64,
    /// Panel left.
    pub from: usize,
    /// Panel entered.
    pub to: usize,
    /// Scroll offset requested from the viewport, if the target could be
    /// measured.
    pub scroll_top: Option<f64>,
    /// Monotonic time at which the lock is released at the latest.
    pub deadline: Duration,
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionOutcome {
    Accepted(TransitionRecord),
    Ignored(IgnoredReason),
}

impl TransitionOutcome {
    /// Whether a transition started.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// The accepted transition, if any.
    #[must_use]
    pub const fn accepted(&self) -> Option<&TransitionRecord> {
        match self {
            Self::Accepted(record) => Some(record),
            Self::Ignored(_) => None,
        }
    }

    /// Why the request was ignored, if it was.
    #[must_use]
    pub const fn ignored_reason(&self) -> Option<IgnoredReason> {
        match self {
            Self::Accepted(_) => None,
            Self::Ignored(reason) => Some(*reason),
        }
    }
}

/// Result of feeding one raw input event to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventDispatch {
    /// Whether the host must call `preventDefault()` on the source event.
    pub prevent_default: bool,
    /// Intent the event expressed, if any.
    pub intent: Option<Intent>,
    /// Navigation outcome. `None` when the event carried no intent.
    pub outcome: Option<TransitionOutcome>,
}

impl EventDispatch {
    pub(crate) const fn detached() -> Self {
        Self {
            prevent_default: false,
            intent: None,
            outcome: Some(TransitionOutcome::Ignored(IgnoredReason::Detached)),
        }
    }

    /// Whether this event started a transition.
    #[must_use]
    pub fn started_transition(&self) -> bool {
        self.outcome.is_some_and(|o| o.is_accepted())
    }
}

/// What released the lock of a settled transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettleTrigger {
    /// The transition duration elapsed.
    Deadline,
    /// The viewport reported that its motion finished.
    MotionComplete,
}

/// A settled transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleRecord {
    pub sequence: u64,
    pub index: usize,
    pub trigger: SettleTrigger,
    /// Number of animated elements whose entrance was restarted.
    pub animated: usize,
}

/// Result of [`ScrollController::initialize`](crate::ScrollController::initialize).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// Panels were discovered (now or by an earlier call).
    Ready { panels: usize },
    /// Non-interactive host: nothing was done.
    Skipped,
}

/// Result of [`ScrollController::attach`](crate::ScrollController::attach).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Attached,
    AlreadyAttached,
    SkippedNonInteractive,
    NotInitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_rejections_map_to_reasons() {
        assert_eq!(
            IgnoredReason::from(GateRejection::Locked),
            IgnoredReason::Locked
        );
        let remaining = Duration::from_millis(40);
        assert_eq!(
            IgnoredReason::from(GateRejection::CoolingDown { remaining }),
            IgnoredReason::CoolingDown { remaining }
        );
    }

    #[test]
    fn reason_names_are_distinct() {
        let reasons = [
            IgnoredReason::NotInitialized,
            IgnoredReason::Detached,
            IgnoredReason::OutOfRange,
            IgnoredReason::AlreadyActive,
            IgnoredReason::AtBoundary,
            IgnoredReason::Locked,
            IgnoredReason::CoolingDown {
                remaining: Duration::ZERO,
            },
        ];
        let mut names: Vec<&str> = reasons.iter().map(|r| r.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), reasons.len());
    }

    #[test]
    fn outcome_accessors() {
        let record = TransitionRecord {
            sequence: 1,
            from: 0,
            to: 1,
            scroll_top: Some(800.0),
            deadline: Duration::from_secs(1),
        };
        let accepted = TransitionOutcome::Accepted(record);
        assert!(accepted.is_accepted());
        assert_eq!(accepted.accepted(), Some(&record));
        assert_eq!(accepted.ignored_reason(), None);

        let ignored = TransitionOutcome::Ignored(IgnoredReason::Locked);
        assert!(!ignored.is_accepted());
        assert_eq!(ignored.ignored_reason(), Some(IgnoredReason::Locked));
    }

    #[test]
    fn detached_dispatch_is_not_suppressed() {
        let d = EventDispatch::detached();
        assert!(!d.prevent_default);
        assert!(!d.started_transition());
        assert_eq!(
            d.outcome.and_then(|o| o.ignored_reason()),
            Some(IgnoredReason::Detached)
        );
    }
}
