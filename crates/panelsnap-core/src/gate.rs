#![forbid(unsafe_code)]

//! Lock and cooldown gate for panel transitions.
//!
//! Wheel and touch hardware emit events far faster than a panel transition
//! can run. [`TransitionGate`] admits a request only when no transition is in
//! flight *and* the configured cooldown has elapsed since the last admitted
//! request. Rejected requests are dropped, never queued: within one cooldown
//! window only the first request has any effect.
//!
//! The gate never reads a clock. Callers pass monotonic timestamps (elapsed
//! time since an arbitrary epoch), which keeps it deterministic under test.

use core::time::Duration;

/// Default minimum spacing between two admitted transitions.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(100);

/// Why the gate refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    /// A transition is still in flight.
    Locked,
    /// The last admitted transition was too recent.
    CoolingDown {
        /// Time left until the cooldown expires.
        remaining: Duration,
    },
}

/// Lock + cooldown admission control.
#[derive(Debug, Clone)]
pub struct TransitionGate {
    cooldown: Duration,
    locked: bool,
    last_admitted: Option<Duration>,
}

impl TransitionGate {
    /// Create an unlocked gate.
    #[must_use]
    pub const fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            locked: false,
            last_admitted: None,
        }
    }

    /// Check admission at `now` without changing state.
    pub fn check(&self, now: Duration) -> Result<(), GateRejection> {
        if self.locked {
            return Err(GateRejection::Locked);
        }
        if let Some(last) = self.last_admitted {
            let elapsed = now.saturating_sub(last);
            if elapsed < self.cooldown {
                return Err(GateRejection::CoolingDown {
                    remaining: self.cooldown - elapsed,
                });
            }
        }
        Ok(())
    }

    /// Admit a request at `now`: take the lock and start the cooldown.
    pub fn try_acquire(&mut self, now: Duration) -> Result<(), GateRejection> {
        self.check(now)?;
        self.locked = true;
        self.last_admitted = Some(now);
        Ok(())
    }

    /// Release the lock. The cooldown keeps running from the last admission.
    pub fn release(&mut self) {
        self.locked = false;
    }

    /// Whether a transition currently holds the lock.
    #[inline]
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Timestamp of the last admitted request.
    #[inline]
    #[must_use]
    pub const fn last_admitted(&self) -> Option<Duration> {
        self.last_admitted
    }

    /// Configured cooldown.
    #[inline]
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

impl Default for TransitionGate {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
