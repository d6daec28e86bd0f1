//! Process-wide quota budget for the upstream video service: a single shared counter
//! serialized across callers.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chess_video_core::PipelineError;
use chess_video_types::{QuotaConfig, QuotaState};

/// A single owned quota budget, passed by `Arc` into every upstream call site.
///
/// Deliberately not a global: multiple independent pipelines must be able to
/// coexist, and tests need to reset the budget between cases.
pub struct QuotaLedger {
    limit: u64,
    window: Duration,
    state: Mutex<Runtime>,
}

struct Runtime {
    used: u64,
    window_start: Instant,
}

impl QuotaLedger {
    /// Build a new ledger from the configured daily limit and accounting window.
    #[must_use]
    pub fn new(config: QuotaConfig) -> Self {
        Self {
            limit: config.limit,
            window: config.window,
            state: Mutex::new(Runtime {
                used: 0,
                window_start: Instant::now(),
            }),
        }
    }

    /// Reserve `cost` units from the budget before executing an upstream call.
    ///
    /// # Errors
    /// Returns [`PipelineError::QuotaExceeded`] when the reservation would push usage
    /// past `limit`. The reservation is atomic: either the full `cost` is booked or
    /// none of it is.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    pub fn reserve(&self, cost: u64) -> Result<(), PipelineError> {
        let mut rt = self.state.lock().expect("mutex poisoned");
        let now = Instant::now();
        if now.duration_since(rt.window_start) >= self.window {
            rt.used = 0;
            rt.window_start = now;
        }

        if rt.used + cost > self.limit {
            let remaining = self.limit.saturating_sub(rt.used);
            let reset_in_ms: u64 = self
                .window
                .saturating_sub(now.duration_since(rt.window_start))
                .as_millis()
                .try_into()
                .unwrap_or(u64::MAX);
            return Err(PipelineError::QuotaExceeded {
                remaining,
                reset_in_ms,
            });
        }

        rt.used += cost;
        Ok(())
    }

    /// Snapshot the current budget state.
    ///
    /// # Panics
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn state(&self) -> QuotaState {
        let rt = self.state.lock().expect("mutex poisoned");
        let now = Instant::now();
        let elapsed = now.duration_since(rt.window_start);
        let reset_in_ms: u64 = self
            .window
            .saturating_sub(elapsed)
            .as_millis()
            .try_into()
            .unwrap_or(u64::MAX);
        QuotaState {
            limit: self.limit,
            remaining: self.limit.saturating_sub(rt.used),
            reset_in_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(limit: u64) -> QuotaConfig {
        QuotaConfig {
            limit,
            window: Duration::from_secs(3600),
            ..QuotaConfig::default()
        }
    }

    #[test]
    fn reserves_until_limit_then_fails() {
        let ledger = QuotaLedger::new(config(5));
        assert!(ledger.reserve(3).is_ok());
        assert!(ledger.reserve(2).is_ok());
        let err = ledger.reserve(1).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::QuotaExceeded { remaining: 0, .. }
        ));
    }

    #[test]
    fn reservation_is_atomic_on_overshoot() {
        let ledger = QuotaLedger::new(config(5));
        assert!(ledger.reserve(3).is_ok());
        assert!(ledger.reserve(10).is_err());
        // The failed 10-unit reservation must not have partially booked.
        assert!(ledger.reserve(2).is_ok());
    }

    #[test]
    fn state_reflects_remaining_budget() {
        let ledger = QuotaLedger::new(config(10));
        ledger.reserve(4).unwrap();
        let state = ledger.state();
        assert_eq!(state.limit, 10);
        assert_eq!(state.remaining, 6);
    }
}
