//! Outbound call budget for the license client.
//!
//! Fixed window: at most `RATE_LIMIT_MAX` calls per `RATE_LIMIT_WINDOW`,
//! counted per process. A claimed slot is consumed whether or not the call
//! succeeds; concurrent claimants can at most leak one extra call past the
//! cap, which is tolerated.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;

/// Maximum license calls per window.
pub const RATE_LIMIT_MAX: u32 = 10;

/// Window length in seconds (5 minutes).
pub const RATE_LIMIT_WINDOW_SECS: i64 = 300;

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: DateTime<Utc>,
    calls: u32,
}

/// Per-process call budget keyed to an injected clock.
pub struct CallBudget {
    clock: Arc<dyn Clock>,
    max_calls: u32,
    window: Duration,
    state: Mutex<Option<Window>>,
}

impl CallBudget {
    /// Budget with the documented production limits.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_limits(clock, RATE_LIMIT_MAX, Duration::seconds(RATE_LIMIT_WINDOW_SECS))
    }

    /// Budget with explicit limits.
    #[must_use]
    pub fn with_limits(clock: Arc<dyn Clock>, max_calls: u32, window: Duration) -> Self {
        Self {
            clock,
            max_calls,
            window,
            state: Mutex::new(None),
        }
    }

    /// Claim one call slot; `false` means the caller must fail fast
    /// without touching the network.
    #[must_use]
    pub fn try_claim(&self) -> bool {
        let now = self.clock.now();
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        match state.as_mut() {
            Some(window) if now - window.started_at < self.window => {
                if window.calls >= self.max_calls {
                    return false;
                }
                window.calls += 1;
                true
            }
            _ => {
                *state = Some(Window {
                    started_at: now,
                    calls: 1,
                });
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::clock::FixedClock;

    use super::*;

    fn budget() -> (Arc<FixedClock>, CallBudget) {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let budget = CallBudget::new(Arc::clone(&clock) as Arc<dyn Clock>);
        (clock, budget)
    }

    #[test]
    fn eleventh_call_in_window_is_rejected() {
        let (_clock, budget) = budget();
        for _ in 0..10 {
            assert!(budget.try_claim());
        }
        assert!(!budget.try_claim());
    }

    #[test]
    fn window_resets_after_five_minutes() {
        let (clock, budget) = budget();
        for _ in 0..10 {
            assert!(budget.try_claim());
        }
        assert!(!budget.try_claim());

        clock.advance(Duration::seconds(RATE_LIMIT_WINDOW_SECS + 1));
        assert!(budget.try_claim());
    }

    #[test]
    fn rejection_does_not_extend_the_window() {
        let (clock, budget) = budget();
        for _ in 0..10 {
            assert!(budget.try_claim());
        }
        clock.advance(Duration::seconds(RATE_LIMIT_WINDOW_SECS - 1));
        assert!(!budget.try_claim());
        clock.advance(Duration::seconds(2));
        assert!(budget.try_claim());
    }
}
