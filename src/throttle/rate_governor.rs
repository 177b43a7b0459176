use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use crate::observability::metrics::GOVERNOR_WAIT;

/// Process-wide spacing between outbound exchange calls.
///
/// One instance is shared (behind an `Arc`) by every symbol task of a run.
/// `wait()` holds the internal lock while sleeping, so the check of the last
/// call time and its update are a single step. Waiters are admitted in lock
/// acquisition order, which tokio's mutex keeps FIFO.
pub struct RateGovernor {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateGovernor {
    pub fn new(min_interval: Duration) -> Self {
        RateGovernor {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Twice the venue's advertised limit, never below `floor`.
    pub fn from_rate_limit(advertised: Duration, floor: Duration) -> Self {
        Self::new((advertised * 2).max(floor))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub async fn wait(&self) {
        let started = Instant::now();
        let mut last_call = self.last_call.lock().await;

        if let Some(last) = *last_call {
            let ready_at = last + self.min_interval;
            if ready_at > Instant::now() {
                sleep_until(ready_at).await;
            }
        }

        *last_call = Some(Instant::now());
        GOVERNOR_WAIT.observe(started.elapsed().as_secs_f64());
    }
}
