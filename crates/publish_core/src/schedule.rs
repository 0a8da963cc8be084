use std::time::Duration;

/// Linear backoff with a cap and a wall-clock budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub step: Duration,
    pub cap: Duration,
    pub max_duration: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(2000),
            step: Duration::from_millis(1000),
            cap: Duration::from_millis(10_000),
            max_duration: Duration::from_secs(120),
        }
    }
}

impl BackoffPolicy {
    /// `min(base + attempts * step, cap)`
    pub fn delay_for(&self, attempts: u32) -> Duration {
        self.step
            .checked_mul(attempts)
            .and_then(|grown| self.base.checked_add(grown))
            .map_or(self.cap, |delay| delay.min(self.cap))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollSchedule {
    /// Self-rescheduling backoff bounded by `max_duration`.
    Backoff(BackoffPolicy),
    /// Constant period, no time budget.
    FixedInterval(Duration),
}

impl Default for PollSchedule {
    fn default() -> Self {
        PollSchedule::Backoff(BackoffPolicy::default())
    }
}

impl PollSchedule {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);

    /// Delay before the next poll, or `None` once the time budget is spent.
    pub fn next_delay(&self, attempts: u32, elapsed: Duration) -> Option<Duration> {
        match self {
            PollSchedule::Backoff(policy) => {
                if elapsed >= policy.max_duration {
                    None
                } else {
                    Some(policy.delay_for(attempts))
                }
            }
            PollSchedule::FixedInterval(period) => Some(*period),
        }
    }

    pub fn max_duration(&self) -> Option<Duration> {
        match self {
            PollSchedule::Backoff(policy) => Some(policy.max_duration),
            PollSchedule::FixedInterval(_) => None,
        }
    }
}
