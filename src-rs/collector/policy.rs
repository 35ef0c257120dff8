use std::fmt;
use std::time::Duration;

use crate::config::ChroniclerConfig;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Fixed pause after every iteration, successful or not.
    pub interval: Duration,
    pub max_consecutive_failures: Option<u32>,
    pub max_samples: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Cancelled,
    TooManyFailures(u32),
    SampleLimit(u64),
}

impl RetryPolicy {
    pub fn forever(interval: Duration) -> Self {
        Self {
            interval,
            max_consecutive_failures: None,
            max_samples: None,
        }
    }

    pub fn from_config(cfg: &ChroniclerConfig) -> Self {
        Self {
            interval: cfg.interval,
            max_consecutive_failures: cfg.max_failures.filter(|n| *n > 0),
            max_samples: cfg.max_samples.filter(|n| *n > 0),
        }
    }

    /// Decides whether the loop ends after an iteration left these counters.
    /// A limit of zero counts as no limit.
    pub fn check(&self, consecutive_failures: u32, samples: u64) -> Option<StopReason> {
        if let Some(limit) = self.max_consecutive_failures.filter(|n| *n > 0) {
            if consecutive_failures >= limit {
                return Some(StopReason::TooManyFailures(consecutive_failures));
            }
        }
        if let Some(limit) = self.max_samples.filter(|n| *n > 0) {
            if samples >= limit {
                return Some(StopReason::SampleLimit(samples));
            }
        }
        None
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Cancelled => write!(f, "cancelled"),
            StopReason::TooManyFailures(n) => write!(f, "gave up after {} consecutive failures", n),
            StopReason::SampleLimit(n) => write!(f, "collected {} samples", n),
        }
    }
}
