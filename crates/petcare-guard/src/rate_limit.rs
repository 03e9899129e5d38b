use chrono::{DateTime, TimeDelta, Utc};

/// Sliding-window submission limit: at most `max_count` accepted
/// submissions within any `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub window: TimeDelta,
    pub max_count: usize,
}

impl RateLimit {
    pub fn new(window_secs: i64, max_count: usize) -> Self {
        Self {
            window: TimeDelta::seconds(window_secs),
            max_count,
        }
    }

    pub fn window_secs(&self) -> i64 {
        self.window.num_seconds()
    }
}

/// Drops timestamps that fell out of the window, then reports whether the
/// remaining count already reaches the limit. The prune always happens.
pub fn prune_and_check(
    history: &mut Vec<DateTime<Utc>>,
    limit: &RateLimit,
    now: DateTime<Utc>,
) -> bool {
    history.retain(|t| now - *t < limit.window);
    history.len() >= limit.max_count
}
