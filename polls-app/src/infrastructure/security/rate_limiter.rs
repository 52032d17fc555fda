use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

const MAX_ATTEMPTS_PER_MINUTE: u32 = 5;
const MAX_ATTEMPTS_PER_HOUR: u32 = 20;
const CLEANUP_INTERVAL_SECS: u64 = 300;

#[derive(Clone)]
struct AttemptRecord {
    minute_count: u32,
    hour_count: u32,
    minute_start: Instant,
    hour_start: Instant,
}

impl AttemptRecord {
    fn starting_at(now: Instant) -> Self {
        Self {
            minute_count: 0,
            hour_count: 0,
            minute_start: now,
            hour_start: now,
        }
    }
}

/// Throttles login and registration attempts per client key.
#[derive(Clone)]
pub struct RateLimiter {
    attempts: Arc<DashMap<String, AttemptRecord>>,
    last_cleanup: Arc<std::sync::Mutex<Instant>>,
    per_minute: u32,
    per_hour: u32,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(MAX_ATTEMPTS_PER_MINUTE, MAX_ATTEMPTS_PER_HOUR)
    }

    pub fn with_limits(per_minute: u32, per_hour: u32) -> Self {
        Self {
            attempts: Arc::new(DashMap::new()),
            last_cleanup: Arc::new(std::sync::Mutex::new(Instant::now())),
            per_minute,
            per_hour,
        }
    }

    pub fn check(&self, key: &str) -> Result<(), RateLimitError> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), RateLimitError> {
        self.maybe_cleanup(now);

        let mut record = self
            .attempts
            .entry(key.to_string())
            .or_insert_with(|| AttemptRecord::starting_at(now));

        if now.duration_since(record.minute_start) > Duration::from_secs(60) {
            record.minute_count = 0;
            record.minute_start = now;
        }

        if now.duration_since(record.hour_start) > Duration::from_secs(3600) {
            record.hour_count = 0;
            record.hour_start = now;
        }

        if record.minute_count >= self.per_minute {
            let wait_secs = 60u64.saturating_sub(now.duration_since(record.minute_start).as_secs());
            return Err(RateLimitError::TooManyPerMinute(wait_secs));
        }

        if record.hour_count >= self.per_hour {
            let wait_secs =
                3600u64.saturating_sub(now.duration_since(record.hour_start).as_secs());
            return Err(RateLimitError::TooManyPerHour(wait_secs));
        }

        record.minute_count += 1;
        record.hour_count += 1;

        Ok(())
    }

    fn maybe_cleanup(&self, now: Instant) {
        // Poisoned lock: skip this round.
        let Ok(mut last_cleanup) = self.last_cleanup.lock() else {
            return;
        };
        if now.duration_since(*last_cleanup) > Duration::from_secs(CLEANUP_INTERVAL_SECS) {
            if let Some(cutoff) = now.checked_sub(Duration::from_secs(3600)) {
                self.attempts.retain(|_, v| v.hour_start > cutoff);
            }
            *last_cleanup = now;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    #[error("Per-minute attempt limit reached, retry in {0}s")]
    TooManyPerMinute(u64),
    #[error("Hourly attempt limit reached, retry in {0}s")]
    TooManyPerHour(u64),
}

impl RateLimitError {
    pub fn retry_after_secs(&self) -> u64 {
        match self {
            Self::TooManyPerMinute(secs) | Self::TooManyPerHour(secs) => *secs,
        }
    }
}

impl From<RateLimitError> for polls_errors::AppError {
    fn from(err: RateLimitError) -> Self {
        tracing::warn!("Attempt throttled: {}", err);
        polls_errors::AppError::RateLimited(err.retry_after_secs())
    }
}
