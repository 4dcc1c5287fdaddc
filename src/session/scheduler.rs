//! Chunk scheduler: decides flush timing under a mutable interval policy.
//!
//! The scheduler is fragment-driven, not a free-running timer: it is
//! consulted once per incoming fragment, right after the fragment is
//! appended. Absent speech produces no fragments, so there is nothing to
//! flush and no decision to make.

use crate::error::{MeetscribeError, Result};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// The configured rule for automatic flush timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalPolicy {
    /// Never auto-flush; only explicit triggers (or session stop) flush.
    Manual,
    /// Auto-flush once this much time has elapsed since the last flush.
    Fixed(Duration),
}

impl IntervalPolicy {
    /// Parses a policy from user input: `"manual"`, a bare number of
    /// seconds, or any duration `humantime` accepts (`"10s"`, `"5m"`,
    /// `"1h30m"`).
    ///
    /// Zero and negative durations are rejected; a policy that fires on
    /// every fragment is expressed as a very small interval instead.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("manual") || trimmed.eq_ignore_ascii_case("complete") {
            return Ok(Self::Manual);
        }

        // Bare number → seconds
        let duration = if let Ok(secs) = trimmed.parse::<u64>() {
            Duration::from_secs(secs)
        } else {
            humantime::parse_duration(trimmed).map_err(|e| MeetscribeError::InvalidInterval {
                value: s.to_string(),
                message: e.to_string(),
            })?
        };

        if duration.is_zero() {
            return Err(MeetscribeError::InvalidInterval {
                value: s.to_string(),
                message: "interval must be positive".to_string(),
            });
        }

        Ok(Self::Fixed(duration))
    }

    /// Returns the fixed duration, or `None` under manual policy.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Self::Manual => None,
            Self::Fixed(d) => Some(*d),
        }
    }
}

impl FromStr for IntervalPolicy {
    type Err = MeetscribeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for IntervalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Fixed(d) => write!(f, "{}", humantime::format_duration(*d)),
        }
    }
}

/// Decides when the transcript buffer should be flushed.
///
/// Holds no buffer itself; callers report whether the buffer is empty and
/// must call [`ChunkScheduler::mark_flushed`] exactly once per actual
/// drain, and only then. Calling it without draining desynchronizes the
/// timing base.
#[derive(Debug)]
pub struct ChunkScheduler {
    policy: IntervalPolicy,
    last_flush: Instant,
}

impl ChunkScheduler {
    /// Creates a scheduler with the given policy, anchored at `now`.
    pub fn new(policy: IntervalPolicy, now: Instant) -> Self {
        Self {
            policy,
            last_flush: now,
        }
    }

    /// Current policy.
    pub fn policy(&self) -> IntervalPolicy {
        self.policy
    }

    /// Time elapsed since the last flush.
    pub fn since_last_flush(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_flush)
    }

    /// Decides whether the just-appended fragment should trigger a flush.
    ///
    /// Manual policy never auto-flushes. A fixed policy flushes once the
    /// interval has elapsed since the last flush, provided there is
    /// something to dispatch.
    pub fn should_flush_on_fragment(&self, now: Instant, buffer_empty: bool) -> bool {
        if buffer_empty {
            return false;
        }
        match self.policy {
            IntervalPolicy::Manual => false,
            IntervalPolicy::Fixed(interval) => self.since_last_flush(now) >= interval,
        }
    }

    /// Installs a new policy, returning whether an immediate flush should
    /// fire.
    ///
    /// The policy is replaced unconditionally. When tightening the interval
    /// below the time already elapsed, the change itself triggers a flush
    /// rather than waiting a full new interval, which bounds staleness.
    pub fn on_interval_changed(
        &mut self,
        new_policy: IntervalPolicy,
        now: Instant,
        buffer_empty: bool,
    ) -> bool {
        let flush_now = match new_policy {
            IntervalPolicy::Manual => false,
            IntervalPolicy::Fixed(interval) => {
                !buffer_empty && self.since_last_flush(now) >= interval
            }
        };
        self.policy = new_policy;
        flush_now
    }

    /// Manual override: flush now if there is anything to flush,
    /// regardless of policy. Honored in any mode, including manual.
    pub fn trigger_instant(&self, buffer_empty: bool) -> bool {
        !buffer_empty
    }

    /// Records that a flush actually happened.
    pub fn mark_flushed(&mut self, now: Instant) {
        self.last_flush = now;
    }
}
