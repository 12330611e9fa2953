use std::time::{Duration, Instant};

use crate::config::{RESTART_INTERVAL_SECS, STALE_AFTER_SECS};
use crate::heading::HeadingSmoother;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StalenessReport {
    Fresh,
    /// Seconds since the last valid course.
    Stale(f64),
}

impl StalenessReport {
    pub fn is_stale(&self) -> bool {
        matches!(self, StalenessReport::Stale(_))
    }
}

/// Read-only check of how long the heading has gone without a valid course.
pub fn check_staleness(smoother: &HeadingSmoother, now: Instant) -> StalenessReport {
    let elapsed = smoother.seconds_since_last_valid_course(now);
    if elapsed > STALE_AFTER_SECS {
        StalenessReport::Stale(elapsed)
    } else {
        StalenessReport::Fresh
    }
}

/// Why the location subscription should be recreated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RestartReason {
    Interval,
    Stale(f64),
}

/// Decides when to recreate the location subscription.
///
/// Restarts happen on a fixed interval, or sooner when the heading goes
/// stale. A stale report only triggers a restart if the previous one was
/// at least a staleness window ago, so a dead receiver is not hammered
/// every refresh.
pub struct RestartSchedule {
    interval: Duration,
    stale_backoff: Duration,
    last_restart: Instant,
}

impl RestartSchedule {
    pub fn new(started: Instant) -> Self {
        Self::with_interval(started, Duration::from_secs(RESTART_INTERVAL_SECS))
    }

    pub fn with_interval(started: Instant, interval: Duration) -> Self {
        Self {
            interval,
            stale_backoff: Duration::from_secs_f64(STALE_AFTER_SECS),
            last_restart: started,
        }
    }

    /// Returns a reason when a restart is due, and counts it as done.
    pub fn poll(&mut self, report: StalenessReport, now: Instant) -> Option<RestartReason> {
        let since = now.saturating_duration_since(self.last_restart);

        let reason = if since >= self.interval {
            RestartReason::Interval
        } else if let StalenessReport::Stale(elapsed) = report
            && since >= self.stale_backoff
        {
            RestartReason::Stale(elapsed)
        } else {
            return None;
        };

        self.last_restart = now;
        Some(reason)
    }
}
