use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RateUsage {
    pub used: u32,
    pub limit: u32,
}

/// Daily ceiling on model calls, counted per local calendar day.
///
/// The window only ever holds timestamps from the current day. Purging,
/// checking and recording happen under one lock so concurrent callers cannot
/// both take the last slot.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Mutex<Vec<DateTime<Local>>>,
}

impl RateLimiter {
    pub fn new(limit: u32) -> Self {
        Self { limit, window: Mutex::new(Vec::new()) }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn try_admit(&self) -> bool {
        self.try_admit_at(Local::now())
    }

    pub fn try_admit_at(&self, now: DateTime<Local>) -> bool {
        let mut window = self.lock_window();
        purge_before_today(&mut window, now);

        let used = window.len() as u32;
        if used >= self.limit {
            warn!(
                event_name = "llm.rate_limit.exceeded",
                used,
                limit = self.limit,
                "model daily call limit reached"
            );
            return false;
        }

        window.push(now);
        debug!(
            event_name = "llm.rate_limit.admitted",
            used = used + 1,
            limit = self.limit,
            "model call admitted"
        );
        true
    }

    pub fn usage(&self) -> RateUsage {
        self.usage_at(Local::now())
    }

    pub fn usage_at(&self, now: DateTime<Local>) -> RateUsage {
        let mut window = self.lock_window();
        purge_before_today(&mut window, now);
        RateUsage { used: window.len() as u32, limit: self.limit }
    }

    fn lock_window(&self) -> MutexGuard<'_, Vec<DateTime<Local>>> {
        // Every critical section leaves the window valid, so a poisoned lock is safe to reuse.
        self.window.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn purge_before_today(window: &mut Vec<DateTime<Local>>, now: DateTime<Local>) {
    let today = now.date_naive();
    window.retain(|timestamp| timestamp.date_naive() == today);
}
