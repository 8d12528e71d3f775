//! Learning-session state for the caller-driven tick.
//!
//! The original design's internal per-minute timer is replaced by an
//! explicit tick the usage monitor (or a test harness) invokes, one event
//! per elapsed learning minute. Ending a session stops further ticks but
//! never rolls back minutes already committed to the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A live learning session being ticked by the usage monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningSession {
    pub child_id: String,
    pub app_id: String,
    pub started_at: DateTime<Utc>,
    /// Minutes committed to the ledger so far
    pub minutes_recorded: u32,
    /// Coinz earned by this session so far
    pub coinz_earned: i64,
}

impl LearningSession {
    pub fn new(child_id: &str, app_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            child_id: child_id.to_string(),
            app_id: app_id.to_string(),
            started_at: now,
            minutes_recorded: 0,
            coinz_earned: 0,
        }
    }

    /// Bookkeeping for one committed minute.
    pub fn record_tick(&mut self, amount: i64) {
        self.minutes_recorded += 1;
        self.coinz_earned += amount;
    }
}
