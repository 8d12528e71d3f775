//! Domain model for a child's Coinz wallet.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default daily learning minutes a child must complete before reward time
/// can be purchased. Parent-configurable per wallet.
pub const DEFAULT_MINIMUM_DAILY_LEARNING_MINUTES: u32 = 15;

/// The single source of truth for a child's Coinz economy.
///
/// One wallet exists per child. All mutations go through the ledger; the
/// daily counters are reset by the rollover while `balance` and the lifetime
/// counters carry across day boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub child_id: String,
    /// Current spendable Coinz; never implicitly reset
    pub balance: i64,
    /// Lifetime Coinz earned (monotonically non-decreasing)
    pub total_earned: i64,
    /// Lifetime Coinz spent (monotonically non-decreasing)
    pub total_spent: i64,
    /// Coinz earned since the last rollover
    pub daily_earned: i64,
    /// Coinz spent since the last rollover
    pub daily_spent: i64,
    /// Learning minutes completed since the last rollover
    pub daily_learning_minutes: u32,
    /// Lifetime learning minutes
    pub total_learning_minutes: u64,
    /// Reward minutes consumed today, keyed by app id; cleared on rollover
    pub daily_reward_usage: BTreeMap<String, u32>,
    /// Learning-gate threshold; persists across rollovers
    pub minimum_daily_learning_minutes: u32,
    /// Day the daily counters were last reset for
    pub last_reset_date: NaiveDate,
    /// Stamp of the last wallet write, for the persistence collaborator
    pub last_modified: DateTime<Utc>,
}

impl Wallet {
    /// Create a fresh wallet for a newly established child profile.
    pub fn new(child_id: &str, today: NaiveDate, now: DateTime<Utc>) -> Self {
        Self {
            child_id: child_id.to_string(),
            balance: 0,
            total_earned: 0,
            total_spent: 0,
            daily_earned: 0,
            daily_spent: 0,
            daily_learning_minutes: 0,
            total_learning_minutes: 0,
            daily_reward_usage: BTreeMap::new(),
            minimum_daily_learning_minutes: DEFAULT_MINIMUM_DAILY_LEARNING_MINUTES,
            last_reset_date: today,
            last_modified: now,
        }
    }

    /// Portion of the current balance attributable to days before today.
    ///
    /// Derived projection for display; not ledger state.
    pub fn carryover_balance(&self) -> i64 {
        self.balance - self.daily_earned + self.daily_spent
    }

    pub fn has_carryover(&self) -> bool {
        self.carryover_balance() > 0
    }

    /// Reward minutes already consumed today for the given app.
    pub fn reward_minutes_used_today(&self, app_id: &str) -> u32 {
        self.daily_reward_usage.get(app_id).copied().unwrap_or(0)
    }

    /// Whether today's minimum learning requirement has been met.
    pub fn learning_requirement_met(&self) -> bool {
        self.daily_learning_minutes >= self.minimum_daily_learning_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_wallet_starts_empty() {
        let wallet = Wallet::new("child::1", date(2025, 6, 19), Utc::now());
        assert_eq!(wallet.balance, 0);
        assert_eq!(wallet.total_earned, 0);
        assert_eq!(wallet.total_spent, 0);
        assert_eq!(wallet.daily_learning_minutes, 0);
        assert!(wallet.daily_reward_usage.is_empty());
        assert_eq!(
            wallet.minimum_daily_learning_minutes,
            DEFAULT_MINIMUM_DAILY_LEARNING_MINUTES
        );
    }

    #[test]
    fn test_carryover_balance_excludes_todays_net_activity() {
        let mut wallet = Wallet::new("child::1", date(2025, 6, 19), Utc::now());
        wallet.balance = 25;
        wallet.daily_earned = 10;
        wallet.daily_spent = 5;

        // 25 total, of which 10 - 5 = 5 came from today
        assert_eq!(wallet.carryover_balance(), 20);
        assert!(wallet.has_carryover());
    }

    #[test]
    fn test_no_carryover_when_everything_was_earned_today() {
        let mut wallet = Wallet::new("child::1", date(2025, 6, 19), Utc::now());
        wallet.balance = 10;
        wallet.daily_earned = 10;

        assert_eq!(wallet.carryover_balance(), 0);
        assert!(!wallet.has_carryover());
    }

    #[test]
    fn test_reward_minutes_used_today_defaults_to_zero() {
        let mut wallet = Wallet::new("child::1", date(2025, 6, 19), Utc::now());
        wallet
            .daily_reward_usage
            .insert("com.example.game".to_string(), 5);

        assert_eq!(wallet.reward_minutes_used_today("com.example.game"), 5);
        assert_eq!(wallet.reward_minutes_used_today("com.example.other"), 0);
    }
}
