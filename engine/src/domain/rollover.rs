//! Daily rollover: the state transition that resets day-scoped counters
//! while preserving the cumulative balance (the carryover guarantee).

use chrono::NaiveDate;
use log::info;

use crate::domain::models::wallet::Wallet;

/// Reset the wallet's day-scoped counters if its stored day differs from
/// `today`. Idempotent: calling it twice on the same day is a no-op.
///
/// `balance`, `total_earned`, `total_spent` and `total_learning_minutes`
/// are untouched — unused balance carries across day boundaries. Callers
/// must run this on every wallet load, before any earn/spend/gate
/// evaluation that depends on day-scoped fields.
///
/// Returns `true` when a rollover was applied.
pub fn rollover_if_needed(wallet: &mut Wallet, today: NaiveDate) -> bool {
    if wallet.last_reset_date == today {
        return false;
    }

    info!(
        "Rolling wallet {} over from {} to {} (balance {} carries)",
        wallet.child_id, wallet.last_reset_date, today, wallet.balance
    );

    wallet.daily_earned = 0;
    wallet.daily_spent = 0;
    wallet.daily_learning_minutes = 0;
    wallet.daily_reward_usage.clear();
    wallet.last_reset_date = today;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn wallet_with_activity(last_reset: NaiveDate) -> Wallet {
        let mut wallet = Wallet::new("child::1", last_reset, Utc::now());
        wallet.balance = 25;
        wallet.total_earned = 40;
        wallet.total_spent = 15;
        wallet.daily_earned = 10;
        wallet.daily_spent = 5;
        wallet.daily_learning_minutes = 30;
        wallet.total_learning_minutes = 300;
        wallet
            .daily_reward_usage
            .insert("com.example.game".to_string(), 12);
        wallet
    }

    #[test]
    fn test_rollover_resets_daily_counters_and_preserves_balance() {
        let yesterday = date(2025, 6, 18);
        let today = date(2025, 6, 19);
        let mut wallet = wallet_with_activity(yesterday);

        assert!(rollover_if_needed(&mut wallet, today));

        assert_eq!(wallet.balance, 25);
        assert_eq!(wallet.total_earned, 40);
        assert_eq!(wallet.total_spent, 15);
        assert_eq!(wallet.total_learning_minutes, 300);

        assert_eq!(wallet.daily_earned, 0);
        assert_eq!(wallet.daily_spent, 0);
        assert_eq!(wallet.daily_learning_minutes, 0);
        assert!(wallet.daily_reward_usage.is_empty());
        assert_eq!(wallet.last_reset_date, today);
    }

    #[test]
    fn test_rollover_is_idempotent_within_a_day() {
        let today = date(2025, 6, 19);
        let mut wallet = wallet_with_activity(date(2025, 6, 18));

        assert!(rollover_if_needed(&mut wallet, today));
        let after_first = wallet.clone();

        assert!(!rollover_if_needed(&mut wallet, today));
        assert_eq!(wallet, after_first);
    }

    #[test]
    fn test_same_day_load_does_not_touch_counters() {
        let today = date(2025, 6, 19);
        let mut wallet = wallet_with_activity(today);
        let before = wallet.clone();

        assert!(!rollover_if_needed(&mut wallet, today));
        assert_eq!(wallet, before);
    }

    #[test]
    fn test_minimum_learning_threshold_persists_across_rollover() {
        let mut wallet = wallet_with_activity(date(2025, 6, 18));
        wallet.minimum_daily_learning_minutes = 25;

        rollover_if_needed(&mut wallet, date(2025, 6, 19));
        assert_eq!(wallet.minimum_daily_learning_minutes, 25);
    }
}
