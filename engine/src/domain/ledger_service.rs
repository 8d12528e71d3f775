//! Ledger service: the owner of atomic wallet mutations.
//!
//! Every earn/spend/bonus/penalty/adjustment validates first, then mutates
//! the wallet, then records exactly one transaction. A caller never observes
//! a wallet with a transaction recorded but the balance unmodified, or vice
//! versa; failures leave the wallet untouched. Persistence happens after the
//! in-memory commit and is safe to replay.

use chrono::{DateTime, Utc};
use log::{info, warn};
use std::sync::Arc;

use crate::domain::commands::transactions::{
    PaginationInfo, TransactionListQuery, TransactionListResult,
};
use crate::domain::errors::EconomyError;
use crate::domain::models::app_config::{AppCategory, AppConfig};
use crate::domain::models::transaction::{AdjustmentKind, Transaction, TransactionKind};
use crate::domain::models::wallet::Wallet;
use crate::storage::{Connection, TransactionStorage, WalletStorage};

#[derive(Clone)]
pub struct LedgerService<C: Connection> {
    wallet_repository: C::WalletRepository,
    transaction_repository: C::TransactionRepository,
}

impl<C: Connection> LedgerService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            wallet_repository: connection.create_wallet_repository(),
            transaction_repository: connection.create_transaction_repository(),
        }
    }

    /// Credit `amount` Coinz earned over `minutes` of use in `config`.
    ///
    /// Learning minutes are attributed only for learning-category apps.
    /// A zero amount is recorded anyway so the minute attribution stays
    /// visible in the history.
    pub fn earn(
        &self,
        wallet: &mut Wallet,
        config: &AppConfig,
        minutes: u32,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<Transaction, EconomyError> {
        if amount < 0 {
            return Err(EconomyError::InvalidAmount(format!(
                "earn amount cannot be negative (got {})",
                amount
            )));
        }

        wallet.balance += amount;
        wallet.total_earned += amount;
        wallet.daily_earned += amount;
        if config.category == AppCategory::Learning {
            wallet.daily_learning_minutes += minutes;
            wallet.total_learning_minutes += u64::from(minutes);
        }
        wallet.last_modified = now;

        let transaction = Transaction {
            id: Transaction::generate_id(TransactionKind::Earned, now.timestamp_millis()),
            wallet_id: wallet.child_id.clone(),
            app_id: Some(config.app_id.clone()),
            app_display_name: Some(config.display_name.clone()),
            kind: TransactionKind::Earned,
            amount,
            minutes_involved: minutes,
            timestamp: now,
            is_valid: true,
            description: format!("{} minutes in {}", minutes, config.display_name),
        };

        self.commit(wallet, &transaction)?;
        info!(
            "Earned {} Coinz for {} ({} minutes in {}), balance now {}",
            amount, wallet.child_id, minutes, config.app_id, wallet.balance
        );
        Ok(transaction)
    }

    /// Debit the cost of `minutes` of reward time in `config`.
    ///
    /// Only the balance is re-validated here; the three-tier purchase gate
    /// must have been run by the caller beforehand.
    pub fn spend(
        &self,
        wallet: &mut Wallet,
        config: &AppConfig,
        minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<Transaction, EconomyError> {
        if minutes == 0 {
            return Err(EconomyError::InvalidAmount(
                "spend must cover at least one minute".to_string(),
            ));
        }

        let cost = config.rate_magnitude() * i64::from(minutes);
        if cost > wallet.balance {
            warn!(
                "Rejected spend of {} Coinz for {}: balance is {}",
                cost, wallet.child_id, wallet.balance
            );
            return Err(EconomyError::InsufficientBalance {
                needed: cost,
                available: wallet.balance,
                shortfall: cost - wallet.balance,
            });
        }

        wallet.balance -= cost;
        wallet.total_spent += cost;
        wallet.daily_spent += cost;
        *wallet
            .daily_reward_usage
            .entry(config.app_id.clone())
            .or_insert(0) += minutes;
        wallet.last_modified = now;

        let transaction = Transaction {
            id: Transaction::generate_id(TransactionKind::Spent, now.timestamp_millis()),
            wallet_id: wallet.child_id.clone(),
            app_id: Some(config.app_id.clone()),
            app_display_name: Some(config.display_name.clone()),
            kind: TransactionKind::Spent,
            amount: -cost,
            minutes_involved: minutes,
            timestamp: now,
            is_valid: true,
            description: format!("{} minutes of {}", minutes, config.display_name),
        };

        self.commit(wallet, &transaction)?;
        info!(
            "Spent {} Coinz for {} ({} minutes of {}), balance now {}",
            cost, wallet.child_id, minutes, config.app_id, wallet.balance
        );
        Ok(transaction)
    }

    /// Apply a signed manual balance change.
    ///
    /// Bonuses and penalties move the lifetime counters so those stay
    /// meaningful; an adjustment is a correction and moves only the balance.
    /// No clamping: a penalty may drive the balance negative, representing a
    /// debt the child earns off.
    pub fn adjust_balance(
        &self,
        wallet: &mut Wallet,
        delta: i64,
        kind: AdjustmentKind,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Transaction, EconomyError> {
        match kind {
            AdjustmentKind::Bonus if delta <= 0 => {
                return Err(EconomyError::InvalidAmount(format!(
                    "bonus must be positive (got {})",
                    delta
                )));
            }
            AdjustmentKind::Penalty if delta >= 0 => {
                return Err(EconomyError::InvalidAmount(format!(
                    "penalty must be negative (got {})",
                    delta
                )));
            }
            _ => {}
        }

        wallet.balance += delta;
        match kind {
            AdjustmentKind::Bonus => wallet.total_earned += delta,
            AdjustmentKind::Penalty => wallet.total_spent += -delta,
            AdjustmentKind::Adjustment => {}
        }
        wallet.last_modified = now;

        let transaction_kind = kind.transaction_kind();
        let transaction = Transaction {
            id: Transaction::generate_id(transaction_kind, now.timestamp_millis()),
            wallet_id: wallet.child_id.clone(),
            app_id: None,
            app_display_name: None,
            kind: transaction_kind,
            amount: delta,
            minutes_involved: 0,
            timestamp: now,
            is_valid: true,
            description: reason.to_string(),
        };

        self.commit(wallet, &transaction)?;
        info!(
            "Applied {} of {} Coinz to {} ({}), balance now {}",
            transaction_kind.as_str(),
            delta,
            wallet.child_id,
            reason,
            wallet.balance
        );
        Ok(transaction)
    }

    /// Parent-initiated full reset: set the balance to `target`, clamped to
    /// a minimum of 0, recorded as an adjustment transaction of the delta.
    pub fn reset_wallet(
        &self,
        wallet: &mut Wallet,
        target: i64,
        now: DateTime<Utc>,
    ) -> Result<Transaction, EconomyError> {
        let clamped = target.max(0);
        if clamped != target {
            warn!(
                "Reset target {} for {} clamped to 0",
                target, wallet.child_id
            );
        }

        let delta = clamped - wallet.balance;
        wallet.balance = clamped;
        wallet.last_modified = now;

        let transaction = Transaction {
            id: Transaction::generate_id(TransactionKind::Adjustment, now.timestamp_millis()),
            wallet_id: wallet.child_id.clone(),
            app_id: None,
            app_display_name: None,
            kind: TransactionKind::Adjustment,
            amount: delta,
            minutes_involved: 0,
            timestamp: now,
            is_valid: true,
            description: format!("Balance reset to {}", clamped),
        };

        self.commit(wallet, &transaction)?;
        info!(
            "Reset balance of {} to {} (delta {})",
            wallet.child_id, clamped, delta
        );
        Ok(transaction)
    }

    /// List a page of transaction history, most recent first.
    pub fn list_history(
        &self,
        query: &TransactionListQuery,
    ) -> Result<TransactionListResult, EconomyError> {
        let limit = query.limit.unwrap_or(50);
        // Fetch one extra row to learn whether more remain
        let mut transactions = self.transaction_repository.list_transactions(
            &query.child_id,
            Some(limit + 1),
            query.after.clone(),
        )?;

        let has_more = transactions.len() > limit as usize;
        if has_more {
            transactions.truncate(limit as usize);
        }
        let next_cursor = if has_more {
            transactions.last().map(|t| t.id.clone())
        } else {
            None
        };

        Ok(TransactionListResult {
            transactions,
            pagination: PaginationInfo {
                has_more,
                next_cursor,
            },
        })
    }

    /// Signed sum of all valid transactions for a wallet; equals the balance
    /// for a wallet created at zero. Diagnostic, used by integrity checks.
    pub fn ledger_sum(&self, child_id: &str) -> Result<i64, EconomyError> {
        let transactions = self
            .transaction_repository
            .list_transactions_chronological(child_id)?;
        Ok(transactions
            .iter()
            .filter(|t| t.is_valid)
            .map(|t| t.amount)
            .sum())
    }

    fn commit(&self, wallet: &Wallet, transaction: &Transaction) -> Result<(), EconomyError> {
        self.transaction_repository.store_transaction(transaction)?;
        self.wallet_repository.store_wallet(wallet)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::wallet::Wallet;
    use crate::storage::csv::test_utils::TestEnvironment;
    use crate::storage::csv::CsvConnection;
    use chrono::NaiveDate;

    fn setup() -> (TestEnvironment, LedgerService<CsvConnection>, Wallet) {
        let env = TestEnvironment::new().unwrap();
        let service = LedgerService::new(Arc::new(env.connection.clone()));
        let today = NaiveDate::from_ymd_opt(2025, 6, 19).unwrap();
        let wallet = Wallet::new("child::1", today, Utc::now());
        (env, service, wallet)
    }

    fn learning_app() -> AppConfig {
        AppConfig {
            app_id: "com.example.math".to_string(),
            display_name: "Math Practice".to_string(),
            category: AppCategory::Learning,
            coinz_rate: 1,
            daily_time_limit: 0,
            is_enabled: true,
        }
    }

    fn reward_app() -> AppConfig {
        AppConfig {
            app_id: "com.example.game".to_string(),
            display_name: "Blocks Game".to_string(),
            category: AppCategory::Reward,
            coinz_rate: -2,
            daily_time_limit: 10,
            is_enabled: true,
        }
    }

    #[test]
    fn test_earn_updates_balance_and_learning_minutes() {
        let (_env, service, mut wallet) = setup();

        let transaction = service
            .earn(&mut wallet, &learning_app(), 15, 15, Utc::now())
            .unwrap();

        assert_eq!(wallet.balance, 15);
        assert_eq!(wallet.total_earned, 15);
        assert_eq!(wallet.daily_earned, 15);
        assert_eq!(wallet.daily_learning_minutes, 15);
        assert_eq!(wallet.total_learning_minutes, 15);
        assert_eq!(transaction.kind, TransactionKind::Earned);
        assert_eq!(transaction.amount, 15);
        assert_eq!(transaction.minutes_involved, 15);
    }

    #[test]
    fn test_earn_on_non_learning_app_skips_minute_attribution() {
        let (_env, service, mut wallet) = setup();
        let mut config = learning_app();
        config.category = AppCategory::Neutral;
        config.coinz_rate = 0;

        service.earn(&mut wallet, &config, 10, 0, Utc::now()).unwrap();

        assert_eq!(wallet.daily_learning_minutes, 0);
        assert_eq!(wallet.total_learning_minutes, 0);
    }

    #[test]
    fn test_earn_rejects_negative_amount() {
        let (_env, service, mut wallet) = setup();
        let before = wallet.clone();

        let result = service.earn(&mut wallet, &learning_app(), 5, -5, Utc::now());

        assert!(matches!(result, Err(EconomyError::InvalidAmount(_))));
        assert_eq!(wallet, before);
    }

    #[test]
    fn test_earn_with_zero_amount_is_still_recorded() {
        let (_env, service, mut wallet) = setup();

        let transaction = service
            .earn(&mut wallet, &learning_app(), 3, 0, Utc::now())
            .unwrap();

        assert_eq!(transaction.amount, 0);
        assert_eq!(wallet.balance, 0);
        assert_eq!(wallet.daily_learning_minutes, 3);
        assert_eq!(service.ledger_sum("child::1").unwrap(), 0);
    }

    #[test]
    fn test_spend_updates_counters_and_daily_usage() {
        let (_env, service, mut wallet) = setup();
        wallet.balance = 15;
        wallet.total_earned = 15;

        let transaction = service
            .spend(&mut wallet, &reward_app(), 5, Utc::now())
            .unwrap();

        assert_eq!(wallet.balance, 5);
        assert_eq!(wallet.total_spent, 10);
        assert_eq!(wallet.daily_spent, 10);
        assert_eq!(wallet.reward_minutes_used_today("com.example.game"), 5);
        assert_eq!(transaction.kind, TransactionKind::Spent);
        assert_eq!(transaction.amount, -10);
    }

    #[test]
    fn test_spend_never_reduces_balance_below_zero() {
        let (_env, service, mut wallet) = setup();
        wallet.balance = 9;
        let before = wallet.clone();

        let result = service.spend(&mut wallet, &reward_app(), 5, Utc::now());

        match result {
            Err(EconomyError::InsufficientBalance { shortfall, .. }) => {
                assert_eq!(shortfall, 1)
            }
            other => panic!("expected InsufficientBalance, got {:?}", other),
        }
        assert_eq!(wallet, before);
    }

    #[test]
    fn test_spend_rejects_zero_minutes() {
        let (_env, service, mut wallet) = setup();
        wallet.balance = 100;

        assert!(matches!(
            service.spend(&mut wallet, &reward_app(), 0, Utc::now()),
            Err(EconomyError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_bonus_moves_lifetime_earned() {
        let (_env, service, mut wallet) = setup();

        service
            .adjust_balance(&mut wallet, 10, AdjustmentKind::Bonus, "Goal bonus", Utc::now())
            .unwrap();

        assert_eq!(wallet.balance, 10);
        assert_eq!(wallet.total_earned, 10);
        assert_eq!(wallet.total_spent, 0);
    }

    #[test]
    fn test_penalty_moves_lifetime_spent_and_may_go_negative() {
        let (_env, service, mut wallet) = setup();
        wallet.balance = 3;

        service
            .adjust_balance(
                &mut wallet,
                -8,
                AdjustmentKind::Penalty,
                "Broke screen rules",
                Utc::now(),
            )
            .unwrap();

        // Debt the child must earn off; deliberately unclamped
        assert_eq!(wallet.balance, -5);
        assert_eq!(wallet.total_spent, 8);
        assert_eq!(wallet.total_earned, 0);
    }

    #[test]
    fn test_adjustment_moves_neither_lifetime_counter() {
        let (_env, service, mut wallet) = setup();
        wallet.balance = 5;

        service
            .adjust_balance(
                &mut wallet,
                -2,
                AdjustmentKind::Adjustment,
                "Correction",
                Utc::now(),
            )
            .unwrap();

        assert_eq!(wallet.balance, 3);
        assert_eq!(wallet.total_earned, 0);
        assert_eq!(wallet.total_spent, 0);
    }

    #[test]
    fn test_adjustment_sign_validation() {
        let (_env, service, mut wallet) = setup();

        assert!(matches!(
            service.adjust_balance(&mut wallet, -1, AdjustmentKind::Bonus, "bad", Utc::now()),
            Err(EconomyError::InvalidAmount(_))
        ));
        assert!(matches!(
            service.adjust_balance(&mut wallet, 1, AdjustmentKind::Penalty, "bad", Utc::now()),
            Err(EconomyError::InvalidAmount(_))
        ));
        assert_eq!(wallet.balance, 0);
    }

    #[test]
    fn test_reset_clamps_negative_target_to_zero() {
        let (_env, service, mut wallet) = setup();
        wallet.balance = 40;

        let transaction = service.reset_wallet(&mut wallet, -10, Utc::now()).unwrap();

        assert_eq!(wallet.balance, 0);
        assert_eq!(transaction.kind, TransactionKind::Adjustment);
        assert_eq!(transaction.amount, -40);
    }

    #[test]
    fn test_reset_to_positive_target() {
        let (_env, service, mut wallet) = setup();
        wallet.balance = 3;

        let transaction = service.reset_wallet(&mut wallet, 20, Utc::now()).unwrap();

        assert_eq!(wallet.balance, 20);
        assert_eq!(transaction.amount, 17);
    }

    #[test]
    fn test_ledger_sum_matches_balance_after_mixed_operations() {
        let (_env, service, mut wallet) = setup();

        service
            .earn(&mut wallet, &learning_app(), 20, 20, Utc::now())
            .unwrap();
        service
            .spend(&mut wallet, &reward_app(), 5, Utc::now())
            .unwrap();
        service
            .adjust_balance(&mut wallet, 7, AdjustmentKind::Bonus, "Bonus", Utc::now())
            .unwrap();
        service
            .adjust_balance(&mut wallet, -3, AdjustmentKind::Penalty, "Penalty", Utc::now())
            .unwrap();
        service.reset_wallet(&mut wallet, 5, Utc::now()).unwrap();

        assert_eq!(service.ledger_sum("child::1").unwrap(), wallet.balance);
        assert_eq!(wallet.balance, 5);
    }

    #[test]
    fn test_history_is_paginated_most_recent_first() {
        let (_env, service, mut wallet) = setup();
        let config = learning_app();
        let base = Utc::now();

        for i in 0..5 {
            let at = base + chrono::Duration::milliseconds(i * 10);
            service.earn(&mut wallet, &config, 1, 1, at).unwrap();
        }

        let first_page = service
            .list_history(&TransactionListQuery {
                child_id: "child::1".to_string(),
                limit: Some(2),
                after: None,
            })
            .unwrap();

        assert_eq!(first_page.transactions.len(), 2);
        assert!(first_page.pagination.has_more);
        assert!(
            first_page.transactions[0].timestamp >= first_page.transactions[1].timestamp
        );

        let second_page = service
            .list_history(&TransactionListQuery {
                child_id: "child::1".to_string(),
                limit: Some(2),
                after: first_page.pagination.next_cursor.clone(),
            })
            .unwrap();

        assert_eq!(second_page.transactions.len(), 2);
        assert!(second_page.pagination.has_more);

        let third_page = service
            .list_history(&TransactionListQuery {
                child_id: "child::1".to_string(),
                limit: Some(2),
                after: second_page.pagination.next_cursor.clone(),
            })
            .unwrap();

        assert_eq!(third_page.transactions.len(), 1);
        assert!(!third_page.pagination.has_more);
    }

    #[test]
    fn test_committed_wallet_is_persisted() {
        let (env, service, mut wallet) = setup();

        service
            .earn(&mut wallet, &learning_app(), 10, 10, Utc::now())
            .unwrap();

        let stored = env
            .connection
            .create_wallet_repository()
            .get_wallet("child::1")
            .unwrap()
            .unwrap();
        assert_eq!(stored, wallet);
    }
}
