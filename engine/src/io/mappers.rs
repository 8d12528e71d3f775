//! Mapping between domain types and the `shared` DTOs.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::domain::commands::goals::CreateGoalCommand;
use crate::domain::commands::ledger::{
    AdjustBalanceResult, PurchaseRewardTimeResult, RecordLearningTimeResult,
};
use crate::domain::commands::transactions::TransactionListResult;
use crate::domain::errors::EconomyError;
use crate::domain::models::app_config::{AppCategory, AppConfig};
use crate::domain::models::goal::Goal;
use crate::domain::models::transaction::{AdjustmentKind, Transaction, TransactionKind};
use crate::domain::models::wallet::Wallet;
use crate::domain::session::LearningSession;

pub fn app_category_view(category: AppCategory) -> shared::AppCategory {
    match category {
        AppCategory::Learning => shared::AppCategory::Learning,
        AppCategory::Reward => shared::AppCategory::Reward,
        AppCategory::Neutral => shared::AppCategory::Neutral,
    }
}

pub fn app_category_from_view(category: shared::AppCategory) -> AppCategory {
    match category {
        shared::AppCategory::Learning => AppCategory::Learning,
        shared::AppCategory::Reward => AppCategory::Reward,
        shared::AppCategory::Neutral => AppCategory::Neutral,
    }
}

pub fn transaction_kind_view(kind: TransactionKind) -> shared::TransactionKind {
    match kind {
        TransactionKind::Earned => shared::TransactionKind::Earned,
        TransactionKind::Spent => shared::TransactionKind::Spent,
        TransactionKind::Bonus => shared::TransactionKind::Bonus,
        TransactionKind::Penalty => shared::TransactionKind::Penalty,
        TransactionKind::Adjustment => shared::TransactionKind::Adjustment,
    }
}

pub fn adjustment_kind_from_request(kind: shared::AdjustmentKind) -> AdjustmentKind {
    match kind {
        shared::AdjustmentKind::Bonus => AdjustmentKind::Bonus,
        shared::AdjustmentKind::Penalty => AdjustmentKind::Penalty,
        shared::AdjustmentKind::Adjustment => AdjustmentKind::Adjustment,
    }
}

pub fn wallet_snapshot(wallet: &Wallet) -> shared::WalletSnapshot {
    shared::WalletSnapshot {
        child_id: wallet.child_id.clone(),
        balance: wallet.balance,
        total_earned: wallet.total_earned,
        total_spent: wallet.total_spent,
        daily_earned: wallet.daily_earned,
        daily_spent: wallet.daily_spent,
        daily_learning_minutes: wallet.daily_learning_minutes,
        total_learning_minutes: wallet.total_learning_minutes,
        minimum_daily_learning_minutes: wallet.minimum_daily_learning_minutes,
        carryover_balance: wallet.carryover_balance(),
        has_carryover: wallet.has_carryover(),
        last_reset_date: wallet.last_reset_date.format("%Y-%m-%d").to_string(),
        last_modified: wallet.last_modified.to_rfc3339(),
        daily_reward_usage: wallet
            .daily_reward_usage
            .iter()
            .map(|(app_id, minutes)| shared::AppUsage {
                app_id: app_id.clone(),
                minutes_used_today: *minutes,
            })
            .collect(),
    }
}

pub fn transaction_view(transaction: &Transaction) -> shared::TransactionView {
    shared::TransactionView {
        id: transaction.id.clone(),
        wallet_id: transaction.wallet_id.clone(),
        app_id: transaction.app_id.clone(),
        app_display_name: transaction.app_display_name.clone(),
        kind: transaction_kind_view(transaction.kind),
        amount: transaction.amount,
        minutes_involved: transaction.minutes_involved,
        timestamp: transaction.timestamp.to_rfc3339(),
        is_valid: transaction.is_valid,
        description: transaction.description.clone(),
    }
}

pub fn goal_view(goal: &Goal) -> shared::GoalView {
    shared::GoalView {
        id: goal.id.clone(),
        child_id: goal.child_id.clone(),
        title: goal.title.clone(),
        target_coinz: goal.target_coinz,
        bonus_coinz: goal.bonus_coinz,
        eligible_app_ids: goal.eligible_app_ids.iter().cloned().collect(),
        progress: goal.progress,
        remaining_coinz: goal.remaining_coinz(),
        is_completed: goal.is_completed,
        is_active: goal.is_active,
        start_date: goal.start_date.format("%Y-%m-%d").to_string(),
        end_date: goal.end_date.format("%Y-%m-%d").to_string(),
    }
}

pub fn app_config_view(config: &AppConfig) -> shared::AppConfigView {
    shared::AppConfigView {
        app_id: config.app_id.clone(),
        display_name: config.display_name.clone(),
        category: app_category_view(config.category),
        coinz_rate: config.coinz_rate,
        daily_time_limit: config.daily_time_limit,
        is_enabled: config.is_enabled,
    }
}

pub fn app_config_from_request(request: &shared::UpsertAppConfigRequest) -> AppConfig {
    AppConfig {
        app_id: request.app_id.clone(),
        display_name: request.display_name.clone(),
        category: app_category_from_view(request.category),
        coinz_rate: request.coinz_rate,
        daily_time_limit: request.daily_time_limit,
        is_enabled: request.is_enabled,
    }
}

pub fn session_view(session: &LearningSession) -> shared::LearningSessionView {
    shared::LearningSessionView {
        child_id: session.child_id.clone(),
        app_id: session.app_id.clone(),
        started_at: session.started_at.to_rfc3339(),
        minutes_recorded: session.minutes_recorded,
        coinz_earned: session.coinz_earned,
    }
}

/// Map a gate evaluation into the response the UI presents, preserving the
/// distinction between "limit fully used" and "some but insufficient".
pub fn purchase_check_response(result: &Result<(), EconomyError>) -> shared::PurchaseCheckResponse {
    match result {
        Ok(()) => shared::PurchaseCheckResponse::allowed(),
        Err(error) => {
            let kind = match error {
                EconomyError::LearningRequirementNotMet { .. } => {
                    shared::PurchaseDenialKind::LearningRequirementNotMet
                }
                EconomyError::InsufficientBalance { .. } => {
                    shared::PurchaseDenialKind::InsufficientBalance
                }
                EconomyError::DailyLimitReached { .. } => {
                    shared::PurchaseDenialKind::DailyLimitReached
                }
                EconomyError::DailyLimitPartial { .. } => {
                    shared::PurchaseDenialKind::DailyLimitPartial
                }
                EconomyError::AppNotConfigured { .. } => {
                    shared::PurchaseDenialKind::AppNotConfigured
                }
                _ => shared::PurchaseDenialKind::InvalidRequest,
            };
            shared::PurchaseCheckResponse::denied(kind, error.to_string())
        }
    }
}

pub fn earn_response(result: &RecordLearningTimeResult) -> shared::EarnResponse {
    shared::EarnResponse {
        transaction: transaction_view(&result.transaction),
        completed_goals: result.completed_goals.iter().map(goal_view).collect(),
        bonus_transactions: result
            .bonus_transactions
            .iter()
            .map(transaction_view)
            .collect(),
        wallet: wallet_snapshot(&result.wallet),
        success_message: format!(
            "Earned {} Coinz for {} minutes of learning",
            result.transaction.amount, result.transaction.minutes_involved
        ),
    }
}

pub fn purchase_response(result: &PurchaseRewardTimeResult) -> shared::PurchaseResponse {
    shared::PurchaseResponse {
        transaction: transaction_view(&result.transaction),
        wallet: wallet_snapshot(&result.wallet),
        success_message: format!(
            "Unlocked {} minutes for {} Coinz",
            result.transaction.minutes_involved,
            -result.transaction.amount
        ),
    }
}

pub fn adjust_balance_response(result: &AdjustBalanceResult) -> shared::AdjustBalanceResponse {
    shared::AdjustBalanceResponse {
        transaction: transaction_view(&result.transaction),
        wallet: wallet_snapshot(&result.wallet),
        success_message: format!("Balance is now {} Coinz", result.wallet.balance),
    }
}

pub fn transaction_list_response(result: &TransactionListResult) -> shared::TransactionListResponse {
    shared::TransactionListResponse {
        transactions: result.transactions.iter().map(transaction_view).collect(),
        pagination: shared::PaginationInfo {
            has_more: result.pagination.has_more,
            next_cursor: result.pagination.next_cursor.clone(),
        },
    }
}

/// Parse a goal-creation request, validating its ISO 8601 dates.
pub fn create_goal_command(request: &shared::CreateGoalRequest) -> Result<CreateGoalCommand> {
    let start_date = NaiveDate::parse_from_str(&request.start_date, "%Y-%m-%d")
        .with_context(|| format!("invalid goal start date '{}'", request.start_date))?;
    let end_date = NaiveDate::parse_from_str(&request.end_date, "%Y-%m-%d")
        .with_context(|| format!("invalid goal end date '{}'", request.end_date))?;

    Ok(CreateGoalCommand {
        child_id: request.child_id.clone(),
        title: request.title.clone(),
        target_coinz: request.target_coinz,
        bonus_coinz: request.bonus_coinz,
        eligible_app_ids: request.eligible_app_ids.clone(),
        start_date,
        end_date,
    })
}
