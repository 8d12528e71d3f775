//! The three-tier purchase gate.
//!
//! Pure decision functions evaluated against a wallet snapshot and an app
//! config before any spend is committed. The tiers run in a fixed order and
//! the first failure wins:
//!
//! 1. learning gate — today's minimum learning minutes must be met
//! 2. balance gate — the wallet must cover the full cost
//! 3. daily time gate — the app's per-day ceiling must not be exceeded
//!
//! `spend` re-checks only the balance; running this gate first is the
//! caller's responsibility.

use crate::domain::errors::EconomyError;
use crate::domain::models::app_config::{AppCategory, AppConfig};
use crate::domain::models::wallet::Wallet;

/// Evaluate whether `minutes` of reward time in `config` can be purchased
/// right now. Returns the first failing tier's reason.
///
/// Requests that are not expressible at all — a disabled or non-reward app,
/// or zero minutes — are rejected before tier 1.
pub fn can_purchase(wallet: &Wallet, config: &AppConfig, minutes: u32) -> Result<(), EconomyError> {
    if !config.is_enabled {
        return Err(EconomyError::AppNotConfigured {
            app_id: config.app_id.clone(),
            reason: "app is disabled".to_string(),
        });
    }
    if config.category != AppCategory::Reward {
        return Err(EconomyError::AppNotConfigured {
            app_id: config.app_id.clone(),
            reason: "not a reward app".to_string(),
        });
    }
    if minutes == 0 {
        return Err(EconomyError::InvalidAmount(
            "purchase must request at least one minute".to_string(),
        ));
    }

    // Tier 1: learning gate
    if !wallet.learning_requirement_met() {
        return Err(EconomyError::LearningRequirementNotMet {
            required: wallet.minimum_daily_learning_minutes,
            completed: wallet.daily_learning_minutes,
        });
    }

    // Tier 2: balance gate
    let cost = config.rate_magnitude() * i64::from(minutes);
    if cost > wallet.balance {
        return Err(EconomyError::InsufficientBalance {
            needed: cost,
            available: wallet.balance,
            shortfall: cost - wallet.balance,
        });
    }

    // Tier 3: daily time gate
    if !config.is_unlimited() {
        let used = wallet.reward_minutes_used_today(&config.app_id);
        let remaining = config.daily_time_limit.saturating_sub(used);
        if minutes > remaining {
            if remaining == 0 {
                return Err(EconomyError::DailyLimitReached {
                    app_id: config.app_id.clone(),
                    limit: config.daily_time_limit,
                });
            }
            return Err(EconomyError::DailyLimitPartial {
                app_id: config.app_id.clone(),
                remaining,
                requested: minutes,
            });
        }
    }

    Ok(())
}

/// Largest number of minutes that would currently pass the gate: 0 when the
/// learning gate fails, otherwise the lesser of what the balance covers and
/// what remains of the daily ceiling (unlimited ceilings cap at `u32::MAX`).
pub fn affordable_minutes(wallet: &Wallet, config: &AppConfig) -> u32 {
    if !config.is_enabled || config.category != AppCategory::Reward {
        return 0;
    }
    if !wallet.learning_requirement_met() {
        return 0;
    }

    let rate = config.rate_magnitude();
    if rate == 0 || wallet.balance <= 0 {
        return 0;
    }

    let by_balance = (wallet.balance / rate) as u64;
    let by_limit = if config.is_unlimited() {
        u64::from(u32::MAX)
    } else {
        u64::from(
            config
                .daily_time_limit
                .saturating_sub(wallet.reward_minutes_used_today(&config.app_id)),
        )
    };

    by_balance.min(by_limit).min(u64::from(u32::MAX)) as u32
}
