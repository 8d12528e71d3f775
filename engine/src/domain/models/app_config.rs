//! Domain model for per-application configuration.

use serde::{Deserialize, Serialize};

/// Category a tracked application belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppCategory {
    /// Earns Coinz per minute of use
    Learning,
    /// Costs Coinz per minute of purchased time
    Reward,
    /// Tracked but neither earns nor costs
    Neutral,
}

impl AppCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppCategory::Learning => "learning",
            AppCategory::Reward => "reward",
            AppCategory::Neutral => "neutral",
        }
    }

    pub fn parse(value: &str) -> Option<AppCategory> {
        match value {
            "learning" => Some(AppCategory::Learning),
            "reward" => Some(AppCategory::Reward),
            "neutral" => Some(AppCategory::Neutral),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppConfigError {
    #[error("app id cannot be empty")]
    EmptyAppId,
    #[error("display name cannot be empty")]
    EmptyDisplayName,
    #[error("learning app '{0}' must have a positive Coinz rate")]
    NonPositiveLearningRate(String),
    #[error("reward app '{0}' must have a negative Coinz rate")]
    NonNegativeRewardRate(String),
}

/// Parent-editable configuration for one tracked application.
///
/// The sign of `coinz_rate` encodes direction and must match the category:
/// positive for learning (earning), negative for reward (cost). The
/// magnitude is what cost and earning computations use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub app_id: String,
    pub display_name: String,
    pub category: AppCategory,
    /// Signed Coinz per minute
    pub coinz_rate: i64,
    /// Minutes per day the reward app may be purchased; 0 means unlimited
    pub daily_time_limit: u32,
    pub is_enabled: bool,
}

impl AppConfig {
    /// Validate the rate-sign convention against the category.
    pub fn validate(&self) -> Result<(), AppConfigError> {
        if self.app_id.trim().is_empty() {
            return Err(AppConfigError::EmptyAppId);
        }
        if self.display_name.trim().is_empty() {
            return Err(AppConfigError::EmptyDisplayName);
        }
        match self.category {
            AppCategory::Learning if self.coinz_rate <= 0 => Err(
                AppConfigError::NonPositiveLearningRate(self.app_id.clone()),
            ),
            AppCategory::Reward if self.coinz_rate >= 0 => {
                Err(AppConfigError::NonNegativeRewardRate(self.app_id.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Magnitude of the per-minute rate, used for cost/earning computation.
    pub fn rate_magnitude(&self) -> i64 {
        self.coinz_rate.abs()
    }

    /// Whether the daily time ceiling is disabled for this app.
    pub fn is_unlimited(&self) -> bool {
        self.daily_time_limit == 0
    }
}
