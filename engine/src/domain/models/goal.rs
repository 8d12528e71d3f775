//! Domain model for a parent-defined Coinz goal.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GoalValidationError {
    #[error("Goal title cannot be empty")]
    EmptyTitle,
    #[error("Goal title cannot exceed 256 characters")]
    TitleTooLong,
    #[error("Goal target must be a positive number of Coinz")]
    NonPositiveTarget,
    #[error("Goal bonus cannot be negative")]
    NegativeBonus,
    #[error("Goal must name at least one eligible learning app")]
    NoEligibleApps,
    #[error("Goal end date cannot be before its start date")]
    EndBeforeStart,
}

/// A multi-day Coinz target tied to specific learning apps.
///
/// Progress accrues from earn events of eligible apps while the goal is
/// active and not expired. `is_completed` latches exactly once, the instant
/// progress reaches the target, and never reverts; progress keeps
/// accumulating past the target without re-triggering completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub child_id: String,
    pub title: String,
    pub target_coinz: i64,
    /// Bonus issued by the caller when the goal completes
    pub bonus_coinz: i64,
    /// Learning apps whose earnings count toward this goal
    pub eligible_app_ids: BTreeSet<String>,
    pub progress: i64,
    pub is_completed: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Parent-controlled flag; cleared by cancellation
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn generate_id(child_id: &str, epoch_millis: i64) -> String {
        format!("goal::{}::{}", child_id, epoch_millis)
    }

    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if self.title.trim().is_empty() {
            return Err(GoalValidationError::EmptyTitle);
        }
        if self.title.len() > 256 {
            return Err(GoalValidationError::TitleTooLong);
        }
        if self.target_coinz <= 0 {
            return Err(GoalValidationError::NonPositiveTarget);
        }
        if self.bonus_coinz < 0 {
            return Err(GoalValidationError::NegativeBonus);
        }
        if self.eligible_app_ids.is_empty() {
            return Err(GoalValidationError::NoEligibleApps);
        }
        if self.end_date < self.start_date {
            return Err(GoalValidationError::EndBeforeStart);
        }
        Ok(())
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        today > self.end_date
    }

    /// Whether the goal can still accrue progress.
    pub fn is_open(&self, today: NaiveDate) -> bool {
        self.is_active && !self.is_expired(today)
    }

    /// Coinz still needed to reach the target; 0 once reached.
    pub fn remaining_coinz(&self) -> i64 {
        (self.target_coinz - self.progress).max(0)
    }

    /// Apply one earn event from an eligible app.
    ///
    /// Returns `true` exactly on the call where cumulative progress first
    /// reaches the target. Earn events outside the goal's window or from
    /// non-eligible apps are no-ops.
    pub fn apply_earning(&mut self, app_id: &str, earned_amount: i64, today: NaiveDate) -> bool {
        if !self.is_open(today) || !self.eligible_app_ids.contains(app_id) || earned_amount <= 0 {
            return false;
        }

        self.progress += earned_amount;
        if self.progress >= self.target_coinz && !self.is_completed {
            self.is_completed = true;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_goal() -> Goal {
        Goal {
            id: Goal::generate_id("child::1", 1702516122000),
            child_id: "child::1".to_string(),
            title: "Practice math every day".to_string(),
            target_coinz: 50,
            bonus_coinz: 10,
            eligible_app_ids: ["com.example.math".to_string()].into_iter().collect(),
            progress: 0,
            is_completed: false,
            start_date: date(2025, 6, 16),
            end_date: date(2025, 6, 22),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_completion_fires_exactly_once() {
        let mut goal = test_goal();
        let today = date(2025, 6, 19);

        assert!(!goal.apply_earning("com.example.math", 20, today));
        assert!(!goal.apply_earning("com.example.math", 20, today));
        // 40 + 20 crosses the 50 target here
        assert!(goal.apply_earning("com.example.math", 20, today));
        assert!(goal.is_completed);
        assert_eq!(goal.progress, 60);

        // Further earnings keep accumulating without re-triggering
        assert!(!goal.apply_earning("com.example.math", 20, today));
        assert_eq!(goal.progress, 80);
        assert!(goal.is_completed);
    }

    #[test]
    fn test_non_eligible_app_does_not_advance_progress() {
        let mut goal = test_goal();
        let today = date(2025, 6, 19);

        assert!(!goal.apply_earning("com.example.reading", 30, today));
        assert_eq!(goal.progress, 0);
    }

    #[test]
    fn test_expired_goal_ignores_earnings() {
        let mut goal = test_goal();
        let after_end = date(2025, 6, 23);

        assert!(goal.is_expired(after_end));
        assert!(!goal.apply_earning("com.example.math", 30, after_end));
        assert_eq!(goal.progress, 0);
    }

    #[test]
    fn test_last_day_still_counts() {
        let mut goal = test_goal();
        let end = date(2025, 6, 22);

        assert!(!goal.is_expired(end));
        assert!(!goal.apply_earning("com.example.math", 30, end));
        assert_eq!(goal.progress, 30);
    }

    #[test]
    fn test_cancelled_goal_ignores_earnings() {
        let mut goal = test_goal();
        goal.is_active = false;

        assert!(!goal.apply_earning("com.example.math", 30, date(2025, 6, 19)));
        assert_eq!(goal.progress, 0);
    }

    #[test]
    fn test_remaining_coinz_floors_at_zero() {
        let mut goal = test_goal();
        assert_eq!(goal.remaining_coinz(), 50);
        goal.progress = 45;
        assert_eq!(goal.remaining_coinz(), 5);
        goal.progress = 70;
        assert_eq!(goal.remaining_coinz(), 0);
    }

    #[test]
    fn test_validate_rejects_bad_goals() {
        let mut goal = test_goal();
        goal.title = "  ".to_string();
        assert_eq!(goal.validate(), Err(GoalValidationError::EmptyTitle));

        let mut goal = test_goal();
        goal.title = "x".repeat(257);
        assert_eq!(goal.validate(), Err(GoalValidationError::TitleTooLong));

        let mut goal = test_goal();
        goal.target_coinz = 0;
        assert_eq!(goal.validate(), Err(GoalValidationError::NonPositiveTarget));

        let mut goal = test_goal();
        goal.bonus_coinz = -5;
        assert_eq!(goal.validate(), Err(GoalValidationError::NegativeBonus));

        let mut goal = test_goal();
        goal.eligible_app_ids.clear();
        assert_eq!(goal.validate(), Err(GoalValidationError::NoEligibleApps));

        let mut goal = test_goal();
        goal.end_date = date(2025, 6, 10);
        assert_eq!(goal.validate(), Err(GoalValidationError::EndBeforeStart));
    }
}
