//! Goal tracking for parent-defined multi-day Coinz targets.
//!
//! The tracker observes earn events for eligible learning apps and reports
//! completions back to the caller. It never calls the ledger itself: bonus
//! issuance stays the caller's job so the two remain composable and
//! independently testable.

use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, Utc};
use log::info;
use std::sync::Arc;

use crate::domain::commands::goals::{CancelGoalCommand, CreateGoalCommand};
use crate::domain::models::goal::Goal;
use crate::storage::{Connection, GoalStorage};

#[derive(Clone)]
pub struct GoalService<C: Connection> {
    goal_repository: C::GoalRepository,
}

impl<C: Connection> GoalService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            goal_repository: connection.create_goal_repository(),
        }
    }

    /// Create a new goal. A child may have any number of concurrently
    /// active goals; each one tracks and completes independently.
    pub fn create_goal(&self, command: CreateGoalCommand, now: DateTime<Utc>) -> Result<Goal> {
        let goal = Goal {
            id: Goal::generate_id(&command.child_id, now.timestamp_millis()),
            child_id: command.child_id,
            title: command.title.trim().to_string(),
            target_coinz: command.target_coinz,
            bonus_coinz: command.bonus_coinz,
            eligible_app_ids: command.eligible_app_ids.into_iter().collect(),
            progress: 0,
            is_completed: false,
            start_date: command.start_date,
            end_date: command.end_date,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        goal.validate()?;

        self.goal_repository.store_goal(&goal)?;
        info!(
            "Created goal {} for {} (target {} Coinz, bonus {})",
            goal.id, goal.child_id, goal.target_coinz, goal.bonus_coinz
        );
        Ok(goal)
    }

    /// Cancel a goal: it stops accruing progress but stays in history.
    pub fn cancel_goal(&self, command: CancelGoalCommand, now: DateTime<Utc>) -> Result<Goal> {
        let mut goal = match self
            .goal_repository
            .get_goal(&command.child_id, &command.goal_id)?
        {
            Some(goal) => goal,
            None => bail!("No goal {} found for {}", command.goal_id, command.child_id),
        };
        if !goal.is_active {
            bail!("Goal {} is already inactive", goal.id);
        }

        goal.is_active = false;
        goal.updated_at = now;
        self.goal_repository.update_goal(&goal)?;
        info!("Cancelled goal {} for {}", goal.id, goal.child_id);
        Ok(goal)
    }

    pub fn get_goal(&self, child_id: &str, goal_id: &str) -> Result<Option<Goal>> {
        self.goal_repository.get_goal(child_id, goal_id)
    }

    /// All goals for a child, oldest first.
    pub fn list_goals(&self, child_id: &str) -> Result<Vec<Goal>> {
        self.goal_repository.list_goals(child_id)
    }

    /// Apply one earn event to every open eligible goal of the child.
    ///
    /// Returns the goals that completed on exactly this event, in storage
    /// order, for the caller to issue bonuses.
    pub fn record_earning(
        &self,
        child_id: &str,
        app_id: &str,
        earned_amount: i64,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<Goal>> {
        if earned_amount <= 0 {
            return Ok(Vec::new());
        }

        let mut completed_now = Vec::new();
        for mut goal in self.goal_repository.list_goals(child_id)? {
            if !goal.is_open(today) || !goal.eligible_app_ids.contains(app_id) {
                continue;
            }

            let crossed = goal.apply_earning(app_id, earned_amount, today);
            goal.updated_at = now;
            self.goal_repository.update_goal(&goal)?;

            if crossed {
                info!(
                    "Goal {} completed for {} at {} of {} Coinz",
                    goal.id, child_id, goal.progress, goal.target_coinz
                );
                completed_now.push(goal);
            }
        }
        Ok(completed_now)
    }
}
