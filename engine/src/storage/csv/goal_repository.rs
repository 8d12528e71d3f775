//! CSV-based goal repository.
//!
//! One `goals.csv` per child; goals are updated in place via an atomic
//! whole-file rewrite so progress updates survive crashes cleanly.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::{Reader, StringRecord, Writer};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use crate::domain::models::goal::Goal;
use crate::storage::traits::GoalStorage;

const HEADERS: [&str; 13] = [
    "id",
    "child_id",
    "title",
    "target_coinz",
    "bonus_coinz",
    "eligible_app_ids",
    "progress",
    "is_completed",
    "start_date",
    "end_date",
    "is_active",
    "created_at",
    "updated_at",
];

#[derive(Clone)]
pub struct GoalRepository {
    connection: CsvConnection,
}

impl GoalRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn parse_record(record: &StringRecord) -> Result<Goal> {
        let field = |index: usize| record.get(index).unwrap_or("");
        let date = |index: usize, name: &str| {
            NaiveDate::parse_from_str(field(index), "%Y-%m-%d")
                .with_context(|| format!("invalid {}", name))
        };
        let timestamp = |index: usize, name: &str| {
            DateTime::parse_from_rfc3339(field(index))
                .with_context(|| format!("invalid {}", name))
                .map(|t| t.with_timezone(&Utc))
        };

        Ok(Goal {
            id: field(0).to_string(),
            child_id: field(1).to_string(),
            title: field(2).to_string(),
            target_coinz: field(3).parse().context("invalid target_coinz")?,
            bonus_coinz: field(4).parse().context("invalid bonus_coinz")?,
            eligible_app_ids: serde_json::from_str(field(5))
                .context("invalid eligible_app_ids")?,
            progress: field(6).parse().context("invalid progress")?,
            is_completed: field(7) == "true",
            start_date: date(8, "start_date")?,
            end_date: date(9, "end_date")?,
            is_active: field(10) == "true",
            created_at: timestamp(11, "created_at")?,
            updated_at: timestamp(12, "updated_at")?,
        })
    }

    fn read_goals(&self, child_id: &str) -> Result<Vec<Goal>> {
        let file_path = self.connection.goals_file_path(child_id);
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut goals = Vec::new();
        for result in csv_reader.records() {
            goals.push(Self::parse_record(&result?)?);
        }
        Ok(goals)
    }

    fn write_goals(&self, child_id: &str, goals: &[Goal]) -> Result<()> {
        self.connection.ensure_child_directory(child_id)?;
        let file_path = self.connection.goals_file_path(child_id);
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(file));

            csv_writer.write_record(HEADERS)?;
            for goal in goals {
                let fields: [String; 13] = [
                    goal.id.clone(),
                    goal.child_id.clone(),
                    goal.title.clone(),
                    goal.target_coinz.to_string(),
                    goal.bonus_coinz.to_string(),
                    serde_json::to_string(&goal.eligible_app_ids)?,
                    goal.progress.to_string(),
                    goal.is_completed.to_string(),
                    goal.start_date.format("%Y-%m-%d").to_string(),
                    goal.end_date.format("%Y-%m-%d").to_string(),
                    goal.is_active.to_string(),
                    goal.created_at.to_rfc3339(),
                    goal.updated_at.to_rfc3339(),
                ];
                csv_writer.write_record(&fields)?;
            }
            csv_writer.flush()?;
        }

        fs::rename(&temp_path, &file_path)?;
        Ok(())
    }
}

impl GoalStorage for GoalRepository {
    fn store_goal(&self, goal: &Goal) -> Result<()> {
        let mut goals = self.read_goals(&goal.child_id)?;
        if goals.iter().any(|g| g.id == goal.id) {
            return Err(anyhow!("goal {} already exists", goal.id));
        }
        goals.push(goal.clone());
        self.write_goals(&goal.child_id, &goals)
    }

    fn get_goal(&self, child_id: &str, goal_id: &str) -> Result<Option<Goal>> {
        Ok(self
            .read_goals(child_id)?
            .into_iter()
            .find(|g| g.id == goal_id))
    }

    fn list_goals(&self, child_id: &str) -> Result<Vec<Goal>> {
        let mut goals = self.read_goals(child_id)?;
        goals.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(goals)
    }

    fn update_goal(&self, goal: &Goal) -> Result<()> {
        let mut goals = self.read_goals(&goal.child_id)?;
        match goals.iter_mut().find(|g| g.id == goal.id) {
            Some(existing) => *existing = goal.clone(),
            None => return Err(anyhow!("no goal {} to update", goal.id)),
        }
        self.write_goals(&goal.child_id, &goals)
    }
}
