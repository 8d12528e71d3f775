//! CSV-based app configuration repository.
//!
//! The registry is global (not per child): one `app_configs.csv` at the root
//! of the data directory, rewritten atomically on every change.

use anyhow::{anyhow, Context, Result};
use csv::{Reader, StringRecord, Writer};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use crate::domain::models::app_config::{AppCategory, AppConfig};
use crate::storage::traits::AppConfigStorage;

const HEADERS: [&str; 6] = [
    "app_id",
    "display_name",
    "category",
    "coinz_rate",
    "daily_time_limit",
    "is_enabled",
];

#[derive(Clone)]
pub struct AppConfigRepository {
    connection: CsvConnection,
}

impl AppConfigRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn parse_record(record: &StringRecord) -> Result<AppConfig> {
        let field = |index: usize| record.get(index).unwrap_or("");

        Ok(AppConfig {
            app_id: field(0).to_string(),
            display_name: field(1).to_string(),
            category: AppCategory::parse(field(2))
                .ok_or_else(|| anyhow!("unknown app category '{}'", field(2)))?,
            coinz_rate: field(3).parse().context("invalid coinz_rate")?,
            daily_time_limit: field(4).parse().context("invalid daily_time_limit")?,
            is_enabled: field(5) == "true",
        })
    }

    fn read_configs(&self) -> Result<Vec<AppConfig>> {
        let file_path = self.connection.app_configs_file_path();
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut configs = Vec::new();
        for result in csv_reader.records() {
            configs.push(Self::parse_record(&result?)?);
        }
        Ok(configs)
    }

    fn write_configs(&self, configs: &[AppConfig]) -> Result<()> {
        let file_path = self.connection.app_configs_file_path();
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(file));

            csv_writer.write_record(HEADERS)?;
            for config in configs {
                let fields: [String; 6] = [
                    config.app_id.clone(),
                    config.display_name.clone(),
                    config.category.as_str().to_string(),
                    config.coinz_rate.to_string(),
                    config.daily_time_limit.to_string(),
                    config.is_enabled.to_string(),
                ];
                csv_writer.write_record(&fields)?;
            }
            csv_writer.flush()?;
        }

        fs::rename(&temp_path, &file_path)?;
        Ok(())
    }
}

impl AppConfigStorage for AppConfigRepository {
    fn store_app_config(&self, config: &AppConfig) -> Result<()> {
        let mut configs = self.read_configs()?;
        match configs.iter_mut().find(|c| c.app_id == config.app_id) {
            Some(existing) => *existing = config.clone(),
            None => configs.push(config.clone()),
        }
        configs.sort_by(|a, b| a.app_id.cmp(&b.app_id));
        self.write_configs(&configs)
    }

    fn get_app_config(&self, app_id: &str) -> Result<Option<AppConfig>> {
        Ok(self
            .read_configs()?
            .into_iter()
            .find(|c| c.app_id == app_id))
    }

    fn list_app_configs(&self) -> Result<Vec<AppConfig>> {
        self.read_configs()
    }

    fn delete_app_config(&self, app_id: &str) -> Result<bool> {
        let mut configs = self.read_configs()?;
        let before = configs.len();
        configs.retain(|c| c.app_id != app_id);
        if configs.len() == before {
            return Ok(false);
        }
        self.write_configs(&configs)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;
    use crate::storage::traits::Connection;

    fn config(app_id: &str, rate: i64) -> AppConfig {
        AppConfig {
            app_id: app_id.to_string(),
            display_name: "Some App".to_string(),
            category: if rate >= 0 {
                AppCategory::Learning
            } else {
                AppCategory::Reward
            },
            coinz_rate: rate,
            daily_time_limit: 30,
            is_enabled: true,
        }
    }

    #[test]
    fn test_store_and_get_config() {
        let env = TestEnvironment::new().unwrap();
        let repo = env.connection.create_app_config_repository();
        let stored = config("com.example.math", 1);

        repo.store_app_config(&stored).unwrap();
        assert_eq!(
            repo.get_app_config("com.example.math").unwrap().unwrap(),
            stored
        );
    }

    #[test]
    fn test_store_replaces_existing_config() {
        let env = TestEnvironment::new().unwrap();
        let repo = env.connection.create_app_config_repository();

        repo.store_app_config(&config("com.example.math", 1)).unwrap();
        repo.store_app_config(&config("com.example.math", 3)).unwrap();

        let configs = repo.list_app_configs().unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].coinz_rate, 3);
    }

    #[test]
    fn test_list_is_sorted_by_app_id() {
        let env = TestEnvironment::new().unwrap();
        let repo = env.connection.create_app_config_repository();

        repo.store_app_config(&config("com.example.zebra", 1)).unwrap();
        repo.store_app_config(&config("com.example.apple", 1)).unwrap();

        let configs = repo.list_app_configs().unwrap();
        assert_eq!(configs[0].app_id, "com.example.apple");
        assert_eq!(configs[1].app_id, "com.example.zebra");
    }

    #[test]
    fn test_delete_config() {
        let env = TestEnvironment::new().unwrap();
        let repo = env.connection.create_app_config_repository();
        repo.store_app_config(&config("com.example.math", 1)).unwrap();

        assert!(repo.delete_app_config("com.example.math").unwrap());
        assert!(!repo.delete_app_config("com.example.math").unwrap());
        assert!(repo.get_app_config("com.example.math").unwrap().is_none());
    }
}
