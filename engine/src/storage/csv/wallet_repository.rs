//! CSV-based wallet repository.
//!
//! One `wallet.csv` per child with a single data row of flat key-value
//! columns plus the `last_modified` stamp. Writes go to a temp file and are
//! renamed into place, so a wallet record is never observed half-written.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use csv::{Reader, StringRecord, Writer};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::connection::CsvConnection;
use crate::domain::models::wallet::Wallet;
use crate::storage::traits::WalletStorage;

const HEADERS: [&str; 12] = [
    "child_id",
    "balance",
    "total_earned",
    "total_spent",
    "daily_earned",
    "daily_spent",
    "daily_learning_minutes",
    "total_learning_minutes",
    "daily_reward_usage",
    "minimum_daily_learning_minutes",
    "last_reset_date",
    "last_modified",
];

#[derive(Clone)]
pub struct WalletRepository {
    connection: CsvConnection,
}

impl WalletRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn parse_record(record: &StringRecord) -> Result<Wallet> {
        let field = |index: usize| record.get(index).unwrap_or("");

        Ok(Wallet {
            child_id: field(0).to_string(),
            balance: field(1).parse().context("invalid balance")?,
            total_earned: field(2).parse().context("invalid total_earned")?,
            total_spent: field(3).parse().context("invalid total_spent")?,
            daily_earned: field(4).parse().context("invalid daily_earned")?,
            daily_spent: field(5).parse().context("invalid daily_spent")?,
            daily_learning_minutes: field(6)
                .parse()
                .context("invalid daily_learning_minutes")?,
            total_learning_minutes: field(7)
                .parse()
                .context("invalid total_learning_minutes")?,
            daily_reward_usage: serde_json::from_str(field(8))
                .context("invalid daily_reward_usage")?,
            minimum_daily_learning_minutes: field(9)
                .parse()
                .context("invalid minimum_daily_learning_minutes")?,
            last_reset_date: NaiveDate::parse_from_str(field(10), "%Y-%m-%d")
                .context("invalid last_reset_date")?,
            last_modified: DateTime::parse_from_rfc3339(field(11))
                .context("invalid last_modified")?
                .with_timezone(&Utc),
        })
    }

    fn read_wallet_file(path: &Path) -> Result<Option<Wallet>> {
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));
        match csv_reader.records().next() {
            Some(record) => Ok(Some(Self::parse_record(&record?)?)),
            None => Ok(None),
        }
    }
}

impl WalletStorage for WalletRepository {
    fn store_wallet(&self, wallet: &Wallet) -> Result<()> {
        self.connection.ensure_child_directory(&wallet.child_id)?;
        let file_path = self.connection.wallet_file_path(&wallet.child_id);
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(file));

            csv_writer.write_record(HEADERS)?;
            let fields: [String; 12] = [
                wallet.child_id.clone(),
                wallet.balance.to_string(),
                wallet.total_earned.to_string(),
                wallet.total_spent.to_string(),
                wallet.daily_earned.to_string(),
                wallet.daily_spent.to_string(),
                wallet.daily_learning_minutes.to_string(),
                wallet.total_learning_minutes.to_string(),
                serde_json::to_string(&wallet.daily_reward_usage)?,
                wallet.minimum_daily_learning_minutes.to_string(),
                wallet.last_reset_date.format("%Y-%m-%d").to_string(),
                wallet.last_modified.to_rfc3339(),
            ];
            csv_writer.write_record(&fields)?;
            csv_writer.flush()?;
        }

        fs::rename(&temp_path, &file_path)?;
        Ok(())
    }

    fn get_wallet(&self, child_id: &str) -> Result<Option<Wallet>> {
        let path = self.connection.wallet_file_path(child_id);
        let wallet = Self::read_wallet_file(&path)?;
        if let Some(ref wallet) = wallet {
            if wallet.child_id != child_id {
                return Err(anyhow!(
                    "wallet file for {} contains child {}",
                    child_id,
                    wallet.child_id
                ));
            }
        }
        Ok(wallet)
    }

    fn list_wallets(&self) -> Result<Vec<Wallet>> {
        let mut wallets = Vec::new();
        for entry in fs::read_dir(self.connection.base_directory())? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(wallet) = Self::read_wallet_file(&entry.path().join("wallet.csv"))? {
                wallets.push(wallet);
            }
        }
        wallets.sort_by(|a, b| a.child_id.cmp(&b.child_id));
        Ok(wallets)
    }
}
