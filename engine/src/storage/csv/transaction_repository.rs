//! CSV-based transaction repository.
//!
//! One append-only `transactions.csv` per child. The whole file is rewritten
//! through a temp-file rename on every store, which keeps writes atomic on
//! the filesystems the app targets.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use csv::{Reader, StringRecord, Writer};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter};

use super::connection::CsvConnection;
use crate::domain::models::transaction::{Transaction, TransactionKind};
use crate::storage::traits::TransactionStorage;

const HEADERS: [&str; 10] = [
    "id",
    "wallet_id",
    "app_id",
    "app_display_name",
    "kind",
    "amount",
    "minutes_involved",
    "timestamp",
    "is_valid",
    "description",
];

#[derive(Clone)]
pub struct TransactionRepository {
    connection: CsvConnection,
}

impl TransactionRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn parse_record(record: &StringRecord) -> Result<Transaction> {
        let field = |index: usize| record.get(index).unwrap_or("");
        let optional = |index: usize| match record.get(index) {
            Some("") | None => None,
            Some(value) => Some(value.to_string()),
        };

        Ok(Transaction {
            id: field(0).to_string(),
            wallet_id: field(1).to_string(),
            app_id: optional(2),
            app_display_name: optional(3),
            kind: TransactionKind::parse(field(4))
                .ok_or_else(|| anyhow!("unknown transaction kind '{}'", field(4)))?,
            amount: field(5).parse().context("invalid amount")?,
            minutes_involved: field(6).parse().context("invalid minutes_involved")?,
            timestamp: DateTime::parse_from_rfc3339(field(7))
                .context("invalid timestamp")?
                .with_timezone(&Utc),
            is_valid: field(8) == "true",
            description: field(9).to_string(),
        })
    }

    fn read_transactions(&self, child_id: &str) -> Result<Vec<Transaction>> {
        let file_path = self.connection.transactions_file_path(child_id);
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut transactions = Vec::new();
        for result in csv_reader.records() {
            transactions.push(Self::parse_record(&result?)?);
        }
        Ok(transactions)
    }

    fn write_transactions(&self, child_id: &str, transactions: &[Transaction]) -> Result<()> {
        self.connection.ensure_child_directory(child_id)?;
        let file_path = self.connection.transactions_file_path(child_id);
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(file));

            csv_writer.write_record(HEADERS)?;
            for transaction in transactions {
                let fields: [String; 10] = [
                    transaction.id.clone(),
                    transaction.wallet_id.clone(),
                    transaction.app_id.clone().unwrap_or_default(),
                    transaction.app_display_name.clone().unwrap_or_default(),
                    transaction.kind.as_str().to_string(),
                    transaction.amount.to_string(),
                    transaction.minutes_involved.to_string(),
                    transaction.timestamp.to_rfc3339(),
                    transaction.is_valid.to_string(),
                    transaction.description.clone(),
                ];
                csv_writer.write_record(&fields)?;
            }
            csv_writer.flush()?;
        }

        fs::rename(&temp_path, &file_path)?;
        Ok(())
    }
}

impl TransactionStorage for TransactionRepository {
    fn store_transaction(&self, transaction: &Transaction) -> Result<()> {
        let mut transactions = self.read_transactions(&transaction.wallet_id)?;
        if transactions.iter().any(|t| t.id == transaction.id) {
            return Err(anyhow!("transaction {} already exists", transaction.id));
        }
        transactions.push(transaction.clone());
        self.write_transactions(&transaction.wallet_id, &transactions)
    }

    fn get_transaction(
        &self,
        child_id: &str,
        transaction_id: &str,
    ) -> Result<Option<Transaction>> {
        Ok(self
            .read_transactions(child_id)?
            .into_iter()
            .find(|t| t.id == transaction_id))
    }

    fn list_transactions(
        &self,
        child_id: &str,
        limit: Option<u32>,
        after: Option<String>,
    ) -> Result<Vec<Transaction>> {
        let mut transactions = self.read_transactions(child_id)?;
        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

        if let Some(after_id) = after {
            if let Some(position) = transactions.iter().position(|t| t.id == after_id) {
                transactions.drain(..=position);
            }
        }
        if let Some(limit) = limit {
            transactions.truncate(limit as usize);
        }
        Ok(transactions)
    }

    fn list_transactions_chronological(&self, child_id: &str) -> Result<Vec<Transaction>> {
        let mut transactions = self.read_transactions(child_id)?;
        transactions.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;
    use crate::storage::traits::Connection;
    use chrono::Duration;

    fn transaction(id: &str, amount: i64, timestamp: DateTime<Utc>) -> Transaction {
        Transaction {
            id: id.to_string(),
            wallet_id: "child::1".to_string(),
            app_id: Some("com.example.math".to_string()),
            app_display_name: Some("Math Practice".to_string()),
            kind: if amount >= 0 {
                TransactionKind::Earned
            } else {
                TransactionKind::Spent
            },
            amount,
            minutes_involved: 5,
            timestamp,
            is_valid: true,
            description: "Test transaction".to_string(),
        }
    }

    #[test]
    fn test_store_and_retrieve_transaction() {
        let env = TestEnvironment::new().unwrap();
        let repo = env.connection.create_transaction_repository();
        let stored = transaction("transaction::earned::1::a", 10, Utc::now());

        repo.store_transaction(&stored).unwrap();
        let loaded = repo
            .get_transaction("child::1", "transaction::earned::1::a")
            .unwrap()
            .unwrap();

        assert_eq!(loaded, stored);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let env = TestEnvironment::new().unwrap();
        let repo = env.connection.create_transaction_repository();
        let stored = transaction("transaction::earned::1::a", 10, Utc::now());

        repo.store_transaction(&stored).unwrap();
        assert!(repo.store_transaction(&stored).is_err());
    }

    #[test]
    fn test_transactions_with_no_app_round_trip() {
        let env = TestEnvironment::new().unwrap();
        let repo = env.connection.create_transaction_repository();
        let mut stored = transaction("transaction::bonus::1::a", 10, Utc::now());
        stored.kind = TransactionKind::Bonus;
        stored.app_id = None;
        stored.app_display_name = None;
        stored.minutes_involved = 0;

        repo.store_transaction(&stored).unwrap();
        let loaded = repo
            .get_transaction("child::1", &stored.id)
            .unwrap()
            .unwrap();

        assert_eq!(loaded, stored);
    }

    #[test]
    fn test_list_transactions_orders_most_recent_first() {
        let env = TestEnvironment::new().unwrap();
        let repo = env.connection.create_transaction_repository();
        let base = Utc::now();

        for i in 0..3 {
            repo.store_transaction(&transaction(
                &format!("transaction::earned::{}::a", i),
                i,
                base + Duration::seconds(i),
            ))
            .unwrap();
        }

        let listed = repo.list_transactions("child::1", None, None).unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].amount, 2);
        assert_eq!(listed[2].amount, 0);

        let chronological = repo.list_transactions_chronological("child::1").unwrap();
        assert_eq!(chronological[0].amount, 0);
        assert_eq!(chronological[2].amount, 2);
    }

    #[test]
    fn test_list_transactions_after_cursor() {
        let env = TestEnvironment::new().unwrap();
        let repo = env.connection.create_transaction_repository();
        let base = Utc::now();

        for i in 0..4 {
            repo.store_transaction(&transaction(
                &format!("transaction::earned::{}::a", i),
                i,
                base + Duration::seconds(i),
            ))
            .unwrap();
        }

        let first = repo.list_transactions("child::1", Some(2), None).unwrap();
        assert_eq!(first.len(), 2);

        let rest = repo
            .list_transactions("child::1", Some(10), Some(first[1].id.clone()))
            .unwrap();
        assert_eq!(rest.len(), 2);
        assert!(rest[0].timestamp < first[1].timestamp);
    }

    #[test]
    fn test_listing_for_unknown_child_is_empty() {
        let env = TestEnvironment::new().unwrap();
        let repo = env.connection.create_transaction_repository();

        assert!(repo
            .list_transactions("child::unknown", None, None)
            .unwrap()
            .is_empty());
    }
}
