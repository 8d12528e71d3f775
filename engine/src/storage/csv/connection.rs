//! CSV storage connection: owns the data directory layout.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use super::{AppConfigRepository, GoalRepository, TransactionRepository, WalletRepository};
use crate::storage::traits::Connection;

/// Manages file paths and ensures CSV files and directories exist.
///
/// Layout: one subdirectory per child (wallet, transactions, goals) plus a
/// single app-config registry at the root of the data directory.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new CSV connection rooted at `base_directory`, creating the
    /// directory if it does not exist yet.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();
        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }
        Ok(Self {
            base_directory: base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Directory holding one child's wallet, transaction and goal files.
    pub fn child_directory(&self, child_id: &str) -> PathBuf {
        self.base_directory.join(Self::safe_directory_name(child_id))
    }

    pub fn ensure_child_directory(&self, child_id: &str) -> Result<PathBuf> {
        let directory = self.child_directory(child_id);
        if !directory.exists() {
            fs::create_dir_all(&directory)?;
        }
        Ok(directory)
    }

    pub fn wallet_file_path(&self, child_id: &str) -> PathBuf {
        self.child_directory(child_id).join("wallet.csv")
    }

    pub fn transactions_file_path(&self, child_id: &str) -> PathBuf {
        self.child_directory(child_id).join("transactions.csv")
    }

    pub fn goals_file_path(&self, child_id: &str) -> PathBuf {
        self.child_directory(child_id).join("goals.csv")
    }

    pub fn app_configs_file_path(&self) -> PathBuf {
        self.base_directory.join("app_configs.csv")
    }

    /// Filesystem-safe directory name derived from a child ID.
    pub fn safe_directory_name(child_id: &str) -> String {
        child_id
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl Connection for CsvConnection {
    type WalletRepository = WalletRepository;
    type TransactionRepository = TransactionRepository;
    type AppConfigRepository = AppConfigRepository;
    type GoalRepository = GoalRepository;

    fn create_wallet_repository(&self) -> WalletRepository {
        WalletRepository::new(self.clone())
    }

    fn create_transaction_repository(&self) -> TransactionRepository {
        TransactionRepository::new(self.clone())
    }

    fn create_app_config_repository(&self) -> AppConfigRepository {
        AppConfigRepository::new(self.clone())
    }

    fn create_goal_repository(&self) -> GoalRepository {
        GoalRepository::new(self.clone())
    }
}
