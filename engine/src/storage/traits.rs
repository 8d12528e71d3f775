//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer. The
//! engine hands fully-committed values to these repositories after every
//! in-memory mutation; writes are whole-state and therefore safe to replay.

use anyhow::Result;

use crate::domain::models::app_config::AppConfig;
use crate::domain::models::goal::Goal;
use crate::domain::models::transaction::Transaction;
use crate::domain::models::wallet::Wallet;

/// Trait defining the interface for wallet storage operations.
///
/// A wallet record is flat key-value state plus its `last_modified` stamp;
/// storing the same already-committed wallet twice is harmless.
pub trait WalletStorage: Send + Sync + Clone {
    /// Store (create or replace) a wallet
    fn store_wallet(&self, wallet: &Wallet) -> Result<()>;

    /// Retrieve a wallet by child ID
    fn get_wallet(&self, child_id: &str) -> Result<Option<Wallet>>;

    /// List all known wallets
    fn list_wallets(&self) -> Result<Vec<Wallet>>;
}

/// Trait defining the interface for transaction storage operations.
///
/// Transactions are append-only; the engine never updates or truncates them.
pub trait TransactionStorage: Send + Sync + Clone {
    /// Store a new transaction
    fn store_transaction(&self, transaction: &Transaction) -> Result<()>;

    /// Retrieve a specific transaction by ID
    fn get_transaction(&self, child_id: &str, transaction_id: &str)
        -> Result<Option<Transaction>>;

    /// List transactions with pagination support.
    /// Returns transactions ordered by timestamp descending (most recent first).
    fn list_transactions(
        &self,
        child_id: &str,
        limit: Option<u32>,
        after: Option<String>,
    ) -> Result<Vec<Transaction>>;

    /// List all transactions in chronological order (oldest first)
    fn list_transactions_chronological(&self, child_id: &str) -> Result<Vec<Transaction>>;
}

/// Trait defining the interface for app configuration storage operations.
pub trait AppConfigStorage: Send + Sync + Clone {
    /// Store (create or replace) an app configuration
    fn store_app_config(&self, config: &AppConfig) -> Result<()>;

    /// Retrieve an app configuration by app ID
    fn get_app_config(&self, app_id: &str) -> Result<Option<AppConfig>>;

    /// List all app configurations ordered by app ID
    fn list_app_configs(&self) -> Result<Vec<AppConfig>>;

    /// Delete an app configuration.
    /// Returns true if a configuration was found and deleted.
    fn delete_app_config(&self, app_id: &str) -> Result<bool>;
}

/// Trait defining the interface for goal storage operations.
pub trait GoalStorage: Send + Sync + Clone {
    /// Store a new goal
    fn store_goal(&self, goal: &Goal) -> Result<()>;

    /// Retrieve a specific goal by ID
    fn get_goal(&self, child_id: &str, goal_id: &str) -> Result<Option<Goal>>;

    /// List all goals for a child ordered by creation time (oldest first)
    fn list_goals(&self, child_id: &str) -> Result<Vec<Goal>>;

    /// Update an existing goal in place
    fn update_goal(&self, goal: &Goal) -> Result<()>;
}

/// Trait defining the interface for storage connections.
///
/// Abstracts away the specific backend (CSV files, a database, ...) and
/// provides factory methods for creating repositories, so the domain layer
/// works with any storage implementation without modification.
pub trait Connection: Send + Sync + Clone {
    type WalletRepository: WalletStorage;
    type TransactionRepository: TransactionStorage;
    type AppConfigRepository: AppConfigStorage;
    type GoalRepository: GoalStorage;

    fn create_wallet_repository(&self) -> Self::WalletRepository;
    fn create_transaction_repository(&self) -> Self::TransactionRepository;
    fn create_app_config_repository(&self) -> Self::AppConfigRepository;
    fn create_goal_repository(&self) -> Self::GoalRepository;
}
