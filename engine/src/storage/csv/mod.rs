//! # CSV Storage Module
//!
//! CSV-based implementation of the storage traits: the default persistence
//! collaborator for the engine. Each child gets a directory with their
//! wallet, transaction history and goals; the app-config registry lives at
//! the root of the data directory.
//!
//! ## File Format
//!
//! Flat key-value columns per entity, one header row per file:
//! ```csv
//! id,wallet_id,app_id,app_display_name,kind,amount,minutes_involved,timestamp,is_valid,description
//! transaction::earned::1750318800000::a3f1,child::1,com.example.math,Math Practice,earned,15,15,2025-06-19T08:00:00+00:00,true,15 minutes in Math Practice
//! ```
//!
//! All writes replace the whole file through a temp-file rename, so records
//! are never observed half-written and repeated writes of the same state are
//! harmless.

pub mod app_config_repository;
pub mod connection;
pub mod goal_repository;
pub mod transaction_repository;
pub mod wallet_repository;

#[cfg(test)]
pub mod test_utils;

pub use app_config_repository::AppConfigRepository;
pub use connection::CsvConnection;
pub use goal_repository::GoalRepository;
pub use transaction_repository::TransactionRepository;
pub use wallet_repository::WalletRepository;
