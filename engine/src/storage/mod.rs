//! # Storage Module
//!
//! Handles all data persistence for the economy engine.
//!
//! The domain layer works against the traits defined here and never touches
//! a wire format directly; the engine hands fully-committed wallet,
//! transaction, config and goal values to a repository after each in-memory
//! commit. Because records are whole-state snapshots, persisting the same
//! committed state twice is safe — retries belong to the collaborator.
//!
//! The CSV implementation in [`csv`] is the default backend; any other
//! backend can be swapped in by implementing [`traits::Connection`].

pub mod csv;
pub mod traits;

pub use traits::{
    AppConfigStorage, Connection, GoalStorage, TransactionStorage, WalletStorage,
};
