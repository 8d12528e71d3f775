//! # Domain Module
//!
//! Contains all business logic for the Coinz economy engine.
//!
//! This module encapsulates the core rules of the incentive economy: how
//! Coinz are earned from learning time, how reward time is purchased behind
//! the three-tier gate, how daily counters roll over while balance carries,
//! and how multi-day goals track and complete. It operates independently of
//! any UI framework or storage mechanism.
//!
//! ## Module Organization
//!
//! - **ledger_service**: atomic earn/spend/adjust/reset wallet mutations
//! - **purchase_gate**: the ordered three-tier affordability check
//! - **rollover**: the idempotent daily reset with the carryover guarantee
//! - **goal_service**: multi-day Coinz targets and completion tracking
//! - **app_registry_service**: per-app configuration lookup and validation
//! - **economy_service**: the single-writer facade composing the above
//! - **session**: explicit, caller-ticked learning sessions
//!
//! ## Business Rules
//!
//! - Spending can never exceed what has been earned: a spend is validated
//!   against the balance and the gate before any state changes
//! - The gate's tiers run in a fixed order (learning requirement, balance,
//!   daily ceiling) and the first failure wins
//! - Daily counters reset on the first wallet access of a new day; the
//!   balance and lifetime counters always carry
//! - Every mutation appends exactly one transaction, so the history
//!   replays to the current balance

pub mod app_registry_service;
pub mod commands;
pub mod economy_service;
pub mod errors;
pub mod goal_service;
pub mod ledger_service;
pub mod models;
pub mod purchase_gate;
pub mod rollover;
pub mod session;

pub use app_registry_service::AppRegistryService;
pub use economy_service::EconomyService;
pub use errors::EconomyError;
pub use goal_service::GoalService;
pub use ledger_service::LedgerService;
