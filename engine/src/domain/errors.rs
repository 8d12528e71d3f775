//! Typed, recoverable errors for engine operations.

use thiserror::Error;

/// Error kinds returned by ledger, gate, registry, and session operations.
///
/// All failures are terminal for that single call and leave wallet state
/// unchanged; callers present the reason to the user and may retry with
/// different input. None of these are fatal.
#[derive(Debug, Error)]
pub enum EconomyError {
    #[error("insufficient balance: need {needed} Coinz but only {available} available ({shortfall} short)")]
    InsufficientBalance {
        needed: i64,
        available: i64,
        shortfall: i64,
    },

    #[error("daily learning requirement not met: {completed} of {required} minutes completed")]
    LearningRequirementNotMet { required: u32, completed: u32 },

    #[error("daily time limit of {limit} minutes reached for {app_id}")]
    DailyLimitReached { app_id: String, limit: u32 },

    #[error("only {remaining} of the requested {requested} minutes remain today for {app_id}")]
    DailyLimitPartial {
        app_id: String,
        remaining: u32,
        requested: u32,
    },

    #[error("app {app_id} is not configured: {reason}")]
    AppNotConfigured { app_id: String, reason: String },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("no active learning session for child {0}")]
    NoActiveSession(String),

    /// Failure in the persistence collaborator; in-memory state stays
    /// consistent and the write can be retried.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
