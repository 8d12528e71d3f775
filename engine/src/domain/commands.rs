//! Domain-level command and query types.
//!
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The `io` layer maps the public DTOs defined
//! in the `shared` crate to and from these internal types.

pub mod ledger {
    use crate::domain::models::goal::Goal;
    use crate::domain::models::transaction::{AdjustmentKind, Transaction};
    use crate::domain::models::wallet::Wallet;

    /// Input for recording measured learning time ("N minutes in app X").
    #[derive(Debug, Clone)]
    pub struct RecordLearningTimeCommand {
        pub child_id: String,
        pub app_id: String,
        pub minutes: u32,
    }

    /// Result of recording learning time, including any goal completions
    /// and the bonuses issued for them.
    #[derive(Debug, Clone)]
    pub struct RecordLearningTimeResult {
        pub transaction: Transaction,
        pub completed_goals: Vec<Goal>,
        pub bonus_transactions: Vec<Transaction>,
        pub wallet: Wallet,
    }

    /// Input for purchasing reward time.
    #[derive(Debug, Clone)]
    pub struct PurchaseRewardTimeCommand {
        pub child_id: String,
        pub app_id: String,
        pub minutes: u32,
    }

    /// Result of a successful purchase.
    #[derive(Debug, Clone)]
    pub struct PurchaseRewardTimeResult {
        pub transaction: Transaction,
        pub wallet: Wallet,
    }

    /// Input for a manual balance change.
    #[derive(Debug, Clone)]
    pub struct AdjustBalanceCommand {
        pub child_id: String,
        /// Signed delta; positive for bonus, negative for penalty
        pub delta: i64,
        pub kind: AdjustmentKind,
        pub reason: String,
    }

    /// Input for a parent-initiated full balance reset.
    #[derive(Debug, Clone)]
    pub struct ResetBalanceCommand {
        pub child_id: String,
        /// Target balance; negative targets are clamped to 0
        pub target: i64,
    }

    /// Result of an adjustment or reset.
    #[derive(Debug, Clone)]
    pub struct AdjustBalanceResult {
        pub transaction: Transaction,
        pub wallet: Wallet,
    }
}

pub mod transactions {
    use crate::domain::models::transaction::Transaction;

    /// Query parameters for listing transaction history.
    #[derive(Debug, Clone, Default)]
    pub struct TransactionListQuery {
        pub child_id: String,
        /// Maximum number of transactions to return
        pub limit: Option<u32>,
        /// Cursor for pagination: transaction ID to start after
        pub after: Option<String>,
    }

    /// Generic pagination info returned by list queries.
    #[derive(Debug, Clone)]
    pub struct PaginationInfo {
        pub has_more: bool,
        pub next_cursor: Option<String>,
    }

    /// Result of listing transactions (most recent first).
    #[derive(Debug, Clone)]
    pub struct TransactionListResult {
        pub transactions: Vec<Transaction>,
        pub pagination: PaginationInfo,
    }
}

pub mod goals {
    use chrono::NaiveDate;

    /// Input for creating a new goal.
    #[derive(Debug, Clone)]
    pub struct CreateGoalCommand {
        pub child_id: String,
        pub title: String,
        pub target_coinz: i64,
        pub bonus_coinz: i64,
        pub eligible_app_ids: Vec<String>,
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
    }

    /// Input for cancelling a goal.
    #[derive(Debug, Clone)]
    pub struct CancelGoalCommand {
        pub child_id: String,
        pub goal_id: String,
    }
}

pub mod sessions {
    use super::ledger::RecordLearningTimeResult;
    use crate::domain::session::LearningSession;

    /// Result of one learning-minute tick: the earn it committed plus the
    /// updated session bookkeeping.
    #[derive(Debug, Clone)]
    pub struct TickResult {
        pub earn: RecordLearningTimeResult,
        pub session: LearningSession,
    }
}
