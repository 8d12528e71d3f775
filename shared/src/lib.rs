use serde::{Deserialize, Serialize};

/// Category a tracked application belongs to.
///
/// Learning apps earn Coinz per minute of use, reward apps cost Coinz per
/// minute of purchased time, neutral apps do neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppCategory {
    Learning,
    Reward,
    Neutral,
}

/// Kind of ledger transaction for rendering and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Coinz earned through learning time
    Earned,
    /// Coinz spent on reward time
    Spent,
    /// Parent-issued or goal-completion bonus
    Bonus,
    /// Parent-issued penalty (may drive the balance negative)
    Penalty,
    /// Balance correction; not an economic event
    Adjustment,
}

/// Why a purchase request was denied, for presentation to the child/parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseDenialKind {
    /// Today's minimum learning minutes have not been reached yet
    LearningRequirementNotMet,
    /// The wallet balance does not cover the requested minutes
    InsufficientBalance,
    /// The app's daily time ceiling is fully used up
    DailyLimitReached,
    /// Some daily time remains, but less than was requested
    DailyLimitPartial,
    /// The app is missing, disabled, or misconfigured
    AppNotConfigured,
    /// The request itself was malformed (e.g. zero minutes)
    InvalidRequest,
}

/// Per-app reward usage for today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppUsage {
    pub app_id: String,
    pub minutes_used_today: u32,
}

/// Read-only snapshot of a child's wallet for display.
///
/// `carryover_balance` and `has_carryover` are derived projections: the
/// portion of the balance attributable to days before today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub child_id: String,
    pub balance: i64,
    pub total_earned: i64,
    pub total_spent: i64,
    pub daily_earned: i64,
    pub daily_spent: i64,
    pub daily_learning_minutes: u32,
    pub total_learning_minutes: u64,
    pub minimum_daily_learning_minutes: u32,
    pub carryover_balance: i64,
    pub has_carryover: bool,
    /// ISO 8601 date (YYYY-MM-DD) of the last daily rollover
    pub last_reset_date: String,
    /// RFC 3339 timestamp of the last wallet write
    pub last_modified: String,
    pub daily_reward_usage: Vec<AppUsage>,
}

/// A single ledger entry rendered for history views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionView {
    pub id: String,
    pub wallet_id: String,
    pub app_id: Option<String>,
    pub app_display_name: Option<String>,
    pub kind: TransactionKind,
    /// Signed Coinz amount (positive for earned/bonus, negative for spent/penalty)
    pub amount: i64,
    pub minutes_involved: u32,
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub is_valid: bool,
    pub description: String,
}

/// Generic pagination info returned by list queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// Response containing a page of transaction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<TransactionView>,
    pub pagination: PaginationInfo,
}

/// Request to check or perform a purchase of reward time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub child_id: String,
    pub app_id: String,
    pub minutes: u32,
}

/// Outcome of evaluating the three-tier purchase gate.
///
/// `reason` and `message` are populated only when `allowed` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseCheckResponse {
    pub allowed: bool,
    pub reason: Option<PurchaseDenialKind>,
    pub message: Option<String>,
}

impl PurchaseCheckResponse {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
            message: None,
        }
    }

    pub fn denied(reason: PurchaseDenialKind, message: String) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            message: Some(message),
        }
    }
}

/// Largest number of minutes that would currently pass the purchase gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordableMinutesResponse {
    pub app_id: String,
    pub minutes: u32,
}

/// Response after a successful purchase of reward time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseResponse {
    pub transaction: TransactionView,
    pub wallet: WalletSnapshot,
    pub success_message: String,
}

/// Response after learning time was recorded (one tick or a batch of minutes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarnResponse {
    pub transaction: TransactionView,
    /// Goals whose target was crossed by this earn event
    pub completed_goals: Vec<GoalView>,
    /// Bonus transactions issued for those completions
    pub bonus_transactions: Vec<TransactionView>,
    pub wallet: WalletSnapshot,
    pub success_message: String,
}

/// Kind of manual balance change a parent can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustmentKind {
    Bonus,
    Penalty,
    Adjustment,
}

/// Request for a manual balance change (bonus, penalty, or correction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustBalanceRequest {
    pub child_id: String,
    /// Signed Coinz delta; positive for bonus, negative for penalty
    pub delta: i64,
    pub kind: AdjustmentKind,
    pub reason: String,
}

/// Request for a parent-initiated full balance reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetBalanceRequest {
    pub child_id: String,
    /// Target balance; negative targets are clamped to 0
    pub target: i64,
}

/// Response after a balance adjustment or reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustBalanceResponse {
    pub transaction: TransactionView,
    pub wallet: WalletSnapshot,
    pub success_message: String,
}

/// Per-application configuration as seen by the parent UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfigView {
    pub app_id: String,
    pub display_name: String,
    pub category: AppCategory,
    /// Signed Coinz per minute: positive for learning, negative for reward
    pub coinz_rate: i64,
    /// Minutes per day the app may be purchased; 0 means unlimited
    pub daily_time_limit: u32,
    pub is_enabled: bool,
}

/// Request to create or update an app configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertAppConfigRequest {
    pub app_id: String,
    pub display_name: String,
    pub category: AppCategory,
    pub coinz_rate: i64,
    pub daily_time_limit: u32,
    pub is_enabled: bool,
}

/// A parent-defined multi-day Coinz target rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalView {
    pub id: String,
    pub child_id: String,
    pub title: String,
    pub target_coinz: i64,
    pub bonus_coinz: i64,
    pub eligible_app_ids: Vec<String>,
    pub progress: i64,
    /// Coinz still needed to reach the target (0 once completed)
    pub remaining_coinz: i64,
    pub is_completed: bool,
    pub is_active: bool,
    /// ISO 8601 dates (YYYY-MM-DD)
    pub start_date: String,
    pub end_date: String,
}

/// Request to create a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGoalRequest {
    pub child_id: String,
    pub title: String,
    pub target_coinz: i64,
    pub bonus_coinz: i64,
    pub eligible_app_ids: Vec<String>,
    /// ISO 8601 dates (YYYY-MM-DD)
    pub start_date: String,
    pub end_date: String,
}

/// Response after creating or cancelling a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalResponse {
    pub goal: GoalView,
    pub success_message: String,
}

/// Response containing all goals for a child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalListResponse {
    pub goals: Vec<GoalView>,
}

/// A live learning session as reported back to the usage monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningSessionView {
    pub child_id: String,
    pub app_id: String,
    /// RFC 3339 timestamp
    pub started_at: String,
    pub minutes_recorded: u32,
    pub coinz_earned: i64,
}
