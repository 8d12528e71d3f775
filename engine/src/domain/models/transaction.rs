//! Domain model for a ledger transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Kind of ledger mutation a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Earned,
    Spent,
    Bonus,
    Penalty,
    Adjustment,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Earned => "earned",
            TransactionKind::Spent => "spent",
            TransactionKind::Bonus => "bonus",
            TransactionKind::Penalty => "penalty",
            TransactionKind::Adjustment => "adjustment",
        }
    }

    pub fn parse(value: &str) -> Option<TransactionKind> {
        match value {
            "earned" => Some(TransactionKind::Earned),
            "spent" => Some(TransactionKind::Spent),
            "bonus" => Some(TransactionKind::Bonus),
            "penalty" => Some(TransactionKind::Penalty),
            "adjustment" => Some(TransactionKind::Adjustment),
            _ => None,
        }
    }
}

/// Kind of manual balance change a parent can apply through the ledger.
///
/// Bonus and penalty are economic events that move the lifetime counters;
/// an adjustment is a correction that moves only the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustmentKind {
    Bonus,
    Penalty,
    Adjustment,
}

impl AdjustmentKind {
    pub fn transaction_kind(&self) -> TransactionKind {
        match self {
            AdjustmentKind::Bonus => TransactionKind::Bonus,
            AdjustmentKind::Penalty => TransactionKind::Penalty,
            AdjustmentKind::Adjustment => TransactionKind::Adjustment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransactionIdError {
    #[error("invalid transaction ID format")]
    InvalidFormat,
    #[error("invalid transaction kind in ID")]
    InvalidKind,
    #[error("invalid timestamp in transaction ID")]
    InvalidTimestamp,
}

/// One append-only ledger entry. Created exactly once per ledger mutation
/// and immutable thereafter; the engine never truncates history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// ID in format: "transaction::<kind>::<epoch_millis>::<suffix>"
    pub id: String,
    /// Child wallet this transaction belongs to
    pub wallet_id: String,
    /// App involved, if any (adjustments have none)
    pub app_id: Option<String>,
    pub app_display_name: Option<String>,
    pub kind: TransactionKind,
    /// Signed Coinz delta applied to the balance
    pub amount: i64,
    /// Minutes of app time involved (0 for manual adjustments)
    pub minutes_involved: u32,
    pub timestamp: DateTime<Utc>,
    pub is_valid: bool,
    pub description: String,
}

impl Transaction {
    /// Generate a unique transaction ID from the kind and a timestamp.
    pub fn generate_id(kind: TransactionKind, epoch_millis: i64) -> String {
        let suffix = Self::generate_suffix(4);
        format!("transaction::{}::{}::{}", kind.as_str(), epoch_millis, suffix)
    }

    /// Parse a transaction ID into its kind and epoch-millis components.
    pub fn parse_id(id: &str) -> Result<(TransactionKind, i64), TransactionIdError> {
        let parts: Vec<&str> = id.split("::").collect();
        if parts.len() != 4 || parts[0] != "transaction" {
            return Err(TransactionIdError::InvalidFormat);
        }

        let kind = TransactionKind::parse(parts[1]).ok_or(TransactionIdError::InvalidKind)?;
        let epoch_millis = parts[2]
            .parse::<i64>()
            .map_err(|_| TransactionIdError::InvalidTimestamp)?;

        Ok((kind, epoch_millis))
    }

    /// Extract the epoch timestamp from this transaction's ID for sorting.
    pub fn extract_timestamp(&self) -> Result<i64, TransactionIdError> {
        Self::parse_id(&self.id).map(|(_, timestamp)| timestamp)
    }

    /// Short hex suffix so that two transactions generated within the same
    /// millisecond still get distinct IDs.
    fn generate_suffix(len: usize) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        format!("{:x}", nanos % (16_u128.pow(len as u32)))
            .chars()
            .take(len)
            .collect()
    }
}
