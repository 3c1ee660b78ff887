//! Row shapes exchanged between the synchronizer and a store.
//!
//! Extract rows are deliberately loose (dates as text, codes as plain
//! strings): parsing and resolving them is the synchronizer's job, and a bad
//! row must surface as a per-row warning rather than a failed query.

use super::{Date, ProcessId, ProcessStatus};

/// A process joined with its owning house and its classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessExtract {
    /// Identifier. External stores may surface rows without a key.
    pub id: Option<ProcessId>,
    /// Name of the owning exchange house
    pub house: String,
    /// Name of the process type
    pub process_type: String,
    /// ISO date text
    pub start_date: String,
    /// ISO date text, absent while the process is open
    pub end_date: Option<String>,
    /// Status text
    pub status: String,
}

/// A transaction with its currencies and rate resolved to scalar values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransactionExtract {
    /// The owning process
    pub process_id: ProcessId,
    /// ISO date text
    pub date: String,
    /// Source currency code
    pub from_currency: String,
    /// Target currency code
    pub to_currency: String,
    /// Amount converted
    pub amount: f64,
    /// The applied rate value
    pub rate: f64,
}

/// Aggregates over a process's transactions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransactionAggregates {
    /// Sum of amounts
    pub total_amount: f64,
    /// Number of transactions
    pub transaction_count: u32,
    /// Mean of applied rates
    pub mean_rate: f64,
}

/// Metrics the synchronizer derives for a process and persists alongside it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessMetrics {
    /// End minus start in days, or -1 while the process is still open
    pub duration_days: i64,
    /// None when the process has no transactions at all
    pub aggregates: Option<TransactionAggregates>,
}

impl ProcessMetrics {
    /// The duration reported for processes without an end date
    pub const OPEN_DURATION: i64 = -1;
}

/// The reconciled state of a process, ready to be written back.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessUpdate {
    /// Target process
    pub id: ProcessId,
    /// Lifecycle status
    pub status: ProcessStatus,
    /// First day of the process
    pub start_date: Date,
    /// Last day of the process
    pub end_date: Option<Date>,
    /// Derived metrics
    pub metrics: ProcessMetrics,
}

/// A transaction to insert or overwrite, keyed on (process_id, date).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransactionUpsert {
    /// The owning process
    pub process_id: ProcessId,
    /// Day of the transaction
    pub date: Date,
    /// Source currency code, resolved by the store
    pub from_currency: String,
    /// Target currency code, resolved by the store
    pub to_currency: String,
    /// Amount converted
    pub amount: f64,
    /// Rate value, resolved by the store to a stored rate
    pub rate: f64,
}

/// What a load did with a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum RowOutcome {
    /// A new row was written
    Inserted,
    /// An existing row was overwritten
    Updated,
    /// The stored row already matched; nothing was written
    Unchanged,
    /// The targeted row does not exist
    Missing,
}
