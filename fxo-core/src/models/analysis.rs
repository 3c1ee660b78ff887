use super::{CurrencyCode, Date, ProcessId};

/// The slice of the reconciled store an analysis runs over.
///
/// Both bounds are inclusive. Transactions are filtered on their date and
/// optimizations on their implementation date.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DatasetQuery {
    /// Earliest day to include
    pub since: Option<Date>,
    /// Latest day to include
    pub until: Option<Date>,
}

/// One transaction, flattened for analysis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransactionFact {
    /// The owning process
    pub process_id: ProcessId,
    /// Day of the transaction
    pub date: Date,
    /// Source currency
    pub from_currency: CurrencyCode,
    /// Target currency
    pub to_currency: CurrencyCode,
    /// Amount converted
    pub amount: f64,
    /// Applied rate
    pub rate: f64,
}

/// One optimization record, flattened for analysis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationFact {
    /// The process the optimization applied to
    pub process_id: ProcessId,
    /// When it took effect
    pub implementation_date: Date,
    /// Efficiency improvement, in percent
    pub efficiency_improvement: f64,
    /// Cost reduction, in percent
    pub cost_reduction: f64,
    /// Processing-time reduction, in percent
    pub processing_time_reduction: f64,
}

/// A consistent snapshot of everything the analyzer needs.
///
/// Optimizations are listed in ascending implementation order (date, then
/// insertion), so the last entry for a process is its latest.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dataset {
    /// Transactions in the window
    pub transactions: Vec<TransactionFact>,
    /// Optimizations in the window
    pub optimizations: Vec<OptimizationFact>,
}
