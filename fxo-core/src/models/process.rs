use super::{CurrencyCode, Date, HouseId, ProcessId, ProcessTypeId, RateId, TransactionId};
use crate::failure::ValidationError;
use std::{fmt::Display, str::FromStr};

/// A currency exchange house, the root owner of logistic processes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExchangeHouse {
    /// Identifier
    pub id: HouseId,
    /// Trading name
    pub name: String,
    /// Free-form address or city
    pub location: String,
    /// When the house was founded
    pub founded: Date,
    /// Free-form description
    pub description: String,
}

/// The classification dimension for logistic processes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessType {
    /// Identifier
    pub id: ProcessTypeId,
    /// Short name, e.g. "cash delivery"
    pub name: String,
    /// Free-form description
    pub description: String,
}

/// Lifecycle status of a logistic process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ProcessStatus {
    /// Not yet started
    Pending,
    /// Started but not finished
    InProgress,
    /// Finished
    Completed,
}

impl ProcessStatus {
    /// The storage representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for ProcessStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(ValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

impl Display for ProcessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked currency-exchange operation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogisticProcess {
    /// Identifier
    pub id: ProcessId,
    /// The owning exchange house
    pub house_id: HouseId,
    /// The process classification
    pub process_type_id: ProcessTypeId,
    /// First day of the process
    pub start_date: Date,
    /// Last day of the process, absent while it is still open
    pub end_date: Option<Date>,
    /// Lifecycle status
    pub status: ProcessStatus,
}

impl LogisticProcess {
    /// Check that the end date, if any, does not precede the start date
    pub fn validate(&self) -> Result<(), ValidationError> {
        Self::check_span(self.start_date, self.end_date)
    }

    /// Check that `end`, if present, does not precede `start`
    pub fn check_span(start: Date, end: Option<Date>) -> Result<(), ValidationError> {
        match end {
            Some(end) if end < start => Err(ValidationError::EndBeforeStart { start, end }),
            _ => Ok(()),
        }
    }

    /// Whole days from `start` to `end`, or None while the process is open
    pub fn span_days(start: Date, end: Option<Date>) -> Option<i64> {
        end.map(|end| (end - start).whole_days())
    }
}

/// A single conversion performed as part of a logistic process.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transaction {
    /// Identifier
    pub id: TransactionId,
    /// The owning process
    pub process_id: ProcessId,
    /// Day the conversion happened; (process_id, date) is unique
    pub date: Date,
    /// Source currency
    pub from_currency: CurrencyCode,
    /// Target currency
    pub to_currency: CurrencyCode,
    /// Amount converted, in units of the source currency
    pub amount: f64,
    /// The rate that was applied
    pub rate_id: RateId,
}

impl Transaction {
    /// Check that the amount is a positive, finite number
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.amount.is_finite() {
            Err(ValidationError::NonFinite("amount"))
        } else if self.amount <= 0.0 {
            Err(ValidationError::NonPositiveAmount(self.amount))
        } else {
            Ok(())
        }
    }
}
