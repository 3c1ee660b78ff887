//! Each kind of failure is its own type so that callers can decide how to
//! react: a missing record is surfaced to a user, a lookup failure suggests
//! re-running the synchronizer, a solver that did not converge may be retried
//! with different settings. [`SolveFailure`] groups the kinds an allocation
//! engine can produce.

use crate::models::{CurrencyCode, Date, ProcessId};

/// A record the operation depends on does not exist.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NotFound {
    /// The process itself
    #[error("logistic process {0} does not exist")]
    Process(ProcessId),
    /// The process exists but has no transactions to derive a currency pair from
    #[error("logistic process {0} has no transactions")]
    Transaction(ProcessId),
    /// The process has no optimization record
    #[error("logistic process {0} has no optimization record")]
    Optimization(ProcessId),
    /// No rate for the pair was published on or before the date
    #[error("no exchange rate available for {from}/{to} on or before {date}")]
    Rate {
        /// Source currency
        from: CurrencyCode,
        /// Target currency
        to: CurrencyCode,
        /// The latest acceptable publication date
        date: Date,
    },
}

/// Input that violates a data-model invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A process ends before it starts
    #[error("end date {end} precedes start date {start}")]
    EndBeforeStart {
        /// Start of the process
        start: Date,
        /// End of the process
        end: Date,
    },
    /// Budgets cannot be negative
    #[error("budget must be non-negative, got {0}")]
    NegativeBudget(f64),
    /// Negative rate with nothing to spend
    #[error("exchange rate must be non-negative, got {0}")]
    NegativeRate(f64),
    /// A stored rate must be positive
    #[error("exchange rate must be positive, got {0}")]
    NonPositiveRate(f64),
    /// A transaction amount must be positive
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(f64),
    /// NaN or infinity where a number was required
    #[error("{0} must be a finite number")]
    NonFinite(&'static str),
    /// Not a three-letter uppercase code
    #[error("invalid currency code {0:?}")]
    CurrencyCode(String),
    /// Not one of the known process statuses
    #[error("unknown process status {0:?}")]
    UnknownStatus(String),
    /// Not one of the known outcome impacts
    #[error("unknown outcome impact {0:?}")]
    UnknownImpact(String),
    /// Text that should have been an ISO date
    #[error("{field} is not a valid date: {value:?}")]
    InvalidDate {
        /// Which field
        field: &'static str,
        /// The offending text
        value: String,
    },
    /// The referenced rate is for a different pair or a later date
    #[error("exchange rate does not apply to a {from}/{to} transaction on {date}")]
    RateMismatch {
        /// Source currency of the transaction
        from: CurrencyCode,
        /// Target currency of the transaction
        to: CurrencyCode,
        /// Day of the transaction
        date: Date,
    },
    /// A volume or cost curve is malformed
    #[error("invalid curve: {0}")]
    Curve(String),
}

/// The problem has no finite optimum, or the solver could not find it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Infeasible {
    /// With a free (or negative) cost per unit any positive budget buys unbounded units
    #[error("exchange rate {rate} admits no finite allocation for budget {budget}")]
    NonPositiveRate {
        /// The offending rate
        rate: f64,
        /// The budget
        budget: f64,
    },
    /// The solver proved the objective unbounded
    #[error("allocation is unbounded")]
    Unbounded,
    /// The solver stopped without a solution
    #[error("solver did not converge ({status}) after {iterations} iterations")]
    NotConverged {
        /// Solver-specific termination status
        status: String,
        /// Iterations spent
        iterations: u32,
    },
    /// The solver rejected the problem data
    #[error("solver setup failed: {0}")]
    Setup(String),
}

/// Too few observations for a statistical estimate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("insufficient data for {subject}: need at least {required}, have {observed}")]
pub struct InsufficientData {
    /// What was being estimated
    pub subject: String,
    /// Minimum number of observations
    pub required: usize,
    /// Number actually available
    pub observed: usize,
}

impl InsufficientData {
    /// Fail unless at least `required` observations are available
    pub fn check(subject: impl Into<String>, required: usize, observed: usize) -> Result<(), Self> {
        if observed < required {
            Err(Self {
                subject: subject.into(),
                required,
                observed,
            })
        } else {
            Ok(())
        }
    }
}

/// A value the synchronizer loads could not be resolved to a stored entity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupFailure {
    /// No currency with this code
    #[error("unknown currency code {code:?}")]
    Currency {
        /// The code as extracted
        code: String,
    },
    /// No stored rate with this value for the pair on or before the date
    #[error("no {from}/{to} rate of {rate} on or before {date}")]
    Rate {
        /// Source currency code
        from: String,
        /// Target currency code
        to: String,
        /// The rate value
        rate: f64,
        /// The transaction date
        date: Date,
    },
}

/// Why an allocation engine produced no allocation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolveFailure {
    /// The problem data is malformed
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// The problem has no finite optimum or the engine failed to find one
    #[error(transparent)]
    Infeasible(#[from] Infeasible),
}
