//! Row types for mapping query results onto the core models.
//!
//! Rows are decoded with runtime-checked queries, then converted. Conversions
//! that re-validate stored text (currency codes, statuses) surface a violation
//! as [`sqlx::Error::Decode`], since it means the store itself is corrupt.

use fxo_core::models::{
    CurrencyCode, Date, ExchangeRate, LogisticProcess, Optimization, OptimizationFact,
    ProcessExtract, Transaction, TransactionExtract, TransactionFact,
};
use uuid::Uuid;

fn corrupt(error: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(error))
}

fn code(value: String) -> Result<CurrencyCode, sqlx::Error> {
    CurrencyCode::new(value).map_err(corrupt)
}

#[derive(sqlx::FromRow)]
pub(crate) struct ProcessRow {
    pub id: Uuid,
    pub house_id: Uuid,
    pub process_type_id: Uuid,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub status: String,
}

impl TryFrom<ProcessRow> for LogisticProcess {
    type Error = sqlx::Error;

    fn try_from(row: ProcessRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            house_id: row.house_id.into(),
            process_type_id: row.process_type_id.into(),
            start_date: row.start_date,
            end_date: row.end_date,
            status: row.status.parse().map_err(corrupt)?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct TransactionRow {
    pub id: Uuid,
    pub process_id: Uuid,
    pub date: Date,
    pub from_code: String,
    pub to_code: String,
    pub amount: f64,
    pub rate_id: Uuid,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = sqlx::Error;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            process_id: row.process_id.into(),
            date: row.date,
            from_currency: code(row.from_code)?,
            to_currency: code(row.to_code)?,
            amount: row.amount,
            rate_id: row.rate_id.into(),
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct RateRow {
    pub id: Uuid,
    pub from_code: String,
    pub to_code: String,
    pub date: Date,
    pub rate: f64,
}

impl TryFrom<RateRow> for ExchangeRate {
    type Error = sqlx::Error;

    fn try_from(row: RateRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.into(),
            from: code(row.from_code)?,
            to: code(row.to_code)?,
            date: row.date,
            rate: row.rate,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct OptimizationRow {
    pub id: Uuid,
    pub process_id: Uuid,
    pub efficiency_improvement: f64,
    pub cost_reduction: f64,
    pub processing_time_reduction: f64,
    pub implementation_date: Date,
    pub notes: Option<String>,
}

impl From<OptimizationRow> for Optimization {
    fn from(row: OptimizationRow) -> Self {
        Self {
            id: row.id.into(),
            process_id: row.process_id.into(),
            efficiency_improvement: row.efficiency_improvement,
            cost_reduction: row.cost_reduction,
            processing_time_reduction: row.processing_time_reduction,
            implementation_date: row.implementation_date,
            notes: row.notes,
        }
    }
}

/// Extraction keeps dates and statuses as raw text; the synchronizer decides
/// what to do with values that do not parse.
#[derive(sqlx::FromRow)]
pub(crate) struct ProcessExtractRow {
    pub id: Option<Uuid>,
    pub house: String,
    pub process_type: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub status: String,
}

impl From<ProcessExtractRow> for ProcessExtract {
    fn from(row: ProcessExtractRow) -> Self {
        Self {
            id: row.id.map(Into::into),
            house: row.house,
            process_type: row.process_type,
            start_date: row.start_date,
            end_date: row.end_date,
            status: row.status,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct TransactionExtractRow {
    pub process_id: Uuid,
    pub date: String,
    pub from_code: String,
    pub to_code: String,
    pub amount: f64,
    pub rate: f64,
}

impl From<TransactionExtractRow> for TransactionExtract {
    fn from(row: TransactionExtractRow) -> Self {
        Self {
            process_id: row.process_id.into(),
            date: row.date,
            from_currency: row.from_code,
            to_currency: row.to_code,
            amount: row.amount,
            rate: row.rate,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct TransactionFactRow {
    pub process_id: Uuid,
    pub date: Date,
    pub from_code: String,
    pub to_code: String,
    pub amount: f64,
    pub rate: f64,
}

impl TryFrom<TransactionFactRow> for TransactionFact {
    type Error = sqlx::Error;

    fn try_from(row: TransactionFactRow) -> Result<Self, Self::Error> {
        Ok(Self {
            process_id: row.process_id.into(),
            date: row.date,
            from_currency: code(row.from_code)?,
            to_currency: code(row.to_code)?,
            amount: row.amount,
            rate: row.rate,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct OptimizationFactRow {
    pub process_id: Uuid,
    pub implementation_date: Date,
    pub efficiency_improvement: f64,
    pub cost_reduction: f64,
    pub processing_time_reduction: f64,
}

impl From<OptimizationFactRow> for OptimizationFact {
    fn from(row: OptimizationFactRow) -> Self {
        Self {
            process_id: row.process_id.into(),
            implementation_date: row.implementation_date,
            efficiency_improvement: row.efficiency_improvement,
            cost_reduction: row.cost_reduction,
            processing_time_reduction: row.processing_time_reduction,
        }
    }
}
