//! The ETL synchronizer.
//!
//! Extraction and loading go through [`SyncRepository`]; everything in
//! between is the pure [`transform`], which can be exercised without a store.
//! Loading happens in two independent phases, one store transaction each, and
//! a row that cannot be loaded is skipped and reported rather than aborting
//! its phase.

use crate::PipelineError;
use fxo_core::{
    failure::{LookupFailure, ValidationError},
    models::{
        Date, LogisticProcess, Map, ProcessExtract, ProcessId, ProcessMetrics, ProcessStatus,
        ProcessUpdate, RowOutcome, TransactionAggregates, TransactionExtract, TransactionUpsert,
        parse_date,
    },
    ports::SyncRepository,
};
use rustc_hash::FxHashSet;
use serde::{Serialize, Serializer};
use std::fmt::Display;

/// The load phase a skipped row belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Writing process fields and metrics
    Processes,
    /// Upserting transactions
    Transactions,
}

/// Why a row was skipped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WarningKind {
    /// A process row carried no identifier
    #[error("process row has no identifier")]
    MissingId,
    /// A field failed to parse or the row violates an invariant
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// The identified process is not in the store
    #[error("process does not exist")]
    UnknownProcess,
    /// A currency code or rate value did not resolve
    #[error(transparent)]
    Lookup(#[from] LookupFailure),
}

/// A skipped row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncWarning {
    /// Where it happened
    pub phase: Phase,
    /// The process the row belongs to, when known
    pub process_id: Option<ProcessId>,
    /// What went wrong
    #[serde(serialize_with = "display")]
    pub kind: WarningKind,
}

fn display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Row counts for a committed phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseStats {
    /// Rows newly written
    pub inserted: usize,
    /// Rows overwritten
    pub updated: usize,
    /// Rows that already matched
    pub unchanged: usize,
    /// Rows that were not loaded, each with a warning
    pub skipped: usize,
}

impl PhaseStats {
    fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Inserted => self.inserted += 1,
            RowOutcome::Updated => self.updated += 1,
            RowOutcome::Unchanged => self.unchanged += 1,
            RowOutcome::Missing => self.skipped += 1,
        }
    }

    /// How many rows the phase wrote
    pub fn writes(&self) -> usize {
        self.inserted + self.updated
    }
}

/// How a load phase ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum PhaseOutcome {
    /// The phase's store transaction committed
    Committed(PhaseStats),
    /// The phase's store transaction was rolled back
    Failed {
        /// The store's error
        message: String,
    },
}

impl PhaseOutcome {
    /// The stats, if the phase committed
    pub fn stats(&self) -> Option<&PhaseStats> {
        match self {
            Self::Committed(stats) => Some(stats),
            Self::Failed { .. } => None,
        }
    }
}

/// The result of a synchronizer run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    /// Process fields and metrics
    pub processes: PhaseOutcome,
    /// Transaction upserts
    pub transactions: PhaseOutcome,
    /// Every skipped row, in the order encountered
    pub warnings: Vec<SyncWarning>,
}

impl SyncReport {
    /// Rows written across both committed phases
    pub fn writes(&self) -> usize {
        [&self.processes, &self.transactions]
            .into_iter()
            .filter_map(PhaseOutcome::stats)
            .map(PhaseStats::writes)
            .sum()
    }
}

/// The loadable rows derived from an extraction, and the rows dropped on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transformed {
    /// Process rows to write back
    pub processes: Vec<ProcessUpdate>,
    /// Transaction rows to upsert
    pub transactions: Vec<TransactionUpsert>,
    /// Rows that will not be loaded
    pub warnings: Vec<SyncWarning>,
}

/// Derive loadable rows from extracted ones.
///
/// Transactions with an unparseable date are dropped before aggregation.
/// Process rows are deduplicated (first occurrence wins), and a row with a
/// missing identifier, an unparseable date or status, or an end before its
/// start is dropped. Each dropped row yields a warning.
pub fn transform(
    processes: Vec<ProcessExtract>,
    transactions: Vec<TransactionExtract>,
) -> Transformed {
    let mut warnings = Vec::new();
    let mut warn = |phase: Phase, process_id: Option<ProcessId>, kind: WarningKind| {
        warnings.push(SyncWarning {
            phase,
            process_id,
            kind,
        })
    };

    let mut upserts = Vec::with_capacity(transactions.len());
    let mut totals: Map<ProcessId, (f64, u32, f64)> = Map::default();
    for row in transactions {
        let date = match parse_field("date", &row.date) {
            Ok(date) => date,
            Err(error) => {
                warn(Phase::Transactions, Some(row.process_id), error.into());
                continue;
            }
        };

        let entry = totals.entry(row.process_id).or_insert((0.0, 0, 0.0));
        entry.0 += row.amount;
        entry.1 += 1;
        entry.2 += row.rate;

        upserts.push(TransactionUpsert {
            process_id: row.process_id,
            date,
            from_currency: row.from_currency,
            to_currency: row.to_currency,
            amount: row.amount,
            rate: row.rate,
        });
    }

    let mut seen = FxHashSet::default();
    let mut updates = Vec::with_capacity(processes.len());
    for row in processes {
        if !seen.insert(row.clone()) {
            continue;
        }

        let Some(id) = row.id else {
            warn(Phase::Processes, None, WarningKind::MissingId);
            continue;
        };

        let aggregates = totals.get(&id).map(|&(total_amount, transaction_count, rate_sum)| {
            TransactionAggregates {
                total_amount,
                transaction_count,
                mean_rate: rate_sum / f64::from(transaction_count),
            }
        });

        match process_update(id, &row, aggregates) {
            Ok(update) => updates.push(update),
            Err(error) => warn(Phase::Processes, Some(id), error.into()),
        }
    }

    Transformed {
        processes: updates,
        transactions: upserts,
        warnings,
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<Date, ValidationError> {
    parse_date(value).map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_owned(),
    })
}

fn process_update(
    id: ProcessId,
    row: &ProcessExtract,
    aggregates: Option<TransactionAggregates>,
) -> Result<ProcessUpdate, ValidationError> {
    let start_date = parse_field("start_date", &row.start_date)?;
    let end_date = match row.end_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(parse_field("end_date", value)?),
    };
    let status: ProcessStatus = row.status.parse()?;
    LogisticProcess::check_span(start_date, end_date)?;

    let duration_days = LogisticProcess::span_days(start_date, end_date)
        .unwrap_or(ProcessMetrics::OPEN_DURATION);

    Ok(ProcessUpdate {
        id,
        status,
        start_date,
        end_date,
        metrics: ProcessMetrics {
            duration_days,
            aggregates,
        },
    })
}

/// Run the synchronizer once: extract, transform, then load both phases.
///
/// Only extraction failures are returned as errors. A load phase that fails is
/// rolled back and reported as [`PhaseOutcome::Failed`] without affecting the
/// other phase.
#[tracing::instrument(skip_all)]
pub async fn synchronize<S: SyncRepository>(
    store: &S,
) -> Result<SyncReport, PipelineError<S::Error>> {
    let (processes, transactions) =
        tokio::try_join!(store.extract_processes(), store.extract_transactions())
            .map_err(PipelineError::Store)?;

    if processes.is_empty() && transactions.is_empty() {
        tracing::info!("nothing to synchronize");
        return Ok(SyncReport {
            processes: PhaseOutcome::Committed(PhaseStats::default()),
            transactions: PhaseOutcome::Committed(PhaseStats::default()),
            warnings: Vec::new(),
        });
    }

    tracing::debug!(
        processes = processes.len(),
        transactions = transactions.len(),
        "extracted"
    );

    let Transformed {
        processes,
        transactions,
        mut warnings,
    } = transform(processes, transactions);

    // rows dropped in transform count as skipped in the phase they belong to
    let mut process_stats = PhaseStats::default();
    let mut transaction_stats = PhaseStats::default();
    for warning in &warnings {
        match warning.phase {
            Phase::Processes => process_stats.skipped += 1,
            Phase::Transactions => transaction_stats.skipped += 1,
        }
    }

    let ids: Vec<ProcessId> = processes.iter().map(|row| row.id).collect();
    let process_phase = match store.load_processes(processes).await {
        Ok(outcomes) => {
            for (id, outcome) in ids.into_iter().zip(outcomes) {
                if outcome == RowOutcome::Missing {
                    warnings.push(SyncWarning {
                        phase: Phase::Processes,
                        process_id: Some(id),
                        kind: WarningKind::UnknownProcess,
                    });
                }
                process_stats.record(outcome);
            }
            PhaseOutcome::Committed(process_stats)
        }
        Err(error) => {
            tracing::error!(%error, "process phase rolled back");
            PhaseOutcome::Failed {
                message: error.to_string(),
            }
        }
    };

    let ids: Vec<ProcessId> = transactions.iter().map(|row| row.process_id).collect();
    let transaction_phase = match store.load_transactions(transactions).await {
        Ok(outcomes) => {
            for (id, outcome) in ids.into_iter().zip(outcomes) {
                match outcome {
                    Ok(RowOutcome::Missing) => {
                        warnings.push(SyncWarning {
                            phase: Phase::Transactions,
                            process_id: Some(id),
                            kind: WarningKind::UnknownProcess,
                        });
                        transaction_stats.skipped += 1;
                    }
                    Ok(outcome) => transaction_stats.record(outcome),
                    Err(failure) => {
                        warnings.push(SyncWarning {
                            phase: Phase::Transactions,
                            process_id: Some(id),
                            kind: failure.into(),
                        });
                        transaction_stats.skipped += 1;
                    }
                }
            }
            PhaseOutcome::Committed(transaction_stats)
        }
        Err(error) => {
            tracing::error!(%error, "transaction phase rolled back");
            PhaseOutcome::Failed {
                message: error.to_string(),
            }
        }
    };

    for warning in &warnings {
        tracing::warn!(
            phase = ?warning.phase,
            process_id = ?warning.process_id,
            "skipped row: {}",
            warning.kind
        );
    }

    let report = SyncReport {
        processes: process_phase,
        transactions: transaction_phase,
        warnings,
    };
    tracing::info!(writes = report.writes(), skipped = report.warnings.len(), "synchronized");

    Ok(report)
}
