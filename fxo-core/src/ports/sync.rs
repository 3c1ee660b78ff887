use crate::failure::LookupFailure;
use crate::models::{
    ProcessExtract, ProcessUpdate, RowOutcome, TransactionExtract, TransactionUpsert,
};
use std::future::Future;

/// Repository interface used by the ETL synchronizer.
///
/// The two load methods are independent units of work: each either applies
/// all of its rows or none of them, so a failure in one never leaves the other
/// half-written.
pub trait SyncRepository: super::Repository {
    /// Every process joined with its house and process type
    fn extract_processes(
        &self,
    ) -> impl Future<Output = Result<Vec<ProcessExtract>, Self::Error>> + Send;

    /// Every transaction with currencies and rate resolved to scalar values,
    /// ordered by process, then date, then insertion
    fn extract_transactions(
        &self,
    ) -> impl Future<Output = Result<Vec<TransactionExtract>, Self::Error>> + Send;

    /// Write back process fields and derived metrics in a single unit of work.
    ///
    /// # Returns
    ///
    /// One outcome per input row, in input order. Rows whose process no longer
    /// exists report [`RowOutcome::Missing`]; rows that already match the store
    /// report [`RowOutcome::Unchanged`] and cause no write.
    fn load_processes(
        &self,
        rows: Vec<ProcessUpdate>,
    ) -> impl Future<Output = Result<Vec<RowOutcome>, Self::Error>> + Send;

    /// Upsert transactions keyed on (process, date) in a single unit of work.
    ///
    /// # Returns
    ///
    /// One entry per input row, in input order. A row whose currency code or
    /// rate value cannot be resolved yields a [`LookupFailure`] and is skipped;
    /// the remaining rows are still applied.
    fn load_transactions(
        &self,
        rows: Vec<TransactionUpsert>,
    ) -> impl Future<Output = Result<Vec<Result<RowOutcome, LookupFailure>>, Self::Error>> + Send;
}
