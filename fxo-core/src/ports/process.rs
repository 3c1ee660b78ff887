use crate::models::{
    CurrencyCode, Date, ExchangeRate, LogisticProcess, Optimization, ProcessId, Transaction,
};
use std::future::Future;

/// Read access to a single process and the records the optimizer needs.
pub trait ProcessRepository: super::Repository {
    /// Get a process by id
    fn get_process(
        &self,
        process_id: ProcessId,
    ) -> impl Future<Output = Result<Option<LogisticProcess>, Self::Error>> + Send;

    /// The earliest transaction of a process, ties broken by insertion order
    fn first_transaction(
        &self,
        process_id: ProcessId,
    ) -> impl Future<Output = Result<Option<Transaction>, Self::Error>> + Send;

    /// The most recent rate for the pair published on or before `date`
    fn rate_on_or_before(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        date: Date,
    ) -> impl Future<Output = Result<Option<ExchangeRate>, Self::Error>> + Send;

    /// The optimization with the latest implementation date, ties broken by insertion order
    fn latest_optimization(
        &self,
        process_id: ProcessId,
    ) -> impl Future<Output = Result<Option<Optimization>, Self::Error>> + Send;
}
