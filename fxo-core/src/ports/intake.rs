use crate::failure::ValidationError;
use crate::models::{
    AiModel, Currency, ExchangeHouse, ExchangeRate, LogisticProcess, Optimization, Outcome,
    ProcessId, ProcessType, Report, Transaction,
};
use std::future::Future;

/// Why a record was not created.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeFailure {
    /// The record itself violates an invariant
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// A referenced record does not exist
    #[error("referenced {0} does not exist")]
    MissingReference(&'static str),
    /// A record with the same natural key already exists
    #[error("a {0} with the same key already exists")]
    Conflict(&'static str),
}

/// Creation of entities by seeding or external intake.
///
/// Every method validates its input against the data-model invariants before
/// writing, and reports violations as an [`IntakeFailure`] rather than an
/// adapter error.
pub trait IntakeRepository: super::Repository {
    /// Register an exchange house
    fn create_house(
        &self,
        house: ExchangeHouse,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Register a currency; its code must be unique
    fn create_currency(
        &self,
        currency: Currency,
    ) -> impl Future<Output = Result<Result<(), IntakeFailure>, Self::Error>> + Send;

    /// Publish a rate; at most one per (from, to, date)
    fn create_rate(
        &self,
        rate: ExchangeRate,
    ) -> impl Future<Output = Result<Result<(), IntakeFailure>, Self::Error>> + Send;

    /// Register a process classification
    fn create_process_type(
        &self,
        process_type: ProcessType,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Register a process; its end date must not precede its start date
    fn create_process(
        &self,
        process: LogisticProcess,
    ) -> impl Future<Output = Result<Result<(), IntakeFailure>, Self::Error>> + Send;

    /// Record a transaction.
    ///
    /// The amount must be positive and the referenced rate must be for the
    /// same currency pair, published on or before the transaction date.
    fn create_transaction(
        &self,
        transaction: Transaction,
    ) -> impl Future<Output = Result<Result<(), IntakeFailure>, Self::Error>> + Send;

    /// Attach an optimization record to a process
    fn create_optimization(
        &self,
        optimization: Optimization,
    ) -> impl Future<Output = Result<Result<(), IntakeFailure>, Self::Error>> + Send;

    /// Attach an outcome to an optimization
    fn create_outcome(
        &self,
        outcome: Outcome,
    ) -> impl Future<Output = Result<Result<(), IntakeFailure>, Self::Error>> + Send;

    /// Attach a report to a process
    fn create_report(
        &self,
        report: Report,
    ) -> impl Future<Output = Result<Result<(), IntakeFailure>, Self::Error>> + Send;

    /// Register a model and the processes it is used in
    fn create_ai_model(
        &self,
        model: AiModel,
        processes: Vec<ProcessId>,
    ) -> impl Future<Output = Result<Result<(), IntakeFailure>, Self::Error>> + Send;
}
