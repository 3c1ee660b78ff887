//! The error type shared by the pipeline entry points.

use fxo_core::failure::{
    Infeasible, InsufficientData, LookupFailure, NotFound, SolveFailure, ValidationError,
};

/// The failure of a pipeline operation.
///
/// Domain failures keep their own variant so callers can react to each kind;
/// `Store` carries the entity store's infrastructure error untouched.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError<E> {
    /// A record the operation depends on does not exist
    #[error(transparent)]
    NotFound(#[from] NotFound),
    /// The input violates an invariant
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The allocation problem has no finite optimum, or it was not found
    #[error(transparent)]
    Infeasible(#[from] Infeasible),
    /// Too few observations for an estimate
    #[error(transparent)]
    InsufficientData(#[from] InsufficientData),
    /// A value could not be resolved to a stored entity
    #[error(transparent)]
    Lookup(#[from] LookupFailure),
    /// The entity store failed
    #[error("entity store error: {0}")]
    Store(#[source] E),
}

impl<E> From<SolveFailure> for PipelineError<E> {
    fn from(failure: SolveFailure) -> Self {
        match failure {
            SolveFailure::Invalid(error) => Self::Validation(error),
            SolveFailure::Infeasible(error) => Self::Infeasible(error),
        }
    }
}
