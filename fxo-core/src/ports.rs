mod analysis;
mod engine;
mod intake;
mod process;
mod sync;

pub use analysis::AnalysisRepository;
pub use engine::AllocationEngine;
pub use intake::{IntakeFailure, IntakeRepository};
pub use process::ProcessRepository;
pub use sync::SyncRepository;

/// Base trait for all repository traits.
///
/// Storage adapters choose their own error type for infrastructure failures
/// (connection loss, malformed rows, ...). Domain failures are never folded
/// into it: operations that can fail for domain reasons return a nested
/// `Result<Result<T, Failure>, Self::Error>`.
pub trait Repository: Sized {
    /// The adapter's infrastructure error
    type Error: std::error::Error + Send + Sync + 'static;
}
