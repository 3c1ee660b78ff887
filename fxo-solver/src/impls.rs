/// Exact solution for linear objective and linear cost
pub mod closed_form;

/// Implementation using the Clarabel interior point solver
#[cfg(feature = "clarabel")]
pub mod clarabel;

#[cfg(feature = "clarabel")]
mod auto;
#[cfg(feature = "clarabel")]
pub use auto::AutoEngine;
