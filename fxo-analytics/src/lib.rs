#![warn(missing_docs)]
//! The process analytics and resource-optimization pipeline.
//!
//! Three independent entry points operate on an entity store through the
//! ports of [`fxo_core::ports`]:
//!
//! - [`etl::synchronize`] reconciles derived per-process metrics back into the store,
//! - [`analysis::analyze`] computes KPIs, correlations, a two-sample comparison and a trend,
//! - [`optimizer::EfficiencyOptimizer`] allocates a budget to maximize exchange volume.
//!
//! The synchronizer is expected to run first; the analyzer and optimizer only
//! read. [`legacy`] applies the same transformations and statistics to flat CSV files.

pub mod analysis;
mod encoding;
pub mod error;
pub mod etl;
pub mod legacy;
pub mod optimizer;
pub mod stats;

pub use error::PipelineError;
