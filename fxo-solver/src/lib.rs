//! Engines for the budget-constrained allocation problem.
//!
//! Every engine implements [`fxo_core::ports::AllocationEngine`]. The
//! [`closed_form::ClosedForm`] engine answers linear problems exactly; the
//! [`clarabel::ClarabelEngine`] handles concave volume curves and convex cost
//! curves with an interior-point conic solver. [`AutoEngine`] picks between
//! them by asking whether the problem is linear.

/**
 * These are implementations of the allocation engine.
 */
mod impls;
pub use impls::*;

/// Engine settings, suitable for embedding in an application config.
pub mod config;
