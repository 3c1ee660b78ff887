#![warn(missing_docs)]
//! Ports and models shared by the currency-exchange analytics workspace.
//!
//! `fxo-core` holds no business logic of its own. It defines the domain
//! entities (exchange houses, currencies, rates, logistic processes and their
//! children), the failure taxonomy every pipeline stage reports through, and
//! the traits that storage adapters and allocation engines implement.

/// Core domain models.
///
/// The models in this module are plain value objects. Relationships between
/// entities are expressed through identifiers and resolved by explicit
/// repository queries rather than by traversal.
pub mod models;

/// Interface traits for the pipeline.
///
/// These are the "ports" in the hexagonal architecture pattern: storage
/// adapters implement the repository traits and numerical backends implement
/// [`ports::AllocationEngine`], so the pipeline can be exercised against any of
/// them without change.
pub mod ports;

/// The distinguishable failure kinds reported by the pipeline.
pub mod failure;
