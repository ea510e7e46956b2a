//! Repository layer: row-level persistence for travel records.
//!
//! # Responsibility
//! - Define the travel table contract and its SQLite implementation.
//! - Isolate SQL details from the store facade.
//!
//! # Invariants
//! - Repository writes validate records before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `Constraint`) in
//!   addition to storage errors.

pub mod query;
pub mod travel_table;
