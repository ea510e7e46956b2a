//! Store-level services.
//!
//! # Responsibility
//! - Expose collection semantics over the travel table.
//! - Keep presentation layers decoupled from storage details.

pub mod travel_store;
