//! Domain model for travel records.
//!
//! # Responsibility
//! - Define the typed record and the insert/update payloads.
//! - Keep raw storage rows out of caller-facing signatures.
//!
//! # Invariants
//! - Every record is identified by a store-assigned `TravelId`.
//! - Deletion is permanent; there is no tombstone state.

pub mod travel;
