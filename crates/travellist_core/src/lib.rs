//! Core record store for the travel journal.
//! This crate owns persistence, identifier assignment and query ordering
//! for travel records.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod resource;
pub mod service;

pub use config::StoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::travel::{NewTravel, TravelFields, TravelId, TravelRecord, TravelValidationError};
pub use repo::query::{Column, ColumnValue, ProjectedRow, Projection, SortDirection, TravelOrder};
pub use repo::travel_table::{
    SqliteTravelTable, StoreError, StoreResult, TravelCursor, TravelTable,
};
pub use resource::{ResourceUri, ResultSet, TravelResolver, TravelValues};
pub use service::travel_store::{share_text, TravelStore, EMPTY_NOTE_PLACEHOLDER};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
