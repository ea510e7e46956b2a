//! Travel store facade.
//!
//! # Responsibility
//! - Provide collection-level CRUD entry points over a travel table.
//! - Own the identifier-assignment policy for inserts.
//! - Render records as shareable plain text.
//!
//! # Invariants
//! - Auto-assigned ids are `max(id) + 1`, computed and written under the
//!   table write lock so concurrent writers never collide.
//! - `list_all` returns a snapshot; later writes need a new call.
//! - Store logs carry ids and counts only, never record content.

use crate::model::travel::{NewTravel, TravelFields, TravelId, TravelRecord};
use crate::repo::query::TravelOrder;
use crate::repo::travel_table::{StoreError, StoreResult, TravelCursor, TravelTable};
use log::{debug, info, warn};

/// Placeholder used by [`share_text`] when a record has no note.
pub const EMPTY_NOTE_PLACEHOLDER: &str = "(no note)";

/// Collection facade over a [`TravelTable`].
///
/// The table is injected by the caller; the store holds no global state.
pub struct TravelStore<T: TravelTable> {
    table: T,
}

impl<T: TravelTable> TravelStore<T> {
    /// Creates a store over the provided table implementation.
    pub fn new(table: T) -> Self {
        Self { table }
    }

    /// Borrows the underlying table.
    pub fn table(&self) -> &T {
        &self.table
    }

    /// Returns every record, most recent year first.
    pub fn list_all(&self) -> StoreResult<Vec<TravelRecord>> {
        let records = self.query(TravelOrder::year_desc())?.collect_records()?;
        debug!(
            "event=travel_list module=store status=ok count={}",
            records.len()
        );
        Ok(records)
    }

    /// Prepares a lazy cursor over all records in `order`.
    pub fn query(&self, order: TravelOrder) -> StoreResult<TravelCursor<'_>> {
        self.table.query_rows(order)
    }

    /// Prepares a lazy cursor over the single record `id`, if present.
    pub fn query_item(&self, id: TravelId) -> StoreResult<TravelCursor<'_>> {
        self.table.query_row(id)
    }

    /// Loads one record or fails with [`StoreError::NotFound`].
    pub fn get_by_id(&self, id: TravelId) -> StoreResult<TravelRecord> {
        self.table.get_row(id)?.ok_or(StoreError::NotFound(id))
    }

    /// Inserts a record and returns its id.
    ///
    /// `request.id == None` assigns `max(id) + 1`; an explicit id is used
    /// as-is and fails with [`StoreError::Constraint`] when taken.
    pub fn insert(&self, request: &NewTravel) -> StoreResult<TravelId> {
        request.validate()?;

        let result = self.table.with_write_lock(|table| {
            let id = match request.id {
                Some(id) => id,
                None => next_id(table.max_id()?)?,
            };
            table.insert_row(&NewTravel::with_id(id, request.fields.clone()))
        });

        let assignment = if request.id.is_some() {
            "explicit"
        } else {
            "auto"
        };
        match &result {
            Ok(id) => info!(
                "event=travel_insert module=store status=ok id={} assignment={}",
                id, assignment
            ),
            Err(err) => warn!(
                "event=travel_insert module=store status=error assignment={} error_code={}",
                assignment,
                err.code()
            ),
        }
        result
    }

    /// Replaces the editable fields of record `id`.
    pub fn update(&self, id: TravelId, fields: &TravelFields) -> StoreResult<()> {
        let result = self.table.update_row(id, fields);
        log_update(id, "replace", &result);
        result
    }

    /// Loads record `id`, passes its fields through `change` and writes the
    /// result back. Read and write share one write lock, so a concurrent
    /// writer cannot slip in between them.
    pub fn edit<F>(&self, id: TravelId, change: F) -> StoreResult<TravelRecord>
    where
        F: FnOnce(TravelFields) -> TravelFields,
    {
        let result = self.table.with_write_lock(|table| {
            let current = table.get_row(id)?.ok_or(StoreError::NotFound(id))?;
            let fields = change(current.fields());
            table.update_row(id, &fields)?;
            Ok(TravelRecord::from_parts(id, fields))
        });
        log_update(id, "merge", &result);
        result
    }

    /// Deletes record `id`. Deleting a missing id succeeds.
    pub fn delete(&self, id: TravelId) -> StoreResult<()> {
        let removed = self.table.delete_row(id)?;
        info!(
            "event=travel_delete module=store status=ok id={} removed={}",
            id, removed
        );
        Ok(())
    }

    /// Number of live records.
    pub fn count(&self) -> StoreResult<u64> {
        self.table.count_rows()
    }
}

/// Renders a record in the plain-text share format.
pub fn share_text(record: &TravelRecord) -> String {
    format!(
        "{} ({})\nYear: {}\nNote: {}",
        record.city,
        record.country,
        record.year,
        record.note_or(EMPTY_NOTE_PLACEHOLDER)
    )
}

fn log_update<T>(id: TravelId, mode: &str, result: &StoreResult<T>) {
    match result {
        Ok(_) => info!(
            "event=travel_update module=store status=ok id={} mode={}",
            id, mode
        ),
        Err(err) => warn!(
            "event=travel_update module=store status=error id={} mode={} error_code={}",
            id,
            mode,
            err.code()
        ),
    }
}

fn next_id(max_id: TravelId) -> StoreResult<TravelId> {
    max_id
        .checked_add(1)
        .ok_or_else(|| StoreError::InvalidRequest(format!("no id left after {max_id}")))
}
