//! Travel table contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide row-level insert/update/delete/query over the `travels` table.
//! - Keep SQL text and name-based column access inside this module.
//! - Map SQLite failures onto the store error taxonomy.
//!
//! # Invariants
//! - Write paths validate input before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - `delete_row` on a missing id is a no-op, never an error.
//! - Cursor queries re-execute against current state on every iteration
//!   request.

use crate::db::{self, DbError, TRAVELS_TABLE};
use crate::model::travel::{
    normalize_note, NewTravel, TravelFields, TravelId, TravelRecord, TravelValidationError,
};
use crate::repo::query::{ProjectedRow, Projection, TravelOrder};
use rusqlite::{params, Connection, ErrorCode, Row, Rows, Statement};
use rusqlite::{Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TRAVEL_SELECT_SQL: &str = "SELECT
    id,
    city,
    country,
    year,
    note
FROM travels";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error taxonomy for table and store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Backing schema is missing or incompatible. Not recoverable without
    /// reinitializing the database.
    Schema(DbError),
    /// Insert collided with an existing id.
    Constraint { id: TravelId },
    /// Update or fetch referenced an id that does not exist.
    NotFound(TravelId),
    /// Underlying read/write failure.
    StorageIo(DbError),
    /// Caller input violates record invariants.
    Validation(TravelValidationError),
    /// A persisted row cannot be converted into a valid record.
    InvalidData(String),
    /// Request cannot be served as asked: a malformed resource address,
    /// projection or ordering clause, or no id left to assign.
    InvalidRequest(String),
}

impl StoreError {
    /// Short machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Schema(_) => "schema_error",
            Self::Constraint { .. } => "constraint_error",
            Self::NotFound(_) => "not_found",
            Self::StorageIo(_) => "storage_io_error",
            Self::Validation(_) => "validation_error",
            Self::InvalidData(_) => "invalid_data",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema(err) => write!(f, "incompatible travel schema: {err}"),
            Self::Constraint { id } => write!(f, "travel id {id} already exists"),
            Self::NotFound(id) => write!(f, "travel not found: {id}"),
            Self::StorageIo(err) => write!(f, "travel storage failure: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted travel data: {message}"),
            Self::InvalidRequest(message) => write!(f, "invalid travel request: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Schema(err) | Self::StorageIo(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Constraint { .. }
            | Self::NotFound(_)
            | Self::InvalidData(_)
            | Self::InvalidRequest(_) => None,
        }
    }
}

impl From<TravelValidationError> for StoreError {
    fn from(value: TravelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        if value.is_schema_error() {
            Self::Schema(value)
        } else {
            Self::StorageIo(value)
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::StorageIo(DbError::Sqlite(value))
    }
}

/// Row-level persistence contract for travel records.
pub trait TravelTable {
    /// Idempotently creates the backing table and verifies its shape.
    fn create_schema(&self) -> StoreResult<()>;
    /// Persists a new row and returns its id. `request.id == None` lets the
    /// table pick `max(id) + 1` within the same statement.
    fn insert_row(&self, request: &NewTravel) -> StoreResult<TravelId>;
    /// Overwrites all editable fields of an existing row.
    fn update_row(&self, id: TravelId, fields: &TravelFields) -> StoreResult<()>;
    /// Removes a row. Returns whether a row existed.
    fn delete_row(&self, id: TravelId) -> StoreResult<bool>;
    /// Loads a single row by id.
    fn get_row(&self, id: TravelId) -> StoreResult<Option<TravelRecord>>;
    /// Prepares a cursor over all rows in the given order.
    fn query_rows(&self, order: TravelOrder) -> StoreResult<TravelCursor<'_>>;
    /// Prepares a cursor yielding at most the row with `id`.
    fn query_row(&self, id: TravelId) -> StoreResult<TravelCursor<'_>>;
    /// Greatest id currently present, or `0` when the table is empty.
    fn max_id(&self) -> StoreResult<TravelId>;
    /// Number of live rows.
    fn count_rows(&self) -> StoreResult<u64>;
    /// Runs `f` while holding the database write lock, committing on
    /// success and rolling back on error.
    fn with_write_lock<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Self) -> StoreResult<T>;
}

/// SQLite-backed travel table.
pub struct SqliteTravelTable<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTravelTable<'conn> {
    /// Wraps a connection whose schema is already in place.
    ///
    /// Returns `StoreError::Schema` when the table or a required column is
    /// missing.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        db::verify_schema(conn)?;
        Ok(Self { conn })
    }

    /// Wraps a raw connection and creates the schema when missing.
    pub fn bootstrap(conn: &'conn Connection) -> StoreResult<Self> {
        let table = Self { conn };
        table.create_schema()?;
        Ok(table)
    }
}

impl TravelTable for SqliteTravelTable<'_> {
    fn create_schema(&self) -> StoreResult<()> {
        db::ensure_schema(self.conn)?;
        Ok(())
    }

    fn insert_row(&self, request: &NewTravel) -> StoreResult<TravelId> {
        request.validate()?;
        let fields = &request.fields;
        let note = normalize_note(fields.note.clone());

        match request.id {
            Some(id) => {
                self.conn
                    .execute(
                        "INSERT INTO travels (id, city, country, year, note)
                         VALUES (?1, ?2, ?3, ?4, ?5);",
                        params![id, fields.city, fields.country, fields.year, note],
                    )
                    .map_err(|err| map_constraint(err, id))?;
                Ok(id)
            }
            None => {
                let id: TravelId = self.conn.query_row(
                    "INSERT INTO travels (id, city, country, year, note)
                     VALUES (
                        (SELECT COALESCE(MAX(id), 0) + 1 FROM travels),
                        ?1, ?2, ?3, ?4
                     )
                     RETURNING id;",
                    params![fields.city, fields.country, fields.year, note],
                    |row| row.get(0),
                )?;
                Ok(id)
            }
        }
    }

    fn update_row(&self, id: TravelId, fields: &TravelFields) -> StoreResult<()> {
        fields.validate()?;

        let changed = self.conn.execute(
            "UPDATE travels
             SET
                city = ?1,
                country = ?2,
                year = ?3,
                note = ?4
             WHERE id = ?5;",
            params![
                fields.city,
                fields.country,
                fields.year,
                normalize_note(fields.note.clone()),
                id
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }

    fn delete_row(&self, id: TravelId) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM travels WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn get_row(&self, id: TravelId) -> StoreResult<Option<TravelRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TRAVEL_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_travel_row(row)?));
        }
        Ok(None)
    }

    fn query_rows(&self, order: TravelOrder) -> StoreResult<TravelCursor<'_>> {
        let stmt = self
            .conn
            .prepare(&format!("{TRAVEL_SELECT_SQL} {};", order.sql_clause()))?;
        Ok(TravelCursor {
            stmt,
            id_filter: None,
        })
    }

    fn query_row(&self, id: TravelId) -> StoreResult<TravelCursor<'_>> {
        let stmt = self
            .conn
            .prepare(&format!("{TRAVEL_SELECT_SQL} WHERE id = ?1;"))?;
        Ok(TravelCursor {
            stmt,
            id_filter: Some(id),
        })
    }

    fn max_id(&self) -> StoreResult<TravelId> {
        let max: TravelId = self.conn.query_row(
            "SELECT COALESCE(MAX(id), 0) FROM travels;",
            [],
            |row| row.get(0),
        )?;
        Ok(max)
    }

    fn count_rows(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM travels;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("negative row count {count}")))
    }

    fn with_write_lock<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Self) -> StoreResult<T>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }
}

/// Prepared query over the travel table.
///
/// The statement is acquired when the cursor is created and released when
/// the cursor is dropped or closed. Each call to [`TravelCursor::records`]
/// or [`TravelCursor::rows`] executes the statement again.
pub struct TravelCursor<'conn> {
    stmt: Statement<'conn>,
    id_filter: Option<TravelId>,
}

impl TravelCursor<'_> {
    /// Executes the query and iterates typed records.
    pub fn records(&mut self) -> StoreResult<TravelRecords<'_>> {
        let rows = match self.id_filter {
            Some(id) => self.stmt.query([id])?,
            None => self.stmt.query([])?,
        };
        Ok(TravelRecords { rows, done: false })
    }

    /// Executes the query and iterates rows restricted to `projection`.
    pub fn rows<'p>(&mut self, projection: &'p Projection) -> StoreResult<ProjectedRows<'_, 'p>> {
        let records = self.records()?;
        Ok(ProjectedRows {
            records,
            projection,
        })
    }

    /// Executes the query and collects every record.
    pub fn collect_records(&mut self) -> StoreResult<Vec<TravelRecord>> {
        self.records()?.collect()
    }

    /// Releases the prepared statement.
    pub fn close(self) {}
}

/// Forward-only iterator over typed records of one cursor execution.
pub struct TravelRecords<'stmt> {
    rows: Rows<'stmt>,
    done: bool,
}

impl Iterator for TravelRecords<'_> {
    type Item = StoreResult<TravelRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.rows.next() {
            Ok(Some(row)) => Some(parse_travel_row(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err.into()))
            }
        }
    }
}

/// Forward-only iterator over projected rows of one cursor execution.
pub struct ProjectedRows<'stmt, 'p> {
    records: TravelRecords<'stmt>,
    projection: &'p Projection,
}

impl Iterator for ProjectedRows<'_, '_> {
    type Item = StoreResult<ProjectedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let projection = self.projection;
        self.records
            .next()
            .map(|record| record.map(|record| ProjectedRow::from_record(&record, projection)))
    }
}

fn parse_travel_row(row: &Row<'_>) -> StoreResult<TravelRecord> {
    let id: TravelId = row.get("id")?;
    if id < 1 {
        return Err(StoreError::InvalidData(format!(
            "invalid id `{id}` in {TRAVELS_TABLE}.id"
        )));
    }

    let record = TravelRecord {
        id,
        city: row.get("city")?,
        country: row.get("country")?,
        year: row.get("year")?,
        note: normalize_note(row.get("note")?),
    };
    record.fields().validate().map_err(|err| {
        StoreError::InvalidData(format!("row {id} in {TRAVELS_TABLE}: {err}"))
    })?;
    Ok(record)
}

fn map_constraint(err: rusqlite::Error, id: TravelId) -> StoreError {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    ) {
        StoreError::Constraint { id }
    } else {
        err.into()
    }
}

