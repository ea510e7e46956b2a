//! Schema readiness checks for the `travels` table.
//!
//! # Invariants
//! - A connection is usable only when the table and all required columns
//!   exist and the schema version is not newer than this binary.

use super::migrations::{apply_migrations, current_user_version, latest_version};
use super::{DbError, DbResult};
use rusqlite::Connection;

/// Physical table holding travel rows.
pub const TRAVELS_TABLE: &str = "travels";

const REQUIRED_COLUMNS: &[&str] = &["seq", "id", "city", "country", "year", "note"];

/// Creates the schema when missing and verifies the result.
///
/// Safe to call on every startup: pending migrations run once and an
/// already-current schema is only verified.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    apply_migrations(conn)?;
    verify_schema(conn)
}

/// Checks the schema without modifying it.
pub fn verify_schema(conn: &Connection) -> DbResult<()> {
    let db_version = current_user_version(conn)?;
    let latest_supported = latest_version();
    if db_version > latest_supported {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        });
    }

    check_table_shape(conn)
}

/// Fails when `travels` is absent or lacks a required column.
pub(crate) fn check_table_shape(conn: &Connection) -> DbResult<()> {
    if !table_exists(conn, TRAVELS_TABLE)? {
        return Err(DbError::MissingRequiredTable(TRAVELS_TABLE));
    }
    check_required_columns(conn)
}

/// Like [`check_table_shape`], but a missing table passes.
pub(crate) fn check_existing_table(conn: &Connection) -> DbResult<()> {
    if !table_exists(conn, TRAVELS_TABLE)? {
        return Ok(());
    }
    check_required_columns(conn)
}

fn check_required_columns(conn: &Connection) -> DbResult<()> {
    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, TRAVELS_TABLE, column)? {
            return Err(DbError::MissingRequiredColumn {
                table: TRAVELS_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
