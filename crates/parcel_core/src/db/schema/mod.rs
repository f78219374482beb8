//! Parcel table bootstrap.
//!
//! # Responsibility
//! - Create the `parcel` table on fresh databases.
//! - Refuse databases written by a newer schema.
//!
//! # Invariants
//! - Applied schema version is mirrored to `PRAGMA user_version`.
//! - Bootstrap is idempotent and runs in a single transaction.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// Schema version stamped into `PRAGMA user_version` after bootstrap.
pub const SCHEMA_VERSION: u32 = 1;

const PARCEL_TABLE_SQL: &str = include_str!("0001_parcel.sql");

/// Ensures the `parcel` table exists and the database version is supported.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let current_version = user_version(conn)?;

    if current_version > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: SCHEMA_VERSION,
        });
    }

    if current_version == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(PARCEL_TABLE_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;

    info!(
        "event=schema_bootstrap module=db status=ok from_version={} to_version={}",
        current_version, SCHEMA_VERSION
    );
    Ok(())
}

/// Reads `PRAGMA user_version` from the connection.
pub fn user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
