//! Versioned schema for the `proposal_responses` table.
//!
//! # Responsibility
//! - Keep the ordered list of schema steps for the response store.
//! - Bring a connection from its recorded version to `latest_version()`.
//!
//! # Invariants
//! - Steps are listed in ascending `version`; a released step is never edited.
//! - `PRAGMA user_version` equals the last step applied, inside the same
//!   transaction as the step itself.
//! - Step 1 creates the `AUTOINCREMENT` id column, so ids are never reused.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    sql: include_str!("0001_responses.sql"),
}];

/// Highest response schema version this build can open.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Upgrades the response schema on `conn` to `latest_version()`.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the file is ahead of this build.
/// - `DbError::Sqlite` when a step fails; nothing from the batch is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let recorded = recorded_version(conn)?;
    let latest = latest_version();

    if recorded > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: recorded,
            latest_supported: latest,
        });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > recorded)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        recorded, latest
    );
    Ok(())
}

fn recorded_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}
