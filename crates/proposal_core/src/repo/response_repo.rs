//! Response store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide append-only persistence over the `proposal_responses` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Ids come from SQLite `AUTOINCREMENT` and are never reused.
//! - All statements run on one connection behind a mutex, which serializes
//!   id assignment across concurrent callers.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::response::{
    format_timestamp, now_timestamp, Decision, ResponseDraft, ResponseId, ResponseRecord,
};
use chrono::{DateTime, Utc};
use log::error;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};

const RESPONSE_SELECT_SQL: &str = "SELECT
    id,
    proposal_id,
    decision,
    name,
    email,
    telegram,
    company,
    notes,
    source_address,
    created_at
FROM proposal_responses";

const RESPONSE_ORDER_SQL: &str = "ORDER BY created_at DESC, id DESC";

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence-layer failure. Fatal to the submission that hit it.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    LockPoisoned,
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::LockPoisoned => write!(f, "response store lock poisoned"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted response data: {message}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::LockPoisoned => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Append-only response storage.
///
/// Implementations must be safe to share across request handlers; `append`
/// must never hand the same id to two callers.
pub trait ResponseStore: Send + Sync {
    /// Assigns the next id, stamps `created_at`, and persists the record.
    fn append(&self, draft: ResponseDraft) -> StoreResult<ResponseRecord>;
    /// Every stored record, newest first.
    fn list_all(&self) -> StoreResult<Vec<ResponseRecord>>;
    /// Records for one proposal, in `list_all` order.
    fn list_by_proposal(&self, proposal_id: &str) -> StoreResult<Vec<ResponseRecord>>;
    /// Number of stored records.
    fn count(&self) -> StoreResult<u64>;
}

impl<S: ResponseStore + ?Sized> ResponseStore for Box<S> {
    fn append(&self, draft: ResponseDraft) -> StoreResult<ResponseRecord> {
        (**self).append(draft)
    }

    fn list_all(&self) -> StoreResult<Vec<ResponseRecord>> {
        (**self).list_all()
    }

    fn list_by_proposal(&self, proposal_id: &str) -> StoreResult<Vec<ResponseRecord>> {
        (**self).list_by_proposal(proposal_id)
    }

    fn count(&self) -> StoreResult<u64> {
        (**self).count()
    }
}

impl<S: ResponseStore + ?Sized> ResponseStore for Arc<S> {
    fn append(&self, draft: ResponseDraft) -> StoreResult<ResponseRecord> {
        (**self).append(draft)
    }

    fn list_all(&self) -> StoreResult<Vec<ResponseRecord>> {
        (**self).list_all()
    }

    fn list_by_proposal(&self, proposal_id: &str) -> StoreResult<Vec<ResponseRecord>> {
        (**self).list_by_proposal(proposal_id)
    }

    fn count(&self) -> StoreResult<u64> {
        (**self).count()
    }
}

/// SQLite-backed response store.
pub struct SqliteResponseStore {
    conn: Mutex<Connection>,
}

impl SqliteResponseStore {
    /// Wraps a connection returned by `db::open_db*` (migrations applied).
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            error!("event=store_lock module=repo status=error error_code=lock_poisoned");
            StoreError::LockPoisoned
        })
    }
}

impl ResponseStore for SqliteResponseStore {
    fn append(&self, draft: ResponseDraft) -> StoreResult<ResponseRecord> {
        let conn = self.lock()?;
        let created_at = now_timestamp();

        conn.execute(
            "INSERT INTO proposal_responses (
                proposal_id,
                decision,
                name,
                email,
                telegram,
                company,
                notes,
                source_address,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                draft.proposal_id.as_str(),
                draft.decision.as_str(),
                draft.name.as_str(),
                draft.email.as_str(),
                draft.telegram.as_str(),
                draft.company.as_str(),
                draft.notes.as_str(),
                draft.source_address.as_deref(),
                format_timestamp(&created_at),
            ],
        )?;
        let id = conn.last_insert_rowid();

        Ok(draft.into_record(id, created_at))
    }

    fn list_all(&self) -> StoreResult<Vec<ResponseRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{RESPONSE_SELECT_SQL} {RESPONSE_ORDER_SQL};"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_response_row(row)?);
        }

        Ok(records)
    }

    fn list_by_proposal(&self, proposal_id: &str) -> StoreResult<Vec<ResponseRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{RESPONSE_SELECT_SQL}
             WHERE proposal_id = ?1
             {RESPONSE_ORDER_SQL};"
        ))?;
        let mut rows = stmt.query([proposal_id])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_response_row(row)?);
        }

        Ok(records)
    }

    fn count(&self) -> StoreResult<u64> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM proposal_responses;", [], |row| {
                row.get(0)
            })?;
        u64::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("negative row count `{count}`")))
    }
}

fn parse_response_row(row: &Row<'_>) -> StoreResult<ResponseRecord> {
    let id: ResponseId = row.get("id")?;

    let decision_text: String = row.get("decision")?;
    let decision = Decision::parse(&decision_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid decision `{decision_text}` in proposal_responses.decision (id={id})"
        ))
    })?;

    let created_at_text: String = row.get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_text)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|_| {
            StoreError::InvalidData(format!(
                "invalid timestamp `{created_at_text}` in proposal_responses.created_at (id={id})"
            ))
        })?;

    Ok(ResponseRecord {
        id,
        proposal_id: row.get("proposal_id")?,
        decision,
        name: row.get("name")?,
        email: row.get("email")?,
        telegram: row.get("telegram")?,
        company: row.get("company")?,
        notes: row.get("notes")?,
        created_at,
        source_address: row.get("source_address")?,
    })
}
