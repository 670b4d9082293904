use proposal_core::db::migrations::latest_version;
use proposal_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "proposal_responses");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("responses.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "proposal_responses");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unversioned_file_is_upgraded_without_touching_foreign_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE audit_notes (body TEXT); INSERT INTO audit_notes VALUES ('keep');")
        .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "proposal_responses");
    let kept: String = conn
        .query_row("SELECT body FROM audit_notes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(kept, "keep");
}

#[test]
fn newer_schema_error_names_both_versions() {
    let err = DbError::UnsupportedSchemaVersion {
        db_version: 7,
        latest_supported: 1,
    };
    let message = err.to_string();
    assert!(message.contains("v7"));
    assert!(message.contains("v1"));
}

#[test]
fn schema_rejects_decisions_outside_the_enum() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO proposal_responses (proposal_id, decision, name, email, created_at)
         VALUES ('P1', 'maybe', 'Ana', 'ana@x.com', '2026-01-01T00:00:00.000000Z');",
        [],
    );
    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
