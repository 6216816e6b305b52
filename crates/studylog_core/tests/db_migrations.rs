use rusqlite::Connection;
use studylog_core::db::migrations::latest_version;
use studylog_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "owners");
    assert_table_exists(&conn, "items");
    assert_index_exists(&conn, "idx_items_item_id");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studylog.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "items");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

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
fn items_are_keyed_by_owner_and_item_id() {
    let conn = open_db_in_memory().unwrap();
    let insert = "INSERT INTO items (
            owner_id, item_id, text, memo, tag, is_review, is_input,
            count, priority, created_at, updated_at, reviewed_at, revision
        ) VALUES (?1, 'same_id', 't', '', '', 1, 1, 0, 0, 1, 1, 1, 1);";

    conn.execute(insert, ["u1"]).unwrap();
    conn.execute(insert, ["u2"]).unwrap();
    assert!(conn.execute(insert, ["u1"]).is_err());
}

#[test]
fn owners_reject_duplicate_user_names() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO owners (owner_id, user_name, created_at, last_login_at, disabled)
         VALUES ('u1', 'alice', 1, 1, 0);",
        [],
    )
    .unwrap();

    let result = conn.execute(
        "INSERT INTO owners (owner_id, user_name, created_at, last_login_at, disabled)
         VALUES ('u2', 'alice', 1, 1, 0);",
        [],
    );
    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_schema_object_exists(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_schema_object_exists(conn, "index", index_name);
}

fn assert_schema_object_exists(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
