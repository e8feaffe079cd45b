//! Shared fixture: an in-memory SQLite database seeded with users, groups
//! and memberships, plus helpers to run compiled predicates against it.

#![allow(dead_code)]

use filterql::{apply_criteria_filter, QueryCriteria, Scope};
use rusqlite::types::Value as SqlValue;
use rusqlite::Connection;
use serde_json::Value;

pub const ALLOWED: &[&str] = &[
    "id",
    "userName",
    "externalId",
    "active",
    "createdAt",
    "updatedAt",
    "displayName",
];

const SCHEMA: &str = r#"
CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL,
    external_id TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    data TEXT NOT NULL DEFAULT '{}'
);

CREATE TABLE groups (
    id INTEGER PRIMARY KEY,
    display_name TEXT NOT NULL,
    external_id TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    data TEXT NOT NULL DEFAULT '{}'
);

CREATE TABLE group_memberships (
    group_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    PRIMARY KEY (group_id, user_id)
);

INSERT INTO users (id, username, external_id, active, created_at, updated_at, data) VALUES
    (1, 'alice', 'ext-1', 1, '2024-01-01T00:00:00Z', '2024-06-01T00:00:00Z',
     '{"name":{"givenName":"Alice","familyName":"Smith"},"age":34,"tags":["admin","ops"]}'),
    (2, 'bob', NULL, 1, '2024-02-01T00:00:00Z', '2024-06-01T00:00:00Z',
     '{"name":{"givenName":"Bob"},"age":28,"tags":["dev"]}'),
    (3, 'carol', 'ext-3', 0, '2024-03-01T00:00:00Z', '2024-06-01T00:00:00Z',
     '{"name":{"givenName":"Carol"},"age":41,"tags":["admin","dev","ops"]}'),
    (4, 'dave', NULL, 1, '2024-04-01T00:00:00Z', '2024-06-01T00:00:00Z',
     '{"age":19,"tags":[]}');

INSERT INTO groups (id, display_name, external_id, created_at, updated_at) VALUES
    (10, 'engineering', 'grp-10', '2024-01-01T00:00:00Z', '2024-06-01T00:00:00Z'),
    (11, 'operations', NULL, '2024-01-01T00:00:00Z', '2024-06-01T00:00:00Z'),
    (12, 'archive', NULL, '2024-01-01T00:00:00Z', '2024-06-01T00:00:00Z'),
    (13, 'everyone', NULL, '2024-01-01T00:00:00Z', '2024-06-01T00:00:00Z');

INSERT INTO group_memberships (group_id, user_id) VALUES
    (10, 1), (10, 2),
    (11, 1), (11, 3),
    (13, 1), (13, 2), (13, 3), (13, 4);
"#;

pub fn open_fixture() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory database");
    conn.execute_batch(SCHEMA).expect("create fixture schema");
    conn
}

/// Compile a filter against the standard allow-list.
pub fn compile(filter: Value) -> Scope {
    let mut scope = Scope::new();
    apply_criteria_filter(
        &mut scope,
        ALLOWED,
        &QueryCriteria::with_filter(filter),
        None,
    )
    .expect("compile filter");
    scope
}

pub fn to_sql_params(params: &[Value]) -> Vec<SqlValue> {
    params
        .iter()
        .map(|value| match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Integer(*b as i64),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::Integer(i)
                } else {
                    SqlValue::Real(n.as_f64().expect("numeric parameter"))
                }
            }
            Value::String(s) => SqlValue::Text(s.clone()),
            other => SqlValue::Text(other.to_string()),
        })
        .collect()
}

/// Execute `SELECT id FROM <table> WHERE <predicate> ORDER BY id` and return
/// the matching ids.
pub fn select_ids(conn: &Connection, table: &str, scope: &Scope) -> Vec<i64> {
    let (predicate, params) = scope.build().expect("non-empty predicate");
    let sql = format!("SELECT id FROM {} WHERE {} ORDER BY id", table, predicate);
    let mut stmt = conn.prepare(&sql).expect("prepare query");
    let rows = stmt
        .query_map(rusqlite::params_from_iter(to_sql_params(&params)), |row| {
            row.get::<_, i64>(0)
        })
        .expect("execute query");
    rows.collect::<Result<Vec<_>, _>>().expect("collect ids")
}

pub fn user_ids(conn: &Connection, scope: &Scope) -> Vec<i64> {
    select_ids(conn, "users", scope)
}

pub fn group_ids(conn: &Connection, scope: &Scope) -> Vec<i64> {
    select_ids(conn, "groups", scope)
}
