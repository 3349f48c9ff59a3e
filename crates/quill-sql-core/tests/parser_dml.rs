//! Tests for INSERT / REPLACE, UPDATE and DELETE.

mod common;
use common::*;

use quill_sql_core::ast::{ConflictResolution, InsertSource, Statement};

// ===================================================================
// INSERT
// ===================================================================

#[test]
fn insert_values_rows() {
    let i = parse_insert("INSERT INTO users (id, name) VALUES (1, 'a'), (2, 'b')");
    assert_eq!(i.table.name, "users");
    assert_eq!(i.columns, vec!["id", "name"]);
    match &i.source {
        InsertSource::Values(rows) => assert_eq!(rows.len(), 2),
        other => panic!("Expected VALUES, got {other:?}"),
    }
    assert!(!i.replace);
}

#[test]
fn insert_or_action_and_replace() {
    let i = parse_insert("INSERT OR IGNORE INTO t VALUES (1)");
    assert_eq!(i.or_action, Some(ConflictResolution::Ignore));

    let r = parse_insert("REPLACE INTO t (a) VALUES (?)");
    assert!(r.replace);
    assert_eq!(r.or_action, None);
}

#[test]
fn insert_from_select_and_default_values() {
    let i = parse_insert("INSERT INTO archive SELECT * FROM t WHERE done = 1");
    assert!(matches!(i.source, InsertSource::Query(_)));

    let d = parse_insert("INSERT INTO t DEFAULT VALUES");
    assert_eq!(d.source, InsertSource::DefaultValues);
}

#[test]
fn insert_named_parameters() {
    let i = parse_insert("INSERT INTO t (a, b) VALUES (@a:java.lang.String, @b:java.lang.Long)");
    let InsertSource::Values(rows) = &i.source else {
        panic!("Expected VALUES");
    };
    assert_eq!(rows[0][0].to_string(), "@a:java.lang.String");
}

// ===================================================================
// UPDATE
// ===================================================================

#[test]
fn update_assignments_and_where() {
    let u = parse_update("UPDATE users SET name = 'Bob', visits = visits + 1 WHERE id = ?");
    assert_eq!(u.table.name, "users");
    let cols: Vec<&str> = u.assignments.iter().map(|a| a.column.as_str()).collect();
    assert_eq!(cols, vec!["name", "visits"]);
    assert_eq!(u.assignments[1].value.to_string(), "visits + 1");
    assert!(u.where_clause.is_some());
}

#[test]
fn update_or_rollback() {
    let u = parse_update("UPDATE OR ROLLBACK s.t SET a = 1");
    assert_eq!(u.or_action, Some(ConflictResolution::Rollback));
    assert_eq!(u.table.schema.as_deref(), Some("s"));
    assert!(u.where_clause.is_none());
}

// ===================================================================
// DELETE
// ===================================================================

#[test]
fn delete_with_and_without_where() {
    let d = parse_delete("DELETE FROM users WHERE last_login < '2020-01-01'");
    assert_eq!(d.table.name, "users");
    assert!(d.where_clause.is_some());

    let d = parse_delete("DELETE FROM users");
    assert!(d.where_clause.is_none());
}

#[test]
fn mixed_batch_keeps_every_kind() {
    let out = quill_sql_core::parse(
        "CREATE TABLE t (a int); INSERT INTO t VALUES (1); UPDATE t SET a = 2; \
         DELETE FROM t; SELECT * FROM t; ALTER TABLE t ADD b int; DROP TABLE t",
    );
    assert!(out.is_ok(), "{:?}", out.errors);
    let kinds: Vec<&str> = out.statements.iter().map(Statement::kind_name).collect();
    assert_eq!(
        kinds,
        vec!["CREATE TABLE", "INSERT", "UPDATE", "DELETE", "SELECT", "ALTER TABLE", "DROP TABLE"]
    );
}
