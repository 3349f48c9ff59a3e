//! Tests for CREATE TABLE parsing: columns, types, modifiers and table
//! constraints.

mod common;
use common::*;

use quill_sql_core::ast::{ConstraintKind, ReferentialAction, Sequence, SqlType, TableElement};

// ===================================================================
// Columns
// ===================================================================

#[test]
fn create_simple_table() {
    let t = parse_create("CREATE TABLE contacts (id int, name varchar(50), born date)");
    assert_eq!(t.name.name, "contacts");
    let names: Vec<&str> = t.columns().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "born"]);
    assert_eq!(t.column("NAME").unwrap().column_type.length, Some(50));
}

#[test]
fn create_keyword_case_does_not_matter() {
    for sql in [
        "create table t (id int)",
        "CREATE TABLE t (id INT)",
        "CreAte TaBle t (id Int)",
    ] {
        let t = parse_create(sql);
        assert_eq!(t.name.name, "t");
        assert_eq!(t.column("id").unwrap().sql_type(), SqlType::Integer);
    }
}

#[test]
fn create_temp_if_not_exists_qualified() {
    let t = parse_create("CREATE TEMP TABLE IF NOT EXISTS app.users (id int) WITHOUT ROWID");
    assert!(t.temporary);
    assert!(t.if_not_exists);
    assert!(t.without_rowid);
    assert_eq!(t.name.schema.as_deref(), Some("app"));
    assert_eq!(t.name.to_string(), "app.users");
}

#[test]
fn create_type_codes() {
    let t = parse_create(
        "CREATE TABLE t (a bigint, b double precision, c decimal(10, 2), \
         d character varying(20), e text, f boolean, g blob, h strange)",
    );
    let codes: Vec<i32> = t.columns().map(|c| c.sql_type().code()).collect();
    assert_eq!(codes, vec![-5, 8, 3, 12, 2005, 16, 2004, 1111]);
    let c = t.column("c").unwrap();
    assert_eq!((c.column_type.length, c.column_type.scale), (Some(10), Some(2)));
    assert_eq!(t.column("b").unwrap().column_type.name, "double precision");
}

#[test]
fn create_column_modifiers_in_order() {
    let t = parse_create(
        "CREATE TABLE t (
            id BIGINT NOT NULL IDENTITY(100, 5) UNIQUE PRIMARY KEY HASH,
            status VARCHAR(10) DEFAULT 'new' NULL CHECK (status <> ''),
            n INT AUTO_INCREMENT
        )",
    );
    let id = t.column("id").unwrap();
    assert!(id.not_null);
    assert!(id.auto_increment);
    assert_eq!(id.sequence, Some(Sequence { start: 100, increment: 5 }));
    assert!(id.unique);
    assert!(id.primary_key && id.primary_key_hash);

    let status = t.column("status").unwrap();
    assert!(status.null && !status.not_null);
    assert_eq!(status.default.as_ref().unwrap().to_string(), "'new'");
    assert!(status.check.is_some());

    let n = t.column("n").unwrap();
    assert!(n.auto_increment);
    assert_eq!(n.sequence, None);
}

#[test]
fn create_neither_null_flag_is_default() {
    let t = parse_create("CREATE TABLE t (a int)");
    let a = t.column("a").unwrap();
    assert!(!a.null && !a.not_null);
    assert!(a.is_nullable());
}

#[test]
fn create_serial_implies_identity() {
    let t = parse_create("CREATE TABLE t (id serial)");
    assert!(t.column("id").unwrap().auto_increment);
}

#[test]
fn create_out_of_order_modifier_is_error() {
    let err = parse_err("CREATE TABLE t (id int PRIMARY KEY NOT NULL)");
    assert_eq!(err.found.as_deref(), Some("NOT"));
    assert_eq!(err.expected.as_deref(), Some("')'"));
}

#[test]
fn create_non_reserved_keyword_column_names() {
    let t = parse_create("CREATE TABLE t (key int, action text, first int, hash int)");
    assert_eq!(t.columns().count(), 4);
    assert!(t.column("key").is_some());
}

// ===================================================================
// Table constraints
// ===================================================================

#[test]
fn create_foreign_key_actions_are_independent() {
    let t = parse_create(
        "CREATE TABLE c (a int, b int, \
         FOREIGN KEY (a,b) REFERENCES t(x,y) ON DELETE CASCADE ON UPDATE SET NULL)",
    );
    let fk = t.constraints().next().unwrap();
    assert_eq!(fk.kind, ConstraintKind::Foreign);
    assert_eq!(fk.columns, vec!["a", "b"]);
    let r = fk.references.as_ref().unwrap();
    assert_eq!(r.table.name, "t");
    assert_eq!(r.columns, vec!["x", "y"]);
    assert_eq!(r.on_delete(), ReferentialAction::Cascade);
    assert_eq!(r.on_update(), ReferentialAction::SetNull);
}

#[test]
fn create_foreign_key_repeated_on_overwrites() {
    let t = parse_create(
        "CREATE TABLE c (a int, FOREIGN KEY (a) REFERENCES t \
         ON DELETE CASCADE ON DELETE NO ACTION)",
    );
    let r = t.constraints().next().unwrap().references.clone().unwrap();
    assert!(r.columns.is_empty());
    assert_eq!(r.on_delete(), ReferentialAction::NoAction);
    assert_eq!(r.on_update, None);
    assert_eq!(r.on_update(), ReferentialAction::Restrict);
}

#[test]
fn create_named_constraints_keep_order() {
    let t = parse_create(
        "CREATE TABLE t (a int, b int, \
         CONSTRAINT pk PRIMARY KEY (a), \
         UNIQUE (b), \
         CHECK (a > 0), \
         PRIMARY KEY HASH (b))",
    );
    let kinds: Vec<ConstraintKind> = t.constraints().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ConstraintKind::Primary,
            ConstraintKind::Unique,
            ConstraintKind::Check,
            ConstraintKind::PrimaryHash
        ]
    );
    assert_eq!(t.constraints().next().unwrap().name.as_deref(), Some("pk"));
    assert!(matches!(t.elements[0], TableElement::Column(_)));
    assert!(matches!(t.elements[2], TableElement::Constraint(_)));
}

// ===================================================================
// Batches
// ===================================================================

#[test]
fn create_batch_of_two() {
    let out = quill_sql_core::parse("CREATE TABLE a(id int); CREATE TABLE b(id int)");
    assert!(out.errors.is_empty());
    let names: Vec<String> = out.create_tables().map(|t| t.name.name.clone()).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn create_batch_isolates_errors() {
    let out = quill_sql_core::parse(
        "CREATE TABLE a(id int);\n\
         CREATE TABLE broken(id int,,);\n\
         CREATE TABLE c(id int)",
    );
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].line, 2);
    assert_eq!(out.create_tables().count(), 2);
    assert_eq!(out.recovered.len(), 1);
}
