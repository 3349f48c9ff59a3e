#![allow(dead_code)]

use quill_sql_core::ast::{
    CreateTable, DeleteStatement, InsertStatement, SelectStatement, Statement, UpdateStatement,
};
use quill_sql_core::{ParseError, Parser};

/// Parses a single statement that must be well formed.
pub fn parse(sql: &str) -> Statement {
    let out = Parser::new(sql).parse();
    assert!(out.is_ok(), "Failed to parse: {sql}\nErrors: {:?}", out.errors);
    assert_eq!(out.statements.len(), 1, "Expected one statement: {sql}");
    out.statements.into_iter().next().unwrap()
}

/// Parses input that must report exactly one error and returns it.
pub fn parse_err(sql: &str) -> ParseError {
    let out = Parser::new(sql).parse();
    assert_eq!(out.errors.len(), 1, "Expected one error for: {sql}\nGot: {:?}", out.errors);
    out.errors.into_iter().next().unwrap()
}

pub fn parse_create(sql: &str) -> CreateTable {
    match parse(sql) {
        Statement::CreateTable(c) => c,
        other => panic!("Expected CREATE TABLE, got {other:?}"),
    }
}

pub fn parse_select(sql: &str) -> SelectStatement {
    match parse(sql) {
        Statement::Select(s) => s,
        other => panic!("Expected SELECT, got {other:?}"),
    }
}

pub fn parse_insert(sql: &str) -> InsertStatement {
    match parse(sql) {
        Statement::Insert(i) => i,
        other => panic!("Expected INSERT, got {other:?}"),
    }
}

pub fn parse_update(sql: &str) -> UpdateStatement {
    match parse(sql) {
        Statement::Update(u) => u,
        other => panic!("Expected UPDATE, got {other:?}"),
    }
}

pub fn parse_delete(sql: &str) -> DeleteStatement {
    match parse(sql) {
        Statement::Delete(d) => d,
        other => panic!("Expected DELETE, got {other:?}"),
    }
}

/// Verifies that `to_string()` of a SELECT is a fixed point.
pub fn round_trip(sql: &str) {
    let rendered1 = parse_select(sql).to_string();
    let rendered2 = parse_select(&rendered1).to_string();
    assert_eq!(
        rendered1, rendered2,
        "Round-trip failed.\n  Input:    {sql}\n  First:    {rendered1}\n  Second:   {rendered2}"
    );
}
