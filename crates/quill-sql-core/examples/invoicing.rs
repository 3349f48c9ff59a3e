//! Invoicing schema walkthrough
//!
//! Parses the DDL of a small multi-tenant invoicing system, prints the
//! extracted schema and runs a few filtered queries against an in-memory
//! executor that logs what it receives.
//!
//! Run with: cargo run --example invoicing

use quill_sql_core::builder::{column, QueryBuilder, SqlValue};
use quill_sql_core::{ExecError, Executor, Parser, Row, Schema};

const DDL: &str = "
CREATE TABLE companies (
    id INTEGER AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(200) NOT NULL,
    tax_id VARCHAR(50),
    default_currency CHAR(3) DEFAULT 'EUR' NOT NULL
);

CREATE TABLE clients (
    id INTEGER AUTO_INCREMENT PRIMARY KEY,
    company_id INTEGER NOT NULL,
    name VARCHAR(200) NOT NULL,
    email VARCHAR(200),
    CONSTRAINT fk_client_company FOREIGN KEY (company_id)
        REFERENCES companies (id) ON DELETE CASCADE
);

CREATE TABLE invoices (
    id INTEGER AUTO_INCREMENT PRIMARY KEY,
    company_id INTEGER NOT NULL,
    client_id INTEGER NOT NULL,
    number VARCHAR(30) NOT NULL,
    status VARCHAR(10) DEFAULT 'draft' NOT NULL,
    total DECIMAL(12, 2) NOT NULL,
    UNIQUE (company_id, number),
    FOREIGN KEY (company_id) REFERENCES companies (id),
    FOREIGN KEY (client_id) REFERENCES clients (id)
        ON DELETE RESTRICT ON UPDATE CASCADE
);

ALTER TABLE invoices ADD COLUMN due_date DATE;
";

/// Answers every query with two invoice rows.
struct InMemory;

impl Executor for InMemory {
    fn execute(&self, sql: &str, args: &[SqlValue]) -> Result<Vec<Row>, ExecError> {
        println!("  -> {sql}");
        println!("     args: {args:?}");
        if sql.starts_with("SELECT COUNT(*)") {
            return Ok(vec![Row::new().with("count", SqlValue::Int(2))]);
        }
        Ok(vec![
            Row::new()
                .with("id", SqlValue::Int(1))
                .with("number", SqlValue::Text("INV-0001".into())),
            Row::new()
                .with("id", SqlValue::Int(2))
                .with("number", SqlValue::Text("INV-0002".into())),
        ])
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out = Parser::new(DDL).parse();
    for error in &out.errors {
        eprintln!("error: {error}");
    }

    let mut schema = Schema::from_statements(&out.statements);

    println!("=== Tables ===");
    for table in schema.tables() {
        println!("{} ({} columns)", table.name, table.columns.len());
        for fk in &table.foreign_keys {
            println!(
                "  {} -> {}({}) on delete {} on update {}",
                fk.columns.join(", "),
                fk.references,
                fk.referenced_columns.join(", "),
                fk.on_delete,
                fk.on_update
            );
        }
    }

    if let Some(invoices) = schema.table_mut("invoices") {
        invoices.map_property("due_date", "dueDate");
    }
    let invoices = schema
        .table("invoices")
        .ok_or("invoices table missing")?;

    println!();
    println!("=== Open invoices of company 1 ===");
    let open = QueryBuilder::new(invoices)
        .filter(column("company_id").is_equal_to(1))
        .filter(column("status").is_in(vec!["sent", "overdue"]));
    for row in open.iter(&InMemory)? {
        println!("  {:?}", row.get("number"));
    }

    println!();
    println!("=== Undated invoices ===");
    let undated = QueryBuilder::new(invoices).filter(column("dueDate").is_equal_to(None::<String>));
    println!("  count = {}", undated.count(&InMemory)?);

    println!();
    println!("=== Number lookup ===");
    let (sql, args) = QueryBuilder::new(invoices)
        .filter(column("number").is_like("INV-00%"))
        .build()?;
    println!("  {sql}");
    println!("  {args:?}");

    Ok(())
}
