//! Parameterized query building.
//!
//! Predicates are composed from [`column`] references and rendered against
//! a [`TableSchema`](crate::schema::TableSchema). Values never appear in the
//! SQL text; they are returned alongside it in placeholder order.
//!
//! # Example
//!
//! ```rust
//! use quill_sql_core::builder::{column, QueryBuilder, SqlValue};
//! use quill_sql_core::schema::Schema;
//! use quill_sql_core::Parser;
//!
//! let out = Parser::new("CREATE TABLE users (id INT PRIMARY KEY, name TEXT)").parse();
//! let schema = Schema::from_statements(&out.statements);
//! let users = schema.table("users").unwrap();
//!
//! let (sql, args) = QueryBuilder::new(users)
//!     .filter(column("name").is_equal_to("alice"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(sql, "SELECT * FROM users WHERE name=?");
//! assert_eq!(args, vec![SqlValue::Text("alice".into())]);
//! ```

mod constraint;
mod error;
mod query;
pub mod value;

pub use constraint::{column, ColumnRef, SqlConstraint};
pub use error::QueryError;
pub use query::QueryBuilder;
pub use value::{SqlValue, ToSqlValue};
