//! Schema model extracted from parsed DDL.
//!
//! A [`Schema`] is built from CREATE TABLE statements and then kept in step
//! with retained ALTER TABLE and DROP TABLE statements. Each table records
//! its columns in declaration order together with the key and foreign-key
//! constraints, merged from column-level and table-level declarations.
//!
//! Columns carry two names: the physical column `name` used in SQL, and a
//! `property` name used by callers. The record mapper may rename properties
//! with [`TableSchema::map_property`]; generated SQL always uses the
//! physical name.

use serde::Serialize;
use tracing::debug;

use crate::ast::{
    AlterAction, AlterTable, ColumnChange, ColumnDefinition, Constraint, ConstraintKind,
    CreateTable, ReferentialAction, SqlType, Statement, TableElement,
};

/// Metadata of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMeta {
    /// Name callers use to refer to the column.
    pub property: String,
    /// Physical column name.
    pub name: String,
    /// Declared type name as written.
    pub type_name: String,
    /// Resolved type code.
    pub sql_type: SqlType,
    /// Whether NULL is accepted.
    pub nullable: bool,
    /// Part of the primary key.
    pub primary_key: bool,
    /// Declared UNIQUE on its own.
    pub unique: bool,
    /// AUTOINCREMENT / IDENTITY.
    pub auto_increment: bool,
}

impl ColumnMeta {
    fn from_definition(def: &ColumnDefinition) -> Self {
        Self {
            property: def.name.clone(),
            name: def.name.clone(),
            type_name: def.column_type.name.clone(),
            sql_type: def.sql_type(),
            nullable: def.is_nullable(),
            primary_key: def.primary_key,
            unique: def.unique,
            auto_increment: def.auto_increment,
        }
    }
}

/// A UNIQUE key over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UniqueKey {
    /// Constraint name, when declared with `CONSTRAINT name`.
    pub name: Option<String>,
    /// Key columns.
    pub columns: Vec<String>,
}

/// A foreign key with its resolved referential actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: Option<String>,
    /// Referencing columns.
    pub columns: Vec<String>,
    /// Referenced table.
    pub references: String,
    /// Referenced columns; empty means the referenced primary key.
    pub referenced_columns: Vec<String>,
    /// ON DELETE action.
    pub on_delete: ReferentialAction,
    /// ON UPDATE action.
    pub on_update: ReferentialAction,
}

/// One table of the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    /// Table name as declared.
    pub name: String,
    /// Schema qualifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Columns in declaration order.
    pub columns: Vec<ColumnMeta>,
    /// Primary key columns, in key order.
    pub primary_key: Vec<String>,
    /// UNIQUE keys, column-level `UNIQUE` included as unnamed
    /// single-column keys.
    pub unique_keys: Vec<UniqueKey>,
    /// Foreign keys.
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableSchema {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            columns: Vec::new(),
            primary_key: Vec::new(),
            unique_keys: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Builds the table described by a CREATE TABLE statement.
    #[must_use]
    pub fn from_create_table(create: &CreateTable) -> Self {
        let mut table = Self::new(create.name.name.clone());
        table.schema.clone_from(&create.name.schema);
        for element in &create.elements {
            match element {
                TableElement::Column(def) => table.add_column(def),
                TableElement::Constraint(constraint) => table.add_constraint(constraint),
            }
        }
        table
    }

    /// Appends a column. Column-level keys are merged into the table keys.
    pub fn add_column(&mut self, def: &ColumnDefinition) {
        let meta = ColumnMeta::from_definition(def);
        if meta.primary_key && !self.primary_key.iter().any(|c| c.eq_ignore_ascii_case(&meta.name)) {
            self.primary_key.push(meta.name.clone());
        }
        if meta.unique {
            self.add_unique_key(None, std::slice::from_ref(&meta.name));
        }
        self.columns.push(meta);
    }

    /// Merges a table constraint. CHECK constraints carry no schema
    /// metadata and are ignored.
    pub fn add_constraint(&mut self, constraint: &Constraint) {
        match constraint.kind {
            ConstraintKind::Primary | ConstraintKind::PrimaryHash => {
                self.primary_key.clone_from(&constraint.columns);
                for column in &mut self.columns {
                    if constraint
                        .columns
                        .iter()
                        .any(|c| c.eq_ignore_ascii_case(&column.name))
                    {
                        column.primary_key = true;
                        column.nullable = false;
                    }
                }
            }
            ConstraintKind::Unique => {
                if let [single] = constraint.columns.as_slice() {
                    if let Some(column) = self.column_mut(single) {
                        column.unique = true;
                    }
                }
                self.add_unique_key(constraint.name.clone(), &constraint.columns);
            }
            ConstraintKind::Foreign => {
                if let Some(fk) = &constraint.references {
                    self.foreign_keys.push(ForeignKey {
                        name: constraint.name.clone(),
                        columns: constraint.columns.clone(),
                        references: fk.table.name.clone(),
                        referenced_columns: fk.columns.clone(),
                        on_delete: fk.on_delete(),
                        on_update: fk.on_update(),
                    });
                }
            }
            ConstraintKind::Check => {}
        }
    }

    /// Name used in generated SQL, schema-qualified when declared so.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Looks up a column by physical name (ASCII case-insensitive).
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    fn column_mut(&mut self, name: &str) -> Option<&mut ColumnMeta> {
        self.columns
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Looks up a column by property name (ASCII case-insensitive).
    #[must_use]
    pub fn property(&self, property: &str) -> Option<&ColumnMeta> {
        self.columns
            .iter()
            .find(|c| c.property.eq_ignore_ascii_case(property))
    }

    /// Renames the property of a physical column.
    ///
    /// Returns `false` when the column does not exist.
    pub fn map_property(&mut self, column: &str, property: impl Into<String>) -> bool {
        match self.column_mut(column) {
            Some(meta) => {
                meta.property = property.into();
                true
            }
            None => false,
        }
    }

    /// Primary key columns as metadata.
    pub fn primary_key_columns(&self) -> impl Iterator<Item = &ColumnMeta> {
        self.primary_key.iter().filter_map(|name| self.column(name))
    }

    /// Adds a key unless one over the same columns exists. A named key
    /// takes over the name of an unnamed duplicate.
    fn add_unique_key(&mut self, name: Option<String>, columns: &[String]) {
        let same = |key: &UniqueKey| {
            key.columns.len() == columns.len()
                && key
                    .columns
                    .iter()
                    .zip(columns)
                    .all(|(a, b)| a.eq_ignore_ascii_case(b))
        };
        match self.unique_keys.iter_mut().find(|key| same(key)) {
            Some(key) => {
                if key.name.is_none() {
                    key.name = name;
                }
            }
            None => self.unique_keys.push(UniqueKey {
                name,
                columns: columns.to_vec(),
            }),
        }
    }

    fn drop_column(&mut self, name: &str) {
        self.columns.retain(|c| !c.name.eq_ignore_ascii_case(name));
        self.primary_key.retain(|c| !c.eq_ignore_ascii_case(name));
        self.unique_keys
            .retain(|k| !k.columns.iter().any(|c| c.eq_ignore_ascii_case(name)));
        self.foreign_keys
            .retain(|k| !k.columns.iter().any(|c| c.eq_ignore_ascii_case(name)));
    }

    fn rename_column(&mut self, from: &str, to: &str) {
        let rename = |names: &mut Vec<String>| {
            for n in names.iter_mut() {
                if n.eq_ignore_ascii_case(from) {
                    *n = to.to_string();
                }
            }
        };
        rename(&mut self.primary_key);
        for key in &mut self.unique_keys {
            rename(&mut key.columns);
        }
        for key in &mut self.foreign_keys {
            rename(&mut key.columns);
        }
        if let Some(column) = self.column_mut(from) {
            if column.property == column.name {
                column.property = to.to_string();
            }
            column.name = to.to_string();
        }
    }

    fn drop_constraint(&mut self, name: &str) {
        let named = |n: &Option<String>| n.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name));
        self.unique_keys.retain(|k| !named(&k.name));
        self.foreign_keys.retain(|k| !named(&k.name));
    }

    fn drop_primary_key(&mut self) {
        self.primary_key.clear();
        for column in &mut self.columns {
            column.primary_key = false;
        }
    }

    fn alter_column(&mut self, column: &str, change: &ColumnChange) {
        match change {
            ColumnChange::Rename(to) => self.rename_column(column, to),
            ColumnChange::SetNotNull => {
                if let Some(meta) = self.column_mut(column) {
                    meta.nullable = false;
                }
            }
            ColumnChange::DropNotNull | ColumnChange::SetNull => {
                if let Some(meta) = self.column_mut(column) {
                    meta.nullable = !meta.primary_key;
                }
            }
            ColumnChange::Redefine(def) => {
                if let Some(meta) = self.column_mut(column) {
                    let property = meta.property.clone();
                    let in_key = meta.primary_key;
                    *meta = ColumnMeta::from_definition(def);
                    meta.property = property;
                    if in_key {
                        meta.primary_key = true;
                        meta.nullable = false;
                    }
                    if meta.unique {
                        let name = meta.name.clone();
                        self.add_unique_key(None, &[name]);
                    }
                }
            }
            ColumnChange::SetDefault(_) | ColumnChange::DropDefault => {}
        }
    }

    fn apply_alter(&mut self, alter: &AlterTable) {
        match &alter.action {
            AlterAction::AddColumn(def) => self.add_column(def),
            AlterAction::AddConstraint(constraint) => self.add_constraint(constraint),
            AlterAction::AlterColumn { column, change } => self.alter_column(column, change),
            AlterAction::DropColumn(column) => self.drop_column(column),
            AlterAction::DropConstraint(name) => self.drop_constraint(name),
            AlterAction::DropPrimaryKey => self.drop_primary_key(),
            AlterAction::RenameTable(name) => self.name.clone_from(name),
            AlterAction::RenameColumn { from, to } => self.rename_column(from, to),
        }
    }
}

/// All tables known from a batch of statements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    tables: Vec<TableSchema>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replays DDL statements in order. Non-DDL statements are ignored.
    #[must_use]
    pub fn from_statements(statements: &[Statement]) -> Self {
        let mut schema = Self::new();
        for statement in statements {
            schema.apply(statement);
        }
        schema
    }

    /// Applies one statement.
    ///
    /// A repeated CREATE TABLE replaces the earlier definition. ALTER on an
    /// unknown table is skipped.
    pub fn apply(&mut self, statement: &Statement) {
        match statement {
            Statement::CreateTable(create) => {
                let table = TableSchema::from_create_table(create);
                match self.position(&table.name) {
                    Some(i) => self.tables[i] = table,
                    None => self.tables.push(table),
                }
            }
            Statement::AlterTable(alter) => match self.position(&alter.table.name) {
                Some(i) => self.tables[i].apply_alter(alter),
                None => debug!(table = %alter.table, "ALTER TABLE on unknown table skipped"),
            },
            Statement::DropTable(drop) => {
                for name in &drop.names {
                    if let Some(i) = self.position(&name.name) {
                        self.tables.remove(i);
                    }
                }
            }
            _ => {}
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.tables
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Looks up a table (ASCII case-insensitive).
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.position(name).map(|i| &self.tables[i])
    }

    /// Mutable table lookup, for property mapping.
    pub fn table_mut(&mut self, name: &str) -> Option<&mut TableSchema> {
        self.position(name).map(|i| &mut self.tables[i])
    }

    /// Tables in declaration order.
    #[must_use]
    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    /// Number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// True when no table is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn schema(sql: &str) -> Schema {
        let out = Parser::new(sql).parse();
        assert!(out.is_ok(), "{sql}: {:?}", out.errors);
        Schema::from_statements(&out.statements)
    }

    #[test]
    fn test_column_and_table_keys_are_merged() {
        let s = schema(
            "CREATE TABLE person (
                id BIGINT PRIMARY KEY,
                email VARCHAR(200) NOT NULL UNIQUE,
                first TEXT,
                last TEXT,
                UNIQUE (first, last)
            )",
        );
        let t = s.table("PERSON").expect("table");
        assert_eq!(t.primary_key, vec!["id".to_string()]);
        assert!(!t.column("id").expect("id").nullable);
        assert!(t.column("email").expect("email").unique);
        assert!(!t.column("first").expect("first").unique);
        assert_eq!(t.unique_keys.len(), 2);
        assert_eq!(t.unique_keys[0].columns, vec!["email".to_string()]);
        assert_eq!(t.unique_keys[0].name, None);
        assert_eq!(t.unique_keys[1].columns.len(), 2);
        assert_eq!(t.column("Email").expect("email").sql_type, SqlType::VarChar);
    }

    #[test]
    fn test_unique_declared_twice_is_one_key() {
        let s = schema(
            "CREATE TABLE a (code TEXT UNIQUE, CONSTRAINT uq_code UNIQUE (CODE));
             ALTER TABLE a ADD COLUMN tag TEXT UNIQUE",
        );
        let t = s.table("a").expect("a");
        assert_eq!(t.unique_keys.len(), 2);
        assert_eq!(t.unique_keys[0].name.as_deref(), Some("uq_code"));
        assert_eq!(t.unique_keys[1].columns, vec!["tag".to_string()]);
    }

    #[test]
    fn test_table_level_primary_key() {
        let s = schema("CREATE TABLE m (a INT, b INT, PRIMARY KEY (a, b))");
        let t = s.table("m").expect("table");
        assert_eq!(t.primary_key, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(t.primary_key_columns().count(), 2);
        assert!(t.columns.iter().all(|c| c.primary_key && !c.nullable));
    }

    #[test]
    fn test_foreign_key_actions() {
        let s = schema(
            "CREATE TABLE child (pid INT, CONSTRAINT fk_parent FOREIGN KEY (pid) \
             REFERENCES parent(id) ON DELETE CASCADE)",
        );
        let fk = &s.table("child").expect("table").foreign_keys[0];
        assert_eq!(fk.name.as_deref(), Some("fk_parent"));
        assert_eq!(fk.references, "parent");
        assert_eq!(fk.on_delete, ReferentialAction::Cascade);
        assert_eq!(fk.on_update, ReferentialAction::Restrict);
    }

    #[test]
    fn test_alter_and_drop_are_replayed() {
        let s = schema(
            "CREATE TABLE a (id INT PRIMARY KEY, name TEXT);
             CREATE TABLE b (id INT);
             ALTER TABLE a ADD COLUMN age INT;
             ALTER TABLE a RENAME COLUMN name TO full_name;
             ALTER TABLE a ALTER COLUMN age SET NOT NULL;
             DROP TABLE b",
        );
        assert_eq!(s.len(), 1);
        let t = s.table("a").expect("a");
        let names: Vec<&str> = t.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "full_name", "age"]);
        assert_eq!(t.column("full_name").expect("col").property, "full_name");
        assert!(!t.column("age").expect("age").nullable);
    }

    #[test]
    fn test_drop_column_removes_keys() {
        let s = schema(
            "CREATE TABLE a (id INT, code TEXT, CONSTRAINT uq UNIQUE (code));
             ALTER TABLE a DROP COLUMN code",
        );
        let t = s.table("a").expect("a");
        assert!(t.column("code").is_none());
        assert!(t.unique_keys.is_empty());
    }

    #[test]
    fn test_recreate_replaces_table() {
        let s = schema("CREATE TABLE a (x INT); CREATE TABLE A (y INT)");
        assert_eq!(s.len(), 1);
        assert!(s.table("a").expect("a").column("y").is_some());
    }

    #[test]
    fn test_map_property() {
        let mut t = schema("CREATE TABLE a (first_name TEXT)")
            .table("a")
            .cloned()
            .expect("a");
        assert!(t.map_property("FIRST_NAME", "firstName"));
        assert_eq!(t.property("firstname").expect("prop").name, "first_name");
        assert!(!t.map_property("missing", "x"));
    }

    #[test]
    fn test_qualified_name() {
        let s = schema("CREATE TABLE app.users (id INT)");
        assert_eq!(s.table("users").expect("users").qualified_name(), "app.users");
    }
}
