//! Tests for schema extraction and the parameterized query builder.

use std::cell::RefCell;

use quill_sql_core::builder::{column, QueryBuilder, QueryError, SqlConstraint, SqlValue};
use quill_sql_core::schema::Schema;
use quill_sql_core::{ExecError, Executor, Row};

fn schema(sql: &str) -> Schema {
    let out = quill_sql_core::parse(sql);
    assert!(out.is_ok(), "{:?}", out.errors);
    Schema::from_statements(&out.statements)
}

/// Records every call and answers with canned rows.
struct FakeExecutor {
    rows: Vec<Row>,
    calls: RefCell<Vec<(String, Vec<SqlValue>)>>,
}

impl FakeExecutor {
    fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl Executor for FakeExecutor {
    fn execute(&self, sql: &str, args: &[SqlValue]) -> Result<Vec<Row>, ExecError> {
        self.calls.borrow_mut().push((sql.to_string(), args.to_vec()));
        Ok(self.rows.clone())
    }
}

#[test]
fn equality_renders_placeholder() {
    let s = schema("CREATE TABLE t (col int)");
    let t = s.table("t").unwrap();

    let c = SqlConstraint::is_equal_to("col", 5);
    let (sql, args) = c.to_sql(t).unwrap();
    assert_eq!(sql, "col=?");
    assert_eq!(args, vec![SqlValue::Int(5)]);

    let (sql, args) = QueryBuilder::new(t).filter(c).build().unwrap();
    assert_eq!(sql, "SELECT * FROM t WHERE col=?");
    assert_eq!(args, vec![SqlValue::Int(5)]);
}

#[test]
fn renamed_property_uses_physical_column() {
    let mut s = schema("CREATE TABLE person (id int PRIMARY KEY, first_name varchar(40))");
    s.table_mut("person").unwrap().map_property("first_name", "firstName");
    let t = s.table("person").unwrap();

    let (sql, args) = QueryBuilder::new(t)
        .filter(column("firstName").is_in(vec!["ann", "bob"]))
        .build()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM person WHERE first_name IN (?, ?)");
    assert_eq!(args.len(), 2);
}

#[test]
fn arguments_follow_predicate_order() {
    let s = schema("CREATE TABLE t (a int, b text, c int)");
    let (sql, args) = QueryBuilder::new(s.table("t").unwrap())
        .filter(column("c").is_equal_to(3))
        .filter(column("b").is_like("x%"))
        .filter(column("a").is_in(vec![1, 2]))
        .build()
        .unwrap();
    assert_eq!(sql, "SELECT * FROM t WHERE c=? AND b LIKE ? AND a IN (?, ?)");
    assert_eq!(
        args,
        vec![
            SqlValue::Int(3),
            SqlValue::Text("x%".into()),
            SqlValue::Int(1),
            SqlValue::Int(2)
        ]
    );
}

#[test]
fn unknown_property_is_reported() {
    let s = schema("CREATE TABLE t (a int)");
    let err = QueryBuilder::new(s.table("t").unwrap())
        .filter(column("zzz").is_equal_to(1))
        .build()
        .unwrap_err();
    assert_eq!(err.to_string(), "unknown column `zzz` in table `t`");
}

#[test]
fn iteration_runs_through_executor_each_time() {
    let s = schema("CREATE TABLE t (a int)");
    let rows = vec![
        Row::new().with("a", SqlValue::Int(1)),
        Row::new().with("a", SqlValue::Int(2)),
    ];
    let exec = FakeExecutor::new(rows);
    let q = QueryBuilder::new(s.table("t").unwrap()).filter(column("a").is_not_equal_to(0));

    let values: Vec<SqlValue> = q
        .iter(&exec)
        .unwrap()
        .filter_map(|r| r.get("a").cloned())
        .collect();
    assert_eq!(values, vec![SqlValue::Int(1), SqlValue::Int(2)]);
    let _ = q.iter(&exec).unwrap();

    let calls = exec.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, "SELECT * FROM t WHERE a<>?");
    assert_eq!(calls[0].1, vec![SqlValue::Int(0)]);
}

#[test]
fn exists_uses_count_query() {
    let s = schema("CREATE TABLE t (a int)");
    let exec = FakeExecutor::new(vec![Row::new().with("COUNT(*)", SqlValue::Int(0))]);
    let q = QueryBuilder::new(s.table("t").unwrap()).filter(column("a").is_equal_to(9));
    assert!(!q.exists(&exec).unwrap());
    assert_eq!(exec.calls.borrow()[0].0, "SELECT COUNT(*) FROM t WHERE a=?");
}

#[test]
fn executor_failure_is_wrapped() {
    struct Down;
    impl Executor for Down {
        fn execute(&self, _: &str, _: &[SqlValue]) -> Result<Vec<Row>, ExecError> {
            Err(ExecError::new("connection refused"))
        }
    }
    let s = schema("CREATE TABLE t (a int)");
    let err = QueryBuilder::new(s.table("t").unwrap()).count(&Down).unwrap_err();
    assert!(matches!(err, QueryError::Execution(_)));
    assert_eq!(err.to_string(), "execution failed: connection refused");
}

#[test]
fn schema_serializes_to_json() {
    let s = schema(
        "CREATE TABLE a (id int PRIMARY KEY); \
         CREATE TABLE b (a_id int, FOREIGN KEY (a_id) REFERENCES a(id) ON UPDATE SET DEFAULT)",
    );
    let json = serde_json::to_value(&s).unwrap();
    assert_eq!(json["tables"][0]["primary_key"][0], "id");
    assert_eq!(json["tables"][1]["foreign_keys"][0]["on_update"], "SET_DEFAULT");
    assert_eq!(json["tables"][1]["foreign_keys"][0]["on_delete"], "RESTRICT");
    assert_eq!(json["tables"][0]["columns"][0]["sql_type"], "INTEGER");
}
