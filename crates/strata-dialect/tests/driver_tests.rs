//! Driver behavior: lazy idempotent connection, session setup,
//! quoting, capability flags and expression compilation.

mod common;

use std::sync::Arc;

use common::{FakeConnector, SharedConnector};
use strata_core::binder::ValueBinder;
use strata_core::expression::{
    BetweenExpr, CaseExpr, Expr, FunctionArg, FunctionExpr, TupleComparison, TupleValue,
    WhenThenExpr,
};
use strata_core::types::ColumnType;
use strata_core::value::SqlValue;
use strata_dialect::{Driver, DriverConfig, Feature, Params, Postgres, Sqlite, Sqlserver};

fn postgres_driver(connector: SharedConnector) -> Driver<Postgres> {
    let config = DriverConfig::new("app")
        .schema("public")
        .encoding("UTF8")
        .init_statement("SET statement_timeout = 5000");
    Driver::new(Postgres::new(), config, Box::new(connector))
}

#[test]
fn test_connect_is_idempotent() {
    let connector = Arc::new(FakeConnector::new().version("16.2"));
    let mut driver = postgres_driver(SharedConnector(Arc::clone(&connector)));

    assert!(!driver.is_connected());
    driver.connect().unwrap();
    driver.connect().unwrap();
    driver.execute("SELECT 1", Params::None).unwrap();

    // One physical connection despite repeated connect calls.
    assert_eq!(connector.connect_count(), 1);
    assert_eq!(driver.version(), Some("16.2"));
}

#[test]
fn test_connect_runs_session_setup_then_init() {
    let connector = Arc::new(FakeConnector::new());
    let mut driver = postgres_driver(SharedConnector(Arc::clone(&connector)));
    driver.connect().unwrap();

    let executed = connector.executed();
    assert_eq!(
        executed,
        vec![
            String::from("SET client_encoding = 'UTF8'"),
            String::from("SET search_path TO public"),
            String::from("SET statement_timeout = 5000"),
        ]
    );
}

#[test]
fn test_execute_auto_connects() {
    let connector = Arc::new(FakeConnector::new());
    let mut driver = postgres_driver(SharedConnector(Arc::clone(&connector)));
    driver.execute("SELECT 1", Params::None).unwrap();
    assert_eq!(connector.connect_count(), 1);
    assert!(driver.is_connected());
}

#[test]
fn test_quote_identifier_handles_qualified_names() {
    let driver = postgres_driver(SharedConnector(Arc::new(FakeConnector::new())));
    assert_eq!(driver.quote_identifier("posts"), "\"posts\"");
    assert_eq!(driver.quote_identifier("app.posts"), "\"app\".\"posts\"");
    assert_eq!(driver.quote_identifier("posts.*"), "\"posts\".*");

    let mssql = Driver::new(
        Sqlserver::new(),
        DriverConfig::new("app"),
        Box::new(SharedConnector(Arc::new(FakeConnector::new()))),
    );
    assert_eq!(mssql.quote_identifier("posts"), "[posts]");
    assert_eq!(mssql.quote_identifier("bad]name"), "[bad]]name]");
}

#[test]
fn test_schema_value_falls_back_to_backend_quoting() {
    let driver = postgres_driver(SharedConnector(Arc::new(FakeConnector::new())));
    assert_eq!(
        driver.schema_value(&SqlValue::Text(String::from("O'Brien"))),
        "'O''Brien'"
    );
    assert_eq!(driver.schema_value(&SqlValue::Bool(true)), "TRUE");
    assert_eq!(driver.schema_value(&SqlValue::Null), "NULL");
}

#[test]
fn test_supports_consults_cached_version() {
    let connector = Arc::new(FakeConnector::new().version("3.38.5"));
    let mut driver = Driver::new(
        Sqlite::new(),
        DriverConfig::new(":memory:"),
        Box::new(SharedConnector(Arc::clone(&connector))),
    );

    // Version unknown before connecting: version-gated features answer
    // conservatively.
    assert!(!driver.supports(Feature::Json));
    assert!(driver.supports(Feature::Cte));

    driver.connect().unwrap();
    assert!(driver.supports(Feature::Json));
    assert!(driver.supports(Feature::WindowFunctions));
    assert!(!driver.supports(Feature::IntersectAll));
}

#[test]
fn test_postgres_concat_compiles_to_infix() {
    let driver = postgres_driver(SharedConnector(Arc::new(FakeConnector::new())));
    let expr = Expr::Function(FunctionExpr::new(
        "CONCAT",
        vec![
            FunctionArg::Identifier(String::from("a")),
            FunctionArg::Literal(String::from("' '")),
            FunctionArg::Identifier(String::from("b")),
        ],
    ));

    let mut binder = ValueBinder::new();
    let sql = driver.compile(&expr, &mut binder).unwrap();
    assert_eq!(sql, "a || ' ' || b");
    // Literal and identifier arguments bind nothing.
    assert!(binder.is_empty());
}

#[test]
fn test_postgres_renders_tuples_natively() {
    let driver = postgres_driver(SharedConnector(Arc::new(FakeConnector::new())));
    let expr = Expr::Tuple(TupleComparison::new(
        vec![Expr::field("a"), Expr::field("b")],
        "IN",
        TupleValue::List(vec![
            vec![SqlValue::Int(1), SqlValue::Int(2)],
            vec![SqlValue::Int(3), SqlValue::Int(4)],
        ]),
    ));

    let mut binder = ValueBinder::new();
    let sql = driver.compile(&expr, &mut binder).unwrap();
    assert_eq!(
        sql,
        "(a, b) IN ((:tuple0, :tuple1), (:tuple2, :tuple3))"
    );
    assert_eq!(binder.bindings().len(), 4);
}

#[test]
fn test_sqlite_rewrites_tuples_to_surrogate() {
    let driver = Driver::new(
        Sqlite::new(),
        DriverConfig::new(":memory:"),
        Box::new(SharedConnector(Arc::new(FakeConnector::new()))),
    );
    let expr = Expr::Tuple(TupleComparison::new(
        vec![Expr::field("a"), Expr::field("b")],
        "IN",
        TupleValue::List(vec![
            vec![SqlValue::Int(1), SqlValue::Int(2)],
            vec![SqlValue::Int(3), SqlValue::Int(4)],
        ]),
    ));

    let mut binder = ValueBinder::new();
    let sql = driver.compile(&expr, &mut binder).unwrap();
    assert_eq!(
        sql,
        "1 = (SELECT 1 WHERE ((a = :c0 AND b = :c1) OR (a = :c2 AND b = :c3)))"
    );
}

#[test]
fn test_sqlserver_rejects_unsupported_tuple_operator() {
    let driver = Driver::new(
        Sqlserver::new(),
        DriverConfig::new("app"),
        Box::new(SharedConnector(Arc::new(FakeConnector::new()))),
    );
    let expr = Expr::Tuple(TupleComparison::new(
        vec![Expr::field("a"), Expr::field("b")],
        ">",
        TupleValue::Single(vec![SqlValue::Int(1), SqlValue::Int(2)]),
    ));

    let mut binder = ValueBinder::new();
    assert!(driver.compile(&expr, &mut binder).is_err());
}

#[test]
fn test_between_binds_exactly_two_placeholders() {
    let driver = postgres_driver(SharedConnector(Arc::new(FakeConnector::new())));
    let expr = Expr::Between(
        BetweenExpr::new(Expr::field("posted"), SqlValue::Int(5), SqlValue::Int(10))
            .typed(ColumnType::Integer),
    );

    let mut binder = ValueBinder::new();
    let sql = driver.compile(&expr, &mut binder).unwrap();
    assert_eq!(sql, "posted BETWEEN :c0 AND :c1");
    assert_eq!(binder.bindings().len(), 2);
}

#[test]
fn test_translators_reach_nested_expressions() {
    // A CONCAT inside a CASE arm is rewritten too: the rewrite pass
    // rebuilds the whole tree bottom-up.
    let driver = postgres_driver(SharedConnector(Arc::new(FakeConnector::new())));
    let concat = Expr::Function(FunctionExpr::new(
        "CONCAT",
        vec![
            FunctionArg::Identifier(String::from("first")),
            FunctionArg::Identifier(String::from("last")),
        ],
    ));
    let case = Expr::Case(
        CaseExpr::new()
            .when_then(
                WhenThenExpr::new()
                    .when(SqlValue::Bool(true), None)
                    .unwrap()
                    .then(concat, None),
            )
            .else_result(SqlValue::Null),
    );

    let mut binder = ValueBinder::new();
    let sql = driver.compile(&case, &mut binder).unwrap();
    assert_eq!(sql, "CASE WHEN :c0 THEN first || last ELSE :c1 END");
}

#[test]
fn test_run_passes_ordered_bindings() {
    let connector = Arc::new(FakeConnector::new());
    let mut driver = postgres_driver(SharedConnector(Arc::clone(&connector)));
    let expr = Expr::Between(
        BetweenExpr::new(Expr::field("posted"), SqlValue::Int(1), SqlValue::Int(9))
            .typed(ColumnType::Integer),
    );

    driver.run(&expr).unwrap();
    let executed = connector.executed();
    assert_eq!(
        executed.last().map(String::as_str),
        Some("posted BETWEEN :c0 AND :c1")
    );
}
