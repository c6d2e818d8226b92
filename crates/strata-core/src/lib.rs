//! # strata-core
//!
//! Backend-independent building blocks for the strata database layer.
//!
//! This crate provides:
//! - A composable, typed SQL expression tree that binds parameters safely
//! - A value binder allocating collision-free placeholders per statement
//! - The canonical column type system shared by every backend dialect
//! - The canonical schema model (tables, columns, constraints, indexes)
//!
//! ## Expression Rendering
//!
//! Expressions render against a per-statement [`ValueBinder`]; literal
//! values never end up in the SQL text:
//!
//! ```rust
//! use strata_core::binder::ValueBinder;
//! use strata_core::expression::{BetweenExpr, Expr};
//! use strata_core::types::ColumnType;
//! use strata_core::value::SqlValue;
//!
//! let mut binder = ValueBinder::new();
//! let between = BetweenExpr::new(Expr::field("posted"), SqlValue::Int(5), SqlValue::Int(10))
//!     .typed(ColumnType::Integer);
//!
//! assert_eq!(between.sql(&mut binder).unwrap(), "posted BETWEEN :c0 AND :c1");
//! assert_eq!(binder.bindings().len(), 2);
//! ```
//!
//! ## Schema Model
//!
//! A [`TableSchema`](schema::TableSchema) is populated incrementally —
//! by a dialect folding catalog rows, or by a caller defining a new
//! table — and consumed once when DDL is generated:
//!
//! ```rust
//! use strata_core::schema::{biginteger, string, ConstraintDefinition, TableSchema};
//!
//! let mut schema = TableSchema::new("users");
//! schema.add_column(biginteger("id").not_null()).unwrap();
//! schema.add_column(string("email", 255).not_null()).unwrap();
//! schema
//!     .add_constraint(ConstraintDefinition::primary("primary", vec!["id".into()]))
//!     .unwrap();
//! assert!(schema.is_single_integer_primary("id"));
//! ```

pub mod binder;
pub mod error;
pub mod expression;
pub mod query;
pub mod schema;
pub mod types;
pub mod value;

pub use binder::{Binding, ValueBinder};
pub use error::ExpressionError;
pub use expression::{Expr, ExprKind};
pub use query::SelectQuery;
pub use schema::TableSchema;
pub use types::ColumnType;
pub use value::{SqlValue, ToSqlValue};
