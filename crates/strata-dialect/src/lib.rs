//! # strata-dialect
//!
//! Backend drivers and schema dialects for the strata database layer.
//!
//! This crate provides:
//! - The [`Connection`](connection::Connection) statement-execution
//!   interface the core consumes but does not implement
//! - A [`Driver`](driver::Driver) generic over per-backend
//!   [`Backend`](driver::Backend) rules: quoting, capability flags,
//!   session setup and the expression-translator tables
//! - Three [`SchemaDialect`](schema::SchemaDialect) implementations
//!   (PostgreSQL, SQLite, SQL Server) translating catalog metadata into
//!   the canonical schema model and back into dialect-correct DDL
//! - [`SchemaCollection`](collection::SchemaCollection) describe
//!   orchestration with an optional external-cache decorator
//!
//! The physical transport is an external collaborator: a driver is
//! handed a [`Connector`](connection::Connector) and establishes its
//! connection lazily, exactly once.

pub mod collection;
pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
pub mod schema;

pub use collection::{CachedCollection, SchemaCache, SchemaCollection};
pub use config::{DriverConfig, SslMode};
pub use connection::{Connection, ConnectionError, Connector, Params, Row};
pub use driver::{Backend, Driver, Feature, Postgres, Sqlite, Sqlserver, Translator};
pub use error::DialectError;
pub use schema::{
    PostgresSchemaDialect, SchemaDialect, SqliteSchemaDialect, SqlserverSchemaDialect, TableName,
};
