//! Backend drivers.
//!
//! A [`Driver`] binds one backend's rules (quoting, capabilities,
//! expression rewrites, schema dialect) to one physical connection. The
//! per-backend rules live in unit structs implementing [`Backend`]; the
//! driver is generic over them so each backend's rules resolve
//! statically.

mod postgres;
mod sqlite;
mod sqlserver;
mod tuple;

pub use postgres::Postgres;
pub use sqlite::Sqlite;
pub use sqlserver::Sqlserver;

use tracing::{debug, info};

use strata_core::binder::ValueBinder;
use strata_core::error::ExpressionError;
use strata_core::expression::{Expr, ExprKind};
use strata_core::value::SqlValue;

use crate::config::DriverConfig;
use crate::connection::{Connection, ConnectionError, Connector, Params, Row};
use crate::error::DialectError;
use crate::schema::SchemaDialect;

/// Optional SQL features a backend may or may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Common table expressions (`WITH`).
    Cte,
    /// JSON storage and operators.
    Json,
    /// `SAVEPOINT` inside transactions.
    Savepoint,
    /// Window functions (`OVER`).
    WindowFunctions,
    /// `INTERSECT` set operation.
    Intersect,
    /// `INTERSECT ALL` set operation.
    IntersectAll,
    /// `ORDER BY` inside set-operation arms.
    SetOperationOrderBy,
    /// Disabling foreign keys without an enclosing transaction.
    DisableConstraintWithoutTransaction,
    /// Truncating tables referenced by foreign keys.
    TruncateWithConstraints,
}

/// A rewrite applied to one expression node before rendering.
pub type Translator = fn(Expr) -> Result<Expr, ExpressionError>;

/// Per-backend rules: naming, quoting, capabilities, session setup,
/// expression rewrites and the schema dialect.
pub trait Backend {
    /// The schema dialect for this backend.
    type Dialect: SchemaDialect + Default;

    /// The dialect name.
    fn name(&self) -> &'static str;

    /// Opening identifier quote character.
    fn quote_start(&self) -> char {
        '"'
    }

    /// Closing identifier quote character.
    fn quote_end(&self) -> char {
        '"'
    }

    /// Whether `feature` is available, given the server version when it
    /// matters. `None` means the version is not yet known; version-gated
    /// features answer conservatively then.
    fn supports(&self, feature: Feature, version: Option<&str>) -> bool;

    /// Session-setup statements run once right after connecting.
    fn on_connect_sql(&self, config: &DriverConfig) -> Vec<String> {
        let _ = config;
        Vec::new()
    }

    /// Fallback literal quoting, used when the raw handle cannot quote.
    fn schema_value(&self, value: &SqlValue) -> String {
        value.to_sql_inline()
    }

    /// The expression-translator table: one rewrite per node kind,
    /// populated once per backend type.
    fn translators(&self) -> &'static [(ExprKind, Translator)] {
        &[]
    }
}

/// Compares a dotted version string against a minimum major.minor pair.
pub(crate) fn version_at_least(version: &str, major: u32, minor: u32) -> bool {
    let mut parts = version.split('.').map(|p| p.trim().parse::<u32>());
    let got_major = parts.next().and_then(Result::ok).unwrap_or(0);
    let got_minor = parts.next().and_then(Result::ok).unwrap_or(0);
    (got_major, got_minor) >= (major, minor)
}

/// One backend bound to one physical connection.
///
/// The connection is established lazily, exactly once; all calls are
/// sequential and the driver provides no internal locking.
pub struct Driver<B: Backend> {
    backend: B,
    config: DriverConfig,
    connector: Box<dyn Connector>,
    connection: Option<Box<dyn Connection>>,
    version: Option<String>,
}

impl<B: Backend> Driver<B> {
    /// Creates a driver; no connection is opened yet.
    #[must_use]
    pub fn new(backend: B, config: DriverConfig, connector: Box<dyn Connector>) -> Self {
        Self {
            backend,
            config,
            connector,
            connection: None,
            version: None,
        }
    }

    /// The backend rules.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// The connection configuration.
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Whether the physical connection has been established.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// The server version, once connected.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Establishes the physical connection exactly once and runs the
    /// backend's session setup plus the configured init statements.
    /// Calling this again is a no-op, never a double-connect error.
    ///
    /// # Errors
    ///
    /// Returns a [`DialectError::Connection`] when the transport fails.
    pub fn connect(&mut self) -> Result<(), DialectError> {
        if self.connection.is_some() {
            return Ok(());
        }
        info!(
            backend = self.backend.name(),
            database = %self.config.database,
            "connecting"
        );
        let mut connection = self.connector.connect(&self.config)?;
        for sql in self.backend.on_connect_sql(&self.config) {
            connection.execute(&sql, Params::None)?;
        }
        for sql in &self.config.init {
            connection.execute(sql, Params::None)?;
        }
        self.version = Some(connection.version());
        self.connection = Some(connection);
        Ok(())
    }

    /// The live connection, connecting first when needed.
    ///
    /// # Errors
    ///
    /// Returns a [`DialectError::Connection`] when the transport fails.
    pub fn connection_mut(&mut self) -> Result<&mut (dyn Connection + 'static), DialectError> {
        self.connect()?;
        self.connection
            .as_deref_mut()
            .ok_or_else(|| ConnectionError::new("connection unexpectedly absent").into())
    }

    /// Executes `sql` with `params`, connecting first when needed.
    ///
    /// # Errors
    ///
    /// Returns a [`DialectError::Connection`] on statement failure.
    pub fn execute(&mut self, sql: &str, params: Params<'_>) -> Result<Vec<Row>, DialectError> {
        self.connect()?;
        debug!(backend = self.backend.name(), sql, "executing statement");
        let connection = self
            .connection
            .as_deref_mut()
            .ok_or_else(|| ConnectionError::new("connection unexpectedly absent"))?;
        Ok(connection.execute(sql, params)?)
    }

    /// Whether the active backend supports `feature`, consulting the
    /// cached server version for version-gated features.
    #[must_use]
    pub fn supports(&self, feature: Feature) -> bool {
        self.backend.supports(feature, self.version.as_deref())
    }

    /// Quotes an identifier. Dot-qualified names are quoted per part and
    /// `*` passes through unquoted.
    #[must_use]
    pub fn quote_identifier(&self, identifier: &str) -> String {
        let (start, end) = (self.backend.quote_start(), self.backend.quote_end());
        identifier
            .split('.')
            .map(|part| {
                if part == "*" {
                    String::from("*")
                } else {
                    let escaped = part.replace(end, &format!("{end}{end}"));
                    format!("{start}{escaped}{end}")
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quotes a value as a SQL literal: the raw handle's quoting when it
    /// offers one, the backend fallback otherwise.
    #[must_use]
    pub fn schema_value(&self, value: &SqlValue) -> String {
        if let Some(connection) = &self.connection {
            if let Some(quoted) = connection.quote(value) {
                return quoted;
            }
        }
        self.backend.schema_value(value)
    }

    /// Rewrites `expr` bottom-up through the backend's translator table.
    ///
    /// # Errors
    ///
    /// Propagates rewrite errors, e.g. a tuple comparison with an
    /// operator the surrogate form cannot emulate.
    pub fn transform(&self, expr: Expr) -> Result<Expr, ExpressionError> {
        let table = self.backend.translators();
        expr.rewrite(&mut |node| {
            match table.iter().find(|(kind, _)| *kind == node.kind()) {
                Some((_, translator)) => translator(node),
                None => Ok(node),
            }
        })
    }

    /// Rewrites and renders `expr` against `binder` in one step.
    ///
    /// # Errors
    ///
    /// Propagates rewrite and rendering errors.
    pub fn compile(&self, expr: &Expr, binder: &mut ValueBinder) -> Result<String, ExpressionError> {
        let transformed = self.transform(expr.clone())?;
        transformed.sql(binder)
    }

    /// Compiles `expr` with a fresh binder and executes it.
    ///
    /// # Errors
    ///
    /// Propagates compile and execution errors.
    pub fn run(&mut self, expr: &Expr) -> Result<Vec<Row>, DialectError> {
        let mut binder = ValueBinder::new();
        let sql = self.compile(expr, &mut binder)?;
        self.execute(&sql, Params::Named(binder.bindings()))
    }
}
