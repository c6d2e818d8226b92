//! The statement-execution interface.
//!
//! The dialect layer never talks to a network socket itself: a
//! [`Connection`] is implemented by an external transport crate (or a
//! test double) and handed to a [`Driver`](crate::driver::Driver)
//! through a [`Connector`]. This keeps the core driver-agnostic, the
//! same way the schema model stays backend-agnostic.

use std::collections::HashMap;

use strata_core::binder::Binding;
use strata_core::value::SqlValue;

/// A transport-level failure reported by a [`Connection`].
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ConnectionError {
    message: String,
    /// The statement being executed when the failure happened, if any.
    pub sql: Option<String>,
}

impl ConnectionError {
    /// Creates an error with a bare message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sql: None,
        }
    }

    /// Attaches the statement that was being executed.
    #[must_use]
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }
}

/// Parameters accompanying one statement.
#[derive(Debug, Clone, Copy)]
pub enum Params<'a> {
    /// No parameters.
    None,
    /// Ordered positional values matching `?` markers.
    Positional(&'a [SqlValue]),
    /// Named bindings produced by a
    /// [`ValueBinder`](strata_core::binder::ValueBinder).
    Named(&'a [Binding]),
}

/// One fetched row: column name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: HashMap<String, SqlValue>,
}

impl Row {
    /// Builds a row from (name, value) pairs.
    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (&'static str, SqlValue)>) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (String::from(k), v))
                .collect(),
        }
    }

    /// Inserts a value.
    pub fn insert(&mut self, name: impl Into<String>, value: SqlValue) {
        self.values.insert(name.into(), value);
    }

    /// The raw value of `field`, if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.values.get(field)
    }

    /// The text value of `field`. Non-text values yield `None`.
    #[must_use]
    pub fn str_of(&self, field: &str) -> Option<&str> {
        match self.values.get(field) {
            Some(SqlValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// The integer value of `field`, accepting numeric text since
    /// catalog queries frequently return numbers as strings.
    #[must_use]
    pub fn int_of(&self, field: &str) -> Option<i64> {
        match self.values.get(field) {
            Some(SqlValue::Int(n)) => Some(*n),
            Some(SqlValue::Text(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// The boolean value of `field`, accepting the textual and numeric
    /// spellings different catalogs use.
    #[must_use]
    pub fn bool_of(&self, field: &str) -> Option<bool> {
        match self.values.get(field) {
            Some(SqlValue::Bool(b)) => Some(*b),
            Some(SqlValue::Int(n)) => Some(*n != 0),
            Some(SqlValue::Text(s)) => match s.to_lowercase().as_str() {
                "t" | "true" | "yes" | "1" => Some(true),
                "f" | "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Whether `field` is present and not NULL.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.values.get(field).is_some_and(|v| !v.is_null())
    }
}

/// A live backend connection: executes statements and quotes literals.
///
/// One connection belongs to one driver; calls are sequential and the
/// trait provides no internal locking.
pub trait Connection {
    /// Executes `sql` with `params`, returning the fetched rows in
    /// order. Statements without result sets return an empty vector.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectionError`] on transport or statement failure.
    fn execute(&mut self, sql: &str, params: Params<'_>) -> Result<Vec<Row>, ConnectionError>;

    /// Quotes a value as a SQL literal using the raw handle, where the
    /// transport can. Returning `None` falls back to the backend's own
    /// quoting rules.
    fn quote(&self, value: &SqlValue) -> Option<String> {
        let _ = value;
        None
    }

    /// The server version string.
    fn version(&self) -> String;
}

/// Builds physical connections from driver configuration.
pub trait Connector {
    /// Opens a connection for `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConnectionError`] when the transport cannot connect.
    fn connect(
        &self,
        config: &crate::config::DriverConfig,
    ) -> Result<Box<dyn Connection>, ConnectionError>;
}
