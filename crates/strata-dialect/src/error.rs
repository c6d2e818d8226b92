//! Error types for the dialect layer.

use strata_core::error::ExpressionError;

use crate::connection::ConnectionError;

/// Errors raised by drivers, schema dialects and describe passes.
///
/// Nothing here is retried: parse errors and contract violations are
/// caller-visible bugs or corrupt metadata, and connection errors are
/// surfaced with context for the caller to handle.
#[derive(Debug, thiserror::Error)]
pub enum DialectError {
    /// A catalog row carried a type string the dialect cannot parse.
    #[error("Unable to parse column type `{raw}` for column `{column}`")]
    UnparsableType {
        /// The column whose type failed to parse.
        column: String,
        /// The offending raw type string.
        raw: String,
    },

    /// A DDL or expression feature is not available on this backend.
    #[error("{operation} is not supported by the {dialect} dialect")]
    UnsupportedOperation {
        /// The attempted operation.
        operation: String,
        /// The active dialect.
        dialect: &'static str,
    },

    /// A describe pass found no such table.
    #[error("Table `{table}` does not exist or has no columns")]
    MissingTable {
        /// The requested table.
        table: String,
    },

    /// DDL generation referenced a column the schema does not define.
    #[error("Table `{table}` has no column named `{name}`")]
    MissingColumn {
        /// The table being rendered.
        table: String,
        /// The missing column.
        name: String,
    },

    /// DDL generation referenced a constraint the schema does not define.
    #[error("Table `{table}` has no constraint named `{name}`")]
    MissingConstraint {
        /// The table being rendered.
        table: String,
        /// The missing constraint.
        name: String,
    },

    /// DDL generation referenced an index the schema does not define.
    #[error("Table `{table}` has no index named `{name}`")]
    MissingIndex {
        /// The table being rendered.
        table: String,
        /// The missing index.
        name: String,
    },

    /// A catalog row was missing a field the dialect requires.
    #[error("Catalog row is missing the `{field}` field")]
    MissingField {
        /// The absent field.
        field: String,
    },

    /// An expression-layer contract violation.
    #[error(transparent)]
    Expression(#[from] ExpressionError),

    /// A transport failure from the underlying connection.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// A failure wrapped with the table being described.
    #[error("Failed to describe table `{table}`: {source}")]
    Describe {
        /// The table whose describe pass failed.
        table: String,
        /// The underlying failure.
        #[source]
        source: Box<DialectError>,
    },
}

impl DialectError {
    /// Wraps this error with the table being described.
    #[must_use]
    pub fn for_table(self, table: &str) -> Self {
        Self::Describe {
            table: String::from(table),
            source: Box::new(self),
        }
    }
}
