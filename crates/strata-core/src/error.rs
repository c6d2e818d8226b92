//! Error types for the expression and schema layers.

/// Errors raised while building or rendering expressions and schemas.
///
/// These are caller-contract violations: none of them is retried, and all
/// of them surface immediately.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    /// A CASE arm was rendered before both `when` and `then` were set.
    #[error("Case expression has an incomplete WHEN ... THEN clause")]
    IncompleteWhen,

    /// A CASE expression was rendered with no WHEN arms at all.
    #[error("Case expression must have at least one WHEN clause")]
    EmptyCase,

    /// A tuple comparison used an operator the rewrite cannot emulate.
    #[error("Tuple comparison only supports the `=` and `IN` operators, got `{0}`")]
    InvalidTupleOperator(String),

    /// A scalar WHEN value was given a type map, or a structural WHEN
    /// value a single type.
    #[error("WHEN value shape does not match its type declaration: {0}")]
    TypeShapeMismatch(String),

    /// A tuple value's arity does not match the compared fields.
    #[error("Tuple value has {got} entries but {expected} fields are compared")]
    TupleArityMismatch {
        /// Number of compared fields.
        expected: usize,
        /// Number of entries in the offending tuple.
        got: usize,
    },

    /// A constraint or index referenced a column the table does not have.
    #[error("Column `{column}` referenced by `{referrer}` does not exist in table `{table}`")]
    UnknownColumn {
        /// The table being defined or described.
        table: String,
        /// The missing column.
        column: String,
        /// The constraint or index naming the column.
        referrer: String,
    },

    /// Two columns, constraints or indexes were registered under one name.
    #[error("Duplicate name `{name}` in table `{table}`")]
    DuplicateName {
        /// The table being defined or described.
        table: String,
        /// The colliding name.
        name: String,
    },
}
