//! SQL function call expressions.

use super::Expr;
use crate::binder::ValueBinder;
use crate::error::ExpressionError;
use crate::types::ColumnType;
use crate::value::SqlValue;

/// One argument of a function call.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionArg {
    /// Raw SQL fragment emitted verbatim, no quoting or binding.
    Literal(String),
    /// Column reference, rendered as its unquoted name.
    Identifier(String),
    /// Plain value bound as a placeholder, with an optional type.
    Value {
        /// The value to bind.
        value: SqlValue,
        /// Declared type, or `None` to pass through.
        type_name: Option<ColumnType>,
    },
    /// A nested expression; subqueries render parenthesized.
    Expr(Box<Expr>),
}

impl FunctionArg {
    /// Shorthand for an untyped bound value argument.
    #[must_use]
    pub const fn value(value: SqlValue) -> Self {
        Self::Value {
            value,
            type_name: None,
        }
    }

    /// Shorthand for a typed bound value argument.
    #[must_use]
    pub const fn typed(value: SqlValue, type_name: ColumnType) -> Self {
        Self::Value {
            value,
            type_name: Some(type_name),
        }
    }
}

/// A SQL function call: name, ordered arguments, argument separator and
/// declared return type.
///
/// Driver translators may clear the name and change the conjunction to
/// turn a call into an infix form (`CONCAT(a, b)` becomes `a || b`).
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpr {
    /// The function name; empty renders the bare joined argument list.
    pub name: String,
    /// Ordered arguments.
    pub args: Vec<FunctionArg>,
    /// Separator between rendered arguments, without the trailing space.
    pub conjunction: String,
    /// Declared result type, used by CASE/WHEN type inference.
    pub return_type: Option<ColumnType>,
}

impl FunctionExpr {
    /// Creates a function call with the default `,` separator.
    #[must_use]
    pub fn new(name: impl Into<String>, args: Vec<FunctionArg>) -> Self {
        Self {
            name: name.into(),
            args,
            conjunction: String::from(","),
            return_type: None,
        }
    }

    /// Sets the argument separator.
    #[must_use]
    pub fn conjunction(mut self, conjunction: impl Into<String>) -> Self {
        self.conjunction = conjunction.into();
        self
    }

    /// Declares the result type.
    #[must_use]
    pub fn return_type(mut self, type_name: ColumnType) -> Self {
        self.return_type = Some(type_name);
        self
    }

    /// Replaces the function name in place; translators use this.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Replaces the separator in place; translators use this.
    pub fn set_conjunction(&mut self, conjunction: impl Into<String>) {
        self.conjunction = conjunction.into();
    }

    /// Appends an argument.
    pub fn add(&mut self, arg: FunctionArg) {
        self.args.push(arg);
    }

    /// Prepends an argument; translators use this for calls whose first
    /// argument is a dialect keyword.
    pub fn prepend(&mut self, arg: FunctionArg) {
        self.args.insert(0, arg);
    }

    /// The cost/size estimate of this call: the name counts as one
    /// expression unit, plus one per argument.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.args.len()
    }

    /// Renders this node, registering bound values with `binder`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExpressionError`] on a contract violation.
    pub fn sql(&self, binder: &mut ValueBinder) -> Result<String, ExpressionError> {
        let rendered: Vec<String> = self
            .args
            .iter()
            .map(|arg| match arg {
                FunctionArg::Literal(sql) => Ok(sql.clone()),
                FunctionArg::Identifier(name) => Ok(name.clone()),
                FunctionArg::Value { value, type_name } => {
                    Ok(binder.bind_value("param", value.clone(), type_name.clone()))
                }
                FunctionArg::Expr(e) => e.sql(binder),
            })
            .collect::<Result<_, _>>()?;

        let sep = format!("{} ", self.conjunction);
        let body = rendered.join(&sep);
        if self.name.is_empty() {
            Ok(body)
        } else {
            Ok(format!("{}({body})", self.name))
        }
    }
}
