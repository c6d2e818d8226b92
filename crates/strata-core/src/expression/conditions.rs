//! Boolean condition trees.

use serde::{Deserialize, Serialize};

use super::Expr;
use crate::binder::ValueBinder;
use crate::error::ExpressionError;
use crate::value::SqlValue;

/// The separator of a condition set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conjunction {
    /// All parts must hold.
    And,
    /// Any part may hold.
    Or,
}

impl Conjunction {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// A binary comparison between two expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonExpr {
    /// Left side, usually a field reference.
    pub field: Box<Expr>,
    /// The comparison operator.
    pub op: String,
    /// Right side.
    pub value: Box<Expr>,
}

impl ComparisonExpr {
    /// Creates a comparison.
    #[must_use]
    pub fn new(field: Expr, op: impl Into<String>, value: Expr) -> Self {
        Self {
            field: Box::new(field),
            op: op.into(),
            value: Box::new(value),
        }
    }

    /// Shorthand for `field = value` with a bound right side.
    #[must_use]
    pub fn eq(field: impl Into<String>, value: SqlValue) -> Self {
        Self::new(Expr::field(field), "=", Expr::value(value))
    }

    /// Renders this node, registering bound values with `binder`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExpressionError`] on a contract violation.
    pub fn sql(&self, binder: &mut ValueBinder) -> Result<String, ExpressionError> {
        Ok(format!(
            "{} {} {}",
            self.field.sql(binder)?,
            self.op,
            self.value.sql(binder)?
        ))
    }
}

/// An AND/OR tree of condition expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionSet {
    /// The separator between parts.
    pub conjunction: Conjunction,
    /// The child conditions, in insertion order.
    pub parts: Vec<Expr>,
}

impl ConditionSet {
    /// Creates an empty set with the given conjunction.
    #[must_use]
    pub const fn new(conjunction: Conjunction) -> Self {
        Self {
            conjunction,
            parts: Vec::new(),
        }
    }

    /// Creates an AND set from parts.
    #[must_use]
    pub fn all(parts: Vec<Expr>) -> Self {
        Self {
            conjunction: Conjunction::And,
            parts,
        }
    }

    /// Creates an OR set from parts.
    #[must_use]
    pub fn any(parts: Vec<Expr>) -> Self {
        Self {
            conjunction: Conjunction::Or,
            parts,
        }
    }

    /// Appends a condition.
    pub fn add(&mut self, expr: Expr) {
        self.parts.push(expr);
    }

    /// Returns true when the set holds no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Renders this node, registering bound values with `binder`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExpressionError`] on a contract violation.
    pub fn sql(&self, binder: &mut ValueBinder) -> Result<String, ExpressionError> {
        let rendered: Vec<String> = self
            .parts
            .iter()
            .map(|p| p.sql(binder))
            .collect::<Result<_, _>>()?;
        if rendered.len() == 1 {
            return Ok(rendered.into_iter().next().unwrap_or_default());
        }
        let sep = format!(" {} ", self.conjunction.as_sql());
        Ok(format!("({})", rendered.join(&sep)))
    }
}
