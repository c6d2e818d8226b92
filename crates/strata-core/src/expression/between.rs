//! BETWEEN range expressions.

use super::{Expr, Operand};
use crate::binder::ValueBinder;
use crate::error::ExpressionError;
use crate::types::ColumnType;

/// A `field BETWEEN from AND to` range check.
///
/// Plain-value bounds are bound as placeholders typed by `type_name`;
/// expression bounds render in place and bind nothing themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct BetweenExpr {
    /// The tested expression, usually a field reference.
    pub field: Box<Expr>,
    /// Lower bound.
    pub from: Operand,
    /// Upper bound.
    pub to: Operand,
    /// Type applied to plain-value bounds.
    pub type_name: Option<ColumnType>,
}

impl BetweenExpr {
    /// Creates a range check.
    #[must_use]
    pub fn new(field: Expr, from: impl Into<Operand>, to: impl Into<Operand>) -> Self {
        Self {
            field: Box::new(field),
            from: from.into(),
            to: to.into(),
            type_name: None,
        }
    }

    /// Types the plain-value bounds.
    #[must_use]
    pub fn typed(mut self, type_name: ColumnType) -> Self {
        self.type_name = Some(type_name);
        self
    }

    /// Renders this node, registering bound values with `binder`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExpressionError`] on a contract violation.
    pub fn sql(&self, binder: &mut ValueBinder) -> Result<String, ExpressionError> {
        let field = self.field.sql(binder)?;
        let from = self.from.sql(binder, self.type_name.as_ref())?;
        let to = self.to.sql(binder, self.type_name.as_ref())?;
        Ok(format!("{field} BETWEEN {from} AND {to}"))
    }
}
