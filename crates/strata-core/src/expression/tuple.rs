//! Row-value (tuple) comparisons.

use super::Expr;
use crate::binder::ValueBinder;
use crate::error::ExpressionError;
use crate::query::SelectQuery;
use crate::types::ColumnType;
use crate::value::SqlValue;

/// The right-hand side of a tuple comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum TupleValue {
    /// One tuple of plain values.
    Single(Vec<SqlValue>),
    /// A list of tuples, as used with `IN`.
    List(Vec<Vec<SqlValue>>),
    /// A subquery producing the compared rows.
    Query(Box<SelectQuery>),
}

/// A row-value comparison such as `(a, b) = (1, 2)` or
/// `(a, b) IN ((1, 2), (3, 4))`.
///
/// Backends with native row-value support render this directly; the
/// others rewrite it into a surrogate query through their driver's
/// translator table.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleComparison {
    /// The compared fields, in order.
    pub fields: Vec<Expr>,
    /// The comparison operator.
    pub op: String,
    /// The right-hand side.
    pub value: TupleValue,
    /// Per-field types applied when binding plain values.
    pub types: Vec<Option<ColumnType>>,
}

impl TupleComparison {
    /// Creates a tuple comparison with untyped fields.
    #[must_use]
    pub fn new(fields: Vec<Expr>, op: impl Into<String>, value: TupleValue) -> Self {
        let types = vec![None; fields.len()];
        Self {
            fields,
            op: op.into(),
            value,
            types,
        }
    }

    /// Sets the per-field types. The slice is matched positionally.
    #[must_use]
    pub fn typed(mut self, types: Vec<Option<ColumnType>>) -> Self {
        self.types = types;
        self
    }

    /// Type for the field at `index`, if declared.
    #[must_use]
    pub fn type_at(&self, index: usize) -> Option<&ColumnType> {
        self.types.get(index).and_then(Option::as_ref)
    }

    fn check_arity(&self, tuple: &[SqlValue]) -> Result<(), ExpressionError> {
        if tuple.len() == self.fields.len() {
            Ok(())
        } else {
            Err(ExpressionError::TupleArityMismatch {
                expected: self.fields.len(),
                got: tuple.len(),
            })
        }
    }

    fn tuple_sql(
        &self,
        tuple: &[SqlValue],
        binder: &mut ValueBinder,
    ) -> Result<String, ExpressionError> {
        self.check_arity(tuple)?;
        let bound: Vec<String> = tuple
            .iter()
            .enumerate()
            .map(|(i, v)| binder.bind_value("tuple", v.clone(), self.type_at(i).cloned()))
            .collect();
        Ok(format!("({})", bound.join(", ")))
    }

    /// Renders this node, registering bound values with `binder`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExpressionError`] on a contract violation.
    pub fn sql(&self, binder: &mut ValueBinder) -> Result<String, ExpressionError> {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|f| f.sql(binder))
            .collect::<Result<_, _>>()?;
        let lhs = format!("({})", fields.join(", "));

        let rhs = match &self.value {
            TupleValue::Single(tuple) => self.tuple_sql(tuple, binder)?,
            TupleValue::List(tuples) => {
                let parts: Vec<String> = tuples
                    .iter()
                    .map(|t| self.tuple_sql(t, binder))
                    .collect::<Result<_, _>>()?;
                format!("({})", parts.join(", "))
            }
            TupleValue::Query(q) => format!("({})", q.sql(binder)?),
        };

        Ok(format!("{lhs} {} {rhs}", self.op))
    }
}
