//! Composable SQL expression tree.
//!
//! Expressions are typed AST nodes that render themselves to SQL text
//! against a [`ValueBinder`], can be traversed one level at a time, and
//! deep-copy on clone. Backend drivers rewrite nodes (keyed by
//! [`ExprKind`]) before rendering to substitute dialect idioms.

mod between;
mod case;
mod conditions;
mod function;
mod tuple;

pub use between::BetweenExpr;
pub use case::{CaseExpr, WhenClause, WhenThenExpr, WhenType};
pub use conditions::{ComparisonExpr, ConditionSet, Conjunction};
pub use function::{FunctionArg, FunctionExpr};
pub use tuple::{TupleComparison, TupleValue};

use crate::binder::ValueBinder;
use crate::error::ExpressionError;
use crate::query::SelectQuery;
use crate::types::ColumnType;
use crate::value::SqlValue;

/// A column or identifier reference, rendered verbatim.
///
/// Identifier quoting happens upstream (the driver quotes identifiers
/// when a statement is prepared for a backend that requires it).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldExpr {
    /// The referenced identifier.
    pub name: String,
}

/// A literal value bound as a placeholder when rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueExpr {
    /// The value to bind.
    pub value: SqlValue,
    /// Declared type, or `None` to pass through.
    pub type_name: Option<ColumnType>,
}

/// A raw SQL fragment emitted verbatim, with no quoting or binding.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    /// The fragment.
    pub sql: String,
}

/// The kind tag of an expression node, used by driver translator tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    /// [`FieldExpr`].
    Field,
    /// [`ValueExpr`].
    Value,
    /// [`LiteralExpr`].
    Literal,
    /// [`ComparisonExpr`].
    Comparison,
    /// [`ConditionSet`].
    Conditions,
    /// [`FunctionExpr`].
    Function,
    /// [`BetweenExpr`].
    Between,
    /// [`TupleComparison`].
    Tuple,
    /// [`CaseExpr`].
    Case,
    /// [`WhenThenExpr`].
    When,
    /// Subquery.
    Query,
}

/// One unit of a composable SQL fragment tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Identifier reference.
    Field(FieldExpr),
    /// Bound value.
    Value(ValueExpr),
    /// Raw fragment.
    Literal(LiteralExpr),
    /// Binary comparison.
    Comparison(ComparisonExpr),
    /// AND/OR tree.
    Conditions(ConditionSet),
    /// Function call.
    Function(FunctionExpr),
    /// BETWEEN range check.
    Between(BetweenExpr),
    /// Row-value comparison.
    Tuple(TupleComparison),
    /// CASE expression.
    Case(CaseExpr),
    /// Standalone WHEN ... THEN arm.
    When(WhenThenExpr),
    /// Subquery; renders parenthesized.
    Query(Box<SelectQuery>),
}

impl Expr {
    /// Creates an identifier reference.
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(FieldExpr { name: name.into() })
    }

    /// Creates an untyped bound value.
    #[must_use]
    pub fn value(value: SqlValue) -> Self {
        Self::Value(ValueExpr {
            value,
            type_name: None,
        })
    }

    /// Creates a typed bound value.
    #[must_use]
    pub fn typed_value(value: SqlValue, type_name: ColumnType) -> Self {
        Self::Value(ValueExpr {
            value,
            type_name: Some(type_name),
        })
    }

    /// Creates a raw SQL fragment.
    #[must_use]
    pub fn literal(sql: impl Into<String>) -> Self {
        Self::Literal(LiteralExpr { sql: sql.into() })
    }

    /// Creates a subquery expression.
    #[must_use]
    pub fn query(query: SelectQuery) -> Self {
        Self::Query(Box::new(query))
    }

    /// Returns the kind tag of this node.
    #[must_use]
    pub const fn kind(&self) -> ExprKind {
        match self {
            Self::Field(_) => ExprKind::Field,
            Self::Value(_) => ExprKind::Value,
            Self::Literal(_) => ExprKind::Literal,
            Self::Comparison(_) => ExprKind::Comparison,
            Self::Conditions(_) => ExprKind::Conditions,
            Self::Function(_) => ExprKind::Function,
            Self::Between(_) => ExprKind::Between,
            Self::Tuple(_) => ExprKind::Tuple,
            Self::Case(_) => ExprKind::Case,
            Self::When(_) => ExprKind::When,
            Self::Query(_) => ExprKind::Query,
        }
    }

    /// Renders this expression, registering bound values with `binder`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExpressionError`] for contract violations such as an
    /// incomplete WHEN arm or a tuple arity mismatch.
    pub fn sql(&self, binder: &mut ValueBinder) -> Result<String, ExpressionError> {
        match self {
            Self::Field(f) => Ok(f.name.clone()),
            Self::Value(v) => Ok(binder.bind_value("c", v.value.clone(), v.type_name.clone())),
            Self::Literal(l) => Ok(l.sql.clone()),
            Self::Comparison(c) => c.sql(binder),
            Self::Conditions(c) => c.sql(binder),
            Self::Function(f) => f.sql(binder),
            Self::Between(b) => b.sql(binder),
            Self::Tuple(t) => t.sql(binder),
            Self::Case(c) => c.sql(binder),
            Self::When(w) => w.sql(binder),
            Self::Query(q) => Ok(format!("({})", q.sql(binder)?)),
        }
    }

    /// Calls `visitor` once per direct child expression.
    ///
    /// Children are not recursed into; callers recurse explicitly when a
    /// deeper walk is wanted.
    pub fn traverse(&self, visitor: &mut dyn FnMut(&Expr)) {
        match self {
            Self::Field(_) | Self::Value(_) | Self::Literal(_) => {}
            Self::Comparison(c) => {
                visitor(&c.field);
                visitor(&c.value);
            }
            Self::Conditions(c) => {
                for part in &c.parts {
                    visitor(part);
                }
            }
            Self::Function(f) => {
                for arg in &f.args {
                    if let FunctionArg::Expr(e) = arg {
                        visitor(e);
                    }
                }
            }
            Self::Between(b) => {
                visitor(&b.field);
                if let Operand::Expr(e) = &b.from {
                    visitor(e);
                }
                if let Operand::Expr(e) = &b.to {
                    visitor(e);
                }
            }
            Self::Tuple(t) => {
                for field in &t.fields {
                    visitor(field);
                }
                if let TupleValue::Query(q) = &t.value {
                    q.traverse(visitor);
                }
            }
            Self::Case(c) => {
                if let Some(Operand::Expr(e)) = &c.value {
                    visitor(e);
                }
                for arm in &c.whens {
                    arm.traverse(visitor);
                }
                if let Some(Operand::Expr(e)) = &c.else_value {
                    visitor(e);
                }
            }
            Self::When(w) => w.traverse(visitor),
            Self::Query(q) => q.traverse(visitor),
        }
    }

    /// Rebuilds the tree bottom-up through `f`: children are rewritten
    /// first, then the node itself is handed to `f`.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `f`.
    pub fn rewrite(
        self,
        f: &mut dyn FnMut(Expr) -> Result<Expr, ExpressionError>,
    ) -> Result<Expr, ExpressionError> {
        let node = match self {
            node @ (Self::Field(_) | Self::Value(_) | Self::Literal(_)) => node,
            Self::Comparison(mut c) => {
                c.field = Box::new(c.field.rewrite(f)?);
                c.value = Box::new(c.value.rewrite(f)?);
                Self::Comparison(c)
            }
            Self::Conditions(mut c) => {
                c.parts = c
                    .parts
                    .into_iter()
                    .map(|p| p.rewrite(f))
                    .collect::<Result<_, _>>()?;
                Self::Conditions(c)
            }
            Self::Function(mut func) => {
                func.args = func
                    .args
                    .into_iter()
                    .map(|arg| match arg {
                        FunctionArg::Expr(e) => Ok(FunctionArg::Expr(Box::new(e.rewrite(f)?))),
                        other => Ok(other),
                    })
                    .collect::<Result<Vec<_>, ExpressionError>>()?;
                Self::Function(func)
            }
            Self::Between(mut b) => {
                b.field = Box::new(b.field.rewrite(f)?);
                b.from = b.from.rewrite(f)?;
                b.to = b.to.rewrite(f)?;
                Self::Between(b)
            }
            Self::Tuple(mut t) => {
                t.fields = t
                    .fields
                    .into_iter()
                    .map(|field| field.rewrite(f))
                    .collect::<Result<_, _>>()?;
                t.value = match t.value {
                    TupleValue::Query(q) => TupleValue::Query(Box::new(q.rewrite(f)?)),
                    other => other,
                };
                Self::Tuple(t)
            }
            Self::Case(mut c) => {
                c.value = c.value.map(|v| v.rewrite(f)).transpose()?;
                c.whens = c
                    .whens
                    .into_iter()
                    .map(|arm| arm.rewrite(f))
                    .collect::<Result<_, _>>()?;
                c.else_value = c.else_value.map(|v| v.rewrite(f)).transpose()?;
                Self::Case(c)
            }
            Self::When(w) => Self::When(w.rewrite(f)?),
            Self::Query(q) => Self::Query(Box::new(q.rewrite(f)?)),
        };
        f(node)
    }
}

/// A scalar-or-expression operand used by BETWEEN, CASE and WHEN nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A plain value, bound as a placeholder.
    Value(SqlValue),
    /// A child expression, rendered in place.
    Expr(Box<Expr>),
}

impl Operand {
    /// Renders this operand, binding plain values typed by `type_name`.
    pub(crate) fn sql(
        &self,
        binder: &mut ValueBinder,
        type_name: Option<&ColumnType>,
    ) -> Result<String, ExpressionError> {
        match self {
            Self::Value(v) => Ok(binder.bind_value("c", v.clone(), type_name.cloned())),
            Self::Expr(e) => e.sql(binder),
        }
    }

    pub(crate) fn rewrite(
        self,
        f: &mut dyn FnMut(Expr) -> Result<Expr, ExpressionError>,
    ) -> Result<Self, ExpressionError> {
        match self {
            Self::Value(v) => Ok(Self::Value(v)),
            Self::Expr(e) => Ok(Self::Expr(Box::new(e.rewrite(f)?))),
        }
    }
}

impl From<SqlValue> for Operand {
    fn from(value: SqlValue) -> Self {
        Self::Value(value)
    }
}

impl From<Expr> for Operand {
    fn from(expr: Expr) -> Self {
        Self::Expr(Box::new(expr))
    }
}
