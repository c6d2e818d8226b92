//! CASE expressions and their WHEN ... THEN arms.

use std::collections::HashMap;

use super::{ComparisonExpr, ConditionSet, Expr, Operand};
use crate::binder::ValueBinder;
use crate::error::ExpressionError;
use crate::types::ColumnType;
use crate::value::SqlValue;

/// The tested side of a WHEN clause.
#[derive(Debug, Clone, PartialEq)]
pub enum WhenClause {
    /// A plain comparison target, bound as a placeholder.
    Scalar(SqlValue),
    /// An expression rendered in place.
    Expr(Box<Expr>),
    /// A structural field→value condition map, compiled to an AND tree.
    Conditions(Vec<(String, SqlValue)>),
}

/// The type declaration accompanying a WHEN value.
#[derive(Debug, Clone, PartialEq)]
pub enum WhenType {
    /// Single type, for scalar WHEN values.
    Single(ColumnType),
    /// Type per field key, for structural WHEN values.
    Map(HashMap<String, ColumnType>),
}

/// One `WHEN ... THEN ...` arm of a CASE expression.
///
/// The two calls must happen in order: [`when`](Self::when) first, then
/// [`then`](Self::then). Rendering an arm whose `then` has not been set
/// signals [`ExpressionError::IncompleteWhen`] rather than producing
/// partial SQL.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WhenThenExpr {
    when_value: Option<WhenClause>,
    when_type: Option<WhenType>,
    then_value: Option<Operand>,
    then_type: Option<ColumnType>,
    /// Ambient column-type map inherited from the owning CASE.
    type_map: HashMap<String, ColumnType>,
}

impl WhenThenExpr {
    /// Creates an empty arm.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tested value.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::TypeShapeMismatch`] when a scalar value
    /// is paired with a type map or a structural value with a single
    /// type.
    pub fn when(
        mut self,
        value: impl Into<WhenClause>,
        type_name: Option<WhenType>,
    ) -> Result<Self, ExpressionError> {
        let value = value.into();
        match (&value, &type_name) {
            (WhenClause::Conditions(_), Some(WhenType::Single(_))) => {
                return Err(ExpressionError::TypeShapeMismatch(String::from(
                    "a structural WHEN value requires a type map, not a single type",
                )));
            }
            (WhenClause::Scalar(_) | WhenClause::Expr(_), Some(WhenType::Map(_))) => {
                return Err(ExpressionError::TypeShapeMismatch(String::from(
                    "a scalar WHEN value requires a single type, not a type map",
                )));
            }
            _ => {}
        }
        self.when_value = Some(value);
        self.when_type = type_name;
        Ok(self)
    }

    /// Sets the result value.
    #[must_use]
    pub fn then(mut self, result: impl Into<Operand>, type_name: Option<ColumnType>) -> Self {
        self.then_value = Some(result.into());
        self.then_type = type_name;
        self
    }

    /// Whether both `when` and `then` have been set.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.when_value.is_some() && self.then_value.is_some()
    }

    /// The declared or inferred type of the THEN result.
    #[must_use]
    pub fn result_type(&self) -> Option<ColumnType> {
        if let Some(t) = &self.then_type {
            return Some(t.clone());
        }
        match &self.then_value {
            Some(Operand::Value(v)) => v.infer_type(),
            Some(Operand::Expr(e)) => expression_type(e),
            None => None,
        }
    }

    pub(crate) fn set_type_map(&mut self, map: HashMap<String, ColumnType>) {
        self.type_map = map;
    }

    /// Infers the type of a structural condition value: the explicit map
    /// entry first, the ambient column-type map next, the value itself
    /// last.
    fn condition_type(&self, field: &str, value: &SqlValue) -> Option<ColumnType> {
        if let Some(WhenType::Map(map)) = &self.when_type {
            if let Some(t) = map.get(field) {
                return Some(t.clone());
            }
        }
        if let Some(t) = self.type_map.get(field) {
            return Some(t.clone());
        }
        value.infer_type()
    }

    fn when_sql(&self, binder: &mut ValueBinder) -> Result<String, ExpressionError> {
        let when = self
            .when_value
            .as_ref()
            .ok_or(ExpressionError::IncompleteWhen)?;
        match when {
            WhenClause::Scalar(value) => {
                let type_name = match &self.when_type {
                    Some(WhenType::Single(t)) => Some(t.clone()),
                    _ => value.infer_type(),
                };
                Ok(binder.bind_value("c", value.clone(), type_name))
            }
            WhenClause::Expr(e) => e.sql(binder),
            WhenClause::Conditions(pairs) => {
                let parts: Vec<Expr> = pairs
                    .iter()
                    .map(|(field, value)| {
                        let type_name = self.condition_type(field, value);
                        let rhs = match type_name {
                            Some(t) => Expr::typed_value(value.clone(), t),
                            None => Expr::value(value.clone()),
                        };
                        Expr::Comparison(ComparisonExpr::new(Expr::field(field.clone()), "=", rhs))
                    })
                    .collect();
                ConditionSet::all(parts).sql(binder)
            }
        }
    }

    /// Renders this node, registering bound values with `binder`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExpressionError`] on a contract violation.
    pub fn sql(&self, binder: &mut ValueBinder) -> Result<String, ExpressionError> {
        if !self.is_complete() {
            return Err(ExpressionError::IncompleteWhen);
        }
        let when = self.when_sql(binder)?;
        let then_type = self.result_type();
        let then = self
            .then_value
            .as_ref()
            .ok_or(ExpressionError::IncompleteWhen)?
            .sql(binder, then_type.as_ref())?;
        Ok(format!("WHEN {when} THEN {then}"))
    }

    /// Calls `visitor` on each direct child expression.
    pub(crate) fn traverse(&self, visitor: &mut dyn FnMut(&Expr)) {
        if let Some(WhenClause::Expr(e)) = &self.when_value {
            visitor(e);
        }
        if let Some(Operand::Expr(e)) = &self.then_value {
            visitor(e);
        }
    }

    pub(crate) fn rewrite(
        mut self,
        f: &mut dyn FnMut(Expr) -> Result<Expr, ExpressionError>,
    ) -> Result<Self, ExpressionError> {
        self.when_value = match self.when_value {
            Some(WhenClause::Expr(e)) => Some(WhenClause::Expr(Box::new(e.rewrite(f)?))),
            other => other,
        };
        self.then_value = match self.then_value {
            Some(then) => Some(then.rewrite(f)?),
            None => None,
        };
        Ok(self)
    }
}

impl From<SqlValue> for WhenClause {
    fn from(value: SqlValue) -> Self {
        Self::Scalar(value)
    }
}

impl From<Expr> for WhenClause {
    fn from(expr: Expr) -> Self {
        Self::Expr(Box::new(expr))
    }
}

impl From<Vec<(String, SqlValue)>> for WhenClause {
    fn from(pairs: Vec<(String, SqlValue)>) -> Self {
        Self::Conditions(pairs)
    }
}

/// A `CASE [value] WHEN ... THEN ... [ELSE ...] END` expression.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaseExpr {
    /// Optional operand for the simple CASE form.
    pub value: Option<Operand>,
    /// The WHEN arms, in order.
    pub whens: Vec<WhenThenExpr>,
    /// Optional ELSE result.
    pub else_value: Option<Operand>,
    /// Declared result type; inferred from the arms when absent.
    pub return_type: Option<ColumnType>,
    type_map: HashMap<String, ColumnType>,
}

impl CaseExpr {
    /// Creates a searched CASE (no operand).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a simple CASE comparing against `value`.
    #[must_use]
    pub fn matching(value: impl Into<Operand>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Sets the ambient column-type map consulted by structural WHEN
    /// values for field references.
    #[must_use]
    pub fn type_map(mut self, map: HashMap<String, ColumnType>) -> Self {
        self.type_map = map;
        self
    }

    /// Appends a WHEN arm; the arm inherits the ambient type map.
    #[must_use]
    pub fn when_then(mut self, mut arm: WhenThenExpr) -> Self {
        arm.set_type_map(self.type_map.clone());
        self.whens.push(arm);
        self
    }

    /// Sets the ELSE result.
    #[must_use]
    pub fn else_result(mut self, value: impl Into<Operand>) -> Self {
        self.else_value = Some(value.into());
        self
    }

    /// Declares the result type explicitly.
    #[must_use]
    pub fn return_type(mut self, type_name: ColumnType) -> Self {
        self.return_type = Some(type_name);
        self
    }

    /// The declared result type, or the first arm's inferred one.
    #[must_use]
    pub fn result_type(&self) -> Option<ColumnType> {
        if let Some(t) = &self.return_type {
            return Some(t.clone());
        }
        self.whens.iter().find_map(WhenThenExpr::result_type)
    }

    /// Renders this node, registering bound values with `binder`.
    ///
    /// # Errors
    ///
    /// Returns an [`ExpressionError`] on a contract violation.
    pub fn sql(&self, binder: &mut ValueBinder) -> Result<String, ExpressionError> {
        if self.whens.is_empty() {
            return Err(ExpressionError::EmptyCase);
        }

        let mut out = String::from("CASE");
        if let Some(value) = &self.value {
            out.push(' ');
            out.push_str(&value.sql(binder, None)?);
        }
        for arm in &self.whens {
            out.push(' ');
            out.push_str(&arm.sql(binder)?);
        }
        if let Some(else_value) = &self.else_value {
            out.push_str(" ELSE ");
            out.push_str(&else_value.sql(binder, self.result_type().as_ref())?);
        }
        out.push_str(" END");
        Ok(out)
    }
}

/// The declared type of an expression, where one exists.
fn expression_type(expr: &Expr) -> Option<ColumnType> {
    match expr {
        Expr::Value(v) => v
            .type_name
            .clone()
            .or_else(|| v.value.infer_type()),
        Expr::Function(f) => f.return_type.clone(),
        Expr::Case(c) => c.result_type(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_before_then_is_an_error() {
        let mut binder = ValueBinder::new();
        let arm = WhenThenExpr::new()
            .when(SqlValue::Int(1), None)
            .unwrap();
        assert_eq!(
            arm.sql(&mut binder).unwrap_err(),
            ExpressionError::IncompleteWhen
        );
    }

    #[test]
    fn test_complete_arm_renders() {
        let mut binder = ValueBinder::new();
        let arm = WhenThenExpr::new()
            .when(SqlValue::Int(1), Some(WhenType::Single(ColumnType::Integer)))
            .unwrap()
            .then(SqlValue::Text(String::from("one")), None);
        assert_eq!(arm.sql(&mut binder).unwrap(), "WHEN :c0 THEN :c1");
        assert_eq!(binder.bindings()[0].type_name, Some(ColumnType::Integer));
        // THEN type inferred from the string value.
        assert_eq!(binder.bindings()[1].type_name, Some(ColumnType::String));
    }

    #[test]
    fn test_scalar_when_rejects_type_map() {
        let err = WhenThenExpr::new()
            .when(
                SqlValue::Int(1),
                Some(WhenType::Map(HashMap::from([(
                    String::from("a"),
                    ColumnType::Integer,
                )]))),
            )
            .unwrap_err();
        assert!(matches!(err, ExpressionError::TypeShapeMismatch(_)));
    }

    #[test]
    fn test_structural_when_rejects_single_type() {
        let err = WhenThenExpr::new()
            .when(
                vec![(String::from("a"), SqlValue::Int(1))],
                Some(WhenType::Single(ColumnType::Integer)),
            )
            .unwrap_err();
        assert!(matches!(err, ExpressionError::TypeShapeMismatch(_)));
    }

    #[test]
    fn test_structural_when_compiles_condition_tree() {
        let mut binder = ValueBinder::new();
        let arm = WhenThenExpr::new()
            .when(
                vec![
                    (String::from("published"), SqlValue::Bool(true)),
                    (String::from("views"), SqlValue::Int(10)),
                ],
                None,
            )
            .unwrap()
            .then(SqlValue::Int(1), None);
        assert_eq!(
            arm.sql(&mut binder).unwrap(),
            "WHEN (published = :c0 AND views = :c1) THEN :c2"
        );
        assert_eq!(binder.bindings()[0].type_name, Some(ColumnType::Boolean));
        assert_eq!(binder.bindings()[1].type_name, Some(ColumnType::Integer));
    }

    #[test]
    fn test_ambient_type_map_types_field_references() {
        let mut binder = ValueBinder::new();
        let case = CaseExpr::new()
            .type_map(HashMap::from([(
                String::from("score"),
                ColumnType::Decimal,
            )]))
            .when_then(
                WhenThenExpr::new()
                    .when(
                        vec![(String::from("score"), SqlValue::Int(90))],
                        None,
                    )
                    .unwrap()
                    .then(SqlValue::Text(String::from("high")), None),
            );
        case.sql(&mut binder).unwrap();
        assert_eq!(binder.bindings()[0].type_name, Some(ColumnType::Decimal));
    }

    #[test]
    fn test_case_with_no_arms_is_an_error() {
        let mut binder = ValueBinder::new();
        assert_eq!(
            CaseExpr::new().sql(&mut binder).unwrap_err(),
            ExpressionError::EmptyCase
        );
    }

    #[test]
    fn test_simple_case_with_else() {
        let mut binder = ValueBinder::new();
        let case = CaseExpr::matching(Expr::field("status"))
            .when_then(
                WhenThenExpr::new()
                    .when(SqlValue::Text(String::from("new")), None)
                    .unwrap()
                    .then(SqlValue::Int(1), None),
            )
            .else_result(SqlValue::Int(0));
        assert_eq!(
            case.sql(&mut binder).unwrap(),
            "CASE status WHEN :c0 THEN :c1 ELSE :c2 END"
        );
    }

    #[test]
    fn test_result_type_falls_back_to_first_arm() {
        let case = CaseExpr::new().when_then(
            WhenThenExpr::new()
                .when(SqlValue::Bool(true), None)
                .unwrap()
                .then(SqlValue::Int(1), Some(ColumnType::TinyInteger)),
        );
        assert_eq!(case.result_type(), Some(ColumnType::TinyInteger));
    }
}
