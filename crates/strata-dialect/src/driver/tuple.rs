//! Tuple-comparison emulation for backends without row-value support.
//!
//! `(a, b) IN ((1, 2), (3, 4))` has no native form on SQLite or SQL
//! Server. The rewrite collapses the comparison to `1 = (SELECT 1 WHERE
//! ...)`: a surrogate query whose WHERE holds one AND group per tuple,
//! OR-ed together. A subquery right-hand side instead gets per-field
//! equality conditions injected into its own WHERE and its select list
//! replaced by the literal `1`.

use strata_core::error::ExpressionError;
use strata_core::expression::{
    ComparisonExpr, ConditionSet, Expr, TupleComparison, TupleValue,
};
use strata_core::query::SelectQuery;
use strata_core::value::SqlValue;

/// Rewrites tuple-comparison nodes into the surrogate form. Every other
/// node kind passes through untouched.
pub(crate) fn transform_tuple(expr: Expr) -> Result<Expr, ExpressionError> {
    let Expr::Tuple(tuple) = expr else {
        return Ok(expr);
    };

    if tuple.op != "=" && !tuple.op.eq_ignore_ascii_case("IN") {
        return Err(ExpressionError::InvalidTupleOperator(tuple.op));
    }

    let TupleComparison {
        fields,
        value,
        types,
        ..
    } = tuple;
    match value {
        TupleValue::Query(query) => rewrite_subquery(&fields, *query),
        TupleValue::Single(row) => {
            rewrite_tuples(&fields, &types, std::slice::from_ref(&row))
        }
        TupleValue::List(rows) => rewrite_tuples(&fields, &types, &rows),
    }
}

/// Injects `field_i = selected_i` into the subquery's WHERE, replaces
/// its select list with `1` and collapses to `1 = (subquery)`.
fn rewrite_subquery(fields: &[Expr], mut query: SelectQuery) -> Result<Expr, ExpressionError> {
    let selected = query.select_items().to_vec();
    if selected.len() != fields.len() {
        return Err(ExpressionError::TupleArityMismatch {
            expected: fields.len(),
            got: selected.len(),
        });
    }
    for (field, picked) in fields.iter().zip(selected) {
        query.and_where(Expr::Comparison(ComparisonExpr::new(
            field.clone(),
            "=",
            picked,
        )));
    }
    query.replace_select(vec![Expr::literal("1")]);
    Ok(collapse(Expr::query(query)))
}

/// Builds the `SELECT 1 WHERE (f1 = v1 AND f2 = v2) OR ...` surrogate,
/// one AND group per input tuple.
fn rewrite_tuples(
    fields: &[Expr],
    types: &[Option<strata_core::types::ColumnType>],
    tuples: &[Vec<SqlValue>],
) -> Result<Expr, ExpressionError> {
    let mut groups = ConditionSet::any(Vec::new());
    for row in tuples {
        if row.len() != fields.len() {
            return Err(ExpressionError::TupleArityMismatch {
                expected: fields.len(),
                got: row.len(),
            });
        }
        let parts: Vec<Expr> = fields
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let value = match types.get(i).and_then(Option::as_ref) {
                    Some(t) => Expr::typed_value(row[i].clone(), t.clone()),
                    None => Expr::value(row[i].clone()),
                };
                Expr::Comparison(ComparisonExpr::new(field.clone(), "=", value))
            })
            .collect();
        groups.add(Expr::Conditions(ConditionSet::all(parts)));
    }

    let surrogate = SelectQuery::new()
        .select(Expr::literal("1"))
        .where_clause(groups);
    Ok(collapse(Expr::query(surrogate)))
}

fn collapse(rhs: Expr) -> Expr {
    Expr::Comparison(ComparisonExpr::new(Expr::literal("1"), "=", rhs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::binder::ValueBinder;
    use strata_core::expression::ExprKind;

    fn tuple_in() -> Expr {
        Expr::Tuple(TupleComparison::new(
            vec![Expr::field("a"), Expr::field("b")],
            "IN",
            TupleValue::List(vec![
                vec![SqlValue::Int(1), SqlValue::Int(2)],
                vec![SqlValue::Int(3), SqlValue::Int(4)],
            ]),
        ))
    }

    #[test]
    fn test_in_list_becomes_surrogate_select() {
        let rewritten = transform_tuple(tuple_in()).unwrap();
        let mut binder = ValueBinder::new();
        assert_eq!(
            rewritten.sql(&mut binder).unwrap(),
            "1 = (SELECT 1 WHERE ((a = :c0 AND b = :c1) OR (a = :c2 AND b = :c3)))"
        );
        assert_eq!(binder.bindings().len(), 4);
    }

    #[test]
    fn test_group_count_matches_tuple_count() {
        let rewritten = transform_tuple(tuple_in()).unwrap();
        // 1 = (query); the query's WHERE holds one AND group per tuple.
        let Expr::Comparison(cmp) = rewritten else {
            panic!("expected comparison");
        };
        let Expr::Query(query) = *cmp.value else {
            panic!("expected surrogate query");
        };
        let mut and_groups = 0;
        query.traverse(&mut |child| {
            if child.kind() == ExprKind::Conditions {
                and_groups += 1;
            }
        });
        assert_eq!(and_groups, 2);
    }

    #[test]
    fn test_equality_single_tuple() {
        let expr = Expr::Tuple(TupleComparison::new(
            vec![Expr::field("a"), Expr::field("b")],
            "=",
            TupleValue::Single(vec![SqlValue::Int(1), SqlValue::Int(2)]),
        ));
        let mut binder = ValueBinder::new();
        assert_eq!(
            transform_tuple(expr).unwrap().sql(&mut binder).unwrap(),
            "1 = (SELECT 1 WHERE (a = :c0 AND b = :c1))"
        );
    }

    #[test]
    fn test_subquery_rhs_is_correlated() {
        let sub = SelectQuery::new()
            .select(Expr::field("x"))
            .select(Expr::field("y"))
            .from("pairs");
        let expr = Expr::Tuple(TupleComparison::new(
            vec![Expr::field("a"), Expr::field("b")],
            "IN",
            TupleValue::Query(Box::new(sub)),
        ));
        let mut binder = ValueBinder::new();
        assert_eq!(
            transform_tuple(expr).unwrap().sql(&mut binder).unwrap(),
            "1 = (SELECT 1 FROM pairs WHERE (a = x AND b = y))"
        );
        assert!(binder.is_empty());
    }

    #[test]
    fn test_disallowed_operator_is_rejected() {
        let expr = Expr::Tuple(TupleComparison::new(
            vec![Expr::field("a"), Expr::field("b")],
            "<",
            TupleValue::Single(vec![SqlValue::Int(1), SqlValue::Int(2)]),
        ));
        assert_eq!(
            transform_tuple(expr).unwrap_err(),
            ExpressionError::InvalidTupleOperator(String::from("<"))
        );
    }

    #[test]
    fn test_other_nodes_pass_through() {
        let field = Expr::field("a");
        assert_eq!(transform_tuple(field.clone()).unwrap(), field);
    }
}
