//! PostgreSQL backend.

use strata_core::error::ExpressionError;
use strata_core::expression::{Expr, ExprKind, FunctionArg, FunctionExpr};
use strata_core::types::ColumnType;

use super::{Backend, Feature, Translator};
use crate::config::DriverConfig;
use crate::schema::PostgresSchemaDialect;

/// PostgreSQL backend rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Postgres {
    /// Creates the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

static TRANSLATORS: &[(ExprKind, Translator)] = &[(ExprKind::Function, transform_function)];

impl Backend for Postgres {
    type Dialect = PostgresSchemaDialect;

    fn name(&self) -> &'static str {
        "postgres"
    }

    fn supports(&self, feature: Feature, _version: Option<&str>) -> bool {
        match feature {
            Feature::Cte
            | Feature::Json
            | Feature::Savepoint
            | Feature::WindowFunctions
            | Feature::Intersect
            | Feature::IntersectAll
            | Feature::SetOperationOrderBy
            | Feature::TruncateWithConstraints => true,
            Feature::DisableConstraintWithoutTransaction => false,
        }
    }

    fn on_connect_sql(&self, config: &DriverConfig) -> Vec<String> {
        let mut statements = Vec::new();
        if let Some(encoding) = &config.encoding {
            statements.push(format!("SET client_encoding = '{encoding}'"));
        }
        if let Some(schema) = &config.schema {
            statements.push(format!("SET search_path TO {schema}"));
        }
        if let Some(timezone) = &config.timezone {
            statements.push(format!("SET timezone = '{timezone}'"));
        }
        statements
    }

    fn translators(&self) -> &'static [(ExprKind, Translator)] {
        TRANSLATORS
    }
}

/// Rewrites generic function calls into PostgreSQL idioms.
fn transform_function(expr: Expr) -> Result<Expr, ExpressionError> {
    let Expr::Function(mut func) = expr else {
        return Ok(expr);
    };
    let name = func.name.clone();
    match name.as_str() {
        // CONCAT is expressed as the infix a || b form.
        "CONCAT" => {
            func.set_name("");
            func.set_conjunction(" ||");
        }
        // DATEDIFF becomes a subtraction of two DATE() casts.
        "DATEDIFF" => {
            let args = std::mem::take(&mut func.args);
            func.args = args
                .into_iter()
                .map(|arg| {
                    FunctionArg::Expr(Box::new(Expr::Function(FunctionExpr::new(
                        "DATE",
                        vec![arg],
                    ))))
                })
                .collect();
            func.set_name("");
            func.set_conjunction(" -");
        }
        // EXTRACT(DOW) counts Sunday as 0; shift so Sunday = 1.
        "DAYOFWEEK" => {
            let mut extract = FunctionExpr::new("EXTRACT", std::mem::take(&mut func.args));
            extract.prepend(FunctionArg::Literal(String::from("DOW FROM")));
            extract.set_conjunction("");
            let mut shifted = FunctionExpr::new(
                "",
                vec![
                    FunctionArg::Expr(Box::new(Expr::Function(extract))),
                    FunctionArg::Literal(String::from("1")),
                ],
            );
            shifted.set_conjunction(" +");
            shifted.return_type = Some(ColumnType::Integer);
            func = shifted;
        }
        "RAND" => func.set_name("RANDOM"),
        _ => {}
    }
    Ok(Expr::Function(func))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::binder::ValueBinder;

    fn compile(expr: Expr) -> (String, usize) {
        let rewritten = transform_function(expr).unwrap();
        let mut binder = ValueBinder::new();
        let sql = rewritten.sql(&mut binder).unwrap();
        (sql, binder.bindings().len())
    }

    #[test]
    fn test_concat_becomes_infix() {
        let expr = Expr::Function(FunctionExpr::new(
            "CONCAT",
            vec![
                FunctionArg::Identifier(String::from("a")),
                FunctionArg::Literal(String::from("' '")),
                FunctionArg::Identifier(String::from("b")),
            ],
        ));
        let (sql, bound) = compile(expr);
        assert_eq!(sql, "a || ' ' || b");
        assert_eq!(bound, 0);
    }

    #[test]
    fn test_datediff_becomes_date_subtraction() {
        let expr = Expr::Function(FunctionExpr::new(
            "DATEDIFF",
            vec![
                FunctionArg::Identifier(String::from("finished")),
                FunctionArg::Identifier(String::from("started")),
            ],
        ));
        let (sql, _) = compile(expr);
        assert_eq!(sql, "DATE(finished) - DATE(started)");
    }

    #[test]
    fn test_dayofweek_counts_sunday_as_one() {
        let expr = Expr::Function(FunctionExpr::new(
            "DAYOFWEEK",
            vec![FunctionArg::Identifier(String::from("created"))],
        ));
        let (sql, _) = compile(expr);
        assert_eq!(sql, "EXTRACT(DOW FROM created) + 1");
    }

    #[test]
    fn test_unknown_functions_pass_through() {
        let expr = Expr::Function(FunctionExpr::new(
            "LOWER",
            vec![FunctionArg::Identifier(String::from("title"))],
        ));
        let (sql, _) = compile(expr);
        assert_eq!(sql, "LOWER(title)");
    }

    #[test]
    fn test_feature_matrix() {
        let backend = Postgres::new();
        assert!(backend.supports(Feature::Cte, None));
        assert!(backend.supports(Feature::Json, None));
        assert!(!backend.supports(Feature::DisableConstraintWithoutTransaction, None));
    }
}
