//! SQLite backend.

use strata_core::error::ExpressionError;
use strata_core::expression::{Expr, ExprKind, FunctionArg, FunctionExpr};
use strata_core::types::ColumnType;

use super::tuple::transform_tuple;
use super::{version_at_least, Backend, Feature, Translator};
use crate::config::DriverConfig;
use crate::schema::SqliteSchemaDialect;

/// SQLite backend rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Sqlite {
    /// Creates the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

static TRANSLATORS: &[(ExprKind, Translator)] = &[
    (ExprKind::Function, transform_function),
    (ExprKind::Tuple, transform_tuple),
];

impl Backend for Sqlite {
    type Dialect = SqliteSchemaDialect;

    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn supports(&self, feature: Feature, version: Option<&str>) -> bool {
        match feature {
            Feature::Cte | Feature::Savepoint | Feature::Intersect => true,
            // JSON functions ship with 3.38, window functions with 3.25.
            Feature::Json => version.is_some_and(|v| version_at_least(v, 3, 38)),
            Feature::WindowFunctions => version.is_some_and(|v| version_at_least(v, 3, 25)),
            Feature::DisableConstraintWithoutTransaction => true,
            Feature::IntersectAll
            | Feature::SetOperationOrderBy
            | Feature::TruncateWithConstraints => false,
        }
    }

    fn on_connect_sql(&self, config: &DriverConfig) -> Vec<String> {
        let _ = config;
        vec![String::from("PRAGMA foreign_keys = ON")]
    }

    fn translators(&self) -> &'static [(ExprKind, Translator)] {
        TRANSLATORS
    }
}

/// Rewrites generic function calls into SQLite idioms.
fn transform_function(expr: Expr) -> Result<Expr, ExpressionError> {
    let Expr::Function(mut func) = expr else {
        return Ok(expr);
    };
    let name = func.name.clone();
    match name.as_str() {
        "CONCAT" => {
            func.set_name("");
            func.set_conjunction(" ||");
        }
        // Day counts come from julian day numbers.
        "DATEDIFF" => {
            let args = std::mem::take(&mut func.args);
            let mut difference = FunctionExpr::new(
                "",
                args.into_iter()
                    .map(|arg| {
                        FunctionArg::Expr(Box::new(Expr::Function(FunctionExpr::new(
                            "JULIANDAY",
                            vec![arg],
                        ))))
                    })
                    .collect(),
            );
            difference.set_conjunction(" -");
            func = FunctionExpr::new(
                "ROUND",
                vec![FunctionArg::Expr(Box::new(Expr::Function(difference)))],
            );
            func.return_type = Some(ColumnType::Integer);
        }
        "NOW" => {
            func = FunctionExpr::new("DATETIME", vec![FunctionArg::Literal(String::from("'now'"))]);
            func.return_type = Some(ColumnType::Datetime);
        }
        "CURRENT_DATE" => {
            func = FunctionExpr::new("DATE", vec![FunctionArg::Literal(String::from("'now'"))]);
            func.return_type = Some(ColumnType::Date);
        }
        "CURRENT_TIME" => {
            func = FunctionExpr::new("TIME", vec![FunctionArg::Literal(String::from("'now'"))]);
            func.return_type = Some(ColumnType::Time);
        }
        // STRFTIME('%w') counts Sunday as 0; shift so Sunday = 1.
        "DAYOFWEEK" => {
            let mut strftime = FunctionExpr::new("STRFTIME", std::mem::take(&mut func.args));
            strftime.prepend(FunctionArg::Literal(String::from("'%w'")));
            let mut shifted = FunctionExpr::new(
                "",
                vec![
                    FunctionArg::Expr(Box::new(Expr::Function(strftime))),
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
