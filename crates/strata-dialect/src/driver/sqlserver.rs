//! SQL Server backend.

use strata_core::error::ExpressionError;
use strata_core::expression::{Expr, ExprKind, FunctionArg, FunctionExpr};
use strata_core::types::ColumnType;

use super::tuple::transform_tuple;
use super::{Backend, Feature, Translator};
use crate::config::DriverConfig;
use crate::schema::SqlserverSchemaDialect;

/// SQL Server backend rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlserver;

impl Sqlserver {
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

impl Backend for Sqlserver {
    type Dialect = SqlserverSchemaDialect;

    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn quote_start(&self) -> char {
        '['
    }

    fn quote_end(&self) -> char {
        ']'
    }

    fn supports(&self, feature: Feature, _version: Option<&str>) -> bool {
        match feature {
            Feature::Cte
            | Feature::Savepoint
            | Feature::WindowFunctions
            | Feature::Intersect
            | Feature::DisableConstraintWithoutTransaction => true,
            Feature::Json
            | Feature::IntersectAll
            | Feature::SetOperationOrderBy
            | Feature::TruncateWithConstraints => false,
        }
    }

    fn on_connect_sql(&self, config: &DriverConfig) -> Vec<String> {
        let _ = config;
        vec![
            String::from("SET ANSI_NULLS ON"),
            String::from("SET ANSI_PADDING ON"),
            String::from("SET ANSI_WARNINGS ON"),
            String::from("SET QUOTED_IDENTIFIER ON"),
            String::from("SET CONCAT_NULL_YIELDS_NULL ON"),
        ]
    }

    fn translators(&self) -> &'static [(ExprKind, Translator)] {
        TRANSLATORS
    }
}

/// Rewrites generic function calls into T-SQL idioms. CONCAT is native.
fn transform_function(expr: Expr) -> Result<Expr, ExpressionError> {
    let Expr::Function(mut func) = expr else {
        return Ok(expr);
    };
    let name = func.name.clone();
    match name.as_str() {
        "NOW" => {
            func = FunctionExpr::new("GETUTCDATE", vec![]);
            func.return_type = Some(ColumnType::Datetime);
        }
        // DATEPART(dw) follows the default DATEFIRST, under which
        // Sunday = 1 already.
        "DAYOFWEEK" => {
            func.set_name("DATEPART");
            func.prepend(FunctionArg::Literal(String::from("dw")));
        }
        "EXTRACT" => {
            func.set_name("DATEPART");
            func.set_conjunction(",");
        }
        // T-SQL DATEDIFF takes the unit as its first argument.
        "DATEDIFF" => {
            func.prepend(FunctionArg::Literal(String::from("day")));
        }
        _ => {}
    }
    Ok(Expr::Function(func))
}
