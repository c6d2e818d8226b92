//! A minimal SELECT query carrier.
//!
//! Just enough of a query to serve as a subquery argument and as the
//! surrogate built by tuple-comparison rewrites: a select list, an
//! optional FROM table and an optional WHERE tree. The full query
//! builder is an external collaborator and is not modeled here.

use crate::binder::ValueBinder;
use crate::error::ExpressionError;
use crate::expression::{ConditionSet, Conjunction, Expr};

/// A minimal `SELECT ... [FROM ...] [WHERE ...]` query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectQuery {
    select: Vec<Expr>,
    from: Option<String>,
    where_clause: Option<ConditionSet>,
}

impl SelectQuery {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a select item.
    #[must_use]
    pub fn select(mut self, item: Expr) -> Self {
        self.select.push(item);
        self
    }

    /// Sets the FROM table.
    #[must_use]
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.from = Some(table.into());
        self
    }

    /// Sets the WHERE tree, replacing any previous one.
    #[must_use]
    pub fn where_clause(mut self, conditions: ConditionSet) -> Self {
        self.where_clause = Some(conditions);
        self
    }

    /// ANDs a condition into the WHERE tree, creating it when absent.
    pub fn and_where(&mut self, condition: Expr) {
        match &mut self.where_clause {
            Some(set) => set.add(condition),
            None => {
                let mut set = ConditionSet::new(Conjunction::And);
                set.add(condition);
                self.where_clause = Some(set);
            }
        }
    }

    /// Replaces the whole select list.
    pub fn replace_select(&mut self, items: Vec<Expr>) {
        self.select = items;
    }

    /// The current select list.
    #[must_use]
    pub fn select_items(&self) -> &[Expr] {
        &self.select
    }

    /// Renders the query.
    ///
    /// # Errors
    ///
    /// Propagates rendering errors from the contained expressions.
    pub fn sql(&self, binder: &mut ValueBinder) -> Result<String, ExpressionError> {
        let items: Vec<String> = self
            .select
            .iter()
            .map(|item| item.sql(binder))
            .collect::<Result<_, _>>()?;
        let mut out = format!("SELECT {}", items.join(", "));
        if let Some(from) = &self.from {
            out.push_str(" FROM ");
            out.push_str(from);
        }
        if let Some(where_clause) = &self.where_clause {
            if !where_clause.is_empty() {
                out.push_str(" WHERE ");
                out.push_str(&where_clause.sql(binder)?);
            }
        }
        Ok(out)
    }

    /// Calls `visitor` once per direct child expression.
    pub fn traverse(&self, visitor: &mut dyn FnMut(&Expr)) {
        for item in &self.select {
            visitor(item);
        }
        if let Some(where_clause) = &self.where_clause {
            for part in &where_clause.parts {
                visitor(part);
            }
        }
    }

    /// Rebuilds the contained expressions bottom-up through `f`.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `f`.
    pub fn rewrite(
        mut self,
        f: &mut dyn FnMut(Expr) -> Result<Expr, ExpressionError>,
    ) -> Result<Self, ExpressionError> {
        self.select = self
            .select
            .into_iter()
            .map(|item| item.rewrite(f))
            .collect::<Result<_, _>>()?;
        self.where_clause = match self.where_clause {
            Some(mut where_clause) => {
                where_clause.parts = where_clause
                    .parts
                    .into_iter()
                    .map(|part| part.rewrite(f))
                    .collect::<Result<_, _>>()?;
                Some(where_clause)
            }
            None => None,
        };
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ComparisonExpr;
    use crate::value::SqlValue;

    #[test]
    fn test_select_from_where() {
        let mut binder = ValueBinder::new();
        let mut query = SelectQuery::new()
            .select(Expr::field("id"))
            .select(Expr::field("title"))
            .from("posts");
        query.and_where(Expr::Comparison(ComparisonExpr::eq(
            "author_id",
            SqlValue::Int(3),
        )));

        assert_eq!(
            query.sql(&mut binder).unwrap(),
            "SELECT id, title FROM posts WHERE author_id = :c0"
        );
    }

    #[test]
    fn test_replace_select() {
        let mut binder = ValueBinder::new();
        let mut query = SelectQuery::new().select(Expr::field("a")).from("t");
        query.replace_select(vec![Expr::literal("1")]);
        assert_eq!(query.sql(&mut binder).unwrap(), "SELECT 1 FROM t");
    }

    #[test]
    fn test_and_where_accumulates() {
        let mut binder = ValueBinder::new();
        let mut query = SelectQuery::new().select(Expr::literal("1"));
        query.and_where(Expr::Comparison(ComparisonExpr::eq("a", SqlValue::Int(1))));
        query.and_where(Expr::Comparison(ComparisonExpr::eq("b", SqlValue::Int(2))));
        assert_eq!(
            query.sql(&mut binder).unwrap(),
            "SELECT 1 WHERE (a = :c0 AND b = :c1)"
        );
    }
}
