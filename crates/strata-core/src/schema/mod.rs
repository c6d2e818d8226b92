//! Canonical, backend-independent schema model.
//!
//! A [`TableSchema`] represents one table during an introspection or
//! definition pass: ordered columns, constraints and indexes. Dialects
//! populate it row by row when describing an existing table, or consume
//! it once when generating DDL. One schema belongs to exactly one pass.

mod column;
mod constraint;
mod index;

pub use column::{
    biginteger, boolean, datetime, decimal, integer, string, text, uuid, ColumnDefinition,
    DefaultValue, IdentityGeneration,
};
pub use constraint::{ConstraintDefinition, ConstraintKind, ReferentialAction};
pub use index::IndexDefinition;

use serde::{Deserialize, Serialize};

use crate::error::ExpressionError;
use crate::types::ColumnType;

/// The canonical representation of one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name, optionally schema-qualified with `.`.
    pub name: String,
    /// Whether the table is temporary.
    pub temporary: bool,
    columns: Vec<ColumnDefinition>,
    constraints: Vec<ConstraintDefinition>,
    indexes: Vec<IndexDefinition>,
}

impl TableSchema {
    /// Creates an empty schema for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            temporary: false,
            columns: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Marks the table as temporary.
    #[must_use]
    pub const fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    /// Appends a column. Column names are unique; re-adding a name is a
    /// caller error.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::DuplicateName`] on a name collision.
    pub fn add_column(&mut self, column: ColumnDefinition) -> Result<&mut Self, ExpressionError> {
        if self.column(&column.name).is_some() {
            return Err(ExpressionError::DuplicateName {
                table: self.name.clone(),
                name: column.name.clone(),
            });
        }
        self.columns.push(column);
        Ok(self)
    }

    /// Appends a constraint after checking that every referenced column
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::UnknownColumn`] when the constraint
    /// names a column the table does not have, and
    /// [`ExpressionError::DuplicateName`] on a name collision.
    pub fn add_constraint(
        &mut self,
        constraint: ConstraintDefinition,
    ) -> Result<&mut Self, ExpressionError> {
        if self.constraint(&constraint.name).is_some() {
            return Err(ExpressionError::DuplicateName {
                table: self.name.clone(),
                name: constraint.name.clone(),
            });
        }
        for column in &constraint.columns {
            if self.column(column).is_none() {
                return Err(ExpressionError::UnknownColumn {
                    table: self.name.clone(),
                    column: column.clone(),
                    referrer: constraint.name.clone(),
                });
            }
        }
        self.constraints.push(constraint);
        Ok(self)
    }

    /// Appends an index after checking that every covered column exists.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::UnknownColumn`] when the index names a
    /// column the table does not have, and
    /// [`ExpressionError::DuplicateName`] on a name collision.
    pub fn add_index(&mut self, index: IndexDefinition) -> Result<&mut Self, ExpressionError> {
        if self.index(&index.name).is_some() {
            return Err(ExpressionError::DuplicateName {
                table: self.name.clone(),
                name: index.name.clone(),
            });
        }
        for column in index.columns.iter().chain(&index.included_columns) {
            if self.column(column).is_none() {
                return Err(ExpressionError::UnknownColumn {
                    table: self.name.clone(),
                    column: column.clone(),
                    referrer: index.name.clone(),
                });
            }
        }
        self.indexes.push(index);
        Ok(self)
    }

    /// The columns, in creation/description order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// The constraints, in creation/description order.
    #[must_use]
    pub fn constraints(&self) -> &[ConstraintDefinition] {
        &self.constraints
    }

    /// The indexes, in creation/description order.
    #[must_use]
    pub fn indexes(&self) -> &[IndexDefinition] {
        &self.indexes
    }

    /// Looks a column up by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Mutable column lookup, used while folding catalog rows.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut ColumnDefinition> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Looks a constraint up by name.
    #[must_use]
    pub fn constraint(&self, name: &str) -> Option<&ConstraintDefinition> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Mutable constraint lookup, used while folding catalog rows.
    pub fn constraint_mut(&mut self, name: &str) -> Option<&mut ConstraintDefinition> {
        self.constraints.iter_mut().find(|c| c.name == name)
    }

    /// Looks an index up by name.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&IndexDefinition> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Mutable index lookup, used while folding catalog rows.
    pub fn index_mut(&mut self, name: &str) -> Option<&mut IndexDefinition> {
        self.indexes.iter_mut().find(|i| i.name == name)
    }

    /// The primary key constraint, if one is defined.
    #[must_use]
    pub fn primary_key(&self) -> Option<&ConstraintDefinition> {
        self.constraints
            .iter()
            .find(|c| c.kind == ConstraintKind::Primary)
    }

    /// Whether `column` is the single column of an integer-family
    /// primary key. Composite keys never qualify, regardless of types.
    #[must_use]
    pub fn is_single_integer_primary(&self, column: &str) -> bool {
        let Some(primary) = self.primary_key() else {
            return false;
        };
        if primary.columns.len() != 1 || primary.columns[0] != column {
            return false;
        }
        self.column(column)
            .is_some_and(|c| c.type_name.is_integer())
    }

    /// The column-name→type map, as consumed by CASE type inference.
    #[must_use]
    pub fn type_map(&self) -> std::collections::HashMap<String, ColumnType> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.type_name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posts() -> TableSchema {
        let mut schema = TableSchema::new("posts");
        schema
            .add_column(biginteger("id").not_null())
            .unwrap()
            .add_column(string("title", 255).not_null())
            .unwrap()
            .add_column(integer("author_id"))
            .unwrap();
        schema
    }

    #[test]
    fn test_columns_keep_insertion_order() {
        let schema = posts();
        let names: Vec<&str> = schema.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "title", "author_id"]);
    }

    #[test]
    fn test_duplicate_column_is_rejected() {
        let mut schema = posts();
        let err = schema.add_column(integer("id")).unwrap_err();
        assert_eq!(
            err,
            ExpressionError::DuplicateName {
                table: String::from("posts"),
                name: String::from("id"),
            }
        );
    }

    #[test]
    fn test_constraint_on_missing_column_is_rejected() {
        let mut schema = posts();
        let err = schema
            .add_constraint(ConstraintDefinition::unique(
                "uq_posts_slug",
                vec![String::from("slug")],
            ))
            .unwrap_err();
        assert_eq!(
            err,
            ExpressionError::UnknownColumn {
                table: String::from("posts"),
                column: String::from("slug"),
                referrer: String::from("uq_posts_slug"),
            }
        );
    }

    #[test]
    fn test_index_on_missing_column_is_rejected() {
        let mut schema = posts();
        assert!(schema
            .add_index(IndexDefinition::new(
                "ix_missing",
                vec![String::from("nope")]
            ))
            .is_err());
    }

    #[test]
    fn test_single_integer_primary_detection() {
        let mut schema = posts();
        schema
            .add_constraint(ConstraintDefinition::primary(
                "primary",
                vec![String::from("id")],
            ))
            .unwrap();
        assert!(schema.is_single_integer_primary("id"));
        assert!(!schema.is_single_integer_primary("title"));
    }

    #[test]
    fn test_composite_primary_never_qualifies() {
        let mut schema = posts();
        schema
            .add_constraint(ConstraintDefinition::primary(
                "primary",
                vec![String::from("id"), String::from("author_id")],
            ))
            .unwrap();
        assert!(!schema.is_single_integer_primary("id"));
        assert!(!schema.is_single_integer_primary("author_id"));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut schema = posts();
        schema
            .add_constraint(ConstraintDefinition::primary(
                "primary",
                vec![String::from("id")],
            ))
            .unwrap();
        let json = serde_json::to_string(&schema).unwrap();
        let back: TableSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(schema, back);
    }
}
