//! Constraint definitions for the canonical schema model.

use serde::{Deserialize, Serialize};

/// Foreign key referential action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferentialAction {
    /// No action.
    NoAction,
    /// Restrict deletion/update.
    Restrict,
    /// Cascade the operation.
    Cascade,
    /// Set to NULL.
    SetNull,
    /// Set to default value.
    SetDefault,
}

impl ReferentialAction {
    /// Returns the SQL representation of the action.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// The kind of a table constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Primary key.
    Primary,
    /// Unique key.
    Unique,
    /// Foreign key.
    Foreign,
}

/// A named table constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDefinition {
    /// Constraint name.
    pub name: String,
    /// Constraint kind.
    pub kind: ConstraintKind,
    /// Covered columns, in key order.
    pub columns: Vec<String>,
    /// Referenced table, foreign keys only.
    pub referenced_table: Option<String>,
    /// Referenced columns in key order, foreign keys only.
    pub referenced_columns: Vec<String>,
    /// ON UPDATE action, foreign keys only.
    pub on_update: Option<ReferentialAction>,
    /// ON DELETE action, foreign keys only.
    pub on_delete: Option<ReferentialAction>,
}

impl ConstraintDefinition {
    /// Creates a primary key constraint.
    #[must_use]
    pub fn primary(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: ConstraintKind::Primary,
            columns,
            referenced_table: None,
            referenced_columns: Vec::new(),
            on_update: None,
            on_delete: None,
        }
    }

    /// Creates a unique constraint.
    #[must_use]
    pub fn unique(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: ConstraintKind::Unique,
            columns,
            referenced_table: None,
            referenced_columns: Vec::new(),
            on_update: None,
            on_delete: None,
        }
    }

    /// Creates a foreign key constraint.
    #[must_use]
    pub fn foreign(
        name: impl Into<String>,
        columns: Vec<String>,
        referenced_table: impl Into<String>,
        referenced_columns: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ConstraintKind::Foreign,
            columns,
            referenced_table: Some(referenced_table.into()),
            referenced_columns,
            on_update: None,
            on_delete: None,
        }
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub const fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub const fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// The referenced columns collapsed to a scalar when single-column,
    /// for shape-compatible display.
    #[must_use]
    pub fn referenced_column_display(&self) -> Option<String> {
        match self.referenced_columns.as_slice() {
            [single] => Some(single.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_sql() {
        assert_eq!(ReferentialAction::Cascade.as_sql(), "CASCADE");
        assert_eq!(ReferentialAction::SetNull.as_sql(), "SET NULL");
        assert_eq!(ReferentialAction::NoAction.as_sql(), "NO ACTION");
    }

    #[test]
    fn test_foreign_key_builder() {
        let fk = ConstraintDefinition::foreign(
            "fk_posts_author",
            vec![String::from("author_id")],
            "users",
            vec![String::from("id")],
        )
        .on_delete(ReferentialAction::Cascade);

        assert_eq!(fk.kind, ConstraintKind::Foreign);
        assert_eq!(fk.referenced_table.as_deref(), Some("users"));
        assert_eq!(fk.on_delete, Some(ReferentialAction::Cascade));
        assert_eq!(fk.referenced_column_display().as_deref(), Some("id"));
    }

    #[test]
    fn test_multi_column_reference_stays_a_sequence() {
        let fk = ConstraintDefinition::foreign(
            "fk_parts",
            vec![String::from("a"), String::from("b")],
            "parts",
            vec![String::from("x"), String::from("y")],
        );
        assert_eq!(fk.referenced_column_display(), None);
        assert_eq!(fk.referenced_columns.len(), 2);
    }
}
