//! Index definitions for the canonical schema model.

use serde::{Deserialize, Serialize};

/// A named plain index.
///
/// Constraint-backed keys (primary, unique) are modeled as
/// [`ConstraintDefinition`](super::ConstraintDefinition)s; only plain
/// indexes live here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Index name.
    pub name: String,
    /// Covered columns, in index order.
    pub columns: Vec<String>,
    /// Optional per-column prefix lengths, keyed positionally.
    pub lengths: Vec<Option<u32>>,
    /// Covering-index payload columns, where the backend supports them.
    pub included_columns: Vec<String>,
}

impl IndexDefinition {
    /// Creates an index over the given columns.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        let lengths = vec![None; columns.len()];
        Self {
            name: name.into(),
            columns,
            lengths,
            included_columns: Vec::new(),
        }
    }

    /// Sets the per-column prefix lengths, matched positionally.
    #[must_use]
    pub fn lengths(mut self, lengths: Vec<Option<u32>>) -> Self {
        self.lengths = lengths;
        self
    }

    /// Sets the covering-index payload columns.
    #[must_use]
    pub fn include(mut self, columns: Vec<String>) -> Self {
        self.included_columns = columns;
        self
    }
}
