//! Placeholder allocation and value binding.
//!
//! A [`ValueBinder`] lives for exactly one compiled statement: expressions
//! ask it for fresh placeholder tokens while rendering and register the
//! values those tokens stand for. The ordered binding list is handed to the
//! driver together with the SQL text. A new statement gets a new binder;
//! there is no partial reset.

use crate::types::ColumnType;
use crate::value::SqlValue;

/// A recorded (placeholder, value, type) triple.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// The placeholder token, including the leading `:`.
    pub placeholder: String,
    /// The bound value.
    pub value: SqlValue,
    /// Declared type, or `None` for "infer/pass through".
    pub type_name: Option<ColumnType>,
}

/// Allocates placeholders and records bound values for one statement.
#[derive(Debug, Clone, Default)]
pub struct ValueBinder {
    counter: u32,
    bindings: Vec<Binding>,
}

impl ValueBinder {
    /// Creates an empty binder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh placeholder token derived from `prefix` and an
    /// incrementing counter. Tokens are unique within this binder's
    /// lifetime.
    pub fn placeholder(&mut self, prefix: &str) -> String {
        let token = format!(":{prefix}{}", self.counter);
        self.counter += 1;
        token
    }

    /// Records `value` for `placeholder`. `type_name` may be `None`,
    /// meaning the driver infers or passes the value through.
    pub fn bind(&mut self, placeholder: String, value: SqlValue, type_name: Option<ColumnType>) {
        self.bindings.push(Binding {
            placeholder,
            value,
            type_name,
        });
    }

    /// Allocates a placeholder and binds `value` to it in one step,
    /// returning the token.
    pub fn bind_value(
        &mut self,
        prefix: &str,
        value: SqlValue,
        type_name: Option<ColumnType>,
    ) -> String {
        let token = self.placeholder(prefix);
        self.bind(token.clone(), value, type_name);
        token
    }

    /// The recorded bindings, in bind order.
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Looks up the value bound to `placeholder`.
    #[must_use]
    pub fn value_for(&self, placeholder: &str) -> Option<&SqlValue> {
        self.bindings
            .iter()
            .find(|b| b.placeholder == placeholder)
            .map(|b| &b.value)
    }

    /// Number of recorded bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true when no values have been bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_are_unique() {
        let mut binder = ValueBinder::new();
        assert_eq!(binder.placeholder("c"), ":c0");
        assert_eq!(binder.placeholder("c"), ":c1");
        assert_eq!(binder.placeholder("param"), ":param2");
    }

    #[test]
    fn test_bindings_keep_order() {
        let mut binder = ValueBinder::new();
        binder.bind_value("c", SqlValue::Int(1), Some(ColumnType::Integer));
        binder.bind_value("c", SqlValue::Text(String::from("x")), None);

        let bindings = binder.bindings();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].placeholder, ":c0");
        assert_eq!(bindings[0].type_name, Some(ColumnType::Integer));
        assert_eq!(bindings[1].placeholder, ":c1");
        assert_eq!(bindings[1].value, SqlValue::Text(String::from("x")));
    }

    #[test]
    fn test_value_lookup() {
        let mut binder = ValueBinder::new();
        let token = binder.bind_value("c", SqlValue::Bool(true), None);
        assert_eq!(binder.value_for(&token), Some(&SqlValue::Bool(true)));
        assert_eq!(binder.value_for(":missing"), None);
    }
}
