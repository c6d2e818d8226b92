//! Column definitions for the canonical schema model.

use serde::{Deserialize, Serialize};

use crate::types::ColumnType;

/// Default value for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// Boolean default.
    Boolean(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default.
    Str(String),
    /// Raw SQL expression (e.g., CURRENT_TIMESTAMP).
    Expression(String),
}

impl DefaultValue {
    /// Whether this default is one of the current-timestamp keywords,
    /// which render unquoted and upper-cased.
    #[must_use]
    pub fn is_current_timestamp(&self) -> bool {
        match self {
            Self::Expression(expr) => {
                let upper = expr.to_uppercase();
                upper == "CURRENT_TIMESTAMP"
                    || upper == "CURRENT_TIMESTAMP()"
                    || upper == "NOW()"
                    || upper == "GETDATE()"
                    || upper == "GETUTCDATE()"
            }
            _ => false,
        }
    }
}

/// How an identity column generates its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityGeneration {
    /// `GENERATED ALWAYS AS IDENTITY`.
    Always,
    /// `GENERATED BY DEFAULT AS IDENTITY`.
    ByDefault,
}

impl IdentityGeneration {
    /// Returns the SQL keyword for the generation clause.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Always => "ALWAYS",
            Self::ByDefault => "BY DEFAULT",
        }
    }
}

/// A complete canonical column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// Canonical type, or `Custom` for backend-specific types.
    pub type_name: ColumnType,
    /// Character or display length.
    pub length: Option<u32>,
    /// Total digits for decimals, fractional-second digits for datetimes.
    pub precision: Option<u32>,
    /// Digits after the decimal point.
    pub scale: Option<u32>,
    /// Whether the column is nullable.
    pub nullable: bool,
    /// Default value.
    pub default: Option<DefaultValue>,
    /// Collation for text columns.
    pub collation: Option<String>,
    /// Column comment.
    pub comment: Option<String>,
    /// Whether this column auto-increments. `None` leaves the decision
    /// to the dialect's primary-key convention.
    pub auto_increment: Option<bool>,
    /// Identity generation clause, where the backend has one.
    pub identity: Option<IdentityGeneration>,
    /// Whether the integer column is unsigned.
    pub unsigned: bool,
    /// Whether the temporal column is timezone-aware.
    pub timezone: bool,
    /// Spatial reference identifier, geospatial columns only.
    pub srid: Option<u32>,
}

impl ColumnDefinition {
    /// Creates a column definition with the given name and type.
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: ColumnType) -> Self {
        Self {
            name: name.into(),
            type_name,
            length: None,
            precision: None,
            scale: None,
            nullable: true,
            default: None,
            collation: None,
            comment: None,
            auto_increment: None,
            identity: None,
            unsigned: false,
            timezone: false,
            srid: None,
        }
    }

    /// Sets the length.
    #[must_use]
    pub const fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets precision and scale.
    #[must_use]
    pub const fn precision_scale(mut self, precision: u32, scale: u32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Sets fractional-second precision.
    #[must_use]
    pub const fn precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Marks the column as NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Sets the collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Sets the comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Marks the column as auto-incrementing (or explicitly not).
    #[must_use]
    pub const fn auto_increment(mut self, enabled: bool) -> Self {
        self.auto_increment = Some(enabled);
        self
    }

    /// Sets the identity generation clause.
    #[must_use]
    pub const fn identity(mut self, generation: IdentityGeneration) -> Self {
        self.identity = Some(generation);
        self
    }

    /// Marks the integer column as unsigned.
    #[must_use]
    pub const fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    /// Marks the temporal column as timezone-aware.
    #[must_use]
    pub const fn with_timezone(mut self) -> Self {
        self.timezone = true;
        self
    }

    /// Sets the spatial reference identifier.
    #[must_use]
    pub const fn srid(mut self, srid: u32) -> Self {
        self.srid = Some(srid);
        self
    }
}

// =============================================================================
// Shorthand Constructors for Common Types
// =============================================================================

/// Creates a string (varchar) column definition.
#[must_use]
pub fn string(name: impl Into<String>, length: u32) -> ColumnDefinition {
    ColumnDefinition::new(name, ColumnType::String).length(length)
}

/// Creates a text column definition.
#[must_use]
pub fn text(name: impl Into<String>) -> ColumnDefinition {
    ColumnDefinition::new(name, ColumnType::Text)
}

/// Creates an integer column definition.
#[must_use]
pub fn integer(name: impl Into<String>) -> ColumnDefinition {
    ColumnDefinition::new(name, ColumnType::Integer)
}

/// Creates a big integer column definition.
#[must_use]
pub fn biginteger(name: impl Into<String>) -> ColumnDefinition {
    ColumnDefinition::new(name, ColumnType::BigInteger)
}

/// Creates a decimal column definition.
#[must_use]
pub fn decimal(name: impl Into<String>, precision: u32, scale: u32) -> ColumnDefinition {
    ColumnDefinition::new(name, ColumnType::Decimal).precision_scale(precision, scale)
}

/// Creates a boolean column definition.
#[must_use]
pub fn boolean(name: impl Into<String>) -> ColumnDefinition {
    ColumnDefinition::new(name, ColumnType::Boolean)
}

/// Creates a datetime column definition.
#[must_use]
pub fn datetime(name: impl Into<String>) -> ColumnDefinition {
    ColumnDefinition::new(name, ColumnType::Datetime)
}

/// Creates a UUID column definition.
#[must_use]
pub fn uuid(name: impl Into<String>) -> ColumnDefinition {
    ColumnDefinition::new(name, ColumnType::Uuid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_column() {
        let col = integer("id");
        assert_eq!(col.name, "id");
        assert_eq!(col.type_name, ColumnType::Integer);
        assert!(col.nullable);
        assert_eq!(col.auto_increment, None);
    }

    #[test]
    fn test_builder_chain() {
        let col = string("username", 255)
            .not_null()
            .collation("C")
            .comment("login name");
        assert_eq!(col.length, Some(255));
        assert!(!col.nullable);
        assert_eq!(col.collation.as_deref(), Some("C"));
        assert_eq!(col.comment.as_deref(), Some("login name"));
    }

    #[test]
    fn test_current_timestamp_detection() {
        assert!(DefaultValue::Expression(String::from("current_timestamp")).is_current_timestamp());
        assert!(DefaultValue::Expression(String::from("NOW()")).is_current_timestamp());
        assert!(!DefaultValue::Str(String::from("CURRENT_TIMESTAMP")).is_current_timestamp());
        assert!(!DefaultValue::Expression(String::from("uuid()")).is_current_timestamp());
    }

    #[test]
    fn test_identity_sql() {
        assert_eq!(IdentityGeneration::Always.as_sql(), "ALWAYS");
        assert_eq!(IdentityGeneration::ByDefault.as_sql(), "BY DEFAULT");
    }
}
