//! Canonical column types.
//!
//! The abstract, backend-independent column type vocabulary. Dialects map
//! these to and from native type names; nothing here knows any backend's
//! syntax. `Custom` is the escape hatch for backend types outside the
//! canonical set.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Backend-independent column type tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Variable-length string with a length limit.
    String,
    /// Unlimited text.
    Text,
    /// Fixed-length character string.
    Char,
    /// 1-byte integer.
    TinyInteger,
    /// 2-byte integer.
    SmallInteger,
    /// 4-byte integer.
    Integer,
    /// 8-byte integer.
    BigInteger,
    /// Exact decimal with precision and scale.
    Decimal,
    /// Floating point.
    Float,
    /// Boolean.
    Boolean,
    /// Date only.
    Date,
    /// Time only.
    Time,
    /// Date and time, second precision.
    Datetime,
    /// Date and time with fractional seconds.
    DatetimeFractional,
    /// Timestamp, second precision.
    Timestamp,
    /// Timestamp with fractional seconds.
    TimestampFractional,
    /// Timestamp carrying timezone information.
    TimestampTimezone,
    /// UUID stored natively.
    Uuid,
    /// Binary data.
    Binary,
    /// UUID stored as 16-byte binary.
    BinaryUuid,
    /// JSON document.
    Json,
    /// Generic geometry.
    Geometry,
    /// Point geometry.
    Point,
    /// Line-string geometry.
    LineString,
    /// Polygon geometry.
    Polygon,
    /// Backend-specific type outside the canonical set; rendered verbatim.
    Custom(String),
}

impl ColumnType {
    /// Returns the canonical tag string for this type.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Char => "char",
            Self::TinyInteger => "tinyinteger",
            Self::SmallInteger => "smallinteger",
            Self::Integer => "integer",
            Self::BigInteger => "biginteger",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Time => "time",
            Self::Datetime => "datetime",
            Self::DatetimeFractional => "datetimefractional",
            Self::Timestamp => "timestamp",
            Self::TimestampFractional => "timestampfractional",
            Self::TimestampTimezone => "timestamptimezone",
            Self::Uuid => "uuid",
            Self::Binary => "binary",
            Self::BinaryUuid => "binaryuuid",
            Self::Json => "json",
            Self::Geometry => "geometry",
            Self::Point => "point",
            Self::LineString => "linestring",
            Self::Polygon => "polygon",
            Self::Custom(name) => name,
        }
    }

    /// Parses a canonical tag string. Unknown tags become `Custom`.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        match tag {
            "string" => Self::String,
            "text" => Self::Text,
            "char" => Self::Char,
            "tinyinteger" => Self::TinyInteger,
            "smallinteger" => Self::SmallInteger,
            "integer" => Self::Integer,
            "biginteger" => Self::BigInteger,
            "decimal" => Self::Decimal,
            "float" => Self::Float,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" => Self::Datetime,
            "datetimefractional" => Self::DatetimeFractional,
            "timestamp" => Self::Timestamp,
            "timestampfractional" => Self::TimestampFractional,
            "timestamptimezone" => Self::TimestampTimezone,
            "uuid" => Self::Uuid,
            "binary" => Self::Binary,
            "binaryuuid" => Self::BinaryUuid,
            "json" => Self::Json,
            "geometry" => Self::Geometry,
            "point" => Self::Point,
            "linestring" => Self::LineString,
            "polygon" => Self::Polygon,
            other => Self::Custom(String::from(other)),
        }
    }

    /// Whether this is one of the integer family types.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::TinyInteger | Self::SmallInteger | Self::Integer | Self::BigInteger
        )
    }

    /// Whether collations apply to this type.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::String | Self::Text | Self::Char)
    }

    /// Whether this is a date-and-time type (the fractional fold applies).
    #[must_use]
    pub const fn is_datetime(&self) -> bool {
        matches!(
            self,
            Self::Datetime
                | Self::DatetimeFractional
                | Self::Timestamp
                | Self::TimestampFractional
                | Self::TimestampTimezone
        )
    }

    /// Whether this is one of the geospatial types (the SRID applies).
    #[must_use]
    pub const fn is_geospatial(&self) -> bool {
        matches!(
            self,
            Self::Geometry | Self::Point | Self::LineString | Self::Polygon
        )
    }

    /// Folds a fractional date-time type down to its plain variant.
    /// Types outside the fractional family are returned unchanged.
    #[must_use]
    pub fn without_fraction(self) -> Self {
        match self {
            Self::DatetimeFractional => Self::Datetime,
            Self::TimestampFractional => Self::Timestamp,
            other => other,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for tag in [
            "string",
            "integer",
            "biginteger",
            "timestampfractional",
            "binaryuuid",
            "point",
        ] {
            assert_eq!(ColumnType::parse(tag).name(), tag);
        }
    }

    #[test]
    fn test_unknown_tag_is_custom() {
        let t = ColumnType::parse("tsvector");
        assert_eq!(t, ColumnType::Custom(String::from("tsvector")));
        assert_eq!(t.name(), "tsvector");
    }

    #[test]
    fn test_family_predicates() {
        assert!(ColumnType::BigInteger.is_integer());
        assert!(!ColumnType::Decimal.is_integer());
        assert!(ColumnType::Char.is_text());
        assert!(!ColumnType::Binary.is_text());
        assert!(ColumnType::TimestampTimezone.is_datetime());
        assert!(ColumnType::Point.is_geospatial());
    }

    #[test]
    fn test_fractional_fold() {
        assert_eq!(
            ColumnType::DatetimeFractional.without_fraction(),
            ColumnType::Datetime
        );
        assert_eq!(
            ColumnType::TimestampFractional.without_fraction(),
            ColumnType::Timestamp
        );
        assert_eq!(ColumnType::Date.without_fraction(), ColumnType::Date);
    }
}
