//! SQLite schema dialect.
//!
//! Introspection reads the `PRAGMA` pseudo-tables rather than a catalog
//! schema. SQLite cannot alter constraints after table creation, so
//! [`add_constraint_sql`](SchemaDialect::add_constraint_sql) and
//! [`drop_constraint_sql`](SchemaDialect::drop_constraint_sql) are
//! documented no-ops returning no statements, and column comments are
//! not representable.

use std::sync::OnceLock;

use regex::Regex;

use strata_core::schema::{
    ColumnDefinition, ConstraintDefinition, ConstraintKind, DefaultValue, ReferentialAction,
    TableSchema,
};
use strata_core::types::ColumnType;
use strata_core::value::SqlValue;

use super::{
    add_key_column, constraint_fragment, create_table_body, key_kind, quote_all, render_default,
    split_type_args, unwrap_string_default, KeyKind, SchemaDialect, TableName,
};
use crate::config::DriverConfig;
use crate::connection::{Connection, Params, Row};
use crate::error::DialectError;

/// Schema dialect for SQLite: `PRAGMA` introspection and SQLite DDL
/// generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteSchemaDialect;

static TYPE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn type_pattern() -> &'static Regex {
    TYPE_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(unsigned\s+)?([a-z]+)\s*(?:\(([0-9,\s]+)\))?(\s+unsigned)?$")
            .expect("valid type pattern")
    })
}

impl SqliteSchemaDialect {
    /// Creates the dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parses a native SQLite type string into canonical form:
    /// (type, length, precision, scale, unsigned).
    fn parse_type(
        column: &str,
        raw: &str,
    ) -> Result<(ColumnType, Option<u32>, Option<u32>, Option<u32>, bool), DialectError> {
        let unparsable = || DialectError::UnparsableType {
            column: String::from(column),
            raw: String::from(raw),
        };
        let captures = type_pattern().captures(raw.trim()).ok_or_else(unparsable)?;
        let unsigned = captures.get(1).is_some() || captures.get(4).is_some();
        let base = captures
            .get(2)
            .map(|m| m.as_str().to_lowercase())
            .ok_or_else(unparsable)?;
        let (first, second) = captures
            .get(3)
            .map_or((None, None), |m| split_type_args(m.as_str()));

        let result = match base.as_str() {
            // tinyint(1) is the conventional boolean spelling.
            "tinyint" if first == Some(1) => (ColumnType::Boolean, None, None, None),
            "tinyint" => (ColumnType::TinyInteger, first, None, None),
            "smallint" => (ColumnType::SmallInteger, first, None, None),
            "int" | "integer" | "mediumint" => (ColumnType::Integer, first, None, None),
            "bigint" => (ColumnType::BigInteger, first, None, None),
            "varchar" | "nvarchar" => (ColumnType::String, first, None, None),
            "char" if first == Some(36) => (ColumnType::Uuid, None, None, None),
            "char" | "nchar" => (ColumnType::Char, first, None, None),
            "binary" if first == Some(16) => (ColumnType::BinaryUuid, None, None, None),
            "binary" | "varbinary" | "blob" => (ColumnType::Binary, first, None, None),
            "text" | "clob" => (ColumnType::Text, None, None, None),
            "float" | "real" | "double" => (ColumnType::Float, None, first, second),
            "decimal" | "numeric" => (ColumnType::Decimal, None, first, second),
            "boolean" | "bool" => (ColumnType::Boolean, None, None, None),
            "date" => (ColumnType::Date, None, None, None),
            "time" => (ColumnType::Time, None, None, None),
            "datetime" => match first {
                Some(0) | None => (ColumnType::Datetime, None, None, None),
                Some(p) => (ColumnType::DatetimeFractional, None, Some(p), None),
            },
            "timestamp" => match first {
                Some(0) | None => (ColumnType::Timestamp, None, None, None),
                Some(p) => (ColumnType::TimestampFractional, None, Some(p), None),
            },
            "timestamptz" => (ColumnType::TimestampTimezone, None, first, None),
            "uuid" => (ColumnType::Uuid, None, None, None),
            "json" => (ColumnType::Json, None, None, None),
            "geometry" => (ColumnType::Geometry, None, None, None),
            "point" => (ColumnType::Point, None, None, None),
            "linestring" => (ColumnType::LineString, None, None, None),
            "polygon" => (ColumnType::Polygon, None, None, None),
            _ => (ColumnType::Custom(base.clone()), first, None, None),
        };
        let (type_name, length, precision, scale) = result;
        Ok((type_name, length, precision, scale, unsigned))
    }

    /// The backend's native spelling of a canonical column type.
    fn native_type(column: &ColumnDefinition) -> String {
        let length_suffix = |keyword: &str| match column.length {
            Some(n) => format!("{keyword}({n})"),
            None => String::from(keyword),
        };
        let precision_suffix = |keyword: &str| match column.precision {
            Some(p) => format!("{keyword}({p})"),
            None => String::from(keyword),
        };
        let base = match &column.type_name {
            ColumnType::String => length_suffix("VARCHAR"),
            ColumnType::Char => length_suffix("CHAR"),
            ColumnType::Text => String::from("TEXT"),
            ColumnType::TinyInteger => length_suffix("TINYINT"),
            ColumnType::SmallInteger => length_suffix("SMALLINT"),
            ColumnType::Integer => length_suffix("INTEGER"),
            ColumnType::BigInteger => length_suffix("BIGINT"),
            ColumnType::Decimal => match (column.precision, column.scale) {
                (Some(p), Some(s)) => format!("DECIMAL({p}, {s})"),
                (Some(p), None) => format!("DECIMAL({p})"),
                _ => String::from("DECIMAL"),
            },
            ColumnType::Float => String::from("FLOAT"),
            ColumnType::Boolean => String::from("BOOLEAN"),
            ColumnType::Date => String::from("DATE"),
            ColumnType::Time => String::from("TIME"),
            ColumnType::Datetime => String::from("DATETIME"),
            ColumnType::DatetimeFractional => precision_suffix("DATETIME"),
            ColumnType::Timestamp => String::from("TIMESTAMP"),
            ColumnType::TimestampFractional => precision_suffix("TIMESTAMP"),
            ColumnType::TimestampTimezone => String::from("TIMESTAMPTZ"),
            ColumnType::Uuid => String::from("CHAR(36)"),
            ColumnType::BinaryUuid => String::from("BINARY(16)"),
            ColumnType::Binary => String::from("BLOB"),
            ColumnType::Json => String::from("JSON"),
            ColumnType::Geometry => String::from("GEOMETRY"),
            ColumnType::Point => String::from("POINT"),
            ColumnType::LineString => String::from("LINESTRING"),
            ColumnType::Polygon => String::from("POLYGON"),
            ColumnType::Custom(name) => name.clone(),
        };
        if column.unsigned && column.type_name.is_integer() {
            format!("{base} UNSIGNED")
        } else {
            base
        }
    }

    /// Whether `column` renders the inline `PRIMARY KEY` clause instead
    /// of a separate constraint.
    fn inline_primary(schema: &TableSchema, column: &ColumnDefinition) -> bool {
        column.type_name == ColumnType::Integer && schema.is_single_integer_primary(&column.name)
    }
}

/// Maps a `foreign_key_list` action phrase to the canonical action.
fn parse_action(raw: &str) -> Option<ReferentialAction> {
    match raw.to_uppercase().as_str() {
        "NO ACTION" => Some(ReferentialAction::NoAction),
        "RESTRICT" => Some(ReferentialAction::Restrict),
        "CASCADE" => Some(ReferentialAction::Cascade),
        "SET NULL" => Some(ReferentialAction::SetNull),
        "SET DEFAULT" => Some(ReferentialAction::SetDefault),
        _ => None,
    }
}

impl SchemaDialect for SqliteSchemaDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn list_tables_sql(&self, _config: &DriverConfig) -> (String, Vec<SqlValue>) {
        (
            String::from(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            ),
            Vec::new(),
        )
    }

    fn describe_columns_sql(&self, table: &str, _config: &DriverConfig) -> (String, Vec<SqlValue>) {
        (
            format!("PRAGMA table_info({})", self.quote_identifier(table)),
            Vec::new(),
        )
    }

    fn describe_indexes_sql(&self, table: &str, _config: &DriverConfig) -> (String, Vec<SqlValue>) {
        (
            format!("PRAGMA index_list({})", self.quote_identifier(table)),
            Vec::new(),
        )
    }

    fn describe_foreign_keys_sql(
        &self,
        table: &str,
        _config: &DriverConfig,
    ) -> (String, Vec<SqlValue>) {
        (
            format!("PRAGMA foreign_key_list({})", self.quote_identifier(table)),
            Vec::new(),
        )
    }

    fn convert_column_description(
        &self,
        schema: &mut TableSchema,
        row: &Row,
    ) -> Result<(), DialectError> {
        let name = row.str_of("name").ok_or(DialectError::MissingField {
            field: String::from("name"),
        })?;
        let raw_type = row.str_of("type").ok_or(DialectError::MissingField {
            field: String::from("type"),
        })?;

        let (type_name, length, precision, scale, unsigned) = Self::parse_type(name, raw_type)?;
        let mut column = ColumnDefinition::new(name, type_name.clone());
        column.length = length;
        column.precision = precision;
        column.scale = scale;
        column.unsigned = unsigned;
        column.nullable = row.int_of("notnull").unwrap_or(0) == 0;

        match row.get("dflt_value") {
            None | Some(SqlValue::Null) => {}
            Some(SqlValue::Text(raw)) if raw == "NULL" => {}
            Some(SqlValue::Text(raw)) => {
                if let Some(unquoted) = unwrap_string_default(raw) {
                    column.default = if type_name == ColumnType::Boolean {
                        match unquoted.as_str() {
                            "true" | "1" => Some(DefaultValue::Boolean(true)),
                            "false" | "0" => Some(DefaultValue::Boolean(false)),
                            _ => Some(DefaultValue::Str(unquoted)),
                        }
                    } else {
                        Some(DefaultValue::Str(unquoted))
                    };
                } else if let Ok(n) = raw.parse::<i64>() {
                    column.default = if type_name == ColumnType::Boolean {
                        Some(DefaultValue::Boolean(n != 0))
                    } else {
                        Some(DefaultValue::Integer(n))
                    };
                } else if let Ok(f) = raw.parse::<f64>() {
                    column.default = Some(DefaultValue::Float(f));
                } else {
                    column.default = Some(DefaultValue::Expression(raw.clone()));
                }
            }
            Some(SqlValue::Int(n)) => {
                column.default = if type_name == ColumnType::Boolean {
                    Some(DefaultValue::Boolean(*n != 0))
                } else {
                    Some(DefaultValue::Integer(*n))
                };
            }
            Some(SqlValue::Float(f)) => column.default = Some(DefaultValue::Float(*f)),
            Some(other) => {
                column.default = Some(DefaultValue::Expression(other.to_sql_inline()));
            }
        }

        // The rowid primary key never shows up in index_list, so the
        // primary constraint is assembled from the pk ordinals here.
        let pk_ordinal = row.int_of("pk").unwrap_or(0);
        if pk_ordinal > 0 && type_name == ColumnType::Integer {
            column.auto_increment = Some(true);
        }
        schema.add_column(column)?;

        if pk_ordinal > 0 {
            add_key_column(schema, KeyKind::Primary, "primary", name)?;
            if let Some(primary) = schema.primary_key() {
                if primary.columns.len() > 1 {
                    // Composite keys never auto-increment.
                    let members = primary.columns.clone();
                    for member in members {
                        if let Some(col) = schema.column_mut(&member) {
                            col.auto_increment = None;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn convert_index_description(
        &self,
        schema: &mut TableSchema,
        row: &Row,
        conn: &mut dyn Connection,
    ) -> Result<(), DialectError> {
        let name = row.str_of("name").ok_or(DialectError::MissingField {
            field: String::from("name"),
        })?;
        // The primary key was already folded in from the column pass.
        if row.str_of("origin") == Some("pk") {
            return Ok(());
        }
        let unique = row.int_of("unique").unwrap_or(0) != 0
            || row.bool_of("unique").unwrap_or(false);

        // index_list does not carry columns; a nested pragma does.
        let detail_sql = format!("PRAGMA index_info({})", self.quote_identifier(name));
        let mut detail = conn.execute(&detail_sql, Params::None)?;
        detail.sort_by_key(|r| r.int_of("seqno").unwrap_or(0));

        let kind = key_kind(false, unique);
        for detail_row in &detail {
            let column = detail_row
                .str_of("name")
                .ok_or(DialectError::MissingField {
                    field: String::from("name"),
                })?;
            add_key_column(schema, kind, name, column)?;
        }
        Ok(())
    }

    fn convert_foreign_key_description(
        &self,
        schema: &mut TableSchema,
        row: &Row,
    ) -> Result<(), DialectError> {
        let id = row.int_of("id").ok_or(DialectError::MissingField {
            field: String::from("id"),
        })?;
        let column = row.str_of("from").ok_or(DialectError::MissingField {
            field: String::from("from"),
        })?;
        let references_table = row.str_of("table").ok_or(DialectError::MissingField {
            field: String::from("table"),
        })?;
        let references_column = row.str_of("to").ok_or(DialectError::MissingField {
            field: String::from("to"),
        })?;

        // foreign_key_list has no constraint names; the shared id groups
        // the columns of one key.
        let name = format!("fk_{id}");
        if let Some(existing) = schema.constraint_mut(&name) {
            existing.columns.push(String::from(column));
            existing.referenced_columns.push(String::from(references_column));
            return Ok(());
        }

        let mut constraint = ConstraintDefinition::foreign(
            name,
            vec![String::from(column)],
            references_table,
            vec![String::from(references_column)],
        );
        constraint.on_update = row.str_of("on_update").and_then(parse_action);
        constraint.on_delete = row.str_of("on_delete").and_then(parse_action);
        schema.add_constraint(constraint)?;
        Ok(())
    }

    fn column_sql(&self, schema: &TableSchema, name: &str) -> Result<String, DialectError> {
        let column = schema.column(name).ok_or_else(|| DialectError::MissingColumn {
            table: schema.name.clone(),
            name: String::from(name),
        })?;

        let mut out = format!(
            "{} {}",
            self.quote_identifier(name),
            Self::native_type(column)
        );

        if Self::inline_primary(schema, column) {
            out.push_str(" PRIMARY KEY");
            if column.auto_increment != Some(false) {
                out.push_str(" AUTOINCREMENT");
            }
            // The inline primary key implies NOT NULL and forbids a
            // default.
            return Ok(out);
        }

        if column.type_name.is_text() {
            if let Some(collation) = &column.collation {
                out.push_str(&format!(" COLLATE {collation}"));
            }
        }
        if !column.nullable {
            out.push_str(" NOT NULL");
        }
        if column.auto_increment != Some(true) {
            if let Some(default) = &column.default {
                out.push_str(" DEFAULT ");
                out.push_str(&render_default(default, "1", "0", &|v| {
                    self.quote_literal(v)
                }));
            }
        }
        Ok(out)
    }

    fn constraint_sql(&self, schema: &TableSchema, name: &str) -> Result<String, DialectError> {
        let constraint =
            schema
                .constraint(name)
                .ok_or_else(|| DialectError::MissingConstraint {
                    table: schema.name.clone(),
                    name: String::from(name),
                })?;
        Ok(constraint_fragment(self, constraint))
    }

    fn index_sql(&self, schema: &TableSchema, name: &str) -> Result<String, DialectError> {
        let index = schema.index(name).ok_or_else(|| DialectError::MissingIndex {
            table: schema.name.clone(),
            name: String::from(name),
        })?;
        if !index.included_columns.is_empty() {
            return Err(DialectError::UnsupportedOperation {
                operation: String::from("Covering indexes"),
                dialect: self.name(),
            });
        }
        Ok(format!(
            "CREATE INDEX {} ON {} ({})",
            self.quote_identifier(name),
            self.quote_identifier(&TableName::parse(&schema.name).table),
            quote_all(self, &index.columns)
        ))
    }

    fn create_table_sql(&self, schema: &TableSchema) -> Result<Vec<String>, DialectError> {
        // The single-column integer primary key renders inline on the
        // column, so its constraint is skipped here.
        let inline = schema
            .primary_key()
            .filter(|pk| {
                pk.columns.len() == 1
                    && schema
                        .column(&pk.columns[0])
                        .is_some_and(|c| Self::inline_primary(schema, c))
            })
            .map(|pk| pk.name.clone());
        let body = create_table_body(self, schema, |constraint| {
            constraint.kind == ConstraintKind::Primary && Some(&constraint.name) == inline.as_ref()
        })?;

        let temporary = if schema.temporary { "TEMPORARY " } else { "" };
        let mut statements = vec![format!(
            "CREATE {temporary}TABLE {} (\n{}\n)",
            self.quote_identifier(&TableName::parse(&schema.name).table),
            body.join(",\n")
        )];
        for index in schema.indexes() {
            statements.push(self.index_sql(schema, &index.name)?);
        }
        Ok(statements)
    }

    /// SQLite cannot add constraints to an existing table; this is a
    /// documented no-op, not an error.
    fn add_constraint_sql(&self, _schema: &TableSchema) -> Result<Vec<String>, DialectError> {
        Ok(Vec::new())
    }

    /// SQLite cannot drop constraints from an existing table; this is a
    /// documented no-op, not an error.
    fn drop_constraint_sql(&self, _schema: &TableSchema) -> Result<Vec<String>, DialectError> {
        Ok(Vec::new())
    }

    fn truncate_table_sql(&self, schema: &TableSchema) -> Vec<String> {
        let table = TableName::parse(&schema.name).table;
        let mut statements = Vec::new();
        // Reset the AUTOINCREMENT sequence before deleting the rows.
        let has_sequence = schema
            .primary_key()
            .is_some_and(|pk| pk.columns.len() == 1)
            && schema
                .primary_key()
                .and_then(|pk| schema.column(&pk.columns[0]))
                .is_some_and(|c| c.type_name.is_integer() && c.auto_increment != Some(false));
        if has_sequence {
            statements.push(format!(
                "DELETE FROM sqlite_sequence WHERE name = {}",
                self.quote_literal(&SqlValue::Text(table.clone()))
            ));
        }
        statements.push(format!("DELETE FROM {}", self.quote_identifier(&table)));
        statements
    }
}
