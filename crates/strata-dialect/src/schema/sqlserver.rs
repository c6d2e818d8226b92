//! SQL Server schema dialect.
//!
//! Introspection reads the `sys.*` catalog views. Unicode string types
//! report their storage size in bytes, so `nvarchar`/`nchar` lengths
//! are halved on the way into the canonical model.

use std::sync::OnceLock;

use regex::Regex;

use strata_core::schema::{
    ColumnDefinition, ConstraintDefinition, ConstraintKind, DefaultValue, IndexDefinition,
    ReferentialAction, TableSchema,
};
use strata_core::types::ColumnType;
use strata_core::value::SqlValue;

use super::{
    add_key_column, constraint_fragment, create_table_body, key_kind, quote_all, render_default,
    split_type_args, unwrap_string_default, wants_auto_increment, SchemaDialect, TableName,
};
use crate::config::DriverConfig;
use crate::connection::{Connection, Row};
use crate::error::DialectError;

/// Schema dialect for SQL Server: `sys.*` catalog introspection and
/// T-SQL DDL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlserverSchemaDialect;

static TYPE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn type_pattern() -> &'static Regex {
    TYPE_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^([a-z][a-z0-9_]*)\s*(?:\(([0-9,\sa-z]+)\))?$").expect("valid type pattern")
    })
}

impl SqlserverSchemaDialect {
    /// Creates the dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parses a native SQL Server type string into canonical form:
    /// (type, length, precision, scale).
    fn parse_type(
        column: &str,
        raw: &str,
    ) -> Result<(ColumnType, Option<u32>, Option<u32>, Option<u32>), DialectError> {
        let unparsable = || DialectError::UnparsableType {
            column: String::from(column),
            raw: String::from(raw),
        };
        let captures = type_pattern().captures(raw.trim()).ok_or_else(unparsable)?;
        let base = captures
            .get(1)
            .map(|m| m.as_str().to_lowercase())
            .ok_or_else(unparsable)?;
        let args = captures.get(2).map(|m| m.as_str().trim());
        // NVARCHAR(MAX) and friends carry a keyword argument.
        let is_max = args.is_some_and(|a| a.eq_ignore_ascii_case("max"));
        let (first, second) = args
            .filter(|_| !is_max)
            .map_or((None, None), split_type_args);

        let result = match base.as_str() {
            "tinyint" => (ColumnType::TinyInteger, first, None, None),
            "smallint" => (ColumnType::SmallInteger, first, None, None),
            "int" | "integer" => (ColumnType::Integer, first, None, None),
            "bigint" => (ColumnType::BigInteger, first, None, None),
            "bit" => (ColumnType::Boolean, None, None, None),
            "decimal" | "numeric" | "money" | "smallmoney" => {
                (ColumnType::Decimal, None, first, second)
            }
            "float" | "real" => (ColumnType::Float, None, first, second),
            "varchar" | "nvarchar" if is_max => (ColumnType::Text, None, None, None),
            "varchar" | "nvarchar" => (ColumnType::String, first, None, None),
            "char" | "nchar" => (ColumnType::Char, first, None, None),
            "text" | "ntext" | "xml" => (ColumnType::Text, None, None, None),
            "date" => (ColumnType::Date, None, None, None),
            "time" => (ColumnType::Time, None, first, None),
            "datetime" | "smalldatetime" => (ColumnType::Datetime, None, None, None),
            "datetime2" => (ColumnType::DatetimeFractional, None, first, None),
            "datetimeoffset" => (ColumnType::TimestampTimezone, None, first, None),
            "uniqueidentifier" => (ColumnType::Uuid, None, None, None),
            "binary" if first == Some(16) => (ColumnType::BinaryUuid, None, None, None),
            "varbinary" | "binary" | "image" => (ColumnType::Binary, first, None, None),
            "geometry" | "geography" => (ColumnType::Geometry, None, None, None),
            _ => (ColumnType::Custom(base.clone()), first, None, None),
        };
        Ok(result)
    }

    /// The backend's native spelling of a canonical column type.
    fn native_type(column: &ColumnDefinition) -> String {
        match &column.type_name {
            ColumnType::String => match column.length {
                Some(n) => format!("NVARCHAR({n})"),
                None => String::from("NVARCHAR(255)"),
            },
            ColumnType::Char => match column.length {
                Some(n) => format!("NCHAR({n})"),
                None => String::from("NCHAR"),
            },
            ColumnType::Text | ColumnType::Json => String::from("NVARCHAR(MAX)"),
            ColumnType::TinyInteger => String::from("TINYINT"),
            ColumnType::SmallInteger => String::from("SMALLINT"),
            ColumnType::Integer => String::from("INTEGER"),
            ColumnType::BigInteger => String::from("BIGINT"),
            ColumnType::Decimal => match (column.precision, column.scale) {
                (Some(p), Some(s)) => format!("DECIMAL({p}, {s})"),
                (Some(p), None) => format!("DECIMAL({p})"),
                _ => String::from("DECIMAL"),
            },
            ColumnType::Float => String::from("FLOAT"),
            ColumnType::Boolean => String::from("BIT"),
            ColumnType::Date => String::from("DATE"),
            ColumnType::Time => String::from("TIME"),
            ColumnType::Datetime | ColumnType::Timestamp => String::from("DATETIME"),
            ColumnType::DatetimeFractional | ColumnType::TimestampFractional => {
                match column.precision {
                    Some(p) => format!("DATETIME2({p})"),
                    None => String::from("DATETIME2"),
                }
            }
            ColumnType::TimestampTimezone => String::from("DATETIMEOFFSET"),
            ColumnType::Uuid => String::from("UNIQUEIDENTIFIER"),
            ColumnType::BinaryUuid => String::from("BINARY(16)"),
            ColumnType::Binary => match column.length {
                Some(n) => format!("VARBINARY({n})"),
                None => String::from("VARBINARY(MAX)"),
            },
            ColumnType::Geometry
            | ColumnType::Point
            | ColumnType::LineString
            | ColumnType::Polygon => String::from("GEOMETRY"),
            ColumnType::Custom(name) => name.clone(),
        }
    }

    /// Strips the wrapping parentheses `OBJECT_DEFINITION` puts around
    /// column defaults, e.g. `((0))` or `('draft')`.
    fn strip_default_parens(raw: &str) -> &str {
        let mut out = raw.trim();
        while out.len() >= 2 && out.starts_with('(') && out.ends_with(')') {
            out = out[1..out.len() - 1].trim();
        }
        out
    }

    fn table_sql_name(&self, schema: &TableSchema) -> String {
        let table = TableName::parse(&schema.name).table;
        if schema.temporary {
            self.quote_identifier(&format!("#{table}"))
        } else {
            self.quote_identifier(&table)
        }
    }
}

/// Maps a `sys.foreign_keys` action description to the canonical
/// action.
fn parse_action(raw: &str) -> Option<ReferentialAction> {
    match raw.to_uppercase().as_str() {
        "NO_ACTION" => Some(ReferentialAction::NoAction),
        "CASCADE" => Some(ReferentialAction::Cascade),
        "SET_NULL" => Some(ReferentialAction::SetNull),
        "SET_DEFAULT" => Some(ReferentialAction::SetDefault),
        _ => None,
    }
}

impl SchemaDialect for SqlserverSchemaDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }

    fn list_tables_sql(&self, config: &DriverConfig) -> (String, Vec<SqlValue>) {
        let schema = config.schema.clone().unwrap_or_else(|| String::from("dbo"));
        (
            String::from(
                "SELECT T.name AS name FROM sys.tables T \
                 INNER JOIN sys.schemas S ON S.schema_id = T.schema_id \
                 WHERE S.name = ? ORDER BY T.name",
            ),
            vec![SqlValue::Text(schema)],
        )
    }

    fn describe_columns_sql(&self, table: &str, config: &DriverConfig) -> (String, Vec<SqlValue>) {
        let name = TableName::parse(table);
        let schema = name.schema_or(config, "dbo").to_string();
        let sql = "SELECT DISTINCT \
                AC.column_id AS column_id, \
                AC.name AS name, \
                TY.name AS type, \
                AC.max_length AS char_length, \
                AC.precision AS precision, \
                AC.scale AS scale, \
                AC.is_identity AS autoincrement, \
                AC.is_nullable AS [null], \
                OBJECT_DEFINITION(AC.default_object_id) AS [default], \
                AC.collation_name AS collation_name \
            FROM sys.objects T \
            INNER JOIN sys.schemas S ON (S.schema_id = T.schema_id) \
            INNER JOIN sys.all_columns AC ON (T.object_id = AC.object_id) \
            INNER JOIN sys.types TY ON (TY.user_type_id = AC.user_type_id) \
            WHERE T.name = ? AND S.name = ? \
            ORDER BY column_id";
        (
            String::from(sql),
            vec![
                SqlValue::Text(name.table),
                SqlValue::Text(String::from(schema)),
            ],
        )
    }

    fn describe_indexes_sql(&self, table: &str, config: &DriverConfig) -> (String, Vec<SqlValue>) {
        let name = TableName::parse(table);
        let schema = name.schema_or(config, "dbo").to_string();
        let sql = "SELECT \
                I.name AS name, \
                AC.name AS column_name, \
                I.is_unique AS is_unique, \
                I.is_primary_key AS is_primary, \
                IC.is_included_column AS is_included, \
                IC.index_column_id AS position \
            FROM sys.tables T \
            INNER JOIN sys.schemas S ON (S.schema_id = T.schema_id) \
            INNER JOIN sys.indexes I ON (T.object_id = I.object_id) \
            INNER JOIN sys.index_columns IC \
                ON (I.object_id = IC.object_id AND I.index_id = IC.index_id) \
            INNER JOIN sys.all_columns AC \
                ON (T.object_id = AC.object_id AND IC.column_id = AC.column_id) \
            WHERE T.name = ? AND S.name = ? AND I.name IS NOT NULL \
            ORDER BY I.index_id, IC.index_column_id";
        (
            String::from(sql),
            vec![
                SqlValue::Text(name.table),
                SqlValue::Text(String::from(schema)),
            ],
        )
    }

    fn describe_foreign_keys_sql(
        &self,
        table: &str,
        config: &DriverConfig,
    ) -> (String, Vec<SqlValue>) {
        let name = TableName::parse(table);
        let schema = name.schema_or(config, "dbo").to_string();
        let sql = "SELECT \
                FK.name AS name, \
                AC.name AS column_name, \
                RT.name AS references_table, \
                RC.name AS references_column, \
                FK.update_referential_action_desc AS on_update, \
                FK.delete_referential_action_desc AS on_delete, \
                FKC.constraint_column_id AS position \
            FROM sys.foreign_keys FK \
            INNER JOIN sys.tables T ON (T.object_id = FK.parent_object_id) \
            INNER JOIN sys.schemas S ON (S.schema_id = T.schema_id) \
            INNER JOIN sys.foreign_key_columns FKC \
                ON (FKC.constraint_object_id = FK.object_id) \
            INNER JOIN sys.all_columns AC \
                ON (AC.object_id = FKC.parent_object_id AND AC.column_id = FKC.parent_column_id) \
            INNER JOIN sys.tables RT ON (RT.object_id = FK.referenced_object_id) \
            INNER JOIN sys.all_columns RC \
                ON (RC.object_id = FKC.referenced_object_id \
                    AND RC.column_id = FKC.referenced_column_id) \
            WHERE T.name = ? AND S.name = ? \
            ORDER BY name, position";
        (
            String::from(sql),
            vec![
                SqlValue::Text(name.table),
                SqlValue::Text(String::from(schema)),
            ],
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

        let (mut type_name, mut length, mut precision, mut scale) =
            Self::parse_type(name, raw_type)?;

        if length.is_none() {
            if let Some(max_length) = row.int_of("char_length") {
                if max_length == -1 {
                    // (MAX) storage has no length limit.
                    if type_name == ColumnType::String {
                        type_name = ColumnType::Text;
                    }
                } else if matches!(type_name, ColumnType::String | ColumnType::Char) {
                    // Unicode types report bytes, two per character.
                    let divisor = if raw_type.starts_with('n') { 2 } else { 1 };
                    length = u32::try_from(max_length / divisor).ok();
                } else if type_name == ColumnType::Binary {
                    length = u32::try_from(max_length).ok();
                }
            }
        }
        if type_name == ColumnType::Decimal {
            precision = precision.or_else(|| {
                row.int_of("precision").and_then(|n| u32::try_from(n).ok())
            });
            scale = scale.or_else(|| row.int_of("scale").and_then(|n| u32::try_from(n).ok()));
        }
        if type_name == ColumnType::DatetimeFractional {
            precision =
                precision.or_else(|| row.int_of("scale").and_then(|n| u32::try_from(n).ok()));
            // Fractional precision of exactly 0 folds to DATETIME
            // semantics.
            if precision == Some(0) {
                type_name = ColumnType::Datetime;
                precision = None;
            }
        }

        let mut column = ColumnDefinition::new(name, type_name.clone());
        column.length = length;
        column.precision = precision;
        column.scale = scale;
        column.nullable = row.bool_of("null").unwrap_or(true);
        column.collation = row.str_of("collation_name").map(String::from);
        column.timezone = type_name == ColumnType::TimestampTimezone;
        if row.bool_of("autoincrement") == Some(true) {
            column.auto_increment = Some(true);
        }

        if let Some(raw_default) = row.str_of("default") {
            let stripped = Self::strip_default_parens(raw_default);
            // Unicode literals carry the N prefix.
            let stripped = if stripped.starts_with("N'") {
                &stripped[1..]
            } else {
                stripped
            };
            if stripped.eq_ignore_ascii_case("NULL") {
                column.default = None;
            } else if type_name == ColumnType::Boolean {
                column.default = match stripped {
                    "1" => Some(DefaultValue::Boolean(true)),
                    "0" => Some(DefaultValue::Boolean(false)),
                    other => Some(DefaultValue::Expression(String::from(other))),
                };
            } else if let Some(unquoted) = unwrap_string_default(stripped) {
                column.default = Some(DefaultValue::Str(unquoted));
            } else if let Ok(n) = stripped.parse::<i64>() {
                column.default = Some(DefaultValue::Integer(n));
            } else if let Ok(f) = stripped.parse::<f64>() {
                column.default = Some(DefaultValue::Float(f));
            } else {
                column.default = Some(DefaultValue::Expression(String::from(stripped)));
            }
        }

        schema.add_column(column)?;
        Ok(())
    }

    fn convert_index_description(
        &self,
        schema: &mut TableSchema,
        row: &Row,
        _conn: &mut dyn Connection,
    ) -> Result<(), DialectError> {
        let name = row.str_of("name").ok_or(DialectError::MissingField {
            field: String::from("name"),
        })?;
        let column = row.str_of("column_name").ok_or(DialectError::MissingField {
            field: String::from("column_name"),
        })?;
        let primary = row.bool_of("is_primary").unwrap_or(false);
        let unique = row.bool_of("is_unique").unwrap_or(false);

        // Covering-index payload columns land in the INCLUDE list, not
        // the key.
        if row.bool_of("is_included").unwrap_or(false) {
            if let Some(index) = schema.index_mut(name) {
                index.included_columns.push(String::from(column));
            } else {
                let index =
                    IndexDefinition::new(name, Vec::new()).include(vec![String::from(column)]);
                schema.add_index(index)?;
            }
            return Ok(());
        }

        add_key_column(schema, key_kind(primary, unique), name, column)
    }

    fn convert_foreign_key_description(
        &self,
        schema: &mut TableSchema,
        row: &Row,
    ) -> Result<(), DialectError> {
        let name = row.str_of("name").ok_or(DialectError::MissingField {
            field: String::from("name"),
        })?;
        let column = row.str_of("column_name").ok_or(DialectError::MissingField {
            field: String::from("column_name"),
        })?;
        let references_table = row
            .str_of("references_table")
            .ok_or(DialectError::MissingField {
                field: String::from("references_table"),
            })?;
        let references_column =
            row.str_of("references_column")
                .ok_or(DialectError::MissingField {
                    field: String::from("references_column"),
                })?;

        if let Some(existing) = schema.constraint_mut(name) {
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

        let auto_increment = wants_auto_increment(schema, column);
        if auto_increment {
            out.push_str(" IDENTITY(1, 1)");
        }
        if column.type_name.is_text() {
            if let Some(collation) = &column.collation {
                out.push_str(&format!(" COLLATE {collation}"));
            }
        }
        if !column.nullable {
            out.push_str(" NOT NULL");
        }
        // IDENTITY wins over any explicit default.
        if !auto_increment {
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
        let mut out = format!(
            "CREATE INDEX {} ON {} ({})",
            self.quote_identifier(name),
            self.table_sql_name(schema),
            quote_all(self, &index.columns)
        );
        if !index.included_columns.is_empty() {
            out.push_str(&format!(
                " INCLUDE ({})",
                quote_all(self, &index.included_columns)
            ));
        }
        Ok(out)
    }

    fn create_table_sql(&self, schema: &TableSchema) -> Result<Vec<String>, DialectError> {
        let body = create_table_body(self, schema, |_| false)?;
        let mut statements = vec![format!(
            "CREATE TABLE {} (\n{}\n)",
            self.table_sql_name(schema),
            body.join(",\n")
        )];
        for index in schema.indexes() {
            statements.push(self.index_sql(schema, &index.name)?);
        }
        Ok(statements)
    }

    fn add_constraint_sql(&self, schema: &TableSchema) -> Result<Vec<String>, DialectError> {
        let mut statements = Vec::new();
        for constraint in schema.constraints() {
            if constraint.kind == ConstraintKind::Foreign {
                statements.push(format!(
                    "ALTER TABLE {} ADD {}",
                    self.table_sql_name(schema),
                    self.constraint_sql(schema, &constraint.name)?
                ));
            }
        }
        Ok(statements)
    }

    fn drop_constraint_sql(&self, schema: &TableSchema) -> Result<Vec<String>, DialectError> {
        let mut statements = Vec::new();
        for constraint in schema.constraints() {
            if constraint.kind == ConstraintKind::Foreign {
                statements.push(format!(
                    "ALTER TABLE {} DROP CONSTRAINT {}",
                    self.table_sql_name(schema),
                    self.quote_identifier(&constraint.name)
                ));
            }
        }
        Ok(statements)
    }

    fn truncate_table_sql(&self, schema: &TableSchema) -> Vec<String> {
        let table = TableName::parse(&schema.name).table;
        let mut statements = vec![format!("DELETE FROM {}", self.table_sql_name(schema))];
        let has_identity = schema
            .columns()
            .iter()
            .any(|c| wants_auto_increment(schema, c));
        if has_identity {
            statements.push(format!(
                "DBCC CHECKIDENT({}, RESEED, 0)",
                self.quote_literal(&SqlValue::Text(table))
            ));
        }
        statements
    }

    fn drop_table_sql(&self, schema: &TableSchema) -> Vec<String> {
        vec![format!("DROP TABLE {}", self.table_sql_name(schema))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::schema::{integer, string};

    fn dialect() -> SqlserverSchemaDialect {
        SqlserverSchemaDialect::new()
    }

    #[test]
    fn test_parse_nvarchar_with_length() {
        let (type_name, length, _, _) =
            SqlserverSchemaDialect::parse_type("title", "nvarchar(50)").unwrap();
        assert_eq!(type_name, ColumnType::String);
        assert_eq!(length, Some(50));
    }

    #[test]
    fn test_parse_nvarchar_max_is_text() {
        let (type_name, ..) =
            SqlserverSchemaDialect::parse_type("body", "nvarchar(max)").unwrap();
        assert_eq!(type_name, ColumnType::Text);
    }

    #[test]
    fn test_catalog_byte_length_is_halved_for_unicode() {
        let mut schema = TableSchema::new("posts");
        let row = Row::from_pairs([
            ("name", SqlValue::Text(String::from("title"))),
            ("type", SqlValue::Text(String::from("nvarchar"))),
            ("char_length", SqlValue::Int(510)),
            ("null", SqlValue::Bool(false)),
        ]);
        dialect().convert_column_description(&mut schema, &row).unwrap();
        assert_eq!(schema.column("title").unwrap().length, Some(255));
    }

    #[test]
    fn test_max_length_becomes_text() {
        let mut schema = TableSchema::new("posts");
        let row = Row::from_pairs([
            ("name", SqlValue::Text(String::from("body"))),
            ("type", SqlValue::Text(String::from("nvarchar"))),
            ("char_length", SqlValue::Int(-1)),
            ("null", SqlValue::Bool(true)),
        ]);
        dialect().convert_column_description(&mut schema, &row).unwrap();
        assert_eq!(schema.column("body").unwrap().type_name, ColumnType::Text);
    }

    #[test]
    fn test_datetime2_scale_zero_folds_to_datetime() {
        let mut schema = TableSchema::new("posts");
        let row = Row::from_pairs([
            ("name", SqlValue::Text(String::from("created"))),
            ("type", SqlValue::Text(String::from("datetime2"))),
            ("scale", SqlValue::Int(0)),
            ("null", SqlValue::Bool(true)),
        ]);
        dialect().convert_column_description(&mut schema, &row).unwrap();
        let column = schema.column("created").unwrap();
        assert_eq!(column.type_name, ColumnType::Datetime);
        assert_eq!(column.precision, None);
    }

    #[test]
    fn test_wrapped_defaults_are_unwrapped() {
        let mut schema = TableSchema::new("posts");
        let row = Row::from_pairs([
            ("name", SqlValue::Text(String::from("status"))),
            ("type", SqlValue::Text(String::from("nvarchar"))),
            ("char_length", SqlValue::Int(40)),
            ("null", SqlValue::Bool(false)),
            ("default", SqlValue::Text(String::from("(N'draft')"))),
        ]);
        dialect().convert_column_description(&mut schema, &row).unwrap();
        assert_eq!(
            schema.column("status").unwrap().default,
            Some(DefaultValue::Str(String::from("draft")))
        );

        let row = Row::from_pairs([
            ("name", SqlValue::Text(String::from("views"))),
            ("type", SqlValue::Text(String::from("int"))),
            ("null", SqlValue::Bool(false)),
            ("default", SqlValue::Text(String::from("((0))"))),
        ]);
        dialect().convert_column_description(&mut schema, &row).unwrap();
        assert_eq!(
            schema.column("views").unwrap().default,
            Some(DefaultValue::Integer(0))
        );
    }

    #[test]
    fn test_index_tie_break_prefers_primary() {
        let mut schema = TableSchema::new("posts");
        schema.add_column(integer("id")).unwrap();
        let mut conn = crate::schema::tests_support::NullConnection;
        let row = Row::from_pairs([
            ("name", SqlValue::Text(String::from("PK_posts"))),
            ("column_name", SqlValue::Text(String::from("id"))),
            ("is_primary", SqlValue::Bool(true)),
            ("is_unique", SqlValue::Bool(true)),
            ("is_included", SqlValue::Bool(false)),
        ]);
        dialect()
            .convert_index_description(&mut schema, &row, &mut conn)
            .unwrap();

        let constraint = schema.constraint("PK_posts").unwrap();
        assert_eq!(constraint.kind, ConstraintKind::Primary);
    }

    #[test]
    fn test_included_columns_join_the_include_list() {
        let mut schema = TableSchema::new("posts");
        schema.add_column(string("email", 255)).unwrap();
        schema.add_column(string("name", 255)).unwrap();
        let mut conn = crate::schema::tests_support::NullConnection;

        for (column, included) in [("email", false), ("name", true)] {
            let row = Row::from_pairs([
                ("name", SqlValue::Text(String::from("ix_lookup"))),
                ("column_name", SqlValue::Text(String::from(column))),
                ("is_primary", SqlValue::Bool(false)),
                ("is_unique", SqlValue::Bool(false)),
                ("is_included", SqlValue::Bool(included)),
            ]);
            dialect()
                .convert_index_description(&mut schema, &row, &mut conn)
                .unwrap();
        }

        let index = schema.index("ix_lookup").unwrap();
        assert_eq!(index.columns, vec!["email"]);
        assert_eq!(index.included_columns, vec!["name"]);

        let sql = dialect().index_sql(&schema, "ix_lookup").unwrap();
        assert_eq!(
            sql,
            "CREATE INDEX [ix_lookup] ON [posts] ([email]) INCLUDE ([name])"
        );
    }

    #[test]
    fn test_identity_suppresses_default() {
        let mut schema = TableSchema::new("posts");
        schema
            .add_column(
                integer("id")
                    .not_null()
                    .auto_increment(true)
                    .default_value(DefaultValue::Integer(1)),
            )
            .unwrap();
        let sql = dialect().column_sql(&schema, "id").unwrap();
        assert_eq!(sql, "[id] INTEGER IDENTITY(1, 1) NOT NULL");
    }

    #[test]
    fn test_boolean_default_renders_as_bit() {
        let mut schema = TableSchema::new("posts");
        schema
            .add_column(
                strata_core::schema::boolean("active")
                    .not_null()
                    .default_value(DefaultValue::Boolean(true)),
            )
            .unwrap();
        let sql = dialect().column_sql(&schema, "active").unwrap();
        assert_eq!(sql, "[active] BIT NOT NULL DEFAULT 1");
    }

    #[test]
    fn test_truncate_reseeds_identity() {
        let mut schema = TableSchema::new("posts");
        schema
            .add_column(integer("id").not_null().auto_increment(true))
            .unwrap();
        assert_eq!(
            dialect().truncate_table_sql(&schema),
            vec![
                String::from("DELETE FROM [posts]"),
                String::from("DBCC CHECKIDENT('posts', RESEED, 0)"),
            ]
        );
    }
}
