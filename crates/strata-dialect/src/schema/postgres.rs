//! PostgreSQL schema dialect.

use std::sync::OnceLock;

use regex::Regex;

use strata_core::schema::{
    ColumnDefinition, ConstraintDefinition, ConstraintKind, DefaultValue, IdentityGeneration,
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

/// Schema dialect for PostgreSQL: `information_schema`/`pg_catalog`
/// introspection and PostgreSQL DDL generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresSchemaDialect;

static TYPE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn type_pattern() -> &'static Regex {
    TYPE_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^([a-z][a-z0-9_ ]*?)\s*(?:\((.+)\))?$").expect("valid type pattern")
    })
}

impl PostgresSchemaDialect {
    /// Creates the dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Parses a native PostgreSQL type string into canonical form:
    /// (type, length, precision, scale, timezone).
    fn parse_type(
        column: &str,
        raw: &str,
    ) -> Result<(ColumnType, Option<u32>, Option<u32>, Option<u32>, bool), DialectError> {
        let captures = type_pattern().captures(raw.trim()).ok_or_else(|| {
            DialectError::UnparsableType {
                column: String::from(column),
                raw: String::from(raw),
            }
        })?;
        let base = captures
            .get(1)
            .map(|m| m.as_str().trim().to_lowercase())
            .unwrap_or_default();
        let args = captures.get(2).map(|m| m.as_str());
        let (first, second) = args.map_or((None, None), split_type_args);

        let parsed = match base.as_str() {
            "smallint" | "int2" | "smallserial" => (ColumnType::SmallInteger, None, None, None),
            "integer" | "int" | "int4" | "serial" => (ColumnType::Integer, first, None, None),
            "bigint" | "int8" | "bigserial" => (ColumnType::BigInteger, first, None, None),
            "numeric" | "decimal" | "money" => (ColumnType::Decimal, None, first, second),
            "real" | "float4" | "double precision" | "float8" => {
                (ColumnType::Float, None, first, second)
            }
            "boolean" | "bool" => (ColumnType::Boolean, None, None, None),
            "character varying" | "varchar" => (ColumnType::String, first, None, None),
            "character" | "char" | "bpchar" => (ColumnType::Char, first, None, None),
            "text" => (ColumnType::Text, None, None, None),
            "uuid" => (ColumnType::Uuid, None, None, None),
            "bytea" => (ColumnType::Binary, None, None, None),
            "date" => (ColumnType::Date, None, None, None),
            "time" | "time without time zone" | "time with time zone" | "timetz" => {
                (ColumnType::Time, None, None, None)
            }
            "timestamp" | "timestamp without time zone" => {
                (ColumnType::TimestampFractional, None, first, None)
            }
            "timestamptz" | "timestamp with time zone" => {
                return Ok((ColumnType::TimestampTimezone, None, first, None, true));
            }
            "json" | "jsonb" => (ColumnType::Json, None, None, None),
            "inet" | "cidr" | "macaddr" => (ColumnType::String, first, None, None),
            "geometry" => {
                let mut parts = args.unwrap_or("").split(',').map(str::trim);
                let subtype = parts.next().unwrap_or("").to_lowercase();
                let srid = parts.next().and_then(|s| s.parse::<u32>().ok());
                let type_name = match subtype.as_str() {
                    "point" => ColumnType::Point,
                    "linestring" => ColumnType::LineString,
                    "polygon" => ColumnType::Polygon,
                    _ => ColumnType::Geometry,
                };
                return Ok((type_name, None, srid, None, false));
            }
            "point" => (ColumnType::Point, None, None, None),
            "polygon" => (ColumnType::Polygon, None, None, None),
            "" => {
                return Err(DialectError::UnparsableType {
                    column: String::from(column),
                    raw: String::from(raw),
                });
            }
            _ => (ColumnType::Custom(base.clone()), first, None, second),
        };
        let (type_name, length, precision, scale) = parsed;
        Ok((type_name, length, precision, scale, false))
    }

    /// The backend's native spelling of a canonical column type.
    fn native_type(column: &ColumnDefinition, auto_increment: bool) -> String {
        let length_suffix = |keyword: &str| match column.length {
            Some(n) => format!("{keyword}({n})"),
            None => String::from(keyword),
        };
        match &column.type_name {
            ColumnType::String => length_suffix("VARCHAR"),
            ColumnType::Char => length_suffix("CHAR"),
            ColumnType::Text => String::from("TEXT"),
            ColumnType::TinyInteger | ColumnType::SmallInteger => {
                if auto_increment {
                    String::from("SMALLSERIAL")
                } else {
                    String::from("SMALLINT")
                }
            }
            ColumnType::Integer => {
                if auto_increment {
                    String::from("SERIAL")
                } else {
                    String::from("INTEGER")
                }
            }
            ColumnType::BigInteger => {
                if auto_increment {
                    String::from("BIGSERIAL")
                } else {
                    String::from("BIGINT")
                }
            }
            ColumnType::Decimal => match (column.precision, column.scale) {
                (Some(p), Some(s)) => format!("DECIMAL({p}, {s})"),
                (Some(p), None) => format!("DECIMAL({p})"),
                _ => String::from("DECIMAL"),
            },
            ColumnType::Float => String::from("FLOAT"),
            ColumnType::Boolean => String::from("BOOLEAN"),
            ColumnType::Date => String::from("DATE"),
            ColumnType::Time => String::from("TIME"),
            ColumnType::Datetime | ColumnType::Timestamp => String::from("TIMESTAMP"),
            ColumnType::DatetimeFractional | ColumnType::TimestampFractional => {
                match column.precision {
                    Some(p) => format!("TIMESTAMP({p})"),
                    None => String::from("TIMESTAMP"),
                }
            }
            ColumnType::TimestampTimezone => String::from("TIMESTAMPTZ"),
            ColumnType::Uuid | ColumnType::BinaryUuid => String::from("UUID"),
            ColumnType::Binary => String::from("BYTEA"),
            ColumnType::Json => String::from("JSONB"),
            ColumnType::Geometry => String::from("GEOMETRY"),
            ColumnType::Point => geometry_sql("POINT", column.srid),
            ColumnType::LineString => geometry_sql("LINESTRING", column.srid),
            ColumnType::Polygon => geometry_sql("POLYGON", column.srid),
            ColumnType::Custom(name) => name.clone(),
        }
    }

    fn quote_table(&self, name: &str) -> String {
        let table = TableName::parse(name);
        match table.schema {
            Some(schema) => format!(
                "{}.{}",
                self.quote_identifier(&schema),
                self.quote_identifier(&table.table)
            ),
            None => self.quote_identifier(&table.table),
        }
    }
}

fn geometry_sql(subtype: &str, srid: Option<u32>) -> String {
    match srid {
        Some(srid) => format!("GEOMETRY({subtype}, {srid})"),
        None => format!("GEOMETRY({subtype})"),
    }
}

/// Maps a `pg_constraint` action code to the canonical action.
fn parse_action(code: &str) -> Option<ReferentialAction> {
    match code {
        "a" => Some(ReferentialAction::NoAction),
        "r" => Some(ReferentialAction::Restrict),
        "c" => Some(ReferentialAction::Cascade),
        "n" => Some(ReferentialAction::SetNull),
        "d" => Some(ReferentialAction::SetDefault),
        _ => None,
    }
}

impl SchemaDialect for PostgresSchemaDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn list_tables_sql(&self, config: &DriverConfig) -> (String, Vec<SqlValue>) {
        let schema = config.schema.clone().unwrap_or_else(|| String::from("public"));
        (
            String::from(
                "SELECT table_name AS name \
                 FROM information_schema.tables \
                 WHERE table_schema = ? ORDER BY table_name",
            ),
            vec![SqlValue::Text(schema)],
        )
    }

    fn describe_columns_sql(&self, table: &str, config: &DriverConfig) -> (String, Vec<SqlValue>) {
        let name = TableName::parse(table);
        let schema = name.schema_or(config, "public").to_string();
        let sql = "SELECT DISTINCT \
                c.column_name AS name, \
                c.data_type AS type, \
                c.is_nullable AS \"null\", \
                c.column_default AS \"default\", \
                c.character_maximum_length AS char_length, \
                c.numeric_precision AS column_precision, \
                c.numeric_scale AS column_scale, \
                c.datetime_precision AS datetime_precision, \
                c.collation_name AS collation_name, \
                c.identity_generation AS identity_generation, \
                d.description AS comment, \
                pg_get_serial_sequence(attr.attrelid::regclass::text, attr.attname) \
                    IS NOT NULL AS has_serial, \
                c.ordinal_position AS position \
            FROM information_schema.columns c \
            INNER JOIN pg_catalog.pg_namespace ns ON (ns.nspname = c.table_schema) \
            INNER JOIN pg_catalog.pg_class cl \
                ON (cl.relnamespace = ns.oid AND cl.relname = c.table_name) \
            LEFT JOIN pg_catalog.pg_description d \
                ON (cl.oid = d.objoid AND d.objsubid = c.ordinal_position) \
            LEFT JOIN pg_catalog.pg_attribute attr \
                ON (cl.oid = attr.attrelid AND c.column_name = attr.attname) \
            WHERE c.table_name = ? AND c.table_schema = ? \
            ORDER BY position";
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
        let schema = name.schema_or(config, "public").to_string();
        let sql = "SELECT \
                c2.relname AS name, \
                a.attname AS column_name, \
                i.indisprimary AS is_primary, \
                i.indisunique AS is_unique, \
                a.attnum AS position \
            FROM pg_catalog.pg_namespace n \
            INNER JOIN pg_catalog.pg_class c ON (n.oid = c.relnamespace) \
            INNER JOIN pg_catalog.pg_index i ON (c.oid = i.indrelid) \
            INNER JOIN pg_catalog.pg_class c2 ON (c2.oid = i.indexrelid) \
            INNER JOIN pg_catalog.pg_attribute a \
                ON (a.attrelid = c.oid AND a.attnum = ANY(i.indkey)) \
            WHERE n.nspname = ? AND c.relname = ? \
            ORDER BY i.indisprimary DESC, i.indisunique DESC, c2.relname, a.attnum";
        (
            String::from(sql),
            vec![
                SqlValue::Text(String::from(schema)),
                SqlValue::Text(name.table),
            ],
        )
    }

    fn describe_foreign_keys_sql(
        &self,
        table: &str,
        config: &DriverConfig,
    ) -> (String, Vec<SqlValue>) {
        let name = TableName::parse(table);
        let schema = name.schema_or(config, "public").to_string();
        let sql = "SELECT \
                c.conname AS name, \
                a.attname AS column_name, \
                cl2.relname AS references_table, \
                ab.attname AS references_column, \
                c.confupdtype AS on_update, \
                c.confdeltype AS on_delete, \
                a.attnum AS position \
            FROM pg_catalog.pg_namespace n \
            INNER JOIN pg_catalog.pg_class cl \
                ON (n.oid = cl.relnamespace AND cl.relname = ?) \
            INNER JOIN pg_catalog.pg_constraint c \
                ON (n.oid = c.connamespace AND c.conrelid = cl.oid AND c.contype = 'f') \
            INNER JOIN pg_catalog.pg_class cl2 ON (cl2.oid = c.confrelid) \
            INNER JOIN pg_catalog.pg_attribute a \
                ON (a.attrelid = cl.oid AND a.attnum = ANY(c.conkey)) \
            INNER JOIN pg_catalog.pg_attribute ab \
                ON (ab.attrelid = c.confrelid AND ab.attnum = ANY(c.confkey)) \
            WHERE n.nspname = ? \
            ORDER BY name, a.attnum, ab.attnum";
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

        let (mut type_name, mut length, mut precision, scale, timezone) =
            Self::parse_type(name, raw_type)?;
        if length.is_none() {
            length = row.int_of("char_length").and_then(|n| u32::try_from(n).ok());
        }
        if type_name == ColumnType::Decimal && precision.is_none() {
            precision = row
                .int_of("column_precision")
                .and_then(|n| u32::try_from(n).ok());
        }
        let scale = scale.or_else(|| row.int_of("column_scale").and_then(|n| u32::try_from(n).ok()));

        // A fractional datetime with precision 0 folds down to the
        // second-precision variant.
        if type_name.is_datetime() {
            precision = precision.or_else(|| {
                row.int_of("datetime_precision")
                    .and_then(|n| u32::try_from(n).ok())
            });
            if precision == Some(0) {
                type_name = type_name.without_fraction();
                precision = None;
            }
        }

        let mut column = ColumnDefinition::new(name, type_name.clone());
        column.length = length;
        column.precision = precision;
        if type_name == ColumnType::Decimal || type_name == ColumnType::Float {
            column.scale = scale;
        }
        column.nullable = row.bool_of("null").unwrap_or(true);
        column.collation = row.str_of("collation_name").map(String::from);
        column.comment = row.str_of("comment").map(String::from);
        column.timezone = timezone;
        if type_name.is_geospatial() {
            // The parser reports the SRID through the precision slot.
            column.srid = precision;
            column.precision = None;
        }

        if row.bool_of("has_serial") == Some(true) {
            column.auto_increment = Some(true);
        }
        match row.str_of("identity_generation") {
            Some("ALWAYS") => {
                column.identity = Some(IdentityGeneration::Always);
                column.auto_increment = Some(true);
            }
            Some("BY DEFAULT") => {
                column.identity = Some(IdentityGeneration::ByDefault);
                column.auto_increment = Some(true);
            }
            _ => {}
        }

        if let Some(raw_default) = row.str_of("default") {
            // Sequence-derived defaults are not literal defaults.
            if raw_default.starts_with("nextval(") {
                column.auto_increment = Some(true);
            } else if raw_default.starts_with("NULL::") {
                column.default = None;
            } else if type_name == ColumnType::Boolean {
                column.default = match raw_default {
                    "true" => Some(DefaultValue::Boolean(true)),
                    "false" => Some(DefaultValue::Boolean(false)),
                    other => Some(DefaultValue::Expression(String::from(other))),
                };
            } else if let Some(unquoted) = unwrap_string_default(raw_default) {
                column.default = Some(DefaultValue::Str(unquoted));
            } else if let Ok(n) = raw_default.parse::<i64>() {
                column.default = Some(DefaultValue::Integer(n));
            } else if let Ok(f) = raw_default.parse::<f64>() {
                column.default = Some(DefaultValue::Float(f));
            } else {
                column.default = Some(DefaultValue::Expression(String::from(raw_default)));
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
        let relname = row.str_of("name").ok_or(DialectError::MissingField {
            field: String::from("name"),
        })?;
        let column = row.str_of("column_name").ok_or(DialectError::MissingField {
            field: String::from("column_name"),
        })?;
        let primary = row.bool_of("is_primary").unwrap_or(false);
        let unique = row.bool_of("is_unique").unwrap_or(false);

        let kind = key_kind(primary, unique);
        // The primary key constraint is registered under the
        // conventional name rather than its backing index name.
        let name = if kind == super::KeyKind::Primary {
            "primary"
        } else {
            relname
        };
        add_key_column(schema, kind, name, column)
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
            if !existing.columns.iter().any(|c| c == column) {
                existing.columns.push(String::from(column));
            }
            if !existing
                .referenced_columns
                .iter()
                .any(|c| c == references_column)
            {
                existing.referenced_columns.push(String::from(references_column));
            }
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

        let auto_increment = wants_auto_increment(schema, column) && column.identity.is_none();
        let mut out = format!(
            "{} {}",
            self.quote_identifier(name),
            Self::native_type(column, auto_increment)
        );

        if let Some(generation) = column.identity {
            out.push_str(&format!(" GENERATED {} AS IDENTITY", generation.as_sql()));
        }
        if column.type_name.is_text() {
            if let Some(collation) = &column.collation {
                out.push_str(&format!(" COLLATE \"{collation}\""));
            }
        }
        if !column.nullable {
            out.push_str(" NOT NULL");
        }
        // Auto-increment wins over any explicit default.
        if !auto_increment && column.identity.is_none() {
            if let Some(default) = &column.default {
                out.push_str(" DEFAULT ");
                out.push_str(&render_default(default, "TRUE", "FALSE", &|v| {
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
            self.quote_table(&schema.name),
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
        let temporary = if schema.temporary { "TEMPORARY " } else { "" };
        let mut statements = vec![format!(
            "CREATE {temporary}TABLE {} (\n{}\n)",
            self.quote_table(&schema.name),
            body.join(",\n")
        )];
        for index in schema.indexes() {
            statements.push(self.index_sql(schema, &index.name)?);
        }
        // Column comments are separate statements, emitted after the
        // table exists.
        for column in schema.columns() {
            if let Some(comment) = &column.comment {
                statements.push(format!(
                    "COMMENT ON COLUMN {}.{} IS {}",
                    self.quote_table(&schema.name),
                    self.quote_identifier(&column.name),
                    self.quote_literal(&SqlValue::Text(comment.clone()))
                ));
            }
        }
        Ok(statements)
    }

    fn add_constraint_sql(&self, schema: &TableSchema) -> Result<Vec<String>, DialectError> {
        let mut statements = Vec::new();
        for constraint in schema.constraints() {
            if constraint.kind == ConstraintKind::Foreign {
                statements.push(format!(
                    "ALTER TABLE {} ADD {}",
                    self.quote_table(&schema.name),
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
                    self.quote_table(&schema.name),
                    self.quote_identifier(&constraint.name)
                ));
            }
        }
        Ok(statements)
    }

    fn truncate_table_sql(&self, schema: &TableSchema) -> Vec<String> {
        vec![format!(
            "TRUNCATE {} RESTART IDENTITY CASCADE",
            self.quote_table(&schema.name)
        )]
    }
}
