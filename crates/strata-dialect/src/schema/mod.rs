//! Schema dialects: catalog introspection and DDL generation.
//!
//! A [`SchemaDialect`] translates in both directions between one
//! backend's catalog metadata and the canonical schema model. The
//! introspection half produces catalog queries and folds their rows
//! into a [`TableSchema`]; the generation half renders a populated
//! schema back as dialect-correct DDL statements.

mod postgres;
mod sqlite;
mod sqlserver;

pub use postgres::PostgresSchemaDialect;
pub use sqlite::SqliteSchemaDialect;
pub use sqlserver::SqlserverSchemaDialect;

use strata_core::schema::{
    ColumnDefinition, ConstraintDefinition, ConstraintKind, DefaultValue, IndexDefinition,
    TableSchema,
};
use strata_core::value::SqlValue;

use crate::config::DriverConfig;
use crate::connection::{Connection, Row};
use crate::error::DialectError;

/// A table reference, optionally schema-qualified with `.`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    /// The schema qualifier, when present.
    pub schema: Option<String>,
    /// The bare table name.
    pub table: String,
}

impl TableName {
    /// Splits `name` on the first `.` into schema and table.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.split_once('.') {
            Some((schema, table)) => Self {
                schema: Some(String::from(schema)),
                table: String::from(table),
            },
            None => Self {
                schema: None,
                table: String::from(name),
            },
        }
    }

    /// The schema qualifier, falling back to the config's schema and
    /// then to `default`.
    #[must_use]
    pub fn schema_or<'a>(&'a self, config: &'a DriverConfig, default: &'a str) -> &'a str {
        self.schema
            .as_deref()
            .or(config.schema.as_deref())
            .unwrap_or(default)
    }
}

/// Per-backend translator between catalog metadata and the canonical
/// schema model.
///
/// Introspection methods come in pairs: a `*_sql` method producing the
/// catalog query and its positional parameters, and a `convert_*`
/// method folding one raw row into the schema under construction.
/// Generation methods consume a populated schema; callers execute the
/// returned statements in order.
pub trait SchemaDialect {
    /// The dialect name.
    fn name(&self) -> &'static str;

    /// Quotes an identifier for DDL output.
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Quotes a value as a literal for DDL output.
    fn quote_literal(&self, value: &SqlValue) -> String {
        value.to_sql_inline()
    }

    /// The query listing user table names.
    fn list_tables_sql(&self, config: &DriverConfig) -> (String, Vec<SqlValue>);

    /// The column catalog query for `table`.
    fn describe_columns_sql(&self, table: &str, config: &DriverConfig) -> (String, Vec<SqlValue>);

    /// The index catalog query for `table`.
    fn describe_indexes_sql(&self, table: &str, config: &DriverConfig) -> (String, Vec<SqlValue>);

    /// The foreign key catalog query for `table`.
    fn describe_foreign_keys_sql(
        &self,
        table: &str,
        config: &DriverConfig,
    ) -> (String, Vec<SqlValue>);

    /// Folds one column catalog row into `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::UnparsableType`] for a native type string
    /// outside the dialect's grammar, and [`DialectError::MissingField`]
    /// for malformed rows.
    fn convert_column_description(
        &self,
        schema: &mut TableSchema,
        row: &Row,
    ) -> Result<(), DialectError>;

    /// Folds one index catalog row into `schema`. Backends whose index
    /// catalog is nested issue follow-up queries through `conn`.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::MissingField`] for malformed rows and
    /// propagates follow-up query failures.
    fn convert_index_description(
        &self,
        schema: &mut TableSchema,
        row: &Row,
        conn: &mut dyn Connection,
    ) -> Result<(), DialectError>;

    /// Folds one foreign key catalog row into `schema`, grouping
    /// multi-column keys by their shared constraint identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::MissingField`] for malformed rows.
    fn convert_foreign_key_description(
        &self,
        schema: &mut TableSchema,
        row: &Row,
    ) -> Result<(), DialectError>;

    /// Renders one column's DDL fragment.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::MissingColumn`] when `name` is not in
    /// `schema`.
    fn column_sql(&self, schema: &TableSchema, name: &str) -> Result<String, DialectError>;

    /// Renders one constraint's DDL fragment.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::MissingConstraint`] when `name` is not in
    /// `schema`.
    fn constraint_sql(&self, schema: &TableSchema, name: &str) -> Result<String, DialectError>;

    /// Renders one `CREATE INDEX` statement.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::MissingIndex`] when `name` is not in
    /// `schema`.
    fn index_sql(&self, schema: &TableSchema, name: &str) -> Result<String, DialectError>;

    /// Renders the ordered statements creating `schema`'s table,
    /// indexes and (where the backend needs them) trailing comments.
    ///
    /// # Errors
    ///
    /// Propagates fragment-rendering errors.
    fn create_table_sql(&self, schema: &TableSchema) -> Result<Vec<String>, DialectError>;

    /// Renders the statements adding `schema`'s foreign key constraints
    /// to an existing table.
    ///
    /// # Errors
    ///
    /// Propagates fragment-rendering errors.
    fn add_constraint_sql(&self, schema: &TableSchema) -> Result<Vec<String>, DialectError>;

    /// Renders the statements dropping `schema`'s foreign key
    /// constraints from an existing table.
    ///
    /// # Errors
    ///
    /// Propagates fragment-rendering errors.
    fn drop_constraint_sql(&self, schema: &TableSchema) -> Result<Vec<String>, DialectError>;

    /// Renders the statements truncating the table, resetting
    /// auto-increment state where the backend supports it.
    fn truncate_table_sql(&self, schema: &TableSchema) -> Vec<String>;

    /// Renders the statement dropping the table.
    fn drop_table_sql(&self, schema: &TableSchema) -> Vec<String> {
        vec![format!(
            "DROP TABLE {}",
            self.quote_identifier(&schema.name)
        )]
    }
}

/// Resolved kind of one key catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyKind {
    Primary,
    Unique,
    Index,
}

/// The tie-break shared by every backend: the primary flag wins over
/// uniqueness, uniqueness wins over a plain index.
pub(crate) const fn key_kind(primary: bool, unique: bool) -> KeyKind {
    if primary {
        KeyKind::Primary
    } else if unique {
        KeyKind::Unique
    } else {
        KeyKind::Index
    }
}

/// Folds one (key name, column) pair into the schema: appends to an
/// already-seen key of that name, or starts a new constraint/index.
pub(crate) fn add_key_column(
    schema: &mut TableSchema,
    kind: KeyKind,
    name: &str,
    column: &str,
) -> Result<(), DialectError> {
    if let Some(constraint) = schema.constraint_mut(name) {
        constraint.columns.push(String::from(column));
        return Ok(());
    }
    if let Some(index) = schema.index_mut(name) {
        index.columns.push(String::from(column));
        index.lengths.push(None);
        return Ok(());
    }
    match kind {
        KeyKind::Primary => {
            schema.add_constraint(ConstraintDefinition::primary(
                name,
                vec![String::from(column)],
            ))?;
        }
        KeyKind::Unique => {
            schema.add_constraint(ConstraintDefinition::unique(
                name,
                vec![String::from(column)],
            ))?;
        }
        KeyKind::Index => {
            schema.add_index(IndexDefinition::new(name, vec![String::from(column)]))?;
        }
    }
    Ok(())
}

/// Splits a parenthesized type argument list such as `10,2` into
/// (first, second).
pub(crate) fn split_type_args(args: &str) -> (Option<u32>, Option<u32>) {
    let mut parts = args.split(',').map(|p| p.trim().parse::<u32>().ok());
    let first = parts.next().flatten();
    let second = parts.next().flatten();
    (first, second)
}

/// Unwraps a single-quoted catalog default, undoing doubled quotes.
/// Trailing cast suffixes (`::character varying`) are dropped first.
pub(crate) fn unwrap_string_default(raw: &str) -> Option<String> {
    let trimmed = match raw.find("::") {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    let trimmed = trimmed.trim();
    let inner = trimmed.strip_prefix('\'')?.strip_suffix('\'')?;
    Some(inner.replace("''", "'"))
}

/// Renders a column default for DDL, with the backend's boolean
/// spelling injected. Current-timestamp keywords render unquoted and
/// upper-cased.
pub(crate) fn render_default(
    default: &DefaultValue,
    bool_true: &str,
    bool_false: &str,
    quote_literal: &dyn Fn(&SqlValue) -> String,
) -> String {
    match default {
        DefaultValue::Null => String::from("NULL"),
        DefaultValue::Boolean(b) => String::from(if *b { bool_true } else { bool_false }),
        DefaultValue::Integer(n) => n.to_string(),
        DefaultValue::Float(f) => f.to_string(),
        DefaultValue::Str(s) => quote_literal(&SqlValue::Text(s.clone())),
        DefaultValue::Expression(expr) => {
            if default.is_current_timestamp() {
                expr.to_uppercase()
            } else {
                expr.clone()
            }
        }
    }
}

/// Whether `column` should render the backend's auto-increment clause:
/// either explicitly requested, or a single-column integer-family
/// primary key that has not opted out. Composite keys never qualify.
pub(crate) fn wants_auto_increment(schema: &TableSchema, column: &ColumnDefinition) -> bool {
    if column.auto_increment == Some(false) {
        return false;
    }
    if column.auto_increment == Some(true) {
        return true;
    }
    column.type_name.is_integer() && schema.is_single_integer_primary(&column.name)
}

/// Whether the schema's primary key is exactly `column`.
pub(crate) fn is_primary_column(schema: &TableSchema, column: &str) -> bool {
    schema
        .primary_key()
        .is_some_and(|pk| pk.columns.len() == 1 && pk.columns[0] == column)
}

/// Shared `CREATE TABLE` body assembly: column fragments, then
/// constraint fragments, joined the way every backend lays them out.
pub(crate) fn create_table_body(
    dialect: &dyn SchemaDialect,
    schema: &TableSchema,
    skip_constraint: impl Fn(&ConstraintDefinition) -> bool,
) -> Result<Vec<String>, DialectError> {
    let mut parts = Vec::new();
    for column in schema.columns() {
        parts.push(format!("    {}", dialect.column_sql(schema, &column.name)?));
    }
    for constraint in schema.constraints() {
        if skip_constraint(constraint) {
            continue;
        }
        parts.push(format!(
            "    {}",
            dialect.constraint_sql(schema, &constraint.name)?
        ));
    }
    Ok(parts)
}

/// Shared constraint fragment rendering: `CONSTRAINT name PRIMARY KEY /
/// UNIQUE / FOREIGN KEY ... REFERENCES ...`.
pub(crate) fn constraint_fragment(
    dialect: &dyn SchemaDialect,
    constraint: &ConstraintDefinition,
) -> String {
    let columns = quote_all(dialect, &constraint.columns);
    let mut out = format!("CONSTRAINT {} ", dialect.quote_identifier(&constraint.name));
    match constraint.kind {
        ConstraintKind::Primary => {
            out.push_str(&format!("PRIMARY KEY ({columns})"));
        }
        ConstraintKind::Unique => {
            out.push_str(&format!("UNIQUE ({columns})"));
        }
        ConstraintKind::Foreign => {
            out.push_str(&format!("FOREIGN KEY ({columns})"));
            if let Some(table) = &constraint.referenced_table {
                out.push_str(&format!(
                    " REFERENCES {} ({})",
                    dialect.quote_identifier(table),
                    quote_all(dialect, &constraint.referenced_columns)
                ));
            }
            if let Some(action) = constraint.on_update {
                out.push_str(" ON UPDATE ");
                out.push_str(action.as_sql());
            }
            if let Some(action) = constraint.on_delete {
                out.push_str(" ON DELETE ");
                out.push_str(action.as_sql());
            }
        }
    }
    out
}

pub(crate) fn quote_all(dialect: &dyn SchemaDialect, names: &[String]) -> String {
    names
        .iter()
        .map(|n| dialect.quote_identifier(n))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
pub(crate) mod tests_support {
    use crate::connection::{Connection, ConnectionError, Params, Row};

    /// A connection double for convert methods that never query.
    pub struct NullConnection;

    impl Connection for NullConnection {
        fn execute(&mut self, _sql: &str, _params: Params<'_>) -> Result<Vec<Row>, ConnectionError> {
            Ok(Vec::new())
        }

        fn version(&self) -> String {
            String::from("0")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_parsing() {
        let plain = TableName::parse("posts");
        assert_eq!(plain.schema, None);
        assert_eq!(plain.table, "posts");

        let qualified = TableName::parse("app.posts");
        assert_eq!(qualified.schema.as_deref(), Some("app"));
        assert_eq!(qualified.table, "posts");
    }

    #[test]
    fn test_key_kind_tie_break() {
        // Primary wins over unique when both flags are set.
        assert_eq!(key_kind(true, true), KeyKind::Primary);
        assert_eq!(key_kind(false, true), KeyKind::Unique);
        assert_eq!(key_kind(false, false), KeyKind::Index);
    }

    #[test]
    fn test_split_type_args() {
        assert_eq!(split_type_args("10,2"), (Some(10), Some(2)));
        assert_eq!(split_type_args("255"), (Some(255), None));
        assert_eq!(split_type_args("x"), (None, None));
    }

    #[test]
    fn test_unwrap_string_default() {
        assert_eq!(
            unwrap_string_default("'draft'::character varying").as_deref(),
            Some("draft")
        );
        assert_eq!(unwrap_string_default("'it''s'").as_deref(), Some("it's"));
        assert_eq!(unwrap_string_default("nextval('seq')"), None);
        assert_eq!(unwrap_string_default("42"), None);
    }
}
