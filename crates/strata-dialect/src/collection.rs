//! Describe orchestration.
//!
//! A [`SchemaCollection`] drives one introspection pass: it executes the
//! dialect's catalog queries through the driver and folds every raw row
//! into a fresh [`TableSchema`]. [`CachedCollection`] decorates it with
//! an externally-owned cache keyed by backend, database and table, plus
//! a force-refresh escape hatch. The cache itself lives outside this
//! crate; only the [`SchemaCache`] trait is defined here.

use tracing::debug;

use strata_core::schema::TableSchema;

use crate::connection::Params;
use crate::driver::{Backend, Driver};
use crate::error::DialectError;
use crate::schema::SchemaDialect;

/// Externally-owned schema cache consulted by [`CachedCollection`].
pub trait SchemaCache {
    /// The cached schema for `key`, if any.
    fn get(&self, key: &str) -> Option<TableSchema>;

    /// Stores `schema` under `key`.
    fn set(&mut self, key: &str, schema: &TableSchema);
}

/// Runs describe passes against one driver.
pub struct SchemaCollection<'a, B: Backend> {
    driver: &'a mut Driver<B>,
}

impl<'a, B: Backend> SchemaCollection<'a, B> {
    /// Creates a collection over `driver`.
    pub fn new(driver: &'a mut Driver<B>) -> Self {
        Self { driver }
    }

    /// The names of the user tables in the configured database.
    ///
    /// # Errors
    ///
    /// Returns a [`DialectError`] on query failure.
    pub fn list_tables(&mut self) -> Result<Vec<String>, DialectError> {
        let dialect = B::Dialect::default();
        let (sql, params) = dialect.list_tables_sql(self.driver.config());
        let rows = self.driver.execute(&sql, Params::Positional(&params))?;
        Ok(rows
            .iter()
            .filter_map(|row| row.str_of("name").map(String::from))
            .collect())
    }

    /// Describes `table` into a canonical schema: columns, then
    /// indexes and constraints, then foreign keys.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::MissingTable`] when the column pass
    /// yields nothing; other failures are wrapped with the table name.
    pub fn describe(&mut self, table: &str) -> Result<TableSchema, DialectError> {
        let dialect = B::Dialect::default();
        debug!(table, dialect = dialect.name(), "describing table");

        let mut schema = TableSchema::new(table);
        self.column_pass(&dialect, &mut schema, table)?;
        self.index_pass(&dialect, &mut schema, table)?;
        self.foreign_key_pass(&dialect, &mut schema, table)?;
        Ok(schema)
    }

    /// The column definitions of `table`, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::MissingTable`] when the table does not
    /// exist.
    pub fn describe_columns(
        &mut self,
        table: &str,
    ) -> Result<Vec<strata_core::schema::ColumnDefinition>, DialectError> {
        let dialect = B::Dialect::default();
        let mut schema = TableSchema::new(table);
        self.column_pass(&dialect, &mut schema, table)?;
        Ok(schema.columns().to_vec())
    }

    /// The plain indexes of `table`. The column pass runs first since
    /// index folding validates column references.
    ///
    /// # Errors
    ///
    /// Propagates describe failures wrapped with the table name.
    pub fn describe_indexes(
        &mut self,
        table: &str,
    ) -> Result<Vec<strata_core::schema::IndexDefinition>, DialectError> {
        let dialect = B::Dialect::default();
        let mut schema = TableSchema::new(table);
        self.column_pass(&dialect, &mut schema, table)?;
        self.index_pass(&dialect, &mut schema, table)?;
        Ok(schema.indexes().to_vec())
    }

    /// The foreign key constraints of `table`.
    ///
    /// # Errors
    ///
    /// Propagates describe failures wrapped with the table name.
    pub fn describe_foreign_keys(
        &mut self,
        table: &str,
    ) -> Result<Vec<strata_core::schema::ConstraintDefinition>, DialectError> {
        let dialect = B::Dialect::default();
        let mut schema = TableSchema::new(table);
        self.column_pass(&dialect, &mut schema, table)?;
        self.foreign_key_pass(&dialect, &mut schema, table)?;
        Ok(schema
            .constraints()
            .iter()
            .filter(|c| c.kind == strata_core::schema::ConstraintKind::Foreign)
            .cloned()
            .collect())
    }

    fn column_pass(
        &mut self,
        dialect: &B::Dialect,
        schema: &mut TableSchema,
        table: &str,
    ) -> Result<(), DialectError> {
        let config = self.driver.config().clone();
        let (sql, params) = dialect.describe_columns_sql(table, &config);
        let rows = self
            .driver
            .execute(&sql, Params::Positional(&params))
            .map_err(|e| e.for_table(table))?;
        if rows.is_empty() {
            return Err(DialectError::MissingTable {
                table: String::from(table),
            });
        }
        for row in &rows {
            dialect
                .convert_column_description(schema, row)
                .map_err(|e| e.for_table(table))?;
        }
        Ok(())
    }

    fn index_pass(
        &mut self,
        dialect: &B::Dialect,
        schema: &mut TableSchema,
        table: &str,
    ) -> Result<(), DialectError> {
        let config = self.driver.config().clone();
        let (sql, params) = dialect.describe_indexes_sql(table, &config);
        let rows = self
            .driver
            .execute(&sql, Params::Positional(&params))
            .map_err(|e| e.for_table(table))?;
        for row in &rows {
            let conn = self.driver.connection_mut()?;
            dialect
                .convert_index_description(schema, row, conn)
                .map_err(|e| e.for_table(table))?;
        }
        Ok(())
    }

    fn foreign_key_pass(
        &mut self,
        dialect: &B::Dialect,
        schema: &mut TableSchema,
        table: &str,
    ) -> Result<(), DialectError> {
        let config = self.driver.config().clone();
        let (sql, params) = dialect.describe_foreign_keys_sql(table, &config);
        let rows = self
            .driver
            .execute(&sql, Params::Positional(&params))
            .map_err(|e| e.for_table(table))?;
        for row in &rows {
            dialect
                .convert_foreign_key_description(schema, row)
                .map_err(|e| e.for_table(table))?;
        }
        Ok(())
    }
}

/// A [`SchemaCollection`] decorated with an external cache.
pub struct CachedCollection<'a, B: Backend> {
    collection: SchemaCollection<'a, B>,
    cache: &'a mut dyn SchemaCache,
    refresh: bool,
}

impl<'a, B: Backend> CachedCollection<'a, B> {
    /// Creates a cached collection over `driver` and `cache`.
    pub fn new(driver: &'a mut Driver<B>, cache: &'a mut dyn SchemaCache) -> Self {
        Self {
            collection: SchemaCollection::new(driver),
            cache,
            refresh: false,
        }
    }

    /// Forces the next describes to bypass the cache and re-store.
    #[must_use]
    pub fn refresh(mut self, enabled: bool) -> Self {
        self.refresh = enabled;
        self
    }

    /// The cache key for `table`: backend, database and table name.
    #[must_use]
    pub fn cache_key(&self, table: &str) -> String {
        format!(
            "{}_{}_{}",
            self.collection.driver.backend().name(),
            self.collection.driver.config().database,
            table.replace('.', "_")
        )
    }

    /// Describes `table`, returning the cached schema when one exists
    /// and refresh is off.
    ///
    /// # Errors
    ///
    /// Propagates the underlying describe failure.
    pub fn describe(&mut self, table: &str) -> Result<TableSchema, DialectError> {
        let key = self.cache_key(table);
        if !self.refresh {
            if let Some(schema) = self.cache.get(&key) {
                debug!(table, "schema cache hit");
                return Ok(schema);
            }
        }
        let schema = self.collection.describe(table)?;
        self.cache.set(&key, &schema);
        Ok(schema)
    }
}
