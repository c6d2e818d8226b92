//! Full DDL generation passes: one schema rendered by all three
//! dialects, plus constraint alteration and unknown-name errors.

use strata_core::schema::{
    biginteger, boolean, datetime, integer, string, ConstraintDefinition, DefaultValue,
    IndexDefinition, ReferentialAction, TableSchema,
};
use strata_dialect::{
    DialectError, PostgresSchemaDialect, SchemaDialect, SqliteSchemaDialect,
    SqlserverSchemaDialect,
};

fn blog_posts() -> TableSchema {
    let mut schema = TableSchema::new("posts");
    schema
        .add_column(biginteger("id").not_null())
        .unwrap()
        .add_column(string("title", 255).not_null())
        .unwrap()
        .add_column(integer("author_id").not_null())
        .unwrap()
        .add_column(
            boolean("published")
                .not_null()
                .default_value(DefaultValue::Boolean(false)),
        )
        .unwrap()
        .add_column(
            datetime("created")
                .not_null()
                .default_value(DefaultValue::Expression(String::from("current_timestamp"))),
        )
        .unwrap();
    schema
        .add_constraint(ConstraintDefinition::primary(
            "primary",
            vec![String::from("id")],
        ))
        .unwrap();
    schema
        .add_constraint(
            ConstraintDefinition::foreign(
                "posts_author_fk",
                vec![String::from("author_id")],
                "authors",
                vec![String::from("id")],
            )
            .on_delete(ReferentialAction::Cascade),
        )
        .unwrap();
    schema
        .add_index(IndexDefinition::new(
            "posts_created_idx",
            vec![String::from("created")],
        ))
        .unwrap();
    schema
}

#[test]
fn test_postgres_create_table() {
    let statements = PostgresSchemaDialect::new()
        .create_table_sql(&blog_posts())
        .unwrap();
    assert_eq!(statements.len(), 2);

    let create = &statements[0];
    assert!(create.starts_with("CREATE TABLE \"posts\" (\n"));
    assert!(create.contains("\"id\" BIGSERIAL NOT NULL"));
    assert!(create.contains("\"published\" BOOLEAN NOT NULL DEFAULT FALSE"));
    assert!(create.contains("\"created\" TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP"));
    assert!(create.contains("CONSTRAINT \"primary\" PRIMARY KEY (\"id\")"));
    assert!(create.contains(
        "CONSTRAINT \"posts_author_fk\" FOREIGN KEY (\"author_id\") \
         REFERENCES \"authors\" (\"id\") ON DELETE CASCADE"
    ));

    assert_eq!(
        statements[1],
        "CREATE INDEX \"posts_created_idx\" ON \"posts\" (\"created\")"
    );
}

#[test]
fn test_sqlite_create_table() {
    let statements = SqliteSchemaDialect::new()
        .create_table_sql(&blog_posts())
        .unwrap();
    assert_eq!(statements.len(), 2);

    let create = &statements[0];
    // BIGINT single-column primary keys are not rowid aliases, so the
    // constraint stays separate.
    assert!(create.contains("\"id\" BIGINT NOT NULL"));
    assert!(create.contains("CONSTRAINT \"primary\" PRIMARY KEY (\"id\")"));
    assert!(create.contains("\"published\" BOOLEAN NOT NULL DEFAULT 0"));
}

#[test]
fn test_sqlserver_create_table() {
    let statements = SqlserverSchemaDialect::new()
        .create_table_sql(&blog_posts())
        .unwrap();
    assert_eq!(statements.len(), 2);

    let create = &statements[0];
    assert!(create.starts_with("CREATE TABLE [posts] (\n"));
    assert!(create.contains("[id] BIGINT IDENTITY(1, 1) NOT NULL"));
    assert!(create.contains("[published] BIT NOT NULL DEFAULT 0"));
    assert!(create.contains("CONSTRAINT [primary] PRIMARY KEY ([id])"));
}

#[test]
fn test_constraint_alteration_per_backend() {
    let schema = blog_posts();

    let pg = PostgresSchemaDialect::new();
    assert_eq!(
        pg.add_constraint_sql(&schema).unwrap(),
        vec![String::from(
            "ALTER TABLE \"posts\" ADD CONSTRAINT \"posts_author_fk\" \
             FOREIGN KEY (\"author_id\") REFERENCES \"authors\" (\"id\") ON DELETE CASCADE"
        )]
    );
    assert_eq!(
        pg.drop_constraint_sql(&schema).unwrap(),
        vec![String::from(
            "ALTER TABLE \"posts\" DROP CONSTRAINT \"posts_author_fk\""
        )]
    );

    // SQLite cannot alter constraints: the documented no-op.
    let sqlite = SqliteSchemaDialect::new();
    assert!(sqlite.add_constraint_sql(&schema).unwrap().is_empty());
    assert!(sqlite.drop_constraint_sql(&schema).unwrap().is_empty());

    let mssql = SqlserverSchemaDialect::new();
    assert_eq!(
        mssql.drop_constraint_sql(&schema).unwrap(),
        vec![String::from(
            "ALTER TABLE [posts] DROP CONSTRAINT [posts_author_fk]"
        )]
    );
}

#[test]
fn test_truncate_per_backend() {
    let schema = blog_posts();

    assert_eq!(
        PostgresSchemaDialect::new().truncate_table_sql(&schema),
        vec![String::from("TRUNCATE \"posts\" RESTART IDENTITY CASCADE")]
    );
    assert_eq!(
        SqliteSchemaDialect::new().truncate_table_sql(&schema),
        vec![
            String::from("DELETE FROM sqlite_sequence WHERE name = 'posts'"),
            String::from("DELETE FROM \"posts\""),
        ]
    );
    assert_eq!(
        SqlserverSchemaDialect::new().truncate_table_sql(&schema),
        vec![
            String::from("DELETE FROM [posts]"),
            String::from("DBCC CHECKIDENT('posts', RESEED, 0)"),
        ]
    );
}

#[test]
fn test_drop_table_per_backend() {
    let schema = blog_posts();
    assert_eq!(
        PostgresSchemaDialect::new().drop_table_sql(&schema),
        vec![String::from("DROP TABLE \"posts\"")]
    );
    assert_eq!(
        SqlserverSchemaDialect::new().drop_table_sql(&schema),
        vec![String::from("DROP TABLE [posts]")]
    );
}

#[test]
fn test_unknown_names_error() {
    let schema = blog_posts();
    let dialect = PostgresSchemaDialect::new();

    assert!(matches!(
        dialect.column_sql(&schema, "ghost"),
        Err(DialectError::MissingColumn { .. })
    ));
    assert!(matches!(
        dialect.constraint_sql(&schema, "ghost"),
        Err(DialectError::MissingConstraint { .. })
    ));
    assert!(matches!(
        dialect.index_sql(&schema, "ghost"),
        Err(DialectError::MissingIndex { .. })
    ));
}
