use sqlx::PgPool;

use crate::error::DbsdlError;
use crate::schema::QualifiedTableName;

pub async fn query_schemas(pool: &PgPool) -> Result<Vec<String>, DbsdlError> {
    let rows = sqlx::query_as::<_, SchemaRow>(
        r#"
        SELECT s.schema_name
        FROM information_schema.schemata s
        WHERE s.schema_name NOT IN ('information_schema', 'pg_catalog')
          AND s.schema_name NOT LIKE 'pg\_%'
        ORDER BY s.schema_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.schema_name).collect())
}

pub async fn query_tables(pool: &PgPool, schema: &str) -> Result<Vec<QualifiedTableName>, DbsdlError> {
    let rows = sqlx::query_as::<_, TableRow>(
        r#"
        SELECT t.table_schema, t.table_name
        FROM information_schema.tables t
        WHERE t.table_schema = $1
          AND t.table_type = 'BASE TABLE'
        ORDER BY t.table_name
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| QualifiedTableName::new(row.table_schema, row.table_name))
        .collect())
}

#[derive(sqlx::FromRow)]
struct SchemaRow {
    schema_name: String,
}

#[derive(sqlx::FromRow)]
struct TableRow {
    table_schema: String,
    table_name: String,
}
