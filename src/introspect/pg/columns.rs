use sqlx::PgPool;

use crate::error::DbsdlError;
use crate::schema::ColumnDescriptor;

pub async fn query_columns(
    pool: &PgPool,
    schema: &str,
    table_name: &str,
) -> Result<Vec<ColumnDescriptor>, DbsdlError> {
    let rows = sqlx::query_as::<_, ColumnRow>(
        r#"
        SELECT c.column_name, c.is_nullable = 'YES' AS is_nullable,
               c.udt_name, c.character_maximum_length::int4,
               c.numeric_precision::int4, c.numeric_scale::int4, c.column_default,
               (c.is_identity = 'YES' OR coalesce(c.column_default, '') LIKE 'nextval(%') AS is_identity
        FROM information_schema.columns c
        WHERE c.table_schema = $1 AND c.table_name = $2
        ORDER BY c.ordinal_position
        "#,
    )
    .bind(schema)
    .bind(table_name)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| ColumnDescriptor {
            name: row.column_name,
            data_type: row.udt_name,
            is_nullable: row.is_nullable,
            character_maximum_length: row.character_maximum_length,
            numeric_precision: row.numeric_precision,
            numeric_scale: row.numeric_scale,
            column_default: row.column_default,
            is_primary_key: false,
            is_foreign_key: false,
            is_identity: row.is_identity,
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct ColumnRow {
    column_name: String,
    is_nullable: bool,
    udt_name: String,
    character_maximum_length: Option<i32>,
    numeric_precision: Option<i32>,
    numeric_scale: Option<i32>,
    column_default: Option<String>,
    is_identity: bool,
}
