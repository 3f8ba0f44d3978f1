use std::collections::BTreeMap;

use sqlx::PgPool;

use crate::error::DbsdlError;
use crate::introspect::constraint_edges;
use crate::schema::{ForeignKeyEdge, QualifiedTableName};

pub async fn query_primary_keys(
    pool: &PgPool,
    schema: &str,
    table_name: &str,
) -> Result<Vec<String>, DbsdlError> {
    let rows = sqlx::query_as::<_, PkRow>(
        r#"
        SELECT kcu.column_name
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
            USING (constraint_name, table_schema, table_name)
        WHERE tc.table_schema = $1 AND tc.table_name = $2
            AND tc.constraint_type = 'PRIMARY KEY'
        ORDER BY kcu.ordinal_position
        "#,
    )
    .bind(schema)
    .bind(table_name)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.column_name).collect())
}

pub async fn query_foreign_keys(
    pool: &PgPool,
    table: &QualifiedTableName,
) -> Result<Vec<ForeignKeyEdge>, DbsdlError> {
    // constraint_column_usage has no ordinal, so the referenced side is read
    // through the unique constraint it points at.
    let rows = sqlx::query_as::<_, FkRow>(
        r#"
        SELECT kcu.column_name, ref.table_schema AS ref_schema, ref.table_name AS ref_table,
               ref.column_name AS ref_column, tc.constraint_name
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
            ON kcu.constraint_name = tc.constraint_name
            AND kcu.table_schema = tc.table_schema
            AND kcu.table_name = tc.table_name
        JOIN information_schema.referential_constraints rc
            ON rc.constraint_name = tc.constraint_name
            AND rc.constraint_schema = tc.constraint_schema
        JOIN information_schema.key_column_usage ref
            ON ref.constraint_name = rc.unique_constraint_name
            AND ref.constraint_schema = rc.unique_constraint_schema
            AND ref.ordinal_position = kcu.position_in_unique_constraint
        WHERE tc.table_schema = $1 AND tc.table_name = $2
            AND tc.constraint_type = 'FOREIGN KEY'
        ORDER BY tc.constraint_name, kcu.ordinal_position
        "#,
    )
    .bind(&table.schema)
    .bind(&table.name)
    .fetch_all(pool)
    .await?;

    // Group FK columns by constraint name
    let mut fk_map: BTreeMap<String, FkAccumulator> = BTreeMap::new();
    for row in rows {
        let acc = fk_map
            .entry(row.constraint_name.clone())
            .or_insert_with(|| FkAccumulator {
                columns: Vec::new(),
                ref_schema: row.ref_schema.clone(),
                ref_table: row.ref_table.clone(),
                ref_columns: Vec::new(),
            });
        acc.columns.push(row.column_name);
        acc.ref_columns.push(row.ref_column);
    }

    let mut edges = Vec::new();
    for (name, acc) in fk_map {
        edges.extend(constraint_edges(
            table,
            name,
            acc.columns,
            acc.ref_schema,
            acc.ref_table,
            acc.ref_columns,
        )?);
    }
    Ok(edges)
}

struct FkAccumulator {
    columns: Vec<String>,
    ref_schema: String,
    ref_table: String,
    ref_columns: Vec<String>,
}

#[derive(sqlx::FromRow)]
struct PkRow {
    column_name: String,
}

#[derive(sqlx::FromRow)]
struct FkRow {
    column_name: String,
    ref_schema: String,
    ref_table: String,
    ref_column: String,
    constraint_name: String,
}
