use std::collections::BTreeMap;

use tokio::net::TcpStream;
use tokio_util::compat::Compat;
use tiberius::Client;

use crate::error::DbsdlError;
use crate::introspect::constraint_edges;
use crate::schema::{ForeignKeyEdge, QualifiedTableName};

pub async fn query_primary_keys(
    client: &mut Client<Compat<TcpStream>>,
    schema: &str,
    table_name: &str,
) -> Result<Vec<String>, DbsdlError> {
    let query = r#"
        SELECT kcu.COLUMN_NAME
        FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
        JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
            ON kcu.CONSTRAINT_NAME = tc.CONSTRAINT_NAME
            AND kcu.TABLE_SCHEMA = tc.TABLE_SCHEMA
            AND kcu.TABLE_NAME = tc.TABLE_NAME
        WHERE tc.TABLE_SCHEMA = @P1
          AND tc.TABLE_NAME = @P2
          AND tc.CONSTRAINT_TYPE = 'PRIMARY KEY'
        ORDER BY kcu.ORDINAL_POSITION
    "#;

    let stream = client.query(query, &[&schema, &table_name]).await?;
    let rows = stream.into_first_result().await?;

    Ok(rows
        .iter()
        .filter_map(|row| row.get::<&str, _>("COLUMN_NAME").map(|s| s.to_string()))
        .collect())
}

pub async fn query_foreign_keys(
    client: &mut Client<Compat<TcpStream>>,
    table: &QualifiedTableName,
) -> Result<Vec<ForeignKeyEdge>, DbsdlError> {
    let fk_query = r#"
        SELECT
            fk.name AS constraint_name,
            COL_NAME(fkc.parent_object_id, fkc.parent_column_id) AS column_name,
            SCHEMA_NAME(ref_t.schema_id) AS ref_schema,
            ref_t.name AS ref_table,
            COL_NAME(fkc.referenced_object_id, fkc.referenced_column_id) AS ref_column
        FROM sys.foreign_keys fk
        JOIN sys.foreign_key_columns fkc ON fkc.constraint_object_id = fk.object_id
        JOIN sys.tables ref_t ON ref_t.object_id = fk.referenced_object_id
        WHERE fk.parent_object_id = OBJECT_ID(QUOTENAME(@P1) + '.' + QUOTENAME(@P2))
        ORDER BY fk.name, fkc.constraint_column_id
    "#;

    let stream = client
        .query(fk_query, &[&table.schema.as_str(), &table.name.as_str()])
        .await?;
    let fk_rows = stream.into_first_result().await?;

    let mut fk_map: BTreeMap<String, FkAccumulator> = BTreeMap::new();
    for row in fk_rows {
        let text = |column: &str| row.get::<&str, _>(column).unwrap_or("").to_string();

        let acc = fk_map
            .entry(text("constraint_name"))
            .or_insert_with(|| FkAccumulator {
                columns: Vec::new(),
                ref_schema: text("ref_schema"),
                ref_table: text("ref_table"),
                ref_columns: Vec::new(),
            });
        acc.columns.push(text("column_name"));
        acc.ref_columns.push(text("ref_column"));
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
