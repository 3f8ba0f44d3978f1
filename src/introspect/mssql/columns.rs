use tokio::net::TcpStream;
use tokio_util::compat::Compat;
use tiberius::Client;

use crate::error::DbsdlError;
use crate::schema::ColumnDescriptor;

pub async fn query_columns(
    client: &mut Client<Compat<TcpStream>>,
    schema: &str,
    table_name: &str,
) -> Result<Vec<ColumnDescriptor>, DbsdlError> {
    let query = r#"
        SELECT
            c.COLUMN_NAME,
            CASE WHEN c.IS_NULLABLE = 'YES' THEN 1 ELSE 0 END AS is_nullable,
            c.DATA_TYPE,
            c.CHARACTER_MAXIMUM_LENGTH,
            c.NUMERIC_PRECISION,
            c.NUMERIC_SCALE,
            c.COLUMN_DEFAULT,
            COLUMNPROPERTY(OBJECT_ID(QUOTENAME(c.TABLE_SCHEMA) + '.' + QUOTENAME(c.TABLE_NAME)), c.COLUMN_NAME, 'IsIdentity') AS is_identity
        FROM INFORMATION_SCHEMA.COLUMNS c
        WHERE c.TABLE_SCHEMA = @P1 AND c.TABLE_NAME = @P2
        ORDER BY c.ORDINAL_POSITION
    "#;

    let stream = client.query(query, &[&schema, &table_name]).await?;
    let rows = stream.into_first_result().await?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        // CHARACTER_MAXIMUM_LENGTH is -1 for varchar(max)/nvarchar(max)
        let character_maximum_length = row.get::<i32, _>("CHARACTER_MAXIMUM_LENGTH");

        columns.push(ColumnDescriptor {
            name: row
                .get::<&str, _>("COLUMN_NAME")
                .unwrap_or("")
                .to_string(),
            data_type: row
                .get::<&str, _>("DATA_TYPE")
                .unwrap_or("")
                .to_lowercase(),
            is_nullable: row.get::<i32, _>("is_nullable").unwrap_or(0) == 1,
            character_maximum_length,
            numeric_precision: row
                .get::<u8, _>("NUMERIC_PRECISION")
                .map(i32::from),
            numeric_scale: row.get::<i32, _>("NUMERIC_SCALE"),
            column_default: row
                .get::<&str, _>("COLUMN_DEFAULT")
                .map(|s| s.to_string()),
            is_primary_key: false,
            is_foreign_key: false,
            is_identity: row.get::<i32, _>("is_identity").unwrap_or(0) == 1,
        });
    }

    Ok(columns)
}
