use tokio::net::TcpStream;
use tokio_util::compat::Compat;
use tiberius::Client;

use crate::error::DbsdlError;
use crate::schema::QualifiedTableName;

pub async fn query_schemas(client: &mut Client<Compat<TcpStream>>) -> Result<Vec<String>, DbsdlError> {
    // Fixed roles own a schema each (db_owner, db_datareader, ...).
    let query = r#"
        SELECT s.name
        FROM sys.schemas s
        WHERE s.name NOT IN ('sys', 'INFORMATION_SCHEMA', 'guest')
          AND s.name NOT LIKE 'db[_]%'
        ORDER BY s.name
    "#;

    let stream = client.query(query, &[]).await?;
    let rows = stream.into_first_result().await?;

    Ok(rows
        .iter()
        .filter_map(|row| row.get::<&str, _>("name").map(|s| s.to_string()))
        .collect())
}

pub async fn query_tables(
    client: &mut Client<Compat<TcpStream>>,
    schema: &str,
) -> Result<Vec<QualifiedTableName>, DbsdlError> {
    let query = r#"
        SELECT t.TABLE_SCHEMA, t.TABLE_NAME
        FROM INFORMATION_SCHEMA.TABLES t
        WHERE t.TABLE_SCHEMA = @P1
          AND t.TABLE_TYPE = 'BASE TABLE'
        ORDER BY t.TABLE_NAME
    "#;

    let stream = client.query(query, &[&schema]).await?;
    let rows = stream.into_first_result().await?;

    Ok(rows
        .iter()
        .map(|row| {
            QualifiedTableName::new(
                row.get::<&str, _>("TABLE_SCHEMA").unwrap_or(""),
                row.get::<&str, _>("TABLE_NAME").unwrap_or(""),
            )
        })
        .collect())
}
