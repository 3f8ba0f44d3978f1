mod columns;
mod constraints;
mod tables;

use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tiberius::{Client, Config, EncryptionLevel};

use crate::cli::ConnectionConfig;
use crate::error::DbsdlError;
use crate::introspect::MetadataProvider;
use crate::schema::{ForeignKeyEdge, QualifiedTableName, TableDescriptor};

/// Reads catalog metadata from a SQL Server database.
pub struct MssqlProvider {
    client: Client<Compat<TcpStream>>,
}

impl MssqlProvider {
    /// Establish a connection to a MSSQL server.
    pub async fn connect(conn: &ConnectionConfig) -> Result<Self, DbsdlError> {
        let mut config = Config::new();
        config.host(&conn.host);
        config.port(conn.port);
        config.database(&conn.database);
        config.authentication(tiberius::AuthMethod::sql_server(&conn.user, &conn.password));
        config.encryption(EncryptionLevel::Required);
        if conn.trust_cert {
            config.trust_cert();
        }

        let tcp = TcpStream::connect(config.get_addr()).await.map_err(|e| {
            DbsdlError::Connection(format!(
                "TCP connection to {}:{} failed: {e}",
                conn.host, conn.port
            ))
        })?;
        tcp.set_nodelay(true)
            .map_err(|e| DbsdlError::Connection(format!("Failed to set TCP_NODELAY: {e}")))?;

        let client = Client::connect(config, tcp.compat_write()).await?;
        Ok(Self { client })
    }
}

impl MetadataProvider for MssqlProvider {
    async fn list_schemas(&mut self) -> Result<Vec<String>, DbsdlError> {
        tables::query_schemas(&mut self.client).await
    }

    async fn list_tables(&mut self, schemas: &[String]) -> Result<Vec<QualifiedTableName>, DbsdlError> {
        let mut all_tables = Vec::new();
        for schema in schemas {
            all_tables.extend(tables::query_tables(&mut self.client, schema).await?);
        }
        Ok(all_tables)
    }

    async fn describe_table(&mut self, table: &QualifiedTableName) -> Result<TableDescriptor, DbsdlError> {
        let columns = columns::query_columns(&mut self.client, &table.schema, &table.name).await?;
        if columns.is_empty() {
            return Err(DbsdlError::Metadata {
                table: table.to_string(),
                reason: "no columns visible".to_string(),
            });
        }
        let primary_keys =
            constraints::query_primary_keys(&mut self.client, &table.schema, &table.name).await?;
        let foreign_keys = constraints::query_foreign_keys(&mut self.client, table).await?;
        Ok(TableDescriptor::new(table.clone(), columns, primary_keys, foreign_keys))
    }

    async fn foreign_keys(&mut self, table: &QualifiedTableName) -> Result<Vec<ForeignKeyEdge>, DbsdlError> {
        constraints::query_foreign_keys(&mut self.client, table).await
    }
}
