mod columns;
mod constraints;
mod tables;

use sqlx::PgPool;

use crate::error::DbsdlError;
use crate::introspect::MetadataProvider;
use crate::schema::{ForeignKeyEdge, QualifiedTableName, TableDescriptor};

/// Reads catalog metadata from a PostgreSQL database.
pub struct PgProvider {
    pool: PgPool,
}

impl PgProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

impl MetadataProvider for PgProvider {
    async fn list_schemas(&mut self) -> Result<Vec<String>, DbsdlError> {
        tables::query_schemas(&self.pool).await
    }

    async fn list_tables(&mut self, schemas: &[String]) -> Result<Vec<QualifiedTableName>, DbsdlError> {
        let mut all_tables = Vec::new();
        for schema in schemas {
            all_tables.extend(tables::query_tables(&self.pool, schema).await?);
        }
        Ok(all_tables)
    }

    async fn describe_table(&mut self, table: &QualifiedTableName) -> Result<TableDescriptor, DbsdlError> {
        let columns = columns::query_columns(&self.pool, &table.schema, &table.name).await?;
        if columns.is_empty() {
            return Err(DbsdlError::Metadata {
                table: table.to_string(),
                reason: "no columns visible".to_string(),
            });
        }
        let primary_keys =
            constraints::query_primary_keys(&self.pool, &table.schema, &table.name).await?;
        let foreign_keys = constraints::query_foreign_keys(&self.pool, table).await?;
        Ok(TableDescriptor::new(table.clone(), columns, primary_keys, foreign_keys))
    }

    async fn foreign_keys(&mut self, table: &QualifiedTableName) -> Result<Vec<ForeignKeyEdge>, DbsdlError> {
        constraints::query_foreign_keys(&self.pool, table).await
    }
}
