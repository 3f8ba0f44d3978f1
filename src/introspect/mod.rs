pub mod mssql;
pub mod pg;

use crate::error::DbsdlError;
use crate::schema::{ForeignKeyEdge, QualifiedTableName, TableDescriptor};

/// Source of catalog metadata.
///
/// Every call is a round-trip to the database and is awaited before the next
/// one is issued. Connectivity problems must surface as errors for which
/// [`DbsdlError::is_connectivity`] returns true.
#[allow(async_fn_in_trait)]
pub trait MetadataProvider {
    /// All non-system schemas.
    async fn list_schemas(&mut self) -> Result<Vec<String>, DbsdlError>;

    /// Base tables (no views) in the given schemas, in catalog order.
    async fn list_tables(&mut self, schemas: &[String]) -> Result<Vec<QualifiedTableName>, DbsdlError>;

    /// Columns, primary key and foreign keys of one table.
    async fn describe_table(&mut self, table: &QualifiedTableName) -> Result<TableDescriptor, DbsdlError>;

    /// Only the foreign keys of one table.
    async fn foreign_keys(&mut self, table: &QualifiedTableName) -> Result<Vec<ForeignKeyEdge>, DbsdlError>;
}

/// Pair up the local and referenced columns of one constraint by ordinal
/// position. Mismatched lengths mean the catalog rows were inconsistent.
pub(crate) fn constraint_edges(
    table: &QualifiedTableName,
    constraint_name: String,
    columns: Vec<String>,
    ref_schema: String,
    ref_table: String,
    ref_columns: Vec<String>,
) -> Result<Vec<ForeignKeyEdge>, DbsdlError> {
    if columns.len() != ref_columns.len() {
        return Err(DbsdlError::Metadata {
            table: table.to_string(),
            reason: format!(
                "foreign key {constraint_name} has {} columns but references {}",
                columns.len(),
                ref_columns.len()
            ),
        });
    }
    Ok(columns
        .into_iter()
        .zip(ref_columns)
        .map(|(column, ref_column)| ForeignKeyEdge {
            constraint_name: constraint_name.clone(),
            column,
            ref_schema: ref_schema.clone(),
            ref_table: ref_table.clone(),
            ref_column,
        })
        .collect())
}
