use std::collections::HashSet;

use crate::error::DbsdlError;
use crate::events::{EventSink, GenerationEvent};
use crate::introspect::MetadataProvider;
use crate::schema::{ColumnDescriptor, ForeignKeyEdge, QualifiedTableName, TableDescriptor};

/// Create a ColumnDescriptor with sensible defaults for testing.
/// Returns a non-nullable int4 column with no default and no key flags.
pub fn test_column(name: &str) -> ColumnDescriptor {
    ColumnDescriptor {
        name: name.to_string(),
        data_type: "int4".to_string(),
        is_nullable: false,
        character_maximum_length: None,
        numeric_precision: None,
        numeric_scale: None,
        column_default: None,
        is_primary_key: false,
        is_foreign_key: false,
        is_identity: false,
    }
}

/// A nullable column of the given source type.
pub fn nullable_column(name: &str, data_type: &str) -> ColumnDescriptor {
    ColumnDescriptor {
        data_type: data_type.to_string(),
        is_nullable: true,
        ..test_column(name)
    }
}

pub fn fk(column: &str, ref_schema: &str, ref_table: &str, ref_column: &str) -> ForeignKeyEdge {
    ForeignKeyEdge {
        constraint_name: format!("FK_{column}_{ref_table}"),
        column: column.to_string(),
        ref_schema: ref_schema.to_string(),
        ref_table: ref_table.to_string(),
        ref_column: ref_column.to_string(),
    }
}

pub fn table(
    schema: &str,
    name: &str,
    columns: Vec<ColumnDescriptor>,
    primary_keys: &[&str],
    foreign_keys: Vec<ForeignKeyEdge>,
) -> TableDescriptor {
    TableDescriptor::new(
        QualifiedTableName::new(schema, name),
        columns,
        primary_keys.iter().map(|s| s.to_string()).collect(),
        foreign_keys,
    )
}

/// `Customer(CustomerId PK, Name)` and `Order(OrderId PK, CustomerId FK -> Customer, Total)`.
pub fn customer_order_tables() -> Vec<TableDescriptor> {
    vec![
        table(
            "dbo",
            "Customer",
            vec![test_column("CustomerId"), nullable_column("Name", "nvarchar")],
            &["CustomerId"],
            vec![],
        ),
        table(
            "dbo",
            "Order",
            vec![
                test_column("OrderId"),
                test_column("CustomerId"),
                nullable_column("Total", "decimal"),
            ],
            &["OrderId"],
            vec![fk("CustomerId", "dbo", "Customer", "CustomerId")],
        ),
    ]
}

/// In-memory metadata provider.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    tables: Vec<TableDescriptor>,
    failing: HashSet<QualifiedTableName>,
    offline: bool,
}

impl StaticCatalog {
    pub fn new(tables: Vec<TableDescriptor>) -> Self {
        Self {
            tables,
            ..Self::default()
        }
    }

    /// Make every lookup of `schema.table` fail with a metadata error.
    pub fn failing(mut self, qualified: &str) -> Self {
        let (schema, name) = qualified.split_once('.').unwrap();
        self.failing.insert(QualifiedTableName::new(schema, name));
        self
    }

    /// Make every call fail as if the server went away.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub fn catalog(&self) -> Vec<QualifiedTableName> {
        self.tables.iter().map(|t| t.name().clone()).collect()
    }

    fn lookup(&self, table: &QualifiedTableName) -> Result<&TableDescriptor, DbsdlError> {
        if self.offline {
            return Err(DbsdlError::Connection("server went away".to_string()));
        }
        if self.failing.contains(table) {
            return Err(DbsdlError::Metadata {
                table: table.to_string(),
                reason: "corrupt catalog row".to_string(),
            });
        }
        self.tables
            .iter()
            .find(|t| t.name() == table)
            .ok_or_else(|| DbsdlError::Metadata {
                table: table.to_string(),
                reason: "not found".to_string(),
            })
    }
}

impl MetadataProvider for StaticCatalog {
    async fn list_schemas(&mut self) -> Result<Vec<String>, DbsdlError> {
        if self.offline {
            return Err(DbsdlError::Connection("server went away".to_string()));
        }
        let mut schemas: Vec<String> = Vec::new();
        for t in &self.tables {
            if !schemas.contains(&t.name().schema) {
                schemas.push(t.name().schema.clone());
            }
        }
        Ok(schemas)
    }

    async fn list_tables(&mut self, schemas: &[String]) -> Result<Vec<QualifiedTableName>, DbsdlError> {
        if self.offline {
            return Err(DbsdlError::Connection("server went away".to_string()));
        }
        Ok(self
            .catalog()
            .into_iter()
            .filter(|t| schemas.iter().any(|s| s.eq_ignore_ascii_case(&t.schema)))
            .collect())
    }

    async fn describe_table(&mut self, table: &QualifiedTableName) -> Result<TableDescriptor, DbsdlError> {
        self.lookup(table).cloned()
    }

    async fn foreign_keys(&mut self, table: &QualifiedTableName) -> Result<Vec<ForeignKeyEdge>, DbsdlError> {
        Ok(self.lookup(table)?.foreign_keys().to_vec())
    }
}

/// Keeps every event for inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<GenerationEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: GenerationEvent) {
        self.events.push(event);
    }
}
