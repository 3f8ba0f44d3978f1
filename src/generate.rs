//! The generation pipeline, independent of any particular database.

use crate::cli::GenerationOptions;
use crate::codegen::emitter::{build_document, TypeNames};
use crate::codegen::relations::{resolve, Relationships};
use crate::codegen::sdl::{render_document, render_index, RenderContext};
use crate::error::DbsdlError;
use crate::events::{EventSink, GenerationEvent};
use crate::filter::{close_over_foreign_keys, filter_tables, GenerationSet};
use crate::introspect::MetadataProvider;
use crate::schema::{QualifiedTableName, TableDescriptor};

/// One rendered table document.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub table: QualifiedTableName,
    pub file_name: String,
    pub contents: String,
}

#[derive(Debug, Clone)]
pub struct GeneratedSchema {
    /// In processing order.
    pub documents: Vec<GeneratedDocument>,
    pub index: String,
}

pub async fn generate<P, S>(
    provider: &mut P,
    options: &GenerationOptions,
    ctx: &RenderContext,
    sink: &mut S,
) -> Result<GeneratedSchema, DbsdlError>
where
    P: MetadataProvider,
    S: EventSink,
{
    let schemas = if options.schemas.is_empty() {
        provider.list_schemas().await?
    } else {
        options.schemas.clone()
    };
    tracing::debug!("Loading tables from schemas: {}", schemas.join(", "));
    let catalog = provider.list_tables(&schemas).await?;

    let mut set = filter_tables(&catalog, &options.patterns);
    let mut unreadable = GenerationSet::default();
    if options.relationships && options.auto_include {
        let closure = close_over_foreign_keys(provider, &catalog, set, sink).await?;
        set = closure.tables;
        unreadable = closure.unreadable;
    }
    if set.is_empty() {
        tracing::warn!("No tables matched; nothing to generate");
    }

    let mut tables: Vec<TableDescriptor> = Vec::with_capacity(set.len());
    for table in set.iter() {
        // Already reported by the closure.
        if unreadable.contains(table) {
            continue;
        }
        sink.emit(GenerationEvent::TableStarted {
            table: table.clone(),
        });
        match provider.describe_table(table).await {
            Ok(descriptor) => tables.push(descriptor),
            Err(e) if e.is_connectivity() => return Err(e),
            Err(e) => sink.emit(GenerationEvent::TableFailed {
                table: table.clone(),
                reason: e.to_string(),
            }),
        }
    }

    let type_names = TypeNames::assign(&tables, options.singularize);
    let relationships = if options.relationships {
        resolve(&tables, &type_names, &set, options.collisions)
    } else {
        Relationships::default()
    };

    for missing in &relationships.missing {
        if options.auto_include {
            // Closure already pulled in everything the catalog knows about.
            tracing::debug!(
                "{}.{} references {}, which is not in the catalog",
                missing.table,
                missing.column,
                missing.referenced
            );
        } else {
            sink.emit(GenerationEvent::ForeignKeyTargetMissing {
                table: missing.table.clone(),
                referenced: missing.referenced.clone(),
                column: missing.column.clone(),
            });
        }
    }

    let mut documents = Vec::with_capacity(tables.len());
    for table in &tables {
        let Some(doc) = build_document(
            table,
            &type_names,
            relationships.for_table(table.name()),
            options,
        ) else {
            continue;
        };
        let file_name = doc.file_name();
        let contents = render_document(&doc, ctx)?;
        sink.emit(GenerationEvent::TableSucceeded {
            table: table.name().clone(),
            file_name: file_name.clone(),
        });
        documents.push(GeneratedDocument {
            table: table.name().clone(),
            file_name,
            contents,
        });
    }

    let files: Vec<String> = documents.iter().map(|d| d.file_name.clone()).collect();
    let index = render_index(&files)?;

    Ok(GeneratedSchema { documents, index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::testutil::{customer_order_tables, fk, table, test_column, RecordingSink, StaticCatalog};

    fn ctx() -> RenderContext {
        RenderContext {
            dialect: Dialect::Mssql,
            configuration: "mssql_config".to_string(),
        }
    }

    fn options(tables: &str) -> GenerationOptions {
        GenerationOptions {
            patterns: vec![tables.parse().unwrap()],
            relationships: true,
            ..GenerationOptions::default()
        }
    }

    fn chain_catalog() -> StaticCatalog {
        StaticCatalog::new(vec![
            table("dbo", "A", vec![test_column("Id"), test_column("BId")], &["Id"], vec![fk("BId", "dbo", "B", "Id")]),
            table("dbo", "B", vec![test_column("Id"), test_column("CId")], &["Id"], vec![fk("CId", "dbo", "C", "Id")]),
            table("dbo", "C", vec![test_column("Id")], &["Id"], vec![]),
        ])
    }

    #[tokio::test]
    async fn test_auto_include_generates_referenced_tables() {
        let mut provider = StaticCatalog::new(customer_order_tables());
        let opts = GenerationOptions {
            auto_include: true,
            ..options("dbo.Order")
        };
        let mut sink = RecordingSink::default();

        let schema = generate(&mut provider, &opts, &ctx(), &mut sink).await.unwrap();

        let files: Vec<&str> = schema.documents.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(files, vec!["dbo.order.graphql", "dbo.customer.graphql"]);
        assert!(schema.index.contains("\"dbo.order.graphql\"\n      \"dbo.customer.graphql\""));

        let order = &schema.documents[0].contents;
        assert!(order.contains("customerCustomer: Customer"));
        assert!(order.contains(
            r#"@materializer(query: "customer", arguments: [{name: "customerId", field: "customerId"}])"#
        ));
        assert!(schema.documents[1].contents.contains("orders: [Order]"));

        assert!(sink.events.contains(&GenerationEvent::ForeignKeyAutoIncluded {
            from: QualifiedTableName::new("dbo", "Order"),
            to: QualifiedTableName::new("dbo", "Customer"),
        }));
        assert!(sink.events.contains(&GenerationEvent::TableSucceeded {
            table: QualifiedTableName::new("dbo", "Customer"),
            file_name: "dbo.customer.graphql".to_string(),
        }));
    }

    #[tokio::test]
    async fn test_missing_target_is_reported_without_auto_include() {
        let mut provider = chain_catalog();
        let mut sink = RecordingSink::default();

        let schema = generate(&mut provider, &options("dbo.A"), &ctx(), &mut sink)
            .await
            .unwrap();

        assert_eq!(schema.documents.len(), 1);
        assert!(!schema.documents[0].contents.contains("@materializer"));
        let missing: Vec<&GenerationEvent> = sink
            .events
            .iter()
            .filter(|e| matches!(e, GenerationEvent::ForeignKeyTargetMissing { .. }))
            .collect();
        assert_eq!(
            missing,
            vec![&GenerationEvent::ForeignKeyTargetMissing {
                table: QualifiedTableName::new("dbo", "A"),
                referenced: QualifiedTableName::new("dbo", "B"),
                column: "BId".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_relationships_off_emits_plain_documents() {
        let mut provider = StaticCatalog::new(customer_order_tables());
        let opts = GenerationOptions::default();
        let mut sink = RecordingSink::default();

        let schema = generate(&mut provider, &opts, &ctx(), &mut sink).await.unwrap();

        assert_eq!(schema.documents.len(), 2);
        assert!(schema.documents.iter().all(|d| !d.contents.contains("@materializer")));
        assert!(!sink
            .events
            .iter()
            .any(|e| matches!(e, GenerationEvent::ForeignKeyTargetMissing { .. })));
    }

    #[tokio::test]
    async fn test_failing_table_is_skipped() {
        let mut provider = chain_catalog().failing("dbo.B");
        let mut sink = RecordingSink::default();

        let schema = generate(&mut provider, &options("dbo.*"), &ctx(), &mut sink)
            .await
            .unwrap();

        let files: Vec<&str> = schema.documents.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(files, vec!["dbo.a.graphql", "dbo.c.graphql"]);
        assert!(!schema.index.contains("dbo.b.graphql"));
        assert!(sink.events.iter().any(|e| matches!(
            e,
            GenerationEvent::TableFailed { table, .. } if *table == QualifiedTableName::new("dbo", "B")
        )));
    }

    fn query_names(schema: &GeneratedSchema) -> Vec<String> {
        schema
            .documents
            .iter()
            .filter_map(|d| d.contents.split_once("type Query {"))
            .flat_map(|(_, queries)| queries.lines())
            .filter(|line| line.starts_with("  ") && !line.trim_start().starts_with('@'))
            .filter_map(|line| line.trim().split(['(', ':']).next().map(str::to_string))
            .collect()
    }

    #[tokio::test]
    async fn test_query_names_are_unique_across_documents() {
        let mut provider = StaticCatalog::new(vec![
            table("dbo", "Order", vec![test_column("Id")], &["Id"], vec![]),
            table("dbo", "Orders", vec![test_column("Id")], &["Id"], vec![]),
        ]);
        let mut sink = RecordingSink::default();

        let schema = generate(&mut provider, &GenerationOptions::default(), &ctx(), &mut sink)
            .await
            .unwrap();

        assert_eq!(
            query_names(&schema),
            vec!["orders", "order", "orderses", "ordersById"]
        );
        assert!(schema.documents[1]
            .contents
            .contains("  ordersById(id: Int!): Orders\n"));
    }

    #[tokio::test]
    async fn test_unreadable_table_in_closure_is_reported_once() {
        let mut provider = chain_catalog().failing("dbo.B");
        let opts = GenerationOptions {
            auto_include: true,
            ..options("dbo.A")
        };
        let mut sink = RecordingSink::default();

        let schema = generate(&mut provider, &opts, &ctx(), &mut sink).await.unwrap();

        let files: Vec<&str> = schema.documents.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(files, vec!["dbo.a.graphql"]);
        let failures = sink
            .events
            .iter()
            .filter(|e| matches!(e, GenerationEvent::TableFailed { .. }))
            .count();
        assert_eq!(failures, 1);
        assert!(!sink.events.contains(&GenerationEvent::TableStarted {
            table: QualifiedTableName::new("dbo", "B"),
        }));
    }

    #[tokio::test]
    async fn test_connectivity_failure_aborts() {
        let mut provider = chain_catalog().offline();
        let mut sink = RecordingSink::default();

        let err = generate(&mut provider, &options("dbo.*"), &ctx(), &mut sink)
            .await
            .unwrap_err();

        assert!(err.is_connectivity());
        assert!(sink.events.is_empty());
    }
}
