use std::collections::{HashMap, HashSet};

use crate::cli::GenerationOptions;
use crate::codegen::relations::TableRelations;
use crate::codegen::{
    FetchSpec, FilterInput, QueryArgument, TableDocument, TargetField, TargetQuery, TypeRef,
};
use crate::naming::{list_query_name, single_query_name, to_camel, to_pascal, type_name};
use crate::schema::{QualifiedTableName, TableDescriptor};
use crate::typemap::map_type;

/// GraphQL type name and root query names of every processed table.
///
/// Tables are named in processing order; a table whose name is already taken
/// (e.g. `Sales.Customer` after `dbo.Customer`) is prefixed with its schema.
/// Every document contributes to one composed `Query`, so query names are
/// claimed from a single [`QueryNamespace`].
#[derive(Debug, Clone, Default)]
pub struct TypeNames {
    names: HashMap<QualifiedTableName, String>,
    queries: HashMap<QualifiedTableName, TableQueries>,
    namespace: QueryNamespace,
}

/// Names of a table's list query and, when it has a primary key, its
/// single-row query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQueries {
    pub list: String,
    pub single: Option<String>,
}

/// Root `Query` field names already in use across the run.
#[derive(Debug, Clone, Default)]
pub struct QueryNamespace {
    used: HashSet<String>,
}

impl QueryNamespace {
    /// Reserve `name`. A taken name becomes `{name}By{qualifier}` when a
    /// qualifier is given, then gets a numeric suffix until it is free.
    pub fn claim(&mut self, name: String, qualifier: Option<&str>) -> String {
        let mut chosen = name.clone();
        if self.used.contains(&chosen) {
            if let Some(qualifier) = qualifier {
                chosen = format!("{name}By{qualifier}");
            }
        }
        let base = chosen.clone();
        let mut n = 2;
        while self.used.contains(&chosen) {
            chosen = format!("{base}{n}");
            n += 1;
        }
        if chosen != name {
            tracing::debug!("Query {name} is already defined; using {chosen}");
        }
        self.used.insert(chosen.clone());
        chosen
    }
}

impl TypeNames {
    pub fn assign(tables: &[TableDescriptor], singular: bool) -> Self {
        let mut names: HashMap<QualifiedTableName, String> = HashMap::new();
        for table in tables {
            let is_taken = |candidate: &str| {
                names.values().any(|n: &String| n.eq_ignore_ascii_case(candidate))
            };
            let base = type_name(&table.name().name, singular);
            let mut chosen = base.clone();
            if is_taken(&chosen) {
                chosen = format!("{}{base}", to_pascal(&table.name().schema));
                tracing::debug!("{} is named {chosen} to avoid a clash on {base}", table.name());
            }
            let mut n = 2;
            while is_taken(&chosen) {
                chosen = format!("{}{base}{n}", to_pascal(&table.name().schema));
                n += 1;
            }
            names.insert(table.name().clone(), chosen);
        }

        let mut namespace = QueryNamespace::default();
        let mut queries = HashMap::new();
        for table in tables {
            let Some(type_name) = names.get(table.name()) else {
                continue;
            };
            let list = namespace.claim(list_query_name(type_name), None);
            let single = (!table.primary_keys().is_empty()).then(|| {
                let key = table
                    .primary_keys()
                    .iter()
                    .map(|pk| to_pascal(pk))
                    .collect::<Vec<_>>()
                    .join("And");
                namespace.claim(single_query_name(type_name), Some(&key))
            });
            queries.insert(table.name().clone(), TableQueries { list, single });
        }

        Self {
            names,
            queries,
            namespace,
        }
    }

    pub fn get(&self, table: &QualifiedTableName) -> Option<&str> {
        self.names.get(table).map(String::as_str)
    }

    pub fn queries(&self, table: &QualifiedTableName) -> Option<&TableQueries> {
        self.queries.get(table)
    }

    /// The query names claimed so far, for callers that add more queries.
    pub fn query_namespace(&self) -> QueryNamespace {
        self.namespace.clone()
    }
}

/// Assemble one table's document, or `None` for a table `names` does not know.
///
/// Fields: columns in column order, then relationship fields. Queries: the
/// list query, the single-row query when there is a primary key, then the
/// reverse-relationship queries.
pub fn build_document(
    table: &TableDescriptor,
    names: &TypeNames,
    relations: Option<&TableRelations>,
    options: &GenerationOptions,
) -> Option<TableDocument> {
    let type_name = names.get(table.name())?;
    let query_names = names.queries(table.name())?;

    let mut fields: Vec<TargetField> = table
        .columns()
        .iter()
        .map(|col| {
            let scalar = map_type(&col.data_type);
            tracing::trace!(
                primary_key = col.is_primary_key,
                foreign_key = col.is_foreign_key,
                identity = col.is_identity,
                default = ?col.column_default,
                "{}.{}: {} -> {scalar}",
                table.name(),
                col.name,
                col.source_type()
            );
            TargetField {
                name: to_camel(&col.name),
                ty: TypeRef::named(scalar.as_str(), col.is_nullable),
                materializer: None,
            }
        })
        .collect();

    let filter = options.filters.then(|| FilterInput {
        name: format!("{type_name}Filter"),
        fields: table
            .columns()
            .iter()
            .map(|col| QueryArgument {
                name: to_camel(&col.name),
                ty: TypeRef::named(map_type(&col.data_type).as_str(), true),
            })
            .collect(),
    });

    let mut queries = vec![TargetQuery {
        name: query_names.list.clone(),
        arguments: filter
            .iter()
            .map(|f| QueryArgument {
                name: "filter".to_string(),
                ty: TypeRef::named(&f.name, true),
            })
            .collect(),
        returns: TypeRef::list_of(type_name),
        fetch: FetchSpec::Table(table.name().clone()),
    }];

    if let Some(ref single) = query_names.single {
        let arguments = table
            .primary_keys()
            .iter()
            .map(|pk| QueryArgument {
                name: to_camel(pk),
                ty: TypeRef::named(
                    table
                        .column(pk)
                        .map(|c| map_type(&c.data_type))
                        .unwrap_or_else(|| map_type(""))
                        .as_str(),
                    false,
                ),
            })
            .collect();
        queries.push(TargetQuery {
            name: single.clone(),
            arguments,
            returns: TypeRef::named(type_name, true),
            fetch: FetchSpec::Where {
                table: table.name().clone(),
                columns: table.primary_keys().to_vec(),
            },
        });
    }

    if let Some(relations) = relations {
        fields.extend(relations.fields.iter().cloned());
        queries.extend(relations.queries.iter().cloned());
    }

    Some(TableDocument {
        table: table.name().clone(),
        type_name: type_name.to_string(),
        fields,
        queries,
        filter,
        collisions: options.collisions,
    })
}
