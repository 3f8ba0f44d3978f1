//! Foreign keys to relationship fields.
//!
//! Every linkable edge `child.column -> parent.pk` yields a forward field on
//! the child (resolved through the parent's single-row query), a reverse list
//! field on the parent, and the child-side query backing that list. The
//! backing query takes the foreign-key value typed as the parent's key column,
//! and its name is claimed from the run-wide query namespace.

use std::collections::{HashMap, HashSet};

use crate::cli::CollisionPolicy;
use crate::codegen::emitter::TypeNames;
use crate::codegen::{
    ArgumentBinding, FetchSpec, Materializer, QueryArgument, TargetField, TargetQuery, TypeRef,
};
use crate::filter::GenerationSet;
use crate::naming::{
    forward_field_name, list_query_name, reverse_query_name, to_camel, to_pascal,
};
use crate::schema::{ForeignKeyEdge, QualifiedTableName, TableDescriptor};
use crate::typemap::map_type;

/// Relationship fields and reverse queries for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRelations {
    /// Forward fields in foreign-key order, then reverse fields.
    pub fields: Vec<TargetField>,
    /// Queries backing the reverse fields that point at this table's rows.
    pub queries: Vec<TargetQuery>,
}

/// A foreign key whose referenced table is not in the generation set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTarget {
    pub table: QualifiedTableName,
    pub referenced: QualifiedTableName,
    pub column: String,
}

#[derive(Debug, Clone, Default)]
pub struct Relationships {
    by_table: HashMap<QualifiedTableName, TableRelations>,
    pub missing: Vec<MissingTarget>,
}

impl Relationships {
    pub fn for_table(&self, table: &QualifiedTableName) -> Option<&TableRelations> {
        self.by_table.get(table)
    }
}

/// Field names already used on one generated type.
#[derive(Debug, Default)]
struct FieldSlots {
    columns: HashSet<String>,
    relations: TableRelations,
}

impl FieldSlots {
    fn is_taken(&self, name: &str) -> bool {
        self.columns.contains(name) || self.relations.fields.iter().any(|f| f.name == name)
    }

    fn add(&mut self, mut field: TargetField, column: &str, policy: CollisionPolicy) {
        if self.columns.contains(&field.name) {
            field.name = self.unused_name(&field.name, column);
        } else if let Some(pos) = self.relations.fields.iter().position(|f| f.name == field.name) {
            match policy {
                CollisionPolicy::Overwrite => {
                    tracing::debug!("Relationship field {} replaced by a later foreign key", field.name);
                    self.relations.fields[pos] = field;
                    return;
                }
                CollisionPolicy::Disambiguate => {
                    field.name = self.unused_name(&field.name, column);
                }
            }
        }
        self.relations.fields.push(field);
    }

    /// `orders` -> `ordersByBillToCustomerId`, then `...2`, `...3` if needed.
    fn unused_name(&self, base: &str, column: &str) -> String {
        let candidate = format!("{base}By{}", to_pascal(column));
        if !self.is_taken(&candidate) {
            return candidate;
        }
        let mut n = 2;
        loop {
            let numbered = format!("{candidate}{n}");
            if !self.is_taken(&numbered) {
                return numbered;
            }
            n += 1;
        }
    }
}

/// Derive relationship fields and queries for the processed tables.
///
/// `set` is the full generation set; edges pointing outside it are reported
/// in [`Relationships::missing`]. Edges into a table that is in the set but
/// failed to load are dropped silently, since that table was already reported.
pub fn resolve(
    tables: &[TableDescriptor],
    type_names: &TypeNames,
    set: &GenerationSet,
    policy: CollisionPolicy,
) -> Relationships {
    let mut slots: HashMap<QualifiedTableName, FieldSlots> = tables
        .iter()
        .map(|t| {
            let columns = t.columns().iter().map(|c| to_camel(&c.name)).collect();
            (
                t.name().clone(),
                FieldSlots {
                    columns,
                    relations: TableRelations::default(),
                },
            )
        })
        .collect();
    let mut missing = Vec::new();
    let mut reverse: Vec<(&TableDescriptor, &ForeignKeyEdge, &TableDescriptor, String)> = Vec::new();
    let mut namespace = type_names.query_namespace();

    for child in tables {
        for edge in child.foreign_keys() {
            let target = edge.target();
            if !set.contains(&target) {
                missing.push(MissingTarget {
                    table: child.name().clone(),
                    referenced: target,
                    column: edge.column.clone(),
                });
                continue;
            }
            let Some(parent) = tables.iter().find(|t| *t.name() == target) else {
                tracing::debug!("{}.{}: {target} was not loaded", child.name(), edge.column);
                continue;
            };
            if !parent.is_sole_primary_key(&edge.ref_column) {
                tracing::debug!(
                    "{}.{}: {target}.{} is not the primary key of {target}, no relationship",
                    child.name(),
                    edge.column,
                    edge.ref_column
                );
                continue;
            }
            let (Some(child_type), Some(parent_type), Some(parent_single)) = (
                type_names.get(child.name()),
                type_names.get(parent.name()),
                type_names.queries(parent.name()).and_then(|q| q.single.as_deref()),
            ) else {
                continue;
            };
            let Some(key_column) = parent.column(&edge.ref_column) else {
                continue;
            };

            let forward = TargetField {
                name: forward_field_name(&edge.column, parent_type),
                ty: TypeRef::named(parent_type, true),
                materializer: Some(Materializer {
                    query: parent_single.to_string(),
                    arguments: vec![ArgumentBinding {
                        name: to_camel(&edge.ref_column),
                        field: to_camel(&edge.column),
                    }],
                }),
            };

            let query_name = namespace.claim(reverse_query_name(child_type, &edge.column), None);
            let query = TargetQuery {
                name: query_name.clone(),
                arguments: vec![QueryArgument {
                    name: to_camel(&edge.column),
                    ty: TypeRef::named(map_type(&key_column.data_type).as_str(), false),
                }],
                returns: TypeRef::list_of(child_type),
                fetch: FetchSpec::Where {
                    table: child.name().clone(),
                    columns: vec![edge.column.clone()],
                },
            };

            if let Some(child_slots) = slots.get_mut(child.name()) {
                child_slots.add(forward, &edge.column, policy);
                child_slots.relations.queries.push(query);
            }
            reverse.push((child, edge, parent, query_name));
        }
    }

    // Reverse fields go after every forward field on the parent.
    for (child, edge, parent, query_name) in reverse {
        let Some(child_type) = type_names.get(child.name()) else {
            continue;
        };
        let field = TargetField {
            name: list_query_name(child_type),
            ty: TypeRef::list_of(child_type),
            materializer: Some(Materializer {
                query: query_name,
                arguments: vec![ArgumentBinding {
                    name: to_camel(&edge.column),
                    field: to_camel(&edge.ref_column),
                }],
            }),
        };
        if let Some(parent_slots) = slots.get_mut(parent.name()) {
            parent_slots.add(field, &edge.column, policy);
        }
    }

    Relationships {
        by_table: slots
            .into_iter()
            .map(|(table, slots)| (table, slots.relations))
            .collect(),
        missing,
    }
}
