pub mod config;
pub mod emitter;
pub mod relations;
pub mod sdl;

use std::fmt;

use crate::cli::CollisionPolicy;
use crate::schema::QualifiedTableName;
use crate::typemap::format_nullable;

/// A reference to a GraphQL type, e.g. `Int!` or `[Order]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub name: String,
    pub list: bool,
    pub nullable: bool,
}

impl TypeRef {
    pub fn named(name: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            list: false,
            nullable,
        }
    }

    /// A nullable list of nullable items: `[Order]`.
    pub fn list_of(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            list: true,
            nullable: true,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = if self.list {
            format!("[{}]", self.name)
        } else {
            self.name.clone()
        };
        f.write_str(&format_nullable(&inner, self.nullable))
    }
}

/// Passes the value of `field` on the parent type as argument `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentBinding {
    pub name: String,
    pub field: String,
}

/// Resolves a field by running another query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materializer {
    pub query: String,
    pub arguments: Vec<ArgumentBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetField {
    pub name: String,
    pub ty: TypeRef,
    pub materializer: Option<Materializer>,
}

/// A query argument; it is required when its type is non-null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryArgument {
    pub name: String,
    pub ty: TypeRef,
}

/// How a query reads its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchSpec {
    /// Every row of the table.
    Table(QualifiedTableName),
    /// Rows whose `columns` equal the query arguments, in argument order.
    Where {
        table: QualifiedTableName,
        columns: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetQuery {
    pub name: String,
    pub arguments: Vec<QueryArgument>,
    pub returns: TypeRef,
    pub fetch: FetchSpec,
}

/// `input <Type>Filter`: every column as an optional scalar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInput {
    pub name: String,
    pub fields: Vec<QueryArgument>,
}

/// Everything generated for one table, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDocument {
    pub table: QualifiedTableName,
    pub type_name: String,
    pub fields: Vec<TargetField>,
    pub queries: Vec<TargetQuery>,
    pub filter: Option<FilterInput>,
    pub collisions: CollisionPolicy,
}

impl TableDocument {
    pub fn file_name(&self) -> String {
        format!("{}.graphql", self.table.file_stem())
    }
}
