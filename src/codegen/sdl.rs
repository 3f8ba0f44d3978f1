//! Text rendering of [`TableDocument`]s and the index document.

use std::fmt::{self, Write};

use crate::cli::CollisionPolicy;
use crate::codegen::{FetchSpec, Materializer, TableDocument, TargetQuery};
use crate::dialect::Dialect;
use crate::schema::QualifiedTableName;

const INDENT: &str = "  ";

/// Values shared by every `@dbquery` directive.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub dialect: Dialect,
    /// Name of the connection entry in the configuration document.
    pub configuration: String,
}

pub fn render_document(doc: &TableDocument, ctx: &RenderContext) -> Result<String, fmt::Error> {
    let mut sdl = String::new();

    writeln!(sdl, "# Generated by dbsdl from {}.", doc.table)?;
    writeln!(sdl, "# {}", collision_note(doc.collisions))?;

    if let Some(ref filter) = doc.filter {
        writeln!(sdl)?;
        writeln!(sdl, "input {} {{", filter.name)?;
        for field in &filter.fields {
            writeln!(sdl, "{INDENT}{}: {}", field.name, field.ty)?;
        }
        writeln!(sdl, "}}")?;
    }

    writeln!(sdl)?;
    writeln!(sdl, "type {} {{", doc.type_name)?;
    for field in &doc.fields {
        writeln!(sdl, "{INDENT}{}: {}", field.name, field.ty)?;
        if let Some(ref materializer) = field.materializer {
            write!(sdl, "{INDENT}{INDENT}")?;
            write_materializer(&mut sdl, materializer)?;
            sdl.push('\n');
        }
    }
    writeln!(sdl, "}}")?;

    writeln!(sdl)?;
    writeln!(sdl, "type Query {{")?;
    for query in &doc.queries {
        write_query(&mut sdl, query, ctx)?;
    }
    writeln!(sdl, "}}")?;

    Ok(sdl)
}

/// `schema @sdl(files: [...]) { query: Query }` over every generated file.
pub fn render_index(files: &[String]) -> Result<String, fmt::Error> {
    let mut sdl = String::new();
    writeln!(sdl, "schema")?;
    writeln!(sdl, "{INDENT}@sdl(")?;
    writeln!(sdl, "{INDENT}{INDENT}files: [")?;
    for file in files {
        write!(sdl, "{INDENT}{INDENT}{INDENT}")?;
        write_quoted(&mut sdl, file)?;
        sdl.push('\n');
    }
    writeln!(sdl, "{INDENT}{INDENT}]")?;
    writeln!(sdl, "{INDENT}) {{")?;
    writeln!(sdl, "{INDENT}query: Query")?;
    writeln!(sdl, "}}")?;
    Ok(sdl)
}

fn collision_note(policy: CollisionPolicy) -> &'static str {
    match policy {
        CollisionPolicy::Disambiguate => {
            "Colliding relationship field names are suffixed with By<ForeignKeyColumn>."
        }
        CollisionPolicy::Overwrite => {
            "Colliding relationship field names keep the last foreign key's definition."
        }
    }
}

fn write_materializer(sdl: &mut String, materializer: &Materializer) -> fmt::Result {
    sdl.push_str("@materializer(query: ");
    write_quoted(sdl, &materializer.query)?;
    sdl.push_str(", arguments: [");
    for (idx, arg) in materializer.arguments.iter().enumerate() {
        if idx > 0 {
            sdl.push_str(", ");
        }
        sdl.push_str("{name: ");
        write_quoted(sdl, &arg.name)?;
        sdl.push_str(", field: ");
        write_quoted(sdl, &arg.field)?;
        sdl.push('}');
    }
    sdl.push_str("])");
    Ok(())
}

fn write_query(sdl: &mut String, query: &TargetQuery, ctx: &RenderContext) -> fmt::Result {
    write!(sdl, "{INDENT}{}", query.name)?;
    if !query.arguments.is_empty() {
        sdl.push('(');
        for (idx, arg) in query.arguments.iter().enumerate() {
            if idx > 0 {
                sdl.push_str(", ");
            }
            write!(sdl, "{}: {}", arg.name, arg.ty)?;
        }
        sdl.push(')');
    }
    writeln!(sdl, ": {}", query.returns)?;

    write!(sdl, "{INDENT}{INDENT}@dbquery(type: ")?;
    write_quoted(sdl, ctx.dialect.dbquery_type())?;
    match query.fetch {
        FetchSpec::Table(ref table) => {
            sdl.push_str(", table: ");
            write_quoted(sdl, &table.to_string())?;
        }
        FetchSpec::Where {
            ref table,
            ref columns,
        } => {
            sdl.push_str(", query: ");
            write_quoted(sdl, &select_where(ctx.dialect, table, columns))?;
        }
    }
    sdl.push_str(", configuration: ");
    write_quoted(sdl, &ctx.configuration)?;
    writeln!(sdl, ")")
}

/// `SELECT * FROM [s].[t] WHERE [a] = ? AND [b] = ?`
fn select_where(dialect: Dialect, table: &QualifiedTableName, columns: &[String]) -> String {
    let conditions: Vec<String> = columns
        .iter()
        .map(|c| format!("{} = ?", dialect.quote_ident(c)))
        .collect();
    format!(
        "SELECT * FROM {}.{} WHERE {}",
        dialect.quote_ident(&table.schema),
        dialect.quote_ident(&table.name),
        conditions.join(" AND ")
    )
}

fn write_quoted(sdl: &mut impl Write, s: &str) -> fmt::Result {
    sdl.write_char('"')?;
    for c in s.chars() {
        match c {
            '\r' => sdl.write_str("\\r"),
            '\n' => sdl.write_str("\\n"),
            '\t' => sdl.write_str("\\t"),
            '\\' => sdl.write_str("\\\\"),
            '"' => sdl.write_str("\\\""),
            c if c.is_control() => write!(sdl, "\\u{:04x}", c as u32),
            c => sdl.write_char(c),
        }?
    }
    sdl.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::GenerationOptions;
    use crate::codegen::emitter::{build_document, TypeNames};
    use crate::codegen::relations::resolve;
    use crate::filter::GenerationSet;
    use crate::testutil::customer_order_tables;
    use indoc::indoc;

    fn mssql() -> RenderContext {
        RenderContext {
            dialect: Dialect::Mssql,
            configuration: "mssql_config".to_string(),
        }
    }

    fn documents(options: &GenerationOptions) -> Vec<TableDocument> {
        let tables = customer_order_tables();
        let set: GenerationSet = tables.iter().map(|t| t.name().clone()).collect();
        let names = TypeNames::assign(&tables, false);
        let rels = resolve(&tables, &names, &set, options.collisions);
        tables
            .iter()
            .map(|t| build_document(t, &names, rels.for_table(t.name()), options).unwrap())
            .collect()
    }

    #[test]
    fn test_render_child_document() {
        let docs = documents(&GenerationOptions::default());
        let sdl = render_document(&docs[1], &mssql()).unwrap();

        let expected = indoc! {r#"
            # Generated by dbsdl from dbo.Order.
            # Colliding relationship field names are suffixed with By<ForeignKeyColumn>.

            type Order {
              orderId: Int!
              customerId: Int!
              total: Float
              customerCustomer: Customer
                @materializer(query: "customer", arguments: [{name: "customerId", field: "customerId"}])
            }

            type Query {
              orders: [Order]
                @dbquery(type: "mssql", table: "dbo.Order", configuration: "mssql_config")
              order(orderId: Int!): Order
                @dbquery(type: "mssql", query: "SELECT * FROM [dbo].[Order] WHERE [OrderId] = ?", configuration: "mssql_config")
              ordersByCustomerId(customerId: Int!): [Order]
                @dbquery(type: "mssql", query: "SELECT * FROM [dbo].[Order] WHERE [CustomerId] = ?", configuration: "mssql_config")
            }
        "#};
        assert_eq!(sdl, expected);
    }

    #[test]
    fn test_render_parent_document_with_filter() {
        let options = GenerationOptions {
            filters: true,
            collisions: CollisionPolicy::Overwrite,
            ..GenerationOptions::default()
        };
        let docs = documents(&options);
        let sdl = render_document(&docs[0], &mssql()).unwrap();

        let expected = indoc! {r#"
            # Generated by dbsdl from dbo.Customer.
            # Colliding relationship field names keep the last foreign key's definition.

            input CustomerFilter {
              customerId: Int
              name: String
            }

            type Customer {
              customerId: Int!
              name: String
              orders: [Order]
                @materializer(query: "ordersByCustomerId", arguments: [{name: "customerId", field: "customerId"}])
            }

            type Query {
              customers(filter: CustomerFilter): [Customer]
                @dbquery(type: "mssql", table: "dbo.Customer", configuration: "mssql_config")
              customer(customerId: Int!): Customer
                @dbquery(type: "mssql", query: "SELECT * FROM [dbo].[Customer] WHERE [CustomerId] = ?", configuration: "mssql_config")
            }
        "#};
        assert_eq!(sdl, expected);
    }

    #[test]
    fn test_postgres_identifiers_are_escaped() {
        let ctx = RenderContext {
            dialect: Dialect::Postgres,
            configuration: "postgresql_config".to_string(),
        };
        let docs = documents(&GenerationOptions::default());
        let sdl = render_document(&docs[0], &ctx).unwrap();
        assert!(sdl.contains(
            r#"@dbquery(type: "postgresql", query: "SELECT * FROM \"dbo\".\"Customer\" WHERE \"CustomerId\" = ?", configuration: "postgresql_config")"#
        ));
    }

    #[test]
    fn test_render_index() {
        let files = vec!["dbo.order.graphql".to_string(), "dbo.customer.graphql".to_string()];
        let sdl = render_index(&files).unwrap();
        insta::assert_snapshot!(sdl, @r###"
        schema
          @sdl(
            files: [
              "dbo.order.graphql"
              "dbo.customer.graphql"
            ]
          ) {
          query: Query
        }
        "###);
    }

    #[test]
    fn test_write_quoted() {
        let mut out = String::new();
        write_quoted(&mut out, "a \"b\"\n\\").unwrap();
        assert_eq!(out, r#""a \"b\"\n\\""#);
    }
}
