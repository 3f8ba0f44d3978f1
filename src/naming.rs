//! Identifier conventions for generated GraphQL names.
//!
//! Source identifiers are split into words on underscores and on lower-to-upper
//! case humps, so `order_line`, `Order_Line` and `OrderLine` all read as the
//! words `order line`. Empty input yields an empty string rather than an error.

use heck::{ToLowerCamelCase, ToUpperCamelCase};

/// Suffixes removed from a foreign-key column before naming its forward field.
/// Checked in order; the first match wins and at most one is removed.
const ID_SUFFIXES: [&str; 4] = ["Id", "ID", "_id", "_ID"];

/// `Order_Line` -> `orderLine`, `LastEditedBy` -> `lastEditedBy`.
pub fn to_camel(identifier: &str) -> String {
    identifier.to_lower_camel_case()
}

/// `order_line` -> `OrderLine`.
pub fn to_pascal(identifier: &str) -> String {
    identifier.to_upper_camel_case()
}

pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Suffix heuristic: `s`, `x`, `ch`, `sh` take `es`; consonant + `y` becomes
/// `ies`; everything else takes `s`. Irregular nouns are not handled
/// (`person` -> `persons`).
pub fn pluralize(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if ["s", "x", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        format!("{name}es")
    } else if ends_with_consonant_y(&lower) {
        format!("{}ies", &name[..name.len() - 1])
    } else {
        format!("{name}s")
    }
}

/// Suffix heuristic undoing [`pluralize`] for regular nouns: `ies` -> `y`,
/// then `es` is dropped, then a single trailing `s` (not `ss`). It is not a
/// true inverse: `status` -> `statu`, `types` -> `typ`, `invoices` -> `invoic`.
pub fn singularize(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.len() > 3 && lower.ends_with("ies") {
        return format!("{}y", &name[..name.len() - 3]);
    }
    if lower.len() > 2 && lower.ends_with("es") {
        return name[..name.len() - 2].to_string();
    }
    if lower.len() > 1 && lower.ends_with('s') && !lower.ends_with("ss") {
        return name[..name.len() - 1].to_string();
    }
    name.to_string()
}

fn ends_with_consonant_y(lower: &str) -> bool {
    let mut rev = lower.chars().rev();
    rev.next() == Some('y')
        && rev
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() && !"aeiou".contains(c))
}

/// GraphQL type name for a table.
pub fn type_name(table: &str, singular: bool) -> String {
    if singular {
        to_pascal(&singularize(table))
    } else {
        to_pascal(table)
    }
}

/// Name of the query returning every row: `Customer` -> `customers`.
pub fn list_query_name(type_name: &str) -> String {
    pluralize(&lower_first(&to_pascal(type_name)))
}

/// Name of the query returning one row by primary key: `Customer` -> `customer`.
pub fn single_query_name(type_name: &str) -> String {
    lower_first(&to_pascal(type_name))
}

/// Drop one trailing `Id`/`ID`/`_id`/`_ID`. May return an empty string when
/// the column is nothing but the suffix.
pub fn strip_id_suffix(column: &str) -> &str {
    ID_SUFFIXES
        .iter()
        .find_map(|suffix| column.strip_suffix(suffix))
        .unwrap_or(column)
}

/// Child-to-parent field name: the foreign-key column minus its id suffix,
/// followed by the referenced type. `LastEditedBy` + `People` -> `lastEditedByPeople`.
pub fn forward_field_name(column: &str, target_type: &str) -> String {
    let base = strip_id_suffix(column);
    if base.is_empty() {
        lower_first(target_type)
    } else {
        format!("{}{}", to_camel(base), target_type)
    }
}

/// Query backing a parent-to-children field: `Order` + `CustomerId` -> `ordersByCustomerId`.
pub fn reverse_query_name(child_type: &str, column: &str) -> String {
    format!("{}By{}", list_query_name(child_type), to_pascal(column))
}
