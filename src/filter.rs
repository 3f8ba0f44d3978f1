//! Table selection: `schema.table` glob patterns and the foreign-key closure.

use std::collections::{HashSet, VecDeque};
use std::str::FromStr;

use crate::error::DbsdlError;
use crate::events::{EventSink, GenerationEvent};
use crate::introspect::MetadataProvider;
use crate::schema::QualifiedTableName;

/// A `schema.table` pattern. Either segment may use `*` (any run of
/// characters) and `?` (exactly one character); matching ignores case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePattern {
    schema: String,
    table: String,
}

impl FromStr for TablePattern {
    type Err = DbsdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.split_once('.') {
            Some((schema, table)) if !schema.is_empty() && !table.is_empty() => Ok(Self {
                schema: schema.to_lowercase(),
                table: table.to_lowercase(),
            }),
            _ => Err(DbsdlError::InvalidPattern(trimmed.to_string())),
        }
    }
}

impl TablePattern {
    pub fn matches(&self, table: &QualifiedTableName) -> bool {
        glob_match(&self.schema, &table.schema.to_lowercase())
            && glob_match(&self.table, &table.name.to_lowercase())
    }
}

/// Wildcard match with single-star backtracking. Callers lower-case both sides.
fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((star_pi, star_ti)) = star {
            // Let the last star swallow one more character.
            pi = star_pi + 1;
            ti = star_ti + 1;
            star = Some((star_pi, star_ti + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}

/// Tables selected for generation, in processing order. Tables can be added
/// but never removed.
#[derive(Debug, Clone, Default)]
pub struct GenerationSet {
    order: Vec<QualifiedTableName>,
    members: HashSet<QualifiedTableName>,
}

impl GenerationSet {
    /// Returns false when the table was already present.
    pub fn insert(&mut self, table: QualifiedTableName) -> bool {
        if self.members.contains(&table) {
            return false;
        }
        self.members.insert(table.clone());
        self.order.push(table);
        true
    }

    pub fn contains(&self, table: &QualifiedTableName) -> bool {
        self.members.contains(table)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QualifiedTableName> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl FromIterator<QualifiedTableName> for GenerationSet {
    fn from_iter<I: IntoIterator<Item = QualifiedTableName>>(iter: I) -> Self {
        let mut set = GenerationSet::default();
        for table in iter {
            set.insert(table);
        }
        set
    }
}

/// Select the catalog tables matched by any pattern; no patterns selects everything.
pub fn filter_tables(catalog: &[QualifiedTableName], patterns: &[TablePattern]) -> GenerationSet {
    catalog
        .iter()
        .filter(|table| patterns.is_empty() || patterns.iter().any(|p| p.matches(table)))
        .cloned()
        .collect()
}

/// Result of [`close_over_foreign_keys`].
#[derive(Debug, Clone, Default)]
pub struct ForeignKeyClosure {
    pub tables: GenerationSet,
    /// Members whose foreign keys could not be read. Each was already
    /// reported as `TableFailed`.
    pub unreadable: GenerationSet,
}

/// Grow `set` breadth-first along foreign keys until every referenced table
/// that exists in `catalog` is a member.
///
/// References to tables outside the catalog are skipped. A table whose
/// foreign keys cannot be read is reported once, recorded in
/// [`ForeignKeyClosure::unreadable`] and not followed, unless the failure is
/// a connectivity error, which aborts.
pub async fn close_over_foreign_keys<P, S>(
    provider: &mut P,
    catalog: &[QualifiedTableName],
    mut set: GenerationSet,
    sink: &mut S,
) -> Result<ForeignKeyClosure, DbsdlError>
where
    P: MetadataProvider,
    S: EventSink,
{
    let mut queue: VecDeque<QualifiedTableName> = set.iter().cloned().collect();
    let mut unreadable = GenerationSet::default();

    while let Some(table) = queue.pop_front() {
        let edges = match provider.foreign_keys(&table).await {
            Ok(edges) => edges,
            Err(e) if e.is_connectivity() => return Err(e),
            Err(e) => {
                sink.emit(GenerationEvent::TableFailed {
                    table: table.clone(),
                    reason: e.to_string(),
                });
                unreadable.insert(table);
                continue;
            }
        };

        for edge in edges {
            let target = edge.target();
            if set.contains(&target) {
                continue;
            }
            // Use the catalog's spelling of the name.
            let Some(found) = catalog.iter().find(|t| **t == target) else {
                tracing::debug!("{table}.{} references unknown table {target}", edge.column);
                continue;
            };
            set.insert(found.clone());
            queue.push_back(found.clone());
            sink.emit(GenerationEvent::ForeignKeyAutoIncluded {
                from: table.clone(),
                to: found.clone(),
            });
        }
    }

    Ok(ForeignKeyClosure {
        tables: set,
        unreadable,
    })
}
