use std::fmt;
use std::hash::{Hash, Hasher};

/// A `schema.table` pair.
///
/// Equality and hashing ignore case so that catalog lookups, pattern results
/// and foreign-key targets line up regardless of how the server spells them.
/// Display keeps the original spelling.
#[derive(Debug, Clone, Eq)]
pub struct QualifiedTableName {
    pub schema: String,
    pub name: String,
}

impl QualifiedTableName {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Base filename of the table's generated document: lower-cased `schema.table`.
    pub fn file_stem(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl PartialEq for QualifiedTableName {
    fn eq(&self, other: &Self) -> bool {
        self.schema.eq_ignore_ascii_case(&other.schema) && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Hash for QualifiedTableName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.schema.to_ascii_lowercase().hash(state);
        self.name.to_ascii_lowercase().hash(state);
    }
}

impl fmt::Display for QualifiedTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Metadata for a single column.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    /// `-1` for SQL Server `(max)` types.
    pub character_maximum_length: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
    pub column_default: Option<String>,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub is_identity: bool,
}

impl ColumnDescriptor {
    /// Source type with its size: `nvarchar(50)`, `nvarchar(max)`, `numeric(10,2)`.
    pub fn source_type(&self) -> String {
        let decimal = matches!(self.data_type.to_ascii_lowercase().as_str(), "numeric" | "decimal");
        match (self.character_maximum_length, self.numeric_precision, self.numeric_scale) {
            (Some(-1), _, _) => format!("{}(max)", self.data_type),
            (Some(len), _, _) => format!("{}({len})", self.data_type),
            (None, Some(precision), Some(scale)) if decimal => {
                format!("{}({precision},{scale})", self.data_type)
            }
            (None, Some(precision), None) if decimal => format!("{}({precision})", self.data_type),
            _ => self.data_type.clone(),
        }
    }
}

/// One column of a foreign-key constraint and the column it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyEdge {
    pub constraint_name: String,
    pub column: String,
    pub ref_schema: String,
    pub ref_table: String,
    pub ref_column: String,
}

impl ForeignKeyEdge {
    pub fn target(&self) -> QualifiedTableName {
        QualifiedTableName::new(&self.ref_schema, &self.ref_table)
    }
}

/// Everything the generator needs to know about one table.
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    name: QualifiedTableName,
    columns: Vec<ColumnDescriptor>,
    primary_keys: Vec<String>,
    foreign_keys: Vec<ForeignKeyEdge>,
}

impl TableDescriptor {
    /// Build a descriptor, setting each column's key flags from the key lists.
    pub fn new(
        name: QualifiedTableName,
        mut columns: Vec<ColumnDescriptor>,
        primary_keys: Vec<String>,
        foreign_keys: Vec<ForeignKeyEdge>,
    ) -> Self {
        for col in &mut columns {
            col.is_primary_key = primary_keys.iter().any(|pk| pk == &col.name);
            col.is_foreign_key = foreign_keys.iter().any(|fk| fk.column == col.name);
        }
        Self {
            name,
            columns,
            primary_keys,
            foreign_keys,
        }
    }

    pub fn name(&self) -> &QualifiedTableName {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn primary_keys(&self) -> &[String] {
        &self.primary_keys
    }

    pub fn foreign_keys(&self) -> &[ForeignKeyEdge] {
        &self.foreign_keys
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// True when `column` is the one and only primary-key column.
    pub fn is_sole_primary_key(&self, column: &str) -> bool {
        matches!(self.primary_keys.as_slice(), [pk] if pk.eq_ignore_ascii_case(column))
    }
}
