use std::fmt;

/// GraphQL scalars produced for database columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Int,
    Float,
    String,
    Boolean,
    Date,
    DateTime,
    Json,
}

impl Scalar {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scalar::Int => "Int",
            Scalar::Float => "Float",
            Scalar::String => "String",
            Scalar::Boolean => "Boolean",
            Scalar::Date => "Date",
            Scalar::DateTime => "DateTime",
            Scalar::Json => "JSON",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source type names, lower-cased, for both PostgreSQL (`udt_name` and
/// `data_type` spellings) and MSSQL.
const TYPE_TABLE: &[(&str, Scalar)] = &[
    // integers
    ("int2", Scalar::Int),
    ("int4", Scalar::Int),
    ("int8", Scalar::Int),
    ("smallint", Scalar::Int),
    ("integer", Scalar::Int),
    ("int", Scalar::Int),
    ("bigint", Scalar::Int),
    ("tinyint", Scalar::Int),
    ("serial", Scalar::Int),
    ("bigserial", Scalar::Int),
    // fractional
    ("float4", Scalar::Float),
    ("float8", Scalar::Float),
    ("real", Scalar::Float),
    ("double precision", Scalar::Float),
    ("float", Scalar::Float),
    ("numeric", Scalar::Float),
    ("decimal", Scalar::Float),
    ("money", Scalar::Float),
    ("smallmoney", Scalar::Float),
    // boolean
    ("bool", Scalar::Boolean),
    ("boolean", Scalar::Boolean),
    ("bit", Scalar::Boolean),
    // temporal
    ("date", Scalar::Date),
    ("timestamp", Scalar::DateTime),
    ("timestamptz", Scalar::DateTime),
    ("timestamp without time zone", Scalar::DateTime),
    ("timestamp with time zone", Scalar::DateTime),
    ("datetime", Scalar::DateTime),
    ("datetime2", Scalar::DateTime),
    ("smalldatetime", Scalar::DateTime),
    ("datetimeoffset", Scalar::DateTime),
    ("time", Scalar::String),
    ("timetz", Scalar::String),
    // text
    ("text", Scalar::String),
    ("varchar", Scalar::String),
    ("character varying", Scalar::String),
    ("char", Scalar::String),
    ("bpchar", Scalar::String),
    ("character", Scalar::String),
    ("nvarchar", Scalar::String),
    ("nchar", Scalar::String),
    ("ntext", Scalar::String),
    ("uuid", Scalar::String),
    ("uniqueidentifier", Scalar::String),
    ("xml", Scalar::String),
    // documents
    ("json", Scalar::Json),
    ("jsonb", Scalar::Json),
];

/// Map a source column type to a GraphQL scalar.
///
/// Unknown types (`geography`, `hierarchyid`, arrays, ...) map to `String` so
/// that an exotic column never stops generation; precision may be lost.
pub fn map_type(source_type: &str) -> Scalar {
    let key = source_type.trim().to_lowercase();
    TYPE_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, scalar)| *scalar)
        .unwrap_or(Scalar::String)
}

/// `Int` + not nullable -> `Int!`.
pub fn format_nullable(type_name: &str, nullable: bool) -> String {
    if nullable {
        type_name.to_string()
    } else {
        format!("{type_name}!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_types() {
        for t in ["int4", "integer", "int", "bigint", "smallint", "tinyint"] {
            assert_eq!(map_type(t), Scalar::Int, "{t}");
        }
    }

    #[test]
    fn test_lookup_ignores_case() {
        assert_eq!(map_type("NVARCHAR"), Scalar::String);
        assert_eq!(map_type("DateTime2"), Scalar::DateTime);
        assert_eq!(map_type("Bit"), Scalar::Boolean);
    }

    #[test]
    fn test_other_families() {
        assert_eq!(map_type("numeric"), Scalar::Float);
        assert_eq!(map_type("money"), Scalar::Float);
        assert_eq!(map_type("date"), Scalar::Date);
        assert_eq!(map_type("timestamptz"), Scalar::DateTime);
        assert_eq!(map_type("jsonb"), Scalar::Json);
        assert_eq!(map_type("jsonb").to_string(), "JSON");
        assert_eq!(map_type("uniqueidentifier"), Scalar::String);
    }

    #[test]
    fn test_unknown_types_fall_back_to_string() {
        for t in ["geography", "hierarchyid", "_int4", "", "sql_variant"] {
            assert_eq!(map_type(t), Scalar::String, "{t}");
        }
    }

    #[test]
    fn test_format_nullable() {
        assert_eq!(format_nullable("Int", false), "Int!");
        assert_eq!(format_nullable("Int", true), "Int");
    }
}
