/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Mssql,
}

impl Dialect {
    /// The `type` argument of the generated `@dbquery` directives.
    pub fn dbquery_type(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgresql",
            Dialect::Mssql => "mssql",
        }
    }

    /// URL scheme used in the generated connection string.
    pub fn dsn_scheme(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgresql",
            Dialect::Mssql => "sqlserver",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Dialect::Postgres => 5432,
            Dialect::Mssql => 1433,
        }
    }

    /// Quote an identifier for use inside generated SQL.
    pub fn quote_ident(&self, ident: &str) -> String {
        match self {
            Dialect::Postgres => format!("\"{}\"", ident.replace('"', "\"\"")),
            Dialect::Mssql => format!("[{}]", ident.replace(']', "]]")),
        }
    }
}
