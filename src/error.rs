use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbsdlError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("MSSQL error: {0}")]
    Mssql(#[from] tiberius::error::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid table pattern '{0}': expected schema.table")]
    InvalidPattern(String),

    #[error("Malformed metadata for {table}: {reason}")]
    Metadata { table: String, reason: String },

    #[error("Render error: {0}")]
    Render(#[from] std::fmt::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// MSSQL "Login failed for user".
const MSSQL_LOGIN_FAILED: u32 = 18456;

impl DbsdlError {
    /// Whether the error means the database itself is unreachable or rejected
    /// us. These abort the run; anything else is scoped to a single table.
    pub fn is_connectivity(&self) -> bool {
        match self {
            DbsdlError::Connection(_) => true,
            DbsdlError::Database(e) => match e {
                sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::Configuration(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed => true,
                // SQLSTATE class 08 is connection exception, 28 is invalid authorization.
                sqlx::Error::Database(db) => db
                    .code()
                    .is_some_and(|code| code.starts_with("08") || code.starts_with("28")),
                _ => false,
            },
            DbsdlError::Mssql(e) => match e {
                tiberius::error::Error::Io { .. }
                | tiberius::error::Error::Tls(_)
                | tiberius::error::Error::Routing { .. } => true,
                tiberius::error::Error::Server(token) => token.code() == MSSQL_LOGIN_FAILED,
                _ => false,
            },
            _ => false,
        }
    }
}
