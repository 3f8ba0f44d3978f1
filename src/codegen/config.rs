use serde::{Deserialize, Serialize};

use crate::cli::ConnectionConfig;
use crate::error::DbsdlError;

/// The `config.yaml` that tells the schema engine how to reach the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    pub configurationset: Vec<ConfigurationEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationEntry {
    pub configuration: NamedConnection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedConnection {
    pub name: String,
    pub dsn: String,
}

impl ConfigDocument {
    pub fn single(name: &str, conn: &ConnectionConfig) -> Self {
        Self {
            configurationset: vec![ConfigurationEntry {
                configuration: NamedConnection {
                    name: name.to_string(),
                    dsn: conn.dsn(),
                },
            }],
        }
    }
}

pub fn render_config(name: &str, conn: &ConnectionConfig) -> Result<String, DbsdlError> {
    serde_yaml::to_string(&ConfigDocument::single(name, conn))
        .map_err(|e| DbsdlError::Config(format!("cannot serialize config.yaml: {e}")))
}
