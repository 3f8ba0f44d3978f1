mod cli;
mod codegen;
mod dialect;
mod error;
mod events;
mod filter;
mod generate;
mod introspect;
mod naming;
mod schema;
#[cfg(test)]
mod testutil;
mod typemap;

use std::fs;
use std::path::Path;

use anyhow::Result;
use clap::Parser;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, ConnectionConfig};
use crate::codegen::config::render_config;
use crate::codegen::sdl::RenderContext;
use crate::dialect::Dialect;
use crate::error::DbsdlError;
use crate::events::TracingSink;
use crate::generate::{generate, GeneratedSchema};
use crate::introspect::mssql::MssqlProvider;
use crate::introspect::pg::PgProvider;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Everything below is validated before the first connection attempt.
    let config = cli.parse_connection()?;
    let options = cli.generation_options()?;
    let ctx = RenderContext {
        dialect: config.dialect,
        configuration: cli.config_name(config.dialect),
    };
    let mut sink = TracingSink;

    tracing::debug!("Connecting to {}:{}/{}...", config.host, config.port, config.database);

    let schema = match config.dialect {
        Dialect::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(1)
                .connect_with(pg_options(&config))
                .await
                .map_err(DbsdlError::from)?;
            let mut provider = PgProvider::new(pool);
            let result = generate(&mut provider, &options, &ctx, &mut sink).await;
            provider.close().await;
            result?
        }
        Dialect::Mssql => {
            let mut provider = MssqlProvider::connect(&config).await?;
            generate(&mut provider, &options, &ctx, &mut sink).await?
        }
    };

    let config_yaml = render_config(&ctx.configuration, &config)?;
    write_outputs(&cli.outdir, &schema, &config_yaml)?;
    tracing::info!(
        "Wrote {} table documents to {}",
        schema.documents.len(),
        cli.outdir.display()
    );

    Ok(())
}

fn pg_options(config: &ConnectionConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user)
        .password(&config.password)
}

fn write_outputs(outdir: &Path, schema: &GeneratedSchema, config_yaml: &str) -> Result<(), DbsdlError> {
    fs::create_dir_all(outdir)?;
    for doc in &schema.documents {
        tracing::debug!("Writing {} ({})", doc.file_name, doc.table);
        fs::write(outdir.join(&doc.file_name), &doc.contents)?;
    }
    fs::write(outdir.join("index.graphql"), &schema.index)?;
    fs::write(outdir.join("config.yaml"), config_yaml)?;
    Ok(())
}
