//! Command line entry point shared by `portfolio-api` and `portfolio-auth`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::{self, AppConfig, Service};
use crate::database::DatabaseManager;
use crate::server;

#[derive(Parser, Debug)]
#[command(version, about = "Portfolio manager service")]
pub struct Cli {
    #[arg(long, global = true, env = "HOST", help = "Address to bind")]
    pub host: Option<String>,

    #[arg(long, short, global = true, env = "PORT", help = "Port to listen on")]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

pub async fn run(service: Service, cli: Cli) -> anyhow::Result<()> {
    let config = config::init(service, |config| cli.apply(config));
    server::init_tracing(&config.logging);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => server::run(service, config).await,
        Commands::Migrate => migrate(service, config).await,
    }
}

async fn migrate(service: Service, config: &AppConfig) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    DatabaseManager::migrate(&pool, service)
        .await
        .context("failed to apply migrations")?;
    DatabaseManager::close(&pool).await;
    info!(service = service.name(), "Migrations applied");
    Ok(())
}
