pub mod commands;

use clap::{Parser, Subcommand};

use crate::config;

#[derive(Parser)]
#[command(name = "teslo-api")]
#[command(about = "Teslo API - product catalog server with realtime presence")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP and WebSocket server")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Replace users and products with the fixture data")]
    Seed(commands::seed::SeedArgs),

    #[command(about = "Apply the embedded database migrations")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::config().clone();
    tracing::info!("Running in {:?} mode", config.environment);

    match cli.command {
        Commands::Serve(args) => commands::serve::handle(args, config).await,
        Commands::Seed(args) => commands::seed::handle(args, config).await,
        Commands::Migrate => commands::migrate::handle(config).await,
    }
}
