use clap::{Parser, Subcommand};
use configuration::load_config;
use database::connection::{connect, run_migrations};
use std::path::PathBuf;

/// The main entry point for the class portal backend.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the environment may already be populated.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    let _log_guard = web_server::logging::init_tracing(&config.logging)?;

    match cli.command {
        Commands::Serve(args) => {
            if let Some(port) = args.port {
                config.server.port = port;
            }
            web_server::run_server(&config).await?;
        }
        Commands::Migrate => {
            let db_pool = connect(&config.database).await?;
            run_migrations(&db_pool).await?;
            tracing::info!("Database schema is up to date.");
        }
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Class, semester and mentor metadata service for the department portal.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML settings file (defaults to an optional `portal.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the schema and serve the HTTP API.
    Serve(ServeArgs),
    /// Apply the schema and exit.
    Migrate,
}

#[derive(Parser)]
struct ServeArgs {
    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,
}
