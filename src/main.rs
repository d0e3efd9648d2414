//! Classification server entry point.

use clap::Parser;
use classification_server::cli::{run_command, Cli, Commands};
use classification_server::server::{run_server, shutdown_signal};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "classification_server=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            run_server(args.into()).await?;
        }
        Commands::Exec(argv) => {
            run_command(&argv).await?;
            // Keep the container alive after one-off commands.
            info!("Command finished, waiting for shutdown signal");
            shutdown_signal().await;
        }
    }

    Ok(())
}
