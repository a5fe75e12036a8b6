// Tenet - Constitutional critique and revision engine
// Main entry point

use anyhow::Result;
use clap::Parser;

use tenet::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tenet=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli::run(cli).await
}
