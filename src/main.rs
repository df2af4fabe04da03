use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use archive_ingest::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    if let Err(e) = archive_ingest::run(cli).await {
        eprintln!("[ERROR] Ingest failed: {e}");
        std::process::exit(1);
    }
    Ok(())
}
