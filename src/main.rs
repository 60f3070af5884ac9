use anime_item::cli::ShellCommands;
use anyhow::Result;
use log::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Also picks up `log` records from the library
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = ShellCommands.run().await {
        error!("FAILED: {e}");
        std::process::exit(1);
    }
    Ok(())
}
