use clap::Parser;
use reviews::shell::cli::{self, Cli};
use reviews::shell::config::Config;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    tracing::debug!(api = %config.api_base_url, store = %config.store_dir.display(), "configuration loaded");
    cli::run(cli, config).await
}
