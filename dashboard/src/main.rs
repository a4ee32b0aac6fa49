use anyhow::{Context, Result};
use clap::Parser;

use log_dashboard::{Config, app, logging};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::parse();

    logging::init(&config.log_file)
        .with_context(|| format!("cannot open log file {}", config.log_file.display()))?;
    log::info!("log-dashboard started, server {}", config.server);

    app::run(config).await
}
