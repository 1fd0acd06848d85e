use anyhow::{Context, Result, anyhow};
use clap::Parser;

use antiope::app;
use antiope::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(app::default_config_path);
    let config = app::load_config(config_path.as_deref(), &app::collect_overrides(&cli))?;
    app::init_tracing(cli.log_level.as_deref().unwrap_or(&config.log_level));

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("failed to install rustls crypto provider"))?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    rt.block_on(async {
        tracing::debug!(server = %config.server_url, "antiope starting");
        let mut stdout = std::io::stdout().lock();
        app::run(cli.command, &config, &mut stdout).await
    })
}
