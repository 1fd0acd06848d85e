use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use antiope_config::{Config, parse_config};
use antiope_nntp::{GroupInfo, NewsServer, NntpClient, Transport};

use crate::cli::{Cli, Command};

/// Read the config file (if any) and apply `KEY=VALUE` overrides on top.
pub fn load_config(path: Option<&Path>, overrides: &[String]) -> Result<Config> {
    let mut raw = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading config: {}", path.display()))?;
            parse_config(&content).context("parsing config")?
        }
        None => HashMap::new(),
    };
    for opt in overrides {
        let (key, value) = opt
            .split_once('=')
            .with_context(|| format!("invalid option '{opt}': expected KEY=VALUE"))?;
        raw.insert(key.trim().to_string(), value.trim().to_string());
    }
    Config::from_raw(raw).context("invalid configuration")
}

pub fn collect_overrides(cli: &Cli) -> Vec<String> {
    let mut overrides = cli.options.clone();
    if let Some(url) = &cli.url {
        overrides.push(format!("ServerUrl={url}"));
    }
    overrides
}

pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

pub fn news_server(config: &Config) -> NewsServer {
    NewsServer {
        name: config.server_name.clone(),
        url: config.server_url.clone(),
        connect_timeout: config.connect_timeout,
        command_timeout: config.command_timeout,
    }
}

/// Connect, run one subcommand, and close the socket.
pub async fn run(command: Command, config: &Config, out: &mut impl Write) -> Result<()> {
    let server = news_server(config);
    let client = NntpClient::connect(&server)
        .await
        .with_context(|| format!("connecting to {}", server.url))?;

    let result = execute(&client, command, out).await;
    client.close();
    result
}

pub async fn execute<T: Transport>(
    client: &NntpClient<T>,
    command: Command,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Groups { json } => {
            let groups = client
                .get_news_group_list()
                .await
                .context("newsgroup list unavailable")?;
            tracing::info!(count = groups.len(), "listed newsgroups");
            out.write_all(render_groups(&groups, json)?.as_bytes())?;
        }
        Command::Send { name, args, strip } => {
            let response = client
                .send_command(&name, args.as_slice(), strip)
                .await
                .with_context(|| format!("sending {name}"))?;
            tracing::info!(code = response.response_code, "command answered");
            for line in &response.lines {
                writeln!(out, "{line}")?;
            }
        }
    }
    Ok(())
}

pub fn render_groups(groups: &[GroupInfo], json: bool) -> Result<String> {
    if json {
        let mut text = serde_json::to_string_pretty(groups).context("encoding groups")?;
        text.push('\n');
        return Ok(text);
    }

    let width = groups
        .iter()
        .map(|g| g.name.len())
        .chain(std::iter::once("GROUP".len()))
        .max()
        .unwrap_or_default();
    let mut text = format!("{:<width$}  {:>10}  {:>10}  DESCRIPTION\n", "GROUP", "LOW", "HIGH");
    for group in groups {
        text.push_str(&format!(
            "{:<width$}  {:>10}  {:>10}  {}\n",
            group.name, group.low_water, group.high_water, group.description
        ));
    }
    Ok(text)
}

pub fn default_config_path() -> Option<PathBuf> {
    let candidates = [
        dirs::config_dir().map(|d| d.join("antiope").join("antiope.conf")),
        Some(PathBuf::from("/etc/antiope.conf")),
        Some(PathBuf::from("/usr/local/etc/antiope.conf")),
    ];
    candidates.into_iter().flatten().find(|p| p.exists())
}
