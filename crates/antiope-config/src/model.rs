use std::collections::HashMap;
use std::time::Duration;

use crate::error::ConfigError;
use crate::parse::parse_seconds;

pub const DEFAULT_SERVER_URL: &str = "wss://nntp.antiope.link";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_name: String,
    pub server_url: String,
    pub connect_timeout: Option<Duration>,
    pub command_timeout: Option<Duration>,
    pub log_level: String,
}

impl Config {
    pub fn from_raw(raw: HashMap<String, String>) -> Result<Self, ConfigError> {
        let server_name = raw
            .get("ServerName")
            .cloned()
            .unwrap_or_else(|| "default".to_string());
        let server_url = raw
            .get("ServerUrl")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        if !(server_url.starts_with("ws://") || server_url.starts_with("wss://")) {
            return Err(ConfigError::InvalidValue {
                option: "ServerUrl".to_string(),
                value: server_url,
            });
        }
        let connect_timeout = parse_seconds(&raw, "ConnectTimeout", 15)?;
        let command_timeout = parse_seconds(&raw, "CommandTimeout", 30)?;
        let log_level = raw
            .get("LogLevel")
            .cloned()
            .unwrap_or_else(|| "info".to_string());

        Ok(Self {
            server_name,
            server_url,
            connect_timeout,
            command_timeout,
            log_level,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_name: "default".to_string(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            connect_timeout: Some(Duration::from_secs(15)),
            command_timeout: Some(Duration::from_secs(30)),
            log_level: "info".to_string(),
        }
    }
}
