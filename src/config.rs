//! Configuration management for fritzmon.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use clap::ValueEnum;
use fritzmon::aggregator::DEFAULT_DATA_LIMIT;
use fritzmon::{PollerSettings, SoapSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9216;
pub const DEFAULT_ROUTER_HOST: &str = "192.168.178.1";
pub const DEFAULT_ROUTER_PORT: u16 = 49000;
pub const DEFAULT_CONTROL_PATH: &str = "/igdupnp/control/WANCommonIFC1";
pub const DEFAULT_TRANSFER_INTERVAL_SECS: u64 = 1;
pub const DEFAULT_LIMITS_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 1;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 2;
pub const MAX_DATA_LIMIT: usize = 10_000;

/// Configuration file search order when no path is given.
pub const DEFAULT_CONFIG_PATHS: [&str; 4] = [
    "/etc/fritzmon/fritzmon.yaml",
    "./fritzmon.yaml",
    "./fritzmon.json",
    "./fritzmon.toml",
];

/// Effective configuration. Every field is optional in files; missing
/// values fall back to the defaults above.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub enable_http: Option<bool>,

    // Router endpoint
    #[serde(alias = "router-host")]
    pub router_host: Option<String>,
    #[serde(alias = "router-port")]
    pub router_port: Option<u16>,
    #[serde(alias = "control-path")]
    pub control_path: Option<String>,

    // Polling
    #[serde(alias = "transfer-interval-secs")]
    pub transfer_interval_secs: Option<u64>,
    #[serde(alias = "limits-interval-secs")]
    pub limits_interval_secs: Option<u64>,
    #[serde(alias = "tick-interval-secs")]
    pub tick_interval_secs: Option<u64>,
    #[serde(alias = "data-limit")]
    pub data_limit: Option<usize>,
    #[serde(alias = "request-timeout-secs")]
    pub request_timeout_secs: Option<u64>,
    #[serde(alias = "connect-timeout-secs")]
    pub connect_timeout_secs: Option<u64>,

    // Logging
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_PORT),
            enable_http: Some(true),
            router_host: Some(DEFAULT_ROUTER_HOST.to_string()),
            router_port: Some(DEFAULT_ROUTER_PORT),
            control_path: Some(DEFAULT_CONTROL_PATH.to_string()),
            transfer_interval_secs: Some(DEFAULT_TRANSFER_INTERVAL_SECS),
            limits_interval_secs: Some(DEFAULT_LIMITS_INTERVAL_SECS),
            tick_interval_secs: Some(DEFAULT_TICK_INTERVAL_SECS),
            data_limit: Some(DEFAULT_DATA_LIMIT),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout_secs: Some(DEFAULT_CONNECT_TIMEOUT_SECS),
            log_level: Some("info".into()),
        }
    }
}

impl Config {
    /// Effective log level, `info` when unset.
    pub fn log_level(&self) -> Result<LogLevel, String> {
        match self.log_level.as_deref() {
            None => Ok(LogLevel::Info),
            Some(level) => LogLevel::from_str(level, true)
                .map_err(|_| format!("Invalid log_level '{}'", level)),
        }
    }

    pub fn router_host(&self) -> &str {
        self.router_host.as_deref().unwrap_or(DEFAULT_ROUTER_HOST)
    }

    pub fn control_path(&self) -> &str {
        self.control_path.as_deref().unwrap_or(DEFAULT_CONTROL_PATH)
    }

    /// `http://<router_host>:<router_port><control_path>`
    pub fn endpoint_url(&self) -> String {
        format!(
            "http://{}:{}{}",
            self.router_host(),
            self.router_port.unwrap_or(DEFAULT_ROUTER_PORT),
            self.control_path()
        )
    }

    pub fn soap_settings(&self) -> SoapSettings {
        SoapSettings {
            endpoint: self.endpoint_url(),
            request_timeout: Duration::from_secs(
                self.request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            connect_timeout: Duration::from_secs(
                self.connect_timeout_secs
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            ),
        }
    }

    pub fn poller_settings(&self) -> PollerSettings {
        PollerSettings {
            transfer_period: Duration::from_secs(
                self.transfer_interval_secs
                    .unwrap_or(DEFAULT_TRANSFER_INTERVAL_SECS),
            ),
            limits_period: Duration::from_secs(
                self.limits_interval_secs
                    .unwrap_or(DEFAULT_LIMITS_INTERVAL_SECS),
            ),
            tick_period: Duration::from_secs(
                self.tick_interval_secs.unwrap_or(DEFAULT_TICK_INTERVAL_SECS),
            ),
            data_limit: self.data_limit.unwrap_or(DEFAULT_DATA_LIMIT),
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let intervals = [
        ("transfer_interval_secs", cfg.transfer_interval_secs),
        ("limits_interval_secs", cfg.limits_interval_secs),
        ("tick_interval_secs", cfg.tick_interval_secs),
        ("request_timeout_secs", cfg.request_timeout_secs),
        ("connect_timeout_secs", cfg.connect_timeout_secs),
    ];
    for (name, value) in intervals {
        if value == Some(0) {
            return Err(format!("{} must be greater than 0", name).into());
        }
    }

    if let Some(limit) = cfg.data_limit {
        if limit == 0 || limit > MAX_DATA_LIMIT {
            return Err(format!(
                "data_limit must be between 1 and {}, got {}",
                MAX_DATA_LIMIT, limit
            )
            .into());
        }
    }

    if cfg.router_host().trim().is_empty() {
        return Err("router_host must not be empty".into());
    }

    if !cfg.control_path().starts_with('/') {
        return Err(format!(
            "control_path must start with '/', got '{}'",
            cfg.control_path()
        )
        .into());
    }

    cfg.log_level()?;

    let url = cfg.endpoint_url();
    reqwest::Url::parse(&url).map_err(|e| format!("Invalid endpoint URL '{}': {}", url, e))?;

    if let Some(bind) = cfg.bind.as_deref() {
        bind.parse::<std::net::IpAddr>()
            .map_err(|e| format!("Invalid bind address '{}': {}", bind, e))?;
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    // Override with CLI args
    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }

    // Only override port if the user supplied it on the CLI.
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }

    if let Some(host) = &args.router_host {
        config.router_host = Some(host.clone());
    }
    if let Some(port) = args.router_port {
        config.router_port = Some(port);
    }

    if let Some(secs) = args.transfer_interval {
        config.transfer_interval_secs = Some(secs);
    }
    if let Some(secs) = args.limits_interval {
        config.limits_interval_secs = Some(secs);
    }
    if let Some(limit) = args.data_limit {
        config.data_limit = Some(limit);
    }

    if args.disable_http {
        config.enable_http = Some(false);
    }

    if let Some(level) = &args.log_level {
        config.log_level = Some(level.as_str().to_string());
    }

    Ok(config)
}

/// Loads a config file, or the first existing default location.
/// Without any file the defaults are returned.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(format!("Config file not found: {}", p.display()).into());
            }
            p.to_path_buf()
        }
        None => match DEFAULT_CONFIG_PATHS
            .iter()
            .find(|p| Path::new(p).exists())
            .map(PathBuf::from)
        {
            Some(p) => p,
            None => return Ok(Config::default()),
        },
    };

    let content = fs::read_to_string(&path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Renders a config in the requested format.
pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    let output = render_config(config, &format)?;
    println!("{output}");
    Ok(())
}
