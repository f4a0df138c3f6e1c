//! CLI arguments and subcommands for fritzmon.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use fritzmon::Action;
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// SOAP action selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PollAction {
    TransferRates,
    LinkLimits,
}

impl From<PollAction> for Action {
    fn from(action: PollAction) -> Self {
        match action {
            PollAction::TransferRates => Action::TransferRates,
            PollAction::LinkLimits => Action::LinkLimits,
        }
    }
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "fritzmon",
    about = "WAN bandwidth monitor for FRITZ!Box routers",
    long_about = "WAN bandwidth monitor for FRITZ!Box routers.\n\n\
                  Polls the router's UPnP WANCommonInterfaceConfig service for current \
                  transfer rates and physical link limits, and keeps a rolling history \
                  of the last values for display.",
    version = "0.1.0",
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Router host name or IP
    #[arg(long)]
    pub router_host: Option<String>,

    /// Router UPnP port
    #[arg(long)]
    pub router_port: Option<u16>,

    /// Log level [default: info, or log_level from the config file]
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Seconds between transfer rate polls
    #[arg(long)]
    pub transfer_interval: Option<u64>,

    /// Seconds between link limit polls
    #[arg(long)]
    pub limits_interval: Option<u64>,

    /// Points kept per series
    #[arg(long)]
    pub data_limit: Option<usize>,

    /// Disable the HTTP read surface
    #[arg(long)]
    pub disable_http: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Query the router once and print the result
    Poll {
        /// Action to call
        #[arg(long, value_enum, default_value = "transfer-rates")]
        action: PollAction,

        /// Number of calls
        #[arg(short = 'n', long, default_value_t = 1)]
        iterations: usize,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,
    },
}
