//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from(match format {
            ConfigFormat::Json => "fritzmon.json",
            ConfigFormat::Toml => "fritzmon.toml",
            ConfigFormat::Yaml => "fritzmon.yaml",
        }),
    };

    let mut content = render_config(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# fritzmon Configuration
# ======================
#
# Server Configuration
# --------------------
# bind: "127.0.0.1"            # Bind IP of the HTTP read surface
# port: 9216                   # HTTP port
# enable_http: true            # Serve /, /series, /metrics and /health
#
# Router Endpoint
# ---------------
# router_host: "192.168.178.1" # FRITZ!Box host name or IP
# router_port: 49000           # UPnP port
# control_path: "/igdupnp/control/WANCommonIFC1"
#
# Polling
# -------
# transfer_interval_secs: 1    # GetAddonInfos period
# limits_interval_secs: 10     # GetCommonLinkProperties period
# tick_interval_secs: 1        # Series sampling period
# data_limit: 20               # Points kept per series (1-10000)
# request_timeout_secs: 5      # Upper bound for one SOAP call
# connect_timeout_secs: 2      # TCP connect timeout
#
# Logging
# -------
# log_level: "info"            # off, error, warn, info, debug, trace
"#;

    format!("{comments}\n{yaml}")
}
