//! Poll command implementation.
//!
//! Calls one SOAP action against the configured router and prints each
//! record together with its outcome.

use anyhow::{bail, Context};
use fritzmon::{Action, Fetched, MetricStore, SoapClient};

use crate::cli::ConfigFormat;
use crate::config::Config;

fn render(fetched: &Fetched, format: &ConfigFormat) -> anyhow::Result<String> {
    Ok(match format {
        ConfigFormat::Json => {
            serde_json::to_string_pretty(fetched).context("failed to render JSON")?
        }
        ConfigFormat::Toml => toml::to_string_pretty(fetched).context("failed to render TOML")?,
        ConfigFormat::Yaml => serde_yaml::to_string(fetched).context("failed to render YAML")?,
    })
}

/// Performs `iterations` calls of `action` and prints the results.
/// Fails when not a single call succeeded.
pub async fn command_poll(
    action: Action,
    iterations: usize,
    format: ConfigFormat,
    config: &Config,
) -> anyhow::Result<()> {
    let client = SoapClient::new(config.soap_settings())
        .context("failed to build HTTP client")?;
    let store = MetricStore::new();

    eprintln!("📡 {} via {}", action.soap_action(), client.endpoint());

    let mut successes = 0usize;
    for iteration in 1..=iterations {
        let fetched = client.fetch(action).await;
        store.apply(&fetched.response);
        if fetched.is_success() {
            successes += 1;
        }

        eprintln!(
            "🔄 Iteration {}/{} ({:.1} ms)",
            iteration,
            iterations,
            fetched.duration.as_secs_f64() * 1000.0
        );
        println!("{}", render(&fetched, &format)?);
    }

    let snapshot = store.snapshot();
    eprintln!(
        "📊 {}",
        snapshot
            .iter()
            .map(|(metric, value)| format!("{}={}", metric, value))
            .collect::<Vec<_>>()
            .join(" ")
    );

    if iterations > 0 && successes == 0 {
        bail!(
            "all {} call(s) of {} failed",
            iterations,
            action.soap_action()
        );
    }

    Ok(())
}
