// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printscout: one-shot network printer discovery
//
// Entry point. Initialises logging, loads the optional config and manual
// cache, runs a single discovery and writes the printers to stdout as JSON.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use printscout_core::config::DiscoveryConfig;
use printscout_core::error::Result;
use printscout_discovery::{ManualCache, PrinterDiscovery};

/// Path of a JSON `DiscoveryConfig`; defaults apply when unset.
const CONFIG_ENV: &str = "PRINTSCOUT_CONFIG";

/// Path of the JSON manual printer cache written by the outer application.
const MANUAL_CACHE_ENV: &str = "PRINTSCOUT_MANUAL_CACHE";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Printscout starting");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "discovery could not start");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = match env_path(CONFIG_ENV) {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading config");
            DiscoveryConfig::from_json_file(&path)?
        }
        None => DiscoveryConfig::default(),
    };

    let mut discovery = PrinterDiscovery::new(config)?;
    if let Some(path) = env_path(MANUAL_CACHE_ENV) {
        let cache = ManualCache::from_json_file(&path)?;
        tracing::info!(path = %path.display(), entries = cache.len(), "manual cache loaded");
        discovery = discovery.with_manual_cache(Arc::new(cache));
    }

    let printers = discovery.discover().await;
    println!("{}", serde_json::to_string_pretty(&printers)?);
    Ok(())
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
