// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// sysbars-probe: one-shot `getHeights` call against the platform bridge.
//
// Entry point. Initialises logging, loads the optional config file given as
// the first argument, issues a single call and prints the result as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use sysbars_bridge::{CONFIGURATION_CHANGED, GET_HEIGHTS, PLUGIN_NAME, PluginCall, platform_plugin};
use sysbars_core::error::Result;
use sysbars_core::{InsetReport, ReporterConfig};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("sysbars-probe starting");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "probe failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => ReporterConfig::load(&path)?,
        None => ReporterConfig::default(),
    };

    let plugin = platform_plugin(config)?;
    plugin.load();
    plugin.add_listener(CONFIGURATION_CHANGED, |_| {
        tracing::info!("configuration changed, re-query {GET_HEIGHTS}");
    });

    let (call, pending) = PluginCall::new(GET_HEIGHTS);
    plugin.handle(call).await;
    let result = pending.outcome().await;
    plugin.unload();
    let value = result?;

    let report: InsetReport = serde_json::from_value(value.clone())?;
    tracing::info!(
        plugin = PLUGIN_NAME,
        tier = ?plugin.reporter().tier(),
        landscape = report.orientation.is_some_and(|o| o.is_landscape()),
        "system bars measured"
    );
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
