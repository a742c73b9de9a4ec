//! Launch command.
//!
//! Starts the engine for a profile and stays in the foreground until the
//! browser exits or the user hits Ctrl+C.
//!
//! # Examples
//!
//! ```bash
//! kestrel launch shop-eu
//! kestrel launch shop-eu --args "--incognito"
//! kestrel launch shop-eu --engine-path /usr/bin/chromium-beta
//! ```

use anyhow::Result;
use console::style;
use kestrel_browser::LaunchOrchestrator;
use std::path::PathBuf;

pub async fn execute(
    identifier: &str,
    engine_path: Option<PathBuf>,
    args: Option<String>,
) -> Result<()> {
    let manager = super::lifecycle()?;
    let orchestrator = LaunchOrchestrator::new(manager);

    let extra_args: Vec<String> = args
        .as_deref()
        .unwrap_or_default()
        .split_whitespace()
        .map(String::from)
        .collect();

    println!("🚀 Launching profile '{identifier}'...");
    let mut launched = orchestrator
        .launch(identifier, engine_path, &extra_args)
        .await?;

    println!(
        "✅ {} is running ({})",
        style(&launched.record.name).bold(),
        launched.record.engine
    );
    println!("   Press Ctrl+C to close the browser and exit");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            println!("🛑 Closing browser...");
            let closed = orchestrator.shutdown().await;
            tracing::debug!("closed {closed} session(s)");
        }
        _ = &mut launched.exited => {
            println!("👋 Browser exited");
            orchestrator.shutdown().await;
        }
    }

    println!("✅ Done");
    Ok(())
}
