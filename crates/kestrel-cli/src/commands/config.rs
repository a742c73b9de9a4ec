//! Tool-wide configuration commands.

use anyhow::{Result, bail};
use std::path::PathBuf;

pub async fn show() -> Result<()> {
    let manager = super::lifecycle()?;
    let config = manager.config().await?;

    let engine = config
        .engine_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(auto-detect)".into());
    let extensions = config
        .extensions_root
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(unset)".into());

    println!("Engine path:     {engine}");
    println!("Extensions root: {extensions}");
    println!("Default args:    {}", if config.default_args.is_empty() {
        "(none)".into()
    } else {
        config.default_args.join(" ")
    });
    if config.env.is_empty() {
        println!("Environment:     (none)");
    } else {
        println!("Environment:");
        for (key, value) in &config.env {
            println!("  {key}={value}");
        }
    }
    println!();
    println!("Config file: {}", manager.paths().config_path.display());
    Ok(())
}

pub async fn set(
    engine_path: Option<PathBuf>,
    extensions_root: Option<PathBuf>,
    default_args: Option<String>,
    env: Vec<String>,
    clear_env: bool,
) -> Result<()> {
    let manager = super::lifecycle()?;
    let mut config = manager.config().await?;

    // An empty path value returns the setting to its default.
    if let Some(path) = engine_path {
        config.engine_path = normalize_path(path)?;
    }
    if let Some(path) = extensions_root {
        config.extensions_root = normalize_path(path)?;
    }
    if let Some(args) = default_args {
        config.default_args = args.split_whitespace().map(String::from).collect();
    }
    if clear_env {
        config.env.clear();
    }
    for pair in env {
        match pair.split_once('=') {
            Some((key, value)) => {
                config.env.insert(key.to_string(), value.to_string());
            }
            None => bail!("environment entries must look like KEY=VALUE, got '{pair}'"),
        }
    }

    kestrel_core::config::save_config(manager.paths(), &config).await?;
    println!("✅ Configuration saved");
    Ok(())
}

fn normalize_path(path: PathBuf) -> Result<Option<PathBuf>> {
    if path.as_os_str().is_empty() {
        Ok(None)
    } else {
        Ok(Some(std::path::absolute(path)?))
    }
}
