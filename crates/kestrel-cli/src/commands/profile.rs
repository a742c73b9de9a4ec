//! Profile lifecycle commands.
//!
//! Everything that creates, edits or deletes profile records lives here.
//! Profiles are addressed by id, by display name, or by a unique id
//! prefix.
//!
//! # Examples
//!
//! ```bash
//! # Create a profile with a fresh fingerprint
//! kestrel create shop-eu --tags shopping,eu
//!
//! # Clone it under a new identity
//! kestrel clone shop-eu shop-eu-2
//!
//! # Route it through a proxy
//! kestrel update shop-eu --proxy http://127.0.0.1:8080
//!
//! # Delete both without a prompt
//! kestrel remove shop-eu shop-eu-2 --force
//! ```

use anyhow::{Result, bail};
use clap::Args;
use kestrel_core::record::{EngineKind, ProfileKind, ProfileUpdate, ProxySettings};
use kestrel_core::{CloneProfile, CreateProfile, ImportProfile};
use std::io::{self, Write};
use std::path::PathBuf;

pub async fn create(
    name: String,
    label: Option<String>,
    tags: Vec<String>,
    copy_from: Option<String>,
    from_path: Option<PathBuf>,
    engine: String,
    no_fingerprint: bool,
) -> Result<()> {
    let manager = super::lifecycle()?;

    // Resolve the template by name or prefix before creation sees it.
    let copy_from_profile = match copy_from {
        Some(identifier) => Some(manager.resolve(&identifier).await?.id),
        None => None,
    };

    let record = manager
        .create(CreateProfile {
            name,
            label,
            tags,
            copy_from_profile,
            copy_from_path: from_path,
            engine: engine.parse::<EngineKind>()?,
            fingerprint_enabled: !no_fingerprint,
            ..CreateProfile::default()
        })
        .await?;

    println!("✅ Created profile '{}' ({})", record.name, record.short_id());
    println!("   {}", record.path.display());
    Ok(())
}

pub async fn import(
    path: PathBuf,
    name: String,
    copy: bool,
    label: Option<String>,
    tags: Vec<String>,
) -> Result<()> {
    let manager = super::lifecycle()?;
    let record = manager
        .import(ImportProfile {
            name,
            source: path,
            copy,
            label,
            tags,
            ..ImportProfile::default()
        })
        .await?;

    println!("✅ Imported '{}' ({})", record.name, record.short_id());
    println!("   {}", record.path.display());
    if !copy {
        println!("   The directory stays in place; freezing or removing the profile will touch it.");
    }
    Ok(())
}

pub async fn clone(
    source: &str,
    name: String,
    label: Option<String>,
    tags: Vec<String>,
) -> Result<()> {
    let manager = super::lifecycle()?;
    let source = manager.resolve(source).await?;
    let record = manager
        .clone_profile(&source.id, CloneProfile { name, label, tags })
        .await?;

    println!(
        "✅ Cloned '{}' into '{}' ({})",
        source.name,
        record.name,
        record.short_id()
    );
    println!("   {}", record.path.display());
    Ok(())
}

pub async fn rename(identifier: &str, new_name: &str) -> Result<()> {
    let manager = super::lifecycle()?;
    let record = manager.resolve(identifier).await?;
    let old_name = record.name.clone();
    let updated = manager.rename(&record.id, new_name).await?;
    println!("✅ Renamed '{}' to '{}'", old_name, updated.name);
    Ok(())
}

pub async fn tag(identifier: &str, add: &[String], remove: &[String]) -> Result<()> {
    let manager = super::lifecycle()?;
    let record = manager.resolve(identifier).await?;
    let updated = manager.tag(&record.id, add, remove).await?;
    if updated.tags.is_empty() {
        println!("Profile '{}' has no tags.", updated.name);
    } else {
        println!("✅ Tags for '{}': {}", updated.name, updated.tags.join(", "));
    }
    Ok(())
}

pub async fn mark(identifier: &str, kind: &str) -> Result<()> {
    let manager = super::lifecycle()?;
    let record = manager.resolve(identifier).await?;
    let kind = kind.parse::<ProfileKind>()?;
    let updated = manager.set_kind(&record.id, kind).await?;
    println!("✅ Marked '{}' as {}", updated.name, updated.kind);
    Ok(())
}

/// Settings edited by `kestrel update`. `--clear-*` flags null the
/// corresponding value out.
#[derive(Args)]
pub struct UpdateOpts {
    /// Free-form label shown in listings
    #[arg(long)]
    pub label: Option<String>,

    /// Remove the label
    #[arg(long, conflicts_with = "label")]
    pub clear_label: bool,

    /// Pin the profile to the top of listings
    #[arg(long)]
    pub starred: bool,

    /// Unpin the profile
    #[arg(long, conflicts_with = "starred")]
    pub no_starred: bool,

    /// Proxy server, e.g. http://127.0.0.1:8080 or socks5://host:1080
    #[arg(long, value_name = "SERVER")]
    pub proxy: Option<String>,

    /// Proxy username
    #[arg(long, requires = "proxy")]
    pub proxy_user: Option<String>,

    /// Proxy password
    #[arg(long, requires = "proxy")]
    pub proxy_pass: Option<String>,

    /// Hosts that bypass the proxy
    #[arg(long, requires = "proxy")]
    pub proxy_bypass: Option<String>,

    /// Remove the proxy settings
    #[arg(long, conflicts_with = "proxy")]
    pub clear_proxy: bool,

    /// Page opened after launch
    #[arg(long, value_name = "URL")]
    pub start_url: Option<String>,

    /// Remove the start URL
    #[arg(long, conflicts_with = "start_url")]
    pub clear_start_url: bool,

    /// Extra engine arguments stored on the profile
    #[arg(long)]
    pub args: Option<String>,

    /// Remove the stored engine arguments
    #[arg(long, conflicts_with = "args")]
    pub clear_args: bool,

    /// Attach the profile to a group (id or name)
    #[arg(long)]
    pub group: Option<String>,

    /// Detach the profile from its group
    #[arg(long, conflicts_with = "group")]
    pub clear_group: bool,

    /// Engine the profile launches with (chromium, firefox)
    #[arg(long)]
    pub engine: Option<String>,

    /// Turn fingerprint spoofing on
    #[arg(long)]
    pub fingerprint: bool,

    /// Turn fingerprint spoofing off
    #[arg(long, conflicts_with = "fingerprint")]
    pub no_fingerprint: bool,
}

pub async fn update(identifier: &str, opts: UpdateOpts) -> Result<()> {
    let manager = super::lifecycle()?;
    let record = manager.resolve(identifier).await?;

    let group_id = match &opts.group {
        Some(identifier) => {
            let groups = manager.list_groups().await?;
            let group = groups
                .iter()
                .find(|g| g.id == *identifier || g.name == *identifier)
                .ok_or_else(|| anyhow::anyhow!("group '{identifier}' not found"))?;
            Some(group.id.clone())
        }
        None => None,
    };

    let proxy = opts.proxy.map(|server| ProxySettings {
        server,
        username: opts.proxy_user,
        password: opts.proxy_pass,
        bypass: opts.proxy_bypass,
    });

    let update = ProfileUpdate {
        label: opts.label,
        kind: None,
        engine: opts.engine.as_deref().map(str::parse).transpose()?,
        group_id,
        starred: flag_pair(opts.starred, opts.no_starred),
        fingerprint_enabled: flag_pair(opts.fingerprint, opts.no_fingerprint),
        proxy,
        start_url: opts.start_url,
        custom_args: opts.args,
        clear_label: opts.clear_label,
        clear_group: opts.clear_group,
        clear_proxy: opts.clear_proxy,
        clear_start_url: opts.clear_start_url,
        clear_custom_args: opts.clear_args,
    };

    let updated = manager.update(&record.id, update).await?;
    println!("✅ Updated '{}'", updated.name);
    Ok(())
}

/// Maps an on/off flag pair onto the optional value an update carries.
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

pub async fn remove(identifiers: &[String], force: bool) -> Result<()> {
    let manager = super::lifecycle()?;

    if !force {
        print!(
            "⚠️  This permanently deletes {} profile(s) and their data. Continue? [y/N] ",
            identifiers.len()
        );
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !matches!(input.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("Removal cancelled.");
            return Ok(());
        }
    }

    let mut failures = 0;
    let mut resolved = Vec::new();
    for identifier in identifiers {
        match manager.resolve(identifier).await {
            Ok(record) => resolved.push((record.id, record.name)),
            Err(e) => {
                failures += 1;
                eprintln!("❌ {identifier}: {e}");
            }
        }
    }

    let ids: Vec<String> = resolved.iter().map(|(id, _)| id.clone()).collect();
    for (outcome, (_, name)) in manager.remove_many(&ids).await.iter().zip(&resolved) {
        match &outcome.error {
            None => println!("✅ Removed '{name}'"),
            Some(message) => {
                failures += 1;
                eprintln!("❌ {name}: {message}");
            }
        }
    }

    if failures > 0 {
        bail!("failed to remove {failures} of {} profile(s)", identifiers.len());
    }
    Ok(())
}
