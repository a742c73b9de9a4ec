use anyhow::Result;
use console::style;
use kestrel_core::ProfileStatus;
use kestrel_core::fsutil;

/// List every profile, starred ones first.
pub async fn list(json: bool) -> Result<()> {
    let manager = super::lifecycle()?;
    let profiles = manager.list().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    if profiles.is_empty() {
        println!("No profiles yet. Create one with: kestrel create <name>");
        return Ok(());
    }

    let groups = manager.list_groups().await?;
    println!(
        "  {:<20} {:<8} {:<10} {:<10} {:<12} {:<10} {}",
        "NAME", "ID", "STATUS", "ENGINE", "GROUP", "KIND", "TAGS"
    );

    for profile in &profiles {
        let marker = if profile.starred { "*" } else { " " };
        let group = profile
            .group_id
            .as_deref()
            .and_then(|id| groups.iter().find(|g| g.id == id))
            .map(|g| g.name.as_str())
            .unwrap_or("-");
        println!(
            "{} {:<20} {:<8} {:<10} {:<10} {:<12} {:<10} {}",
            marker,
            profile.name,
            profile.short_id(),
            profile.status.to_string(),
            profile.engine.to_string(),
            group,
            profile.kind.to_string(),
            profile.tags.join(",")
        );
    }

    println!();
    println!("{} profile(s)", profiles.len());
    Ok(())
}

/// Show one profile in detail.
pub async fn info(identifier: &str, json: bool) -> Result<()> {
    let manager = super::lifecycle()?;
    let record = manager.resolve(identifier).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("{}", style(&record.name).bold());
    println!("  Id:          {}", record.id);
    if let Some(label) = &record.label {
        println!("  Label:       {label}");
    }
    println!("  Status:      {}", record.status);
    println!("  Engine:      {}", record.engine);
    println!("  Kind:        {}", record.kind);
    println!("  Path:        {}", record.path.display());
    match record.status {
        ProfileStatus::Active => {
            let size = fsutil::dir_size(&record.path).unwrap_or(0);
            println!("  Size:        {}", fsutil::format_size(size));
        }
        ProfileStatus::Frozen => {
            if let Some(archive) = &record.archive_path {
                println!("  Archive:     {}", archive.display());
            }
        }
    }
    if !record.tags.is_empty() {
        println!("  Tags:        {}", record.tags.join(", "));
    }
    if !record.extensions.is_empty() {
        println!("  Extensions:  {}", record.extensions.join(", "));
    }
    if let Some(group_id) = &record.group_id {
        let groups = manager.list_groups().await?;
        let name = groups
            .iter()
            .find(|g| &g.id == group_id)
            .map(|g| g.name.as_str())
            .unwrap_or(group_id.as_str());
        println!("  Group:       {name}");
    }
    if let Some(proxy) = &record.proxy {
        println!("  Proxy:       {}", proxy.server);
    }
    if let Some(url) = &record.start_url {
        println!("  Start URL:   {url}");
    }
    if let Some(args) = &record.custom_args {
        println!("  Args:        {args}");
    }
    println!(
        "  Fingerprint: {}",
        if record.fingerprint_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("  Platform:    {}", record.platform);
    println!("  Created:     {}", record.created_at.format("%Y-%m-%d %H:%M"));
    println!("  Updated:     {}", record.updated_at.format("%Y-%m-%d %H:%M"));
    if let Some(last_used) = &record.last_used {
        println!(
            "  Last used:   {} ({} launch(es))",
            last_used.format("%Y-%m-%d %H:%M"),
            record.use_count
        );
    }
    Ok(())
}
