//! Group management commands.

use anyhow::{Result, anyhow};

pub async fn list() -> Result<()> {
    let manager = super::lifecycle()?;
    let groups = manager.list_groups().await?;
    if groups.is_empty() {
        println!("No groups yet. Create one with: kestrel group create <name>");
        return Ok(());
    }

    let profiles = manager.list().await?;
    println!("  {:<20} {:<10} {:<8} {}", "NAME", "COLOR", "MEMBERS", "ID");
    for group in &groups {
        let members = profiles
            .iter()
            .filter(|p| p.group_id.as_deref() == Some(group.id.as_str()))
            .count();
        println!(
            "  {:<20} {:<10} {:<8} {}",
            group.name, group.color, members, group.id
        );
    }
    Ok(())
}

pub async fn create(name: &str, color: Option<String>) -> Result<()> {
    let manager = super::lifecycle()?;
    let group = manager.create_group(name, color).await?;
    println!("✅ Created group '{}' ({})", group.name, group.id);
    Ok(())
}

pub async fn remove(identifier: &str) -> Result<()> {
    let manager = super::lifecycle()?;
    let groups = manager.list_groups().await?;
    let group = groups
        .iter()
        .find(|g| g.id == identifier || g.name == identifier)
        .ok_or_else(|| anyhow!("group '{identifier}' not found"))?;

    let detached = manager.remove_group(&group.id).await?;
    println!("✅ Removed group '{}' ({} profile(s) detached)", group.name, detached);
    Ok(())
}
