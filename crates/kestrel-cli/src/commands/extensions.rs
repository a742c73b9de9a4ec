//! Extension management commands.

use anyhow::Result;
use kestrel_core::extensions::PROFILE_EXTENSIONS_DIR;
use kestrel_core::record::ProfileStatus;

pub async fn show(identifier: &str) -> Result<()> {
    let manager = super::lifecycle()?;
    let record = manager.resolve(identifier).await?;

    if record.extensions.is_empty() {
        println!("Profile '{}' uses no extensions.", record.name);
        return Ok(());
    }

    let staging = record.path.join(PROFILE_EXTENSIONS_DIR);
    println!("Extensions for '{}':", record.name);
    for name in &record.extensions {
        if record.status == ProfileStatus::Active && !staging.join(name).is_dir() {
            println!("  {name} (not staged)");
        } else {
            println!("  {name}");
        }
    }
    Ok(())
}

pub async fn set(identifier: &str, names: &[String]) -> Result<()> {
    let manager = super::lifecycle()?;
    let record = manager.resolve(identifier).await?;
    let updated = manager.set_extensions(&record.id, names).await?;
    println!(
        "✅ '{}' now lists {} extension(s): {}",
        updated.name,
        updated.extensions.len(),
        updated.extensions.join(", ")
    );
    println!("   Stage them with: kestrel extensions sync {}", updated.name);
    Ok(())
}

pub async fn clear(identifier: &str) -> Result<()> {
    let manager = super::lifecycle()?;
    let record = manager.resolve(identifier).await?;
    let updated = manager.set_extensions(&record.id, &[]).await?;

    let staging = record.path.join(PROFILE_EXTENSIONS_DIR);
    if staging.is_dir() {
        tokio::fs::remove_dir_all(&staging).await?;
    }
    println!("✅ Cleared extensions for '{}'", updated.name);
    Ok(())
}

pub async fn sync(identifier: &str) -> Result<()> {
    let manager = super::lifecycle()?;
    let record = manager.resolve(identifier).await?;
    let staged = manager.sync_extensions(&record.id).await?;

    if staged.is_empty() {
        println!("Profile '{}' lists no extensions; nothing to stage.", record.name);
        return Ok(());
    }
    println!("✅ Staged {} extension(s) into '{}'", staged.len(), record.name);
    for path in &staged {
        println!("   {}", path.display());
    }
    Ok(())
}
