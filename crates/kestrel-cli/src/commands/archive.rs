//! Freeze, thaw and export commands.

use anyhow::Result;
use kestrel_core::fsutil;
use kestrel_core::record::ProfileStatus;
use std::path::Path;

pub async fn freeze(identifier: &str) -> Result<()> {
    let manager = super::lifecycle()?;
    let record = manager.resolve(identifier).await?;
    if record.status == ProfileStatus::Frozen {
        println!("Profile '{}' is already frozen.", record.name);
        return Ok(());
    }

    println!("❄️  Freezing '{}'...", record.name);
    let frozen = manager.freeze(&record.id).await?;

    if let Some(archive) = &frozen.archive_path {
        let size = tokio::fs::metadata(archive)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        println!("✅ Frozen into {}", archive.display());
        println!("   {}", fsutil::format_size(size));
    } else {
        println!("✅ Frozen '{}'", frozen.name);
    }
    Ok(())
}

pub async fn thaw(identifier: &str) -> Result<()> {
    let manager = super::lifecycle()?;
    let record = manager.resolve(identifier).await?;
    if record.status == ProfileStatus::Active {
        println!("Profile '{}' is already active.", record.name);
        return Ok(());
    }

    println!("🔥 Thawing '{}'...", record.name);
    let thawed = manager.thaw(&record.id).await?;
    println!("✅ Restored to {}", thawed.path.display());
    Ok(())
}

pub async fn export(identifier: &str, dest: &Path) -> Result<()> {
    let manager = super::lifecycle()?;
    let record = manager.resolve(identifier).await?;

    // A directory destination gets a default file name inside it.
    let dest = if dest.is_dir() {
        dest.join(format!(
            "{}.{}",
            record.name,
            kestrel_core::archive::ARCHIVE_EXTENSION
        ))
    } else {
        dest.to_path_buf()
    };

    let written = manager.export(&record.id, &dest).await?;
    let size = tokio::fs::metadata(&written)
        .await
        .map(|m| m.len())
        .unwrap_or(0);
    println!("✅ Exported '{}' to {}", record.name, written.display());
    println!("   {}", fsutil::format_size(size));
    Ok(())
}
