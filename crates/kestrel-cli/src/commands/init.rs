use anyhow::Result;

/// Create the directory layout and an empty store.
pub async fn execute() -> Result<()> {
    let manager = super::lifecycle()?;
    manager.init().await?;

    let paths = manager.paths();
    println!("✅ Initialized kestrel home at {}", paths.home.display());
    println!("   Profiles: {}", paths.profiles_dir.display());
    println!("   Frozen:   {}", paths.frozen_dir.display());
    println!("   Store:    {}", paths.store_path.display());
    Ok(())
}
