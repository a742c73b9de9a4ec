//! Fingerprint inspection commands.

use anyhow::Result;

pub async fn show(identifier: &str) -> Result<()> {
    let manager = super::lifecycle()?;
    let record = manager.resolve(identifier).await?;

    if !record.fingerprint_enabled {
        println!("Fingerprint spoofing is disabled for '{}'.", record.name);
    }
    match &record.fingerprint {
        Some(fingerprint) => println!("{}", serde_json::to_string_pretty(fingerprint)?),
        None => println!(
            "Profile '{}' has no stored fingerprint. Run: kestrel fingerprint regenerate {}",
            record.name, record.name
        ),
    }
    Ok(())
}

pub async fn regenerate(identifier: &str) -> Result<()> {
    let manager = super::lifecycle()?;
    let record = manager.resolve(identifier).await?;
    let updated = manager.regenerate_fingerprint(&record.id).await?;

    println!("✅ New fingerprint for '{}'", updated.name);
    if let Some(fp) = &updated.fingerprint {
        println!("   User agent: {}", fp.user_agent);
        println!("   Timezone:   {}", fp.timezone);
        println!("   Locale:     {}", fp.language);
        println!("   Screen:     {}x{} @{}x", fp.screen_width, fp.screen_height, fp.device_pixel_ratio);
    }
    Ok(())
}
