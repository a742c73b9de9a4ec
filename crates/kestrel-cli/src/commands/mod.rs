pub mod archive;
pub mod config;
pub mod extensions;
pub mod fingerprint;
pub mod group;
pub mod init;
pub mod launch;
pub mod list;
pub mod profile;

use anyhow::Result;
use kestrel_core::{Paths, ProfileLifecycleManager};

/// Builds the lifecycle manager from the ambient environment.
pub(crate) fn lifecycle() -> Result<ProfileLifecycleManager> {
    Ok(ProfileLifecycleManager::with_default_codec(Paths::resolve()?))
}
