use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fsutil;

/// Manifest file that marks a directory as an unpacked extension.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Staging directory inside each profile that extensions are copied into.
pub const PROFILE_EXTENSIONS_DIR: &str = "extensions";

pub struct ExtensionResolver;

impl ExtensionResolver {
    /// Lists unpacked extensions under `dir`: immediate subdirectories that
    /// contain a manifest file, sorted by name. A missing directory
    /// resolves to no extensions.
    pub fn resolve_unpacked(dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut found = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() && path.join(MANIFEST_FILE).is_file() {
                found.push(path);
            }
        }
        found.sort();
        Ok(found)
    }

    /// Copies every named extension from `shared_root` into the profile's
    /// staging directory, replacing whatever was staged before. All names
    /// are validated before the staging directory is cleared, so a missing
    /// extension leaves the profile untouched.
    pub fn sync_to_profile(
        profile_dir: &Path,
        names: &[String],
        shared_root: &Path,
    ) -> Result<Vec<PathBuf>> {
        let mut sources = Vec::new();
        for name in names {
            let source = shared_root.join(name);
            let target_name = source
                .file_name()
                .map(|n| n.to_os_string())
                .ok_or_else(|| Error::InvalidState(format!("invalid extension name '{name}'")))?;
            if !source.exists() {
                return Err(Error::MissingDependency(format!(
                    "extension '{name}' not found under {}",
                    shared_root.display()
                )));
            }
            sources.push((source, target_name));
        }

        let staging = profile_dir.join(PROFILE_EXTENSIONS_DIR);
        fsutil::clear_dir(&staging)?;
        let mut staged = Vec::new();
        for (source, target_name) in sources {
            let target = staging.join(&target_name);
            let meta = fs::metadata(&source)?;
            if meta.is_dir() {
                fsutil::copy_dir_recursive(&source, &target)?;
            } else {
                fs::copy(&source, &target)?;
            }
            staged.push(target);
        }
        tracing::debug!(
            "Staged {} extension(s) into {}",
            staged.len(),
            staging.display()
        );
        Ok(staged)
    }
}
