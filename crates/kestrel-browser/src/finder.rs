use kestrel_core::EngineKind;
use kestrel_core::config::ENGINE_PATH_ENV;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Locates the browser binary for an engine variant.
pub struct EngineFinder {
    kind: EngineKind,
    custom_path: Option<PathBuf>,
}

impl EngineFinder {
    pub fn new(kind: EngineKind, custom_path: Option<PathBuf>) -> Self {
        Self { kind, custom_path }
    }

    /// Finds the engine binary. The environment override wins, then the
    /// configured path, then platform defaults, then `$PATH`.
    pub fn find(&self) -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(ENGINE_PATH_ENV).filter(|v| !v.is_empty()) {
            return self.validate(Path::new(&path));
        }

        if let Some(path) = &self.custom_path {
            return self.validate(path);
        }

        for path in self.default_paths() {
            if let Ok(valid_path) = self.validate(&path) {
                return Ok(valid_path);
            }
        }

        for name in self.binary_names() {
            if let Ok(found) = which::which(name) {
                return Ok(found);
            }
        }

        Err(Error::Core(kestrel_core::Error::MissingDependency(format!(
            "{} not found. Checked: {}. Configure a binary with `config set --engine-path` or {ENGINE_PATH_ENV}.",
            self.kind,
            self.default_paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))))
    }

    /// Platform-specific default install locations.
    fn default_paths(&self) -> Vec<PathBuf> {
        #[cfg(target_os = "macos")]
        return match self.kind {
            EngineKind::Chromium => vec![
                PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
                PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
            ],
            EngineKind::Firefox => vec![PathBuf::from(
                "/Applications/Firefox.app/Contents/MacOS/firefox",
            )],
        };

        #[cfg(target_os = "linux")]
        return match self.kind {
            EngineKind::Chromium => vec![
                PathBuf::from("/usr/bin/google-chrome"),
                PathBuf::from("/usr/bin/chromium"),
                PathBuf::from("/usr/bin/chromium-browser"),
            ],
            EngineKind::Firefox => vec![
                PathBuf::from("/usr/bin/firefox"),
                PathBuf::from("/usr/lib/firefox/firefox"),
                PathBuf::from("/snap/bin/firefox"),
            ],
        };

        #[cfg(target_os = "windows")]
        return match self.kind {
            EngineKind::Chromium => vec![
                PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
                PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
            ],
            EngineKind::Firefox => vec![
                PathBuf::from(r"C:\Program Files\Mozilla Firefox\firefox.exe"),
                PathBuf::from(r"C:\Program Files (x86)\Mozilla Firefox\firefox.exe"),
            ],
        };

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        return vec![];
    }

    /// Names probed on `$PATH` as a last resort.
    fn binary_names(&self) -> &'static [&'static str] {
        match self.kind {
            EngineKind::Chromium => &["google-chrome", "chromium", "chromium-browser", "chrome"],
            EngineKind::Firefox => &["firefox"],
        }
    }

    /// Validate that a path exists and is executable.
    fn validate(&self, path: &Path) -> Result<PathBuf> {
        if !path.exists() {
            return Err(Error::Core(kestrel_core::Error::MissingDependency(
                format!("{} not found at: {}", self.kind, path.display()),
            )));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            if metadata.permissions().mode() & 0o111 == 0 {
                return Err(Error::Core(kestrel_core::Error::MissingDependency(
                    format!("engine binary not executable: {}", path.display()),
                )));
            }
        }

        Ok(path.to_path_buf())
    }
}
