use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::Error;
use crate::fingerprint::Fingerprint;

pub const DEFAULT_GROUP_COLOR: &str = "blue";

/// Lifecycle status of a managed profile.
///
/// `Active` means the profile is backed by a live directory on disk,
/// `Frozen` means it is backed by a compressed archive instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    Active,
    Frozen,
}

/// Descriptive usage class for a profile. Has no behavioral effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileKind {
    Register,
    LongTerm,
    Temp,
    #[default]
    Other,
}

/// Browser engine variant a profile is launched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Chromium,
    Firefox,
}

/// Per-profile proxy configuration, forwarded to the engine at launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxySettings {
    pub server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass: Option<String>,
}

/// A managed browser identity profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Absolute path of the live profile directory. Retained while frozen
    /// so a thaw can restore to the same location.
    pub path: PathBuf,
    pub status: ProfileStatus,
    #[serde(default)]
    pub kind: ProfileKind,
    #[serde(default)]
    pub engine: EngineKind,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Names of shared extensions to stage into the profile directory.
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default)]
    pub starred: bool,
    #[serde(default = "default_true")]
    pub fingerprint_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Fingerprint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxySettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_args: Option<String>,
    /// Set while frozen; points at the archive backing the profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_path: Option<PathBuf>,
    #[serde(default = "current_platform")]
    pub platform: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(default)]
    pub use_count: u64,
}

impl ProfileRecord {
    /// Bumps `updated_at` without ever moving it backwards.
    pub fn touch(&mut self) {
        let now = Utc::now();
        if now > self.updated_at {
            self.updated_at = now;
        }
    }

    /// Applied once when records are loaded from the store: optional
    /// collections are trimmed and de-duplicated in place.
    pub fn normalize(&mut self) {
        self.tags = normalize_string_list(&self.tags);
        self.extensions = normalize_string_list(&self.extensions);
    }

    pub fn is_frozen(&self) -> bool {
        self.status == ProfileStatus::Frozen
    }

    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(8)]
    }
}

/// Named grouping for profiles. Group names are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    pub id: String,
    pub name: String,
    #[serde(default = "default_group_color")]
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Partial update applied to a profile record in a single store write.
/// `Some` fields replace the current value; `clear_*` flags null out the
/// corresponding optional field.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub label: Option<String>,
    pub kind: Option<ProfileKind>,
    pub engine: Option<EngineKind>,
    pub group_id: Option<String>,
    pub starred: Option<bool>,
    pub fingerprint_enabled: Option<bool>,
    pub proxy: Option<ProxySettings>,
    pub start_url: Option<String>,
    pub custom_args: Option<String>,
    pub clear_label: bool,
    pub clear_group: bool,
    pub clear_proxy: bool,
    pub clear_start_url: bool,
    pub clear_custom_args: bool,
}

/// Derives the on-disk directory name for a new profile: a slug of the
/// display name plus a short id suffix for uniqueness.
pub fn directory_name(name: &str, id: &str) -> String {
    format!("{}-{}", slugify(name), &id[..id.len().min(6)])
}

/// Lowercases and reduces a display name to `[a-z0-9_-]`, collapsing every
/// run of other characters into a single dash. Falls back to `"profile"`
/// when nothing survives.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for ch in value.chars().flat_map(|c| c.to_lowercase()) {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            slug.push(ch);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        "profile".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Trims entries, drops empties, and removes duplicates while keeping
/// first-seen order.
pub fn normalize_string_list(values: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for value in values {
        let trimmed = value.trim();
        if !trimmed.is_empty() && !seen.iter().any(|s| s == trimmed) {
            seen.push(trimmed.to_string());
        }
    }
    seen
}

pub fn current_platform() -> String {
    std::env::consts::OS.to_string()
}

fn default_true() -> bool {
    true
}

fn default_group_color() -> String {
    DEFAULT_GROUP_COLOR.to_string()
}

impl fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileStatus::Active => write!(f, "active"),
            ProfileStatus::Frozen => write!(f, "frozen"),
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Register => write!(f, "register"),
            ProfileKind::LongTerm => write!(f, "long-term"),
            ProfileKind::Temp => write!(f, "temp"),
            ProfileKind::Other => write!(f, "other"),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Chromium => write!(f, "chromium"),
            EngineKind::Firefox => write!(f, "firefox"),
        }
    }
}

impl FromStr for ProfileKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "register" => Ok(ProfileKind::Register),
            "long-term" => Ok(ProfileKind::LongTerm),
            "temp" => Ok(ProfileKind::Temp),
            "other" => Ok(ProfileKind::Other),
            other => Err(Error::InvalidState(format!(
                "unknown profile kind '{other}' (expected register, long-term, temp or other)"
            ))),
        }
    }
}

impl FromStr for EngineKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chromium" => Ok(EngineKind::Chromium),
            "firefox" => Ok(EngineKind::Firefox),
            other => Err(Error::InvalidState(format!(
                "unknown engine '{other}' (expected chromium or firefox)"
            ))),
        }
    }
}

// Stored kind values from older files may be arbitrary strings; anything
// unrecognized maps to the default kind instead of failing the whole load.
impl<'de> Deserialize<'de> for ProfileKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_default())
    }
}
