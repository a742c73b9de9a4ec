use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::record::{GroupRecord, ProfileRecord};

pub const STORE_VERSION: u32 = 1;

/// On-disk shape of the profile store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub profiles: Vec<ProfileRecord>,
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
}

impl Default for StoreFile {
    fn default() -> Self {
        StoreFile {
            version: STORE_VERSION,
            profiles: Vec::new(),
            groups: Vec::new(),
        }
    }
}

fn default_version() -> u32 {
    STORE_VERSION
}

/// Single-file JSON store for profile and group records.
///
/// Every mutation is a full read-modify-write of the file. Concurrent
/// writers from separate processes can lose updates; that is accepted for
/// a single-user tool.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole store. A missing file is an empty store; records are
    /// normalized here so callers never see untrimmed collections.
    pub async fn load(&self) -> Result<StoreFile> {
        let mut file = match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice::<StoreFile>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreFile::default(),
            Err(e) => return Err(e.into()),
        };
        for record in &mut file.profiles {
            record.normalize();
        }
        tracing::debug!(
            "Loaded {} profiles and {} groups from {}",
            file.profiles.len(),
            file.groups.len(),
            self.path.display()
        );
        Ok(file)
    }

    pub async fn save(&self, file: &StoreFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(file)?;
        tokio::fs::write(&self.path, &json).await?;
        tracing::debug!(
            "Wrote {} profiles to {}",
            file.profiles.len(),
            self.path.display()
        );
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<ProfileRecord>> {
        Ok(self.load().await?.profiles)
    }

    pub async fn get(&self, id: &str) -> Result<ProfileRecord> {
        self.load()
            .await?
            .profiles
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("profile {id}")))
    }

    /// Inserts the record, or replaces the existing record with the same id.
    pub async fn upsert(&self, record: ProfileRecord) -> Result<()> {
        let mut file = self.load().await?;
        match file.profiles.iter_mut().find(|p| p.id == record.id) {
            Some(slot) => *slot = record,
            None => file.profiles.push(record),
        }
        self.save(&file).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut file = self.load().await?;
        let before = file.profiles.len();
        file.profiles.retain(|p| p.id != id);
        if file.profiles.len() == before {
            return Err(Error::NotFound(format!("profile {id}")));
        }
        self.save(&file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{EngineKind, ProfileKind, ProfileStatus, current_platform};
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(id: &str, name: &str) -> ProfileRecord {
        let now = Utc::now();
        ProfileRecord {
            id: id.to_string(),
            name: name.to_string(),
            label: None,
            path: PathBuf::from(format!("/tmp/{name}")),
            status: ProfileStatus::Active,
            kind: ProfileKind::Other,
            engine: EngineKind::Chromium,
            tags: Vec::new(),
            extensions: Vec::new(),
            group_id: None,
            starred: false,
            fingerprint_enabled: true,
            fingerprint: None,
            proxy: None,
            start_url: None,
            custom_args: None,
            archive_path: None,
            platform: current_platform(),
            created_at: now,
            updated_at: now,
            last_used: None,
            use_count: 0,
        }
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("profiles.json"));
        let file = store.load().await.unwrap();
        assert_eq!(file.version, STORE_VERSION);
        assert!(file.profiles.is_empty());
        assert!(file.groups.is_empty());
    }

    #[tokio::test]
    async fn upsert_inserts_then_replaces() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("profiles.json"));

        store.upsert(record("a", "first")).await.unwrap();
        let mut updated = record("a", "first");
        updated.name = "renamed".to_string();
        store.upsert(updated).await.unwrap();
        store.upsert(record("b", "second")).await.unwrap();

        let profiles = store.list().await.unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(store.get("a").await.unwrap().name, "renamed");
    }

    #[tokio::test]
    async fn delete_removes_and_reports_missing() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("profiles.json"));
        store.upsert(record("a", "first")).await.unwrap();

        store.delete("a").await.unwrap();
        let err = store.delete("a").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn load_normalizes_stored_collections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.json");
        let mut raw = record("a", "first");
        raw.tags = vec![" work ".to_string(), "work".to_string(), "".to_string()];
        let file = StoreFile {
            profiles: vec![raw],
            ..StoreFile::default()
        };
        std::fs::write(&path, serde_json::to_vec(&file).unwrap()).unwrap();

        let store = JsonStore::new(&path);
        let loaded = store.get("a").await.unwrap();
        assert_eq!(loaded.tags, vec!["work"]);
    }

    #[tokio::test]
    async fn corrupt_store_surfaces_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.json");
        std::fs::write(&path, b"]oops").unwrap();
        let store = JsonStore::new(&path);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[tokio::test]
    async fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("nested/data/profiles.json"));
        store.save(&StoreFile::default()).await.unwrap();
        assert!(dir.path().join("nested/data/profiles.json").is_file());
    }
}
