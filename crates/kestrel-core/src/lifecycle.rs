use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::archive::{ARCHIVE_EXTENSION, ArchiveCodec, TarGzCodec};
use crate::config::{self, AppConfig, Paths};
use crate::error::{Error, Result};
use crate::extensions::ExtensionResolver;
use crate::fingerprint::Fingerprint;
use crate::fsutil;
use crate::record::{
    self, EngineKind, GroupRecord, ProfileKind, ProfileRecord, ProfileStatus, ProfileUpdate,
    ProxySettings, normalize_string_list,
};
use crate::store::{JsonStore, StoreFile};

/// Options for creating a new profile.
#[derive(Debug, Clone)]
pub struct CreateProfile {
    pub name: String,
    pub label: Option<String>,
    pub tags: Vec<String>,
    pub extensions: Vec<String>,
    /// Seed the new directory from this profile's directory.
    pub copy_from_profile: Option<String>,
    /// Seed the new directory from an arbitrary template directory.
    pub copy_from_path: Option<PathBuf>,
    pub engine: EngineKind,
    pub kind: ProfileKind,
    pub fingerprint_enabled: bool,
    pub proxy: Option<ProxySettings>,
    pub start_url: Option<String>,
    pub custom_args: Option<String>,
    pub group_id: Option<String>,
}

impl Default for CreateProfile {
    fn default() -> Self {
        CreateProfile {
            name: String::new(),
            label: None,
            tags: Vec::new(),
            extensions: Vec::new(),
            copy_from_profile: None,
            copy_from_path: None,
            engine: EngineKind::default(),
            kind: ProfileKind::default(),
            fingerprint_enabled: true,
            proxy: None,
            start_url: None,
            custom_args: None,
            group_id: None,
        }
    }
}

/// Options for registering an existing directory as a profile.
#[derive(Debug, Clone)]
pub struct ImportProfile {
    pub name: String,
    pub source: PathBuf,
    /// Copy the directory under management instead of referencing it
    /// in place.
    pub copy: bool,
    pub label: Option<String>,
    pub tags: Vec<String>,
    pub engine: EngineKind,
    pub kind: ProfileKind,
    pub fingerprint_enabled: bool,
}

impl Default for ImportProfile {
    fn default() -> Self {
        ImportProfile {
            name: String::new(),
            source: PathBuf::new(),
            copy: false,
            label: None,
            tags: Vec::new(),
            engine: EngineKind::default(),
            kind: ProfileKind::default(),
            fingerprint_enabled: true,
        }
    }
}

/// Options for cloning an existing profile.
#[derive(Debug, Clone, Default)]
pub struct CloneProfile {
    pub name: String,
    pub label: Option<String>,
    /// Tags for the clone; when empty the source profile's tags are kept.
    pub tags: Vec<String>,
}

/// Per-profile result of a batch removal.
#[derive(Debug)]
pub struct RemoveOutcome {
    pub id: String,
    pub error: Option<String>,
}

impl RemoveOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Owns every state transition of the profile registry: creation, import,
/// cloning, freezing, thawing, removal, metadata edits and extension
/// staging. All filesystem changes happen before the store is updated, so
/// a failed operation leaves the record describing the last completed
/// state.
pub struct ProfileLifecycleManager {
    paths: Paths,
    store: JsonStore,
    codec: Arc<dyn ArchiveCodec>,
}

impl ProfileLifecycleManager {
    pub fn new(paths: Paths, codec: Arc<dyn ArchiveCodec>) -> Self {
        let store = JsonStore::new(paths.store_path.clone());
        ProfileLifecycleManager {
            paths,
            store,
            codec,
        }
    }

    pub fn with_default_codec(paths: Paths) -> Self {
        Self::new(paths, Arc::new(TarGzCodec))
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    /// Creates the directory scaffolding and materializes an empty store.
    pub async fn init(&self) -> Result<()> {
        self.paths.ensure_scaffolding()?;
        let file = self.store.load().await?;
        self.store.save(&file).await?;
        Ok(())
    }

    pub async fn config(&self) -> Result<AppConfig> {
        config::load_config(&self.paths).await
    }

    pub async fn create(&self, options: CreateProfile) -> Result<ProfileRecord> {
        let name = options.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidState("profile name must not be empty".into()));
        }
        self.paths.ensure_scaffolding()?;

        let file = self.store.load().await?;
        ensure_name_free(&file, &name, None)?;
        if let Some(group_id) = &options.group_id {
            ensure_group_exists(&file, group_id)?;
        }

        let id = Uuid::new_v4().to_string();
        let dir = self
            .paths
            .profiles_dir
            .join(record::directory_name(&name, &id));

        let template = match (&options.copy_from_profile, &options.copy_from_path) {
            (Some(source_id), _) => {
                let source = find_profile(&file, source_id)?;
                if source.is_frozen() {
                    return Err(Error::InvalidState(format!(
                        "cannot copy from frozen profile '{}'; thaw it first",
                        source.name
                    )));
                }
                if !source.path.is_dir() {
                    return Err(Error::MissingDependency(format!(
                        "source profile directory missing: {}",
                        source.path.display()
                    )));
                }
                Some(source.path.clone())
            }
            (None, Some(path)) => {
                let absolute = std::path::absolute(path)?;
                if !absolute.is_dir() {
                    return Err(Error::MissingDependency(format!(
                        "template directory missing: {}",
                        absolute.display()
                    )));
                }
                Some(absolute)
            }
            (None, None) => None,
        };

        match template {
            Some(source) => {
                let dst = dir.clone();
                run_blocking(move || {
                    fsutil::copy_dir_recursive(&source, &dst).map_err(Error::from)
                })
                .await?;
            }
            None => tokio::fs::create_dir_all(&dir).await?,
        }

        let now = Utc::now();
        let record = ProfileRecord {
            id,
            name,
            label: options.label,
            path: dir,
            status: ProfileStatus::Active,
            kind: options.kind,
            engine: options.engine,
            tags: normalize_string_list(&options.tags),
            extensions: normalize_string_list(&options.extensions),
            group_id: options.group_id,
            starred: false,
            fingerprint_enabled: options.fingerprint_enabled,
            fingerprint: options.fingerprint_enabled.then(Fingerprint::generate),
            proxy: options.proxy,
            start_url: options.start_url,
            custom_args: options.custom_args,
            archive_path: None,
            platform: record::current_platform(),
            created_at: now,
            updated_at: now,
            last_used: None,
            use_count: 0,
        };
        self.store.upsert(record.clone()).await?;
        tracing::info!("Created profile '{}' ({})", record.name, record.short_id());
        Ok(record)
    }

    pub async fn import(&self, options: ImportProfile) -> Result<ProfileRecord> {
        let name = options.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidState("profile name must not be empty".into()));
        }
        let source = std::path::absolute(&options.source)?;
        if !source.is_dir() {
            return Err(Error::MissingDependency(format!(
                "directory to import does not exist: {}",
                source.display()
            )));
        }

        let file = self.store.load().await?;
        ensure_name_free(&file, &name, None)?;

        let id = Uuid::new_v4().to_string();
        let path = if options.copy {
            self.paths.ensure_scaffolding()?;
            let dir = self
                .paths
                .profiles_dir
                .join(record::directory_name(&name, &id));
            let src = source.clone();
            let dst = dir.clone();
            run_blocking(move || fsutil::copy_dir_recursive(&src, &dst).map_err(Error::from))
                .await?;
            dir
        } else {
            source
        };

        if let Some(owner) = file.profiles.iter().find(|p| p.path == path) {
            return Err(Error::AlreadyExists(format!(
                "directory already managed by profile '{}'",
                owner.name
            )));
        }

        let now = Utc::now();
        let record = ProfileRecord {
            id,
            name,
            label: options.label,
            path,
            status: ProfileStatus::Active,
            kind: options.kind,
            engine: options.engine,
            tags: normalize_string_list(&options.tags),
            extensions: Vec::new(),
            group_id: None,
            starred: false,
            fingerprint_enabled: options.fingerprint_enabled,
            fingerprint: options.fingerprint_enabled.then(Fingerprint::generate),
            proxy: None,
            start_url: None,
            custom_args: None,
            archive_path: None,
            platform: record::current_platform(),
            created_at: now,
            updated_at: now,
            last_used: None,
            use_count: 0,
        };
        self.store.upsert(record.clone()).await?;
        tracing::info!(
            "Imported profile '{}' from {}",
            record.name,
            record.path.display()
        );
        Ok(record)
    }

    /// Creates a new profile seeded from `source_id`'s directory. Engine,
    /// kind, extensions, proxy and launch settings carry over; the
    /// fingerprint is drawn fresh so the clone presents its own identity.
    pub async fn clone_profile(
        &self,
        source_id: &str,
        options: CloneProfile,
    ) -> Result<ProfileRecord> {
        let source = self.store.get(source_id).await?;
        let tags = if options.tags.is_empty() {
            source.tags.clone()
        } else {
            options.tags
        };
        self.create(CreateProfile {
            name: options.name,
            label: options.label,
            tags,
            extensions: source.extensions.clone(),
            copy_from_profile: Some(source.id.clone()),
            copy_from_path: None,
            engine: source.engine,
            kind: source.kind,
            fingerprint_enabled: source.fingerprint_enabled,
            proxy: source.proxy.clone(),
            start_url: source.start_url.clone(),
            custom_args: source.custom_args.clone(),
            group_id: source.group_id.clone(),
        })
        .await
    }

    pub async fn get(&self, id: &str) -> Result<ProfileRecord> {
        self.store.get(id).await
    }

    /// Looks a profile up by exact id, exact name, or unique id prefix.
    pub async fn resolve(&self, identifier: &str) -> Result<ProfileRecord> {
        if identifier.is_empty() {
            return Err(Error::NotFound("profile <empty>".into()));
        }
        let profiles = self.store.list().await?;
        if let Some(found) = profiles.iter().find(|p| p.id == identifier) {
            return Ok(found.clone());
        }
        if let Some(found) = profiles.iter().find(|p| p.name == identifier) {
            return Ok(found.clone());
        }
        let mut by_prefix = profiles.iter().filter(|p| p.id.starts_with(identifier));
        match (by_prefix.next(), by_prefix.next()) {
            (Some(found), None) => Ok(found.clone()),
            (Some(_), Some(_)) => Err(Error::InvalidState(format!(
                "identifier '{identifier}' matches more than one profile"
            ))),
            _ => Err(Error::NotFound(format!("profile {identifier}"))),
        }
    }

    /// All profiles, starred first, then by name.
    pub async fn list(&self) -> Result<Vec<ProfileRecord>> {
        let mut profiles = self.store.list().await?;
        profiles.sort_by(|a, b| b.starred.cmp(&a.starred).then_with(|| a.name.cmp(&b.name)));
        Ok(profiles)
    }

    /// Changes the display name. The directory on disk keeps its original
    /// slug; only the record is updated.
    pub async fn rename(&self, id: &str, new_name: &str) -> Result<ProfileRecord> {
        let name = new_name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidState("profile name must not be empty".into()));
        }
        let mut file = self.store.load().await?;
        ensure_name_free(&file, &name, Some(id))?;
        let record = find_profile_mut(&mut file, id)?;
        let old = record.name.clone();
        record.name = name;
        record.touch();
        let updated = record.clone();
        self.store.save(&file).await?;
        tracing::info!("Renamed profile '{}' to '{}'", old, updated.name);
        Ok(updated)
    }

    pub async fn tag(&self, id: &str, add: &[String], remove: &[String]) -> Result<ProfileRecord> {
        self.mutate(id, |record| {
            let mut tags = record.tags.clone();
            tags.extend(add.iter().cloned());
            let mut tags = normalize_string_list(&tags);
            tags.retain(|tag| !remove.iter().any(|r| r.trim() == tag));
            record.tags = tags;
            Ok(())
        })
        .await
    }

    pub async fn set_kind(&self, id: &str, kind: ProfileKind) -> Result<ProfileRecord> {
        self.mutate(id, |record| {
            record.kind = kind;
            Ok(())
        })
        .await
    }

    pub async fn set_starred(&self, id: &str, starred: bool) -> Result<ProfileRecord> {
        self.mutate(id, |record| {
            record.starred = starred;
            Ok(())
        })
        .await
    }

    /// Replaces the profile's extension list. Names are only validated
    /// against the shared root when extensions are synced.
    pub async fn set_extensions(&self, id: &str, names: &[String]) -> Result<ProfileRecord> {
        self.mutate(id, |record| {
            record.extensions = normalize_string_list(names);
            Ok(())
        })
        .await
    }

    pub async fn update(&self, id: &str, update: ProfileUpdate) -> Result<ProfileRecord> {
        let mut file = self.store.load().await?;
        if let Some(group_id) = &update.group_id {
            ensure_group_exists(&file, group_id)?;
        }
        let record = find_profile_mut(&mut file, id)?;
        if let Some(label) = update.label {
            record.label = Some(label);
        }
        if update.clear_label {
            record.label = None;
        }
        if let Some(kind) = update.kind {
            record.kind = kind;
        }
        if let Some(engine) = update.engine {
            record.engine = engine;
        }
        if let Some(group_id) = update.group_id {
            record.group_id = Some(group_id);
        }
        if update.clear_group {
            record.group_id = None;
        }
        if let Some(starred) = update.starred {
            record.starred = starred;
        }
        if let Some(enabled) = update.fingerprint_enabled {
            record.fingerprint_enabled = enabled;
            if enabled && record.fingerprint.is_none() {
                record.fingerprint = Some(Fingerprint::generate());
            }
        }
        if let Some(proxy) = update.proxy {
            record.proxy = Some(proxy);
        }
        if update.clear_proxy {
            record.proxy = None;
        }
        if let Some(url) = update.start_url {
            record.start_url = Some(url);
        }
        if update.clear_start_url {
            record.start_url = None;
        }
        if let Some(args) = update.custom_args {
            record.custom_args = Some(args);
        }
        if update.clear_custom_args {
            record.custom_args = None;
        }
        record.touch();
        let updated = record.clone();
        self.store.save(&file).await?;
        Ok(updated)
    }

    /// Draws a fresh fingerprint and stores it in one write.
    pub async fn regenerate_fingerprint(&self, id: &str) -> Result<ProfileRecord> {
        let updated = self
            .mutate(id, |record| {
                record.fingerprint = Some(Fingerprint::generate());
                Ok(())
            })
            .await?;
        tracing::info!("Regenerated fingerprint for profile '{}'", updated.name);
        Ok(updated)
    }

    pub async fn record_usage(&self, id: &str) -> Result<ProfileRecord> {
        self.mutate(id, |record| {
            record.last_used = Some(Utc::now());
            record.use_count += 1;
            Ok(())
        })
        .await
    }

    /// Packs the profile directory into an archive under the frozen root,
    /// deletes the directory, and flips the record to frozen. Freezing a
    /// frozen profile is a no-op.
    pub async fn freeze(&self, id: &str) -> Result<ProfileRecord> {
        let record = self.store.get(id).await?;
        if record.is_frozen() {
            tracing::info!("Profile '{}' is already frozen", record.name);
            return Ok(record);
        }
        if !record.path.is_dir() {
            return Err(Error::MissingDependency(format!(
                "profile directory missing: {}",
                record.path.display()
            )));
        }
        let archive = self.archive_path_for(&record)?;
        self.codec.pack(&record.path, &archive).await?;
        let packed = tokio::fs::metadata(&archive).await?;
        if packed.len() == 0 {
            return Err(Error::Archive(format!(
                "pack produced an empty archive at {}",
                archive.display()
            )));
        }
        tokio::fs::remove_dir_all(&record.path).await?;
        let updated = self
            .mutate(id, |record| {
                record.status = ProfileStatus::Frozen;
                record.archive_path = Some(archive.clone());
                Ok(())
            })
            .await?;
        tracing::info!("Froze profile '{}' into {}", updated.name, archive.display());
        Ok(updated)
    }

    /// Restores the archived directory next to where it was packed from,
    /// deletes the archive, and flips the record back to active. Thawing
    /// an active profile is a no-op.
    pub async fn thaw(&self, id: &str) -> Result<ProfileRecord> {
        let record = self.store.get(id).await?;
        if !record.is_frozen() {
            tracing::info!("Profile '{}' is already active", record.name);
            return Ok(record);
        }
        let archive = match &record.archive_path {
            Some(path) => path.clone(),
            None => self.archive_path_for(&record)?,
        };
        if !archive.is_file() {
            return Err(Error::MissingDependency(format!(
                "archive missing: {}",
                archive.display()
            )));
        }
        let parent = record
            .path
            .parent()
            .ok_or_else(|| {
                Error::InvalidState(format!(
                    "profile path has no parent: {}",
                    record.path.display()
                ))
            })?
            .to_path_buf();
        self.codec.unpack(&archive, &parent).await?;
        if !record.path.is_dir() {
            return Err(Error::Archive(format!(
                "archive did not restore {}",
                record.path.display()
            )));
        }
        tokio::fs::remove_file(&archive).await?;
        let updated = self
            .mutate(id, |record| {
                record.status = ProfileStatus::Active;
                record.archive_path = None;
                Ok(())
            })
            .await?;
        tracing::info!("Thawed profile '{}'", updated.name);
        Ok(updated)
    }

    /// Deletes whichever of the directory or archive currently backs the
    /// profile, then drops the record. A missing backing is tolerated so a
    /// half-broken profile can still be removed.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let record = self.store.get(id).await?;
        match record.status {
            ProfileStatus::Active => remove_dir_if_present(&record.path).await?,
            ProfileStatus::Frozen => {
                let archive = match &record.archive_path {
                    Some(path) => path.clone(),
                    None => self.archive_path_for(&record)?,
                };
                remove_file_if_present(&archive).await?;
            }
        }
        self.store.delete(id).await?;
        tracing::info!("Removed profile '{}'", record.name);
        Ok(())
    }

    /// Removes each profile independently and reports per-profile results;
    /// one failure does not stop the rest.
    pub async fn remove_many(&self, ids: &[String]) -> Vec<RemoveOutcome> {
        let mut outcomes = Vec::with_capacity(ids.len());
        for id in ids {
            let error = self.remove(id).await.err().map(|e| e.to_string());
            if let Some(message) = &error {
                tracing::warn!("Failed to remove profile {id}: {message}");
            }
            outcomes.push(RemoveOutcome {
                id: id.clone(),
                error,
            });
        }
        outcomes
    }

    /// Packs an active profile into `dest` without changing its status.
    pub async fn export(&self, id: &str, dest: &Path) -> Result<PathBuf> {
        let record = self.store.get(id).await?;
        if record.is_frozen() {
            return Err(Error::InvalidState(format!(
                "profile '{}' is frozen; thaw it before exporting",
                record.name
            )));
        }
        if !record.path.is_dir() {
            return Err(Error::MissingDependency(format!(
                "profile directory missing: {}",
                record.path.display()
            )));
        }
        let dest = std::path::absolute(dest)?;
        self.codec.pack(&record.path, &dest).await?;
        tracing::info!("Exported profile '{}' to {}", record.name, dest.display());
        Ok(dest)
    }

    /// Stages the profile's extensions from the configured shared root into
    /// its directory. Returns the staged paths.
    pub async fn sync_extensions(&self, id: &str) -> Result<Vec<PathBuf>> {
        let record = self.store.get(id).await?;
        if record.extensions.is_empty() {
            tracing::info!("Profile '{}' lists no extensions; nothing to sync", record.name);
            return Ok(Vec::new());
        }
        if record.is_frozen() {
            return Err(Error::InvalidState(format!(
                "profile '{}' is frozen; thaw it before syncing extensions",
                record.name
            )));
        }
        let config = self.config().await?;
        let root = config.extensions_root.ok_or_else(|| {
            Error::MissingDependency(
                "extensions root is not configured; set it with `config set --extensions-root`"
                    .into(),
            )
        })?;
        if !root.is_dir() {
            return Err(Error::MissingDependency(format!(
                "extensions root missing: {}",
                root.display()
            )));
        }
        let profile_dir = record.path.clone();
        let names = record.extensions.clone();
        let staged =
            run_blocking(move || ExtensionResolver::sync_to_profile(&profile_dir, &names, &root))
                .await?;
        tracing::info!(
            "Synced {} extension(s) into profile '{}'",
            staged.len(),
            record.name
        );
        Ok(staged)
    }

    pub async fn create_group(&self, name: &str, color: Option<String>) -> Result<GroupRecord> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidState("group name must not be empty".into()));
        }
        let mut file = self.store.load().await?;
        if file.groups.iter().any(|g| g.name == name) {
            return Err(Error::AlreadyExists(format!(
                "group name '{name}' is taken"
            )));
        }
        let group = GroupRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            color: color.unwrap_or_else(|| record::DEFAULT_GROUP_COLOR.to_string()),
            created_at: Utc::now(),
        };
        file.groups.push(group.clone());
        self.store.save(&file).await?;
        tracing::info!("Created group '{}'", group.name);
        Ok(group)
    }

    pub async fn list_groups(&self) -> Result<Vec<GroupRecord>> {
        let mut groups = self.store.load().await?.groups;
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    pub async fn update_group(
        &self,
        id: &str,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<GroupRecord> {
        let mut file = self.store.load().await?;
        if let Some(name) = name {
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::InvalidState("group name must not be empty".into()));
            }
            if file.groups.iter().any(|g| g.name == name && g.id != id) {
                return Err(Error::AlreadyExists(format!(
                    "group name '{name}' is taken"
                )));
            }
        }
        let group = file
            .groups
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| Error::NotFound(format!("group {id}")))?;
        if let Some(name) = name {
            group.name = name.trim().to_string();
        }
        if let Some(color) = color {
            group.color = color.to_string();
        }
        let updated = group.clone();
        self.store.save(&file).await?;
        Ok(updated)
    }

    /// Deletes the group and clears it from every member profile in the
    /// same store write. Returns how many profiles were detached.
    pub async fn remove_group(&self, id: &str) -> Result<usize> {
        let mut file = self.store.load().await?;
        let before = file.groups.len();
        file.groups.retain(|g| g.id != id);
        if file.groups.len() == before {
            return Err(Error::NotFound(format!("group {id}")));
        }
        let mut detached = 0;
        for profile in &mut file.profiles {
            if profile.group_id.as_deref() == Some(id) {
                profile.group_id = None;
                profile.touch();
                detached += 1;
            }
        }
        self.store.save(&file).await?;
        tracing::info!("Removed group {id}; detached {detached} profile(s)");
        Ok(detached)
    }

    fn archive_path_for(&self, record: &ProfileRecord) -> Result<PathBuf> {
        let basename = record
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::InvalidState(format!(
                    "profile path has no usable basename: {}",
                    record.path.display()
                ))
            })?;
        Ok(self
            .paths
            .frozen_dir
            .join(format!("{basename}-{}.{ARCHIVE_EXTENSION}", record.id)))
    }

    async fn mutate<F>(&self, id: &str, apply: F) -> Result<ProfileRecord>
    where
        F: FnOnce(&mut ProfileRecord) -> Result<()>,
    {
        let mut file = self.store.load().await?;
        let record = find_profile_mut(&mut file, id)?;
        apply(record)?;
        record.touch();
        let updated = record.clone();
        self.store.save(&file).await?;
        Ok(updated)
    }
}

fn ensure_name_free(file: &StoreFile, name: &str, exclude_id: Option<&str>) -> Result<()> {
    let taken = file
        .profiles
        .iter()
        .any(|p| p.name == name && exclude_id != Some(p.id.as_str()));
    if taken {
        return Err(Error::AlreadyExists(format!(
            "profile name '{name}' is taken"
        )));
    }
    Ok(())
}

fn ensure_group_exists(file: &StoreFile, group_id: &str) -> Result<()> {
    if !file.groups.iter().any(|g| g.id == group_id) {
        return Err(Error::NotFound(format!("group {group_id}")));
    }
    Ok(())
}

fn find_profile(file: &StoreFile, id: &str) -> Result<ProfileRecord> {
    file.profiles
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("profile {id}")))
}

fn find_profile_mut<'a>(file: &'a mut StoreFile, id: &str) -> Result<&'a mut ProfileRecord> {
    file.profiles
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| Error::NotFound(format!("profile {id}")))
}

async fn remove_dir_if_present(path: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

async fn remove_file_if_present(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

async fn run_blocking<T, F>(job: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| Error::Io(std::io::Error::other(format!("background task failed: {e}"))))?
}
