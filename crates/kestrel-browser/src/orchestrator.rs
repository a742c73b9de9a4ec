use kestrel_core::ProfileLifecycleManager;
use kestrel_core::extensions::{ExtensionResolver, PROFILE_EXTENSIONS_DIR};
use kestrel_core::record::{EngineKind, ProfileRecord};
use std::path::PathBuf;
use tokio::sync::oneshot;

use crate::Result;
use crate::engine::{CdpEngine, EngineLauncher, LaunchedEngine, ProcessEngine};
use crate::finder::EngineFinder;
use crate::launch::build_launch_spec;
use crate::registry::RunningInstanceRegistry;

/// Drives a profile from its stored record to a live browser and back.
/// Owns the registry that enforces one running instance per profile.
pub struct LaunchOrchestrator {
    manager: ProfileLifecycleManager,
    registry: RunningInstanceRegistry,
    cdp: Box<dyn EngineLauncher>,
    process: Box<dyn EngineLauncher>,
}

/// A profile whose browser is up.
#[derive(Debug)]
pub struct Launched {
    pub record: ProfileRecord,
    /// Fires when the browser process exits on its own.
    pub exited: oneshot::Receiver<()>,
}

impl LaunchOrchestrator {
    pub fn new(manager: ProfileLifecycleManager) -> Self {
        Self::with_engines(manager, Box::new(CdpEngine), Box::new(ProcessEngine))
    }

    /// Swaps the engine adapters out; tests launch fakes through this.
    pub fn with_engines(
        manager: ProfileLifecycleManager,
        cdp: Box<dyn EngineLauncher>,
        process: Box<dyn EngineLauncher>,
    ) -> Self {
        LaunchOrchestrator {
            manager,
            registry: RunningInstanceRegistry::new(),
            cdp,
            process,
        }
    }

    pub fn manager(&self) -> &ProfileLifecycleManager {
        &self.manager
    }

    pub fn registry(&self) -> &RunningInstanceRegistry {
        &self.registry
    }

    /// Starts the browser for a profile. The identifier may be an id, a
    /// name, or a unique id prefix.
    pub async fn launch(
        &self,
        identifier: &str,
        engine_path: Option<PathBuf>,
        extra_args: &[String],
    ) -> Result<Launched> {
        let record = self.manager.resolve(identifier).await?;
        if record.is_frozen() {
            return Err(kestrel_core::Error::InvalidState(format!(
                "profile '{}' is frozen; thaw it before launching",
                record.name
            ))
            .into());
        }
        if !record.path.is_dir() {
            return Err(kestrel_core::Error::MissingDependency(format!(
                "profile directory missing: {}",
                record.path.display()
            ))
            .into());
        }

        self.registry.reserve(&record.id)?;
        let engine = match self.start_engine(&record, engine_path, extra_args).await {
            Ok(engine) => engine,
            Err(e) => {
                self.registry.release(&record.id);
                return Err(e);
            }
        };

        // The browser is already up; a failed usage write should not
        // tear it down again.
        if let Err(e) = self.manager.record_usage(&record.id).await {
            tracing::warn!("could not record usage for '{}': {e}", record.name);
        }
        self.registry.fulfill(&record.id, engine.session);
        tracing::info!("profile '{}' is running", record.name);

        Ok(Launched {
            record,
            exited: engine.exited,
        })
    }

    async fn start_engine(
        &self,
        record: &ProfileRecord,
        engine_path: Option<PathBuf>,
        extra_args: &[String],
    ) -> Result<LaunchedEngine> {
        let config = self.manager.config().await?;
        let custom = engine_path.or_else(|| config.engine_path.clone());
        let executable = EngineFinder::new(record.engine, custom).find()?;

        let staging = record.path.join(PROFILE_EXTENSIONS_DIR);
        let extensions = ExtensionResolver::resolve_unpacked(&staging)?;
        if !record.extensions.is_empty() && extensions.is_empty() {
            tracing::warn!(
                "profile '{}' lists extensions but none are staged; run `extensions sync`",
                record.name
            );
        }

        let spec = build_launch_spec(record, &config, executable, &extensions, extra_args);
        let launcher: &dyn EngineLauncher = match record.engine {
            EngineKind::Chromium => self.cdp.as_ref(),
            EngineKind::Firefox => self.process.as_ref(),
        };
        launcher.launch(spec).await
    }

    /// Closes the running browser for a profile if there is one.
    pub async fn close(&self, identifier: &str) -> Result<bool> {
        let record = self.manager.resolve(identifier).await?;
        self.registry.close(&record.id).await
    }

    /// Closes every running browser; returns how many shut down cleanly.
    pub async fn shutdown(&self) -> usize {
        self.registry.shutdown_all().await
    }
}
