use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::Result;
use crate::engine::EngineSession;

/// Tracks which profiles currently have a live browser attached.
///
/// A slot is reserved before the engine starts and fulfilled once it is
/// up, so two launches of the same profile cannot interleave between
/// the running-check and the registration.
#[derive(Default)]
pub struct RunningInstanceRegistry {
    instances: Mutex<HashMap<String, Entry>>,
}

enum Entry {
    /// Slot held while an engine is still starting.
    Pending,
    Running(Box<dyn EngineSession>),
}

impl RunningInstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.instances.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the slot for a profile about to launch.
    pub fn reserve(&self, profile_id: &str) -> Result<()> {
        let mut table = self.table();
        if table.contains_key(profile_id) {
            return Err(kestrel_core::Error::AlreadyRunning(profile_id.to_string()).into());
        }
        table.insert(profile_id.to_string(), Entry::Pending);
        Ok(())
    }

    /// Attaches the live session to a previously reserved slot.
    pub fn fulfill(&self, profile_id: &str, session: Box<dyn EngineSession>) {
        self.table()
            .insert(profile_id.to_string(), Entry::Running(session));
    }

    /// Frees the slot, handing back the session if one was attached.
    pub fn release(&self, profile_id: &str) -> Option<Box<dyn EngineSession>> {
        match self.table().remove(profile_id) {
            Some(Entry::Running(session)) => Some(session),
            _ => None,
        }
    }

    pub fn is_running(&self, profile_id: &str) -> bool {
        self.table().contains_key(profile_id)
    }

    pub fn running_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.table().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Closes the browser for one profile. Returns false when the
    /// profile had no live session; close failures propagate.
    pub async fn close(&self, profile_id: &str) -> Result<bool> {
        match self.release(profile_id) {
            Some(session) => {
                session.close().await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Closes every live session sequentially, logging failures and
    /// moving on. Returns how many browsers shut down cleanly.
    pub async fn shutdown_all(&self) -> usize {
        // Drain under the lock, close outside of it.
        let drained: Vec<(String, Entry)> = self.table().drain().collect();
        let mut closed = 0;
        for (id, entry) in drained {
            match entry {
                Entry::Running(session) => {
                    tracing::debug!("closing browser for profile {id}");
                    match session.close().await {
                        Ok(()) => closed += 1,
                        Err(e) => tracing::warn!("failed to close browser for {id}: {e}"),
                    }
                }
                Entry::Pending => {
                    tracing::warn!("profile {id} was still starting during shutdown");
                }
            }
        }
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FakeSession {
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl EngineSession for FakeSession {
        fn pid(&self) -> Option<u32> {
            None
        }

        async fn close(self: Box<Self>) -> Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn fake() -> (Box<dyn EngineSession>, Arc<AtomicBool>) {
        let closed = Arc::new(AtomicBool::new(false));
        let session = Box::new(FakeSession {
            closed: closed.clone(),
        });
        (session, closed)
    }

    #[tokio::test]
    async fn reserving_twice_reports_already_running() {
        let registry = RunningInstanceRegistry::new();
        registry.reserve("p1").unwrap();
        let err = registry.reserve("p1").unwrap_err();
        assert!(err.to_string().contains("already running"));

        let (session, _) = fake();
        registry.fulfill("p1", session);
        assert!(registry.reserve("p1").is_err());
    }

    #[tokio::test]
    async fn close_shuts_the_session_down_and_frees_the_slot() {
        let registry = RunningInstanceRegistry::new();
        registry.reserve("p1").unwrap();
        let (session, closed) = fake();
        registry.fulfill("p1", session);
        assert!(registry.is_running("p1"));

        assert!(registry.close("p1").await.unwrap());
        assert!(closed.load(Ordering::SeqCst));
        assert!(!registry.is_running("p1"));
        assert!(!registry.close("p1").await.unwrap());
    }

    #[tokio::test]
    async fn releasing_a_pending_slot_yields_no_session() {
        let registry = RunningInstanceRegistry::new();
        registry.reserve("p1").unwrap();
        assert!(registry.release("p1").is_none());
        assert!(!registry.is_running("p1"));
    }

    struct FailingSession;

    #[async_trait]
    impl EngineSession for FailingSession {
        fn pid(&self) -> Option<u32> {
            None
        }

        async fn close(self: Box<Self>) -> Result<()> {
            Err(crate::Error::Engine("close refused".to_string()))
        }
    }

    #[tokio::test]
    async fn shutdown_continues_past_a_close_failure() {
        let registry = RunningInstanceRegistry::new();
        registry.reserve("bad").unwrap();
        registry.fulfill("bad", Box::new(FailingSession));
        let (good, good_closed) = fake();
        registry.reserve("good").unwrap();
        registry.fulfill("good", good);

        assert_eq!(registry.shutdown_all().await, 1);
        assert!(good_closed.load(Ordering::SeqCst));
        assert!(registry.running_ids().is_empty());
    }

    #[tokio::test]
    async fn shutdown_closes_every_running_session() {
        let registry = RunningInstanceRegistry::new();
        let (first, first_closed) = fake();
        let (second, second_closed) = fake();
        registry.reserve("a").unwrap();
        registry.fulfill("a", first);
        registry.reserve("b").unwrap();
        registry.fulfill("b", second);
        registry.reserve("pending").unwrap();

        assert_eq!(registry.running_ids(), vec!["a", "b", "pending"]);
        assert_eq!(registry.shutdown_all().await, 2);
        assert!(first_closed.load(Ordering::SeqCst));
        assert!(second_closed.load(Ordering::SeqCst));
        assert!(registry.running_ids().is_empty());
    }
}
