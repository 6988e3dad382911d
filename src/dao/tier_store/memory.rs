//! Ephemeral in-memory backend for tests and `memory:` URLs.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::BoxFuture;
use tokio::sync::Mutex;

use crate::dao::models::TierDocument;
use crate::dao::storage::{StorageError, StorageResult};
use crate::dao::tier_store::TierStore;

/// Store holding the document in process memory.
///
/// The health switch lets tests drive the degraded-mode paths without a real
/// backend outage.
#[derive(Clone, Default)]
pub struct MemoryTierStore {
    document: Arc<Mutex<Option<TierDocument>>>,
    healthy: Arc<AtomicBool>,
}

impl MemoryTierStore {
    /// Create an empty, healthy store.
    pub fn new() -> Self {
        Self {
            document: Arc::new(Mutex::new(None)),
            healthy: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Flip the simulated backend health.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    fn check(&self) -> StorageResult<()> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::unavailable(
                "in-memory store marked unhealthy".to_owned(),
                io::Error::new(io::ErrorKind::ConnectionRefused, "simulated outage"),
            ))
        }
    }
}

impl TierStore for MemoryTierStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<TierDocument>>> {
        let store = self.clone();
        Box::pin(async move {
            store.check()?;
            Ok(store.document.lock().await.clone())
        })
    }

    fn save(&self, document: TierDocument) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.check()?;
            *store.document.lock().await = Some(document);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.check() })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.check() })
    }
}
