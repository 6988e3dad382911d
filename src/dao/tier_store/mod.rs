//! Storage backends for the tier document.
//!
//! The whole bot state lives in one document, so the store surface is a
//! load/save pair plus the health hooks the storage supervisor drives.

pub mod file;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::dao::models::TierDocument;
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for the tier document.
pub trait TierStore: Send + Sync {
    /// Load the current document, `None` when the backend holds nothing yet.
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<TierDocument>>>;
    /// Persist a full snapshot of the document (last write wins).
    fn save(&self, document: TierDocument) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap liveness probe used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Rebuild the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Open the store backend selected by the database URL.
///
/// `mongodb://` and `mongodb+srv://` URLs select the MongoDB backend,
/// `memory:` the ephemeral in-memory backend, anything else is treated as a
/// JSON file path.
pub async fn open_store(database_url: &str) -> StorageResult<Arc<dyn TierStore>> {
    if database_url.starts_with("mongodb://") || database_url.starts_with("mongodb+srv://") {
        #[cfg(feature = "mongo-store")]
        {
            let config = mongodb::config::MongoConfig::from_uri(database_url).await?;
            let store = mongodb::store::MongoTierStore::connect(config).await?;
            return Ok(Arc::new(store));
        }
        #[cfg(not(feature = "mongo-store"))]
        {
            return Err(StorageError::unavailable(
                format!("MongoDB support is not compiled in for `{database_url}`"),
                std::io::Error::new(std::io::ErrorKind::Unsupported, "mongo-store feature off"),
            ));
        }
    }

    if database_url == "memory:" {
        return Ok(Arc::new(memory::MemoryTierStore::new()));
    }

    Ok(Arc::new(file::FileTierStore::new(database_url)))
}
