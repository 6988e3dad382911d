//! JSON-file backend, the drop-in equivalent of the historical data file.

use std::io;
use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use tokio::fs;

use crate::dao::models::TierDocument;
use crate::dao::storage::{StorageError, StorageResult};
use crate::dao::tier_store::TierStore;

/// Store persisting the document as a pretty-printed JSON file.
///
/// Writes go to a sibling temp file first and are moved into place with an
/// atomic rename, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileTierStore {
    path: PathBuf,
}

impl FileTierStore {
    /// Create a store for the given file path. The file may not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn load_document(path: &Path) -> StorageResult<Option<TierDocument>> {
        let raw = match fs::read(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(StorageError::unavailable(
                    format!("failed to read `{}`", path.display()),
                    err,
                ));
            }
        };

        let document = serde_json::from_slice(&raw).map_err(|err| {
            StorageError::corrupted(format!("failed to parse `{}`", path.display()), err)
        })?;
        Ok(Some(document))
    }

    async fn save_document(&self, document: TierDocument) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(&document).map_err(|err| {
            StorageError::corrupted("failed to encode document".to_owned(), err)
        })?;

        let temp = self.temp_path();
        fs::write(&temp, &bytes).await.map_err(|err| {
            StorageError::unavailable(format!("failed to write `{}`", temp.display()), err)
        })?;
        fs::rename(&temp, &self.path).await.map_err(|err| {
            StorageError::unavailable(
                format!("failed to move `{}` into place", temp.display()),
                err,
            )
        })?;
        Ok(())
    }

    async fn probe(&self) -> StorageResult<()> {
        let dir = self.path.parent().filter(|p| !p.as_os_str().is_empty());
        let dir = dir.unwrap_or_else(|| Path::new("."));
        fs::metadata(dir).await.map_err(|err| {
            StorageError::unavailable(format!("data directory `{}` is gone", dir.display()), err)
        })?;
        Ok(())
    }
}

impl TierStore for FileTierStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<TierDocument>>> {
        let store = self.clone();
        Box::pin(async move { Self::load_document(&store.path).await })
    }

    fn save(&self, document: TierDocument) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_document(document).await })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.probe().await })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.probe().await })
    }
}
