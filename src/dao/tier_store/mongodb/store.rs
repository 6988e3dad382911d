//! Single-document [`TierStore`] implementation on top of MongoDB.

use std::sync::Arc;

use futures::future::BoxFuture;
use mongodb::{
    Client, Collection, Database,
    bson::{Bson, Document, doc},
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
};
use crate::dao::{models::TierDocument, storage::StorageResult, tier_store::TierStore};

const STATE_COLLECTION_NAME: &str = "estado";
const STATE_DOC_ID: &str = "tierlist";

/// MongoDB-backed store keeping the whole document under one `_id`.
///
/// The document goes through `serde_json::Value` on both sides so the bytes
/// in MongoDB stay key-for-key identical to the file backend's JSON.
#[derive(Clone)]
pub struct MongoTierStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoTierStore {
    /// Establish a connection to MongoDB.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        Ok(Self { inner })
    }

    async fn collection(&self) -> Collection<Document> {
        let guard = self.inner.state.read().await;
        guard.database.collection::<Document>(STATE_COLLECTION_NAME)
    }

    async fn save_snapshot(&self, document: TierDocument) -> MongoResult<()> {
        let json = serde_json::to_value(&document).map_err(|err| MongoDaoError::Decode {
            source: Box::new(err),
        })?;
        let data: Bson = mongodb::bson::serialize_to_bson(&json).map_err(|err| MongoDaoError::Decode {
            source: Box::new(err),
        })?;

        let collection = self.collection().await;
        collection
            .replace_one(
                doc! { "_id": STATE_DOC_ID },
                doc! { "_id": STATE_DOC_ID, "data": data },
            )
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveDocument { source })?;
        Ok(())
    }

    async fn load_snapshot(&self) -> MongoResult<Option<TierDocument>> {
        let collection = self.collection().await;
        let stored = collection
            .find_one(doc! { "_id": STATE_DOC_ID })
            .await
            .map_err(|source| MongoDaoError::LoadDocument { source })?;

        let Some(mut stored) = stored else {
            return Ok(None);
        };
        let Some(data) = stored.remove("data") else {
            return Ok(None);
        };

        let json: serde_json::Value =
            mongodb::bson::deserialize_from_bson(data).map_err(|err| MongoDaoError::Decode {
                source: Box::new(err),
            })?;
        let document = serde_json::from_value(json).map_err(|err| MongoDaoError::Decode {
            source: Box::new(err),
        })?;
        Ok(Some(document))
    }
}

impl TierStore for MongoTierStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<TierDocument>>> {
        let store = self.clone();
        Box::pin(async move { store.load_snapshot().await.map_err(Into::into) })
    }

    fn save(&self, document: TierDocument) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_snapshot(document).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
