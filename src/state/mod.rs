//! Shared application state and the single-writer document discipline.

pub mod tiers;

use std::sync::Arc;

use dashmap::DashMap;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock, watch};

use crate::{
    config::AppConfig,
    dao::{models::TierDocument, tier_store::TierStore},
    error::ServiceError,
    platform::Gateway,
};

/// Cheaply cloneable handle to the application state.
pub type SharedState = Arc<AppState>;

/// One chat message captured inside an open ticket channel.
///
/// Kept only in memory; the buffer becomes the transcript when the ticket
/// closes and is dropped with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketMessage {
    /// Author's platform id.
    pub author_id: String,
    /// Author's display name at the time of the message.
    pub author_name: String,
    /// Raw message content.
    pub content: String,
    /// When the message was sent.
    pub sent_at: OffsetDateTime,
}

/// Central application state: the live document, its storage backend, and
/// the platform gateway.
pub struct AppState {
    config: AppConfig,
    document: Mutex<TierDocument>,
    store: RwLock<Option<Arc<dyn TierStore>>>,
    degraded: watch::Sender<bool>,
    ticket_logs: DashMap<String, Vec<TicketMessage>>,
    gateway: Arc<dyn Gateway>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned
    /// cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is
    /// installed by the supervisor.
    pub fn new(config: AppConfig, gateway: Arc<dyn Gateway>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let mut document = TierDocument::default();
        document.normalize();
        Arc::new(Self {
            config,
            document: Mutex::new(document),
            store: RwLock::new(None),
            degraded: degraded_tx,
            ticket_logs: DashMap::new(),
            gateway,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Platform gateway used for every chat side effect.
    pub fn gateway(&self) -> Arc<dyn Gateway> {
        self.gateway.clone()
    }

    /// In-memory message buffers of open tickets, keyed by channel id.
    pub fn ticket_logs(&self) -> &DashMap<String, Vec<TicketMessage>> {
        &self.ticket_logs
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn TierStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Install a storage backend, hydrate the live document from the given
    /// snapshot, and leave degraded mode.
    pub async fn install_store(&self, store: Arc<dyn TierStore>, mut snapshot: TierDocument) {
        snapshot.normalize();
        {
            let mut doc = self.document.lock().await;
            *doc = snapshot;
        }
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Read-only snapshot of the live document.
    pub async fn document(&self) -> TierDocument {
        self.document.lock().await.clone()
    }

    /// Run one logical operation against the document.
    ///
    /// This is the single-writer channel every mutation goes through: the
    /// lock is held across mutate-and-persist, so two racing operations can
    /// never both act on the same queue head. The mutation runs on a draft
    /// and is committed only after the store accepted the snapshot; a
    /// persistence failure leaves the live document untouched and surfaces
    /// as [`ServiceError::Unavailable`].
    pub async fn with_document<T>(
        &self,
        mutate: impl FnOnce(&mut TierDocument) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let mut guard = self.document.lock().await;
        let mut draft = guard.clone();
        let value = mutate(&mut draft)?;

        let store = self.store().await.ok_or(ServiceError::Degraded)?;
        store.save(draft.clone()).await?;

        *guard = draft;
        Ok(value)
    }

    /// Update and broadcast the degraded flag.
    ///
    /// `send_replace` stores the value even when nobody subscribes; the
    /// binary reads the flag through [`is_degraded`](Self::is_degraded)
    /// without holding a receiver.
    pub(crate) async fn update_degraded(&self, value: bool) {
        self.degraded.send_replace(value);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::dao::tier_store::memory::MemoryTierStore;
    use crate::platform::recording::RecordingGateway;

    /// State wired to a fresh in-memory store and recording gateway.
    pub(crate) async fn state_with_gateway() -> (SharedState, RecordingGateway, MemoryTierStore) {
        let gateway = RecordingGateway::new();
        let store = MemoryTierStore::new();
        let state = AppState::new(AppConfig::for_tests(), Arc::new(gateway.clone()));
        let mut document = TierDocument::default();
        document.normalize();
        state
            .install_store(Arc::new(store.clone()), document)
            .await;
        (state, gateway, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tiers::Mode;

    #[tokio::test]
    async fn starts_degraded_until_store_installed() {
        let (state, _gateway, _store) = testing::state_with_gateway().await;
        assert!(!state.is_degraded().await);

        state.clear_store().await;
        assert!(state.is_degraded().await);
        assert!(*state.degraded_watcher().borrow());
    }

    #[tokio::test]
    async fn degraded_flag_updates_without_subscribers() {
        let (state, _gateway, _store) = testing::state_with_gateway().await;

        // No receiver is alive here; the flag must still track every change.
        state.update_degraded(true).await;
        assert!(state.is_degraded().await);
        state.update_degraded(false).await;
        assert!(!state.is_degraded().await);
    }

    #[tokio::test]
    async fn mutation_is_rolled_back_when_persistence_fails() {
        let (state, _gateway, store) = testing::state_with_gateway().await;

        store.set_healthy(false);
        let outcome = state
            .with_document(|doc| {
                doc.waitlist_mut(Mode::Axe).queue.push("1".to_owned());
                Ok(())
            })
            .await;

        assert!(matches!(outcome, Err(ServiceError::Unavailable(_))));
        assert!(state.document().await.waitlists[&Mode::Axe].queue.is_empty());
    }

    #[tokio::test]
    async fn degraded_mode_rejects_writes() {
        let (state, _gateway, _store) = testing::state_with_gateway().await;
        state.clear_store().await;

        let outcome = state.with_document(|_| Ok(())).await;
        assert!(matches!(outcome, Err(ServiceError::Degraded)));
    }
}
