//! Guild configuration and data export, admin only.

use tracing::info;

use crate::{error::ServiceError, platform::Actor, state::SharedState};

/// Set the category channel under which ticket channels are created.
pub async fn set_ticket_category(
    state: &SharedState,
    actor: &Actor,
    category_id: u64,
) -> Result<(), ServiceError> {
    actor.require_admin()?;
    state
        .with_document(|doc| {
            doc.config.ticket_category_id = Some(category_id);
            Ok(())
        })
        .await?;
    info!(admin = actor.id, category_id, "ticket category set");
    Ok(())
}

/// Set the channel receiving closed-ticket summaries and transcripts.
pub async fn set_ticket_logs_channel(
    state: &SharedState,
    actor: &Actor,
    channel_id: u64,
) -> Result<(), ServiceError> {
    actor.require_admin()?;
    state
        .with_document(|doc| {
            doc.config.ticket_logs_channel_id = Some(channel_id);
            Ok(())
        })
        .await?;
    info!(admin = actor.id, channel_id, "ticket logs channel set");
    Ok(())
}

/// Set the channel receiving public result announcements.
pub async fn set_results_channel(
    state: &SharedState,
    actor: &Actor,
    channel_id: u64,
) -> Result<(), ServiceError> {
    actor.require_admin()?;
    state
        .with_document(|doc| {
            doc.config.results_channel_id = Some(channel_id);
            Ok(())
        })
        .await?;
    info!(admin = actor.id, channel_id, "results channel set");
    Ok(())
}

/// Full JSON snapshot of the live document, for download as a backup.
pub async fn backup(state: &SharedState, actor: &Actor) -> Result<Vec<u8>, ServiceError> {
    actor.require_admin()?;
    let doc = state.document().await;
    let bytes = serde_json::to_vec_pretty(&doc)
        .map_err(|err| ServiceError::InvalidInput(format!("backup serialization failed: {err}")))?;
    info!(admin = actor.id, bytes = bytes.len(), "backup exported");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::TierDocument;
    use crate::state::testing::state_with_gateway;

    fn admin() -> Actor {
        Actor::member("1", "admin#0").as_admin()
    }

    #[tokio::test]
    async fn setters_require_admin() {
        let (state, _gateway, _store) = state_with_gateway().await;
        let staff = Actor::member("2", "staff#0").as_staff();
        let outcome = set_ticket_category(&state, &staff, 500).await;
        assert!(matches!(outcome, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn setters_persist_config() {
        let (state, _gateway, _store) = state_with_gateway().await;
        set_ticket_category(&state, &admin(), 500).await.unwrap();
        set_ticket_logs_channel(&state, &admin(), 600).await.unwrap();
        set_results_channel(&state, &admin(), 700).await.unwrap();

        let config = state.document().await.config;
        assert_eq!(config.ticket_category_id, Some(500));
        assert_eq!(config.ticket_logs_channel_id, Some(600));
        assert_eq!(config.results_channel_id, Some(700));
    }

    #[tokio::test]
    async fn backup_round_trips_the_document() {
        let (state, _gateway, _store) = state_with_gateway().await;
        set_ticket_category(&state, &admin(), 500).await.unwrap();

        let bytes = backup(&state, &admin()).await.unwrap();
        let restored: TierDocument = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(restored, state.document().await);
    }
}
