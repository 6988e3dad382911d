//! Ticket lifecycle: private test channels opened by pulls and closed with a
//! transcript.

use std::time::Duration;

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    dao::models::TicketEntity,
    error::ServiceError,
    platform::{self, Actor, TicketChannelRequest, TranscriptUpload},
    services::transcript,
    state::{SharedState, TicketMessage},
    state::tiers::Mode,
};

/// Delay between closing a ticket and deleting its channel, so members can
/// read the closing notice.
const CHANNEL_DELETE_GRACE: Duration = Duration::from_secs(5);

/// What [`close`] reports back to the invoker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseSummary {
    /// The removed ticket record.
    pub ticket: TicketEntity,
    /// Whether a transcript was rendered and handed to the gateway.
    pub transcript_uploaded: bool,
}

/// Open a ticket channel for a player who was just pulled.
///
/// The pull is already persisted when this runs. A missing category or a
/// failed channel creation therefore degrades the pull (no ticket) instead
/// of failing it; only the persistence of a created ticket can error.
pub async fn open_for_pull(
    state: &SharedState,
    actor: &Actor,
    mode: Mode,
    player_id: &str,
) -> Result<Option<String>, ServiceError> {
    let doc = state.document().await;
    let Some(category_id) = doc.config.ticket_category_id else {
        warn!(%mode, player = player_id, "no ticket category configured");
        return Ok(None);
    };

    let request = TicketChannelRequest {
        category_id,
        mode,
        player_id: player_id.to_owned(),
        tester_id: actor.id.clone(),
    };
    let channel_id = match state.gateway().create_ticket_channel(request).await {
        Ok(channel_id) => channel_id,
        Err(err) => {
            warn!(%mode, player = player_id, error = %err, "ticket channel creation failed");
            return Ok(None);
        }
    };

    let ticket = TicketEntity {
        ticket_id: uuid::Uuid::new_v4(),
        player_id: player_id.to_owned(),
        tester_id: actor.id.clone(),
        mode,
        opened_at: OffsetDateTime::now_utc(),
    };

    state
        .with_document(|doc| {
            doc.tickets.insert(channel_id.clone(), ticket);
            Ok(())
        })
        .await?;
    state.ticket_logs().insert(channel_id.clone(), Vec::new());

    info!(channel = channel_id, player = player_id, tester = actor.id, %mode, "ticket opened");
    Ok(Some(channel_id))
}

/// Capture a message posted inside an open ticket channel.
///
/// Messages in channels without a ticket record are ignored.
pub async fn log_message(state: &SharedState, channel_id: &str, message: TicketMessage) {
    let doc = state.document().await;
    if !doc.tickets.contains_key(channel_id) {
        return;
    }
    state
        .ticket_logs()
        .entry(channel_id.to_owned())
        .or_default()
        .push(message);
}

/// Grant another member access to a ticket channel.
///
/// Permitted to the owning tester, the ticketed player, and staff.
pub async fn add_participant(
    state: &SharedState,
    actor: &Actor,
    channel_id: &str,
    user_id: &str,
) -> Result<(), ServiceError> {
    let doc = state.document().await;
    let ticket = doc
        .tickets
        .get(channel_id)
        .ok_or_else(|| ServiceError::NotFound(format!("no ticket in channel {channel_id}")))?;

    if actor.id != ticket.tester_id && actor.id != ticket.player_id && !actor.staff {
        return Err(ServiceError::Forbidden(
            "only the ticket participants or staff can add members".into(),
        ));
    }

    platform::deliver(
        "ticket access grant",
        state
            .gateway()
            .grant_channel_access(channel_id.to_owned(), user_id.to_owned()),
    )
    .await;

    info!(channel = channel_id, user = user_id, by = actor.id, "ticket participant added");
    Ok(())
}

/// Close a ticket: persist the record removal, upload the transcript, and
/// schedule the channel deletion.
///
/// Permitted only to the owning tester and the ticketed player. A transcript
/// that fails to render never blocks the close; the summary is posted
/// without it.
pub async fn close(
    state: &SharedState,
    actor: &Actor,
    channel_id: &str,
) -> Result<CloseSummary, ServiceError> {
    let channel = channel_id.to_owned();
    let ticket = state
        .with_document(|doc| {
            let Some(ticket) = doc.tickets.get(&channel) else {
                return Err(ServiceError::NotFound(format!(
                    "no ticket in channel {channel}"
                )));
            };
            if actor.id != ticket.tester_id && actor.id != ticket.player_id {
                return Err(ServiceError::Forbidden(
                    "only the ticket participants can close it".into(),
                ));
            }
            doc.tickets
                .shift_remove(&channel)
                .ok_or_else(|| ServiceError::NotFound(format!("no ticket in channel {channel}")))
        })
        .await?;

    let messages = state
        .ticket_logs()
        .remove(channel_id)
        .map(|(_, messages)| messages)
        .unwrap_or_default();

    let doc = state.document().await;
    let summary = format!(
        "Ticket closed: {} tested by {} in {} ({} message(s))",
        ticket.player_id,
        ticket.tester_id,
        ticket.mode,
        messages.len()
    );

    let mut transcript_uploaded = false;
    if let Some(logs_channel) = doc.config.ticket_logs_channel_id {
        let rendered = transcript::render(&ticket, &messages);
        match transcript::compress(&rendered) {
            Ok(bytes) => {
                platform::deliver(
                    "transcript upload",
                    state.gateway().upload_transcript(
                        logs_channel,
                        TranscriptUpload {
                            file_name: transcript::file_name(&ticket),
                            bytes,
                            summary: summary.clone(),
                        },
                    ),
                )
                .await;
                transcript_uploaded = true;
            }
            Err(err) => {
                warn!(channel = channel_id, error = %err, "transcript rendering failed; closing without it");
            }
        }
    }

    let gateway = state.gateway();
    let doomed = channel_id.to_owned();
    tokio::spawn(async move {
        tokio::time::sleep(CHANNEL_DELETE_GRACE).await;
        platform::deliver("ticket channel delete", gateway.delete_channel(doomed)).await;
    });

    info!(channel = channel_id, by = actor.id, transcript_uploaded, "ticket closed");
    Ok(CloseSummary {
        ticket,
        transcript_uploaded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::recording::Effect;
    use crate::state::testing::state_with_gateway;

    async fn open_ticket(state: &SharedState) -> String {
        state
            .with_document(|doc| {
                doc.config.ticket_category_id = Some(500);
                doc.config.ticket_logs_channel_id = Some(600);
                Ok(())
            })
            .await
            .unwrap();
        let tester = Actor::member("7", "tester#0").as_tester();
        open_for_pull(state, &tester, Mode::Sword, "1")
            .await
            .unwrap()
            .unwrap()
    }

    fn message(content: &str) -> TicketMessage {
        TicketMessage {
            author_id: "1".into(),
            author_name: "steve".into(),
            content: content.into(),
            sent_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn open_requires_a_configured_category() {
        let (state, _gateway, _store) = state_with_gateway().await;
        let tester = Actor::member("7", "tester#0").as_tester();
        let channel = open_for_pull(&state, &tester, Mode::Sword, "1").await.unwrap();
        assert!(channel.is_none());
        assert!(state.document().await.tickets.is_empty());
    }

    #[tokio::test]
    async fn open_survives_channel_creation_failure() {
        let (state, gateway, _store) = state_with_gateway().await;
        state
            .with_document(|doc| {
                doc.config.ticket_category_id = Some(500);
                Ok(())
            })
            .await
            .unwrap();
        gateway.fail_channels();

        let tester = Actor::member("7", "tester#0").as_tester();
        let channel = open_for_pull(&state, &tester, Mode::Sword, "1").await.unwrap();
        assert!(channel.is_none());
    }

    #[tokio::test]
    async fn messages_are_captured_only_for_open_tickets() {
        let (state, _gateway, _store) = state_with_gateway().await;
        let channel = open_ticket(&state).await;

        log_message(&state, &channel, message("hello")).await;
        log_message(&state, "unrelated", message("noise")).await;

        assert_eq!(state.ticket_logs().get(&channel).unwrap().len(), 1);
        assert!(!state.ticket_logs().contains_key("unrelated"));
    }

    #[tokio::test]
    async fn close_is_restricted_to_participants() {
        let (state, _gateway, _store) = state_with_gateway().await;
        let channel = open_ticket(&state).await;

        let stranger = Actor::member("42", "someone#0");
        assert!(matches!(
            close(&state, &stranger, &channel).await,
            Err(ServiceError::Forbidden(_))
        ));

        // Staff can add participants but not close tickets they are not in.
        let staff = Actor::member("999", "staff#0").as_staff();
        add_participant(&state, &staff, &channel, "43").await.unwrap();
        assert!(matches!(
            close(&state, &staff, &channel).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(state.document().await.tickets.contains_key(&channel));

        let player = Actor::member("1", "steve#0");
        let summary = close(&state, &player, &channel).await.unwrap();
        assert_eq!(summary.ticket.player_id, "1");
    }

    #[tokio::test]
    async fn close_uploads_transcript_and_removes_record() {
        let (state, gateway, _store) = state_with_gateway().await;
        let channel = open_ticket(&state).await;
        log_message(&state, &channel, message("fight me")).await;

        let tester = Actor::member("7", "tester#0").as_tester();
        let summary = close(&state, &tester, &channel).await.unwrap();

        assert!(summary.transcript_uploaded);
        assert!(state.document().await.tickets.is_empty());
        assert!(!state.ticket_logs().contains_key(&channel));
        assert_eq!(
            gateway.count(|e| matches!(e, Effect::Transcript(600, _))),
            1
        );
    }

    #[tokio::test]
    async fn close_without_logs_channel_skips_the_upload() {
        let (state, gateway, _store) = state_with_gateway().await;
        let channel = open_ticket(&state).await;
        state
            .with_document(|doc| {
                doc.config.ticket_logs_channel_id = None;
                Ok(())
            })
            .await
            .unwrap();

        let tester = Actor::member("7", "tester#0").as_tester();
        let summary = close(&state, &tester, &channel).await.unwrap();
        assert!(!summary.transcript_uploaded);
        assert_eq!(gateway.count(|e| matches!(e, Effect::Transcript(..))), 0);
    }

    #[tokio::test]
    async fn close_unknown_channel_is_not_found() {
        let (state, _gateway, _store) = state_with_gateway().await;
        let tester = Actor::member("7", "tester#0").as_tester();
        assert!(matches!(
            close(&state, &tester, "nope").await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
