//! Per-mode waitlist queues: joining, leaving, duty toggles, and pulls.
//!
//! Every mutation goes through the shared document lock and is persisted
//! before any panel render, DM, or ticket side effect runs.

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    error::ServiceError,
    platform::{self, Actor, DmNotice, PanelSnapshot},
    services::{cooldown_service, ticket_service},
    state::SharedState,
    state::tiers::{MAX_QUEUE_SIZE, Mode},
};

/// Result of a successful [`pull_next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullOutcome {
    /// Player removed from the head of the queue.
    pub player_id: String,
    /// Ticket channel opened for the session, when one could be created.
    pub ticket_channel: Option<String>,
}

/// Join a mode's queue. Returns the 1-based position.
pub async fn join(state: &SharedState, actor: &Actor, mode: Mode) -> Result<usize, ServiceError> {
    let now = OffsetDateTime::now_utc();
    let position = state
        .with_document(|doc| {
            if !doc.waitlist_mut(mode).active {
                return Err(ServiceError::Closed(mode));
            }
            if doc.waitlist_mut(mode).queue.iter().any(|id| id == &actor.id) {
                return Err(ServiceError::AlreadyQueued(mode));
            }
            if let Some(window) = cooldown_service::active_window(doc, &actor.id, mode, now) {
                return Err(ServiceError::OnCooldown {
                    mode,
                    until: window
                        .end
                        .format(&time::format_description::well_known::Rfc3339)
                        .unwrap_or_else(|_| window.end.to_string()),
                });
            }

            let waitlist = doc.waitlist_mut(mode);
            if waitlist.queue.len() >= MAX_QUEUE_SIZE {
                return Err(ServiceError::QueueFull(mode));
            }
            waitlist.queue.push(actor.id.clone());
            Ok(waitlist.queue.len())
        })
        .await?;

    info!(player = actor.id, %mode, position, "joined waitlist");
    refresh_panel(state, mode).await;
    Ok(position)
}

/// Leave a mode's queue.
pub async fn leave(state: &SharedState, actor: &Actor, mode: Mode) -> Result<(), ServiceError> {
    state
        .with_document(|doc| {
            let waitlist = doc.waitlist_mut(mode);
            let Some(index) = waitlist.queue.iter().position(|id| id == &actor.id) else {
                return Err(ServiceError::NotQueued(mode));
            };
            waitlist.queue.remove(index);
            Ok(())
        })
        .await?;

    info!(player = actor.id, %mode, "left waitlist");
    refresh_panel(state, mode).await;
    Ok(())
}

/// Toggle the actor's on-duty flag for a mode. Returns the new state.
pub async fn toggle_tester(
    state: &SharedState,
    actor: &Actor,
    mode: Mode,
) -> Result<bool, ServiceError> {
    actor.require_tester()?;

    let on_duty = state
        .with_document(|doc| {
            let waitlist = doc.waitlist_mut(mode);
            match waitlist.testers.iter().position(|id| id == &actor.id) {
                Some(index) => {
                    waitlist.testers.remove(index);
                    Ok(false)
                }
                None => {
                    waitlist.testers.push(actor.id.clone());
                    Ok(true)
                }
            }
        })
        .await?;

    info!(tester = actor.id, %mode, on_duty, "tester duty toggled");
    refresh_panel(state, mode).await;
    Ok(on_duty)
}

/// Open or close a mode's waitlist. Staff only. Returns the new state.
///
/// Closing discards the queue and the on-duty tester set; nobody waits in a
/// closed queue.
pub async fn toggle_active(
    state: &SharedState,
    actor: &Actor,
    mode: Mode,
) -> Result<bool, ServiceError> {
    actor.require_staff()?;

    let active = state
        .with_document(|doc| {
            let waitlist = doc.waitlist_mut(mode);
            waitlist.active = !waitlist.active;
            if !waitlist.active {
                waitlist.queue.clear();
                waitlist.testers.clear();
            }
            Ok(waitlist.active)
        })
        .await?;

    info!(staff = actor.id, %mode, active, "waitlist toggled");
    refresh_panel(state, mode).await;
    Ok(active)
}

/// Pull the next player from a mode's queue and open their ticket.
///
/// The pop is persisted before the ticket is attempted, so the pull stands
/// even when no channel can be created; the outcome then reports a missing
/// ticket instead of rolling the queue back.
pub async fn pull_next(
    state: &SharedState,
    actor: &Actor,
    mode: Mode,
) -> Result<PullOutcome, ServiceError> {
    actor.require_tester()?;

    let player_id = state
        .with_document(|doc| {
            let waitlist = doc.waitlist_mut(mode);
            if !waitlist.testers.iter().any(|id| id == &actor.id) {
                return Err(ServiceError::NotOnDuty(mode));
            }
            if waitlist.queue.is_empty() {
                return Err(ServiceError::EmptyQueue(mode));
            }
            Ok(waitlist.queue.remove(0))
        })
        .await?;

    info!(tester = actor.id, player = player_id, %mode, "pulled from waitlist");
    refresh_panel(state, mode).await;

    let ticket_channel = match ticket_service::open_for_pull(state, actor, mode, &player_id).await {
        Ok(channel) => channel,
        Err(err) => {
            warn!(player = player_id, %mode, error = %err, "pull completed without a ticket");
            None
        }
    };

    platform::deliver(
        "pulled dm",
        state.gateway().send_dm(
            player_id.clone(),
            DmNotice::Pulled {
                mode,
                channel_id: ticket_channel.clone(),
            },
        ),
    )
    .await;

    Ok(PullOutcome {
        player_id,
        ticket_channel,
    })
}

/// Post a fresh waitlist panel for a mode and remember its message id.
/// Admin only.
pub async fn create_panel(
    state: &SharedState,
    actor: &Actor,
    mode: Mode,
) -> Result<Option<u64>, ServiceError> {
    actor.require_admin()?;

    let doc = state.document().await;
    let snapshot = panel_snapshot(&doc.waitlists.get(&mode).cloned().unwrap_or_default(), mode, None);

    let message_id = match state.gateway().render_panel(snapshot).await {
        Ok(id) => id,
        Err(err) => {
            warn!(%mode, error = %err, "panel could not be posted");
            return Ok(None);
        }
    };

    state
        .with_document(|doc| {
            doc.panel_messages.insert(mode, message_id);
            Ok(())
        })
        .await?;

    info!(admin = actor.id, %mode, message_id, "panel created");
    Ok(Some(message_id))
}

fn panel_snapshot(
    waitlist: &crate::dao::models::WaitlistEntity,
    mode: Mode,
    message_id: Option<u64>,
) -> PanelSnapshot {
    PanelSnapshot {
        mode,
        active: waitlist.active,
        queue: waitlist.queue.clone(),
        testers: waitlist.testers.clone(),
        message_id,
    }
}

/// Re-render a mode's panel after a queue mutation. Best effort.
pub(crate) async fn refresh_panel(state: &SharedState, mode: Mode) {
    let doc = state.document().await;
    let Some(message_id) = doc.panel_messages.get(&mode).copied() else {
        return;
    };
    let waitlist = doc.waitlists.get(&mode).cloned().unwrap_or_default();
    let snapshot = panel_snapshot(&waitlist, mode, Some(message_id));

    let render = state.gateway().render_panel(snapshot);
    platform::deliver("panel render", Box::pin(async move { render.await.map(|_| ()) })).await;
}
