//! Per-player, per-mode cooldown ledger.
//!
//! Cooldowns expire lazily on the next check and eagerly through the hourly
//! sweep; both paths share [`CooldownWindow::expired`].

use time::{Duration, OffsetDateTime};
use tracing::info;

use crate::{
    dao::models::{CooldownSlot, CooldownWindow, TierDocument},
    error::ServiceError,
    platform::{self, Actor, DmNotice},
    state::SharedState,
    state::tiers::{COOLDOWN_DAYS, Mode},
};

/// One live cooldown, as listed by the staff summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownSummary {
    /// Player the cooldown applies to.
    pub player_id: String,
    /// Mode the player is locked out of.
    pub mode: Mode,
    /// When the window ends.
    pub ends_at: OffsetDateTime,
}

/// Active window for a player in one mode, expiring stale entries in place.
///
/// Expired windows are removed as a side effect, and a player entry whose
/// last window expired is removed entirely, so the ledger never accumulates
/// dead entries.
pub(crate) fn active_window(
    doc: &mut TierDocument,
    player_id: &str,
    mode: Mode,
    now: OffsetDateTime,
) -> Option<CooldownWindow> {
    // Legacy slots are migrated at load; one surviving here still honors the
    // shared expiry predicate for every mode.
    let window = match doc.cooldowns.get(player_id)? {
        CooldownSlot::Legacy(window) => window.clone(),
        CooldownSlot::PerMode(map) => map.get(&mode)?.clone(),
    };

    if !window.expired(now) {
        return Some(window);
    }

    let mut drop_player = true;
    if let Some(CooldownSlot::PerMode(map)) = doc.cooldowns.get_mut(player_id) {
        map.shift_remove(&mode);
        drop_player = map.is_empty();
    }
    if drop_player {
        doc.cooldowns.shift_remove(player_id);
    }
    None
}

/// Start (or restart) the fixed-length cooldown for a player in one mode.
pub(crate) fn start_cooldown(
    doc: &mut TierDocument,
    player_id: &str,
    mode: Mode,
    now: OffsetDateTime,
) {
    let window = CooldownWindow {
        start: now,
        end: now + Duration::days(COOLDOWN_DAYS),
    };

    let slot = doc
        .cooldowns
        .entry(player_id.to_owned())
        .or_insert_with(|| CooldownSlot::PerMode(Default::default()));
    if let CooldownSlot::Legacy(_) = slot {
        *slot = CooldownSlot::PerMode(Default::default());
    }
    if let Some(map) = slot.per_mode_mut() {
        map.insert(mode, window);
    }
}

/// Clear a player's cooldown in one mode, or in every mode.
///
/// Staff only. The player is told which modes reopened.
pub async fn clear(
    state: &SharedState,
    actor: &Actor,
    player_id: &str,
    mode: Option<Mode>,
) -> Result<Vec<Mode>, ServiceError> {
    actor.require_staff()?;

    let player = player_id.to_owned();
    let cleared = state
        .with_document(move |doc| {
            if !doc.cooldowns.contains_key(&player) {
                return Err(ServiceError::NotFound(format!(
                    "no cooldowns for player {player}"
                )));
            }

            // Unmigrated legacy slot: clearing anything clears it whole.
            if matches!(doc.cooldowns.get(&player), Some(CooldownSlot::Legacy(_))) {
                doc.cooldowns.shift_remove(&player);
                return Ok(crate::state::tiers::ALL_MODES.to_vec());
            }

            let mut now_empty = false;
            let cleared: Vec<Mode> = match doc.cooldowns.get_mut(&player) {
                Some(CooldownSlot::PerMode(map)) => {
                    let cleared = match mode {
                        Some(mode) => map.shift_remove(&mode).map(|_| mode).into_iter().collect(),
                        None => map.drain(..).map(|(mode, _)| mode).collect(),
                    };
                    now_empty = map.is_empty();
                    cleared
                }
                _ => Vec::new(),
            };

            if cleared.is_empty() {
                return Err(ServiceError::NotFound(format!(
                    "no matching cooldown for player {player}"
                )));
            }
            if now_empty {
                doc.cooldowns.shift_remove(&player);
            }
            Ok(cleared)
        })
        .await?;

    info!(player_id, ?cleared, staff = actor.id, "cooldowns cleared");
    platform::deliver(
        "cooldown-cleared dm",
        state.gateway().send_dm(
            player_id.to_owned(),
            DmNotice::CooldownCleared {
                modes: cleared.clone(),
            },
        ),
    )
    .await;

    Ok(cleared)
}

/// List every live cooldown, soonest expiry first.
pub async fn active_cooldowns(
    state: &SharedState,
    actor: &Actor,
) -> Result<Vec<CooldownSummary>, ServiceError> {
    actor.require_staff()?;

    let doc = state.document().await;
    let now = OffsetDateTime::now_utc();
    let mut summaries = Vec::new();
    for (player_id, slot) in &doc.cooldowns {
        match slot {
            CooldownSlot::PerMode(map) => {
                for (mode, window) in map {
                    if !window.expired(now) {
                        summaries.push(CooldownSummary {
                            player_id: player_id.clone(),
                            mode: *mode,
                            ends_at: window.end,
                        });
                    }
                }
            }
            CooldownSlot::Legacy(_) => {}
        }
    }
    summaries.sort_by_key(|s| s.ends_at);
    Ok(summaries)
}

/// Remove every expired window and notify the affected players.
///
/// Returns the number of windows that expired.
pub async fn sweep(state: &SharedState) -> Result<usize, ServiceError> {
    let now = OffsetDateTime::now_utc();
    let expired = state
        .with_document(move |doc| {
            let mut expired: Vec<(String, Mode)> = Vec::new();
            doc.cooldowns.retain(|player_id, slot| match slot {
                CooldownSlot::PerMode(map) => {
                    map.retain(|mode, window| {
                        if window.expired(now) {
                            expired.push((player_id.clone(), *mode));
                            false
                        } else {
                            true
                        }
                    });
                    !map.is_empty()
                }
                CooldownSlot::Legacy(window) => !window.expired(now),
            });
            Ok(expired)
        })
        .await?;

    for (player_id, mode) in &expired {
        platform::deliver(
            "cooldown-expired dm",
            state
                .gateway()
                .send_dm(player_id.clone(), DmNotice::CooldownExpired { mode: *mode }),
        )
        .await;
    }

    Ok(expired.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::recording::Effect;
    use crate::state::testing::state_with_gateway;

    fn staff() -> Actor {
        Actor::member("900", "staff#0").as_staff()
    }

    #[tokio::test]
    async fn window_expires_exactly_at_end() {
        let now = OffsetDateTime::now_utc();
        let window = CooldownWindow {
            start: now - Duration::days(COOLDOWN_DAYS),
            end: now,
        };
        assert!(window.expired(now));
        assert!(!window.expired(now - Duration::seconds(1)));
    }

    #[tokio::test]
    async fn restart_overwrites_the_running_window() {
        let mut doc = TierDocument::default();
        let now = OffsetDateTime::now_utc();

        start_cooldown(&mut doc, "1", Mode::Sword, now - Duration::days(5));
        start_cooldown(&mut doc, "1", Mode::Sword, now);

        let window = active_window(&mut doc, "1", Mode::Sword, now).unwrap();
        assert_eq!(window.end, now + Duration::days(COOLDOWN_DAYS));
    }

    #[tokio::test]
    async fn cooldown_in_one_mode_leaves_other_modes_open() {
        let mut doc = TierDocument::default();
        let now = OffsetDateTime::now_utc();

        start_cooldown(&mut doc, "1", Mode::Sword, now);

        assert!(active_window(&mut doc, "1", Mode::Uhc, now).is_none());
        assert!(active_window(&mut doc, "1", Mode::Axe, now).is_none());
        // The Sword window is untouched by the cross-mode checks.
        assert!(active_window(&mut doc, "1", Mode::Sword, now).is_some());
    }

    #[tokio::test]
    async fn expired_check_removes_emptied_player_entry() {
        let mut doc = TierDocument::default();
        let now = OffsetDateTime::now_utc();

        start_cooldown(&mut doc, "1", Mode::Uhc, now - Duration::days(COOLDOWN_DAYS + 1));
        assert!(active_window(&mut doc, "1", Mode::Uhc, now).is_none());
        assert!(!doc.cooldowns.contains_key("1"));
    }

    #[tokio::test]
    async fn clear_notifies_player_and_drops_entry() {
        let (state, gateway, _store) = state_with_gateway().await;
        let now = OffsetDateTime::now_utc();
        state
            .with_document(|doc| {
                start_cooldown(doc, "1", Mode::Sword, now);
                start_cooldown(doc, "1", Mode::Axe, now);
                Ok(())
            })
            .await
            .unwrap();

        let cleared = clear(&state, &staff(), "1", None).await.unwrap();
        assert_eq!(cleared.len(), 2);
        assert!(!state.document().await.cooldowns.contains_key("1"));
        assert_eq!(
            gateway.count(|e| matches!(e, Effect::Dm(_, DmNotice::CooldownCleared { .. }))),
            1
        );
    }

    #[tokio::test]
    async fn clear_requires_staff() {
        let (state, _gateway, _store) = state_with_gateway().await;
        let member = Actor::member("1", "m#0");
        let outcome = clear(&state, &member, "1", None).await;
        assert!(matches!(outcome, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn sweep_notifies_and_removes_expired_windows() {
        let (state, gateway, _store) = state_with_gateway().await;
        let now = OffsetDateTime::now_utc();
        state
            .with_document(|doc| {
                start_cooldown(doc, "1", Mode::Sword, now - Duration::days(COOLDOWN_DAYS + 2));
                start_cooldown(doc, "2", Mode::Uhc, now);
                Ok(())
            })
            .await
            .unwrap();

        let expired = sweep(&state).await.unwrap();
        assert_eq!(expired, 1);

        let doc = state.document().await;
        assert!(!doc.cooldowns.contains_key("1"));
        assert!(doc.cooldowns.contains_key("2"));
        assert_eq!(
            gateway.effects(),
            vec![Effect::Dm(
                "1".into(),
                DmNotice::CooldownExpired { mode: Mode::Sword }
            )]
        );
    }
}
