//! Tierlist bans: permanent for cheating, 30 days for alt accounts.

use time::{Duration, OffsetDateTime};
use tracing::info;

use crate::{
    dao::models::{BanReason, PunishmentEntity, TempBanEntity},
    error::ServiceError,
    platform::{self, Actor, DmNotice},
    state::SharedState,
    state::tiers::TEMP_BAN_DAYS,
};

/// Input for [`ban`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanRequest {
    /// Player to ban.
    pub player_id: String,
    /// Minecraft nickname, recorded in the punishment log.
    pub nick_mc: String,
    /// Why the player is banned; decides permanent vs temporary.
    pub reason: BanReason,
    /// Link to the evidence.
    pub evidence: String,
}

/// Everything the staff overview lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanOverview {
    /// Full punishment log, oldest first.
    pub punishments: Vec<PunishmentEntity>,
    /// Live temporary bans keyed by player id.
    pub temporary: Vec<(String, TempBanEntity)>,
}

/// Ban a player from the tierlist. Staff only.
///
/// Cheaters are banned permanently; alt accounts for a fixed 30 days with an
/// entry in the expiry index the hourly sweep clears. Either way the
/// punishment log gets an immutable entry and the player loses their tier
/// roles.
pub async fn ban(
    state: &SharedState,
    actor: &Actor,
    request: BanRequest,
) -> Result<PunishmentEntity, ServiceError> {
    actor.require_staff()?;

    let now = OffsetDateTime::now_utc();
    let permanent = matches!(request.reason, BanReason::Chiter);
    let ends_at = (!permanent).then(|| now + Duration::days(TEMP_BAN_DAYS));

    let entry = PunishmentEntity {
        nick_mc: request.nick_mc.clone(),
        player_id: request.player_id.clone(),
        reason: request.reason,
        evidence: request.evidence,
        permanent,
        ends_at,
        staff_id: actor.id.clone(),
        issued_at: now,
    };

    let persisted = entry.clone();
    state
        .with_document(move |doc| {
            if let Some(ends_at) = persisted.ends_at {
                doc.temp_bans.insert(
                    persisted.player_id.clone(),
                    TempBanEntity {
                        nick_mc: persisted.nick_mc.clone(),
                        ends_at,
                        reason: persisted.reason,
                    },
                );
            }
            doc.punishments.push(persisted);
            Ok(())
        })
        .await?;

    info!(
        player = entry.player_id,
        reason = ?entry.reason,
        permanent,
        staff = actor.id,
        "player banned"
    );

    let gateway = state.gateway();
    platform::deliver("ban role clear", gateway.clear_tier_roles(entry.player_id.clone())).await;
    platform::deliver(
        "ban dm",
        gateway.send_dm(
            entry.player_id.clone(),
            DmNotice::Banned {
                reason: entry.reason,
                ends_at: entry.ends_at,
            },
        ),
    )
    .await;

    Ok(entry)
}

/// Remove expired temporary bans and tell the affected players.
///
/// Returns the number of bans lifted. The punishment log keeps its entries;
/// only the live index shrinks.
pub async fn sweep(state: &SharedState) -> Result<usize, ServiceError> {
    let now = OffsetDateTime::now_utc();
    let lifted = state
        .with_document(move |doc| {
            let mut lifted = Vec::new();
            doc.temp_bans.retain(|player_id, ban| {
                if now >= ban.ends_at {
                    lifted.push(player_id.clone());
                    false
                } else {
                    true
                }
            });
            Ok(lifted)
        })
        .await?;

    for player_id in &lifted {
        platform::deliver(
            "ban-lifted dm",
            state.gateway().send_dm(player_id.clone(), DmNotice::BanLifted),
        )
        .await;
    }

    Ok(lifted.len())
}

/// Punishment log plus the live temporary bans. Staff only.
pub async fn active_bans(state: &SharedState, actor: &Actor) -> Result<BanOverview, ServiceError> {
    actor.require_staff()?;

    let doc = state.document().await;
    Ok(BanOverview {
        punishments: doc.punishments.clone(),
        temporary: doc
            .temp_bans
            .iter()
            .map(|(id, ban)| (id.clone(), ban.clone()))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::recording::Effect;
    use crate::state::testing::state_with_gateway;

    fn staff() -> Actor {
        Actor::member("999", "staff#0").as_staff()
    }

    fn request(reason: BanReason) -> BanRequest {
        BanRequest {
            player_id: "1".into(),
            nick_mc: "Steve".into(),
            reason,
            evidence: "https://example.com/clip".into(),
        }
    }

    #[tokio::test]
    async fn chiter_bans_are_permanent() {
        let (state, gateway, _store) = state_with_gateway().await;
        let entry = ban(&state, &staff(), request(BanReason::Chiter)).await.unwrap();

        assert!(entry.permanent);
        assert!(entry.ends_at.is_none());
        let doc = state.document().await;
        assert_eq!(doc.punishments.len(), 1);
        assert!(doc.temp_bans.is_empty());
        assert_eq!(gateway.count(|e| matches!(e, Effect::RoleClear(_))), 1);
    }

    #[tokio::test]
    async fn alt_bans_expire_after_thirty_days() {
        let (state, _gateway, _store) = state_with_gateway().await;
        let entry = ban(&state, &staff(), request(BanReason::Alt)).await.unwrap();

        assert!(!entry.permanent);
        let ends_at = entry.ends_at.unwrap();
        let expected = entry.issued_at + Duration::days(TEMP_BAN_DAYS);
        assert_eq!(ends_at, expected);
        assert!(state.document().await.temp_bans.contains_key("1"));
    }

    #[tokio::test]
    async fn ban_requires_staff() {
        let (state, _gateway, _store) = state_with_gateway().await;
        let member = Actor::member("1", "m#0");
        let outcome = ban(&state, &member, request(BanReason::Alt)).await;
        assert!(matches!(outcome, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn sweep_lifts_only_expired_bans() {
        let (state, gateway, _store) = state_with_gateway().await;
        let now = OffsetDateTime::now_utc();
        state
            .with_document(|doc| {
                doc.temp_bans.insert(
                    "1".into(),
                    TempBanEntity {
                        nick_mc: "Steve".into(),
                        ends_at: now - Duration::hours(1),
                        reason: BanReason::Alt,
                    },
                );
                doc.temp_bans.insert(
                    "2".into(),
                    TempBanEntity {
                        nick_mc: "Alex".into(),
                        ends_at: now + Duration::days(3),
                        reason: BanReason::Alt,
                    },
                );
                Ok(())
            })
            .await
            .unwrap();

        let lifted = sweep(&state).await.unwrap();
        assert_eq!(lifted, 1);

        let doc = state.document().await;
        assert!(!doc.temp_bans.contains_key("1"));
        assert!(doc.temp_bans.contains_key("2"));
        assert_eq!(
            gateway.effects(),
            vec![Effect::Dm("1".into(), DmNotice::BanLifted)]
        );
    }

    #[tokio::test]
    async fn overview_reports_log_and_live_index() {
        let (state, _gateway, _store) = state_with_gateway().await;
        ban(&state, &staff(), request(BanReason::Alt)).await.unwrap();

        let overview = active_bans(&state, &staff()).await.unwrap();
        assert_eq!(overview.punishments.len(), 1);
        assert_eq!(overview.temporary.len(), 1);
    }
}
