//! Test result recording and tester leaderboards.

use time::OffsetDateTime;
use tracing::info;

use crate::{
    dao::models::{PlayerEntity, Premium, ResultEntity},
    error::ServiceError,
    platform::{self, Actor, DmNotice, ResultAnnouncement},
    services::cooldown_service,
    state::SharedState,
    state::tiers::{ALL_MODES, Mode, Tier},
};

/// Upper bound on a single statistics backfill.
const MAX_BACKFILL: u32 = 1000;

/// Input for [`record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRequest {
    /// Tested player's platform id.
    pub player_id: String,
    /// Tested player's display name.
    pub player_name: String,
    /// Minecraft nickname used in game.
    pub nick_mc: String,
    /// Whether the account is premium.
    pub premium: Premium,
    /// Mode that was tested.
    pub mode: Mode,
    /// Tier the tester awarded.
    pub tier: Tier,
}

/// Record a completed test.
///
/// Per-mode points are replaced by the new tier's value, never accumulated;
/// the total is always the sum of the per-mode points. The immutable result
/// entry, the updated aggregates, and the player's new cooldown are persisted
/// in one write, then the role swap, DM, and public announcement are
/// delivered best effort.
pub async fn record(
    state: &SharedState,
    actor: &Actor,
    request: RecordRequest,
) -> Result<ResultEntity, ServiceError> {
    actor.require_tester()?;

    let now = OffsetDateTime::now_utc();
    let req = request.clone();
    let tester_id = actor.id.clone();
    let tester_name = actor.display_name.clone();

    let result = state
        .with_document(move |doc| {
            let player = doc
                .players
                .entry(req.player_id.clone())
                .or_insert_with(|| PlayerEntity {
                    nick_mc: req.nick_mc.clone(),
                    discord_name: req.player_name.clone(),
                    points_by_mode: Default::default(),
                    tier_by_mode: Default::default(),
                    total_points: 0,
                    es_premium: req.premium,
                });
            player.nick_mc = req.nick_mc.clone();
            player.discord_name = req.player_name.clone();
            player.es_premium = req.premium;

            let previous_tier = player.tier_by_mode.get(&req.mode).copied();
            player.tier_by_mode.insert(req.mode, req.tier);
            player.points_by_mode.insert(req.mode, req.tier.points());
            player.recompute_total();
            let total_points = player.total_points;

            let result = ResultEntity {
                nick_mc: req.nick_mc,
                player_id: req.player_id.clone(),
                player_name: req.player_name,
                tester_id,
                tester_name,
                mode: req.mode,
                previous_tier,
                new_tier: req.tier,
                points_awarded: req.tier.points(),
                total_points,
                recorded_at: now,
            };
            doc.results.push(result.clone());

            cooldown_service::start_cooldown(doc, &req.player_id, req.mode, now);
            Ok(result)
        })
        .await?;

    info!(
        player = result.player_id,
        tester = actor.id,
        mode = %result.mode,
        tier = %result.new_tier,
        "result recorded"
    );

    let gateway = state.gateway();
    platform::deliver(
        "tier role swap",
        gateway.swap_tier_role(
            result.player_id.clone(),
            result.mode,
            result.previous_tier,
            result.new_tier,
        ),
    )
    .await;
    platform::deliver(
        "result dm",
        gateway.send_dm(
            result.player_id.clone(),
            DmNotice::ResultRecorded {
                mode: result.mode,
                tier: result.new_tier,
                points: result.points_awarded,
                total: result.total_points,
            },
        ),
    )
    .await;

    if let Some(channel_id) = state.document().await.config.results_channel_id {
        platform::deliver(
            "result announcement",
            gateway.announce_result(
                channel_id,
                ResultAnnouncement {
                    nick_mc: result.nick_mc.clone(),
                    player_id: result.player_id.clone(),
                    mode: result.mode,
                    previous_tier: result.previous_tier,
                    new_tier: result.new_tier,
                    total_points: result.total_points,
                },
            ),
        )
        .await;
    }

    Ok(result)
}

/// Delete every result recorded by one tester. Staff only.
///
/// Player aggregates are deliberately left untouched; this cleans the tester
/// leaderboard, not the tierlist.
pub async fn purge_tester(
    state: &SharedState,
    actor: &Actor,
    tester_id: &str,
) -> Result<usize, ServiceError> {
    actor.require_staff()?;

    let target = tester_id.to_owned();
    let removed = state
        .with_document(move |doc| {
            let before = doc.results.len();
            doc.results.retain(|result| result.tester_id != target);
            Ok(before - doc.results.len())
        })
        .await?;

    info!(tester = tester_id, removed, staff = actor.id, "tester results purged");
    Ok(removed)
}

/// Testers ranked by number of recorded tests, most active first.
///
/// Ties keep their first-seen order.
pub async fn top_testers(state: &SharedState) -> Vec<(String, usize)> {
    let doc = state.document().await;
    let mut counts: indexmap::IndexMap<String, usize> = Default::default();
    for result in &doc.results {
        *counts.entry(result.tester_id.clone()).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Append synthetic results so a tester's historical count survives a data
/// reset. Admin only.
///
/// Synthetic entries carry no points and reference no real player, so the
/// tierlist aggregates never move.
pub async fn backfill_tester(
    state: &SharedState,
    actor: &Actor,
    tester_id: &str,
    tester_name: &str,
    count: u32,
) -> Result<usize, ServiceError> {
    actor.require_admin()?;
    if count == 0 || count > MAX_BACKFILL {
        return Err(ServiceError::InvalidInput(format!(
            "backfill count must be between 1 and {MAX_BACKFILL}"
        )));
    }

    let now = OffsetDateTime::now_utc();
    let tester_id = tester_id.to_owned();
    let tester_name = tester_name.to_owned();
    let added = state
        .with_document(move |doc| {
            for i in 0..count {
                let mode = ALL_MODES[(i as usize) % ALL_MODES.len()];
                doc.results.push(ResultEntity {
                    nick_mc: "backfill".to_owned(),
                    player_id: "0".to_owned(),
                    player_name: "backfill".to_owned(),
                    tester_id: tester_id.clone(),
                    tester_name: tester_name.clone(),
                    mode,
                    previous_tier: None,
                    new_tier: Tier::Lt5,
                    points_awarded: 0,
                    total_points: 0,
                    recorded_at: now,
                });
            }
            Ok(count as usize)
        })
        .await?;

    info!(tester = %actor.id, added, "tester statistics backfilled");
    Ok(added)
}
