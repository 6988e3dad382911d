//! Read-side projections for the public HTTP API.
//!
//! Every request loads a fresh snapshot through the store and never touches
//! the document lock, so a stuck write can never stall a read.

use std::str::FromStr;

use indexmap::IndexMap;
use tracing::warn;

use crate::{
    dao::models::TierDocument,
    dto::{
        health::HealthResponse,
        player::{PlayerProfile, TierStanding},
        rankings::{ModeStanding, RankedPlayer, RankingsResponse},
        stats::StatsResponse,
    },
    error::ServiceError,
    state::SharedState,
    state::tiers::Mode,
};

/// Mode segment selecting the overall leaderboard.
const OVERALL: &str = "overall";

async fn load_snapshot(state: &SharedState) -> Result<TierDocument, ServiceError> {
    let store = state.store().await.ok_or(ServiceError::Degraded)?;
    let document = store.load().await?;
    Ok(document.unwrap_or_default())
}

/// Rankings for `overall` or a single mode.
///
/// Storage failures and unknown modes both degrade to an empty list; the
/// frontend renders an empty table instead of an error page.
pub async fn rankings(state: &SharedState, segment: &str) -> RankingsResponse {
    let doc = match load_snapshot(state).await {
        Ok(doc) => doc,
        Err(err) => {
            warn!(segment, error = %err, "rankings degraded to empty");
            return RankingsResponse::empty(segment);
        }
    };

    let mode = if segment == OVERALL {
        None
    } else {
        match Mode::from_str(segment) {
            Ok(mode) => Some(mode),
            Err(_) => return RankingsResponse::empty(segment),
        }
    };

    let mut players: Vec<RankedPlayer> = doc
        .players
        .iter()
        .filter_map(|(id, player)| {
            let mut modalidades = IndexMap::new();
            for (mode, tier) in &player.tier_by_mode {
                let puntos = player.points_by_mode.get(mode).copied().unwrap_or(0);
                modalidades.insert(
                    mode.label().to_owned(),
                    ModeStanding {
                        tier: tier.label().to_owned(),
                        tier_display: tier.label().to_owned(),
                        puntos,
                    },
                );
            }

            let mode_points = match mode {
                None => player.total_points,
                Some(mode) => match player.points_by_mode.get(&mode) {
                    Some(points) => *points,
                    None => return None,
                },
            };

            let name = if player.nick_mc.is_empty() {
                player.discord_name.clone()
            } else {
                player.nick_mc.clone()
            };

            Some(RankedPlayer {
                id: id.clone(),
                name,
                points: player.total_points,
                mode_points,
                es_premium: player.es_premium.label().to_owned(),
                modalidades,
            })
        })
        .collect();

    players.sort_by(|a, b| b.mode_points.cmp(&a.mode_points));

    RankingsResponse {
        mode: segment.to_owned(),
        total_players: players.len(),
        players,
    }
}

/// Profile and leaderboard position for one player.
pub async fn player_profile(
    state: &SharedState,
    player_id: &str,
) -> Result<PlayerProfile, ServiceError> {
    let doc = load_snapshot(state).await?;
    let player = doc
        .players
        .get(player_id)
        .ok_or_else(|| ServiceError::NotFound("Player not found".to_owned()))?;

    let position = 1 + doc
        .players
        .values()
        .filter(|other| other.total_points > player.total_points)
        .count();

    let mut tiers = IndexMap::new();
    for (mode, tier) in &player.tier_by_mode {
        tiers.insert(
            mode.label().to_owned(),
            TierStanding {
                tier: tier.label().to_owned(),
                puntos: player.points_by_mode.get(mode).copied().unwrap_or(0),
            },
        );
    }

    Ok(PlayerProfile {
        id: player_id.to_owned(),
        nick: player.nick_mc.clone(),
        discord_name: player.discord_name.clone(),
        position,
        total_points: player.total_points,
        tiers,
        es_premium: player.es_premium.label().to_owned(),
    })
}

/// Aggregate counters for the stats widget.
pub async fn stats(state: &SharedState) -> Result<StatsResponse, ServiceError> {
    let doc = load_snapshot(state).await?;
    Ok(StatsResponse {
        total_tests: doc.results.len(),
        total_players: doc.players.len(),
    })
}

/// Health payload: counts recorded tests through the store, reporting an
/// error payload when storage is unreachable.
pub async fn health(state: &SharedState) -> HealthResponse {
    match load_snapshot(state).await {
        Ok(doc) => HealthResponse::ok(doc.results.len() as u64),
        Err(err) => {
            warn!(error = %err, "health check failed");
            HealthResponse::error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::Premium;
    use crate::platform::Actor;
    use crate::services::result_service::{self, RecordRequest};
    use crate::state::testing::state_with_gateway;
    use crate::state::tiers::Tier;

    async fn seed(state: &SharedState) {
        let tester = Actor::member("7", "tester#0").as_tester();
        for (id, nick, mode, tier) in [
            ("1", "Steve", Mode::Sword, Tier::Ht1),
            ("1", "Steve", Mode::Uhc, Tier::Lt5),
            ("2", "Alex", Mode::Sword, Tier::Ht3),
            ("3", "Herobrine", Mode::Uhc, Tier::Ht2),
        ] {
            result_service::record(
                state,
                &tester,
                RecordRequest {
                    player_id: id.into(),
                    player_name: format!("{nick}#0"),
                    nick_mc: nick.into(),
                    premium: Premium::No,
                    mode,
                    tier,
                },
            )
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn overall_rankings_sort_by_total_points() {
        let (state, _gateway, _store) = state_with_gateway().await;
        seed(&state).await;

        let response = rankings(&state, "overall").await;
        assert_eq!(response.total_players, 3);
        let names: Vec<&str> = response.players.iter().map(|p| p.name.as_str()).collect();
        // Steve 11, Herobrine 8, Alex 6.
        assert_eq!(names, vec!["Steve", "Herobrine", "Alex"]);
        assert_eq!(response.players[0].points, 11);
    }

    #[tokio::test]
    async fn mode_rankings_exclude_untested_players() {
        let (state, _gateway, _store) = state_with_gateway().await;
        seed(&state).await;

        let response = rankings(&state, "Sword").await;
        assert_eq!(response.total_players, 2);
        assert_eq!(response.players[0].name, "Steve");
        assert_eq!(response.players[0].mode_points, 10);
        assert_eq!(response.players[1].mode_points, 6);
    }

    #[tokio::test]
    async fn unknown_mode_yields_an_empty_list() {
        let (state, _gateway, _store) = state_with_gateway().await;
        seed(&state).await;

        let response = rankings(&state, "Bedwars").await;
        assert_eq!(response.total_players, 0);
        assert!(response.players.is_empty());
    }

    #[tokio::test]
    async fn rankings_degrade_to_empty_without_storage() {
        let (state, _gateway, store) = state_with_gateway().await;
        seed(&state).await;
        store.set_healthy(false);

        let response = rankings(&state, "overall").await;
        assert!(response.players.is_empty());
    }

    #[tokio::test]
    async fn profile_reports_position_with_standard_competition_ranking() {
        let (state, _gateway, _store) = state_with_gateway().await;
        seed(&state).await;

        let profile = player_profile(&state, "2").await.unwrap();
        assert_eq!(profile.position, 3);
        assert_eq!(profile.total_points, 6);
        assert_eq!(profile.tiers["Sword"].tier, "HT3");

        assert_eq!(player_profile(&state, "1").await.unwrap().position, 1);
    }

    #[tokio::test]
    async fn unknown_player_is_not_found() {
        let (state, _gateway, _store) = state_with_gateway().await;
        let outcome = player_profile(&state, "missing").await;
        assert!(matches!(outcome, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn stats_count_results_and_players() {
        let (state, _gateway, _store) = state_with_gateway().await;
        seed(&state).await;

        let stats = stats(&state).await.unwrap();
        assert_eq!(stats.total_tests, 4);
        assert_eq!(stats.total_players, 3);
    }

    #[tokio::test]
    async fn health_reports_error_without_storage() {
        let (state, _gateway, store) = state_with_gateway().await;
        assert_eq!(health(&state).await.status, "ok");

        store.set_healthy(false);
        let response = health(&state).await;
        assert_eq!(response.status, "error");
        assert_eq!(response.database.as_deref(), Some("disconnected"));
    }
}
