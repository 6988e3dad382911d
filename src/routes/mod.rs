//! HTTP route trees of the read API.

use axum::Router;

use crate::state::SharedState;

/// OpenAPI document route.
pub mod docs;
/// Banner and storage health routes.
pub mod health;
/// Player profile routes.
pub mod player;
/// Leaderboard routes.
pub mod rankings;
/// Aggregate counter routes.
pub mod stats;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(rankings::router())
        .merge(player::router())
        .merge(stats::router())
        .merge(docs::router())
        .with_state(state)
}
