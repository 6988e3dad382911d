//! Tierlist Back binary entrypoint wiring the read API, the background
//! workers, and the storage supervisor.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{Router, http::HeaderValue};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tierlist_back::{
    config::AppConfig,
    dao::tier_store::open_store,
    platform::NullGateway,
    routes,
    services::{storage_supervisor, sweeper},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("loading configuration")?;
    let port = config.port;
    let allowed_origin = config.allowed_origin.clone();
    let database_url = config.database_url.clone();

    let app_state = AppState::new(config, Arc::new(NullGateway));

    tokio::spawn(storage_supervisor::run(app_state.clone(), move || {
        let url = database_url.clone();
        async move { open_store(&url).await }
    }));
    tokio::spawn(sweeper::run(app_state.clone()));

    let app = build_router(app_state, &allowed_origin);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState, allowed_origin: &str) -> Router<()> {
    // The read API is consumed by one known frontend; fall back to a
    // permissive layer only when the configured origin cannot be parsed.
    let cors = match allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new().allow_origin(origin).allow_methods(Any),
        Err(_) => CorsLayer::permissive(),
    };

    routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
