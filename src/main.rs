use std::{sync::Arc, time::Duration};

use axum::Router;
use tokio::net::TcpListener;
use tokio::time::interval;

use beyondrare::{
    api::{create_api_router, AppContext},
    clock::SystemClock,
    config::Config,
    rate_limiter::RateLimiter,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting Beyond Rare engine");

    let config = Config::from_env()?;
    let state = AppState::new(config.clone(), Arc::new(SystemClock));
    let rate_limiter = RateLimiter::new(config.game.clicks_per_second);

    let snapshot_state = state.clone();
    let snapshot_interval = config.game.snapshot_interval_secs;

    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(snapshot_interval));

        loop {
            interval.tick().await;
            let written = snapshot_state.snapshot_all().await;
            if written > 0 {
                tracing::info!("Snapshot sweep wrote {} player snapshots", written);
            }
        }
    });

    let context = AppContext {
        state: state.clone(),
        rate_limiter,
    };

    let app: Router = create_api_router(context);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!("Beyond Rare engine running on http://{}", addr);
    tracing::info!("Click rate limit: {}/s per player", config.game.clicks_per_second);
    tracing::info!("Snapshot sweep every {}s", snapshot_interval);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
