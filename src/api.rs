use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Sse,
    routing::{get, post},
    Json, Router,
};
use futures_util::stream::{self, Stream};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::{
    errors::GameError,
    leaderboard::Period,
    rate_limiter::{rate_limit_middleware, RateLimiter},
    state::AppState,
};

#[derive(Clone)]
pub struct AppContext {
    pub state: AppState,
    pub rate_limiter: RateLimiter,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    username: Option<String>,
}

#[derive(Deserialize)]
pub struct ClickRequest {
    #[serde(default = "default_manual")]
    manual: bool,
}

fn default_manual() -> bool {
    true
}

#[derive(Deserialize)]
pub struct PurchaseRequest {
    item_id: String,
}

#[derive(Deserialize)]
pub struct BackgroundRequest {
    name: String,
}

#[derive(Deserialize)]
pub struct SkinRequest {
    skin_id: String,
}

#[derive(Deserialize)]
pub struct BoardQuery {
    limit: Option<usize>,
}

type ApiError = (StatusCode, Json<Value>);

fn into_api_error(err: GameError) -> ApiError {
    let status = match err {
        GameError::Validation(_) => StatusCode::BAD_REQUEST,
        GameError::Conflict(_) => StatusCode::CONFLICT,
        GameError::NotFound(_) => StatusCode::NOT_FOUND,
    };
    (status, Json(json!({ "error": err.to_string() })))
}

pub fn create_api_router(context: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            context
                .state
                .config
                .server
                .cors_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect::<Vec<_>>(),
        )
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::HeaderName::from_static("x-player-id"),
            axum::http::header::CACHE_CONTROL,
        ])
        .allow_credentials(true);

    Router::new()
        .route("/players", post(register_player))
        .route("/players/{player_id}/clicks", post(record_click))
        .route("/players/{player_id}/purchases", post(purchase_item))
        .route("/players/{player_id}/backgrounds", post(purchase_background))
        .route("/players/{player_id}/skins", post(purchase_skin))
        .route("/players/{player_id}/progress", get(get_progress))
        .route("/players/{player_id}/challenges", get(get_challenges))
        .route("/players/{player_id}/challenges/history", get(get_challenge_history))
        .route("/players/{player_id}/challenges/claim", post(claim_challenge_reward))
        .route("/players/{player_id}/streak", get(get_streak))
        .route("/players/{player_id}/streak/claim", post(claim_streak))
        .route("/players/{player_id}/achievements", get(get_achievements))
        .route(
            "/players/{player_id}/achievements/{achievement_id}/ack",
            post(acknowledge_achievement),
        )
        .route("/players/{player_id}/achievements/ack", post(acknowledge_all))
        .route("/players/{player_id}/rank/{period}", get(get_rank))
        .route("/leaderboard/{period}", get(get_leaderboard))
        .route("/events", get(sse_handler))
        .route("/health", get(health_check))
        .layer(axum::middleware::from_fn(rate_limit_middleware))
        .layer(axum::Extension(context.rate_limiter.clone()))
        .layer(cors)
        .with_state(context)
}

async fn register_player(
    State(context): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Value>, ApiError> {
    let player = context
        .state
        .register_player(req.username)
        .await
        .map_err(into_api_error)?;

    Ok(Json(json!({
        "player_id": player.id,
        "username": player.username,
        "created_at": player.created_at
    })))
}

async fn record_click(
    State(context): State<AppContext>,
    Path(player_id): Path<Uuid>,
    Json(req): Json<ClickRequest>,
) -> Result<Json<Value>, ApiError> {
    let outcome = context
        .state
        .record_click(player_id, req.manual)
        .await
        .map_err(into_api_error)?;
    Ok(Json(json!(outcome)))
}

async fn purchase_item(
    State(context): State<AppContext>,
    Path(player_id): Path<Uuid>,
    Json(req): Json<PurchaseRequest>,
) -> Result<Json<Value>, ApiError> {
    let outcome = context
        .state
        .purchase_item(player_id, &req.item_id)
        .await
        .map_err(into_api_error)?;
    Ok(Json(json!(outcome)))
}

async fn purchase_background(
    State(context): State<AppContext>,
    Path(player_id): Path<Uuid>,
    Json(req): Json<BackgroundRequest>,
) -> Result<Json<Value>, ApiError> {
    let completion = context
        .state
        .purchase_background(player_id, &req.name)
        .await
        .map_err(into_api_error)?;
    Ok(Json(json!({ "completion": completion })))
}

async fn purchase_skin(
    State(context): State<AppContext>,
    Path(player_id): Path<Uuid>,
    Json(req): Json<SkinRequest>,
) -> Result<Json<Value>, ApiError> {
    let completion = context
        .state
        .purchase_skin(player_id, &req.skin_id)
        .await
        .map_err(into_api_error)?;
    Ok(Json(json!({ "skin_id": req.skin_id, "completion": completion })))
}

async fn get_progress(
    State(context): State<AppContext>,
    Path(player_id): Path<Uuid>,
) -> Json<Value> {
    let view = context.state.progress_view(player_id).await;
    Json(json!(view))
}

async fn get_challenges(
    State(context): State<AppContext>,
    Path(player_id): Path<Uuid>,
) -> Json<Value> {
    let view = context.state.todays_challenges(player_id).await;
    Json(json!(view))
}

async fn get_challenge_history(
    State(context): State<AppContext>,
    Path(player_id): Path<Uuid>,
) -> Json<Value> {
    let history = context.state.challenge_history(player_id).await;
    Json(json!({ "history": history }))
}

async fn claim_challenge_reward(
    State(context): State<AppContext>,
    Path(player_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let outcome = context
        .state
        .claim_challenge_reward(player_id)
        .await
        .map_err(into_api_error)?;
    Ok(Json(json!(outcome)))
}

async fn get_streak(
    State(context): State<AppContext>,
    Path(player_id): Path<Uuid>,
) -> Json<Value> {
    let streak = context.state.streak_status(player_id).await;
    Json(json!({
        "current_streak": streak.current_streak,
        "longest_streak": streak.longest_streak,
        "total_claims": streak.total_claims,
        "last_claim_date": streak.last_claim_date,
        "upcoming_milestones": streak.upcoming_milestones()
    }))
}

async fn claim_streak(
    State(context): State<AppContext>,
    Path(player_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let outcome = context
        .state
        .claim_streak(player_id)
        .await
        .map_err(into_api_error)?;
    Ok(Json(json!(outcome)))
}

async fn get_achievements(
    State(context): State<AppContext>,
    Path(player_id): Path<Uuid>,
) -> Json<Value> {
    let stats = context.state.achievement_stats(player_id).await;
    let pending = context.state.unacknowledged_achievements(player_id).await;
    Json(json!({
        "stats": stats,
        "unacknowledged": pending
    }))
}

async fn acknowledge_achievement(
    State(context): State<AppContext>,
    Path((player_id, achievement_id)): Path<(Uuid, String)>,
) -> Result<Json<Value>, ApiError> {
    context
        .state
        .acknowledge_achievement(player_id, &achievement_id)
        .await
        .map_err(into_api_error)?;
    Ok(Json(json!({ "acknowledged": achievement_id })))
}

async fn acknowledge_all(
    State(context): State<AppContext>,
    Path(player_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    context
        .state
        .acknowledge_all_achievements(player_id)
        .await
        .map_err(into_api_error)?;
    Ok(Json(json!({ "acknowledged": "all" })))
}

async fn get_rank(
    State(context): State<AppContext>,
    Path((player_id, period)): Path<(Uuid, Period)>,
) -> Result<Json<Value>, ApiError> {
    let rank = context.state.leaderboard_rank(player_id, period).await;
    let nearby = context.state.leaderboard_around(player_id, period, 2).await;
    Ok(Json(json!({
        "period": period,
        "rank": rank,
        "nearby": nearby
    })))
}

async fn get_leaderboard(
    State(context): State<AppContext>,
    Path(period): Path<Period>,
    Query(query): Query<BoardQuery>,
) -> Json<Value> {
    let limit = query
        .limit
        .unwrap_or(context.state.config.game.leaderboard_top_n);
    let entries = context.state.leaderboard_top(period, limit).await;
    Json(json!({
        "period": period,
        "entries": entries,
        "count": entries.len()
    }))
}

async fn sse_handler(
    State(context): State<AppContext>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = context.state.events.subscribe();

    let stream = stream::unfold(receiver, |mut rx| async move {
        match rx.recv().await {
            Ok(event) => {
                let event_data = serde_json::to_string(&event).unwrap_or_default();
                let sse_event = axum::response::sse::Event::default().data(event_data);
                Some((Ok(sse_event), rx))
            }
            Err(_) => None,
        }
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(std::time::Duration::from_secs(30))
            .text("keep-alive"),
    )
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now()
    }))
}
