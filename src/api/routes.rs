//! Request handlers for the REST surface.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::api::error::ApiError;
use crate::api::requests::{parse_login, parse_score, parse_signup};
use crate::api::responses::{
    LeaderboardEntry, LeaderboardResponse, LoginResponse, PlayerDetail, PlayerIdentity,
    PlayerProfile, PlayerResponse, RecentPlayer, SaveScoreResponse, SignupResponse, StatsBody,
    StatsResponse, TopPlayer,
};
use crate::api::AppState;
use crate::db::LeaderboardSort;

const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;

/// Query parameters accepted by the leaderboard endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct LeaderboardQuery {
    limit: Option<i64>,
    #[serde(rename = "sortBy")]
    sort_by: Option<String>,
}

/// `GET /` - API index.
pub(super) async fn index() -> Json<Value> {
    Json(json!({
        "message": "Rock Paper Scissors API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /api/auth/signup": "Create an account",
            "POST /api/auth/login": "Log in and receive a token",
            "POST /api/scores": "Save player score",
            "GET /api/leaderboard": "Get leaderboard",
            "GET /api/player/{id}": "Get player stats",
            "GET /api/stats": "Get global stats"
        }
    }))
}

/// `GET /health` - liveness probe.
pub(super) async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "timestamp": Utc::now().to_rfc3339() }))
}

/// `GET /health/db` - database connectivity probe.
pub(super) async fn health_db(State(state): State<AppState>) -> Json<Value> {
    let connected = state.service().repository().ping().is_ok();
    Json(json!({
        "status": "OK",
        "connected": connected,
        "database": state.service().repository().db_path(),
    }))
}

/// `POST /api/auth/signup`.
#[instrument(skip_all)]
pub(super) async fn signup(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let valid = parse_signup(&body).map_err(ApiError::Validation)?;

    let (token, player) = state
        .service()
        .signup(&valid.email, &valid.player_name, &valid.password)
        .map_err(|e| state.api_error(e))?;

    info!(player_id = player.id(), "Player signed up");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            success: true,
            token,
            player: PlayerIdentity::from_player(&player),
        }),
    ))
}

/// `POST /api/auth/login`.
#[instrument(skip_all)]
pub(super) async fn login(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<LoginResponse>, ApiError> {
    let valid = parse_login(&body).map_err(ApiError::Validation)?;

    let (token, player) = state
        .service()
        .login(
            &valid.email,
            valid.player_name.as_deref(),
            valid.password.as_deref(),
        )
        .map_err(|e| state.api_error(e))?;

    info!(player_id = player.id(), "Player logged in");
    Ok(Json(LoginResponse {
        success: true,
        token,
        player: PlayerProfile::from_player(&player),
    }))
}

/// `POST /api/scores` - requires a bearer claim.
#[instrument(skip_all)]
pub(super) async fn save_score(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<SaveScoreResponse>, ApiError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let claims = state
        .service()
        .authorize(authorization)
        .map_err(|e| state.api_error(e))?;

    let valid = parse_score(&body).map_err(ApiError::Validation)?;

    let (player, session) = state
        .service()
        .save_score(&claims, &valid.batch, valid.win_rate)
        .map_err(|e| state.api_error(e))?;

    info!(
        player_id = player.id(),
        session_id = session.id(),
        "Score saved"
    );
    Ok(Json(SaveScoreResponse {
        success: true,
        message: "Score saved successfully".to_string(),
        player_id: *player.id(),
        session_id: *session.id(),
    }))
}

/// `GET /api/leaderboard`.
#[instrument(skip_all)]
pub(super) async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
    let sort = query
        .sort_by
        .as_deref()
        .map(LeaderboardSort::parse)
        .unwrap_or_default();

    let (players, total_players) = state
        .service()
        .leaderboard(limit, sort)
        .map_err(|e| state.api_error(e))?;

    Ok(Json(LeaderboardResponse {
        success: true,
        leaderboard: players.iter().map(LeaderboardEntry::from_player).collect(),
        total_players,
    }))
}

/// `GET /api/player/{id}`.
#[instrument(skip_all, fields(player_id))]
pub(super) async fn player_by_id(
    State(state): State<AppState>,
    Path(player_id): Path<i32>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let player = state
        .service()
        .player_by_id(player_id)
        .map_err(|e| state.api_error(e))?;

    let detail = PlayerDetail::from_player(&player).map_err(|e| state.internal(e))?;
    Ok(Json(PlayerResponse {
        success: true,
        player: detail,
    }))
}

/// `GET /api/player/name/{name}`.
#[instrument(skip_all, fields(name = %name))]
pub(super) async fn player_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let player = state
        .service()
        .player_by_name(&name)
        .map_err(|e| state.api_error(e))?;

    let detail = PlayerDetail::from_player(&player).map_err(|e| state.internal(e))?;
    Ok(Json(PlayerResponse {
        success: true,
        player: detail,
    }))
}

/// `GET /api/stats`.
#[instrument(skip_all)]
pub(super) async fn global_stats(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state
        .service()
        .global_stats()
        .map_err(|e| state.api_error(e))?;

    Ok(Json(StatsResponse {
        success: true,
        stats: StatsBody {
            total_players: stats.total_players,
            total_games: stats.total_games,
            total_wins: stats.total_wins,
            top_player: stats.top_player.as_ref().map(TopPlayer::from_player),
            recent_players: stats
                .recent_players
                .iter()
                .map(RecentPlayer::from_player)
                .collect(),
        },
    }))
}

/// JSON fallback for unknown routes.
pub(super) async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "Route not found" })),
    )
}
