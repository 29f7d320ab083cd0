//! REST API surface: routing, request validation, and error mapping.

mod error;
mod requests;
mod responses;
mod routes;

pub use error::{ApiError, FieldError};
pub use responses::{
    LeaderboardEntry, LeaderboardResponse, LoginResponse, PlayerDetail, PlayerIdentity,
    PlayerProfile, PlayerResponse, RecentPlayer, SaveScoreResponse, SignupResponse, StatsBody,
    StatsResponse, TopPlayer,
};

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::error;

use crate::service::{GameService, ServiceError};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    service: Arc<GameService>,
    production: bool,
}

impl AppState {
    /// Creates handler state around a service.
    ///
    /// In production mode internal failures are reported with a generic
    /// message; in development the detail passes through.
    pub fn new(service: GameService, production: bool) -> Self {
        Self {
            service: Arc::new(service),
            production,
        }
    }

    /// Returns the wrapped service.
    pub fn service(&self) -> &GameService {
        &self.service
    }

    /// Maps a service failure onto the HTTP error taxonomy.
    pub(crate) fn api_error(&self, err: ServiceError) -> ApiError {
        match err {
            ServiceError::EmailTaken => ApiError::Conflict(err.to_string()),
            ServiceError::AccountNotFound | ServiceError::PlayerNotFound => {
                ApiError::NotFound(err.to_string())
            }
            ServiceError::PasswordRequired => ApiError::BadRequest(err.to_string()),
            ServiceError::InvalidCredentials | ServiceError::TokenPlayerMissing => {
                ApiError::Auth(err.to_string())
            }
            ServiceError::Auth(e) => ApiError::Auth(e.to_string()),
            ServiceError::Hash(_) | ServiceError::Db(_) => self.internal(err),
        }
    }

    /// Wraps a backend failure, redacting detail in production.
    pub(crate) fn internal(&self, err: impl std::fmt::Display) -> ApiError {
        error!(error = %err, "Internal error");
        if self.production {
            ApiError::Internal("Internal server error".to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/health/db", get(routes::health_db))
        .route("/api/auth/signup", post(routes::signup))
        .route("/api/auth/login", post(routes::login))
        .route("/api/scores", post(routes::save_score))
        .route("/api/leaderboard", get(routes::leaderboard))
        .route("/api/player/{id}", get(routes::player_by_id))
        .route("/api/player/name/{name}", get(routes::player_by_name))
        .route("/api/stats", get(routes::global_stats))
        .fallback(routes::not_found)
        .with_state(state)
}
