//! Wire response bodies.
//!
//! Field names are part of the public API contract and must not change;
//! existing clients match on them exactly. The same types are reused by the
//! bundled [`ApiClient`](crate::client::ApiClient) for decoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, Player, to_utc};
use crate::stats::GameRecord;

/// Identity subset returned on signup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerIdentity {
    /// Player id.
    pub id: i32,
    /// Account email.
    pub email: String,
    /// Display name.
    pub player_name: String,
}

/// Profile subset returned on login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    /// Player id.
    pub id: i32,
    /// Account email.
    pub email: String,
    /// Display name.
    pub player_name: String,
    /// Highest saved session score.
    pub best_score: u32,
    /// Lifetime wins.
    pub total_wins: u32,
    /// Lifetime games.
    pub total_games: u32,
}

/// Body of `POST /api/auth/signup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    /// Always true on the success path.
    pub success: bool,
    /// Signed bearer token.
    pub token: String,
    /// The registered identity.
    pub player: PlayerIdentity,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Always true on the success path.
    pub success: bool,
    /// Signed bearer token.
    pub token: String,
    /// The authenticated profile.
    pub player: PlayerProfile,
}

/// Body of `POST /api/scores`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveScoreResponse {
    /// Always true on the success path.
    pub success: bool,
    /// Confirmation message.
    pub message: String,
    /// Player the batch was merged into.
    pub player_id: i32,
    /// Recorded session row id.
    pub session_id: i32,
}

/// One leaderboard row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Display name.
    pub player_name: String,
    /// Highest saved session score.
    pub best_score: u32,
    /// Lifetime wins.
    pub total_wins: u32,
    /// Lifetime games.
    pub total_games: u32,
    /// Win run the player is currently on.
    pub current_streak: u32,
    /// Longest win run.
    pub max_streak: u32,
    /// Last save time.
    pub last_played: DateTime<Utc>,
    /// Derived win percentage; never stored.
    pub win_rate: u32,
}

/// Body of `GET /api/leaderboard`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    /// Always true on the success path.
    pub success: bool,
    /// Rows ordered by the requested sort key, descending.
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Total registered players.
    pub total_players: i64,
}

/// Full player view returned by the player lookup endpoints.
///
/// The stored password hash is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDetail {
    /// Player id.
    pub id: i32,
    /// Display name.
    pub player_name: String,
    /// Account email.
    pub email: String,
    /// Lifetime games.
    pub total_games: u32,
    /// Lifetime wins.
    pub total_wins: u32,
    /// Win run the player is currently on.
    pub current_streak: u32,
    /// Longest win run.
    pub max_streak: u32,
    /// Highest saved session score.
    pub best_score: u32,
    /// Most recent games, oldest first.
    pub game_history: Vec<GameRecord>,
    /// Last save time.
    pub last_played: DateTime<Utc>,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
    /// Derived win percentage; never stored.
    pub win_rate: u32,
}

/// Body of `GET /api/player/{id}` and `GET /api/player/name/{name}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerResponse {
    /// Always true on the success path.
    pub success: bool,
    /// The requested player.
    pub player: PlayerDetail,
}

/// Best-scoring player in the global stats view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPlayer {
    /// Display name.
    pub player_name: String,
    /// Highest saved session score.
    pub best_score: u32,
}

/// Recently active player in the global stats view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPlayer {
    /// Display name.
    pub player_name: String,
    /// Last save time.
    pub last_played: DateTime<Utc>,
}

/// Aggregates in the global stats view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsBody {
    /// Number of registered players.
    pub total_players: i64,
    /// Sum of lifetime games across players.
    pub total_games: i64,
    /// Sum of lifetime wins across players.
    pub total_wins: i64,
    /// Best-scoring player, absent while no one has played.
    pub top_player: Option<TopPlayer>,
    /// Most recently active players, newest first.
    pub recent_players: Vec<RecentPlayer>,
}

/// Body of `GET /api/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Always true on the success path.
    pub success: bool,
    /// The aggregates.
    pub stats: StatsBody,
}

impl PlayerIdentity {
    /// Projects the identity subset out of a stored player.
    pub fn from_player(player: &Player) -> Self {
        Self {
            id: *player.id(),
            email: player.email().clone(),
            player_name: player.player_name().clone(),
        }
    }
}

impl PlayerProfile {
    /// Projects the login profile out of a stored player.
    pub fn from_player(player: &Player) -> Self {
        let count = |v: &i32| u32::try_from(*v).unwrap_or(0);
        Self {
            id: *player.id(),
            email: player.email().clone(),
            player_name: player.player_name().clone(),
            best_score: count(player.best_score()),
            total_wins: count(player.total_wins()),
            total_games: count(player.total_games()),
        }
    }
}

impl LeaderboardEntry {
    /// Projects a leaderboard row out of a stored player.
    pub fn from_player(player: &Player) -> Self {
        let count = |v: &i32| u32::try_from(*v).unwrap_or(0);
        Self {
            player_name: player.player_name().clone(),
            best_score: count(player.best_score()),
            total_wins: count(player.total_wins()),
            total_games: count(player.total_games()),
            current_streak: count(player.current_streak()),
            max_streak: count(player.max_streak()),
            last_played: to_utc(*player.last_played()),
            win_rate: player.win_rate(),
        }
    }
}

impl PlayerDetail {
    /// Projects the full player view out of a stored player.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored history fails to decode.
    pub fn from_player(player: &Player) -> Result<Self, DbError> {
        let count = |v: &i32| u32::try_from(*v).unwrap_or(0);
        Ok(Self {
            id: *player.id(),
            player_name: player.player_name().clone(),
            email: player.email().clone(),
            total_games: count(player.total_games()),
            total_wins: count(player.total_wins()),
            current_streak: count(player.current_streak()),
            max_streak: count(player.max_streak()),
            best_score: count(player.best_score()),
            game_history: player.history()?,
            last_played: to_utc(*player.last_played()),
            created_at: to_utc(*player.created_at()),
            updated_at: to_utc(*player.updated_at()),
            win_rate: player.win_rate(),
        })
    }
}

impl TopPlayer {
    /// Projects the top-player subset out of a stored player.
    pub fn from_player(player: &Player) -> Self {
        Self {
            player_name: player.player_name().clone(),
            best_score: u32::try_from(*player.best_score()).unwrap_or(0),
        }
    }
}

impl RecentPlayer {
    /// Projects the recent-player subset out of a stored player.
    pub fn from_player(player: &Player) -> Self {
        Self {
            player_name: player.player_name().clone(),
            last_played: to_utc(*player.last_played()),
        }
    }
}
