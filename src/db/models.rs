//! Database models and domain conversions.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;

use crate::db::{DbError, schema};
use crate::stats::{GameRecord, StatsSnapshot};

/// Player account database model.
///
/// `game_history` holds the JSON-encoded bounded list of [`GameRecord`]s;
/// use [`Player::history`] to decode it.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::players)]
pub struct Player {
    id: i32,
    player_name: String,
    email: String,
    password_hash: Option<String>,
    total_games: i32,
    total_wins: i32,
    current_streak: i32,
    max_streak: i32,
    best_score: i32,
    game_history: String,
    last_played: NaiveDateTime,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl Player {
    /// Decodes the stored game history.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored JSON is malformed.
    pub fn history(&self) -> Result<Vec<GameRecord>, DbError> {
        Ok(serde_json::from_str(&self.game_history)?)
    }

    /// Converts the row into the aggregate the stats merge operates on.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored history is malformed.
    pub fn snapshot(&self) -> Result<StatsSnapshot, DbError> {
        Ok(StatsSnapshot {
            total_games: clamp_count(self.total_games),
            total_wins: clamp_count(self.total_wins),
            current_streak: clamp_count(self.current_streak),
            max_streak: clamp_count(self.max_streak),
            best_score: clamp_count(self.best_score),
            history: self.history()?,
            last_played: to_utc(self.last_played),
        })
    }

    /// Win rate as a whole percentage, derived and never stored.
    pub fn win_rate(&self) -> u32 {
        crate::stats::win_rate(clamp_count(self.total_wins), clamp_count(self.total_games))
    }
}

/// Insertable player model for new accounts.
///
/// Counters start at their zero-valued schema defaults.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::players)]
pub struct NewPlayer {
    player_name: String,
    email: String,
    password_hash: Option<String>,
}

/// Saved game-session database model: the per-save batch snapshot.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::game_sessions)]
#[diesel(belongs_to(Player))]
pub struct GameSession {
    id: i32,
    player_id: i32,
    session_id: String,
    score: i32,
    total_games: i32,
    total_wins: i32,
    win_rate: f64,
    current_streak: i32,
    max_streak: i32,
    game_history: String,
    started_at: NaiveDateTime,
    ended_at: Option<NaiveDateTime>,
}

/// Insertable game-session model.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::game_sessions)]
pub struct NewGameSession {
    player_id: i32,
    session_id: String,
    score: i32,
    total_games: i32,
    total_wins: i32,
    win_rate: f64,
    current_streak: i32,
    max_streak: i32,
    game_history: String,
    ended_at: Option<NaiveDateTime>,
}

/// Interprets a stored counter as unsigned; rows written by this crate are
/// never negative.
pub(crate) fn clamp_count(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Narrows an unsigned counter into the stored column type.
pub(crate) fn to_column(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Reinterprets a stored naive timestamp as UTC.
pub(crate) fn to_utc(value: NaiveDateTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&value)
}
