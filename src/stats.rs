//! Score aggregation shared by the client simulation and the server's
//! save path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::game::{Move, Outcome};

/// Maximum number of game records retained per player.
pub const HISTORY_LIMIT: usize = 50;

/// A single completed game, immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    /// Move the user played.
    pub user_choice: Move,
    /// Move the opponent played.
    pub comp_choice: Move,
    /// Outcome from the user's perspective.
    pub result: Outcome,
    /// When the game finished.
    pub timestamp: DateTime<Utc>,
}

/// Cumulative statistics for one player.
///
/// Counters are unsigned, so `max_streak >= current_streak` and the
/// monotonicity of `best_score` hold after every merge regardless of the
/// batch contents. `total_wins <= total_games` holds only when the caller
/// reports consistent batches; the aggregator does not re-derive wins from
/// the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Lifetime games played.
    pub total_games: u32,
    /// Lifetime games won.
    pub total_wins: u32,
    /// Length of the run of wins the player is currently on.
    pub current_streak: u32,
    /// Longest win run ever observed.
    pub max_streak: u32,
    /// Highest session score ever reported.
    pub best_score: u32,
    /// Most recent games, oldest first, capped at [`HISTORY_LIMIT`].
    pub history: Vec<GameRecord>,
    /// When the player last saved a session.
    pub last_played: DateTime<Utc>,
}

impl StatsSnapshot {
    /// A zero-valued snapshot for a player created at `now`.
    pub fn zeroed(now: DateTime<Utc>) -> Self {
        Self {
            total_games: 0,
            total_wins: 0,
            current_streak: 0,
            max_streak: 0,
            best_score: 0,
            history: Vec::new(),
            last_played: now,
        }
    }
}

/// One session's worth of games reported in a single save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionBatch {
    /// Games played during the session.
    pub games_played: u32,
    /// Games won during the session.
    pub games_won: u32,
    /// Win run the session ended on.
    pub ending_streak: u32,
    /// Longest win run seen during the session.
    pub peak_streak: u32,
    /// Highest score reached during the session.
    pub peak_score: u32,
    /// Games to append to the stored history, oldest first.
    pub history: Vec<GameRecord>,
}

/// Merges a session batch into a player's cumulative statistics.
///
/// Totals accumulate, the current streak is replaced by the batch's ending
/// run, peak values are max-merged, and the history is concatenated then
/// truncated to the most recent [`HISTORY_LIMIT`] records. `last_played`
/// always moves to `now`, even for an empty batch.
#[instrument(skip(current, batch), fields(games = batch.games_played, wins = batch.games_won))]
pub fn apply_batch(current: &StatsSnapshot, batch: &SessionBatch, now: DateTime<Utc>) -> StatsSnapshot {
    let mut history = Vec::with_capacity(current.history.len() + batch.history.len());
    history.extend_from_slice(&current.history);
    history.extend_from_slice(&batch.history);
    if history.len() > HISTORY_LIMIT {
        history.drain(..history.len() - HISTORY_LIMIT);
    }

    StatsSnapshot {
        total_games: current.total_games.saturating_add(batch.games_played),
        total_wins: current.total_wins.saturating_add(batch.games_won),
        current_streak: batch.ending_streak,
        // Folding the ending run in keeps max >= current even when the
        // reported peak understates it.
        max_streak: current
            .max_streak
            .max(batch.peak_streak)
            .max(batch.ending_streak),
        best_score: current.best_score.max(batch.peak_score),
        history,
        last_played: now,
    }
}

/// Win rate as a whole percentage; zero when no games have been played.
pub fn win_rate(total_wins: u32, total_games: u32) -> u32 {
    if total_games == 0 {
        0
    } else {
        (f64::from(total_wins) * 100.0 / f64::from(total_games)).round() as u32
    }
}
