//! Local game state and its snapshot persistence.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::game::{Move, Outcome, resolve};
use crate::stats::{GameRecord, HISTORY_LIMIT, SessionBatch};

/// Running client-side game state.
///
/// An explicit struct passed around and persisted through [`Self::load`] /
/// [`Self::save`]; the snapshot keys are fixed for compatibility with
/// existing saves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    /// Session score: rounds the user has won.
    pub user_score: u32,
    /// Session score: rounds the computer has won.
    pub comp_score: u32,
    /// Games played since the snapshot was created.
    pub total_games: u32,
    /// Games won since the snapshot was created.
    pub total_wins: u32,
    /// Current run of consecutive wins.
    pub current_streak: u32,
    /// Longest run of consecutive wins.
    pub max_streak: u32,
    /// Recent games, oldest first, capped at [`HISTORY_LIMIT`].
    pub game_history: Vec<GameRecord>,
    /// Display name shown locally and sent on login.
    pub player_name: String,
    /// Whether a login has succeeded since the last logout.
    pub is_logged_in: bool,
    /// Bearer token from the last login, if any.
    pub jwt_token: Option<String>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            user_score: 0,
            comp_score: 0,
            total_games: 0,
            total_wins: 0,
            current_streak: 0,
            max_streak: 0,
            game_history: Vec::new(),
            player_name: "Player".to_string(),
            is_logged_in: false,
            jwt_token: None,
        }
    }
}

impl GameState {
    /// Loads a snapshot from disk.
    ///
    /// A missing file yields a fresh state; a corrupt one is discarded with
    /// a warning rather than aborting play.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(state) => {
                    debug!(path = %path.display(), "Snapshot loaded");
                    state
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Discarding corrupt snapshot");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Writes the snapshot to disk.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let raw = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, raw)
    }

    /// Resolves one round and folds it into the running totals.
    ///
    /// A win advances both scores and the streak; a loss scores the
    /// computer and resets the streak; a draw changes nothing but the game
    /// count. The round lands in the bounded history either way.
    pub fn record_round(&mut self, user: Move, comp: Move, now: DateTime<Utc>) -> Outcome {
        let result = resolve(user, comp);
        self.total_games += 1;

        match result {
            Outcome::Win => {
                self.user_score += 1;
                self.total_wins += 1;
                self.current_streak += 1;
                self.max_streak = self.max_streak.max(self.current_streak);
            }
            Outcome::Lose => {
                self.comp_score += 1;
                self.current_streak = 0;
            }
            Outcome::Draw => {}
        }

        self.game_history.push(GameRecord {
            user_choice: user,
            comp_choice: comp,
            result,
            timestamp: now,
        });
        if self.game_history.len() > HISTORY_LIMIT {
            self.game_history.remove(0);
        }

        result
    }

    /// Win rate as the unrounded percentage the save endpoint expects.
    pub fn win_rate_percent(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            f64::from(self.total_wins) * 100.0 / f64::from(self.total_games)
        }
    }

    /// Win rate as a whole percentage for display.
    pub fn win_rate(&self) -> u32 {
        crate::stats::win_rate(self.total_wins, self.total_games)
    }

    /// Derives the batch a save request reports.
    pub fn session_batch(&self) -> SessionBatch {
        SessionBatch {
            games_played: self.total_games,
            games_won: self.total_wins,
            ending_streak: self.current_streak,
            peak_streak: self.max_streak,
            peak_score: self.user_score,
            history: self.game_history.clone(),
        }
    }

    /// Marks the state as logged in under the given name and token.
    pub fn log_in(&mut self, player_name: String, token: String) {
        self.player_name = player_name;
        self.is_logged_in = true;
        self.jwt_token = Some(token);
    }

    /// Discards the client-held claim. The server keeps no revocation
    /// list; the token simply ages out.
    pub fn log_out(&mut self) {
        self.is_logged_in = false;
        self.player_name = "Player".to_string();
        self.jwt_token = None;
    }

    /// Zeroes the per-session scores, keeping lifetime totals and history.
    pub fn reset(&mut self) {
        self.user_score = 0;
        self.comp_score = 0;
    }
}
