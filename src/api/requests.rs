//! Request body schemas and validation.
//!
//! Bodies arrive as loose JSON and are checked field by field before any
//! domain value is constructed, so a bad request reports every offending
//! field at once instead of failing on the first type mismatch.

use serde_json::Value;

use crate::api::error::FieldError;
use crate::service::normalize_email;
use crate::stats::{GameRecord, SessionBatch};

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 50;
const PASSWORD_MIN: usize = 6;

/// Validated signup body.
#[derive(Debug, Clone)]
pub struct ValidSignup {
    /// Normalized account email.
    pub email: String,
    /// Display name.
    pub player_name: String,
    /// Plaintext password, hashed by the service layer.
    pub password: String,
}

/// Validated login body.
#[derive(Debug, Clone)]
pub struct ValidLogin {
    /// Normalized account email.
    pub email: String,
    /// Optional display-name update for passwordless accounts.
    pub player_name: Option<String>,
    /// Password, required only for accounts that hold one.
    pub password: Option<String>,
}

/// Validated score body.
#[derive(Debug, Clone)]
pub struct ValidScore {
    /// The session batch to merge server-side.
    pub batch: SessionBatch,
    /// Win rate as reported by the client; stored on the session row.
    pub win_rate: f64,
}

/// Checks a signup body.
///
/// # Errors
///
/// Returns every field-level failure found.
pub fn parse_signup(body: &Value) -> Result<ValidSignup, Vec<FieldError>> {
    let mut errors = Vec::new();

    let email = require_email(body, &mut errors);
    let player_name = require_name(body, &mut errors);
    let password = require_password(body, &mut errors);

    if errors.is_empty() {
        Ok(ValidSignup {
            email: email.unwrap_or_default(),
            player_name: player_name.unwrap_or_default(),
            password: password.unwrap_or_default(),
        })
    } else {
        Err(errors)
    }
}

/// Checks a login body.
///
/// # Errors
///
/// Returns every field-level failure found.
pub fn parse_login(body: &Value) -> Result<ValidLogin, Vec<FieldError>> {
    let mut errors = Vec::new();

    let email = require_email(body, &mut errors);

    let player_name = match body.get("playerName").and_then(Value::as_str) {
        Some(raw) => {
            let name = raw.trim();
            if (NAME_MIN..=NAME_MAX).contains(&name.chars().count()) {
                Some(name.to_string())
            } else {
                errors.push(FieldError::new(
                    "playerName",
                    format!("Player name must be {}-{} chars", NAME_MIN, NAME_MAX),
                ));
                None
            }
        }
        None => None,
    };

    let password = match body.get("password").and_then(Value::as_str) {
        Some(raw) if raw.len() >= PASSWORD_MIN => Some(raw.to_string()),
        Some(_) => {
            errors.push(FieldError::new(
                "password",
                format!("Password must be at least {} chars", PASSWORD_MIN),
            ));
            None
        }
        None => None,
    };

    if errors.is_empty() {
        Ok(ValidLogin {
            email: email.unwrap_or_default(),
            player_name,
            password,
        })
    } else {
        Err(errors)
    }
}

/// Checks a score body and assembles the session batch.
///
/// # Errors
///
/// Returns every field-level failure found.
pub fn parse_score(body: &Value) -> Result<ValidScore, Vec<FieldError>> {
    let mut errors = Vec::new();

    let score = require_counter(body, "score", "Score", &mut errors);
    let total_games = require_counter(body, "totalGames", "Total games", &mut errors);
    let total_wins = require_counter(body, "totalWins", "Total wins", &mut errors);
    let current_streak = require_counter(body, "currentStreak", "Current streak", &mut errors);
    let max_streak = require_counter(body, "maxStreak", "Max streak", &mut errors);

    let win_rate = match body.get("winRate").and_then(Value::as_f64) {
        Some(rate) if rate.is_finite() && rate >= 0.0 => Some(rate),
        _ => {
            errors.push(FieldError::new(
                "winRate",
                "Win rate must be a non-negative number",
            ));
            None
        }
    };

    let history = match body.get("gameHistory") {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => match serde_json::from_value::<Vec<GameRecord>>(value.clone()) {
            Ok(history) => history,
            Err(_) => {
                errors.push(FieldError::new(
                    "gameHistory",
                    "Game history must be a list of game records",
                ));
                Vec::new()
            }
        },
    };

    if errors.is_empty() {
        Ok(ValidScore {
            batch: SessionBatch {
                games_played: total_games.unwrap_or_default(),
                games_won: total_wins.unwrap_or_default(),
                ending_streak: current_streak.unwrap_or_default(),
                peak_streak: max_streak.unwrap_or_default(),
                peak_score: score.unwrap_or_default(),
                history,
            },
            win_rate: win_rate.unwrap_or_default(),
        })
    } else {
        Err(errors)
    }
}

fn require_email(body: &Value, errors: &mut Vec<FieldError>) -> Option<String> {
    match body.get("email").and_then(Value::as_str) {
        Some(raw) if is_valid_email(raw.trim()) => Some(normalize_email(raw)),
        _ => {
            errors.push(FieldError::new("email", "Valid email is required"));
            None
        }
    }
}

fn require_name(body: &Value, errors: &mut Vec<FieldError>) -> Option<String> {
    match body.get("playerName").and_then(Value::as_str) {
        Some(raw) => {
            let name = raw.trim();
            if (NAME_MIN..=NAME_MAX).contains(&name.chars().count()) {
                return Some(name.to_string());
            }
            errors.push(FieldError::new(
                "playerName",
                format!("Player name must be {}-{} chars", NAME_MIN, NAME_MAX),
            ));
            None
        }
        None => {
            errors.push(FieldError::new(
                "playerName",
                format!("Player name must be {}-{} chars", NAME_MIN, NAME_MAX),
            ));
            None
        }
    }
}

fn require_password(body: &Value, errors: &mut Vec<FieldError>) -> Option<String> {
    match body.get("password").and_then(Value::as_str) {
        Some(raw) if raw.len() >= PASSWORD_MIN => Some(raw.to_string()),
        _ => {
            errors.push(FieldError::new(
                "password",
                format!("Password must be at least {} chars", PASSWORD_MIN),
            ));
            None
        }
    }
}

fn require_counter(
    body: &Value,
    field: &str,
    label: &str,
    errors: &mut Vec<FieldError>,
) -> Option<u32> {
    match body.get(field).and_then(Value::as_u64) {
        Some(value) => Some(u32::try_from(value).unwrap_or(u32::MAX)),
        None => {
            errors.push(FieldError::new(
                field,
                format!("{} must be a non-negative number", label),
            ));
            None
        }
    }
}

/// Minimal structural email check: one `@`, a non-empty local part, and a
/// dotted domain.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || email.contains(char::is_whitespace) {
        return false;
    }
    match domain.split_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
