//! Core rock-paper-scissors rules.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A move in rock-paper-scissors.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Move {
    /// Rock crushes scissors.
    Rock,
    /// Paper covers rock.
    Paper,
    /// Scissors cut paper.
    Scissors,
}

impl Move {
    /// All three moves, in declaration order.
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// Returns the move this one defeats.
    pub fn beats(self) -> Move {
        match self {
            Move::Rock => Move::Scissors,
            Move::Paper => Move::Rock,
            Move::Scissors => Move::Paper,
        }
    }
}

/// Result of a single game, from the user's perspective.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Outcome {
    /// The user's move dominated the opponent's.
    Win,
    /// The opponent's move dominated the user's.
    Lose,
    /// Both picked the same move.
    Draw,
}

/// Resolves a pair of moves into an outcome for the user.
///
/// Total over all nine input pairs: three draws, three wins, three losses.
pub fn resolve(user: Move, opponent: Move) -> Outcome {
    if user == opponent {
        Outcome::Draw
    } else if user.beats() == opponent {
        Outcome::Win
    } else {
        Outcome::Lose
    }
}

/// Picks a move uniformly at random.
///
/// Opponent simulation is caller policy; [`resolve`] never consults this.
pub fn random_move<R: Rng + ?Sized>(rng: &mut R) -> Move {
    Move::ALL[rng.gen_range(0..Move::ALL.len())]
}
