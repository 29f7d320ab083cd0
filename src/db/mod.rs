//! Database persistence layer for player accounts and saved sessions.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::DbError;
pub use models::{GameSession, NewGameSession, NewPlayer, Player};
pub(crate) use models::to_utc;
pub use repository::{LeaderboardSort, PlayerRepository};
