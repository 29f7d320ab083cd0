//! RPS Arena - a rock-paper-scissors game with persistent scores.
//!
//! # Architecture
//!
//! - **Game**: the pure outcome rules shared by every other layer
//! - **Stats**: score aggregation applied client-side per round and
//!   server-side per saved batch
//! - **Auth**: bcrypt password hashing and signed bearer claims
//! - **Db**: diesel/SQLite repository for players and saved sessions
//! - **Api**: axum REST surface over the service layer
//! - **Client**: terminal player with a persisted local snapshot
//!
//! # Example
//!
//! ```
//! use rps_arena::{Move, Outcome, resolve};
//!
//! assert_eq!(resolve(Move::Rock, Move::Scissors), Outcome::Win);
//! assert_eq!(resolve(Move::Paper, Move::Paper), Outcome::Draw);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api;
mod auth;
mod cli;
mod client;
mod config;
mod db;
mod game;
mod service;
mod stats;

// Crate-level exports - game rules
pub use game::{Move, Outcome, random_move, resolve};

// Crate-level exports - score aggregation
pub use stats::{GameRecord, HISTORY_LIMIT, SessionBatch, StatsSnapshot, apply_batch, win_rate};

// Crate-level exports - credentials
pub use auth::{AuthError, Claims, TokenKey, bearer_token, hash_password, verify_password};

// Crate-level exports - persistence
pub use db::{DbError, GameSession, LeaderboardSort, NewPlayer, Player, PlayerRepository};

// Crate-level exports - business logic
pub use service::{GameService, GlobalStats, ServiceError, normalize_email};

// Crate-level exports - REST surface
pub use api::{
    ApiError, AppState, FieldError, LeaderboardEntry, LeaderboardResponse, LoginResponse,
    PlayerDetail, PlayerIdentity, PlayerProfile, PlayerResponse, RecentPlayer, SaveScoreResponse,
    SignupResponse, StatsBody, StatsResponse, TopPlayer, router,
};

// Crate-level exports - terminal client
pub use client::{ApiClient, ClientError, GameState, run_repl};

// Crate-level exports - configuration and CLI
pub use cli::{Cli, Command};
pub use config::Config;
