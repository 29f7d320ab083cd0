//! Account and score business logic layered over the repository.

use chrono::Utc;
use derive_more::{Display, Error, From};
use tracing::{debug, info, instrument, warn};

use crate::auth::{self, AuthError, Claims, TokenKey};
use crate::db::{DbError, GameSession, LeaderboardSort, NewPlayer, Player, PlayerRepository};
use crate::stats::SessionBatch;

/// Business-rule failure surfaced to the API layer.
#[derive(Debug, Display, Error, From)]
pub enum ServiceError {
    /// Signup hit an account that already holds a password.
    #[display("Email already registered")]
    EmailTaken,
    /// Login for an email nobody has signed up with.
    #[display("Account not found. Please sign up.")]
    AccountNotFound,
    /// The account has a password but none was supplied.
    #[display("Password required")]
    PasswordRequired,
    /// Password verification failed.
    #[display("Invalid credentials")]
    InvalidCredentials,
    /// A player lookup came up empty.
    #[display("Player not found")]
    PlayerNotFound,
    /// A valid claim references a player that no longer exists.
    #[display("Player not found for token")]
    TokenPlayerMissing,
    /// Token verification or issuance failed.
    #[display("{_0}")]
    #[from]
    Auth(AuthError),
    /// Password hashing failed.
    #[display("Password hashing failed: {_0}")]
    #[from]
    Hash(bcrypt::BcryptError),
    /// The storage layer failed.
    #[display("{_0}")]
    #[from]
    Db(DbError),
}

/// Global aggregate view across all players.
#[derive(Debug, Clone)]
pub struct GlobalStats {
    /// Number of registered players.
    pub total_players: i64,
    /// Sum of lifetime games across players.
    pub total_games: i64,
    /// Sum of lifetime wins across players.
    pub total_wins: i64,
    /// Player with the highest best score, if any.
    pub top_player: Option<Player>,
    /// Most recently active players, newest first.
    pub recent_players: Vec<Player>,
}

/// Service layer for accounts, score saves, and leaderboard reads.
///
/// Wraps [`PlayerRepository`] with signup/login rules and the server-side
/// application of the stats merge.
#[derive(Debug, Clone)]
pub struct GameService {
    repository: PlayerRepository,
    tokens: TokenKey,
}

impl GameService {
    /// Creates a new service backed by the given repository and token key.
    #[instrument(skip_all)]
    pub fn new(repository: PlayerRepository, tokens: TokenKey) -> Self {
        info!("Creating GameService");
        Self { repository, tokens }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &PlayerRepository {
        &self.repository
    }

    /// Registers an account and issues a signed claim.
    ///
    /// An email that already holds a password is a conflict. An email-only
    /// record left behind by a passwordless login is upgraded in place
    /// instead of duplicated.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EmailTaken`] on conflict, or hashing/storage
    /// failures.
    #[instrument(skip_all, fields(player_name = %player_name))]
    pub fn signup(
        &self,
        email: &str,
        player_name: &str,
        password: &str,
    ) -> Result<(String, Player), ServiceError> {
        let email = normalize_email(email);
        let existing = self.repository.find_by_email(&email)?;

        if let Some(ref player) = existing
            && player.password_hash().is_some()
        {
            warn!(player_id = player.id(), "Signup for registered email");
            return Err(ServiceError::EmailTaken);
        }

        let hash = auth::hash_password(password)?;
        let player = match existing {
            Some(player) => {
                info!(player_id = player.id(), "Upgrading passwordless account");
                self.repository
                    .attach_credentials(*player.id(), player_name.to_string(), hash)?
            }
            None => self.repository.create_player(NewPlayer::new(
                player_name.to_string(),
                email,
                Some(hash),
            ))?,
        };

        let token = self.issue_token(&player)?;
        info!(player_id = player.id(), "Signup complete");
        Ok((token, player))
    }

    /// Authenticates an account and issues a signed claim.
    ///
    /// Accounts with a password require one; verification failure is
    /// [`ServiceError::InvalidCredentials`]. Passwordless accounts log in
    /// without a check and may update their display name.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AccountNotFound`] for unknown emails,
    /// [`ServiceError::PasswordRequired`] when one is needed but missing.
    #[instrument(skip_all)]
    pub fn login(
        &self,
        email: &str,
        player_name: Option<&str>,
        password: Option<&str>,
    ) -> Result<(String, Player), ServiceError> {
        let email = normalize_email(email);
        let mut player = self
            .repository
            .find_by_email(&email)?
            .ok_or(ServiceError::AccountNotFound)?;

        if let Some(hash) = player.password_hash().clone() {
            let password = password.ok_or(ServiceError::PasswordRequired)?;
            if !auth::verify_password(password, &hash)? {
                warn!(player_id = player.id(), "Password verification failed");
                return Err(ServiceError::InvalidCredentials);
            }
        } else if let Some(name) = player_name
            && name != player.player_name().as_str()
        {
            debug!(player_id = player.id(), "Renaming passwordless account");
            player = self.repository.rename_player(*player.id(), name.to_string())?;
        }

        let token = self.issue_token(&player)?;
        info!(player_id = player.id(), "Login complete");
        Ok((token, player))
    }

    /// Verifies a bearer credential and yields the identity it asserts.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Auth`] when the token is missing, malformed,
    /// forged, or expired.
    #[instrument(skip_all)]
    pub fn authorize(&self, authorization: Option<&str>) -> Result<Claims, ServiceError> {
        let token = auth::bearer_token(authorization)?;
        Ok(self.tokens.verify(token)?)
    }

    /// Merges a reported session into the claim holder's stored aggregates
    /// and records the session.
    ///
    /// Counters are taken as reported; they are not re-derived from the
    /// batch history (see DESIGN.md on the client trust boundary).
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::TokenPlayerMissing`] when the claim no longer
    /// maps to a player.
    #[instrument(skip(self, claims, batch), fields(player_id = claims.player_id))]
    pub fn save_score(
        &self,
        claims: &Claims,
        batch: &SessionBatch,
        reported_win_rate: f64,
    ) -> Result<(Player, GameSession), ServiceError> {
        let player = match self.repository.find_by_id(claims.player_id)? {
            Some(player) => Some(player),
            // Fall back to the email claim for tokens minted before a
            // re-import shuffled ids.
            None => self.repository.find_by_email(&normalize_email(&claims.email))?,
        };
        let player = player.ok_or(ServiceError::TokenPlayerMissing)?;

        Ok(self
            .repository
            .save_session(*player.id(), batch, reported_win_rate)?)
    }

    /// Loads the leaderboard plus the total player count.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Db`] if storage fails.
    #[instrument(skip(self))]
    pub fn leaderboard(
        &self,
        limit: i64,
        sort: LeaderboardSort,
    ) -> Result<(Vec<Player>, i64), ServiceError> {
        let players = self.repository.leaderboard(limit.max(1), sort)?;
        let total = self.repository.count_players()?;
        Ok((players, total))
    }

    /// Gets a player by id.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PlayerNotFound`] if no such player exists.
    #[instrument(skip(self))]
    pub fn player_by_id(&self, player_id: i32) -> Result<Player, ServiceError> {
        self.repository
            .find_by_id(player_id)?
            .ok_or(ServiceError::PlayerNotFound)
    }

    /// Gets a player by display name.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::PlayerNotFound`] if no such player exists.
    #[instrument(skip(self))]
    pub fn player_by_name(&self, player_name: &str) -> Result<Player, ServiceError> {
        self.repository
            .find_by_name(player_name)?
            .ok_or(ServiceError::PlayerNotFound)
    }

    /// Computes the global aggregate view.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Db`] if storage fails.
    #[instrument(skip(self))]
    pub fn global_stats(&self) -> Result<GlobalStats, ServiceError> {
        let total_players = self.repository.count_players()?;
        let (total_games, total_wins) = self.repository.total_counts()?;
        let top_player = self.repository.top_player()?;
        let recent_players = self.repository.recent_players(5)?;

        Ok(GlobalStats {
            total_players,
            total_games,
            total_wins,
            top_player,
            recent_players,
        })
    }

    fn issue_token(&self, player: &Player) -> Result<String, ServiceError> {
        let claims = Claims::new(
            *player.id(),
            player.email().clone(),
            player.player_name().clone(),
            Utc::now(),
        );
        Ok(self.tokens.sign(&claims)?)
    }
}

/// Lowercases and trims an email so storage and lookup stay
/// case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
