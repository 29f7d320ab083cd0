//! Database repository for player accounts, score merges, and leaderboards.

use chrono::Utc;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::models::to_column;
use crate::db::{DbError, GameSession, NewGameSession, NewPlayer, Player, schema};
use crate::stats::{SessionBatch, apply_batch};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Sort key accepted by the leaderboard query.
///
/// Parses the wire `sortBy` values; anything unrecognized falls back to
/// best score, which is also the default ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum LeaderboardSort {
    /// Order by highest session score.
    #[default]
    BestScore,
    /// Order by lifetime wins.
    TotalWins,
    /// Order by lifetime games.
    TotalGames,
    /// Order by longest win streak.
    MaxStreak,
}

impl LeaderboardSort {
    /// Parses a query-string value, falling back to [`Self::BestScore`].
    pub fn parse(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

/// Database repository for player and session operations.
#[derive(Debug, Clone)]
pub struct PlayerRepository {
    db_path: String,
}

impl PlayerRepository {
    /// Creates a new repository connected to the database at the given path.
    ///
    /// Use `":memory:"` for an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is invalid.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        info!(path = %db_path, "Creating PlayerRepository");
        Ok(Self { db_path })
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Applies any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database is unreachable or a migration
    /// fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Checks that the database answers a trivial query.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database is unreachable.
    #[instrument(skip(self))]
    pub fn ping(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }

    /// Returns the database path this repository talks to.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Creates a new player account with zeroed counters.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the email is already registered or a database
    /// error occurs.
    #[instrument(skip(self, player))]
    pub fn create_player(&self, player: NewPlayer) -> Result<Player, DbError> {
        debug!("Creating player");
        let mut conn = self.connection()?;

        let created = diesel::insert_into(schema::players::table)
            .values(&player)
            .returning(Player::as_returning())
            .get_result(&mut conn)?;

        info!(player_id = created.id(), player_name = %created.player_name(), "Player created");
        Ok(created)
    }

    /// Gets a player by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_by_id(&self, player_id: i32) -> Result<Option<Player>, DbError> {
        debug!(player_id, "Looking up player by id");
        let mut conn = self.connection()?;

        let player = schema::players::table
            .find(player_id)
            .first::<Player>(&mut conn)
            .optional()?;
        Ok(player)
    }

    /// Gets a player by normalized email. Returns `None` if not found.
    ///
    /// Emails are stored lowercased; callers must normalize before lookup so
    /// uniqueness stays case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, email))]
    pub fn find_by_email(&self, email: &str) -> Result<Option<Player>, DbError> {
        debug!("Looking up player by email");
        let mut conn = self.connection()?;

        let player = schema::players::table
            .filter(schema::players::email.eq(email))
            .first::<Player>(&mut conn)
            .optional()?;
        Ok(player)
    }

    /// Gets a player by display name. Returns `None` if not found.
    ///
    /// Display names are not unique; the earliest matching row wins.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_by_name(&self, player_name: &str) -> Result<Option<Player>, DbError> {
        debug!(player_name = %player_name, "Looking up player by name");
        let mut conn = self.connection()?;

        let player = schema::players::table
            .filter(schema::players::player_name.eq(player_name))
            .first::<Player>(&mut conn)
            .optional()?;
        Ok(player)
    }

    /// Attaches a password hash to an account and updates its display name.
    ///
    /// Upgrades a passwordless record in place during signup.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, password_hash))]
    pub fn attach_credentials(
        &self,
        player_id: i32,
        player_name: String,
        password_hash: String,
    ) -> Result<Player, DbError> {
        debug!(player_id, "Attaching credentials");
        let mut conn = self.connection()?;

        let updated = diesel::update(schema::players::table.find(player_id))
            .set((
                schema::players::player_name.eq(player_name),
                schema::players::password_hash.eq(Some(password_hash)),
                schema::players::updated_at.eq(Utc::now().naive_utc()),
            ))
            .returning(Player::as_returning())
            .get_result(&mut conn)?;

        info!(player_id, "Credentials attached");
        Ok(updated)
    }

    /// Updates a player's display name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn rename_player(&self, player_id: i32, player_name: String) -> Result<Player, DbError> {
        debug!(player_id, player_name = %player_name, "Renaming player");
        let mut conn = self.connection()?;

        let updated = diesel::update(schema::players::table.find(player_id))
            .set((
                schema::players::player_name.eq(player_name),
                schema::players::updated_at.eq(Utc::now().naive_utc()),
            ))
            .returning(Player::as_returning())
            .get_result(&mut conn)?;
        Ok(updated)
    }

    /// Merges a session batch into a player's aggregates and records the
    /// session, atomically.
    ///
    /// The read-merge-write runs inside one transaction so concurrent saves
    /// for the same player serialize instead of interleaving per-field
    /// updates.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the player does not exist or a database error
    /// occurs.
    #[instrument(skip(self, batch), fields(games = batch.games_played))]
    pub fn save_session(
        &self,
        player_id: i32,
        batch: &SessionBatch,
        reported_win_rate: f64,
    ) -> Result<(Player, GameSession), DbError> {
        debug!(player_id, "Saving session");
        let mut conn = self.connection()?;

        let result = conn.transaction::<_, DbError, _>(|conn| {
            let player: Player = schema::players::table.find(player_id).first(conn)?;

            let now = Utc::now();
            let merged = apply_batch(&player.snapshot()?, batch, now);
            let history_json = serde_json::to_string(&merged.history)?;
            let stamp = now.naive_utc();

            let updated = diesel::update(schema::players::table.find(player_id))
                .set((
                    schema::players::total_games.eq(to_column(merged.total_games)),
                    schema::players::total_wins.eq(to_column(merged.total_wins)),
                    schema::players::current_streak.eq(to_column(merged.current_streak)),
                    schema::players::max_streak.eq(to_column(merged.max_streak)),
                    schema::players::best_score.eq(to_column(merged.best_score)),
                    schema::players::game_history.eq(history_json),
                    schema::players::last_played.eq(stamp),
                    schema::players::updated_at.eq(stamp),
                ))
                .returning(Player::as_returning())
                .get_result::<Player>(conn)?;

            let session = NewGameSession::new(
                player_id,
                format!("session_{}_{}", player_id, now.timestamp_millis()),
                to_column(batch.peak_score),
                to_column(batch.games_played),
                to_column(batch.games_won),
                reported_win_rate,
                to_column(batch.ending_streak),
                to_column(batch.peak_streak),
                serde_json::to_string(&batch.history)?,
                Some(stamp),
            );
            let session = diesel::insert_into(schema::game_sessions::table)
                .values(&session)
                .returning(GameSession::as_returning())
                .get_result(conn)?;

            Ok((updated, session))
        })?;

        info!(
            player_id,
            session_id = result.1.id(),
            total_games = result.0.total_games(),
            "Session saved"
        );
        Ok(result)
    }

    /// Loads the top players ordered descending by the given sort key.
    ///
    /// Ties keep natural storage order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn leaderboard(&self, limit: i64, sort: LeaderboardSort) -> Result<Vec<Player>, DbError> {
        debug!(limit, ?sort, "Loading leaderboard");
        let mut conn = self.connection()?;

        let query = schema::players::table.into_boxed();
        let query = match sort {
            LeaderboardSort::BestScore => query.order(schema::players::best_score.desc()),
            LeaderboardSort::TotalWins => query.order(schema::players::total_wins.desc()),
            LeaderboardSort::TotalGames => query.order(schema::players::total_games.desc()),
            LeaderboardSort::MaxStreak => query.order(schema::players::max_streak.desc()),
        };

        let players = query.limit(limit).load::<Player>(&mut conn)?;
        info!(count = players.len(), "Leaderboard loaded");
        Ok(players)
    }

    /// Counts all player accounts.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn count_players(&self) -> Result<i64, DbError> {
        let mut conn = self.connection()?;
        Ok(schema::players::table.count().get_result(&mut conn)?)
    }

    /// Sums lifetime games and wins across all players.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn total_counts(&self) -> Result<(i64, i64), DbError> {
        let mut conn = self.connection()?;

        let (games, wins) = schema::players::table
            .select((
                diesel::dsl::sum(schema::players::total_games),
                diesel::dsl::sum(schema::players::total_wins),
            ))
            .first::<(Option<i64>, Option<i64>)>(&mut conn)?;
        Ok((games.unwrap_or(0), wins.unwrap_or(0)))
    }

    /// Gets the player with the highest best score, if any exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn top_player(&self) -> Result<Option<Player>, DbError> {
        let mut conn = self.connection()?;

        let player = schema::players::table
            .order(schema::players::best_score.desc())
            .first::<Player>(&mut conn)
            .optional()?;
        Ok(player)
    }

    /// Gets the players who saved most recently, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn recent_players(&self, limit: i64) -> Result<Vec<Player>, DbError> {
        let mut conn = self.connection()?;

        let players = schema::players::table
            .order(schema::players::last_played.desc())
            .limit(limit)
            .load::<Player>(&mut conn)?;
        Ok(players)
    }
}
