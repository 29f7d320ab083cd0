//! Environment-driven configuration.

use tracing::warn;

/// Fallback signing secret; fine for development, warned about otherwise.
const DEFAULT_JWT_SECRET: &str = "change-me-in-env";

/// Server configuration resolved from the environment.
///
/// CLI flags override individual fields after [`Config::from_env`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// SQLite database path.
    pub database_url: String,
    /// Secret used to sign identity claims.
    pub jwt_secret: String,
    /// Production mode: redact internal errors, keep serving when the
    /// database is down at startup.
    pub production: bool,
}

impl Config {
    /// Reads configuration from the environment.
    ///
    /// Recognized variables: `HOST`, `PORT`, `DATABASE_URL`, `JWT_SECRET`,
    /// and `APP_ENV` (`production` enables production mode). Call after
    /// `dotenvy::dotenv()` so a `.env` file is honored.
    pub fn from_env() -> Self {
        let production = std::env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let jwt_secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());
        if production && jwt_secret == DEFAULT_JWT_SECRET {
            warn!("JWT_SECRET is unset in production; tokens are forgeable");
        }

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "rps_arena.db".to_string()),
            jwt_secret,
            production,
        }
    }
}
