//! HTTP client for the backend REST API.

use derive_more::{Display, Error, From};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::api::{
    LeaderboardResponse, LoginResponse, SaveScoreResponse, SignupResponse, StatsResponse,
};
use crate::client::GameState;

/// Client-side request failure.
#[derive(Debug, Display, Error, From)]
pub enum ClientError {
    /// Transport-level failure.
    #[display("Request failed: {_0}")]
    #[from]
    Http(reqwest::Error),
    /// The server answered with a non-success status.
    #[display("Server responded {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message from the response body, if the server sent one.
        #[error(ignore)]
        message: String,
    },
}

/// Thin typed wrapper over the backend REST endpoints.
///
/// Calls are fire-and-forget from the game's perspective: a failure is
/// reported to the caller and local state stays untouched.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Registers an account.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-2xx response.
    #[instrument(skip(self, password))]
    pub async fn signup(
        &self,
        email: &str,
        player_name: &str,
        password: &str,
    ) -> Result<SignupResponse, ClientError> {
        let body = json!({
            "email": email,
            "playerName": player_name,
            "password": password,
        });
        self.post_json("/api/auth/signup", &body, None).await
    }

    /// Logs in, optionally renaming a passwordless account.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-2xx response.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        player_name: Option<&str>,
        password: Option<&str>,
    ) -> Result<LoginResponse, ClientError> {
        let mut body = json!({ "email": email });
        if let Some(name) = player_name {
            body["playerName"] = json!(name);
        }
        if let Some(password) = password {
            body["password"] = json!(password);
        }
        self.post_json("/api/auth/login", &body, None).await
    }

    /// Reports the current session to the score endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-2xx response.
    #[instrument(skip_all)]
    pub async fn save_score(
        &self,
        token: &str,
        state: &GameState,
    ) -> Result<SaveScoreResponse, ClientError> {
        let body = json!({
            "playerName": state.player_name,
            "score": state.user_score,
            "totalGames": state.total_games,
            "totalWins": state.total_wins,
            "winRate": state.win_rate_percent(),
            "currentStreak": state.current_streak,
            "maxStreak": state.max_streak,
            "gameHistory": state.game_history,
        });
        self.post_json("/api/scores", &body, Some(token)).await
    }

    /// Fetches the leaderboard.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-2xx response.
    #[instrument(skip(self))]
    pub async fn leaderboard(&self, limit: i64) -> Result<LeaderboardResponse, ClientError> {
        let url = format!("{}/api/leaderboard?limit={}", self.base_url, limit);
        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }

    /// Fetches the global stats view.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-2xx response.
    #[instrument(skip(self))]
    pub async fn global_stats(&self) -> Result<StatsResponse, ClientError> {
        let url = format!("{}/api/stats", self.base_url);
        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST");

        let mut request = self.client.post(&url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Self::decode(request.send().await?).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|v| {
                v.get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| status.to_string());
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
