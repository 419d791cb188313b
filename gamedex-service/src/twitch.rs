//! Twitch OAuth token exchange.
//!
//! IGDB authenticates with Twitch client-credentials tokens. This is the
//! single POST against the Twitch token endpoint; caching and refresh
//! live in the service layer.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Twitch OAuth token endpoint
const DEFAULT_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Default timeout for the token exchange
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, thiserror::Error)]
pub enum TwitchAuthError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Token exchange rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Token returned by the client-credentials grant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub expires_in: u64,
    pub token_type: String,
}

/// Twitch OAuth client
#[derive(Clone)]
pub struct TwitchAuthClient {
    client: Client,
    token_url: String,
}

impl Default for TwitchAuthClient {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_URL, DEFAULT_TIMEOUT_SECS)
    }
}

impl TwitchAuthClient {
    /// Create a new Twitch OAuth client
    pub fn new(token_url: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("gamedex/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            token_url: token_url.to_string(),
        }
    }

    /// Exchange client credentials for an access token
    pub async fn fetch_token(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<AccessToken, TwitchAuthError> {
        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("grant_type", "client_credentials"),
        ];

        let response = self.client.post(&self.token_url).form(&params).send().await?;

        if !response.status().is_success() {
            return Err(TwitchAuthError::Rejected {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let token: AccessToken = response.json().await?;
        Ok(token)
    }
}
