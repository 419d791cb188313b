//! IGDB API client implementation.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::LookupEndpoint;
use super::error::IgdbError;
use super::query::Query;
use super::responses::{Character, Game, LookupEntry};

/// Default base URL for the IGDB API
const DEFAULT_BASE_URL: &str = "https://api.igdb.com/v4";

/// Default timeout for API requests
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Credentials attached to every IGDB request
#[derive(Debug, Clone)]
pub struct IgdbCredentials {
    pub client_id: String,
    pub access_token: String,
}

/// IGDB API client
#[derive(Clone)]
pub struct IgdbClient {
    client: Client,
    base_url: String,
}

impl Default for IgdbClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS)
    }
}

impl IgdbClient {
    /// Create a new IGDB client
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("gamedex/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// POST an Apicalypse query to an endpoint and decode the JSON array
    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        credentials: &IgdbCredentials,
        query: &str,
    ) -> Result<Vec<T>, IgdbError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(endpoint, query, "IGDB request");

        let response = self
            .client
            .post(&url)
            .header("Client-ID", &credentials.client_id)
            .bearer_auth(&credentials.access_token)
            .body(query.to_string())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IgdbError::Api {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let results: Vec<T> = response.json().await?;
        Ok(results)
    }

    /// Search for games by name
    pub async fn search_games(
        &self,
        credentials: &IgdbCredentials,
        name: &str,
        limit: u32,
    ) -> Result<Vec<Game>, IgdbError> {
        let query = Query::new()
            .search(name)
            .fields(&["id", "name", "summary", "url"])
            .limit(limit)
            .build();

        self.post("games", credentials, &query).await
    }

    /// List characters appearing in a specific game
    pub async fn characters_for_game(
        &self,
        credentials: &IgdbCredentials,
        game_id: u64,
        limit: u32,
    ) -> Result<Vec<Character>, IgdbError> {
        let query = Query::new()
            .fields(&["name", "description", "gender", "species", "url"])
            .where_member("games", game_id)
            .limit(limit)
            .build();

        self.post("characters", credentials, &query).await
    }

    /// List characters without any filter
    pub async fn list_characters(
        &self,
        credentials: &IgdbCredentials,
        limit: u32,
    ) -> Result<Vec<Character>, IgdbError> {
        let query = Query::new()
            .fields(&["id", "name", "gender", "species", "description"])
            .limit(limit)
            .build();

        self.post("characters", credentials, &query).await
    }

    /// Resolve a lookup ID into its display name, if the ID exists
    pub async fn resolve_lookup(
        &self,
        credentials: &IgdbCredentials,
        endpoint: LookupEndpoint,
        lookup_id: u64,
    ) -> Result<Option<String>, IgdbError> {
        let query = Query::new()
            .fields(&["name"])
            .where_eq("id", lookup_id)
            .limit(1)
            .build();

        let entries: Vec<LookupEntry> = self.post(endpoint.as_str(), credentials, &query).await?;
        Ok(entries.into_iter().next().map(|entry| entry.name))
    }
}
