//! Service layer tying the Twitch, IGDB, and classifier clients together.

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::clip::ClipClient;
use crate::config::{DynamicConfig, RuntimeConfig};
use crate::error::{ServiceError, ServiceResult};
use crate::igdb::{Game, IgdbClient, IgdbCredentials, LookupEndpoint};
use crate::render;
use crate::twitch::{AccessToken, TwitchAuthClient};

/// Refresh the cached token this long before it actually expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// HTTP clients built from a dynamic config snapshot
struct Clients {
    igdb: IgdbClient,
    twitch: TwitchAuthClient,
    clip: ClipClient,
}

impl Clients {
    fn build(config: &DynamicConfig) -> Self {
        Self {
            igdb: IgdbClient::new(&config.igdb.base_url, config.igdb.request_timeout_secs),
            twitch: TwitchAuthClient::new(&config.twitch.token_url, 15),
            clip: ClipClient::new(&config.clip.base_url, config.clip.request_timeout_secs),
        }
    }
}

/// Cached OAuth token
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Main service
pub struct GamedexService {
    pub config: Arc<RuntimeConfig>,
    clients: ArcSwap<Clients>,
    token: RwLock<Option<CachedToken>>,
    lookup_cache: DashMap<(LookupEndpoint, u64), String>,
}

impl GamedexService {
    pub fn new(config: Arc<RuntimeConfig>) -> Self {
        let clients = Clients::build(&config.dynamic());

        Self {
            config,
            clients: ArcSwap::from_pointee(clients),
            token: RwLock::new(None),
            lookup_cache: DashMap::new(),
        }
    }

    /// Apply validated settings, swap the dynamic config, and rebuild
    /// everything derived from it.
    pub async fn apply_settings(
        &self,
        settings: &std::collections::HashMap<String, serde_json::Value>,
    ) -> ServiceResult<DynamicConfig> {
        let valid_keys = DynamicConfig::valid_keys();
        for key in settings.keys() {
            if !valid_keys.contains(key.as_str()) {
                return Err(ServiceError::InvalidRequest {
                    message: format!("Unknown setting key: {}", key),
                });
            }
        }

        let mut updated = (**self.config.dynamic()).clone();
        updated.merge_settings(settings);
        self.config.update_dynamic(updated.clone());
        self.clients.store(Arc::new(Clients::build(&updated)));

        // Credentials or base URLs may have changed; drop cached state.
        // Waits out any in-flight refresh so a token minted for the old
        // credentials cannot survive the update.
        *self.token.write().await = None;
        self.lookup_cache.clear();

        info!(count = settings.len(), "Applied settings update");
        Ok(updated)
    }

    // ==================== Token handling ====================

    /// Exchange explicit credentials for a token (panel "Get Access Token" flow)
    pub async fn exchange_token(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> ServiceResult<AccessToken> {
        let clients = self.clients.load_full();
        let token = clients.twitch.fetch_token(client_id, client_secret).await?;
        Ok(token)
    }

    /// Get a valid access token for the configured credentials, fetching or
    /// refreshing as needed.
    async fn access_token(&self) -> ServiceResult<String> {
        {
            let cached = self.token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > Instant::now() {
                    return Ok(token.value.clone());
                }
            }
        }

        let (client_id, client_secret) = {
            let config = self.config.dynamic();
            if !config.twitch.is_configured() {
                return Err(ServiceError::Config {
                    message: "Twitch credentials are not configured".to_string(),
                });
            }
            (
                config.twitch.client_id.clone(),
                config.twitch.client_secret.clone(),
            )
        };

        let mut cached = self.token.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let clients = self.clients.load_full();
        let token = clients
            .twitch
            .fetch_token(&client_id, &client_secret)
            .await?;
        debug!(expires_in = token.expires_in, "Fetched new access token");

        let expires_at = Instant::now()
            + Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at,
        });

        Ok(token.access_token)
    }

    /// Credentials for an IGDB request
    async fn credentials(&self) -> ServiceResult<IgdbCredentials> {
        let access_token = self.access_token().await?;
        let client_id = self.config.dynamic().twitch.client_id.clone();
        Ok(IgdbCredentials {
            client_id,
            access_token,
        })
    }

    // ==================== IGDB operations ====================

    /// Search for the best-matching game by name
    pub async fn search_game(&self, name: &str) -> ServiceResult<Option<Game>> {
        let credentials = self.credentials().await?;
        let clients = self.clients.load_full();
        let games = clients.igdb.search_games(&credentials, name, 1).await?;
        Ok(games.into_iter().next())
    }

    /// Formatted game search results
    pub async fn game_search_report(&self, name: &str, limit: u32) -> ServiceResult<String> {
        let credentials = self.credentials().await?;
        let clients = self.clients.load_full();
        let games = clients.igdb.search_games(&credentials, name, limit).await?;
        Ok(render::format_game_list(&games))
    }

    /// Formatted unfiltered character listing
    pub async fn character_list_report(&self, limit: Option<u32>) -> ServiceResult<String> {
        let limit = limit.unwrap_or_else(|| self.config.dynamic().igdb.character_list_limit);
        let credentials = self.credentials().await?;
        let clients = self.clients.load_full();
        let characters = clients.igdb.list_characters(&credentials, limit).await?;
        Ok(render::format_character_list(&characters))
    }

    /// Resolve a lookup ID to a name, falling back to the ID rendered as a
    /// string when the lookup has no entry for it.
    pub async fn resolve_lookup(
        &self,
        endpoint: LookupEndpoint,
        lookup_id: u64,
    ) -> ServiceResult<String> {
        if let Some(name) = self.lookup_cache.get(&(endpoint, lookup_id)) {
            return Ok(name.clone());
        }

        let credentials = self.credentials().await?;
        let clients = self.clients.load_full();
        let name = clients
            .igdb
            .resolve_lookup(&credentials, endpoint, lookup_id)
            .await?
            .unwrap_or_else(|| lookup_id.to_string());

        self.lookup_cache.insert((endpoint, lookup_id), name.clone());
        Ok(name)
    }

    /// Formatted report of a game and all of its characters, with gender and
    /// species references resolved to names.
    pub async fn game_characters_report(&self, game_name: &str) -> ServiceResult<String> {
        let game = self
            .search_game(game_name)
            .await?
            .ok_or_else(|| ServiceError::GameNotFound {
                name: game_name.to_string(),
            })?;

        let credentials = self.credentials().await?;
        let clients = self.clients.load_full();
        let limit = self.config.dynamic().igdb.game_characters_limit;
        let characters = clients
            .igdb
            .characters_for_game(&credentials, game.id, limit)
            .await?;

        if characters.is_empty() {
            return Ok(format!("No characters found for '{}'.", game.name));
        }

        let mut resolved = Vec::with_capacity(characters.len());
        for character in characters {
            let gender = match character.gender {
                Some(id) => Some(self.resolve_lookup(LookupEndpoint::Gender, id).await?),
                None => None,
            };
            let species = match character.species {
                Some(id) => Some(self.resolve_lookup(LookupEndpoint::Species, id).await?),
                None => None,
            };
            resolved.push(render::ResolvedCharacter {
                name: character.name,
                gender,
                species,
                description: character.description,
            });
        }

        Ok(render::format_game_report(&game, &resolved))
    }

    // ==================== Identification ====================

    /// Identify which of a game's characters an image most resembles
    pub async fn identify_character(
        &self,
        game_name: &str,
        image: &[u8],
    ) -> ServiceResult<String> {
        let game = self
            .search_game(game_name)
            .await?
            .ok_or_else(|| ServiceError::GameNotFound {
                name: game_name.to_string(),
            })?;

        let credentials = self.credentials().await?;
        let clients = self.clients.load_full();
        let limit = self.config.dynamic().igdb.game_characters_limit;
        let characters = clients
            .igdb
            .characters_for_game(&credentials, game.id, limit)
            .await?;

        if characters.is_empty() {
            return Err(ServiceError::NoCharacters { game: game.name });
        }

        let labels: Vec<String> = characters.into_iter().map(|c| c.name).collect();
        debug!(game = %game.name, candidates = labels.len(), "Classifying image");
        let scores = clients.clip.classify(image, &labels).await?;

        Ok(render::format_identification(&game, &scores))
    }

    /// Check if the classifier endpoint is reachable
    pub async fn clip_healthy(&self) -> bool {
        self.clients.load_full().clip.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticConfig;
    use std::collections::HashMap;

    fn test_service() -> GamedexService {
        let static_config: StaticConfig =
            serde_json::from_value(serde_json::json!({})).unwrap();
        let dynamic: DynamicConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        let runtime = RuntimeConfig::from_parts(static_config, dynamic);
        GamedexService::new(Arc::new(runtime))
    }

    #[test]
    fn test_apply_settings_rejects_unknown_keys() {
        let service = test_service();
        let mut settings = HashMap::new();
        settings.insert("igdb.nonsense".to_string(), serde_json::json!(1));

        let result = tokio_test::block_on(service.apply_settings(&settings));
        assert!(matches!(
            result,
            Err(ServiceError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_apply_settings_swaps_dynamic_config() {
        let service = test_service();
        let mut settings = HashMap::new();
        settings.insert(
            "twitch.client_id".to_string(),
            serde_json::Value::String("abc123".to_string()),
        );
        settings.insert(
            "igdb.character_list_limit".to_string(),
            serde_json::json!(3),
        );

        let updated = tokio_test::block_on(service.apply_settings(&settings)).unwrap();
        assert_eq!(updated.twitch.client_id, "abc123");
        assert_eq!(service.config.dynamic().igdb.character_list_limit, 3);
    }

    #[test]
    fn test_apply_settings_drops_cached_token() {
        let service = test_service();
        tokio_test::block_on(async {
            *service.token.write().await = Some(CachedToken {
                value: "stale-token".to_string(),
                expires_at: Instant::now() + Duration::from_secs(3600),
            });

            let mut settings = HashMap::new();
            settings.insert(
                "twitch.client_secret".to_string(),
                serde_json::Value::String("rotated".to_string()),
            );
            service.apply_settings(&settings).await.unwrap();

            assert!(service.token.read().await.is_none());
        });
    }

    #[test]
    fn test_access_token_requires_credentials() {
        let service = test_service();
        let result = tokio_test::block_on(service.access_token());
        assert!(matches!(result, Err(ServiceError::Config { .. })));
    }
}
