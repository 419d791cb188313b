use arc_swap::ArcSwap;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::ServiceResult;

// ==================== Static Configuration (startup-only) ====================

/// Static configuration that cannot be changed at runtime
/// These settings affect server binding or require restart to change
#[derive(Debug, Clone, Deserialize)]
pub struct StaticConfig {
    #[serde(default = "default_server")]
    pub server: ServerConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

// ==================== Dynamic Configuration (hot-reloadable) ====================

/// Dynamic configuration that can be updated at runtime via the settings API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicConfig {
    #[serde(default)]
    pub twitch: TwitchConfig,

    #[serde(default = "default_igdb")]
    pub igdb: IgdbConfig,

    #[serde(default = "default_clip")]
    pub clip: ClipConfig,

    #[serde(default = "default_mcp")]
    pub mcp: McpConfig,

    #[serde(default = "default_limits")]
    pub limits: LimitsConfig,
}

/// Twitch OAuth configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitchConfig {
    /// Twitch Client ID. Empty until set via config, env, or the panel.
    #[serde(default)]
    pub client_id: String,

    /// Twitch Client Secret. Empty until set via config, env, or the panel.
    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,
}

impl Default for TwitchConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_url: default_token_url(),
        }
    }
}

impl TwitchConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

/// IGDB API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgdbConfig {
    #[serde(default = "default_igdb_url")]
    pub base_url: String,

    #[serde(default = "default_igdb_timeout")]
    pub request_timeout_secs: u64,

    /// Default limit for the unfiltered character listing
    #[serde(default = "default_character_list_limit")]
    pub character_list_limit: u32,

    /// Limit when fetching every character for a game
    #[serde(default = "default_game_characters_limit")]
    pub game_characters_limit: u32,
}

impl Default for IgdbConfig {
    fn default() -> Self {
        default_igdb()
    }
}

/// CLIP classifier endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipConfig {
    #[serde(default = "default_clip_url")]
    pub base_url: String,

    #[serde(default = "default_clip_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ClipConfig {
    fn default() -> Self {
        default_clip()
    }
}

/// MCP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    #[serde(default = "default_mcp_path")]
    pub path: String,

    #[serde(default = "default_mcp_enabled")]
    pub enabled: bool,
}

/// Size limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum accepted upload size for identification images
    #[serde(default = "default_max_image_size")]
    pub max_image_size_bytes: u64,
}

// ==================== DynamicConfig Settings Keys ====================

/// All valid setting keys for DynamicConfig
pub const VALID_SETTING_KEYS: &[&str] = &[
    "twitch.client_id",
    "twitch.client_secret",
    "twitch.token_url",
    "igdb.base_url",
    "igdb.request_timeout_secs",
    "igdb.character_list_limit",
    "igdb.game_characters_limit",
    "clip.base_url",
    "clip.request_timeout_secs",
    "mcp.path",
    "mcp.enabled",
    "limits.max_image_size_bytes",
];

impl DynamicConfig {
    /// Get all valid setting keys
    pub fn valid_keys() -> HashSet<&'static str> {
        VALID_SETTING_KEYS.iter().copied().collect()
    }

    /// Convert config to key-value map for API response.
    /// The client secret is masked; it can be written but never read back.
    pub fn to_key_value_map(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();

        map.insert(
            "twitch.client_id".to_string(),
            serde_json::Value::String(self.twitch.client_id.clone()),
        );
        map.insert(
            "twitch.client_secret".to_string(),
            serde_json::Value::String(if self.twitch.client_secret.is_empty() {
                String::new()
            } else {
                "********".to_string()
            }),
        );
        map.insert(
            "twitch.token_url".to_string(),
            serde_json::Value::String(self.twitch.token_url.clone()),
        );

        map.insert(
            "igdb.base_url".to_string(),
            serde_json::Value::String(self.igdb.base_url.clone()),
        );
        map.insert(
            "igdb.request_timeout_secs".to_string(),
            serde_json::json!(self.igdb.request_timeout_secs),
        );
        map.insert(
            "igdb.character_list_limit".to_string(),
            serde_json::json!(self.igdb.character_list_limit),
        );
        map.insert(
            "igdb.game_characters_limit".to_string(),
            serde_json::json!(self.igdb.game_characters_limit),
        );

        map.insert(
            "clip.base_url".to_string(),
            serde_json::Value::String(self.clip.base_url.clone()),
        );
        map.insert(
            "clip.request_timeout_secs".to_string(),
            serde_json::json!(self.clip.request_timeout_secs),
        );

        map.insert(
            "mcp.path".to_string(),
            serde_json::Value::String(self.mcp.path.clone()),
        );
        map.insert(
            "mcp.enabled".to_string(),
            serde_json::json!(self.mcp.enabled),
        );

        map.insert(
            "limits.max_image_size_bytes".to_string(),
            serde_json::json!(self.limits.max_image_size_bytes),
        );

        map
    }

    /// Apply a map of setting overrides
    pub fn merge_settings(&mut self, settings: &HashMap<String, serde_json::Value>) {
        for (key, value) in settings {
            self.apply_setting(key, value);
        }
    }

    /// Apply a single setting value
    fn apply_setting(&mut self, key: &str, value: &serde_json::Value) {
        match key {
            "twitch.client_id" => {
                if let Some(v) = value.as_str() {
                    self.twitch.client_id = v.to_string();
                }
            }
            "twitch.client_secret" => {
                if let Some(v) = value.as_str() {
                    self.twitch.client_secret = v.to_string();
                }
            }
            "twitch.token_url" => {
                if let Some(v) = value.as_str() {
                    self.twitch.token_url = v.to_string();
                }
            }

            "igdb.base_url" => {
                if let Some(v) = value.as_str() {
                    self.igdb.base_url = v.to_string();
                }
            }
            "igdb.request_timeout_secs" => {
                if let Some(v) = value.as_u64() {
                    self.igdb.request_timeout_secs = v;
                }
            }
            "igdb.character_list_limit" => {
                if let Some(v) = value.as_u64() {
                    self.igdb.character_list_limit = v as u32;
                }
            }
            "igdb.game_characters_limit" => {
                if let Some(v) = value.as_u64() {
                    self.igdb.game_characters_limit = v as u32;
                }
            }

            "clip.base_url" => {
                if let Some(v) = value.as_str() {
                    self.clip.base_url = v.to_string();
                }
            }
            "clip.request_timeout_secs" => {
                if let Some(v) = value.as_u64() {
                    self.clip.request_timeout_secs = v;
                }
            }

            "mcp.path" => {
                if let Some(v) = value.as_str() {
                    self.mcp.path = v.to_string();
                }
            }
            "mcp.enabled" => {
                if let Some(v) = value.as_bool() {
                    self.mcp.enabled = v;
                }
            }

            "limits.max_image_size_bytes" => {
                if let Some(v) = value.as_u64() {
                    self.limits.max_image_size_bytes = v;
                }
            }

            _ => {
                tracing::warn!(key = %key, "Unknown setting key in merge_settings");
            }
        }
    }
}

// ==================== RuntimeConfig (combines static + dynamic) ====================

/// Runtime configuration manager
/// Combines static config (startup-only) with dynamic config (hot-reloadable via ArcSwap)
pub struct RuntimeConfig {
    /// Static configuration (never changes after startup)
    pub static_config: StaticConfig,
    /// Dynamic configuration (can be hot-reloaded)
    dynamic: ArcSwap<DynamicConfig>,
}

impl RuntimeConfig {
    /// Get current dynamic config snapshot (lock-free read)
    pub fn dynamic(&self) -> arc_swap::Guard<Arc<DynamicConfig>> {
        self.dynamic.load()
    }

    /// Update dynamic config (atomic swap)
    pub fn update_dynamic(&self, new_config: DynamicConfig) {
        self.dynamic.store(Arc::new(new_config));
    }

    /// Build a RuntimeConfig from already-constructed parts
    #[cfg(test)]
    pub fn from_parts(static_config: StaticConfig, dynamic: DynamicConfig) -> Self {
        Self {
            static_config,
            dynamic: ArcSwap::from_pointee(dynamic),
        }
    }

    /// Load config from file and env vars
    pub fn load() -> ServiceResult<Self> {
        let static_config = load_static_config()?;
        let dynamic = load_dynamic_config()?;

        Ok(Self {
            static_config,
            dynamic: ArcSwap::from_pointee(dynamic),
        })
    }
}

// ==================== Config Loading Functions ====================

/// Load static configuration from file and env vars
fn load_static_config() -> ServiceResult<StaticConfig> {
    Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("GAMEDEX")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| crate::error::ServiceError::Config {
            message: format!("Failed to build config: {}", e),
        })?
        .try_deserialize()
        .map_err(|e| crate::error::ServiceError::Config {
            message: format!("Failed to deserialize static config: {}", e),
        })
}

/// Load dynamic configuration from file and env vars
fn load_dynamic_config() -> ServiceResult<DynamicConfig> {
    Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("GAMEDEX")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| crate::error::ServiceError::Config {
            message: format!("Failed to build config: {}", e),
        })?
        .try_deserialize()
        .map_err(|e| crate::error::ServiceError::Config {
            message: format!("Failed to deserialize dynamic config: {}", e),
        })
}

// ==================== Default Value Functions ====================

fn default_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_token_url() -> String {
    "https://id.twitch.tv/oauth2/token".to_string()
}

fn default_igdb() -> IgdbConfig {
    IgdbConfig {
        base_url: default_igdb_url(),
        request_timeout_secs: default_igdb_timeout(),
        character_list_limit: default_character_list_limit(),
        game_characters_limit: default_game_characters_limit(),
    }
}

fn default_igdb_url() -> String {
    "https://api.igdb.com/v4".to_string()
}

fn default_igdb_timeout() -> u64 {
    30
}

fn default_character_list_limit() -> u32 {
    10
}

fn default_game_characters_limit() -> u32 {
    500
}

fn default_clip() -> ClipConfig {
    ClipConfig {
        base_url: default_clip_url(),
        request_timeout_secs: default_clip_timeout(),
    }
}

fn default_clip_url() -> String {
    "http://localhost:8765".to_string()
}

fn default_clip_timeout() -> u64 {
    60
}

fn default_mcp() -> McpConfig {
    McpConfig {
        path: default_mcp_path(),
        enabled: default_mcp_enabled(),
    }
}

fn default_mcp_path() -> String {
    "/mcp".to_string()
}

fn default_mcp_enabled() -> bool {
    true
}

fn default_limits() -> LimitsConfig {
    LimitsConfig {
        max_image_size_bytes: default_max_image_size(),
    }
}

fn default_max_image_size() -> u64 {
    10_485_760 // 10MB
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_dynamic() -> DynamicConfig {
        serde_json::from_value(serde_json::json!({})).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = default_dynamic();
        assert_eq!(config.igdb.base_url, "https://api.igdb.com/v4");
        assert_eq!(config.twitch.token_url, "https://id.twitch.tv/oauth2/token");
        assert_eq!(config.igdb.character_list_limit, 10);
        assert_eq!(config.igdb.game_characters_limit, 500);
        assert!(config.mcp.enabled);
        assert_eq!(config.mcp.path, "/mcp");
        assert!(!config.twitch.is_configured());
    }

    #[test]
    fn test_key_value_map_covers_valid_keys() {
        let config = default_dynamic();
        let map = config.to_key_value_map();
        for key in VALID_SETTING_KEYS {
            assert!(map.contains_key(*key), "missing key: {}", key);
        }
        assert_eq!(map.len(), VALID_SETTING_KEYS.len());
    }

    #[test]
    fn test_client_secret_is_masked() {
        let mut config = default_dynamic();
        config.twitch.client_secret = "hunter2".to_string();
        let map = config.to_key_value_map();
        assert_eq!(
            map["twitch.client_secret"],
            serde_json::Value::String("********".to_string())
        );
    }

    #[test]
    fn test_merge_settings() {
        let mut config = default_dynamic();
        let mut settings = HashMap::new();
        settings.insert(
            "twitch.client_id".to_string(),
            serde_json::Value::String("abc123".to_string()),
        );
        settings.insert(
            "igdb.character_list_limit".to_string(),
            serde_json::json!(25),
        );
        settings.insert("mcp.enabled".to_string(), serde_json::json!(false));

        config.merge_settings(&settings);

        assert_eq!(config.twitch.client_id, "abc123");
        assert_eq!(config.igdb.character_list_limit, 25);
        assert!(!config.mcp.enabled);
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let mut config = default_dynamic();
        let mut settings = HashMap::new();
        settings.insert("nope.nothing".to_string(), serde_json::json!(1));
        config.merge_settings(&settings);
        assert_eq!(config.igdb.character_list_limit, 10);
    }
}
