use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Result, TabError};

fn default_requests_per_window() -> u32 {
    60
}

fn default_window_pause_secs() -> u64 {
    65
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub chat: ChatConfig,
    pub mt: MtConfig,
    pub cache: CacheConfig,
}

/// Locally hosted open-weight inference engine (OpenAI-compatible serve).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine endpoint URL
    pub endpoint: String,
    /// Maximum model context length the engine is deployed with
    pub max_model_len: usize,
    /// Numeric precision the engine is deployed with
    pub dtype: String,
    /// Whether the engine caches shared prompt prefixes across requests
    pub enable_prefix_caching: bool,
    /// Wrap each input in a single-turn chat template before submission
    pub apply_chat_template: bool,
}

/// Commercial chat-completion API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Chat completions endpoint URL
    pub endpoint: String,
    /// API key; required to construct the chat backend
    pub api_key: Option<String>,
    /// Requests allowed per throttle window
    #[serde(default = "default_requests_per_window")]
    pub requests_per_window: u32,
    /// Pause after a full window, in seconds
    #[serde(default = "default_window_pause_secs")]
    pub window_pause_secs: u64,
}

/// Dedicated machine-translation APIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtConfig {
    /// Vendor MT endpoint (per-item requests)
    pub vendor_endpoint: String,
    /// Web translation endpoint (whole batch in one request)
    pub web_endpoint: String,
    /// Vendor auth key; required to construct either MT backend
    pub auth_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Where the engine keeps downloaded model weights. Passed along
    /// explicitly; never written into the process environment.
    pub model_cache_home: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig {
                endpoint: "http://localhost:8000".to_string(),
                max_model_len: 4096,
                dtype: "bfloat16".to_string(),
                enable_prefix_caching: true,
                apply_chat_template: true,
            },
            chat: ChatConfig {
                endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
                api_key: None,
                requests_per_window: default_requests_per_window(),
                window_pause_secs: default_window_pause_secs(),
            },
            mt: MtConfig {
                vendor_endpoint: "https://api-free.deepl.com/v2/translate".to_string(),
                web_endpoint: "https://translation.googleapis.com/language/translate/v2"
                    .to_string(),
                auth_key: None,
            },
            cache: CacheConfig {
                model_cache_home: None,
            },
        }
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TabError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| TabError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Load configuration: explicit path, else `tabtrans.toml` in the current
    /// directory, else defaults. Environment overrides apply last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                if Path::new("tabtrans.toml").exists() {
                    info!("Found tabtrans.toml in current directory, loading...");
                    Self::from_file("tabtrans.toml")?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Credentials and cache home from the process environment take
    /// precedence over the settings file.
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("CHAT_API_KEY") {
            if !key.is_empty() {
                self.chat.api_key = Some(key);
            }
        }
        if let Ok(key) = std::env::var("MT_AUTH_KEY") {
            if !key.is_empty() {
                self.mt.auth_key = Some(key);
            }
        }
        if let Ok(dir) = std::env::var("TABTRANS_CACHE_HOME") {
            if !dir.is_empty() {
                self.cache.model_cache_home = Some(PathBuf::from(dir));
            }
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TabError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TabError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
