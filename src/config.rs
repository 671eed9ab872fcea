use std::fmt;
use std::net::SocketAddr;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash-preview-05-20";
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_VISION_MODEL: &str = "gemini-1.5-pro-latest";
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),
}

/// Upstream credential. Never printed, not even in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for an empty key so a blank variable counts as unset.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Models {
    /// Model behind `action: "chat"`.
    pub chat: String,
    /// Speech model, shared by both request variants.
    pub tts: String,
    /// Bare proxy default.
    pub text: String,
    /// Bare proxy model for requests carrying inline data.
    pub vision: String,
}

impl Default for Models {
    fn default() -> Self {
        Self {
            chat: DEFAULT_CHAT_MODEL.to_string(),
            tts: DEFAULT_TTS_MODEL.to_string(),
            text: DEFAULT_TEXT_MODEL.to_string(),
            vision: DEFAULT_VISION_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub api_key: Option<ApiKey>,
    pub base_url: String,
    pub models: Models,
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            models: Models::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Config {
    /// Configuration from the process environment. Read once at startup.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str, default: String| lookup(name).unwrap_or(default);

        let port = match lookup("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
                name: "PORT",
                value,
            })?,
            None => defaults.port,
        };

        let max_body_bytes = match lookup("MAX_BODY_BYTES") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
                name: "MAX_BODY_BYTES",
                value,
            })?,
            None => defaults.max_body_bytes,
        };

        let base_url = var("GEMINI_BASE_URL", defaults.base_url)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            host: var("HOST", defaults.host),
            port,
            api_key: lookup("GEMINI_API_KEY").and_then(ApiKey::new),
            base_url,
            models: Models {
                chat: var("CHAT_MODEL", defaults.models.chat),
                tts: var("TTS_MODEL", defaults.models.tts),
                text: var("TEXT_MODEL", defaults.models.text),
                vision: var("VISION_MODEL", defaults.models.vision),
            },
            max_body_bytes,
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }
}
