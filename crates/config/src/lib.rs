//! Configuration loading, validation, and management for Skillbot.
//!
//! Loads configuration from `~/.skillbot/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use skillbot_core::ContextPolicy;

/// The root configuration structure.
///
/// Maps directly to `~/.skillbot/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the hosted oracle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Oracle configuration
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Knowledge store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Conversation memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Delivery configuration
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// The closed topic set, fixed at deploy time.
    #[serde(default = "default_topics")]
    pub topics: Vec<TopicConfig>,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("oracle", &self.oracle)
            .field("store", &self.store)
            .field("memory", &self.memory)
            .field("gateway", &self.gateway)
            .field("delivery", &self.delivery)
            .field("topics", &self.topics)
            .finish()
    }
}

/// One topic of the closed set: its label (matched verbatim against the
/// classifier's decoded reply) and the corpus file it is ingested from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicConfig {
    pub label: String,
    pub corpus: PathBuf,
}

fn default_topics() -> Vec<TopicConfig> {
    vec![
        TopicConfig {
            label: "kakao_social".into(),
            corpus: PathBuf::from("data/카카오소셜.txt"),
        },
        TopicConfig {
            label: "kakao_sink".into(),
            corpus: PathBuf::from("data/카카오싱크.txt"),
        },
        TopicConfig {
            label: "kakaotalk_channel".into(),
            corpus: PathBuf::from("data/카카오톡채널.txt"),
        },
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Chat model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding model identifier; "local" selects the deterministic
    /// in-process embedder (no network)
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// API base URL (OpenAI-compatible)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Cap on generated reply length
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bounded retry attempts after the first failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff between retries, doubled each attempt
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_backoff_ms() -> u64 {
    500
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            embedding_model: default_embedding_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one JSONL file per topic partition
    #[serde(default = "default_store_dir")]
    pub data_dir: PathBuf,

    /// Passages retrieved per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_store_dir() -> PathBuf {
    AppConfig::config_dir().join("store")
}
fn default_top_k() -> usize {
    3
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_store_dir(),
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Directory holding one JSONL history file per conversation
    #[serde(default = "default_history_dir")]
    pub history_dir: PathBuf,

    /// Context policy: "full" or "window"
    #[serde(default = "default_policy")]
    pub policy: String,

    /// Window size when the policy is "window"
    #[serde(default = "default_window_turns")]
    pub window_turns: usize,
}

fn default_history_dir() -> PathBuf {
    AppConfig::config_dir().join("history")
}
fn default_policy() -> String {
    "window".into()
}
fn default_window_turns() -> usize {
    6
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            history_dir: default_history_dir(),
            policy: default_policy(),
            window_turns: default_window_turns(),
        }
    }
}

impl MemoryConfig {
    /// Resolve the configured policy string into the domain type.
    pub fn context_policy(&self) -> ContextPolicy {
        match self.policy.as_str() {
            "full" => ContextPolicy::Full,
            _ => ContextPolicy::Window {
                turns: self.window_turns,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8280
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Minimum delay before any delivery, per the platform's callback
    /// timing expectations
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Skip certificate validation on callback POSTs. The platform's
    /// callback hosts use self-signed certificates; enabling this is an
    /// explicit, audited trust decision — never an implicit default.
    #[serde(default)]
    pub allow_insecure_callback: bool,

    /// Timeout for the callback POST in seconds
    #[serde(default = "default_callback_timeout_secs")]
    pub callback_timeout_secs: u64,
}

fn default_min_delay_ms() -> u64 {
    1000
}
fn default_callback_timeout_secs() -> u64 {
    10
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: default_min_delay_ms(),
            allow_insecure_callback: false,
            callback_timeout_secs: default_callback_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.skillbot/config.toml).
    ///
    /// Also checks environment variables:
    /// - `SKILLBOT_API_KEY` (highest priority)
    /// - `OPENAI_API_KEY`
    /// - `SKILLBOT_MODEL` overrides the chat model
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("SKILLBOT_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("SKILLBOT_MODEL") {
            config.oracle.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".skillbot")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.oracle.temperature < 0.0 || self.oracle.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "oracle.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.store.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "store.top_k must be at least 1".into(),
            ));
        }

        if self.memory.policy != "full" && self.memory.policy != "window" {
            return Err(ConfigError::ValidationError(format!(
                "memory.policy must be \"full\" or \"window\", got \"{}\"",
                self.memory.policy
            )));
        }

        if self.memory.policy == "window" && self.memory.window_turns == 0 {
            return Err(ConfigError::ValidationError(
                "memory.window_turns must be at least 1".into(),
            ));
        }

        if self.topics.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one topic must be configured".into(),
            ));
        }

        let mut labels: Vec<&str> = self.topics.iter().map(|t| t.label.as_str()).collect();
        labels.sort_unstable();
        labels.dedup();
        if labels.len() != self.topics.len() {
            return Err(ConfigError::ValidationError(
                "topic labels must be unique".into(),
            ));
        }

        Ok(())
    }

    /// The configured topic labels, in declaration order.
    pub fn topic_labels(&self) -> Vec<String> {
        self.topics.iter().map(|t| t.label.clone()).collect()
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            oracle: OracleConfig::default(),
            store: StoreConfig::default(),
            memory: MemoryConfig::default(),
            gateway: GatewayConfig::default(),
            delivery: DeliveryConfig::default(),
            topics: default_topics(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.topics.len(), 3);
        assert_eq!(config.store.top_k, 3);
        assert_eq!(config.memory.policy, "window");
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.oracle.model, config.oracle.model);
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.topics.len(), config.topics.len());
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            oracle: OracleConfig {
                temperature: 5.0,
                ..OracleConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_policy_rejected() {
        let config = AppConfig {
            memory: MemoryConfig {
                policy: "ring".into(),
                ..MemoryConfig::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn duplicate_topic_labels_rejected() {
        let mut config = AppConfig::default();
        config.topics.push(TopicConfig {
            label: "kakao_sink".into(),
            corpus: PathBuf::from("data/dup.txt"),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.memory.window_turns, 6);
    }

    #[test]
    fn load_from_reads_and_validates_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[oracle]
model = "gpt-4o"
temperature = 0.3

[memory]
policy = "full"

[[topics]]
label = "kakao_sink"
corpus = "data/sink.txt"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.oracle.model, "gpt-4o");
        assert_eq!(config.memory.policy, "full");
        assert_eq!(config.topics.len(), 1);
        // Unspecified sections keep their defaults.
        assert_eq!(config.gateway.port, 8280);
    }

    #[test]
    fn load_from_rejects_invalid_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[memory]\npolicy = \"ring\"\n").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn policy_resolution() {
        let mut config = AppConfig::default();
        assert_eq!(
            config.memory.context_policy(),
            ContextPolicy::Window { turns: 6 }
        );
        config.memory.policy = "full".into();
        assert_eq!(config.memory.context_policy(), ContextPolicy::Full);
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("kakao_sink"));
        assert!(toml_str.contains("allow_insecure_callback = false"));
    }

    #[test]
    fn insecure_callback_defaults_off() {
        let config = AppConfig::default();
        assert!(!config.delivery.allow_insecure_callback);
    }

    #[test]
    fn topic_labels_in_order() {
        let config = AppConfig::default();
        assert_eq!(
            config.topic_labels(),
            vec!["kakao_social", "kakao_sink", "kakaotalk_channel"]
        );
    }
}
