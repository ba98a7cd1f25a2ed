//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{conversation, endpoints, env, generation};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode
    Staging,
    /// Production mode
    Production,
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Generative model backend
    #[serde(default)]
    pub llm: LlmConfig,

    /// Contextual rewrite stage
    #[serde(default)]
    pub correction: CorrectionConfig,

    /// Tutor reply stage
    #[serde(default)]
    pub reply: ReplyConfig,

    /// Spacing provider
    #[serde(default)]
    pub spacing: SpacingConfig,

    /// Optional dictionary speller
    #[serde(default)]
    pub spelling: SpellingConfig,

    /// Knowledge table source
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_llm()?;
        self.validate_generation()?;
        self.validate_spacing()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if self.server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "llm.model".to_string(),
                message: "Model name cannot be empty".to_string(),
            });
        }

        if self.llm.endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "llm.endpoint".to_string(),
                message: "Endpoint cannot be empty".to_string(),
            });
        }

        if self.llm.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.max_tokens".to_string(),
                message: "Must be positive".to_string(),
            });
        }

        Ok(())
    }

    fn validate_generation(&self) -> Result<(), ConfigError> {
        check_temperature("correction.temperature", self.correction.temperature)?;
        check_temperature("reply.temperature", self.reply.temperature)?;

        if self.correction.history_window == 0 {
            return Err(ConfigError::InvalidValue {
                field: "correction.history_window".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.reply.persona_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "reply.persona_name".to_string(),
                message: "Persona name cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    fn validate_spacing(&self) -> Result<(), ConfigError> {
        if self.spacing.provider == SpacingProvider::Http && self.spacing.endpoint.trim().is_empty()
        {
            return Err(ConfigError::InvalidValue {
                field: "spacing.endpoint".to_string(),
                message: "Required when spacing.provider is http".to_string(),
            });
        }

        if self.spelling.enabled && self.spelling.max_edit_distance == 0 {
            return Err(ConfigError::InvalidValue {
                field: "spelling.max_edit_distance".to_string(),
                message: "Must be at least 1 when spelling is enabled".to_string(),
            });
        }

        Ok(())
    }
}

fn check_temperature(field: &str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=2.0).contains(&value) {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("Must be between 0.0 and 2.0, got {}", value),
        });
    }
    Ok(())
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout_seconds: u64,

    /// Enable CORS restrictions (disabled means any origin)
    #[serde(default)]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_request_timeout(),
            cors_enabled: false,
            cors_origins: Vec::new(),
        }
    }
}

/// Which backend serves model calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI-compatible chat completions
    #[default]
    OpenAI,
    /// Local Ollama server
    Ollama,
}

/// Generative model backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,

    /// Base URL of the backend
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// API key; falls back to OPENAI_API_KEY
    #[serde(default = "default_api_key")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_llm_endpoint() -> String {
    endpoints::OPENAI_DEFAULT.to_string()
}

fn default_api_key() -> Option<String> {
    std::env::var(env::OPENAI_API_KEY)
        .ok()
        .filter(|key| !key.trim().is_empty())
}

fn default_model() -> String {
    generation::DEFAULT_MODEL.to_string()
}

fn default_llm_timeout() -> u64 {
    generation::TIMEOUT_SECS
}

fn default_max_tokens() -> u32 {
    generation::MAX_TOKENS
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            endpoint: default_llm_endpoint(),
            api_key: default_api_key(),
            model: default_model(),
            timeout_secs: default_llm_timeout(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Contextual rewrite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionConfig {
    /// Prior turns included in the transcript
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    #[serde(default = "default_correction_temperature")]
    pub temperature: f32,

    /// Proficiency tag used when the request carries none
    #[serde(default = "default_level")]
    pub default_level: String,
}

fn default_history_window() -> usize {
    conversation::HISTORY_WINDOW
}

fn default_correction_temperature() -> f32 {
    generation::CORRECTION_TEMPERATURE
}

fn default_level() -> String {
    conversation::DEFAULT_LEVEL.to_string()
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            temperature: default_correction_temperature(),
            default_level: default_level(),
        }
    }
}

/// Tutor reply configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyConfig {
    #[serde(default = "default_reply_temperature")]
    pub temperature: f32,

    #[serde(default = "default_persona_name")]
    pub persona_name: String,
}

fn default_reply_temperature() -> f32 {
    generation::REPLY_TEMPERATURE
}

fn default_persona_name() -> String {
    conversation::PERSONA_NAME.to_string()
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            temperature: default_reply_temperature(),
            persona_name: default_persona_name(),
        }
    }
}

/// Spacing provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpacingProvider {
    /// In-process SymSpell word segmentation
    #[default]
    SymSpell,
    /// External spacing side-car
    Http,
    /// Pass-through
    Disabled,
}

/// Spacing correction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpacingConfig {
    #[serde(default)]
    pub provider: SpacingProvider,

    /// Eojeol frequency dictionary (`word,count` per line)
    #[serde(default = "default_spacing_dictionary")]
    pub dictionary_path: String,

    /// Side-car URL for the http provider
    #[serde(default = "default_spacing_endpoint")]
    pub endpoint: String,

    /// Side-car request timeout in seconds
    #[serde(default = "default_spacing_timeout")]
    pub timeout_secs: u64,
}

fn default_spacing_dictionary() -> String {
    "config/spacing_dictionary.txt".to_string()
}

fn default_spacing_endpoint() -> String {
    endpoints::SPACING_SIDECAR_DEFAULT.to_string()
}

fn default_spacing_timeout() -> u64 {
    5
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self {
            provider: SpacingProvider::default(),
            dictionary_path: default_spacing_dictionary(),
            endpoint: default_spacing_endpoint(),
            timeout_secs: default_spacing_timeout(),
        }
    }
}

/// Dictionary speller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellingConfig {
    /// Off by default
    #[serde(default)]
    pub enabled: bool,

    /// Frequency dictionary (`word,count` per line)
    #[serde(default = "default_spacing_dictionary")]
    pub dictionary_path: String,

    #[serde(default = "default_max_edit_distance")]
    pub max_edit_distance: i64,
}

fn default_max_edit_distance() -> i64 {
    1
}

impl Default for SpellingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dictionary_path: default_spacing_dictionary(),
            max_edit_distance: default_max_edit_distance(),
        }
    }
}

/// Knowledge table source
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KnowledgeConfig {
    /// YAML file with a list of `{key, text}`; built-in table when unset
    #[serde(default)]
    pub path: Option<String>,
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Sources, later wins: `config/default`, `config/{env}`, then
/// `TUTOR__SECTION__KEY` environment variables.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::with_name("config/default").required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("TUTOR")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
