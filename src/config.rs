use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

/// Main application configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Default provider to use when not specified
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default = "default_providers")]
    pub providers: HashMap<String, ProviderConfig>,
    /// Fallback configuration for automatic provider switching
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Video search configuration
    #[serde(default)]
    pub video: VideoConfig,
    /// Local recipe storage
    #[serde(default)]
    pub storage: StorageConfig,
    /// Language code used when a command does not specify one
    #[serde(default = "default_language")]
    pub language: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Configuration for a specific generative provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Model identifier (e.g., "gemini-2.0-flash", "gpt-4o-mini"); empty means the
    /// provider's default model
    #[serde(default)]
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            enabled: true,
            model: model.into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
        }
    }
}

/// Configuration for provider fallback and retry behavior
///
/// Disabled by default: a generation call is attempted exactly once.
#[derive(Debug, Deserialize, Clone)]
pub struct FallbackConfig {
    /// Whether fallback is enabled
    #[serde(default)]
    pub enabled: bool,
    /// Order of providers to try (first to last)
    #[serde(default)]
    pub order: Vec<String>,
    /// Number of retry attempts per provider before fallback
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Initial delay between retries in milliseconds (grows linearly per attempt)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            order: Vec::new(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Configuration for the YouTube Data API search
#[derive(Debug, Deserialize, Clone)]
pub struct VideoConfig {
    /// API key (falls back to YOUTUBE_API_KEY)
    pub api_key: Option<String>,
    /// Base URL override, mostly for tests
    pub base_url: Option<String>,
    /// Number of results requested per search
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            max_results: default_max_results(),
        }
    }
}

/// Where the recipe lists are persisted
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: default_providers(),
            fallback: FallbackConfig::default(),
            video: VideoConfig::default(),
            storage: StorageConfig::default(),
            language: default_language(),
            timeout: default_timeout(),
        }
    }
}

// Default value functions
fn default_provider() -> String {
    "google".to_string()
}

fn default_providers() -> HashMap<String, ProviderConfig> {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        ProviderConfig::new("gemini-2.0-flash"),
    );
    providers
}

fn default_enabled() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_max_results() -> u32 {
    5
}

fn default_storage_path() -> String {
    ".recipe-snap".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_SNAP__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_SNAP__PROVIDERS__GOOGLE__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the precedence rules.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    // Use double underscore for nested: RECIPE_SNAP__VIDEO__MAX_RESULTS
    layered(Environment::with_prefix("RECIPE_SNAP").separator("__").try_parsing(true))
}

fn layered(environment: Environment) -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Keep the built-in google entry when the file or environment only adds to it
        .set_default("providers.google.enabled", true)?
        .set_default("providers.google.model", "gemini-2.0-flash")?
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        .add_source(environment)
        .build()?;

    settings.try_deserialize()
}
