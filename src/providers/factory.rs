use crate::config::{AppConfig, ProviderConfig};
use crate::error::{Result, SnapError};
use crate::providers::{AnthropicProvider, GenerationProvider, GoogleProvider, OpenAIProvider};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Providers this crate knows how to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Google,
    OpenAI,
    Anthropic,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::Google,
        ProviderKind::OpenAI,
        ProviderKind::Anthropic,
    ];

    /// Convert to provider name string used by the factory and in config
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Google => "gemini-2.0-flash",
            ProviderKind::OpenAI => "gpt-4o-mini",
            ProviderKind::Anthropic => "claude-sonnet-4-5",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = SnapError;

    fn from_str(s: &str) -> Result<Self> {
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = ProviderKind::ALL.iter().map(|k| k.as_str()).collect();
                SnapError::InvalidConfig(format!(
                    "Unknown provider: {} (expected one of {})",
                    s,
                    names.join(", ")
                ))
            })
    }
}

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Box<dyn GenerationProvider>> {
        // Validate that provider is enabled
        if !config.enabled {
            return Err(SnapError::InvalidConfig(format!(
                "Provider '{}' is not enabled in configuration",
                provider_name
            )));
        }

        let kind = provider_name.parse::<ProviderKind>()?;
        let mut config = config.clone();
        if config.model.trim().is_empty() {
            config.model = kind.default_model().to_string();
        }

        match kind {
            ProviderKind::Google => Ok(Box::new(GoogleProvider::new(&config, timeout)?)),
            ProviderKind::OpenAI => Ok(Box::new(OpenAIProvider::new(&config, timeout)?)),
            ProviderKind::Anthropic => Ok(Box::new(AnthropicProvider::new(&config, timeout)?)),
        }
    }

    /// Get the default provider from configuration
    pub fn get_default_provider(config: &AppConfig) -> Result<Box<dyn GenerationProvider>> {
        let provider_name = &config.default_provider;
        let provider_config = config.providers.get(provider_name).ok_or_else(|| {
            SnapError::InvalidConfig(format!(
                "Default provider '{}' not found in configuration",
                provider_name
            ))
        })?;

        Self::create(
            provider_name,
            provider_config,
            Duration::from_secs(config.timeout),
        )
    }
}
