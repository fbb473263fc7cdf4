use crate::config::AppConfig;
use crate::error::{Result, SnapError};
use crate::providers::{GenerationProvider, GenerationRequest, ProviderFactory};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;

/// Chain of providers tried in order, each with its own retry budget.
///
/// With fallback disabled in config this wraps only the default provider with a
/// single attempt, so a failure surfaces immediately.
pub struct FallbackProvider {
    providers: Vec<Box<dyn GenerationProvider>>,
    retry_attempts: u32,
    retry_delay_ms: u64,
}

impl FallbackProvider {
    /// Create a new fallback provider from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        if !config.fallback.enabled {
            // If fallback is disabled, just use the default provider
            let default_provider = ProviderFactory::get_default_provider(config)?;
            return Ok(FallbackProvider {
                providers: vec![default_provider],
                retry_attempts: 1,
                retry_delay_ms: 0,
            });
        }

        let timeout = Duration::from_secs(config.timeout);
        let mut providers = Vec::new();
        let mut first_error = None;

        // Create providers in fallback order
        for provider_name in &config.fallback.order {
            if let Some(provider_config) = config.providers.get(provider_name) {
                if provider_config.enabled {
                    match ProviderFactory::create(provider_name, provider_config, timeout) {
                        Ok(provider) => {
                            info!("Added '{}' to fallback chain", provider_name);
                            providers.push(provider);
                        }
                        Err(e) => {
                            warn!("Failed to initialize provider '{}': {}", provider_name, e);
                            first_error.get_or_insert(e);
                        }
                    }
                }
            } else {
                warn!(
                    "Provider '{}' in fallback order not found in configuration",
                    provider_name
                );
            }
        }

        if providers.is_empty() {
            // A missing key is more useful to report than "nothing available"
            return Err(first_error.unwrap_or_else(|| {
                SnapError::InvalidConfig(
                    "No providers available in fallback configuration".to_string(),
                )
            }));
        }

        Ok(FallbackProvider {
            providers,
            retry_attempts: config.fallback.retry_attempts.max(1),
            retry_delay_ms: config.fallback.retry_delay_ms,
        })
    }

    /// Build a chain from already constructed providers
    pub fn from_providers(
        providers: Vec<Box<dyn GenerationProvider>>,
        retry_attempts: u32,
        retry_delay_ms: u64,
    ) -> Result<Self> {
        if providers.is_empty() {
            return Err(SnapError::InvalidConfig(
                "No providers available in fallback configuration".to_string(),
            ));
        }
        Ok(FallbackProvider {
            providers,
            retry_attempts: retry_attempts.max(1),
            retry_delay_ms,
        })
    }

    /// Try a provider with linearly increasing backoff between attempts
    async fn try_provider_with_retry(
        &self,
        provider: &dyn GenerationProvider,
        request: &GenerationRequest,
    ) -> Result<Value> {
        let mut attempt = 1;

        loop {
            debug!(
                "Attempting generation with {} (attempt {}/{})",
                provider.provider_name(),
                attempt,
                self.retry_attempts
            );

            match provider.generate(request).await {
                Ok(value) => {
                    info!(
                        "Generated '{}' using {}",
                        request.shape.name(),
                        provider.provider_name()
                    );
                    return Ok(value);
                }
                // Retrying cannot fix configuration
                Err(e) if e.is_config_error() => return Err(e),
                Err(e) => {
                    warn!(
                        "Provider {} failed (attempt {}/{}): {}",
                        provider.provider_name(),
                        attempt,
                        self.retry_attempts,
                        e
                    );
                    if attempt >= self.retry_attempts {
                        return Err(e);
                    }
                }
            }

            let delay = Duration::from_millis(self.retry_delay_ms * attempt as u64);
            debug!("Waiting {:?} before retry", delay);
            sleep(delay).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl GenerationProvider for FallbackProvider {
    fn provider_name(&self) -> &str {
        if self.providers.len() == 1 {
            self.providers[0].provider_name()
        } else {
            "fallback"
        }
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
        let mut last_error = None;

        for provider in &self.providers {
            match self
                .try_provider_with_retry(provider.as_ref(), request)
                .await
            {
                Ok(value) => return Ok(value),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            SnapError::InvalidConfig("No providers available".to_string())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FallbackConfig, ProviderConfig};
    use crate::prompts::{self, Language};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Fails `failures` times, then succeeds
    struct Flaky {
        name: &'static str,
        failures: u32,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl GenerationProvider for Flaky {
        fn provider_name(&self) -> &str {
            self.name
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<Value> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(SnapError::MalformedResponse("boom".to_string()))
            } else {
                Ok(json!({ "from": self.name }))
            }
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(prompts::video_suggestions("dal", Language::English))
    }

    fn provider_config(key: &str) -> ProviderConfig {
        ProviderConfig {
            enabled: true,
            model: "test-model".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            api_key: Some(key.to_string()),
            base_url: None,
        }
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let chain = FallbackProvider::from_providers(
            vec![Box::new(Flaky { name: "a", failures: 2, calls: calls.clone() })],
            3,
            1,
        )
        .unwrap();

        let value = chain.generate(&request()).await.unwrap();
        assert_eq!(value["from"], "a");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_falls_back_to_next_provider() {
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        let chain = FallbackProvider::from_providers(
            vec![
                Box::new(Flaky { name: "a", failures: u32::MAX, calls: first.clone() }),
                Box::new(Flaky { name: "b", failures: 0, calls: second.clone() }),
            ],
            2,
            1,
        )
        .unwrap();

        let value = chain.generate(&request()).await.unwrap();
        assert_eq!(value["from"], "b");
        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(chain.provider_name(), "fallback");
    }

    #[tokio::test]
    async fn test_single_attempt_surfaces_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let chain = FallbackProvider::from_providers(
            vec![Box::new(Flaky { name: "a", failures: 1, calls: calls.clone() })],
            1,
            0,
        )
        .unwrap();

        assert!(chain.generate(&request()).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(chain.provider_name(), "a");
    }

    #[test]
    fn test_fallback_disabled_uses_default() {
        let mut providers = HashMap::new();
        providers.insert("google".to_string(), provider_config("test-key"));
        let config = AppConfig {
            providers,
            ..AppConfig::default()
        };

        let fallback = FallbackProvider::new(&config).unwrap();
        assert_eq!(fallback.providers.len(), 1);
        assert_eq!(fallback.retry_attempts, 1);
    }

    #[test]
    fn test_fallback_multiple_providers() {
        let mut providers = HashMap::new();
        providers.insert("google".to_string(), provider_config("test-key-1"));
        providers.insert("openai".to_string(), provider_config("test-key-2"));

        let config = AppConfig {
            providers,
            fallback: FallbackConfig {
                enabled: true,
                order: vec!["google".to_string(), "openai".to_string(), "missing".to_string()],
                retry_attempts: 2,
                retry_delay_ms: 50,
            },
            ..AppConfig::default()
        };

        let fallback = FallbackProvider::new(&config).unwrap();
        assert_eq!(fallback.providers.len(), 2);
    }

    #[test]
    fn test_fallback_no_providers() {
        let config = AppConfig {
            providers: HashMap::new(),
            fallback: FallbackConfig {
                enabled: true,
                order: vec!["google".to_string()],
                retry_attempts: 3,
                retry_delay_ms: 100,
            },
            ..AppConfig::default()
        };

        let result = FallbackProvider::new(&config);
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("No providers available"));
        }
    }
}
