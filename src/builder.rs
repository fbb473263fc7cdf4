use std::sync::Arc;
use std::time::Duration;

use crate::config::{load_config, AppConfig, ProviderConfig, VideoConfig};
use crate::error::{Result, SnapError};
use crate::flows::{self, ExpansionReport, SuggestionRequest};
use crate::image::ImageSource;
use crate::model::{Recipe, VideoRef};
use crate::prompts::Language;
use crate::providers::{FallbackProvider, GenerationProvider, ProviderFactory, ProviderKind};
use crate::session::Session;
use crate::store::StoragePort;
use crate::youtube::YouTubeClient;
use log::debug;

/// Builder for a configured [`RecipeSnap`] client
#[derive(Default)]
pub struct RecipeSnapBuilder {
    config: Option<AppConfig>,
    provider: Option<ProviderKind>,
    provider_instance: Option<Arc<dyn GenerationProvider>>,
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    language: Option<Language>,
    youtube_api_key: Option<String>,
    youtube_base_url: Option<String>,
    video_search: bool,
}

impl RecipeSnapBuilder {
    /// Use this configuration instead of loading `config.toml` and the environment
    ///
    /// # Example
    /// ```
    /// use recipe_snap::{AppConfig, RecipeSnap};
    ///
    /// let builder = RecipeSnap::builder().config(AppConfig::default());
    /// ```
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Talk to a single provider instead of the configured chain
    ///
    /// # Example
    /// ```
    /// use recipe_snap::{ProviderKind, RecipeSnap};
    ///
    /// let builder = RecipeSnap::builder()
    ///     .provider(ProviderKind::OpenAI)
    ///     .model("gpt-4o-mini");
    /// ```
    pub fn provider(mut self, provider: ProviderKind) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use an already constructed provider; every other provider option is ignored
    pub fn with_provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.provider_instance = Some(provider);
        self
    }

    /// Set the API key for the generative provider
    ///
    /// Takes precedence over config files and `GOOGLE_API_KEY` and friends.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Point the provider at a different host, e.g. a proxy or a test server
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set a timeout for HTTP requests
    ///
    /// # Example
    /// ```
    /// use recipe_snap::RecipeSnap;
    /// use std::time::Duration;
    ///
    /// let builder = RecipeSnap::builder().timeout(Duration::from_secs(10));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Enable direct YouTube search; `build` fails if no key can be found
    pub fn with_video_search(mut self) -> Self {
        self.video_search = true;
        self
    }

    /// Implies [`with_video_search`](Self::with_video_search)
    pub fn youtube_api_key(mut self, key: impl Into<String>) -> Self {
        self.youtube_api_key = Some(key.into());
        self.video_search = true;
        self
    }

    pub fn youtube_base_url(mut self, url: impl Into<String>) -> Self {
        self.youtube_base_url = Some(url.into());
        self
    }

    /// Build the client
    ///
    /// # Errors
    /// Returns a configuration error if:
    /// - the config file or environment cannot be parsed
    /// - an API key is missing
    /// - the provider or language is unknown
    ///
    /// No network call is made.
    ///
    /// # Example
    /// ```no_run
    /// # use recipe_snap::{ProviderKind, RecipeSnap};
    /// let snap = RecipeSnap::builder()
    ///     .provider(ProviderKind::Google)
    ///     .api_key("your-api-key")
    ///     .build()?;
    /// # Ok::<(), recipe_snap::SnapError>(())
    /// ```
    pub fn build(self) -> Result<RecipeSnap> {
        let config = match self.config {
            Some(config) => config,
            None => load_config()?,
        };
        let timeout = self
            .timeout
            .unwrap_or_else(|| Duration::from_secs(config.timeout));

        let language = match self.language {
            Some(language) => language,
            None => config
                .language
                .parse::<Language>()
                .map_err(SnapError::InvalidConfig)?,
        };

        let single_provider = self.provider.is_some()
            || self.api_key.is_some()
            || self.model.is_some()
            || self.base_url.is_some();

        let provider: Arc<dyn GenerationProvider> = match self.provider_instance {
            Some(provider) => provider,
            None if single_provider => {
                let kind = match self.provider {
                    Some(kind) => kind,
                    None => config.default_provider.parse::<ProviderKind>()?,
                };
                let mut provider_config = config
                    .providers
                    .get(kind.as_str())
                    .cloned()
                    .unwrap_or_else(|| ProviderConfig::new(kind.default_model()));
                provider_config.enabled = true;
                if let Some(key) = self.api_key {
                    provider_config.api_key = Some(key);
                }
                if let Some(model) = self.model {
                    provider_config.model = model;
                }
                if let Some(url) = self.base_url {
                    provider_config.base_url = Some(url);
                }
                Arc::from(ProviderFactory::create(kind.as_str(), &provider_config, timeout)?)
            }
            None => Arc::new(FallbackProvider::new(&config)?),
        };
        debug!("Using provider '{}'", provider.provider_name());

        let youtube = if self.video_search || config.video.api_key.is_some() {
            let video_config = VideoConfig {
                api_key: self.youtube_api_key.or(config.video.api_key.clone()),
                base_url: self.youtube_base_url.or(config.video.base_url.clone()),
                max_results: config.video.max_results,
            };
            Some(Arc::new(YouTubeClient::new(&video_config, timeout)?))
        } else {
            None
        };

        Ok(RecipeSnap {
            provider,
            youtube,
            language,
        })
    }
}

/// Configured entry point to every flow
pub struct RecipeSnap {
    provider: Arc<dyn GenerationProvider>,
    youtube: Option<Arc<YouTubeClient>>,
    language: Language,
}

impl RecipeSnap {
    /// Creates a new builder
    ///
    /// # Example
    /// ```
    /// use recipe_snap::RecipeSnap;
    ///
    /// let builder = RecipeSnap::builder();
    /// ```
    pub fn builder() -> RecipeSnapBuilder {
        RecipeSnapBuilder::default()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn has_video_search(&self) -> bool {
        self.youtube.is_some()
    }

    pub async fn identify_ingredients(&self, image: &ImageSource) -> Result<Vec<String>> {
        let image = image.load().await?;
        flows::identify::process(self.provider.as_ref(), &image, self.language).await
    }

    pub async fn suggest_recipes(&self, request: &SuggestionRequest) -> Result<Vec<Recipe>> {
        flows::suggestions::process(self.provider.as_ref(), request).await
    }

    pub async fn expand_details(&self, recipes: Vec<Recipe>) -> ExpansionReport {
        flows::details::process(self.provider.as_ref(), recipes, self.language).await
    }

    pub async fn recipes_from_text(&self, description: &str) -> Result<Vec<Recipe>> {
        flows::from_text::process(self.provider.as_ref(), description, self.language).await
    }

    /// Never empty; see [`flows::videos::suggest`]
    pub async fn suggest_videos(&self, description: &str) -> Vec<VideoRef> {
        flows::videos::suggest(self.provider.as_ref(), description, self.language).await
    }

    pub async fn search_videos(&self, description: &str) -> Result<Vec<VideoRef>> {
        let client = self
            .youtube
            .as_ref()
            .ok_or_else(|| SnapError::MissingApiKey("YOUTUBE_API_KEY".to_string()))?;
        flows::videos::search(client, description, self.language).await
    }

    /// A session persisting into `storage`
    pub fn session<S: StoragePort>(&self, storage: S) -> Session<S> {
        let session =
            Session::new(Arc::clone(&self.provider), storage).with_language(self.language);
        match &self.youtube {
            Some(client) => session.with_youtube(Arc::clone(client)),
            None => session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_with_explicit_provider() {
        let snap = RecipeSnap::builder()
            .config(AppConfig::default())
            .provider(ProviderKind::Anthropic)
            .api_key("test-key")
            .build()
            .unwrap();
        assert_eq!(snap.provider_name(), "anthropic");
        assert!(!snap.has_video_search());
    }

    #[test]
    fn test_build_language_from_config() {
        let config = AppConfig {
            language: "ja".to_string(),
            ..AppConfig::default()
        };
        let snap = RecipeSnap::builder()
            .config(config)
            .api_key("test-key")
            .build()
            .unwrap();
        assert_eq!(snap.language(), Language::Japanese);
        assert_eq!(snap.provider_name(), "google");
    }

    #[test]
    fn test_build_rejects_unknown_language() {
        let config = AppConfig {
            language: "xx".to_string(),
            ..AppConfig::default()
        };
        let result = RecipeSnap::builder().config(config).api_key("k").build();
        assert!(matches!(result, Err(SnapError::InvalidConfig(_))));
    }

    #[test]
    fn test_build_with_video_search() {
        let snap = RecipeSnap::builder()
            .config(AppConfig::default())
            .api_key("test-key")
            .youtube_api_key("yt-key")
            .build()
            .unwrap();
        assert!(snap.has_video_search());
    }

    #[tokio::test]
    async fn test_search_videos_without_client_is_config_error() {
        let snap = RecipeSnap::builder()
            .config(AppConfig::default())
            .api_key("test-key")
            .build()
            .unwrap();
        let err = snap.search_videos("dal").await.unwrap_err();
        assert!(err.is_config_error());
    }
}
