use thiserror::Error;

/// Errors that can occur while generating, searching or storing recipes
#[derive(Error, Debug)]
pub enum SnapError {
    /// A required API key is absent from both config and environment
    #[error("{0} not found in config or environment")]
    MissingApiKey(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// Configuration loaded but is unusable (unknown or disabled provider, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Transport-level failure talking to a remote API
    #[error("Request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// The generative provider answered with a non-success status
    #[error("{provider} error ({status}): {message}")]
    ProviderError {
        provider: String,
        status: u16,
        message: String,
    },

    /// The generative provider declined to answer
    #[error("{provider} refused the request: {reason}")]
    Refused { provider: String, reason: String },

    /// The provider answered, but not with the declared shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The video search API failed
    #[error("Video search failed: {0}")]
    VideoSearchError(String),

    /// The supplied image could not be read or decoded
    #[error("Invalid image: {0}")]
    ImageError(String),

    /// Local storage could not be read or written
    #[error("Storage error: {0}")]
    StorageError(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),
}

impl SnapError {
    /// Errors the user fixes by changing configuration, never by retrying.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SnapError::MissingApiKey(_)
                | SnapError::ConfigError(_)
                | SnapError::InvalidConfig(_)
                | SnapError::BuilderError(_)
        )
    }

    /// Errors raised by a remote collaborator (generative model or video search).
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            SnapError::RequestError(_)
                | SnapError::ProviderError { .. }
                | SnapError::Refused { .. }
                | SnapError::MalformedResponse(_)
                | SnapError::VideoSearchError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SnapError>;
