mod anthropic;
mod factory;
mod fallback;
mod google;
mod open_ai;

pub use anthropic::AnthropicProvider;
pub use factory::{ProviderFactory, ProviderKind};
pub use fallback::FallbackProvider;
pub use google::GoogleProvider;
pub use open_ai::OpenAIProvider;

use crate::error::{Result, SnapError};
use crate::image::ImageInput;
use crate::prompts::{Prompt, Shape};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on model/tool round trips within one generation call
pub(crate) const MAX_TOOL_ROUNDS: usize = 4;

/// A local function the model may invoke while it generates
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object
    fn input_schema(&self) -> Value;

    fn call(&self, input: &Value) -> Result<Value>;
}

/// Everything a provider needs for one structured generation call
#[derive(Clone)]
pub struct GenerationRequest {
    pub instruction: String,
    pub shape: Shape,
    pub image: Option<ImageInput>,
    pub tools: Vec<Arc<dyn Tool>>,
}

impl GenerationRequest {
    pub fn new(prompt: Prompt) -> Self {
        GenerationRequest {
            instruction: prompt.instruction,
            shape: prompt.shape,
            image: None,
            tools: Vec::new(),
        }
    }

    pub fn with_image(mut self, image: ImageInput) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    fn find_tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// Run a tool the model asked for; failures are reported back to the model
    /// rather than aborting generation.
    pub(crate) fn invoke_tool(&self, name: &str, args: &Value) -> Value {
        match self.find_tool(name) {
            Some(tool) => match tool.call(args) {
                Ok(value) => value,
                Err(e) => serde_json::json!({ "error": e.to_string() }),
            },
            None => serde_json::json!({ "error": format!("unknown tool '{}'", name) }),
        }
    }

    /// Instruction with the output shape spelled out, for providers without native
    /// structured output
    pub(crate) fn instruction_with_shape(&self) -> String {
        format!(
            "{}\n\nRespond with only a JSON value matching this JSON schema, without any other characters:\n{}",
            self.instruction,
            self.shape.describe()
        )
    }
}

/// Unified trait for all generative providers
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Get the provider name (e.g., "google", "openai")
    fn provider_name(&self) -> &str;

    /// Generate a value conforming to `request.shape`
    async fn generate(&self, request: &GenerationRequest) -> Result<Value>;
}

pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("recipe-snap/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Decode a provider response, turning non-2xx statuses into [`SnapError::ProviderError`]
/// with the provider's own message when it sent one
pub(crate) async fn read_json(provider: &str, response: Response) -> Result<Value> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(SnapError::ProviderError {
            provider: provider.to_string(),
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    let value: Value = serde_json::from_str(&body).map_err(|e| {
        SnapError::MalformedResponse(format!("{} sent invalid JSON: {}", provider, e))
    })?;
    debug!("{} response: {:?}", provider, value);
    Ok(value)
}

/// Pull a human-readable message out of an error body
pub(crate) fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|v| {
        v["error"]["message"]
            .as_str()
            .or_else(|| v["error"].as_str())
            .or_else(|| v["message"].as_str())
            .map(String::from)
    });

    match message {
        Some(message) => message,
        None if body.trim().is_empty() => "no error message".to_string(),
        None => body.trim().to_string(),
    }
}

/// Parse model text as JSON, tolerating markdown code fences and leading chatter
pub fn extract_json(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .map(str::trim);
    if let Some(inner) = unfenced {
        if let Ok(value) = serde_json::from_str(inner) {
            return Ok(value);
        }
    }

    let start = trimmed.find(['{', '[']);
    let end = trimmed.rfind(['}', ']']);
    if let (Some(start), Some(end)) = (start, end) {
        if start < end {
            if let Ok(value) = serde_json::from_str(&trimmed[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(SnapError::MalformedResponse(format!(
        "expected JSON, got: {}",
        truncate(trimmed, 200)
    )))
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
