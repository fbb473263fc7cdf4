use crate::config::ProviderConfig;
use crate::error::{Result, SnapError};
use crate::providers::{
    build_client, extract_json, read_json, GenerationProvider, GenerationRequest,
};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider from configuration
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| SnapError::MissingApiKey("ANTHROPIC_API_KEY".to_string()))?;

        Ok(AnthropicProvider {
            client: build_client(timeout)?,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| "https://api.anthropic.com".to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl GenerationProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    /// Tools are not forwarded; the callers that register one also compute its
    /// answer locally after generation.
    async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
        if !request.tools.is_empty() {
            debug!(
                "anthropic: ignoring {} tool declaration(s)",
                request.tools.len()
            );
        }

        let mut content = Vec::new();
        if let Some(image) = &request.image {
            content.push(json!({
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": image.mime_type,
                    "data": image.data,
                }
            }));
        }
        content.push(json!({ "type": "text", "text": request.instruction_with_shape() }));

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url.trim_end_matches('/')))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&json!({
                "model": self.model,
                "max_tokens": self.max_tokens,
                "temperature": self.temperature,
                "messages": [
                    {
                        "role": "user",
                        "content": content
                    }
                ]
            }))
            .send()
            .await?;

        let response_body = read_json(self.provider_name(), response).await?;

        if response_body["stop_reason"].as_str() == Some("refusal") {
            return Err(SnapError::Refused {
                provider: self.provider_name().to_string(),
                reason: "refusal".to_string(),
            });
        }

        let text = response_body["content"][0]["text"].as_str().ok_or_else(|| {
            SnapError::MalformedResponse(
                "Failed to extract content from Anthropic response".to_string(),
            )
        })?;

        extract_json(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::{self, Language};
    use mockito::Server;

    fn config(base_url: Option<String>) -> ProviderConfig {
        ProviderConfig {
            enabled: true,
            model: "claude-sonnet-4-5".to_string(),
            temperature: 0.7,
            max_tokens: 4000,
            api_key: Some("test-key".to_string()),
            base_url,
        }
    }

    #[tokio::test]
    async fn test_generate_parses_fenced_json() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "test-key")
            .with_status(200)
            .with_body(
                r#"{"content": [{"type": "text", "text": "```json\n{\"recipes\": []}\n```"}], "stop_reason": "end_turn"}"#,
            )
            .create_async()
            .await;

        let provider =
            AnthropicProvider::new(&config(Some(server.url())), Duration::from_secs(5)).unwrap();
        let request = GenerationRequest::new(prompts::recipe_from_text("dal", Language::English));

        let value = provider.generate(&request).await.unwrap();
        assert_eq!(value["recipes"], json!([]));
        mock.assert_async().await;
    }

    #[test]
    fn test_provider_name() {
        let provider = AnthropicProvider::new(&config(None), Duration::from_secs(5)).unwrap();
        assert_eq!(provider.provider_name(), "anthropic");
    }
}
