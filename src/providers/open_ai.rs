use crate::config::ProviderConfig;
use crate::error::{Result, SnapError};
use crate::providers::{
    build_client, extract_json, read_json, GenerationProvider, GenerationRequest,
    MAX_TOOL_ROUNDS,
};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider from configuration
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| SnapError::MissingApiKey("OPENAI_API_KEY".to_string()))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com".to_string());

        Ok(OpenAIProvider {
            client: build_client(timeout)?,
            api_key,
            base_url,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn user_message(request: &GenerationRequest) -> Value {
        match &request.image {
            Some(image) => json!({
                "role": "user",
                "content": [
                    { "type": "text", "text": request.instruction },
                    { "type": "image_url", "image_url": { "url": image.to_data_uri() } }
                ]
            }),
            None => json!({ "role": "user", "content": request.instruction }),
        }
    }

    fn request_body(&self, request: &GenerationRequest, messages: &[Value]) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.shape.name(),
                    "schema": request.shape.schema(),
                }
            }
        });

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request
                .tools
                .iter()
                .map(|tool| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": tool.name(),
                            "description": tool.description(),
                            "parameters": tool.input_schema(),
                        }
                    })
                })
                .collect();
            body["tools"] = Value::Array(tools);
        }

        body
    }
}

#[async_trait]
impl GenerationProvider for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));
        let mut messages = vec![Self::user_message(request)];

        for round in 0..=MAX_TOOL_ROUNDS {
            let response = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&self.request_body(request, &messages))
                .send()
                .await?;
            let body = read_json(self.provider_name(), response).await?;

            let choice = &body["choices"][0];
            let message = &choice["message"];

            if let Some(refusal) = message["refusal"].as_str() {
                return Err(SnapError::Refused {
                    provider: self.provider_name().to_string(),
                    reason: refusal.to_string(),
                });
            }
            if choice["finish_reason"].as_str() == Some("content_filter") {
                return Err(SnapError::Refused {
                    provider: self.provider_name().to_string(),
                    reason: "content_filter".to_string(),
                });
            }

            let tool_calls = message["tool_calls"].as_array().filter(|c| !c.is_empty());
            let Some(tool_calls) = tool_calls else {
                let content = message["content"].as_str().ok_or_else(|| {
                    SnapError::MalformedResponse(
                        "Failed to extract content from response".to_string(),
                    )
                })?;
                return extract_json(content);
            };

            if round == MAX_TOOL_ROUNDS {
                break;
            }

            messages.push(message.clone());
            for call in tool_calls {
                let name = call["function"]["name"].as_str().unwrap_or_default();
                let args: Value = call["function"]["arguments"]
                    .as_str()
                    .and_then(|raw| serde_json::from_str(raw).ok())
                    .unwrap_or(Value::Null);
                debug!("OpenAI called tool '{}' with {}", name, args);

                messages.push(json!({
                    "role": "tool",
                    "tool_call_id": call["id"],
                    "content": request.invoke_tool(name, &args).to_string(),
                }));
            }
        }

        Err(SnapError::MalformedResponse(format!(
            "OpenAI kept calling tools after {} rounds",
            MAX_TOOL_ROUNDS
        )))
    }
}
