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

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GoogleProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GoogleProvider {
    /// Create a new Google Gemini provider from configuration
    pub fn new(config: &ProviderConfig, timeout: Duration) -> Result<Self> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| SnapError::MissingApiKey("GOOGLE_API_KEY".to_string()))?;

        Ok(GoogleProvider {
            client: build_client(timeout)?,
            api_key,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn request_body(&self, request: &GenerationRequest, contents: &[Value]) -> Value {
        let mut generation_config = json!({
            "temperature": self.temperature,
            "maxOutputTokens": self.max_tokens,
        });

        let mut body = json!({ "contents": contents });

        if request.tools.is_empty() {
            generation_config["responseMimeType"] = json!("application/json");
            generation_config["responseSchema"] = request.shape.to_gemini_schema();
        } else {
            // Gemini rejects function calling combined with a JSON response mime type,
            // so the shape travels in the prompt instead
            let declarations: Vec<Value> = request
                .tools
                .iter()
                .map(|tool| {
                    json!({
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": tool.input_schema(),
                    })
                })
                .collect();
            body["tools"] = json!([{ "functionDeclarations": declarations }]);
        }

        body["generationConfig"] = generation_config;
        body
    }

    fn first_turn(request: &GenerationRequest) -> Value {
        let text = if request.tools.is_empty() {
            request.instruction.clone()
        } else {
            request.instruction_with_shape()
        };

        let mut parts = vec![json!({ "text": text })];
        if let Some(image) = &request.image {
            parts.push(json!({
                "inline_data": {
                    "mime_type": image.mime_type,
                    "data": image.data,
                }
            }));
        }

        json!({ "role": "user", "parts": parts })
    }
}

#[async_trait]
impl GenerationProvider for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Value> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let mut contents = vec![Self::first_turn(request)];

        for round in 0..=MAX_TOOL_ROUNDS {
            let response = self
                .client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&self.request_body(request, &contents))
                .send()
                .await?;
            let body = read_json(self.provider_name(), response).await?;

            if let Some(reason) = body["promptFeedback"]["blockReason"].as_str() {
                return Err(SnapError::Refused {
                    provider: self.provider_name().to_string(),
                    reason: reason.to_string(),
                });
            }

            let candidate = &body["candidates"][0];
            if candidate["finishReason"].as_str() == Some("SAFETY") {
                return Err(SnapError::Refused {
                    provider: self.provider_name().to_string(),
                    reason: "SAFETY".to_string(),
                });
            }

            let parts = candidate["content"]["parts"]
                .as_array()
                .ok_or_else(|| {
                    SnapError::MalformedResponse(
                        "Failed to extract content from Google Gemini response".to_string(),
                    )
                })?;

            let calls: Vec<&Value> = parts
                .iter()
                .filter_map(|part| part.get("functionCall"))
                .collect();

            if calls.is_empty() {
                let text: String = parts
                    .iter()
                    .filter_map(|part| part["text"].as_str())
                    .collect();
                return extract_json(&text);
            }

            if round == MAX_TOOL_ROUNDS {
                break;
            }

            let responses: Vec<Value> = calls
                .iter()
                .map(|call| {
                    let name = call["name"].as_str().unwrap_or_default();
                    debug!("Gemini called tool '{}' with {}", name, call["args"]);
                    let result = request.invoke_tool(name, &call["args"]);
                    json!({
                        "functionResponse": {
                            "name": name,
                            "response": { "name": name, "content": result },
                        }
                    })
                })
                .collect();

            contents.push(candidate["content"].clone());
            contents.push(json!({ "role": "user", "parts": responses }));
        }

        Err(SnapError::MalformedResponse(format!(
            "Gemini kept calling tools after {} rounds",
            MAX_TOOL_ROUNDS
        )))
    }
}
