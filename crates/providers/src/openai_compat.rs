//! OpenAI-compatible completion client.
//!
//! Works with: GitHub Models, OpenAI, Azure AI inference, Ollama, vLLM,
//! and any endpoint exposing `POST {base}/chat/completions`.
//!
//! One request per call, non-streaming, no retries. The first choice's
//! content is trimmed and returned; a response without choices or with
//! empty content is an error.

use async_trait::async_trait;
use taoloop_config::AppConfig;
use taoloop_core::error::ProviderError;
use taoloop_core::message::{Message, Role};
use taoloop_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default inference endpoint for GitHub Models.
pub const GITHUB_MODELS_URL: &str = "https://models.github.ai/inference";

/// An OpenAI-compatible completion client.
///
/// Endpoint, credential and model are fixed at construction; the
/// underlying HTTP connection pool is reused across calls and released
/// when the provider is dropped.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        }
    }

    /// Create a GitHub Models provider (convenience constructor).
    pub fn github_models(token: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new("github-models", GITHUB_MODELS_URL, token, model)
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key, model)
    }

    /// Create an Ollama provider (convenience constructor).
    pub fn ollama(base_url: Option<&str>, model: impl Into<String>) -> Self {
        Self::new(
            "ollama",
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama", // Ollama doesn't need a real key
            model,
        )
    }

    /// Build from application configuration.
    ///
    /// Fails with [`ProviderError::NotConfigured`] when no API key is available.
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "no API key for provider '{}'",
                config.provider_name
            ))
        })?;

        Ok(Self::new(
            &config.provider_name,
            &config.endpoint,
            api_key,
            &config.model,
        ))
    }

    /// Convert our Message types to OpenAI API format.
    ///
    /// Tool observations go out as the `function` role with the tool's name.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: match m.role {
                    Role::User => "user".into(),
                    Role::Assistant => "assistant".into(),
                    Role::System => "system".into(),
                    Role::Tool => "function".into(),
                },
                content: m.content.clone(),
                name: match m.role {
                    Role::Tool => m.tool_name.clone(),
                    _ => None,
                },
            })
            .collect()
    }

    /// Build the JSON request body.
    fn request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let options = &request.options;
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": options.temperature,
            "top_p": options.top_p,
            "stream": false,
        });

        if let Some(max_tokens) = options.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !options.stop.is_empty() {
            body["stop"] = serde_json::json!(options.stop);
        }

        body
    }

    /// Extract the trimmed content of the first choice.
    fn into_completion(api_response: ApiResponse, requested_model: &str) -> Result<Completion, ProviderError> {
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::EmptyResponse("No choices in response".into()))?;

        let content = choice
            .message
            .content
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ProviderError::EmptyResponse("Response content is empty".into()))?;

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(Completion {
            content,
            model: api_response
                .model
                .unwrap_or_else(|| requested_model.to_string()),
            usage,
        })
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<Completion, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.request_body(&request);

        debug!(
            provider = %self.name,
            model = %self.model,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(5);
            return Err(ProviderError::RateLimited { retry_after_secs });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if !(200..300).contains(&status) {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: status,
                message: format!("Failed to parse response: {e}"),
            })?;

        Self::into_completion(api_response, &self.model)
    }

    /// Round-trip a tiny prompt; any completion counts as healthy.
    async fn health_check(&self) -> std::result::Result<(), ProviderError> {
        let request = CompletionRequest {
            messages: vec![
                Message::system("You are an assistant."),
                Message::user("Reply only: \"Working!\""),
            ],
            options: GenerationOptions {
                max_tokens: Some(20),
                ..GenerationOptions::default()
            },
        };
        let completion = self.complete(request).await?;
        debug!(provider = %self.name, reply = %completion.content, "Health check reply");
        Ok(())
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
