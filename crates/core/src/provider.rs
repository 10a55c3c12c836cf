//! Provider trait: the Completion Client abstraction.
//!
//! A Provider knows how to send a transcript to a hosted model and get the
//! text continuation back. Endpoint, credential and model identifier are
//! fixed when the provider is constructed; only the generation parameters
//! travel with each request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::Message;

/// Sampling parameters for one completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Generation halts before any of these substrings would be emitted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

fn default_temperature() -> f32 {
    0.3
}

fn default_top_p() -> f32 {
    1.0
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: Some(500),
            stop: Vec::new(),
        }
    }
}

impl GenerationOptions {
    /// Replace the stop sequences.
    pub fn with_stop<I, S>(mut self, stop: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop = stop.into_iter().map(Into::into).collect();
        self
    }
}

/// A single completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// The transcript, in conversational order. Must not be empty.
    pub messages: Vec<Message>,

    pub options: GenerationOptions,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The model's continuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// Trimmed text content of the first choice; never empty.
    pub content: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,

    /// Token usage statistics
    pub usage: Option<Usage>,
}

/// The core Provider trait.
///
/// The loop calls `complete()` without knowing which endpoint is behind it.
/// Implementations make a single attempt: no retries.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "github-models").
    fn name(&self) -> &str;

    /// The model identifier this provider was configured with.
    fn model(&self) -> &str;

    /// Send a transcript and get the text continuation.
    ///
    /// Fails with [`ProviderError`] on transport errors, when the response
    /// carries no choices, or when the first choice has no content.
    async fn complete(&self, request: CompletionRequest) -> std::result::Result<Completion, ProviderError>;

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> std::result::Result<(), ProviderError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_option_defaults() {
        let opts = GenerationOptions::default();
        assert!((opts.temperature - 0.3).abs() < f32::EPSILON);
        assert!((opts.top_p - 1.0).abs() < f32::EPSILON);
        assert_eq!(opts.max_tokens, Some(500));
        assert!(opts.stop.is_empty());
    }

    #[test]
    fn with_stop_replaces_sequences() {
        let opts = GenerationOptions::default()
            .with_stop(["Final:"])
            .with_stop(["Observation:"]);
        assert_eq!(opts.stop, vec!["Observation:".to_string()]);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let opts: GenerationOptions = serde_json::from_str(r#"{"temperature": 0.9}"#).unwrap();
        assert!((opts.temperature - 0.9).abs() < f32::EPSILON);
        assert!((opts.top_p - 1.0).abs() < f32::EPSILON);
        assert_eq!(opts.max_tokens, None);
    }
}
