//! Completion client implementations for taoloop.
//!
//! All providers implement the `taoloop_core::Provider` trait.
//! [`build_from_config`] constructs the configured one.

pub mod openai_compat;

use std::sync::Arc;
use taoloop_config::AppConfig;
use taoloop_core::error::ProviderError;
use taoloop_core::provider::Provider;

pub use openai_compat::OpenAiCompatProvider;

/// Build the provider described by the configuration.
///
/// Fails with [`ProviderError::NotConfigured`] when no API key is available.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    Ok(Arc::new(OpenAiCompatProvider::from_config(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_not_configured() {
        let config = AppConfig::default();
        let err = build_from_config(&config).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn builds_configured_provider() {
        let config = AppConfig {
            api_key: Some("ghp_test".into()),
            model: "openai/gpt-4o-mini".into(),
            ..AppConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "github-models");
        assert_eq!(provider.model(), "openai/gpt-4o-mini");
    }
}
