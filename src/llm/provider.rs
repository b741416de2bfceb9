use crate::llm::types::{LLMError, LLMRequest, LLMResponse, ProviderConfig, ProviderType};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Generic LLM provider trait that can be implemented by any LLM service.
///
/// The workflow only ever holds an `Arc<dyn LLMProvider>`; credentials and
/// endpoints are baked into the provider when it is built.
pub trait LLMProvider: Send + Sync {
    /// Execute a single LLM request
    fn execute_request(&self, request: LLMRequest) -> BoxFuture<'_, Result<LLMResponse, LLMError>>;

    /// Get provider name/identifier
    fn provider_name(&self) -> &'static str;

    /// Model used when a request carries no preference
    fn default_model(&self) -> &str;
}

/// Factory for creating LLM providers
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    pub fn create_provider(config: ProviderConfig) -> Result<Arc<dyn LLMProvider>, LLMError> {
        match config.provider_type {
            ProviderType::Ollama => Ok(Arc::new(
                crate::llm::ollama_provider::OllamaProvider::new(config)?,
            )),
            ProviderType::OpenAI => Ok(Arc::new(
                crate::llm::openai_provider::OpenAIProvider::new(config)?,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_builds_ollama_without_credentials() {
        let provider = LLMProviderFactory::create_provider(ProviderConfig::default()).unwrap();
        assert_eq!(provider.provider_name(), "ollama");
        assert_eq!(provider.default_model(), "deepseek-r1:14b");
    }

    #[test]
    fn test_factory_requires_openai_key() {
        let config = ProviderConfig {
            provider_type: ProviderType::OpenAI,
            ..Default::default()
        };
        let result = LLMProviderFactory::create_provider(config);
        assert!(matches!(result, Err(LLMError::Authentication(_))));
    }
}
