use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// Generic LLM request that can be served by any provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMRequest {
    pub id: Uuid,
    pub prompt: String,
    pub system_message: Option<String>,
    pub model_preference: Option<String>,
    pub max_tokens: Option<u64>,
    pub temperature: Option<f32>,
}

/// Generic LLM response from any provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    pub request_id: Uuid,
    pub content: String,
    pub model_used: String,
    pub token_usage: Option<TokenUsage>,
    pub execution_time: Duration,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

/// Chat message in the shape both HTTP backends accept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Provider connection settings.
///
/// The API key is populated by the binary from the environment and is never
/// written back out with the rest of the configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub provider_type: ProviderType,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub request_timeout_secs: u64,
}

/// Supported LLM backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Ollama,
    OpenAI,
}

/// Generic LLM errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum LLMError {
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl LLMError {
    /// Transient failures that may succeed when the call is repeated
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LLMError::RateLimit(_)
                | LLMError::ProviderUnavailable(_)
                | LLMError::Timeout(_)
                | LLMError::Network(_)
                | LLMError::MalformedResponse(_)
        )
    }

    /// Classify a transport error from reqwest
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            LLMError::Timeout(error.to_string())
        } else if error.is_connect() {
            LLMError::ProviderUnavailable(error.to_string())
        } else if error.is_decode() {
            LLMError::MalformedResponse(error.to_string())
        } else {
            LLMError::Network(error.to_string())
        }
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = format!("HTTP {}: {}", status.as_u16(), body.trim());
        match status.as_u16() {
            401 | 403 => LLMError::Authentication(message),
            429 => LLMError::RateLimit(message),
            400..=499 => LLMError::InvalidRequest(message),
            _ => LLMError::ProviderUnavailable(message),
        }
    }
}

impl LLMRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_system_message(mut self, system_message: impl Into<String>) -> Self {
        self.system_message = Some(system_message.into());
        self
    }

    /// System message (if any) followed by the user prompt
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system_message {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: self.prompt.clone(),
        });
        messages
    }
}

impl Default for LLMRequest {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            prompt: String::new(),
            system_message: None,
            model_preference: None,
            max_tokens: None,
            temperature: None,
        }
    }
}

impl ProviderConfig {
    /// Base URL, falling back to the backend's public default
    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(match self.provider_type {
            ProviderType::Ollama => crate::env::defaults::OLLAMA_BASE_URL,
            ProviderType::OpenAI => crate::env::defaults::OPENAI_BASE_URL,
        })
    }

    /// Model, falling back to the backend's default
    pub fn effective_model(&self) -> &str {
        self.model.as_deref().unwrap_or(match self.provider_type {
            ProviderType::Ollama => crate::env::defaults::OLLAMA_MODEL,
            ProviderType::OpenAI => crate::env::defaults::OPENAI_MODEL,
        })
    }

    /// Resolve an API path against the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url, LLMError> {
        let mut base = self.effective_base_url().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base)
            .and_then(|url| url.join(path.trim_start_matches('/')))
            .map_err(|e| LLMError::Configuration(format!("invalid base URL '{}': {}", base, e)))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: ProviderType::Ollama,
            api_key: None,
            base_url: None,
            model: None,
            request_timeout_secs: 120,
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderType::Ollama => write!(f, "ollama"),
            ProviderType::OpenAI => write!(f, "openai"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_paths() {
        let config = ProviderConfig::default();
        assert_eq!(
            config.endpoint("api/chat").unwrap().as_str(),
            "http://localhost:11434/api/chat"
        );

        let proxied = ProviderConfig {
            provider_type: ProviderType::OpenAI,
            base_url: Some("https://proxy.example.com/openai".to_string()),
            ..Default::default()
        };
        assert_eq!(
            proxied.endpoint("/v1/chat/completions").unwrap().as_str(),
            "https://proxy.example.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ProviderConfig {
            base_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.endpoint("api/chat"),
            Err(LLMError::Configuration(_))
        ));
    }

    #[test]
    fn test_default_models() {
        let ollama = ProviderConfig::default();
        assert_eq!(ollama.effective_model(), "deepseek-r1:14b");

        let openai = ProviderConfig {
            provider_type: ProviderType::OpenAI,
            model: Some("gpt-4o".to_string()),
            ..Default::default()
        };
        assert_eq!(openai.effective_model(), "gpt-4o");
    }

    #[test]
    fn test_status_classification() {
        use reqwest::StatusCode;

        assert!(matches!(
            LLMError::from_status(StatusCode::UNAUTHORIZED, ""),
            LLMError::Authentication(_)
        ));
        assert!(LLMError::from_status(StatusCode::TOO_MANY_REQUESTS, "").is_retryable());
        assert!(LLMError::from_status(StatusCode::BAD_GATEWAY, "").is_retryable());
        assert!(!LLMError::from_status(StatusCode::NOT_FOUND, "no model").is_retryable());
    }

    #[test]
    fn test_request_messages() {
        let request = LLMRequest::new("summarize").with_system_message("be brief");
        let messages = request.to_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].content, "summarize");

        assert_eq!(LLMRequest::new("hi").to_messages().len(), 1);
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = ProviderConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let toml = toml::to_string(&config).unwrap();
        assert!(!toml.contains("sk-secret"));
        assert!(toml.contains("provider_type = \"ollama\""));
    }
}
