use crate::llm::provider::LLMProvider;
use crate::llm::types::{
    ChatMessage, LLMError, LLMRequest, LLMResponse, ProviderConfig, TokenUsage,
};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;
use url::Url;

/// Hosted provider speaking the OpenAI chat completions API
pub struct OpenAIProvider {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    model: String,
    choices: Vec<CompletionChoice>,
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

impl OpenAIProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, LLMError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                LLMError::Authentication(format!(
                    "{} is not set",
                    crate::env::vars::OPENAI_API_KEY
                ))
            })?;
        let endpoint = config.endpoint("v1/chat/completions")?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| LLMError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            model: config.effective_model().to_string(),
        })
    }

    async fn complete(&self, request: LLMRequest) -> Result<LLMResponse, LLMError> {
        let start = Instant::now();
        let model = request.model_preference.as_deref().unwrap_or(&self.model);
        let body = CompletionRequest {
            model,
            messages: request.to_messages(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!("Sending request {} to {} ({})", request.id, self.endpoint, model);

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(LLMError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_status(status, &text));
        }

        let parsed: CompletionResponse = response.json().await.map_err(LLMError::from_transport)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LLMError::MalformedResponse("completion had no content".to_string()))?;

        Ok(LLMResponse {
            request_id: request.id,
            content,
            model_used: parsed.model,
            token_usage: parsed.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            execution_time: start.elapsed(),
        })
    }
}

impl LLMProvider for OpenAIProvider {
    fn execute_request(&self, request: LLMRequest) -> BoxFuture<'_, Result<LLMResponse, LLMError>> {
        Box::pin(self.complete(request))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.model
    }
}
