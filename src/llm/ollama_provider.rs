use crate::llm::provider::LLMProvider;
use crate::llm::types::{
    ChatMessage, LLMError, LLMRequest, LLMResponse, ProviderConfig, TokenUsage,
};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;
use url::Url;

/// Local model provider speaking the Ollama chat API
pub struct OllamaProvider {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: String,
    message: Option<ChatMessage>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

impl OllamaProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, LLMError> {
        let endpoint = config.endpoint("api/chat")?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| LLMError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            model: config.effective_model().to_string(),
        })
    }

    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, LLMError> {
        let start = Instant::now();
        let model = request.model_preference.as_deref().unwrap_or(&self.model);
        let options = (request.temperature.is_some() || request.max_tokens.is_some()).then(|| {
            OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            }
        });
        let body = OllamaChatRequest {
            model,
            messages: request.to_messages(),
            stream: false,
            options,
        };

        debug!("Sending request {} to {} ({})", request.id, self.endpoint, model);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(LLMError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_status(status, &text));
        }

        let parsed: OllamaChatResponse = response.json().await.map_err(LLMError::from_transport)?;
        let content = parsed
            .message
            .map(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                LLMError::MalformedResponse("No valid response received from Ollama API".to_string())
            })?;

        let token_usage = match (parsed.prompt_eval_count, parsed.eval_count) {
            (None, None) => None,
            (input, output) => {
                let input_tokens = input.unwrap_or(0);
                let output_tokens = output.unwrap_or(0);
                Some(TokenUsage {
                    input_tokens,
                    output_tokens,
                    total_tokens: input_tokens + output_tokens,
                })
            }
        };

        Ok(LLMResponse {
            request_id: request.id,
            content,
            model_used: parsed.model,
            token_usage,
            execution_time: start.elapsed(),
        })
    }
}

impl LLMProvider for OllamaProvider {
    fn execute_request(&self, request: LLMRequest) -> BoxFuture<'_, Result<LLMResponse, LLMError>> {
        Box::pin(self.chat(request))
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }

    fn default_model(&self) -> &str {
        &self.model
    }
}
