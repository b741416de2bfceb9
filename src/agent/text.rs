use crate::agent::types::{Agent, AgentError, AgentResult, Capability};
use crate::llm::{LLMProvider, LLMRequest};
use crate::task::{Task, TaskResult};
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// Reasoning blocks emitted by thinking models before the actual answer
static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid think-block regex"));

/// Summarizes the textual content of a single file through an LLM provider
pub struct TextAnalyzer {
    provider: Arc<dyn LLMProvider>,
    system_prompt: String,
    max_bytes: usize,
}

impl TextAnalyzer {
    pub fn new(provider: Arc<dyn LLMProvider>, system_prompt: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            provider,
            system_prompt: system_prompt.into(),
            max_bytes,
        }
    }

    /// Read the file and return its text, cut to `max_bytes` on a character
    /// boundary, plus whether it was truncated
    pub async fn read_text(&self, path: &Path) -> Result<(String, bool), AgentError> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| AgentError::access(path, e))?;

        // One byte past the limit tells whether anything was cut
        let mut bytes = Vec::with_capacity(self.max_bytes.min(64 * 1024) + 1);
        file.take(self.max_bytes as u64 + 1)
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| AgentError::access(path, e))?;

        if bytes.is_empty() {
            return Err(AgentError::unsupported(path, "file is empty"));
        }
        if bytes.contains(&0) {
            return Err(AgentError::unsupported(path, "file contains binary data"));
        }

        let truncated = bytes.len() > self.max_bytes;
        let sample = &bytes[..bytes.len().min(self.max_bytes)];
        let text = match std::str::from_utf8(sample) {
            Ok(text) => text,
            // A multi-byte character split by the cut is dropped
            Err(e) if truncated && e.error_len().is_none() => {
                std::str::from_utf8(&sample[..e.valid_up_to()]).unwrap_or_default()
            }
            Err(_) => return Err(AgentError::unsupported(path, "file is not valid UTF-8")),
        };

        Ok((text.to_string(), truncated))
    }

    fn build_prompt(path: &Path, text: &str, truncated: bool) -> String {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut prompt = format!("Summarize the contents of the file `{}`.\n", name);
        if truncated {
            prompt.push_str("Only the beginning of the file is shown.\n");
        }
        prompt.push_str("\n```\n");
        prompt.push_str(text);
        if !text.ends_with('\n') {
            prompt.push('\n');
        }
        prompt.push_str("```\n");
        prompt
    }
}

/// Strip reasoning blocks and surrounding whitespace from a model reply
pub fn clean_response(content: &str) -> String {
    THINK_BLOCK.replace_all(content, "").trim().to_string()
}

#[async_trait::async_trait]
impl Agent for TextAnalyzer {
    fn name(&self) -> &'static str {
        "text_analyzer"
    }

    fn capability(&self) -> Capability {
        Capability::SummarizeText
    }

    async fn execute(&self, task: &Task) -> AgentResult {
        let path = task.path();
        let (text, truncated) = self.read_text(path).await?;

        let request = LLMRequest::new(Self::build_prompt(path, &text, truncated))
            .with_system_message(self.system_prompt.clone());
        debug!(
            "Summarizing {} via {} (prompt: {} bytes)",
            path.display(),
            self.provider.provider_name(),
            request.prompt.len()
        );
        debug!("Prompt for {}:\n{}", task.id, request.prompt);

        let response = self.provider.execute_request(request).await?;
        debug!("Raw response for {}:\n{}", task.id, response.content);

        let summary = clean_response(&response.content);
        if summary.is_empty() {
            return Err(AgentError::Invocation {
                message: "model returned an empty summary".to_string(),
                retryable: true,
            });
        }

        info!(
            "Summarized {} with {} in {:?}",
            path.display(),
            response.model_used,
            response.execution_time
        );
        Ok(TaskResult::Summary { text: summary })
    }
}
