use crate::llm::LLMError;
use crate::task::{ErrorKind, Task, TaskError, TaskKind, TaskResult};
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of a single agent invocation
pub type AgentResult = Result<TaskResult, AgentError>;

/// Capabilities an agent can offer; each one serves exactly one task kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    AnalyzeDirectory,
    SummarizeText,
}

impl Capability {
    /// Task kind this capability serves
    pub fn task_kind(self) -> TaskKind {
        match self {
            Capability::AnalyzeDirectory => TaskKind::DirectoryScan,
            Capability::SummarizeText => TaskKind::TextSummary,
        }
    }
}

/// An autonomous analysis agent
#[async_trait::async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &'static str;

    fn capability(&self) -> Capability;

    /// Perform the analysis described by `task`
    async fn execute(&self, task: &Task) -> AgentResult;
}

/// Per-task agent failures; none of these abort a run
#[derive(Debug, Clone, thiserror::Error)]
pub enum AgentError {
    #[error("cannot access {}: {message}", .path.display())]
    Access { path: PathBuf, message: String },
    #[error("unsupported content in {}: {reason}", .path.display())]
    UnsupportedContent { path: PathBuf, reason: String },
    #[error("agent invocation failed: {message}")]
    Invocation { message: String, retryable: bool },
    #[error("agent call timed out after {0:?}")]
    Timeout(Duration),
    #[error("cancelled")]
    Cancelled,
}

impl AgentError {
    pub fn access(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        AgentError::Access {
            path: path.into(),
            message: error.to_string(),
        }
    }

    pub fn unsupported(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        AgentError::UnsupportedContent {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Transient failures eligible for another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            AgentError::Invocation { retryable, .. } => *retryable,
            AgentError::Timeout(_) => true,
            _ => false,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::Access { .. } => ErrorKind::Access,
            AgentError::UnsupportedContent { .. } => ErrorKind::UnsupportedContent,
            AgentError::Invocation { .. } | AgentError::Timeout(_) => ErrorKind::AgentInvocation,
            AgentError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Descriptor stored on the failed task
    pub fn to_task_error(&self) -> TaskError {
        TaskError::new(self.kind(), self.to_string())
    }
}

impl From<LLMError> for AgentError {
    fn from(error: LLMError) -> Self {
        AgentError::Invocation {
            retryable: error.is_retryable(),
            message: error.to_string(),
        }
    }
}
