use crate::agent::RetryPolicy;
use crate::env::defaults;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whether directory scans spawn scans of their subdirectories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RecursionPolicy {
    /// Only the root directory is scanned
    #[default]
    TopLevel,
    /// Subdirectories are scanned down to `max_depth` levels below the root;
    /// `None` means unlimited
    Recursive { max_depth: Option<u32> },
}

impl RecursionPolicy {
    /// Whether a subdirectory found at `depth` (root children are depth 1)
    /// gets its own scan
    pub fn allows(&self, depth: u32) -> bool {
        match self {
            RecursionPolicy::TopLevel => false,
            RecursionPolicy::Recursive { max_depth } => max_depth.is_none_or(|max| depth <= max),
        }
    }
}

/// Settings handed to the workflow engine at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub recursion: RecursionPolicy,
    /// Include entries whose name starts with a dot
    pub include_hidden: bool,
    /// Sibling summaries allowed in flight at once; 1 keeps dispatch strictly sequential
    pub max_concurrent_summaries: usize,
    /// Timeout applied to each individual agent attempt
    pub agent_timeout_secs: u64,
    pub retry: RetryPolicy,
    /// Largest prefix of a file sent for summarization
    pub max_file_bytes: usize,
    pub system_prompt: String,
}

impl WorkflowConfig {
    pub fn agent_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_timeout_secs.max(1))
    }

    pub fn concurrency_limit(&self) -> usize {
        self.max_concurrent_summaries.max(1)
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            recursion: RecursionPolicy::TopLevel,
            include_hidden: false,
            max_concurrent_summaries: 1,
            agent_timeout_secs: 120,
            retry: RetryPolicy::default(),
            max_file_bytes: 64 * 1024,
            system_prompt: defaults::TEXT_ANALYZER_SYSTEM_PROMPT.to_string(),
        }
    }
}
