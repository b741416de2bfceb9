use crate::agent::directory::DirectoryAnalyzer;
use crate::agent::text::TextAnalyzer;
use crate::agent::types::{Agent, AgentResult};
use crate::llm::LLMProvider;
use crate::task::{Task, TaskKind};
use crate::workflow::{WorkflowConfig, WorkflowError};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Static dispatch table from task kind to the agent that serves it
#[derive(Default, Clone)]
pub struct AgentRouter {
    agents: HashMap<TaskKind, Arc<dyn Agent>>,
}

impl AgentRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Router with the directory and text analyzers registered
    pub fn with_default_agents(provider: Arc<dyn LLMProvider>, config: &WorkflowConfig) -> Self {
        let mut router = Self::new();
        router.register(Arc::new(DirectoryAnalyzer::new(config.include_hidden)));
        router.register(Arc::new(TextAnalyzer::new(
            provider,
            config.system_prompt.clone(),
            config.max_file_bytes,
        )));
        router
    }

    /// Register an agent under the task kind its capability serves,
    /// replacing any previous registration for that kind
    pub fn register(&mut self, agent: Arc<dyn Agent>) {
        let kind = agent.capability().task_kind();
        debug!("Registering agent {} for {} tasks", agent.name(), kind);
        self.agents.insert(kind, agent);
    }

    pub fn resolve(&self, kind: TaskKind) -> Result<Arc<dyn Agent>, WorkflowError> {
        self.agents
            .get(&kind)
            .cloned()
            .ok_or(WorkflowError::UnroutableTask(kind))
    }

    /// Hand a task to its agent. Routing failures are programming errors and
    /// surface as [`WorkflowError`]; agent failures come back as the inner result.
    pub async fn route(&self, task: &Task) -> Result<AgentResult, WorkflowError> {
        let agent = self.resolve(task.kind)?;
        debug!("Routing {} task {} to {}", task.kind, task.id, agent.name());
        Ok(agent.execute(task).await)
    }

    pub fn has_agent(&self, kind: TaskKind) -> bool {
        self.agents.contains_key(&kind)
    }
}

impl std::fmt::Debug for AgentRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut agents: Vec<_> = self
            .agents
            .iter()
            .map(|(kind, agent)| (kind.to_string(), agent.name()))
            .collect();
        agents.sort();
        f.debug_struct("AgentRouter").field("agents", &agents).finish()
    }
}
