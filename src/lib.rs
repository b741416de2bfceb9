//! # Folder Agent
//!
//! Coordinates two analysis agents over a directory: one enumerates and
//! classifies entries, the other summarizes text files through a language
//! model. The core is a task queue and workflow engine that turns one
//! directory request into an ordered sequence of tasks, routes each task to
//! its agent, tracks every task to a terminal status and aggregates the
//! outcomes into a report.
//!
//! ## Architecture Overview
//!
//! - **[`task`]**: task data model and the FIFO [`TaskQueue`]
//! - **[`agent`]**: the [`Agent`] trait, [`AgentRouter`], the directory and
//!   text analyzers, and the retry policy wrapped around agent calls
//! - **[`workflow`]**: [`WorkflowEngine`], [`ResultAggregator`] and run events
//! - **[`llm`]**: provider-agnostic LLM interface with Ollama and OpenAI backends
//! - **[`cli`]**: argument parsing, configuration discovery, console output
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use folder_agent::{LLMProviderFactory, ProviderConfig, WorkflowConfig, WorkflowEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = LLMProviderFactory::create_provider(ProviderConfig::default())?;
//!     let engine = WorkflowEngine::with_provider(provider, WorkflowConfig::default());
//!
//!     let report = engine.run(".").await?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```

/// Task data model and queue.
pub mod task;

/// Analysis agents and task routing.
///
/// Agents perform one kind of analysis each; the router is the only place
/// that knows which agent serves which task kind.
pub mod agent;

/// Run orchestration: engine, aggregation, events and configuration.
pub mod workflow;

/// Provider-agnostic LLM interface.
pub mod llm;

/// Environment constants and path utilities.
pub mod env;

// CLI module for command-line interface
pub mod cli;

pub use agent::{Agent, AgentError, AgentRouter, RetryPolicy};
pub use llm::{LLMError, LLMProvider, LLMProviderFactory, ProviderConfig, ProviderType};
pub use task::{Task, TaskId, TaskKind, TaskQueue, TaskResult, TaskStatus};
pub use workflow::{
    Report, ResultAggregator, WorkflowConfig, WorkflowEngine, WorkflowError, WorkflowEvent,
    WorkflowEventHandler,
};
