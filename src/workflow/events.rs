use crate::task::{TaskError, TaskId, TaskKind, TaskResult};
use crate::workflow::engine::RunPhase;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Status transitions observable while a run is in progress
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    RunStarted {
        run_id: Uuid,
        root: PathBuf,
    },
    PhaseChanged {
        run_id: Uuid,
        phase: RunPhase,
    },
    TaskEnqueued {
        task_id: TaskId,
        parent_id: Option<TaskId>,
        kind: TaskKind,
        path: PathBuf,
    },
    TaskStarted {
        task_id: TaskId,
        kind: TaskKind,
        path: PathBuf,
        /// Tasks still waiting in the queue
        remaining: usize,
    },
    TaskRetrying {
        task_id: TaskId,
        attempt: u32,
        delay: Duration,
        error: String,
    },
    TaskCompleted {
        task_id: TaskId,
        kind: TaskKind,
        path: PathBuf,
        result: TaskResult,
        attempts: u32,
    },
    TaskFailed {
        task_id: TaskId,
        kind: TaskKind,
        path: PathBuf,
        error: TaskError,
        attempts: u32,
    },
    RunFinished {
        run_id: Uuid,
        completed: usize,
        failed: usize,
        cancelled: bool,
    },
}

/// Event handler trait for workflow events
pub trait WorkflowEventHandler {
    fn handle_event(&self, event: &WorkflowEvent) -> Result<()>;
}

/// Forwards events to the `tracing` subscriber
pub struct LoggingEventHandler;

impl WorkflowEventHandler for LoggingEventHandler {
    fn handle_event(&self, event: &WorkflowEvent) -> Result<()> {
        match event {
            WorkflowEvent::RunStarted { run_id, root } => {
                info!("Run {} started for {}", run_id, root.display());
            }
            WorkflowEvent::PhaseChanged { run_id, phase } => {
                info!("Run {} entered {:?}", run_id, phase);
            }
            WorkflowEvent::TaskEnqueued {
                task_id, kind, path, ..
            } => {
                info!("Enqueued {} task {} for {}", kind, task_id, path.display());
            }
            WorkflowEvent::TaskStarted {
                task_id,
                remaining,
                ..
            } => {
                info!("Task started: {} ({} remaining)", task_id, remaining);
            }
            WorkflowEvent::TaskRetrying {
                task_id,
                attempt,
                delay,
                error,
            } => {
                warn!(
                    "Task {} attempt {} failed: {} (retrying in {:?})",
                    task_id, attempt, error, delay
                );
            }
            WorkflowEvent::TaskCompleted {
                task_id, attempts, ..
            } => {
                info!("Task completed: {} after {} attempt(s)", task_id, attempts);
            }
            WorkflowEvent::TaskFailed { task_id, error, .. } => {
                warn!("Task failed: {} - {}", task_id, error);
            }
            WorkflowEvent::RunFinished {
                run_id,
                completed,
                failed,
                cancelled,
            } => {
                info!(
                    "Run {} finished: {} completed, {} failed{}",
                    run_id,
                    completed,
                    failed,
                    if *cancelled { " (cancelled)" } else { "" }
                );
            }
        }
        Ok(())
    }
}
