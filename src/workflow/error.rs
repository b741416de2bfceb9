use crate::task::{TaskId, TaskKind};
use std::path::PathBuf;

/// Errors that abort a whole run.
///
/// Per-task failures never show up here; they are recorded on the task and
/// listed in the report instead.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WorkflowError {
    #[error("task {0} was already enqueued")]
    DuplicateTask(TaskId),
    #[error("no agent registered for {0} tasks")]
    UnroutableTask(TaskKind),
    #[error("root path does not exist: {}", .0.display())]
    RootNotFound(PathBuf),
    #[error("root path is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),
    #[error("task {task_id} cannot move from {from} to {to}")]
    InvalidTransition {
        task_id: TaskId,
        from: &'static str,
        to: &'static str,
    },
    #[error("task {0} was recorded twice")]
    DuplicateRecord(TaskId),
    #[error("task {0} was recorded after the report was finalized")]
    AlreadyFinalized(TaskId),
    #[error("cannot access root path {}: {message}", .path.display())]
    RootAccess { path: PathBuf, message: String },
}
