use crate::workflow::WorkflowError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Unique identifier for tasks
pub type TaskId = Uuid;

/// Closed set of work kinds; the kind alone decides which agent runs a task
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Enumerate and classify the entries of a directory
    DirectoryScan,
    /// Summarize the textual content of a single file
    TextSummary,
}

/// Kind-specific input of a task
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TaskPayload {
    /// Directory path for scans, file path for summaries
    pub path: PathBuf,
    /// Distance from the root directory (root scan is 0)
    pub depth: u32,
}

/// Core task structure: immutable descriptor plus mutable status
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub kind: TaskKind,
    pub payload: TaskPayload,
    pub status: TaskStatus,
    /// Back-reference to the spawning task, used for reporting only
    pub parent_id: Option<TaskId>,
    /// Number of agent invocations made for this task
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task status; result and error live inside the terminal variants so they
/// can never coexist
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is queued and has not been dispatched
    Pending,
    /// Task has been dispatched to an agent
    InProgress { started_at: DateTime<Utc> },
    /// Task finished with a result
    Completed {
        completed_at: DateTime<Utc>,
        result: TaskResult,
    },
    /// Task finished with an error
    Failed {
        failed_at: DateTime<Utc>,
        error: TaskError,
    },
}

/// Kind-specific task output
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskResult {
    /// Ordered entries discovered by a directory scan
    Entries { entries: Vec<DirectoryEntry> },
    /// Summary produced for a text file
    Summary { text: String },
    /// The file could not be summarized but this is not a failure
    Skipped { reason: String },
}

/// One entry of a scanned directory
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Guess at the file's nature; `None` for directories
    pub content: Option<ContentGuess>,
    pub size_bytes: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentGuess {
    Text,
    Binary,
}

/// Error descriptor recorded on failed tasks
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TaskError {
    pub kind: ErrorKind,
    pub message: String,
}

/// User-visible classification of task failures
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Path could not be read
    Access,
    /// Content is not text
    UnsupportedContent,
    /// The underlying agent call failed or timed out
    AgentInvocation,
    /// The run was aborted before the task could finish
    Cancelled,
}

impl Task {
    /// Create a new pending task
    pub fn new(kind: TaskKind, payload: TaskPayload, parent_id: Option<TaskId>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            payload,
            status: TaskStatus::Pending,
            parent_id,
            attempts: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create the root directory scan for a run
    pub fn root(path: impl Into<PathBuf>) -> Self {
        Self::new(
            TaskKind::DirectoryScan,
            TaskPayload {
                path: path.into(),
                depth: 0,
            },
            None,
        )
    }

    /// Create a task spawned by this one, one level deeper
    pub fn child(&self, kind: TaskKind, path: impl Into<PathBuf>) -> Self {
        Self::new(
            kind,
            TaskPayload {
                path: path.into(),
                depth: self.payload.depth + 1,
            },
            Some(self.id),
        )
    }

    pub fn path(&self) -> &Path {
        &self.payload.path
    }

    /// Check if task is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            TaskStatus::Completed { .. } | TaskStatus::Failed { .. }
        )
    }

    /// Check if task is waiting to be dispatched
    pub fn is_pending(&self) -> bool {
        matches!(self.status, TaskStatus::Pending)
    }

    /// Check if task is currently running
    pub fn is_running(&self) -> bool {
        matches!(self.status, TaskStatus::InProgress { .. })
    }

    pub fn result(&self) -> Option<&TaskResult> {
        match &self.status {
            TaskStatus::Completed { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TaskError> {
        match &self.status {
            TaskStatus::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Pending -> InProgress
    pub fn start(&mut self) -> Result<(), WorkflowError> {
        if !self.is_pending() {
            return Err(self.invalid_transition("in_progress"));
        }
        self.update_status(TaskStatus::InProgress {
            started_at: Utc::now(),
        });
        Ok(())
    }

    /// InProgress -> Completed
    pub fn complete(&mut self, result: TaskResult) -> Result<(), WorkflowError> {
        if !self.is_running() {
            return Err(self.invalid_transition("completed"));
        }
        self.update_status(TaskStatus::Completed {
            completed_at: Utc::now(),
            result,
        });
        Ok(())
    }

    /// InProgress -> Failed
    pub fn fail(&mut self, error: TaskError) -> Result<(), WorkflowError> {
        if !self.is_running() {
            return Err(self.invalid_transition("failed"));
        }
        self.update_status(TaskStatus::Failed {
            failed_at: Utc::now(),
            error,
        });
        Ok(())
    }

    /// Pending -> Failed(Cancelled), for tasks left in the queue when a run
    /// is aborted
    pub fn cancel(&mut self, reason: &str) -> Result<(), WorkflowError> {
        if !self.is_pending() {
            return Err(self.invalid_transition("failed"));
        }
        self.update_status(TaskStatus::Failed {
            failed_at: Utc::now(),
            error: TaskError::new(ErrorKind::Cancelled, reason),
        });
        Ok(())
    }

    fn update_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    fn invalid_transition(&self, to: &'static str) -> WorkflowError {
        WorkflowError::InvalidTransition {
            task_id: self.id,
            from: self.status.label(),
            to,
        }
    }
}

impl TaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress { .. } => "in_progress",
            TaskStatus::Completed { .. } => "completed",
            TaskStatus::Failed { .. } => "failed",
        }
    }
}

impl DirectoryEntry {
    /// Files guessed to be text spawn summary tasks
    pub fn is_text_file(&self) -> bool {
        self.kind == EntryKind::File && self.content == Some(ContentGuess::Text)
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

impl TaskError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::DirectoryScan => write!(f, "DirectoryScan"),
            TaskKind::TextSummary => write!(f, "TextSummary"),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Access => "AccessError",
            ErrorKind::UnsupportedContent => "UnsupportedContentError",
            ErrorKind::AgentInvocation => "AgentInvocationError",
            ErrorKind::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
