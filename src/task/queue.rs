use crate::task::types::{Task, TaskId};
use crate::workflow::WorkflowError;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Signals that no pending task remains
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("task queue is empty")]
pub struct QueueEmpty;

/// Strict FIFO holding area for pending tasks.
///
/// Every identifier ever enqueued is remembered, so a task can neither sit in
/// the queue twice nor be re-enqueued after it has been dequeued.
#[derive(Debug, Default)]
pub struct TaskQueue {
    pending: VecDeque<Task>,
    seen: HashSet<TaskId>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task to the back of the queue
    pub fn enqueue(&mut self, task: Task) -> Result<(), WorkflowError> {
        if !self.seen.insert(task.id) {
            return Err(WorkflowError::DuplicateTask(task.id));
        }
        debug!("Enqueued {} task {} ({})", task.kind, task.id, task.path().display());
        self.pending.push_back(task);
        Ok(())
    }

    /// Remove and return the task at the front
    pub fn dequeue(&mut self) -> Result<Task, QueueEmpty> {
        self.pending.pop_front().ok_or(QueueEmpty)
    }

    /// Look at the task at the front without removing it
    pub fn peek(&self) -> Option<&Task> {
        self.pending.front()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of tasks still pending
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True if the id is pending or was already dequeued
    pub fn contains(&self, task_id: TaskId) -> bool {
        self.seen.contains(&task_id)
    }

    /// Remove every pending task in FIFO order
    pub fn drain(&mut self) -> impl Iterator<Item = Task> + '_ {
        self.pending.drain(..)
    }
}
