use crate::task::{
    ContentGuess, DirectoryEntry, EntryKind, Task, TaskError, TaskId, TaskKind, TaskResult,
    TaskStatus,
};
use crate::workflow::WorkflowError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Accumulates terminal tasks of one run and shapes them into a [`Report`]
#[derive(Debug)]
pub struct ResultAggregator {
    run_id: Uuid,
    root: PathBuf,
    started_at: DateTime<Utc>,
    cancelled: bool,
    /// Record order, which is also dispatch order
    order: Vec<TaskId>,
    tasks: HashMap<TaskId, Task>,
    children: HashMap<TaskId, Vec<TaskId>>,
    report: Option<Report>,
}

/// Final outcome of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub run_id: Uuid,
    pub root: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub cancelled: bool,
    pub counts: ReportCounts,
    pub failures: Vec<FailureRecord>,
    /// Tree rooted at the root scan; `None` only if nothing was recorded
    pub tree: Option<ReportNode>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportCounts {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    pub task_id: TaskId,
    pub kind: TaskKind,
    pub path: PathBuf,
    pub error: TaskError,
}

/// One task in the report tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportNode {
    pub task_id: TaskId,
    pub kind: TaskKind,
    pub path: PathBuf,
    pub attempts: u32,
    pub outcome: NodeOutcome,
    /// Scanned entries, each paired with the task spawned for it if any
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<EntryReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NodeOutcome {
    Scanned { entry_count: usize },
    Summarized { summary: String },
    Skipped { reason: String },
    Failed { error: TaskError },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryReport {
    pub name: String,
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentGuess>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Box<ReportNode>>,
}

impl ResultAggregator {
    pub fn new(run_id: Uuid, root: impl Into<PathBuf>, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            root: root.into(),
            started_at,
            cancelled: false,
            order: Vec::new(),
            tasks: HashMap::new(),
            children: HashMap::new(),
            report: None,
        }
    }

    /// Record a task that reached a terminal status. Each task is recorded
    /// exactly once and nothing is accepted after [`finalize`](Self::finalize).
    pub fn record(&mut self, task: Task) -> Result<(), WorkflowError> {
        if !task.is_terminal() {
            return Err(WorkflowError::InvalidTransition {
                task_id: task.id,
                from: task.status.label(),
                to: "recorded",
            });
        }
        if self.report.is_some() {
            return Err(WorkflowError::AlreadyFinalized(task.id));
        }
        if self.tasks.contains_key(&task.id) {
            return Err(WorkflowError::DuplicateRecord(task.id));
        }

        if let Some(parent_id) = task.parent_id {
            self.children.entry(parent_id).or_default().push(task.id);
        }
        self.order.push(task.id);
        self.tasks.insert(task.id, task);
        Ok(())
    }

    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.get(&task_id)
    }

    /// Build the report on first call; later calls return the same report
    pub fn finalize(&mut self) -> Report {
        if let Some(report) = &self.report {
            return report.clone();
        }

        let mut counts = ReportCounts::default();
        let mut failures = Vec::new();
        for task in self.order.iter().filter_map(|id| self.tasks.get(id)) {
            counts.total += 1;
            match &task.status {
                TaskStatus::Completed {
                    result: TaskResult::Skipped { .. },
                    ..
                } => counts.skipped += 1,
                TaskStatus::Completed { .. } => counts.completed += 1,
                TaskStatus::Failed { error, .. } => {
                    counts.failed += 1;
                    failures.push(FailureRecord {
                        task_id: task.id,
                        kind: task.kind,
                        path: task.payload.path.clone(),
                        error: error.clone(),
                    });
                }
                TaskStatus::Pending | TaskStatus::InProgress { .. } => {}
            }
        }

        let tree = self
            .order
            .iter()
            .filter_map(|id| self.tasks.get(id))
            .find(|task| task.parent_id.is_none())
            .map(|root| self.build_node(root));

        let report = Report {
            run_id: self.run_id,
            root: self.root.clone(),
            started_at: self.started_at,
            finished_at: Utc::now(),
            cancelled: self.cancelled,
            counts,
            failures,
            tree,
        };
        self.report = Some(report.clone());
        report
    }

    fn build_node(&self, task: &Task) -> ReportNode {
        let mut children: Vec<&Task> = self
            .children
            .get(&task.id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.tasks.get(id))
            .collect();

        let (outcome, scanned) = match &task.status {
            TaskStatus::Completed { result, .. } => match result {
                TaskResult::Entries { entries } => (
                    NodeOutcome::Scanned {
                        entry_count: entries.len(),
                    },
                    entries.as_slice(),
                ),
                TaskResult::Summary { text } => (
                    NodeOutcome::Summarized {
                        summary: text.clone(),
                    },
                    &[][..],
                ),
                TaskResult::Skipped { reason } => (
                    NodeOutcome::Skipped {
                        reason: reason.clone(),
                    },
                    &[][..],
                ),
            },
            TaskStatus::Failed { error, .. } => (
                NodeOutcome::Failed {
                    error: error.clone(),
                },
                &[][..],
            ),
            // Not reachable through `record`
            TaskStatus::Pending | TaskStatus::InProgress { .. } => (
                NodeOutcome::Skipped {
                    reason: format!("task left {}", task.status.label()),
                },
                &[][..],
            ),
        };

        let mut entries: Vec<EntryReport> = scanned
            .iter()
            .map(|entry| {
                let child = children
                    .iter()
                    .position(|child| child.payload.path == entry.path)
                    .map(|index| children.remove(index));
                self.entry_report(entry, child)
            })
            .collect();

        // Children whose path matches no scanned entry
        entries.extend(children.into_iter().map(|child| EntryReport {
            name: file_name(child.path()),
            kind: match child.kind {
                TaskKind::DirectoryScan => EntryKind::Directory,
                TaskKind::TextSummary => EntryKind::File,
            },
            content: None,
            task: Some(Box::new(self.build_node(child))),
        }));

        ReportNode {
            task_id: task.id,
            kind: task.kind,
            path: task.payload.path.clone(),
            attempts: task.attempts,
            outcome,
            entries,
        }
    }

    fn entry_report(&self, entry: &DirectoryEntry, child: Option<&Task>) -> EntryReport {
        EntryReport {
            name: entry.name.clone(),
            kind: entry.kind,
            content: entry.content,
            task: child.map(|task| Box::new(self.build_node(task))),
        }
    }
}

impl Report {
    /// No failures and not cancelled
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl ReportNode {
    pub fn summary(&self) -> Option<&str> {
        match &self.outcome {
            NodeOutcome::Summarized { summary } => Some(summary),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&TaskError> {
        match &self.outcome {
            NodeOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Node spawned for the entry with the given name
    pub fn child(&self, name: &str) -> Option<&ReportNode> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .and_then(|entry| entry.task.as_deref())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis of {}", self.root.display())?;

        if let Some(tree) = &self.tree {
            write_node_line(f, tree)?;
            write_entries(f, &tree.entries, "")?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "Tasks: {} total, {} completed, {} failed, {} skipped",
            self.counts.total, self.counts.completed, self.counts.failed, self.counts.skipped
        )?;
        if self.cancelled {
            writeln!(f, "Run was cancelled before all tasks finished")?;
        }

        if !self.failures.is_empty() {
            writeln!(f, "Failures:")?;
            for failure in &self.failures {
                writeln!(
                    f,
                    "  - {} {}: {}",
                    failure.kind,
                    failure.path.display(),
                    failure.error
                )?;
            }
        }
        Ok(())
    }
}

fn write_node_line(f: &mut fmt::Formatter<'_>, node: &ReportNode) -> fmt::Result {
    match &node.outcome {
        NodeOutcome::Scanned { entry_count } => {
            writeln!(f, "{} ({} entries)", node.path.display(), entry_count)
        }
        NodeOutcome::Failed { error } => writeln!(f, "{} FAILED {}", node.path.display(), error),
        NodeOutcome::Summarized { .. } | NodeOutcome::Skipped { .. } => {
            writeln!(f, "{}", node.path.display())
        }
    }
}

fn write_entries(f: &mut fmt::Formatter<'_>, entries: &[EntryReport], prefix: &str) -> fmt::Result {
    for (index, entry) in entries.iter().enumerate() {
        let last = index + 1 == entries.len();
        let branch = if last { "└── " } else { "├── " };
        let nested = format!("{}{}", prefix, if last { "    " } else { "│   " });

        let label = match entry.kind {
            EntryKind::Directory => format!("{}/", entry.name),
            EntryKind::File => entry.name.clone(),
        };

        match entry.task.as_deref() {
            None => {
                let note = match entry.content {
                    Some(ContentGuess::Binary) => " (binary)",
                    _ => "",
                };
                writeln!(f, "{}{}{}{}", prefix, branch, label, note)?;
            }
            Some(node) => match &node.outcome {
                NodeOutcome::Summarized { summary } => {
                    let mut lines = summary.lines();
                    writeln!(
                        f,
                        "{}{}{}: {}",
                        prefix,
                        branch,
                        label,
                        lines.next().unwrap_or_default()
                    )?;
                    for line in lines {
                        writeln!(f, "{}{}", nested, line)?;
                    }
                }
                NodeOutcome::Skipped { reason } => {
                    writeln!(f, "{}{}{} (skipped: {})", prefix, branch, label, reason)?;
                }
                NodeOutcome::Failed { error } => {
                    writeln!(f, "{}{}{} FAILED {}", prefix, branch, label, error)?;
                }
                NodeOutcome::Scanned { entry_count } => {
                    writeln!(f, "{}{}{} ({} entries)", prefix, branch, label, entry_count)?;
                    write_entries(f, &node.entries, &nested)?;
                }
            },
        }
    }
    Ok(())
}
