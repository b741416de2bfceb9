//! Human-readable progress output for `--verbose` runs

use crate::task::{TaskKind, TaskResult};
use crate::workflow::{RunPhase, WorkflowEvent, WorkflowEventHandler};
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Writes one line per task transition to stderr so stdout stays clean for
/// the report
pub struct ConsoleEventHandler {
    root: Option<std::path::PathBuf>,
}

impl ConsoleEventHandler {
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Paths are shown relative to `root` when possible
    pub fn with_root(root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn display_path<'a>(&self, path: &'a Path) -> std::borrow::Cow<'a, str> {
        match self.root.as_deref().and_then(|root| path.strip_prefix(root).ok()) {
            Some(relative) if !relative.as_os_str().is_empty() => relative.to_string_lossy(),
            _ => path.to_string_lossy(),
        }
    }

    /// Render an event, or `None` for events not shown on the console
    pub fn render(&self, event: &WorkflowEvent) -> Option<String> {
        let line = match event {
            WorkflowEvent::RunStarted { root, .. } => {
                format!("Analyzing {}", root.display())
            }
            WorkflowEvent::PhaseChanged { phase, .. } => match phase {
                RunPhase::Finalizing => "Building report".to_string(),
                _ => return None,
            },
            WorkflowEvent::TaskEnqueued { .. } => return None,
            WorkflowEvent::TaskStarted {
                kind,
                path,
                remaining,
                ..
            } => {
                let action = match kind {
                    TaskKind::DirectoryScan => "Scanning",
                    TaskKind::TextSummary => "Summarizing",
                };
                format!(
                    "{} {} (remaining tasks in queue: {})",
                    action,
                    self.display_path(path),
                    remaining
                )
            }
            WorkflowEvent::TaskRetrying {
                attempt,
                delay,
                error,
                ..
            } => format!(
                "  attempt {} failed: {}; retrying in {:.1}s",
                attempt,
                error,
                delay.as_secs_f64()
            ),
            WorkflowEvent::TaskCompleted { path, result, .. } => match result {
                TaskResult::Entries { entries } => {
                    let files = entries.iter().filter(|e| e.is_text_file()).count();
                    format!(
                        "  found {} entries, {} text file(s) in {}",
                        entries.len(),
                        files,
                        self.display_path(path)
                    )
                }
                TaskResult::Summary { .. } => format!("  done {}", self.display_path(path)),
                TaskResult::Skipped { reason } => {
                    format!("  skipped {}: {}", self.display_path(path), reason)
                }
            },
            WorkflowEvent::TaskFailed { path, error, .. } => {
                format!("  failed {}: {}", self.display_path(path), error)
            }
            WorkflowEvent::RunFinished {
                completed,
                failed,
                cancelled,
                ..
            } => {
                let mut line = format!("Finished: {} succeeded, {} failed", completed, failed);
                if *cancelled {
                    line.push_str(" (cancelled)");
                }
                line
            }
        };
        Some(line)
    }
}

impl Default for ConsoleEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowEventHandler for ConsoleEventHandler {
    fn handle_event(&self, event: &WorkflowEvent) -> Result<()> {
        if let Some(line) = self.render(event) {
            writeln!(std::io::stderr().lock(), "{}", line)?;
        }
        Ok(())
    }
}
