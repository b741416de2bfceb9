use crate::agent::{AgentError, AgentRouter};
use crate::llm::LLMProvider;
use crate::task::{Task, TaskKind, TaskQueue, TaskResult};
use crate::workflow::aggregator::{Report, ResultAggregator};
use crate::workflow::config::WorkflowConfig;
use crate::workflow::error::WorkflowError;
use crate::workflow::events::{WorkflowEvent, WorkflowEventHandler};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::Serialize;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Phases of a single run, entered strictly in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Seeding,
    Draining,
    Finalizing,
    Done,
}

/// State of one invocation, owned exclusively by the engine while it runs
#[derive(Debug)]
pub struct WorkflowRun {
    pub id: Uuid,
    pub root: PathBuf,
    pub started_at: DateTime<Utc>,
    phase: RunPhase,
    queue: TaskQueue,
    aggregator: ResultAggregator,
}

impl WorkflowRun {
    fn new(root: PathBuf) -> Self {
        let id = Uuid::new_v4();
        let started_at = Utc::now();
        Self {
            id,
            aggregator: ResultAggregator::new(id, root.clone(), started_at),
            root,
            started_at,
            phase: RunPhase::Seeding,
            queue: TaskQueue::new(),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }
}

/// Drives runs: seeds the queue with the root scan, drains it through the
/// router and folds discovered files back in, then finalizes the report
pub struct WorkflowEngine {
    router: AgentRouter,
    config: WorkflowConfig,
    event_handlers: Vec<Box<dyn WorkflowEventHandler + Send + Sync>>,
}

impl WorkflowEngine {
    pub fn new(router: AgentRouter, config: WorkflowConfig) -> Self {
        Self {
            router,
            config,
            event_handlers: Vec::new(),
        }
    }

    /// Engine with the default directory and text analyzers
    pub fn with_provider(provider: Arc<dyn LLMProvider>, config: WorkflowConfig) -> Self {
        let router = AgentRouter::with_default_agents(provider, &config);
        Self::new(router, config)
    }

    pub fn add_event_handler(&mut self, handler: Box<dyn WorkflowEventHandler + Send + Sync>) {
        self.event_handlers.push(handler);
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Analyze `path` to completion
    pub async fn run(&self, path: impl AsRef<Path>) -> Result<Report, WorkflowError> {
        self.run_with_cancellation(path, CancellationToken::new())
            .await
    }

    /// Analyze `path`, stopping early when `cancel` fires. In-flight calls are
    /// interrupted and every task left behind is failed as cancelled, so the
    /// returned report still accounts for each task.
    pub async fn run_with_cancellation(
        &self,
        path: impl AsRef<Path>,
        cancel: CancellationToken,
    ) -> Result<Report, WorkflowError> {
        let root = resolve_root(path.as_ref()).await?;
        let mut run = WorkflowRun::new(root);
        info!("Starting run {} for {}", run.id, run.root.display());
        self.emit_event(WorkflowEvent::RunStarted {
            run_id: run.id,
            root: run.root.clone(),
        });

        // Seeding
        self.enter_phase(&mut run, RunPhase::Seeding);
        let root_task = Task::root(&run.root);
        self.enqueue(&mut run.queue, root_task)?;

        self.enter_phase(&mut run, RunPhase::Draining);
        while !run.queue.is_empty() {
            if cancel.is_cancelled() {
                break;
            }

            let batch = self.next_batch(&mut run.queue);
            let finished = self.dispatch_batch(batch, run.queue.len(), &cancel).await?;
            for task in finished {
                self.settle(&mut run, task)?;
            }
        }

        let cancelled = cancel.is_cancelled();
        if cancelled {
            self.cancel_pending(&mut run)?;
            run.aggregator.mark_cancelled();
        }

        self.enter_phase(&mut run, RunPhase::Finalizing);
        let report = run.aggregator.finalize();

        self.enter_phase(&mut run, RunPhase::Done);
        self.emit_event(WorkflowEvent::RunFinished {
            run_id: run.id,
            completed: report.counts.completed + report.counts.skipped,
            failed: report.counts.failed,
            cancelled,
        });
        info!(
            "Run {} done: {} tasks, {} failed",
            run.id, report.counts.total, report.counts.failed
        );
        Ok(report)
    }

    fn enter_phase(&self, run: &mut WorkflowRun, phase: RunPhase) {
        debug!("Run {}: {:?} -> {:?}", run.id, run.phase, phase);
        run.phase = phase;
        self.emit_event(WorkflowEvent::PhaseChanged {
            run_id: run.id,
            phase,
        });
    }

    fn enqueue(&self, queue: &mut TaskQueue, task: Task) -> Result<(), WorkflowError> {
        let event = WorkflowEvent::TaskEnqueued {
            task_id: task.id,
            parent_id: task.parent_id,
            kind: task.kind,
            path: task.payload.path.clone(),
        };
        queue.enqueue(task)?;
        self.emit_event(event);
        Ok(())
    }

    /// Front task of the queue, plus its immediately following sibling
    /// summaries when concurrent summaries are enabled
    fn next_batch(&self, queue: &mut TaskQueue) -> Vec<Task> {
        let mut batch = Vec::new();
        let Ok(first) = queue.dequeue() else {
            return batch;
        };

        let limit = self.config.concurrency_limit();
        let sibling_of = (first.kind == TaskKind::TextSummary).then_some(first.parent_id);
        batch.push(first);

        if let Some(parent_id) = sibling_of {
            while batch.len() < limit
                && queue
                    .peek()
                    .is_some_and(|next| next.kind == TaskKind::TextSummary && next.parent_id == parent_id)
            {
                match queue.dequeue() {
                    Ok(task) => batch.push(task),
                    Err(_) => break,
                }
            }
        }
        batch
    }

    /// Run a batch with at most `batch.len()` calls in flight. Results come
    /// back in batch order regardless of completion order.
    async fn dispatch_batch(
        &self,
        batch: Vec<Task>,
        queued: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<Task>, WorkflowError> {
        let size = batch.len().max(1);
        let calls = batch.into_iter().enumerate().map(|(index, task)| {
            let remaining = queued + size - index - 1;
            self.dispatch(task, remaining, cancel)
        });

        futures::stream::iter(calls)
            .buffered(size)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect()
    }

    /// Route the task to its agent under the timeout and retry policy. Agent
    /// failures are recorded on the task; a routing failure aborts the run.
    async fn dispatch(
        &self,
        mut task: Task,
        remaining: usize,
        cancel: &CancellationToken,
    ) -> Result<Task, WorkflowError> {
        task.start()?;
        self.emit_event(WorkflowEvent::TaskStarted {
            task_id: task.id,
            kind: task.kind,
            path: task.payload.path.clone(),
            remaining,
        });
        debug!("Dispatching {} task {}", task.kind, task.id);

        let task_id = task.id;
        let routing_error = Mutex::new(None);
        let (router, target, routing_slot) = (&self.router, &task, &routing_error);
        let outcome = self
            .config
            .retry
            .execute(
                self.config.agent_timeout(),
                cancel,
                |attempt, error, delay| {
                    self.emit_event(WorkflowEvent::TaskRetrying {
                        task_id,
                        attempt,
                        delay,
                        error: error.to_string(),
                    })
                },
                || async move {
                    match router.route(target).await {
                        Ok(result) => result,
                        Err(error) => {
                            let message = error.to_string();
                            if let Ok(mut slot) = routing_slot.lock() {
                                slot.get_or_insert(error);
                            }
                            Err(AgentError::Invocation {
                                message,
                                retryable: false,
                            })
                        }
                    }
                },
            )
            .await;

        if let Some(error) = routing_error.into_inner().ok().flatten() {
            return Err(error);
        }

        task.attempts = outcome.attempts;
        match outcome.result {
            Ok(result) => task.complete(result)?,
            Err(AgentError::UnsupportedContent { reason, .. }) => {
                debug!("Skipping {}: {}", task.path().display(), reason);
                task.complete(TaskResult::Skipped { reason })?
            }
            Err(error) => {
                warn!("Task {} failed: {}", task.id, error);
                task.fail(error.to_task_error())?
            }
        }
        Ok(task)
    }

    /// Announce a finished task, enqueue what it discovered and hand it to
    /// the aggregator
    fn settle(&self, run: &mut WorkflowRun, task: Task) -> Result<(), WorkflowError> {
        if let Some(result) = task.result() {
            self.emit_event(WorkflowEvent::TaskCompleted {
                task_id: task.id,
                kind: task.kind,
                path: task.payload.path.clone(),
                result: result.clone(),
                attempts: task.attempts,
            });
        } else if let Some(error) = task.error() {
            self.emit_event(WorkflowEvent::TaskFailed {
                task_id: task.id,
                kind: task.kind,
                path: task.payload.path.clone(),
                error: error.clone(),
                attempts: task.attempts,
            });
        }

        if task.kind == TaskKind::DirectoryScan {
            self.spawn_children(&mut run.queue, &task)?;
        }
        run.aggregator.record(task)
    }

    /// Text files become summaries first, then subdirectories become scans
    /// when the recursion policy reaches them
    fn spawn_children(&self, queue: &mut TaskQueue, parent: &Task) -> Result<(), WorkflowError> {
        let Some(TaskResult::Entries { entries }) = parent.result() else {
            return Ok(());
        };

        for entry in entries.iter().filter(|entry| entry.is_text_file()) {
            self.enqueue(queue, parent.child(TaskKind::TextSummary, &entry.path))?;
        }

        if self.config.recursion.allows(parent.payload.depth + 1) {
            for entry in entries.iter().filter(|entry| entry.is_directory()) {
                self.enqueue(queue, parent.child(TaskKind::DirectoryScan, &entry.path))?;
            }
        }
        Ok(())
    }

    fn cancel_pending(&self, run: &mut WorkflowRun) -> Result<(), WorkflowError> {
        let pending: Vec<Task> = run.queue.drain().collect();
        if !pending.is_empty() {
            info!("Run cancelled with {} task(s) still queued", pending.len());
        }

        for mut task in pending {
            task.cancel("run cancelled before dispatch")?;
            self.settle(run, task)?;
        }
        Ok(())
    }

    fn emit_event(&self, event: WorkflowEvent) {
        for handler in &self.event_handlers {
            if let Err(e) = handler.handle_event(&event) {
                error!("Event handler error: {}", e);
            }
        }
    }
}

async fn resolve_root(path: &Path) -> Result<PathBuf, WorkflowError> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == IoErrorKind::NotFound => {
            return Err(WorkflowError::RootNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(WorkflowError::RootAccess {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
        }
    };

    if !metadata.is_dir() {
        return Err(WorkflowError::RootNotDirectory(path.to_path_buf()));
    }

    tokio::fs::canonicalize(path)
        .await
        .map_err(|e| WorkflowError::RootAccess {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
