use crate::task::queue::*;
use crate::task::types::*;
use crate::workflow::WorkflowError;

fn create_summary_result() -> TaskResult {
    TaskResult::Summary {
        text: "A short file about testing".to_string(),
    }
}

#[test]
fn test_root_task_creation() {
    let task = Task::root("/tmp/project");

    assert_eq!(task.kind, TaskKind::DirectoryScan);
    assert_eq!(task.payload.depth, 0);
    assert_eq!(task.parent_id, None);
    assert_eq!(task.attempts, 0);
    assert!(task.is_pending());
    assert!(!task.is_terminal());
    assert!(task.result().is_none());
    assert!(task.error().is_none());
}

#[test]
fn test_child_task_links_to_parent() {
    let root = Task::root("/tmp/project");
    let child = root.child(TaskKind::TextSummary, "/tmp/project/a.txt");

    assert_eq!(child.parent_id, Some(root.id));
    assert_eq!(child.payload.depth, 1);
    assert_ne!(child.id, root.id);
    assert_eq!(child.kind, TaskKind::TextSummary);
}

#[test]
fn test_task_status_updates() {
    let mut task = Task::root("/tmp/project");

    task.start().unwrap();
    assert!(task.is_running());
    assert!(!task.is_pending());

    task.complete(create_summary_result()).unwrap();
    assert!(task.is_terminal());
    assert_eq!(task.result(), Some(&create_summary_result()));
    assert!(task.error().is_none());
}

#[test]
fn test_task_cannot_regress() {
    let mut task = Task::root("/tmp/project");
    task.start().unwrap();
    task.fail(TaskError::new(ErrorKind::Access, "permission denied"))
        .unwrap();

    let err = task.start().unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::InvalidTransition {
            from: "failed",
            to: "in_progress",
            ..
        }
    ));
    // result and error are each set at most once
    assert!(task.complete(create_summary_result()).is_err());
    assert!(
        task.fail(TaskError::new(ErrorKind::AgentInvocation, "again"))
            .is_err()
    );
    assert_eq!(task.error().unwrap().kind, ErrorKind::Access);
    assert!(task.result().is_none());
}

#[test]
fn test_task_cannot_complete_without_start() {
    let mut task = Task::root("/tmp/project");
    assert!(task.complete(create_summary_result()).is_err());
    assert!(task.is_pending());
}

#[test]
fn test_cancel_pending_task() {
    let mut task = Task::root("/tmp/project");
    task.cancel("run aborted").unwrap();

    let error = task.error().unwrap();
    assert_eq!(error.kind, ErrorKind::Cancelled);
    assert!(task.is_terminal());

    let mut running = Task::root("/tmp/project");
    running.start().unwrap();
    assert!(running.cancel("run aborted").is_err());
}

#[test]
fn test_queue_is_fifo() {
    let mut queue = TaskQueue::new();
    let root = Task::root("/tmp/project");
    let a = root.child(TaskKind::TextSummary, "/tmp/project/a.txt");
    let b = root.child(TaskKind::TextSummary, "/tmp/project/b.txt");
    let c = root.child(TaskKind::DirectoryScan, "/tmp/project/sub");
    let expected = vec![a.id, b.id, c.id];

    queue.enqueue(a).unwrap();
    queue.enqueue(b).unwrap();
    queue.enqueue(c).unwrap();
    assert_eq!(queue.len(), 3);
    assert_eq!(queue.peek().map(|t| t.id), Some(expected[0]));

    let mut order = Vec::new();
    while let Ok(task) = queue.dequeue() {
        order.push(task.id);
    }
    assert_eq!(order, expected);
    assert!(queue.is_empty());
    assert_eq!(queue.dequeue().unwrap_err(), QueueEmpty);
}

#[test]
fn test_queue_rejects_duplicates() {
    let mut queue = TaskQueue::new();
    let task = Task::root("/tmp/project");
    let copy = task.clone();

    queue.enqueue(task).unwrap();
    assert!(matches!(
        queue.enqueue(copy.clone()),
        Err(WorkflowError::DuplicateTask(id)) if id == copy.id
    ));

    // Still rejected once the first copy has been dequeued
    queue.dequeue().unwrap();
    assert!(queue.contains(copy.id));
    assert!(queue.enqueue(copy).is_err());
    assert!(queue.is_empty());
}

#[test]
fn test_queue_drain_preserves_order() {
    let mut queue = TaskQueue::new();
    let root = Task::root("/tmp/project");
    let ids: Vec<TaskId> = (0..4)
        .map(|i| {
            let task = root.child(TaskKind::TextSummary, format!("/tmp/project/{i}.txt"));
            let id = task.id;
            queue.enqueue(task).unwrap();
            id
        })
        .collect();

    let drained: Vec<TaskId> = queue.drain().map(|t| t.id).collect();
    assert_eq!(drained, ids);
    assert!(queue.is_empty());
}

#[test]
fn test_entry_classification() {
    let text = DirectoryEntry {
        name: "a.txt".to_string(),
        path: "/tmp/a.txt".into(),
        kind: EntryKind::File,
        content: Some(ContentGuess::Text),
        size_bytes: Some(12),
    };
    let binary = DirectoryEntry {
        content: Some(ContentGuess::Binary),
        ..text.clone()
    };
    let dir = DirectoryEntry {
        name: "sub".to_string(),
        path: "/tmp/sub".into(),
        kind: EntryKind::Directory,
        content: None,
        size_bytes: None,
    };

    assert!(text.is_text_file());
    assert!(!binary.is_text_file());
    assert!(!dir.is_text_file());
    assert!(dir.is_directory());
}

#[test]
fn test_task_serialization() {
    let mut task = Task::root("/tmp/project");
    task.start().unwrap();
    task.fail(TaskError::new(ErrorKind::UnsupportedContent, "binary data"))
        .unwrap();

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["kind"], "directory_scan");
    assert_eq!(json["status"]["state"], "failed");
    assert_eq!(json["status"]["error"]["kind"], "unsupported_content");

    let back: Task = serde_json::from_value(json).unwrap();
    assert_eq!(back, task);
}

#[test]
fn test_error_kind_display() {
    assert_eq!(ErrorKind::Access.to_string(), "AccessError");
    assert_eq!(
        TaskError::new(ErrorKind::AgentInvocation, "timed out").to_string(),
        "AgentInvocationError: timed out"
    );
}
