//! Fire-and-forget lifecycle notifications emitted during scheduling.

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::probe::{TaskId, TaskResult};

/// Lifecycle events for one run. Correlation is by [`TaskId`], never by
/// display name.
#[derive(Debug, Clone)]
pub enum TaskEvent {
    Started {
        id: TaskId,
        name: String,
    },
    Completed {
        id: TaskId,
        result: TaskResult,
    },
    /// Terminal event: every task has a result, in input order.
    AllCompleted {
        results: Vec<TaskResult>,
    },
    /// The report file has been written.
    ReportWritten {
        path: PathBuf,
        tokens: usize,
    },
}

/// Bounded, non-blocking sender side of the event channel.
///
/// Emission uses `try_send`: a stalled consumer drops events rather than
/// backpressuring a worker mid-run.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<TaskEvent>,
}

impl EventSender {
    /// Channel sized for a run over `task_count` tasks: one Started and one
    /// Completed per task plus the two terminal events.
    pub fn bounded_for(task_count: usize) -> (Self, mpsc::Receiver<TaskEvent>) {
        let (tx, rx) = mpsc::channel(2 * task_count.max(1) + 2);
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: TaskEvent) {
        if let Err(e) = self.tx.try_send(event) {
            tracing::debug!("lifecycle event dropped: {e}");
        }
    }
}
