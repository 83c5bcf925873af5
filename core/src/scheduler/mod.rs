//! Concurrent task scheduling.
//!
//! Fans a task list out across a bounded number of concurrent runner
//! invocations and fans the results back into input order. Completion order
//! is visible only through the side-channel event stream; the returned
//! vector always satisfies `results[i] corresponds to tasks[i]`.

pub mod events;
pub mod progress;

use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::Semaphore;

use crate::probe::{Runner, Task, TaskResult};

pub use events::{EventSender, TaskEvent};
pub use progress::ProgressMonitor;

pub const DEFAULT_WORKERS: usize = 4;

/// Execute all tasks with at most `workers` running concurrently.
///
/// Returns one result per input task, in input order, regardless of
/// completion order. Tasks are independent: no result depends on another,
/// and a failure never aborts the remaining tasks. `tasks` may be empty.
pub async fn run_tasks(
    runner: Arc<Runner>,
    tasks: &[Task],
    workers: usize,
    events: Option<EventSender>,
) -> Vec<TaskResult> {
    let sem = Arc::new(Semaphore::new(workers.max(1)));
    let mut futs: FuturesUnordered<_> = FuturesUnordered::new();

    for (idx, task) in tasks.iter().enumerate() {
        let task = task.clone();
        let sem = sem.clone();
        let runner = runner.clone();
        let events = events.clone();

        futs.push(async move {
            // The semaphore lives for the whole call; acquire cannot fail.
            let _permit = sem.acquire_owned().await.ok();

            if let Some(events) = &events {
                events.emit(TaskEvent::Started {
                    id: task.id,
                    name: task.name.clone(),
                });
            }

            let result = runner.run(&task).await;

            if let Some(events) = &events {
                events.emit(TaskEvent::Completed {
                    id: task.id,
                    result: result.clone(),
                });
            }

            (idx, result)
        });
    }

    let mut slots: Vec<Option<TaskResult>> = vec![None; tasks.len()];
    while let Some((idx, result)) = futs.next().await {
        slots[idx] = Some(result);
    }
    let results: Vec<TaskResult> = slots.into_iter().flatten().collect();

    if let Some(events) = &events {
        events.emit(TaskEvent::AllCompleted {
            results: results.clone(),
        });
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Capabilities;
    use crate::probe::{TaskId, TaskStatus};

    fn runner() -> Arc<Runner> {
        Arc::new(Runner::new(Capabilities {
            os: "linux".to_string(),
            ..Capabilities::default()
        }))
    }

    fn task(id: u64, command: &str) -> Task {
        Task {
            id: TaskId(id),
            name: format!("task-{id}"),
            command: command.to_string(),
            ..Task::default()
        }
    }

    #[tokio::test]
    async fn empty_task_list_yields_empty_results() {
        let results = run_tasks(runner(), &[], 4, None).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn results_preserve_input_order() {
        // Later tasks finish first; the returned order must not care.
        let tasks = vec![
            task(0, "sleep 0.3; echo first"),
            task(1, "sleep 0.1; echo second"),
            task(2, "echo third"),
        ];
        let results = run_tasks(runner(), &tasks, 4, None).await;

        assert_eq!(results.len(), tasks.len());
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.id, tasks[i].id);
            assert_eq!(result.name, tasks[i].name);
        }
        assert_eq!(results[0].output, "first");
        assert_eq!(results[1].output, "second");
        assert_eq!(results[2].output, "third");
    }

    #[tokio::test]
    async fn single_worker_still_completes_everything() {
        let tasks: Vec<Task> = (0..6).map(|i| task(i, "echo ok")).collect();
        let results = run_tasks(runner(), &tasks, 1, None).await;
        assert_eq!(results.len(), 6);
        assert!(results.iter().all(|r| r.status == TaskStatus::Success));
    }

    #[tokio::test]
    async fn event_stream_carries_lifecycle_per_task() {
        let tasks = vec![task(0, "echo a"), task(1, "false")];
        let (events, mut rx) = EventSender::bounded_for(tasks.len());

        let results = run_tasks(runner(), &tasks, 2, Some(events)).await;
        assert_eq!(results.len(), 2);

        let mut started = 0;
        let mut completed = 0;
        let mut all_completed = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                TaskEvent::Started { .. } => started += 1,
                TaskEvent::Completed { .. } => completed += 1,
                TaskEvent::AllCompleted { results } => {
                    all_completed += 1;
                    assert_eq!(results.len(), 2);
                    assert_eq!(results[0].id, TaskId(0));
                    assert_eq!(results[1].id, TaskId(1));
                }
                TaskEvent::ReportWritten { .. } => {}
            }
        }
        assert_eq!(started, 2);
        assert_eq!(completed, 2);
        assert_eq!(all_completed, 1);
    }

    #[tokio::test]
    async fn mixed_outcomes_stay_contained() {
        let mut skip = task(2, "echo never");
        skip.requires = vec!["definitely-nonexistent-binary-xyz".to_string()];
        let tasks = vec![task(0, "echo fine"), task(1, "exit 1"), skip];

        let results = run_tasks(runner(), &tasks, 4, None).await;
        assert_eq!(results[0].status, TaskStatus::Success);
        assert_eq!(results[1].status, TaskStatus::Failed);
        assert_eq!(results[2].status, TaskStatus::Skipped);
        assert!(!results[2].skip_reason.is_empty());
    }
}
