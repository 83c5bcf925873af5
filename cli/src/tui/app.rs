use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use hostdiag_core::api::{TaskEvent, TaskId, TaskStatus};

use super::theme::Theme;

/// One display row per scheduled task, correlated by [`TaskId`].
#[derive(Debug, Clone)]
pub struct TaskRow {
    pub id: TaskId,
    pub name: String,
    pub status: TaskStatus,
    pub duration: Duration,
}

pub struct TuiApp {
    pub theme: Theme,
    pub platform: String,
    pub rows: Vec<TaskRow>,
    index: HashMap<TaskId, usize>,
    pub completed: usize,
    pub start: Instant,
    pub spinner_idx: usize,
    pub all_done: bool,
    pub report: Option<(PathBuf, usize)>,
    /// Set once the report is written; the next Enter/Space exits.
    pub waiting_input: bool,
    pub interrupted: bool,
}

impl TuiApp {
    pub fn new(tasks: Vec<(TaskId, String)>, platform: String, theme: Theme) -> Self {
        let mut rows = Vec::with_capacity(tasks.len());
        let mut index = HashMap::with_capacity(tasks.len());

        for (id, name) in tasks {
            index.insert(id, rows.len());
            rows.push(TaskRow {
                id,
                name,
                status: TaskStatus::Pending,
                duration: Duration::ZERO,
            });
        }

        Self {
            theme,
            platform,
            rows,
            index,
            completed: 0,
            start: Instant::now(),
            spinner_idx: 0,
            all_done: false,
            report: None,
            waiting_input: false,
            interrupted: false,
        }
    }

    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn handle_event(&mut self, event: TaskEvent) {
        match event {
            TaskEvent::Started { id, .. } => {
                if let Some(&idx) = self.index.get(&id) {
                    self.rows[idx].status = TaskStatus::Running;
                }
            }
            TaskEvent::Completed { id, result } => {
                if let Some(&idx) = self.index.get(&id) {
                    self.rows[idx].status = result.status;
                    self.rows[idx].duration = result.duration;
                    self.completed += 1;
                }
            }
            TaskEvent::AllCompleted { results } => {
                self.all_done = true;
                // Backfill anything whose Completed event was dropped.
                for result in results {
                    if let Some(&idx) = self.index.get(&result.id) {
                        if self.rows[idx].status == TaskStatus::Pending
                            || self.rows[idx].status == TaskStatus::Running
                        {
                            self.rows[idx].status = result.status;
                            self.rows[idx].duration = result.duration;
                        }
                    }
                }
                self.completed = self.total();
            }
            TaskEvent::ReportWritten { path, tokens } => {
                self.report = Some((path, tokens));
                self.waiting_input = true;
            }
        }
    }

    /// Returns true when the loop should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => {
                self.interrupted = !self.waiting_input;
                true
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.interrupted = !self.waiting_input;
                true
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.waiting_input,
            _ => false,
        }
    }

    pub fn tick(&mut self) {
        self.spinner_idx = (self.spinner_idx + 1) % self.theme.spinner_frames.len();
    }

    pub fn spinner_frame(&self) -> &'static str {
        self.theme.spinner_frames[self.spinner_idx]
    }
}

#[cfg(test)]
mod tests {
    use hostdiag_core::api::TaskResult;

    use super::*;

    fn app() -> TuiApp {
        TuiApp::new(
            vec![
                (TaskId(0), "first".to_string()),
                (TaskId(1), "also first".to_string()),
            ],
            "linux".to_string(),
            Theme::default(),
        )
    }

    fn completed(id: u64, status: TaskStatus) -> TaskEvent {
        TaskEvent::Completed {
            id: TaskId(id),
            result: TaskResult {
                id: TaskId(id),
                status,
                ..TaskResult::default()
            },
        }
    }

    #[test]
    fn events_update_rows_by_id_not_name() {
        let mut app = app();
        app.handle_event(TaskEvent::Started {
            id: TaskId(1),
            name: "also first".to_string(),
        });
        assert_eq!(app.rows[0].status, TaskStatus::Pending);
        assert_eq!(app.rows[1].status, TaskStatus::Running);

        app.handle_event(completed(1, TaskStatus::Success));
        assert_eq!(app.rows[1].status, TaskStatus::Success);
        assert_eq!(app.completed, 1);
    }

    #[test]
    fn all_completed_backfills_dropped_events() {
        let mut app = app();
        app.handle_event(TaskEvent::AllCompleted {
            results: vec![
                TaskResult {
                    id: TaskId(0),
                    status: TaskStatus::Success,
                    ..TaskResult::default()
                },
                TaskResult {
                    id: TaskId(1),
                    status: TaskStatus::Failed,
                    ..TaskResult::default()
                },
            ],
        });
        assert!(app.all_done);
        assert_eq!(app.rows[0].status, TaskStatus::Success);
        assert_eq!(app.rows[1].status, TaskStatus::Failed);
        assert_eq!(app.completed, 2);
    }

    #[test]
    fn quit_mid_run_counts_as_interrupt() {
        let mut app = app();
        assert!(app.handle_key(KeyEvent::from(KeyCode::Char('q'))));
        assert!(app.interrupted);
    }

    #[test]
    fn enter_exits_only_after_report_written() {
        let mut app = app();
        assert!(!app.handle_key(KeyEvent::from(KeyCode::Enter)));

        app.handle_event(TaskEvent::ReportWritten {
            path: PathBuf::from("out.md"),
            tokens: 42,
        });
        assert!(app.waiting_input);
        assert!(app.handle_key(KeyEvent::from(KeyCode::Enter)));
        assert!(!app.interrupted);
    }
}
