use std::collections::HashMap;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::probe::{TaskId, TaskResult, TaskStatus};

/// Visual progress monitor for the non-interactive path.
///
/// One overall bar plus a short-lived spinner per running task. Disabled
/// mode turns every call into a no-op so callers need no branching.
pub struct ProgressMonitor {
    multi: MultiProgress,
    overall: ProgressBar,
    task_bars: HashMap<TaskId, ProgressBar>,
    enabled: bool,
}

impl ProgressMonitor {
    pub fn new(total_tasks: usize, enabled: bool) -> Self {
        if !enabled {
            return Self {
                multi: MultiProgress::new(),
                overall: ProgressBar::hidden(),
                task_bars: HashMap::new(),
                enabled: false,
            };
        }

        let multi = MultiProgress::new();
        let overall = multi.add(ProgressBar::new(total_tasks as u64));

        overall.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} probes ({percent}%)")
                .unwrap()
                .progress_chars("█▓▒░  "),
        );

        Self {
            multi,
            overall,
            task_bars: HashMap::new(),
            enabled: true,
        }
    }

    /// Show a spinner for a task that entered Running.
    pub fn start_task(&mut self, id: TaskId, name: &str) {
        if !self.enabled {
            return;
        }

        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.green} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.set_message(name.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        self.task_bars.insert(id, bar);
    }

    /// Replace the task's spinner with its final status line.
    pub fn complete_task(&mut self, result: &TaskResult) {
        if !self.enabled {
            return;
        }

        let glyph = match result.status {
            TaskStatus::Success => "✓",
            TaskStatus::Skipped => "⊘",
            _ => "✗",
        };
        let line = format!(
            "{} {} ({}ms)",
            glyph,
            result.name,
            result.duration.as_millis()
        );

        if let Some(bar) = self.task_bars.remove(&result.id) {
            bar.finish_with_message(line);
        } else {
            self.overall.println(format!("  {line}"));
        }

        self.overall.inc(1);
    }

    pub fn finish(&self, failed: usize, skipped: usize) {
        if !self.enabled {
            return;
        }

        let msg = if failed == 0 {
            format!("all probes completed ({skipped} skipped)")
        } else {
            format!("{failed} probes failed ({skipped} skipped)")
        };
        self.overall.finish_with_message(msg);
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        for (_, bar) in self.task_bars.drain() {
            bar.finish_and_clear();
        }
    }
}
