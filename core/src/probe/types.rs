use std::time::Duration;

use serde::Deserialize;

/// Stable identifier assigned to every task at load time.
///
/// Event correlation (TUI rows, lifecycle notifications) is keyed by this id
/// rather than the display name, so tasks sharing a name cannot misattribute
/// status updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Execution status of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Success,
    Skipped,
    Failed,
}

impl TaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Running => "Running",
            TaskStatus::Success => "Success",
            TaskStatus::Skipped => "Skipped",
            TaskStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single declarative diagnostic command.
///
/// Created once by the loader from manifest declarations and immutable
/// thereafter; neither the scheduler nor the runner mutates it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Task {
    /// Load-time sequence number, not part of the manifest.
    #[serde(skip)]
    pub id: TaskId,

    /// Display label. Uniqueness is not enforced; correlation uses `id`.
    pub name: String,

    /// Opaque shell command, executed as-is through `sh -c`.
    pub command: String,

    /// Required privilege level: "" or "sudo".
    #[serde(default)]
    pub privilege: String,

    /// Per-task line cap for captured output; 0 means the system default.
    #[serde(default)]
    pub max_lines: usize,

    /// Per-task byte cap for captured output; 0 means the system default.
    #[serde(default)]
    pub max_bytes: usize,

    /// Binaries that must resolve on PATH for the task to run.
    #[serde(default)]
    pub requires: Vec<String>,

    /// Environment tags gating eligibility, e.g. "wayland" or "hyprland".
    #[serde(default)]
    pub tags: Vec<String>,

    /// Report grouping key; defaults to the manifest's source name.
    #[serde(default)]
    pub category: String,
}

/// A named, optionally platform-scoped collection of tasks. Consumed once
/// by the loader to produce the flat task list.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Target platform string, e.g. "arch_linux". Empty applies universally.
    #[serde(default)]
    pub platform: String,

    pub tasks: Vec<Task>,
}

/// Outcome of running a single task.
///
/// Exactly one of normal completion, skip, or failure applies;
/// `skip_reason` is non-empty iff `status == Skipped`.
#[derive(Debug, Clone, Default)]
pub struct TaskResult {
    pub id: TaskId,
    pub name: String,
    pub command: String,
    pub category: String,
    pub status: TaskStatus,

    /// Captured standard output, truncated per policy.
    pub output: String,

    /// Captured standard error or failure description, truncated per policy.
    pub error: String,

    pub duration: Duration,

    /// Human-readable reason, set only for skipped tasks.
    pub skip_reason: String,
}

impl TaskResult {
    /// Result for a task rejected by the eligibility filter. No subprocess
    /// was spawned.
    pub fn skipped(task: &Task, reason: String) -> Self {
        Self {
            id: task.id,
            name: task.name.clone(),
            command: task.command.clone(),
            category: task.category.clone(),
            status: TaskStatus::Skipped,
            skip_reason: reason,
            ..Self::default()
        }
    }
}
