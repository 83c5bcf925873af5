//! Task execution: one shell subprocess per eligible task, with a bounded
//! deadline and byte/line truncation of the captured output.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::config::RunnerConfig;
use crate::platform::Capabilities;

use super::eligibility;
use super::types::{Task, TaskResult, TaskStatus};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_LINES: usize = 500;
pub const DEFAULT_MAX_BYTES: usize = 64 * 1024;

/// Executes diagnostic tasks. Cheap to clone per worker via `Arc`.
pub struct Runner {
    caps: Capabilities,
    timeout: Duration,
    max_lines: usize,
    max_bytes: usize,
}

impl Runner {
    pub fn new(caps: Capabilities) -> Self {
        Self {
            caps,
            timeout: DEFAULT_TIMEOUT,
            max_lines: DEFAULT_MAX_LINES,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    pub fn with_config(caps: Capabilities, cfg: &RunnerConfig) -> Self {
        Self {
            caps,
            timeout: Duration::from_secs(cfg.timeout_secs),
            max_lines: cfg.max_lines,
            max_bytes: cfg.max_bytes,
        }
    }

    /// Execute a single task. Failures are contained in the returned result;
    /// this never propagates an error to the caller.
    pub async fn run(&self, task: &Task) -> TaskResult {
        if let Some(reason) = eligibility::skip_reason(task, &self.caps) {
            tracing::debug!(task = %task.name, %reason, "task skipped");
            return TaskResult::skipped(task, reason);
        }

        let mut result = TaskResult {
            id: task.id,
            name: task.name.clone(),
            command: task.command.clone(),
            category: task.category.clone(),
            ..TaskResult::default()
        };

        let max_lines = effective(task.max_lines, self.max_lines);
        let max_bytes = effective(task.max_bytes, self.max_bytes);

        let start = Instant::now();
        let spawned = Command::new("sh")
            .arg("-c")
            .arg(&task.command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                result.status = TaskStatus::Failed;
                result.error = format!("spawn failed: {e}");
                result.duration = start.elapsed();
                return result;
            }
        };

        // Drain both pipes concurrently so a chatty probe cannot deadlock on
        // a full pipe buffer; the buffers survive a timeout kill.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_task = tokio::spawn(read_stream(stdout));
        let stderr_task = tokio::spawn(read_stream(stderr));

        let mut timed_out = false;
        let mut wait_error = None;
        let waited = tokio::time::timeout(self.timeout, child.wait()).await;
        match waited {
            Ok(Ok(status)) => {
                if !status.success() {
                    wait_error = Some(exit_description(status));
                }
            }
            Ok(Err(e)) => wait_error = Some(format!("wait failed: {e}")),
            Err(_) => {
                timed_out = true;
                let _ = child.kill().await;
            }
        }
        result.duration = start.elapsed();

        let stdout_buf = stdout_task.await.unwrap_or_default();
        let stderr_buf = stderr_task.await.unwrap_or_default();
        result.output = truncate_output(&stdout_buf, max_lines, max_bytes);
        result.error = truncate_output(&stderr_buf, max_lines, max_bytes);

        if timed_out {
            result.status = TaskStatus::Failed;
            result.error = format!("Command timed out after {}s", self.timeout.as_secs());
        } else if let Some(desc) = wait_error {
            result.status = TaskStatus::Failed;
            if result.error.is_empty() {
                result.error = desc;
            }
        } else {
            result.status = TaskStatus::Success;
        }

        tracing::debug!(
            task = %task.name,
            status = %result.status,
            duration_ms = result.duration.as_millis() as u64,
            "task finished"
        );
        result
    }
}

fn effective(per_task: usize, default: usize) -> usize {
    if per_task == 0 {
        default
    } else {
        per_task
    }
}

async fn read_stream(stream: Option<impl tokio::io::AsyncRead + Unpin>) -> String {
    let Some(mut stream) = stream else {
        return String::new();
    };
    let mut buf = Vec::new();
    let _ = stream.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).into_owned()
}

fn exit_description(status: std::process::ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Apply the truncation policy: bytes first, then lines, then trim.
///
/// Byte truncation cuts on a char boundary at or below the cap, so a large
/// single line cannot bypass the byte cap before the line cap is applied.
pub(crate) fn truncate_output(text: &str, max_lines: usize, max_bytes: usize) -> String {
    let mut text = if text.len() > max_bytes {
        let mut cut = max_bytes;
        while cut > 0 && !text.is_char_boundary(cut) {
            cut -= 1;
        }
        format!(
            "{}\n... [truncated: exceeded {} bytes]",
            &text[..cut],
            max_bytes
        )
    } else {
        text.to_string()
    };

    let line_count = text.split('\n').count();
    if line_count > max_lines {
        let kept: Vec<&str> = text.split('\n').take(max_lines).collect();
        text = format!(
            "{}\n... [truncated: exceeded {} lines]",
            kept.join("\n"),
            max_lines
        );
    }

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::types::TaskId;

    fn caps() -> Capabilities {
        Capabilities {
            os: "linux".to_string(),
            ..Capabilities::default()
        }
    }

    fn task(command: &str) -> Task {
        Task {
            id: TaskId(7),
            name: "test".to_string(),
            command: command.to_string(),
            ..Task::default()
        }
    }

    #[test]
    fn output_at_byte_cap_is_untouched() {
        let text = "a".repeat(16);
        assert_eq!(truncate_output(&text, 500, 16), text);
    }

    #[test]
    fn output_over_byte_cap_gets_marker() {
        let text = "a".repeat(17);
        let out = truncate_output(&text, 500, 16);
        assert!(out.starts_with(&"a".repeat(16)));
        assert!(out.ends_with("[truncated: exceeded 16 bytes]"));
    }

    #[test]
    fn byte_cut_respects_char_boundaries() {
        // "é" is two bytes; cutting at 3 must back off to the boundary.
        let out = truncate_output("aéé", 500, 3);
        assert!(out.starts_with("aé"));
        assert!(out.contains("exceeded 3 bytes"));
    }

    #[test]
    fn output_at_line_cap_is_untouched() {
        let text = "1\n2\n3";
        assert_eq!(truncate_output(text, 3, 1024), text);
    }

    #[test]
    fn output_over_line_cap_gets_marker() {
        let out = truncate_output("1\n2\n3\n4", 3, 1024);
        assert_eq!(out, "1\n2\n3\n... [truncated: exceeded 3 lines]");
    }

    #[test]
    fn byte_truncation_runs_before_line_truncation() {
        // One huge line: byte cap applies even though the line count is low.
        let text = "x".repeat(2048);
        let out = truncate_output(&text, 500, 64);
        assert!(out.contains("exceeded 64 bytes"));
    }

    #[test]
    fn final_text_is_trimmed() {
        assert_eq!(truncate_output("  hello  \n", 500, 1024), "hello");
    }

    #[tokio::test]
    async fn successful_command_captures_stdout() {
        let runner = Runner::new(caps());
        let result = runner.run(&task("printf 'Linux 6.1'")).await;
        assert_eq!(result.status, TaskStatus::Success);
        assert_eq!(result.output, "Linux 6.1");
        assert_eq!(result.id, TaskId(7));
        assert!(result.skip_reason.is_empty());
    }

    #[tokio::test]
    async fn failing_command_keeps_stderr_as_error() {
        let runner = Runner::new(caps());
        let result = runner.run(&task("echo boom >&2; exit 3")).await;
        assert_eq!(result.status, TaskStatus::Failed);
        assert_eq!(result.error, "boom");
    }

    #[tokio::test]
    async fn failure_without_stderr_reports_exit_status() {
        let runner = Runner::new(caps());
        let result = runner.run(&task("exit 5")).await;
        assert_eq!(result.status, TaskStatus::Failed);
        assert_eq!(result.error, "exit status 5");
    }

    #[tokio::test]
    async fn timeout_kills_and_reports() {
        let cfg = RunnerConfig {
            timeout_secs: 1,
            ..RunnerConfig::default()
        };
        let runner = Runner::with_config(caps(), &cfg);
        let start = Instant::now();
        let result = runner.run(&task("sleep 30")).await;
        assert!(start.elapsed() < Duration::from_secs(10));
        assert_eq!(result.status, TaskStatus::Failed);
        assert_eq!(result.error, "Command timed out after 1s");
    }

    #[tokio::test]
    async fn skipped_task_spawns_no_subprocess() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        let mut t = task(&format!("touch {}", marker.display()));
        t.requires = vec!["definitely-nonexistent-binary-xyz".to_string()];

        let result = Runner::new(caps()).run(&t).await;
        assert_eq!(result.status, TaskStatus::Skipped);
        assert_eq!(
            result.skip_reason,
            "Missing dependency: definitely-nonexistent-binary-xyz"
        );
        assert!(!marker.exists(), "skipped task must not execute");
    }

    #[tokio::test]
    async fn per_task_line_override_applies() {
        let mut t = task("printf '1\\n2\\n3\\n4\\n'");
        t.max_lines = 2;
        let result = Runner::new(caps()).run(&t).await;
        assert_eq!(result.output, "1\n2\n... [truncated: exceeded 2 lines]");
    }
}
