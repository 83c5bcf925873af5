//! Stable re-exports for consumers (`cli` and external crates).
//!
//! Prefer importing from `hostdiag_core::api` instead of reaching into
//! internal modules.

pub use crate::config::{
    get_data_dir, load_default, AppConfig, LoggingConfig, ProbesConfig, ReportConfig, RunnerConfig,
    SchedulerConfig,
};
pub use crate::error::{CliError, LoaderError};
pub use crate::platform::{detect, Capabilities};
pub use crate::probe::{Loader, Profile, Runner, Task, TaskId, TaskResult, TaskStatus};
pub use crate::report::{MarkdownReport, ReportMode, TokenCounter};
pub use crate::scheduler::{run_tasks, EventSender, ProgressMonitor, TaskEvent, DEFAULT_WORKERS};
