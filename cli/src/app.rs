//! Application assembly: merges configuration overrides, loads the task
//! list, and dispatches between the plain and TUI flows.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hostdiag_core::api::{
    run_tasks, CliError, EventSender, Loader, MarkdownReport, ProgressMonitor, ReportMode, Runner,
    TaskEvent, TaskStatus, TokenCounter,
};
use hostdiag_core::api::{AppConfig, Capabilities, Task};

use crate::commands::cli::Args;
use crate::tui;

pub async fn run(args: Args, mut cfg: AppConfig) -> Result<i32, CliError> {
    let mode = args.report_mode();

    if let Some(workers) = args.workers {
        cfg.scheduler.workers = workers;
    }
    if let Some(secs) = args.timeout_secs {
        cfg.runner.timeout_secs = secs;
    }
    if let Some(dir) = &args.probes_dir {
        cfg.probes.extra_dir = Some(dir.clone());
    }

    let run_id = uuid::Uuid::new_v4().to_string();
    let caps = hostdiag_core::api::detect();
    tracing::debug!(run_id = %run_id, "platform: {}", caps.summary());

    let mut loader = Loader::new(caps.clone());
    if let Some(dir) = &cfg.probes.extra_dir {
        loader = loader.with_extra_dir(dir);
    }
    let mut tasks = loader.tasks()?;

    if mode == ReportMode::Intro {
        tasks.retain(|t| t.category == "intro");
    }
    if tasks.is_empty() {
        return Err(CliError::NoTasks);
    }

    let output_path = PathBuf::from(args.output_path());
    let runner = Arc::new(Runner::with_config(caps.clone(), &cfg.runner));
    let counter = TokenCounter::from_config(cfg.report.tokenizer_path.as_deref().map(Path::new));
    let workers = cfg.scheduler.workers;

    let use_tui = !args.no_ui && tui::check_tui_support().is_ok();
    if use_tui {
        run_tui_flow(
            caps,
            tasks,
            runner,
            workers,
            counter,
            mode,
            output_path,
        )
        .await
    } else {
        run_plain_flow(
            caps,
            tasks,
            runner,
            workers,
            counter,
            mode,
            output_path,
        )
        .await
    }
}

/// Non-interactive flow: progress lines on stdout, then the report write.
async fn run_plain_flow(
    caps: Capabilities,
    tasks: Vec<Task>,
    runner: Arc<Runner>,
    workers: usize,
    counter: TokenCounter,
    mode: ReportMode,
    output_path: PathBuf,
) -> Result<i32, CliError> {
    println!("Running {} diagnostic probes...", tasks.len());

    let (events, mut rx) = EventSender::bounded_for(tasks.len());
    let total = tasks.len();
    let show_progress = atty::is(atty::Stream::Stdout);

    let progress_task = tokio::spawn(async move {
        let mut monitor = ProgressMonitor::new(total, show_progress);
        let mut failed = 0usize;
        let mut skipped = 0usize;
        while let Some(event) = rx.recv().await {
            match event {
                TaskEvent::Started { id, name } => monitor.start_task(id, &name),
                TaskEvent::Completed { result, .. } => {
                    match result.status {
                        TaskStatus::Failed => failed += 1,
                        TaskStatus::Skipped => skipped += 1,
                        _ => {}
                    }
                    monitor.complete_task(&result);
                }
                TaskEvent::AllCompleted { .. } => break,
                TaskEvent::ReportWritten { .. } => {}
            }
        }
        monitor.finish(failed, skipped);
    });

    let results = run_tasks(runner, &tasks, workers, Some(events)).await;
    let _ = progress_task.await;

    let report = MarkdownReport::new(caps, results, counter);
    let (content, tokens) = report.render(mode);
    std::fs::write(&output_path, &content).map_err(|source| CliError::ReportWrite {
        path: output_path.display().to_string(),
        source,
    })?;

    println!(
        "\n✓ Report saved to: {} ({} tokens)",
        output_path.display(),
        tokens
    );
    Ok(0)
}

/// Interactive flow: the scheduler and report writer run in a background
/// task while the TUI consumes the event stream.
async fn run_tui_flow(
    caps: Capabilities,
    tasks: Vec<Task>,
    runner: Arc<Runner>,
    workers: usize,
    counter: TokenCounter,
    mode: ReportMode,
    output_path: PathBuf,
) -> Result<i32, CliError> {
    let (events, rx) = EventSender::bounded_for(tasks.len());
    let rows: Vec<(hostdiag_core::api::TaskId, String)> = tasks
        .iter()
        .map(|t| (t.id, t.name.clone()))
        .collect();

    let driver_caps = caps.clone();
    let driver_events = events.clone();
    let driver = tokio::spawn(async move {
        let results = run_tasks(runner, &tasks, workers, Some(driver_events.clone())).await;

        let report = MarkdownReport::new(driver_caps, results, counter);
        let (content, tokens) = report.render(mode);
        std::fs::write(&output_path, &content)
            .map_err(|source| CliError::ReportWrite {
                path: output_path.display().to_string(),
                source,
            })
            .map(|()| {
                driver_events.emit(TaskEvent::ReportWritten {
                    path: output_path.clone(),
                    tokens,
                });
            })
    });

    // The driver holds the only senders now; the channel closing tells the
    // display loop that no further events can arrive.
    drop(events);

    let theme = tui::Theme::default();
    let mut app = tui::TuiApp::new(rows, caps.summary(), theme);
    let mut terminal = tui::setup_terminal().map_err(CliError::Terminal)?;
    let loop_result = tui::run_loop(&mut terminal, &mut app, rx).await;
    tui::restore_terminal(&mut terminal);

    if app.interrupted {
        driver.abort();
        println!("Interrupted. Partial results were discarded.");
        return Ok(130);
    }

    loop_result.map_err(CliError::Terminal)?;

    match driver.await {
        Ok(write_result) => write_result?,
        Err(e) => return Err(CliError::Terminal(format!("scheduler task failed: {e}"))),
    }

    Ok(0)
}
