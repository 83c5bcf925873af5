mod app;
mod events;
mod theme;
mod ui;

use std::io;
use std::time::Duration;

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use hostdiag_core::api::TaskEvent;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

pub use app::TuiApp;
pub use theme::Theme;

pub fn check_tui_support() -> Result<(), String> {
    if !atty::is(atty::Stream::Stdout) {
        return Err("stdout is not a terminal".to_string());
    }
    if !cfg!(windows) && std::env::var("TERM").is_err() {
        return Err("TERM environment variable not set".to_string());
    }
    let (width, height) = terminal::size().map_err(|e| format!("terminal size failed: {e}"))?;
    if width < 60 || height < 16 {
        return Err(format!(
            "terminal too small ({}x{}), need at least 60x16",
            width, height
        ));
    }
    Ok(())
}

/// Drive the display until the report is acknowledged or the user aborts.
///
/// Consumes the scheduler's event stream; key input arrives from a reader
/// thread so the loop itself never blocks on the terminal.
pub async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp,
    mut event_rx: mpsc::Receiver<TaskEvent>,
) -> Result<(), String> {
    let (input_reader, mut input_rx) = events::InputReader::start();
    let mut tick = tokio::time::interval(Duration::from_millis(100));
    let mut events_open = true;

    loop {
        tokio::select! {
            event = event_rx.recv(), if events_open => {
                match event {
                    Some(event) => app.handle_event(event),
                    None => events_open = false,
                }
            }
            Some(key) = input_rx.recv() => {
                if app.handle_key(key) {
                    break;
                }
            }
            _ = tick.tick() => {
                app.tick();
            }
        }

        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| e.to_string())?;

        // Producers vanished without writing a report: nothing further can
        // arrive, so exit and let the caller surface the driver's error.
        if !events_open && !app.waiting_input {
            break;
        }
    }

    input_reader.stop();
    Ok(())
}

pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>, String> {
    enable_raw_mode().map_err(|e| e.to_string())?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).map_err(|e| e.to_string())?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.to_string())
}

pub fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), terminal::LeaveAlternateScreen);
    let _ = terminal.show_cursor();
}
