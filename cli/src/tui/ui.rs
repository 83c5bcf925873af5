use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};
use ratatui::Frame;

use hostdiag_core::api::TaskStatus;

use super::app::{TaskRow, TuiApp};

/// Window of rows shown in the task table; older rows scroll off the top.
const VISIBLE_ROWS: usize = 15;

pub fn draw(f: &mut Frame<'_>, app: &TuiApp) {
    let size = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(size);

    draw_header(f, chunks[0], app);
    draw_progress(f, chunks[1], app);
    draw_tasks(f, chunks[2], app);
    draw_footer(f, chunks[3], app);
}

fn draw_header(f: &mut Frame<'_>, area: Rect, app: &TuiApp) {
    let status = if app.interrupted {
        Span::styled("INTERRUPTED", Style::default().fg(app.theme.error))
    } else if app.waiting_input {
        Span::styled("DONE", Style::default().fg(app.theme.success))
    } else if app.all_done {
        Span::styled("WRITING REPORT", Style::default().fg(app.theme.warning))
    } else {
        Span::styled("SCANNING", Style::default().fg(app.theme.accent))
    };

    let line = Line::from(vec![
        Span::styled(
            "Hostdiag Scanner",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        status,
        Span::raw("  "),
        Span::styled(app.platform.clone(), Style::default().fg(app.theme.muted)),
    ]);

    let header = Paragraph::new(line).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, area);
}

fn draw_progress(f: &mut Frame<'_>, area: Rect, app: &TuiApp) {
    let total = app.total().max(1);
    let ratio = app.completed as f64 / total as f64;

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(app.theme.accent))
        .label(format!("{}/{}", app.completed, app.total()))
        .ratio(ratio.clamp(0.0, 1.0));
    f.render_widget(gauge, area);
}

fn draw_tasks(f: &mut Frame<'_>, area: Rect, app: &TuiApp) {
    let visible = area.height.saturating_sub(2).max(1) as usize;
    let window = visible.min(VISIBLE_ROWS);
    let start = app.rows.len().saturating_sub(window);

    let mut lines: Vec<Line> = Vec::with_capacity(window + 1);
    if start > 0 {
        lines.push(Line::from(Span::styled(
            format!("... {start} earlier probes"),
            Style::default().fg(app.theme.muted),
        )));
    }
    for row in &app.rows[start..] {
        lines.push(task_line(app, row));
    }

    let block = Block::default().borders(Borders::ALL).title("Probes");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn task_line<'a>(app: &TuiApp, row: &'a TaskRow) -> Line<'a> {
    let (glyph, style) = match row.status {
        TaskStatus::Pending => ("·", Style::default().fg(app.theme.muted)),
        TaskStatus::Running => (app.spinner_frame(), Style::default().fg(app.theme.warning)),
        TaskStatus::Success => ("✓", Style::default().fg(app.theme.success)),
        TaskStatus::Skipped => ("⊘", Style::default().fg(app.theme.muted)),
        TaskStatus::Failed => ("✗", Style::default().fg(app.theme.error)),
    };

    let duration = if row.duration.is_zero() {
        String::new()
    } else {
        format!(" ({}ms)", row.duration.as_millis())
    };

    Line::from(vec![
        Span::styled(format!(" {glyph} "), style),
        Span::raw(truncate_name(&row.name, 48)),
        Span::styled(
            format!(" {}{duration}", row.status.label()),
            Style::default().fg(app.theme.muted),
        ),
    ])
}

fn draw_footer(f: &mut Frame<'_>, area: Rect, app: &TuiApp) {
    let elapsed = app.start.elapsed().as_secs();
    let mut spans = vec![Span::styled(
        format!("Elapsed: {}m{:02}s", elapsed / 60, elapsed % 60),
        Style::default().fg(app.theme.muted),
    )];

    if let Some((path, tokens)) = &app.report {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("Report saved to {} ({tokens} tokens)", path.display()),
            Style::default().fg(app.theme.success),
        ));
        spans.push(Span::styled(
            "  press Enter to exit",
            Style::default().fg(app.theme.muted),
        ));
    } else {
        spans.push(Span::styled(
            "  q to abort",
            Style::default().fg(app.theme.muted),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::TOP));
    f.render_widget(footer, area);
}

fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let mut out: String = name.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
