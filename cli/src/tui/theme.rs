use ratatui::style::Color;

/// Immutable display theme, injected into the TUI at construction.
///
/// Everything the renderer needs to style output lives here instead of in
/// process-wide tables, so alternative palettes are a constructor away.
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub muted: Color,
    pub spinner_frames: &'static [&'static str],
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            success: Color::Green,
            error: Color::Red,
            warning: Color::Yellow,
            muted: Color::DarkGray,
            spinner_frames: &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
        }
    }
}
