use super::style::{Color, Style};

/// Shared styles for the editor panes.
pub struct LumenTheme;

impl LumenTheme {
    pub fn text_input_style() -> ratatui::style::Style {
        Style::new().fg(Color::WHITE).bg(Color::new(30, 30, 40)).into()
    }

    pub fn text_input_focus_style() -> ratatui::style::Style {
        Style::new().fg(Color::WHITE).bg(Color::SELECTION_BG).into()
    }

    pub fn text_input_select_style() -> ratatui::style::Style {
        Style::new().fg(Color::BLACK).bg(Color::CYAN).into()
    }

    pub fn header() -> ratatui::style::Style {
        Style::new().fg(Color::CYAN).bold().into()
    }

    pub fn label() -> ratatui::style::Style {
        Style::new().fg(Color::GRAY).into()
    }

    pub fn value() -> ratatui::style::Style {
        Style::new().fg(Color::WHITE).into()
    }

    pub fn selected_row() -> ratatui::style::Style {
        Style::new().fg(Color::WHITE).bg(Color::SELECTION_BG).into()
    }

    /// Value that doesn't parse; it won't be committed
    pub fn invalid() -> ratatui::style::Style {
        Style::new().fg(Color::RED).into()
    }

    /// Parses, but sits outside the schema's soft bounds
    pub fn out_of_range() -> ratatui::style::Style {
        Style::new().fg(Color::AMBER).into()
    }

    pub fn muted() -> ratatui::style::Style {
        Style::new().fg(Color::DARK_GRAY).into()
    }

    pub fn selector() -> ratatui::style::Style {
        Style::new().fg(Color::MAGENTA).into()
    }
}
