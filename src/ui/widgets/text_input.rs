use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::StatefulWidget;

use rat_event::{HandleEvent, Regular};
use rat_widget::focus::HasFocus;
use rat_widget::text_input::{TextInput as RatTextInput, TextInputState};

use crate::ui::input::InputEvent;
use crate::ui::rat_compat::{outcome_consumed, to_crossterm_key_event};
use crate::ui::theme::LumenTheme;

/// Single-line field editor backed by rat-widget.
pub struct TextInput {
    state: TextInputState,
}

impl TextInput {
    pub fn new() -> Self {
        Self {
            state: TextInputState::new(),
        }
    }

    pub fn value(&self) -> &str {
        self.state.text()
    }

    /// Load `value` and select it so the first keystroke replaces it.
    pub fn begin(&mut self, value: &str) {
        self.state.set_value(value);
        self.state.select_all();
        self.state.focus.set(true);
    }

    pub fn end(&mut self) {
        self.state.focus.set(false);
    }

    /// Handle input, returns true if the event was consumed
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        if !self.state.is_focused() {
            return false;
        }
        let ct_event = to_crossterm_key_event(event);
        let outcome: rat_event::Outcome = self.state.handle(&ct_event, Regular).into();
        outcome_consumed(outcome)
    }

    pub fn render_buf(&mut self, buf: &mut Buffer, x: u16, y: u16, width: u16) {
        if width == 0 {
            return;
        }
        let widget = RatTextInput::new()
            .style(LumenTheme::text_input_style())
            .focus_style(LumenTheme::text_input_focus_style())
            .select_style(LumenTheme::text_input_select_style());
        widget.render(Rect::new(x, y, width, 1), buf, &mut self.state);
    }
}

impl Default for TextInput {
    fn default() -> Self {
        Self::new()
    }
}
