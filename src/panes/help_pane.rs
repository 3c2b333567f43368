use std::any::Any;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders, Clear, Widget};

use crate::state::AppState;
use crate::ui::layout_helpers::center_rect;
use crate::ui::style::{Color, Style};
use crate::ui::theme::LumenTheme;
use crate::ui::{Action, InputEvent, KeyBinding, Keymap, NavAction, Pane};

/// Lists the bindings of the pane it was opened from, then the global ones.
pub struct HelpPane {
    keymap: Keymap,
    title: String,
    entries: Vec<(String, &'static str)>,
    scroll: usize,
}

impl HelpPane {
    pub fn new(keymap: Keymap) -> Self {
        Self { keymap, title: String::new(), entries: Vec::new(), scroll: 0 }
    }

    pub fn set_context(&mut self, pane_id: &str, pane_keys: &Keymap, global_keys: &Keymap) {
        self.title = format!(" Help: {} ", pane_id);
        self.scroll = 0;
        self.entries = entries(pane_keys.bindings());
        self.entries.push((String::new(), ""));
        self.entries.extend(entries(global_keys.bindings()));
    }
}

/// One line per action; keys bound to the same action are joined.
fn entries(bindings: &[KeyBinding]) -> Vec<(String, &'static str)> {
    let mut out: Vec<(String, &'static str, &'static str)> = Vec::new();
    for binding in bindings {
        let key = binding.pattern.display();
        match out.iter_mut().find(|(_, action, _)| *action == binding.action) {
            Some(entry) => {
                entry.0.push_str(", ");
                entry.0.push_str(&key);
            }
            None => out.push((key, binding.action, binding.description)),
        }
    }
    out.into_iter().map(|(keys, _, description)| (keys, description)).collect()
}

impl Pane for HelpPane {
    fn id(&self) -> &'static str {
        "help"
    }

    fn handle_action(&mut self, action: &str, _event: &InputEvent, _state: &AppState) -> Action {
        match action {
            "close" => Action::Nav(NavAction::PopPane),
            "up" => {
                self.scroll = self.scroll.saturating_sub(1);
                Action::None
            }
            "down" => {
                self.scroll = (self.scroll + 1).min(self.entries.len().saturating_sub(1));
                Action::None
            }
            _ => Action::None,
        }
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, _state: &AppState) {
        let rect = center_rect(area, 60, area.height.saturating_sub(4));
        Clear.render(rect, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title.as_str())
            .border_style(ratatui::style::Style::from(Style::new().fg(Color::CYAN)))
            .title_style(LumenTheme::header());
        let inner = block.inner(rect);
        block.render(rect, buf);

        for (i, (keys, description)) in self.entries.iter().skip(self.scroll).take(inner.height as usize).enumerate() {
            let y = inner.y + i as u16;
            buf.set_stringn(inner.x + 1, y, keys, 18, Style::new().fg(Color::YELLOW));
            buf.set_stringn(inner.x + 20, y, description, inner.width.saturating_sub(21) as usize, LumenTheme::value());
        }
    }

    fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    fn is_overlay(&self) -> bool {
        true
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
