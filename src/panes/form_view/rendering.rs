use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders, Widget};

use lumen_core::editor::EditorPhase;
use lumen_core::form::{FieldSlot, FormRow, RowKind};

use super::{FormView, Listing};
use crate::state::AppState;
use crate::ui::style::{Color, Style};
use crate::ui::theme::LumenTheme;

const LABEL_WIDTH: u16 = 20;

impl FormView {
    pub fn render(&mut self, area: Rect, buf: &mut Buffer, state: &AppState, title: &str) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", title))
            .border_style(ratatui::style::Style::from(Style::new().fg(Color::DARK_GRAY)))
            .title_style(LumenTheme::header());
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        match state.editor.phase() {
            EditorPhase::Loading => {
                buf.set_stringn(inner.x + 1, inner.y, "Loading configuration...", inner.width as usize, LumenTheme::muted());
                return;
            }
            EditorPhase::Failed(reason) => {
                let style = ratatui::style::Style::from(Style::new().fg(Color::RED).bold());
                buf.set_stringn(inner.x + 1, inner.y, "Could not load configuration", inner.width as usize, style);
                if inner.height > 1 {
                    buf.set_stringn(inner.x + 1, inner.y + 1, reason, inner.width.saturating_sub(2) as usize, LumenTheme::invalid());
                }
                if inner.height > 3 {
                    let hint = "Editing is disabled. Restart once the server is reachable.";
                    buf.set_stringn(inner.x + 1, inner.y + 3, hint, inner.width.saturating_sub(2) as usize, LumenTheme::muted());
                }
                return;
            }
            EditorPhase::Ready => {}
        }

        let rows = self.rows(state);
        if rows.is_empty() {
            let hint = match self.listing {
                Listing::Chains => "No chains. Press a to add one.",
                Listing::Events => "No events. Press a to add one.",
            };
            buf.set_stringn(inner.x + 1, inner.y, hint, inner.width as usize, LumenTheme::muted());
            return;
        }

        self.selected = self.selected.min(rows.len() - 1);
        self.page = inner.height as usize;
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + self.page {
            self.scroll = self.selected + 1 - self.page;
        }

        for (i, row) in rows.iter().enumerate().skip(self.scroll).take(self.page) {
            let y = inner.y + (i - self.scroll) as u16;
            let is_sel = i == self.selected;
            if is_sel {
                buf.set_style(Rect::new(inner.x, y, inner.width, 1), LumenTheme::selected_row());
            }
            self.render_row(buf, Rect::new(inner.x, y, inner.width, 1), row, is_sel);
        }
    }

    fn render_row(&mut self, buf: &mut Buffer, line: Rect, row: &FormRow<'_>, is_sel: bool) {
        let indent = u16::from(row.depth) * 2 + 1;
        let x = line.x + indent;
        let width = line.width.saturating_sub(indent) as usize;
        match &row.kind {
            RowKind::Header(title) => {
                let style = if row.depth == 0 {
                    LumenTheme::header()
                } else {
                    ratatui::style::Style::from(Style::new().fg(Color::LIME))
                };
                buf.set_stringn(x, line.y, title, width, style);
            }
            RowKind::Empty(note) => {
                buf.set_stringn(x, line.y, note, width, LumenTheme::muted());
            }
            RowKind::Selector(section) => {
                buf.set_stringn(x, line.y, "type", width, LumenTheme::label());
                let value = format!("< {} >", section.selector.current_label());
                let vx = x + LABEL_WIDTH;
                if vx < line.x + line.width {
                    let remaining = (line.x + line.width - vx) as usize;
                    buf.set_stringn(vx, line.y, &value, remaining, LumenTheme::selector());
                }
            }
            RowKind::Field(slot) => self.render_field(buf, line, x, width, slot, is_sel),
        }
    }

    fn render_field(&mut self, buf: &mut Buffer, line: Rect, x: u16, width: usize, slot: &FieldSlot, is_sel: bool) {
        let widget = &slot.widget;
        buf.set_stringn(x, line.y, widget.label(), width.min(LABEL_WIDTH as usize - 1), LumenTheme::label());

        let vx = x + LABEL_WIDTH;
        if vx >= line.x + line.width {
            return;
        }
        let remaining = line.x + line.width - vx;

        if is_sel && self.editing.as_ref() == Some(&slot.target) {
            self.edit_input.render_buf(buf, vx, line.y, remaining.min(40));
            return;
        }

        let style = if !widget.is_valid() {
            LumenTheme::invalid()
        } else if widget.out_of_range() {
            LumenTheme::out_of_range()
        } else {
            LumenTheme::value()
        };
        let text = if widget.is_toggle() {
            if widget.text() == "true" { "[x]".to_string() } else { "[ ]".to_string() }
        } else {
            widget.text()
        };
        buf.set_stringn(vx, line.y, &text, remaining as usize, style);
    }
}
