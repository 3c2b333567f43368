use lumen_core::form::{FormRow, RowKind};

use super::FormView;
use crate::state::AppState;
use crate::ui::{Action, EditAction, InputEvent};

impl FormView {
    /// Cursor and field actions shared by the editor panes. Returns None for
    /// actions the pane should handle itself.
    pub fn handle_action(&mut self, action: &str, state: &AppState) -> Option<Action> {
        if self.editing.is_some() {
            return Some(self.handle_edit_action(action));
        }
        let rows = self.rows(state);
        let len = rows.len();
        let page = self.page.max(1) as isize;
        let result = match action {
            "up" => {
                self.move_by(-1, len);
                Action::None
            }
            "down" => {
                self.move_by(1, len);
                Action::None
            }
            "page_up" => {
                self.move_by(-page, len);
                Action::None
            }
            "page_down" => {
                self.move_by(page, len);
                Action::None
            }
            "top" => {
                self.selected = 0;
                Action::None
            }
            "bottom" => {
                self.selected = len.saturating_sub(1);
                Action::None
            }
            "edit" => self.edit_selected(&rows),
            "toggle" => match self.selected_row(&rows).map(|r| &r.kind) {
                Some(RowKind::Field(slot)) if slot.widget.is_toggle() => {
                    Action::Edit(EditAction::Toggle(slot.target.clone()))
                }
                _ => Action::None,
            },
            "left" => self.adjust_selected(&rows, -1),
            "right" => self.adjust_selected(&rows, 1),
            _ => return None,
        };
        Some(result)
    }

    fn handle_edit_action(&mut self, action: &str) -> Action {
        match action {
            "text:confirm" => {
                let text = self.edit_input.value().to_string();
                self.edit_input.end();
                match self.editing.take() {
                    Some(target) => Action::Edit(EditAction::CommitText { target, text }),
                    None => Action::None,
                }
            }
            "text:cancel" => {
                self.edit_input.end();
                self.editing = None;
                Action::None
            }
            _ => Action::None,
        }
    }

    pub fn handle_raw_input(&mut self, event: &InputEvent) -> Action {
        if self.editing.is_some() {
            self.edit_input.handle_input(event);
        }
        Action::None
    }

    fn edit_selected(&mut self, rows: &[FormRow<'_>]) -> Action {
        match self.selected_row(rows).map(|r| &r.kind) {
            Some(RowKind::Field(slot)) if slot.widget.is_toggle() => {
                Action::Edit(EditAction::Toggle(slot.target.clone()))
            }
            Some(RowKind::Field(slot)) => {
                self.editing = Some(slot.target.clone());
                self.edit_input.begin(&slot.widget.text());
                Action::PushLayer("text_edit")
            }
            Some(RowKind::Selector(section)) => {
                Action::Edit(EditAction::CycleType { owner: section.owner.clone(), direction: 1 })
            }
            _ => Action::None,
        }
    }

    fn adjust_selected(&self, rows: &[FormRow<'_>], direction: i8) -> Action {
        match self.selected_row(rows).map(|r| &r.kind) {
            Some(RowKind::Field(slot)) if slot.widget.is_numeric() => {
                Action::Edit(EditAction::Step { target: slot.target.clone(), direction })
            }
            Some(RowKind::Field(slot)) if slot.widget.is_toggle() => {
                Action::Edit(EditAction::Toggle(slot.target.clone()))
            }
            Some(RowKind::Selector(section)) => {
                Action::Edit(EditAction::CycleType { owner: section.owner.clone(), direction })
            }
            _ => Action::None,
        }
    }
}
