use std::any::Any;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use lumen_core::form::Scope;

use super::form_view::{FormView, Listing};
use crate::state::AppState;
use crate::ui::{Action, EditAction, InputEvent, Keymap, Pane};

/// Editor for named events and their action lists.
pub struct EventsPane {
    keymap: Keymap,
    view: FormView,
}

impl EventsPane {
    pub fn new(keymap: Keymap) -> Self {
        Self { keymap, view: FormView::new(Listing::Events) }
    }

    fn selected_scope(&self, state: &AppState) -> Option<Scope> {
        let rows = self.view.rows(state);
        self.view.selected_row(&rows).map(|row| row.scope.clone())
    }
}

impl Pane for EventsPane {
    fn id(&self) -> &'static str {
        "events"
    }

    fn handle_action(&mut self, action: &str, _event: &InputEvent, state: &AppState) -> Action {
        if let Some(result) = self.view.handle_action(action, state) {
            return result;
        }
        match action {
            "add" => Action::Edit(EditAction::AddEvent),
            "add_child" => match self.selected_scope(state) {
                Some(scope) => match scope.event() {
                    Some(event) => Action::Edit(EditAction::AddAction(event.to_string())),
                    None => Action::None,
                },
                None => Action::None,
            },
            "remove" => match self.selected_scope(state) {
                Some(Scope::Action { event, index }) => Action::Edit(EditAction::RemoveAction { event, index }),
                Some(Scope::Event(event)) => Action::Edit(EditAction::RemoveEvent(event)),
                _ => Action::None,
            },
            _ => Action::None,
        }
    }

    fn handle_raw_input(&mut self, event: &InputEvent, _state: &AppState) -> Action {
        self.view.handle_raw_input(event)
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, state: &AppState) {
        self.view.render(area, buf, state, "Events");
    }

    fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    fn is_editing(&self) -> bool {
        self.view.is_editing()
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panes::test_support::{dummy_event, ready_state};

    #[test]
    fn structural_actions_use_event_scope() {
        let state = ready_state();
        let mut pane = EventsPane::new(Keymap::new());
        let ev = dummy_event();
        assert_eq!(pane.handle_action("add", &ev, &state), Action::Edit(EditAction::AddEvent));
        assert_eq!(pane.handle_action("add_child", &ev, &state), Action::Edit(EditAction::AddAction("drop".into())));
        assert_eq!(pane.handle_action("remove", &ev, &state), Action::Edit(EditAction::RemoveEvent("drop".into())));

        pane.handle_action("down", &ev, &state);
        assert_eq!(
            pane.handle_action("remove", &ev, &state),
            Action::Edit(EditAction::RemoveAction { event: "drop".into(), index: 0 })
        );
    }

    #[test]
    fn enter_on_action_param_opens_editor() {
        let state = ready_state();
        let mut pane = EventsPane::new(Keymap::new());
        let ev = dummy_event();
        let rows = pane.view.rows(&state);
        let field = rows.iter().position(|r| r.slot().is_some()).unwrap();
        for _ in 0..field {
            pane.handle_action("down", &ev, &state);
        }
        assert_eq!(pane.handle_action("edit", &ev, &state), Action::PushLayer("text_edit"));
        assert!(pane.is_editing());
    }
}
