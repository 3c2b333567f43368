use std::any::Any;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use lumen_core::form::Scope;

use super::form_view::{FormView, Listing};
use crate::state::AppState;
use crate::ui::{Action, EditAction, InputEvent, Keymap, Pane};

/// Editor for chains, their output and their effects.
pub struct ChainsPane {
    keymap: Keymap,
    view: FormView,
}

impl ChainsPane {
    pub fn new(keymap: Keymap) -> Self {
        Self { keymap, view: FormView::new(Listing::Chains) }
    }

    fn selected_scope(&self, state: &AppState) -> Option<Scope> {
        let rows = self.view.rows(state);
        self.view.selected_row(&rows).map(|row| row.scope.clone())
    }
}

impl Pane for ChainsPane {
    fn id(&self) -> &'static str {
        "chains"
    }

    fn handle_action(&mut self, action: &str, _event: &InputEvent, state: &AppState) -> Action {
        if let Some(result) = self.view.handle_action(action, state) {
            return result;
        }
        match action {
            "add" => Action::Edit(EditAction::AddChain),
            "add_child" => match self.selected_scope(state) {
                Some(scope) => match scope.chain_id() {
                    Some(chain) => Action::Edit(EditAction::AddEffect(chain.to_string())),
                    None => Action::None,
                },
                None => Action::None,
            },
            "remove" => match self.selected_scope(state) {
                Some(Scope::Effect { chain, effect }) => Action::Edit(EditAction::RemoveEffect { chain, effect }),
                Some(Scope::Chain(chain)) => Action::Edit(EditAction::RemoveChain(chain)),
                _ => Action::None,
            },
            _ => Action::None,
        }
    }

    fn handle_raw_input(&mut self, event: &InputEvent, _state: &AppState) -> Action {
        self.view.handle_raw_input(event)
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, state: &AppState) {
        self.view.render(area, buf, state, "Chains");
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
