use log::warn;

use crate::action::{DispatchResult, EditAction, StatusLevel};
use crate::error::EditError;
use crate::state::AppState;

pub(super) fn dispatch_edit(action: &EditAction, state: &mut AppState) -> DispatchResult {
    let editor = &mut state.editor;
    let outcome = match action {
        EditAction::CommitText { target, text } => editor.commit_text(target, text).map(|_| None),
        EditAction::Toggle(target) => editor.toggle(target).map(|_| None),
        EditAction::Step { target, direction } => editor.step(target, *direction).map(|_| None),
        EditAction::CycleType { owner, direction } => editor.cycle_type(owner, *direction).map(|_| None),
        EditAction::AddChain => editor.add_chain().map(|id| Some(format!("Added chain {}", id))),
        EditAction::RemoveChain(id) => editor.remove_chain(id).map(|_| Some(format!("Removed chain {}", id))),
        EditAction::AddEffect(chain) => editor
            .add_effect(chain)
            .map(|id| Some(format!("Added effect {} to {}", id, chain))),
        EditAction::RemoveEffect { chain, effect } => editor
            .remove_effect(chain, effect)
            .map(|_| Some(format!("Removed effect {} from {}", effect, chain))),
        EditAction::AddEvent => editor.add_event().map(|name| Some(format!("Added event {}", name))),
        EditAction::RemoveEvent(name) => editor.remove_event(name).map(|_| Some(format!("Removed event {}", name))),
        EditAction::AddAction(event) => editor
            .add_action(event)
            .map(|index| Some(format!("Added action {} to {}", index + 1, event))),
        EditAction::RemoveAction { event, index } => editor
            .remove_action(event, *index)
            .map(|_| Some(format!("Removed action {} from {}", index + 1, event))),
    };

    match outcome {
        Ok(Some(message)) => DispatchResult::with_status(StatusLevel::Info, message),
        Ok(None) => DispatchResult::none(),
        Err(e) => {
            let level = match e {
                EditError::Field(_) => StatusLevel::Warn,
                _ => StatusLevel::Error,
            };
            warn!("edit rejected: {}", e);
            DispatchResult::with_status(level, e.to_string())
        }
    }
}
