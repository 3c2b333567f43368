use serde_json::Value;

use crate::action::{DispatchResult, StatusLevel};
use crate::api::{ApiFeedback, ApiHandle};
use crate::editor::LoadOutcome;
use crate::state::AppState;

/// Apply one completed request to the app state.
pub fn dispatch_feedback(feedback: ApiFeedback, state: &mut AppState, api: &ApiHandle) -> DispatchResult {
    let mut result = DispatchResult::default();

    match feedback {
        ApiFeedback::Schemas { kind, result: loaded } => {
            load_status(state.editor.on_schemas(kind, loaded), state, &mut result);
        }
        ApiFeedback::Config(loaded) => {
            load_status(state.editor.on_config(loaded), state, &mut result);
        }
        ApiFeedback::Saved(saved) => match state.editor.on_saved(saved) {
            Ok(message) => result.push_status(StatusLevel::Info, message),
            Err(e) => result.push_status(StatusLevel::Error, e.to_string()),
        },
        ApiFeedback::Tempo(tempo) => {
            state.live.poller.apply_tempo(tempo, &mut state.live.view);
        }
        ApiFeedback::TempoSet(tempo) => {
            if let Err(e) = state.live.poller.apply_tempo_write(tempo, &mut state.live.view) {
                result.push_status(StatusLevel::Warn, e.to_string());
            }
        }
        ApiFeedback::Chains(chains) => {
            state.live.poller.apply_chains(chains, &mut state.live.view);
        }
        ApiFeedback::Events(events) => {
            state.live.poller.apply_events(events, &mut state.live.view);
        }
        ApiFeedback::Triggered { event, result: outcome } => {
            match outcome {
                Ok(body) => result.push_status(StatusLevel::Info, trigger_message(&event, &body)),
                Err(e) => result.push_status(StatusLevel::Warn, e.to_string()),
            }
            // don't wait for the next tick
            result.merge(super::live::refresh_all(api));
        }
    }

    result
}

fn load_status(outcome: LoadOutcome, state: &AppState, result: &mut DispatchResult) {
    let config = state.editor.config();
    match outcome {
        LoadOutcome::Ready => result.push_status(
            StatusLevel::Info,
            format!("Loaded {} chains, {} events", config.chains.len(), config.events.len()),
        ),
        LoadOutcome::Reloaded => result.push_status(StatusLevel::Info, "Config reloaded"),
        LoadOutcome::Failed(message) => result.push_status(StatusLevel::Error, message),
        LoadOutcome::ReloadFailed(message) => result.push_status(StatusLevel::Warn, message),
        LoadOutcome::Pending | LoadOutcome::Ignored => {}
    }
}

/// Status line text for a trigger response: its `message` if it has one.
fn trigger_message(event: &str, body: &Value) -> String {
    match body.get("message").and_then(Value::as_str) {
        Some(message) => format!("{}: {}", event, message),
        None => format!("Triggered {}", event),
    }
}
