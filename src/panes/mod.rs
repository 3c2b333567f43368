mod chains_pane;
mod confirm_pane;
mod events_pane;
mod form_view;
mod help_pane;
mod live_pane;

pub use chains_pane::ChainsPane;
pub use confirm_pane::{ConfirmPane, PendingAction};
pub use events_pane::EventsPane;
pub use help_pane::HelpPane;
pub use live_pane::LivePane;

#[cfg(test)]
pub(crate) mod test_support {
    use lumen_core::model::{Chain, Config, Effect, EventAction};
    use lumen_core::schema::{Registry, SchemaKind};
    use lumen_core::settings::Settings;
    use serde_json::json;

    use crate::state::AppState;
    use crate::ui::{InputEvent, KeyCode, Modifiers};

    pub fn dummy_event() -> InputEvent {
        InputEvent::new(KeyCode::Char(' '), Modifiers::default())
    }

    /// One chain with one effect, one event with one action; editor ready.
    pub fn ready_state() -> AppState {
        let mut state = AppState::new(Settings::default());
        let effects = Registry::from_effect_json(
            r#"{"strobe": {"args": {"rate": {"type": "int"}, "on": {"type": "bool"}}}, "solid": {"args": {}}}"#,
        )
        .unwrap();
        let actions = Registry::from_action_json(
            r#"{"set_global": {"Parameters": [{"internal_name": "value", "data_type": "float64", "default_value": 1}]}}"#,
        )
        .unwrap();

        let mut config = Config::default();
        let mut chain = Chain::new("c1");
        chain.effects.push(Effect::new("e1", "strobe"));
        config.chains.push(chain);
        let mut action = EventAction::new("set_global");
        action.params.insert("value".into(), json!(0.5));
        config.events.insert("drop".into(), vec![action]);

        state.editor.on_schemas(SchemaKind::Effect, Ok(effects));
        state.editor.on_schemas(SchemaKind::Action, Ok(actions));
        state.editor.on_config(Ok(config));
        assert!(state.editor.is_ready());
        state
    }
}
