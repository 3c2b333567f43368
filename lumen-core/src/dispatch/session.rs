use log::info;

use crate::action::{DispatchResult, SessionAction, StatusLevel};
use crate::api::{ApiCmd, ApiHandle};
use crate::schema::SchemaKind;
use crate::state::AppState;

pub(super) fn dispatch_session(action: SessionAction, state: &mut AppState, api: &mut ApiHandle) -> DispatchResult {
    match action {
        SessionAction::Load => {
            info!("loading schemas and config from {}", state.settings.base_url);
            // all three in flight at once; the editor waits for the set
            super::send_all(
                api,
                [
                    ApiCmd::FetchSchemas(SchemaKind::Effect),
                    ApiCmd::FetchSchemas(SchemaKind::Action),
                    ApiCmd::FetchConfig,
                ],
            )
        }
        SessionAction::Save => match state.editor.begin_save() {
            Ok(config) => {
                let mut result = super::send_all(api, [ApiCmd::SaveConfig(Box::new(config))]);
                if result.status.is_empty() {
                    result.push_status(StatusLevel::Info, "Saving...");
                }
                result
            }
            Err(e) => DispatchResult::with_status(StatusLevel::Warn, format!("Cannot save: {}", e)),
        },
        SessionAction::Reload => {
            if !state.editor.is_ready() {
                return DispatchResult::with_status(StatusLevel::Warn, "Nothing to reload yet");
            }
            let mut result = super::send_all(api, [ApiCmd::FetchConfig]);
            if result.status.is_empty() {
                result.push_status(StatusLevel::Info, "Reloading...");
            }
            result
        }
    }
}
