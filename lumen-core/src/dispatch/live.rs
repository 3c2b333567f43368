use crate::action::{DispatchResult, LiveAction, StatusLevel};
use crate::api::{ApiCmd, ApiHandle};
use crate::state::AppState;

pub(super) fn dispatch_live(action: &LiveAction, state: &mut AppState, api: &mut ApiHandle) -> DispatchResult {
    match action {
        LiveAction::AdjustTempo(direction) => match state.live.poller.tempo_target(*direction) {
            Some(bpm) => super::send_all(api, [ApiCmd::SetTempo(bpm)]),
            None => DispatchResult::with_status(StatusLevel::Warn, "Tempo not known yet"),
        },
        LiveAction::Trigger(event) => {
            let mut result = super::send_all(api, [ApiCmd::Trigger(event.clone())]);
            if result.status.is_empty() {
                result.push_status(StatusLevel::Info, format!("Triggering {}...", event));
            }
            result
        }
        LiveAction::Refresh => refresh_all(api),
    }
}

/// Fetch all three live resources. Each result renders on its own.
pub(super) fn refresh_all(api: &ApiHandle) -> DispatchResult {
    super::send_all(api, [ApiCmd::FetchTempo, ApiCmd::FetchChains, ApiCmd::FetchEvents])
}
