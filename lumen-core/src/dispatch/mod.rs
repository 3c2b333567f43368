mod editor;
mod feedback;
mod live;
mod session;

use std::time::Instant;

use crate::action::{Action, DispatchResult, StatusLevel};
use crate::api::{ApiCmd, ApiHandle};
use crate::state::AppState;

pub use feedback::dispatch_feedback;

/// Dispatch an action. Returns a DispatchResult describing side effects for the UI layer.
pub fn dispatch_action(action: &Action, state: &mut AppState, api: &mut ApiHandle) -> DispatchResult {
    match action {
        Action::Quit => DispatchResult::with_quit(),
        Action::Nav(_) => DispatchResult::none(), // Handled by PaneManager
        Action::Edit(a) => editor::dispatch_edit(a, state),
        Action::Live(a) => live::dispatch_live(a, state, api),
        Action::Session(a) => session::dispatch_session(*a, state, api),
        Action::None => DispatchResult::none(),
        // Layer management is handled by the UI before dispatch
        Action::PushLayer(_) | Action::PopLayer(_) => DispatchResult::none(),
    }
}

/// Issue a live poll round when one is due.
pub fn tick(state: &mut AppState, api: &ApiHandle, now: Instant) -> DispatchResult {
    if state.live.poller.poll_due(now) {
        live::refresh_all(api)
    } else {
        DispatchResult::none()
    }
}

fn send_all(api: &ApiHandle, cmds: impl IntoIterator<Item = ApiCmd>) -> DispatchResult {
    for cmd in cmds {
        if let Err(e) = api.send_cmd(cmd) {
            return DispatchResult::with_status(StatusLevel::Error, e.to_string());
        }
    }
    DispatchResult::none()
}
