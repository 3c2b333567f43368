use crate::api::ApiHandle;
use crate::dispatch;
use crate::panes::{ConfirmPane, HelpPane, PendingAction};
use crate::state::AppState;
use crate::ui::{Action, DispatchResult, Frame, Keymap, LayerStack, PaneManager, SessionAction, StatusEvent};

pub(crate) enum GlobalResult {
    Quit,
    Handled,
    NotHandled,
}

/// Everything a global key may touch besides the app state.
pub(crate) struct GlobalCtx<'a> {
    pub panes: &'a mut PaneManager,
    pub api: &'a mut ApiHandle,
    pub app_frame: &'a mut Frame,
    pub layer_stack: &'a mut LayerStack,
    pub global_keymap: &'a Keymap,
}

pub(crate) fn sync_pane_layer(panes: &PaneManager, layer_stack: &mut LayerStack) {
    layer_stack.set_pane_layer(panes.active().id());
}

fn switch_to_pane(target: &str, ctx: &mut GlobalCtx<'_>) {
    ctx.panes.switch_to(target);
    sync_pane_layer(ctx.panes, ctx.layer_stack);
}

fn ask_confirm(message: &str, pending: PendingAction, ctx: &mut GlobalCtx<'_>) {
    if let Some(confirm) = ctx.panes.get_pane_mut::<ConfirmPane>("confirm") {
        confirm.set_confirm(message, pending);
    }
    ctx.panes.push_to("confirm");
    sync_pane_layer(ctx.panes, ctx.layer_stack);
}

fn run_session(action: SessionAction, state: &mut AppState, ctx: &mut GlobalCtx<'_>) {
    let r = dispatch::dispatch_action(&Action::Session(action), state, ctx.api);
    apply_dispatch_result(r, ctx.panes, ctx.layer_stack, ctx.app_frame);
}

pub(crate) fn handle_global_action(action: &str, state: &mut AppState, ctx: &mut GlobalCtx<'_>) -> GlobalResult {
    match action {
        "quit" => {
            if state.editor.is_dirty() {
                ask_confirm("Discard unsaved changes and quit?", PendingAction::Quit, ctx);
            } else {
                return GlobalResult::Quit;
            }
        }
        "save" => run_session(SessionAction::Save, state, ctx),
        "reload" => {
            if state.editor.is_ready() && state.editor.is_dirty() {
                ask_confirm("Discard unsaved changes and reload?", PendingAction::Reload, ctx);
            } else {
                run_session(SessionAction::Reload, state, ctx);
            }
        }
        "switch:chains" => switch_to_pane("chains", ctx),
        "switch:events" => switch_to_pane("events", ctx),
        "switch:live" => switch_to_pane("live", ctx),
        "help" => {
            if ctx.panes.active().id() != "help" {
                let current_id = ctx.panes.active().id();
                let current_keymap = ctx.panes.active().keymap().clone();
                if let Some(help) = ctx.panes.get_pane_mut::<HelpPane>("help") {
                    help.set_context(current_id, &current_keymap, ctx.global_keymap);
                }
                ctx.panes.push_to("help");
                sync_pane_layer(ctx.panes, ctx.layer_stack);
            }
        }
        _ => return GlobalResult::NotHandled,
    }
    GlobalResult::Handled
}

/// Show status events on the status line, latest wins.
pub(crate) fn apply_status_events(events: &[StatusEvent], app_frame: &mut Frame) {
    for event in events {
        app_frame.set_status(event.clone());
    }
}

/// Apply a DispatchResult to the UI layer: process nav intents and status events
pub(crate) fn apply_dispatch_result(
    result: DispatchResult,
    panes: &mut PaneManager,
    layer_stack: &mut LayerStack,
    app_frame: &mut Frame,
) {
    if !result.nav.is_empty() {
        panes.process_nav_intents(&result.nav);
        sync_pane_layer(panes, layer_stack);
    }
    apply_status_events(&result.status, app_frame);
}
