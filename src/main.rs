// Re-export core crate modules so crate::state, crate::api, etc. resolve throughout the binary
pub use lumen_core::api;
pub use lumen_core::dispatch;
pub use lumen_core::settings;
pub use lumen_core::state;

mod global_actions;
mod panes;
mod setup;
mod ui;

use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use api::ApiHandle;
use global_actions::{
    apply_dispatch_result, apply_status_events, handle_global_action, sync_pane_layer, GlobalCtx, GlobalResult,
};
use panes::{ChainsPane, ConfirmPane, EventsPane, HelpPane, LivePane};
use settings::Settings;
use state::AppState;
use ui::{
    keybindings, Action, AppEvent, Frame, Keymap, LayerResult, LayerStack, PaneManager, RatatuiBackend,
    SessionAction,
};

/// Redraw at most this often
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

fn main() -> io::Result<()> {
    let (settings, settings_problem) = setup::load_settings();
    setup::init_logging(&settings);
    if let Some(problem) = &settings_problem {
        log::warn!("{}", problem.message);
    }
    // Fail before touching the terminal so the reason stays readable.
    let api = ApiHandle::new(&settings).map_err(io::Error::other)?;

    let mut backend = RatatuiBackend::new()?;
    backend.start()?;

    let result = run(&mut backend, settings, api, settings_problem);

    backend.stop()?;
    result
}

fn pane_keymap(keymaps: &mut HashMap<String, Keymap>, id: &str) -> Keymap {
    keymaps.remove(id).unwrap_or_else(Keymap::new)
}

fn run(
    backend: &mut RatatuiBackend,
    settings: Settings,
    mut api: ApiHandle,
    startup_status: Option<ui::StatusEvent>,
) -> io::Result<()> {
    let mut state = AppState::new(settings);

    // Load keybindings from embedded TOML (with optional user override)
    let (layers, mut keymaps) = keybindings::load_keybindings();
    let global_keymap = layers
        .iter()
        .find(|l| l.name == "global")
        .map(|l| l.keymap.clone())
        .unwrap_or_default();

    let mut panes = PaneManager::new(Box::new(ChainsPane::new(pane_keymap(&mut keymaps, "chains"))));
    panes.add_pane(Box::new(EventsPane::new(pane_keymap(&mut keymaps, "events"))));
    panes.add_pane(Box::new(LivePane::new(pane_keymap(&mut keymaps, "live"))));
    panes.add_pane(Box::new(ConfirmPane::new(pane_keymap(&mut keymaps, "confirm"))));
    panes.add_pane(Box::new(HelpPane::new(pane_keymap(&mut keymaps, "help"))));

    let mut layer_stack = LayerStack::new(layers);
    layer_stack.push("global");
    layer_stack.set_pane_layer(panes.active().id());

    let mut app_frame = Frame::new();
    if let Some(event) = startup_status {
        apply_status_events(&[event], &mut app_frame);
    }

    // Registries and config load in the background; the editor shows its
    // loading state until all three arrive.
    let r = dispatch::dispatch_action(&Action::Session(SessionAction::Load), &mut state, &mut api);
    apply_dispatch_result(r, &mut panes, &mut layer_stack, &mut app_frame);

    let mut last_render_time: Option<Instant> = None;

    loop {
        if let Some(app_event) = backend.poll_event(Duration::from_millis(2)) {
            let pane_action = match app_event {
                AppEvent::Resize => Action::None,
                AppEvent::Key(event) => match layer_stack.resolve(&event) {
                    LayerResult::Action(action) => {
                        let mut ctx = GlobalCtx {
                            panes: &mut panes,
                            api: &mut api,
                            app_frame: &mut app_frame,
                            layer_stack: &mut layer_stack,
                            global_keymap: &global_keymap,
                        };
                        match handle_global_action(action, &mut state, &mut ctx) {
                            GlobalResult::Quit => break,
                            GlobalResult::Handled => continue,
                            GlobalResult::NotHandled => panes.active_mut().handle_action(action, &event, &state),
                        }
                    }
                    LayerResult::Blocked | LayerResult::Unresolved => {
                        panes.active_mut().handle_raw_input(&event, &state)
                    }
                },
            };

            // Process layer management actions
            match &pane_action {
                Action::PushLayer(name) => layer_stack.push(name),
                Action::PopLayer(name) => layer_stack.pop(name),
                _ => {}
            }

            // Auto-pop text_edit layer when pane is no longer editing
            if layer_stack.has_layer("text_edit") && !panes.active().is_editing() {
                layer_stack.pop("text_edit");
            }

            // A confirmed dialog closes itself before its action runs
            if panes.active().id() == "confirm" && matches!(pane_action, Action::Quit | Action::Session(_)) {
                panes.pop();
                sync_pane_layer(&panes, &mut layer_stack);
            }

            if matches!(&pane_action, Action::Nav(_)) {
                panes.process_nav(&pane_action);
                sync_pane_layer(&panes, &mut layer_stack);
            }

            let dispatch_result = dispatch::dispatch_action(&pane_action, &mut state, &mut api);
            if dispatch_result.quit {
                break;
            }
            apply_dispatch_result(dispatch_result, &mut panes, &mut layer_stack, &mut app_frame);
        }

        let tick = dispatch::tick(&mut state, &api, Instant::now());
        apply_dispatch_result(tick, &mut panes, &mut layer_stack, &mut app_frame);

        // Drain request results
        for feedback in api.drain_feedback() {
            let r = dispatch::dispatch_feedback(feedback, &mut state, &api);
            apply_dispatch_result(r, &mut panes, &mut layer_stack, &mut app_frame);
        }

        // Render at ~60fps
        let now = Instant::now();
        if last_render_time.map_or(true, |t| now.duration_since(t) >= FRAME_INTERVAL) {
            last_render_time = Some(now);
            let active_id = panes.active().id();
            backend.draw(|area, buf| {
                app_frame.render_buf(area, buf, &state, active_id);
                panes.render(Frame::content_area(area), buf, &state);
            })?;
        }
    }

    Ok(())
}
