use crate::editor::ConfigEditor;
use crate::live::{LivePoller, LiveView};
use crate::settings::Settings;

/// Read-only pipeline status. Kept apart from the editor so a poll result
/// can never touch a form the user is editing.
pub struct LiveState {
    pub poller: LivePoller,
    pub view: LiveView,
}

pub struct AppState {
    pub settings: Settings,
    pub editor: ConfigEditor,
    pub live: LiveState,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let poller = LivePoller::from_settings(&settings);
        Self {
            settings,
            editor: ConfigEditor::new(),
            live: LiveState { poller, view: LiveView::default() },
        }
    }
}
