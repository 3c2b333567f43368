use crate::form::{FieldTarget, Owner};

/// Navigation actions (handled by PaneManager, not dispatch)
#[derive(Debug, Clone, PartialEq)]
pub enum NavAction {
    SwitchPane(&'static str),
    PushPane(&'static str),
    PopPane,
}

/// Config editor actions
#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    CommitText { target: FieldTarget, text: String },
    Toggle(FieldTarget),
    Step { target: FieldTarget, direction: i8 },
    CycleType { owner: Owner, direction: i8 },
    AddChain,
    RemoveChain(String),
    AddEffect(String),
    RemoveEffect { chain: String, effect: String },
    AddEvent,
    RemoveEvent(String),
    AddAction(String),
    RemoveAction { event: String, index: usize },
}

/// Live view actions
#[derive(Debug, Clone, PartialEq)]
pub enum LiveAction {
    /// Step the tempo up (+1) or down (-1)
    AdjustTempo(i8),
    Trigger(String),
    Refresh,
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Fetch both registries and the config
    Load,
    Save,
    /// Discard the current session and fetch the config again
    Reload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    None,
    Quit,
    Nav(NavAction),
    Edit(EditAction),
    Live(LiveAction),
    Session(SessionAction),
    /// Push a named layer onto the layer stack
    PushLayer(&'static str),
    /// Pop a named layer from the layer stack
    PopLayer(&'static str),
}

/// Navigation side effect returned from dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavIntent {
    SwitchTo(&'static str),
    PushTo(&'static str),
    Pop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

/// Message for the status line
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEvent {
    pub level: StatusLevel,
    pub message: String,
}

/// Side effects of a dispatched action, for the UI layer to apply
#[derive(Debug, Clone, Default)]
pub struct DispatchResult {
    pub quit: bool,
    pub nav: Vec<NavIntent>,
    pub status: Vec<StatusEvent>,
}

impl DispatchResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_quit() -> Self {
        Self { quit: true, ..Self::default() }
    }

    pub fn with_nav(intent: NavIntent) -> Self {
        Self { nav: vec![intent], ..Self::default() }
    }

    pub fn with_status(level: StatusLevel, message: impl Into<String>) -> Self {
        Self {
            status: vec![StatusEvent { level, message: message.into() }],
            ..Self::default()
        }
    }

    pub fn push_nav(&mut self, intent: NavIntent) {
        self.nav.push(intent);
    }

    pub fn push_status(&mut self, level: StatusLevel, message: impl Into<String>) {
        self.status.push(StatusEvent { level, message: message.into() });
    }

    pub fn merge(&mut self, other: DispatchResult) {
        self.quit = self.quit || other.quit;
        self.nav.extend(other.nav);
        self.status.extend(other.status);
    }
}
