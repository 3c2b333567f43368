pub mod backend;
pub mod frame;
pub mod input;
pub mod keybindings;
pub mod keymap;
pub mod layer;
pub mod layout_helpers;
pub mod rat_compat;
pub mod style;
pub mod theme;
pub mod widgets;

use std::any::Any;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

pub use backend::RatatuiBackend;
pub use frame::Frame;
pub use input::{AppEvent, InputEvent, KeyCode};
#[cfg(test)]
pub use input::Modifiers;
#[cfg(test)]
pub use keymap::KeyPattern;
pub use keymap::{KeyBinding, Keymap};
pub use layer::{LayerResult, LayerStack};
pub use lumen_core::action::{
    Action, DispatchResult, EditAction, LiveAction, NavAction, NavIntent, SessionAction, StatusEvent,
    StatusLevel,
};
pub use style::{Color, Style};

use crate::state::AppState;

/// A full-screen view. Panes translate resolved key actions into `Action`s
/// and never mutate `AppState` themselves.
pub trait Pane {
    fn id(&self) -> &'static str;

    fn handle_action(&mut self, action: &str, event: &InputEvent, state: &AppState) -> Action;

    /// Keys no layer resolved (or an opaque layer swallowed)
    fn handle_raw_input(&mut self, _event: &InputEvent, _state: &AppState) -> Action {
        Action::None
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, state: &AppState);

    fn keymap(&self) -> &Keymap;

    /// True while the pane owns a line editor
    fn is_editing(&self) -> bool {
        false
    }

    /// Pushed panes are drawn over whatever was active before them
    fn is_overlay(&self) -> bool {
        false
    }

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

pub struct PaneManager {
    panes: Vec<Box<dyn Pane>>,
    active: usize,
    /// Panes underneath pushed overlays, bottom first
    stack: Vec<usize>,
}

impl PaneManager {
    pub fn new(first: Box<dyn Pane>) -> Self {
        Self { panes: vec![first], active: 0, stack: Vec::new() }
    }

    pub fn add_pane(&mut self, pane: Box<dyn Pane>) {
        self.panes.push(pane);
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.panes.iter().position(|p| p.id() == id)
    }

    pub fn active(&self) -> &dyn Pane {
        self.panes[self.active].as_ref()
    }

    pub fn active_mut(&mut self) -> &mut dyn Pane {
        self.panes[self.active].as_mut()
    }

    /// Replace the active pane, dropping any overlays.
    pub fn switch_to(&mut self, id: &str) {
        if let Some(idx) = self.index_of(id) {
            self.stack.clear();
            self.active = idx;
        }
    }

    pub fn push_to(&mut self, id: &str) {
        if let Some(idx) = self.index_of(id) {
            if idx != self.active {
                self.stack.push(self.active);
                self.active = idx;
            }
        }
    }

    pub fn pop(&mut self) {
        if let Some(prev) = self.stack.pop() {
            self.active = prev;
        }
    }

    pub fn get_pane_mut<T: 'static>(&mut self, id: &str) -> Option<&mut T> {
        let idx = self.index_of(id)?;
        self.panes[idx].as_any_mut().downcast_mut::<T>()
    }

    pub fn process_nav(&mut self, action: &Action) {
        if let Action::Nav(nav) = action {
            match nav {
                NavAction::SwitchPane(id) => self.switch_to(id),
                NavAction::PushPane(id) => self.push_to(id),
                NavAction::PopPane => self.pop(),
            }
        }
    }

    pub fn process_nav_intents(&mut self, intents: &[NavIntent]) {
        for intent in intents {
            match intent {
                NavIntent::SwitchTo(id) => self.switch_to(id),
                NavIntent::PushTo(id) => self.push_to(id),
                NavIntent::Pop => self.pop(),
            }
        }
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer, state: &AppState) {
        if self.panes[self.active].is_overlay() {
            if let Some(&below) = self.stack.last() {
                self.panes[below].render(area, buf, state);
            }
        }
        self.panes[self.active].render(area, buf, state);
    }
}
