//! Layered key resolution.
//!
//! The stack is searched top-down: mode layers (text_edit), then the active
//! pane's layer, then global. A non-transparent layer stops the search.

use super::input::InputEvent;
use super::keymap::Keymap;

pub struct Layer {
    pub name: &'static str,
    pub keymap: Keymap,
    pub transparent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerResult {
    Action(&'static str),
    /// An opaque layer swallowed the key without a binding
    Blocked,
    Unresolved,
}

pub struct LayerStack {
    layers: Vec<Layer>,
    /// Names from bottom to top
    stack: Vec<&'static str>,
    pane_layer: Option<&'static str>,
}

impl LayerStack {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers, stack: Vec::new(), pane_layer: None }
    }

    fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn push(&mut self, name: &str) {
        if let Some(layer) = self.layer(name) {
            let name = layer.name;
            if !self.stack.contains(&name) {
                self.stack.push(name);
            }
        }
    }

    pub fn pop(&mut self, name: &str) {
        self.stack.retain(|n| *n != name);
    }

    pub fn has_layer(&self, name: &str) -> bool {
        self.stack.iter().any(|n| *n == name)
    }

    /// Swap the pane layer, which sits directly above global.
    pub fn set_pane_layer(&mut self, pane_id: &str) {
        if let Some(old) = self.pane_layer.take() {
            self.pop(old);
        }
        if let Some(layer) = self.layer(pane_id) {
            let name = layer.name;
            let at = self.stack.iter().position(|n| *n == "global").map_or(0, |i| i + 1);
            self.stack.insert(at.min(self.stack.len()), name);
            self.pane_layer = Some(name);
        }
    }

    pub fn resolve(&self, event: &InputEvent) -> LayerResult {
        for name in self.stack.iter().rev() {
            let Some(layer) = self.layer(name) else { continue };
            if let Some(action) = layer.keymap.lookup(event) {
                return LayerResult::Action(action);
            }
            if !layer.transparent {
                return LayerResult::Blocked;
            }
        }
        LayerResult::Unresolved
    }
}
