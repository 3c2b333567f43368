//! Cursor, scrolling and line editing over a flattened `FormTree`.
//!
//! The chains and events panes share this; they differ only in which rows
//! they list and what add/remove means for the row under the cursor.

mod input;
mod rendering;

use lumen_core::form::{FieldTarget, FormRow};

use crate::state::AppState;
use crate::ui::widgets::TextInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Chains,
    Events,
}

pub struct FormView {
    listing: Listing,
    selected: usize,
    scroll: usize,
    /// Rows that fit on screen at the last render
    page: usize,
    editing: Option<FieldTarget>,
    edit_input: TextInput,
}

impl FormView {
    pub fn new(listing: Listing) -> Self {
        Self {
            listing,
            selected: 0,
            scroll: 0,
            page: 10,
            editing: None,
            edit_input: TextInput::new(),
        }
    }

    pub fn rows<'a>(&self, state: &'a AppState) -> Vec<FormRow<'a>> {
        let form = state.editor.form();
        match self.listing {
            Listing::Chains => form.chain_rows(),
            Listing::Events => form.event_rows(),
        }
    }

    #[cfg(test)]
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// The row under the cursor, clamped to the current row count.
    pub fn selected_row<'a>(&self, rows: &'a [FormRow<'a>]) -> Option<&'a FormRow<'a>> {
        rows.get(self.selected.min(rows.len().saturating_sub(1)))
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    fn move_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let current = self.selected.min(len - 1) as isize;
        self.selected = (current + delta).clamp(0, len as isize - 1) as usize;
    }
}
