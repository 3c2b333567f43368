//! The editor's render tree.
//!
//! `render_config` is a pure function from a config and its registries to a
//! `FormTree`. The controller keeps one tree alive across edits and either
//! patches a single section (type changes, committed fields) or renders a
//! fresh tree and reconciles it into the retained one (structural edits).

pub mod field;
pub mod section;
mod tree;

pub use field::{render, FieldInput, FieldWidget};
pub use section::{
    render_action, render_chain, render_effect, render_event, render_output, ChainField,
    ChainSection, EffectField, EventSection, FieldSlot, FieldTarget, Owner, OutputField,
    ParamBlock, PolySection, SectionPhase, TypeOption, TypeSelector,
};
pub use tree::{render_config, FormRow, FormTree, ReconcileStats, RowKind, Scope};
