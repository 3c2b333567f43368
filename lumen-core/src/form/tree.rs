use std::collections::HashMap;

use super::field::FieldWidget;
use super::section::{
    render_chain, render_event, ChainSection, EventSection, FieldSlot, FieldTarget, Owner, PolySection,
};
use crate::model::Config;
use crate::schema::SchemaSet;

/// Retained render tree for the whole config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormTree {
    pub chains: Vec<ChainSection>,
    pub events: Vec<EventSection>,
}

/// Full render of a config. Pure: the same inputs give the same tree.
pub fn render_config(config: &Config, schemas: &SchemaSet) -> FormTree {
    FormTree {
        chains: config.chains.iter().map(|c| render_chain(c, schemas)).collect(),
        events: config
            .events
            .iter()
            .map(|(name, actions)| render_event(name, actions, &schemas.actions))
            .collect(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub kept: usize,
    pub rebuilt: usize,
}

/// What a row belongs to, for add/remove commands issued from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Chain(String),
    Output { chain: String },
    Effect { chain: String, effect: String },
    Event(String),
    Action { event: String, index: usize },
}

impl Scope {
    pub fn chain_id(&self) -> Option<&str> {
        match self {
            Scope::Chain(chain) | Scope::Output { chain } | Scope::Effect { chain, .. } => Some(chain),
            _ => None,
        }
    }

    pub fn event(&self) -> Option<&str> {
        match self {
            Scope::Event(event) | Scope::Action { event, .. } => Some(event),
            _ => None,
        }
    }
}

impl From<&Owner> for Scope {
    fn from(owner: &Owner) -> Self {
        match owner {
            Owner::Effect { chain, effect } => Scope::Effect { chain: chain.clone(), effect: effect.clone() },
            Owner::Output { chain } => Scope::Output { chain: chain.clone() },
            Owner::Action { event, index } => Scope::Action { event: event.clone(), index: *index },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowKind<'a> {
    Header(String),
    Field(&'a FieldSlot),
    Selector(&'a PolySection),
    Empty(&'static str),
}

/// One line of a flattened tree, as the panes walk it.
#[derive(Debug, Clone, PartialEq)]
pub struct FormRow<'a> {
    pub depth: u8,
    pub scope: Scope,
    pub kind: RowKind<'a>,
}

impl<'a> FormRow<'a> {
    fn new(depth: u8, scope: Scope, kind: RowKind<'a>) -> Self {
        Self { depth, scope, kind }
    }

    pub fn slot(&self) -> Option<&'a FieldSlot> {
        match self.kind {
            RowKind::Field(slot) => Some(slot),
            _ => None,
        }
    }

    pub fn section(&self) -> Option<&'a PolySection> {
        match self.kind {
            RowKind::Selector(section) => Some(section),
            _ => None,
        }
    }
}

fn push_section<'a>(rows: &mut Vec<FormRow<'a>>, section: &'a PolySection, depth: u8) {
    let scope = Scope::from(&section.owner);
    rows.push(FormRow::new(depth, scope.clone(), RowKind::Header(section.title.clone())));
    for slot in &section.fixed {
        rows.push(FormRow::new(depth + 1, scope.clone(), RowKind::Field(slot)));
    }
    rows.push(FormRow::new(depth + 1, scope.clone(), RowKind::Selector(section)));
    if section.params.fields.is_empty() {
        let note = if section.params.known { "(no parameters)" } else { "(type not in schema)" };
        rows.push(FormRow::new(depth + 1, scope, RowKind::Empty(note)));
    } else {
        for slot in &section.params.fields {
            rows.push(FormRow::new(depth + 1, scope.clone(), RowKind::Field(slot)));
        }
    }
}

impl FormTree {
    pub fn slots(&self) -> Vec<&FieldSlot> {
        let mut out = Vec::new();
        for chain in &self.chains {
            out.extend(chain.fields.iter());
            out.extend(chain.output.slots());
            for effect in &chain.effects {
                out.extend(effect.slots());
            }
        }
        for event in &self.events {
            for action in &event.actions {
                out.extend(action.slots());
            }
        }
        out
    }

    fn slots_mut(&mut self) -> Vec<&mut FieldSlot> {
        let mut out = Vec::new();
        for chain in &mut self.chains {
            out.extend(chain.fields.iter_mut());
            out.extend(chain.output.slots_mut());
            for effect in &mut chain.effects {
                out.extend(effect.slots_mut());
            }
        }
        for event in &mut self.events {
            for action in &mut event.actions {
                out.extend(action.slots_mut());
            }
        }
        out
    }

    pub fn slot(&self, target: &FieldTarget) -> Option<&FieldSlot> {
        self.slots().into_iter().find(|s| &s.target == target)
    }

    pub fn slot_mut(&mut self, target: &FieldTarget) -> Option<&mut FieldSlot> {
        self.slots_mut().into_iter().find(|s| &s.target == target)
    }

    pub fn section(&self, owner: &Owner) -> Option<&PolySection> {
        match owner {
            Owner::Effect { chain, .. } => self
                .chains
                .iter()
                .find(|c| &c.id == chain)?
                .effects
                .iter()
                .find(|e| &e.owner == owner),
            Owner::Output { chain } => self.chains.iter().find(|c| &c.id == chain).map(|c| &c.output),
            Owner::Action { event, index } => self.events.iter().find(|e| &e.name == event)?.actions.get(*index),
        }
    }

    pub fn section_mut(&mut self, owner: &Owner) -> Option<&mut PolySection> {
        match owner {
            Owner::Effect { chain, .. } => self
                .chains
                .iter_mut()
                .find(|c| &c.id == chain)?
                .effects
                .iter_mut()
                .find(|e| &e.owner == owner),
            Owner::Output { chain } => self.chains.iter_mut().find(|c| &c.id == chain).map(|c| &mut c.output),
            Owner::Action { event, index } => self.events.iter_mut().find(|e| &e.name == event)?.actions.get_mut(*index),
        }
    }

    /// Adopt `fresh` as the new tree, carrying over widget state only where
    /// a field has the same key, the same schema and was rendered from the
    /// same value. Anything else takes the freshly rendered widget.
    pub fn reconcile(&mut self, fresh: FormTree) -> ReconcileStats {
        self.adopt(fresh, |_| true)
    }

    /// Like [`FormTree::reconcile`], after the actions of `event` were
    /// renumbered. Their positional keys now name other actions, so none
    /// of their widget state survives.
    pub fn reconcile_reindexed(&mut self, fresh: FormTree, event: &str) -> ReconcileStats {
        self.adopt(fresh, |target| !matches!(target.owner(), Some(Owner::Action { event: e, .. }) if e == event))
    }

    fn adopt(&mut self, mut fresh: FormTree, keep: impl Fn(&FieldTarget) -> bool) -> ReconcileStats {
        let old = std::mem::take(self);
        let mut retained: HashMap<FieldTarget, FieldWidget> = old
            .slots()
            .into_iter()
            .filter(|s| keep(&s.target))
            .map(|s| (s.target.clone(), s.widget.clone()))
            .collect();

        let mut stats = ReconcileStats::default();
        for slot in fresh.slots_mut() {
            match retained.remove(&slot.target) {
                Some(old) if old.source() == slot.widget.source() && old.schema == slot.widget.schema => {
                    slot.widget = old;
                    stats.kept += 1;
                }
                _ => stats.rebuilt += 1,
            }
        }
        *self = fresh;
        stats
    }

    /// Rows of the chain editor, in display order.
    pub fn chain_rows(&self) -> Vec<FormRow<'_>> {
        let mut rows = Vec::new();
        for chain in &self.chains {
            let scope = Scope::Chain(chain.id.clone());
            rows.push(FormRow::new(0, scope.clone(), RowKind::Header(format!("Chain {}", chain.id))));
            for slot in &chain.fields {
                rows.push(FormRow::new(1, scope.clone(), RowKind::Field(slot)));
            }
            push_section(&mut rows, &chain.output, 1);
            if chain.effects.is_empty() {
                rows.push(FormRow::new(1, scope, RowKind::Empty("(no effects)")));
            }
            for effect in &chain.effects {
                push_section(&mut rows, effect, 1);
            }
        }
        rows
    }

    /// Rows of the event editor, in display order.
    pub fn event_rows(&self) -> Vec<FormRow<'_>> {
        let mut rows = Vec::new();
        for event in &self.events {
            let scope = Scope::Event(event.name.clone());
            rows.push(FormRow::new(0, scope.clone(), RowKind::Header(format!("Event {}", event.name))));
            if event.actions.is_empty() {
                rows.push(FormRow::new(1, scope, RowKind::Empty("(no actions)")));
            }
            for action in &event.actions {
                push_section(&mut rows, action, 1);
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::section::ChainField;
    use crate::model::{Chain, Effect, EventAction};
    use crate::schema::Registry;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schemas() -> SchemaSet {
        SchemaSet::new(
            Registry::from_effect_json(r#"{"strobe": {"args": {"rate": {"type": "int"}}}, "solid": {"args": {}}}"#).unwrap(),
            Registry::from_action_json(
                r#"{"set_global": {"Parameters": [{"internal_name": "value", "data_type": "float64", "default_value": 1}]}}"#,
            )
            .unwrap(),
        )
    }

    fn config() -> Config {
        let mut config = Config::default();
        let mut chain = Chain::new("c1");
        chain.effects.push(Effect::new("e1", "strobe"));
        config.chains.push(chain);
        let mut actions = Vec::new();
        for n in 0..3 {
            let mut action = EventAction::new("set_global");
            action.params.insert("value".into(), json!(n));
            actions.push(action);
        }
        config.events.insert("drop".into(), actions);
        config
    }

    fn param_target(event: &str, index: usize) -> FieldTarget {
        FieldTarget::Param {
            owner: Owner::Action { event: event.into(), index },
            type_key: "set_global".into(),
            name: "value".into(),
        }
    }

    #[test]
    fn render_is_pure() {
        let (config, schemas) = (config(), schemas());
        assert_eq!(render_config(&config, &schemas), render_config(&config, &schemas));
    }

    #[test]
    fn chain_rows_follow_section_layout() {
        let tree = render_config(&config(), &schemas());
        let rows = tree.chain_rows();
        let shape: Vec<String> = rows
            .iter()
            .map(|r| match &r.kind {
                RowKind::Header(t) => format!("{}H {}", r.depth, t),
                RowKind::Field(s) => format!("{}F {}", r.depth, s.widget.label()),
                RowKind::Selector(s) => format!("{}T {}", r.depth, s.selector.current()),
                RowKind::Empty(n) => format!("{}E {}", r.depth, n),
            })
            .collect();
        assert_eq!(
            shape,
            vec![
                "0H Chain c1", "1F ID", "1F Priority", "1F Tick rate", "1F Lamps",
                "1H Output", "2F Channel mapping", "2F Channels/lamp", "2T artnet", "2F IP address",
                "1H Effect e1", "2F ID", "2F Enabled", "2F Group", "2T strobe", "2F rate",
            ]
        );
        assert_eq!(rows[15].scope, Scope::Effect { chain: "c1".into(), effect: "e1".into() });
        assert_eq!(rows[15].scope.chain_id(), Some("c1"));
    }

    #[test]
    fn event_rows_show_empty_lists() {
        let mut config = config();
        config.events.insert("quiet".into(), Vec::new());
        let tree = render_config(&config, &schemas());
        let rows = tree.event_rows();
        let last = rows.last().unwrap();
        assert_eq!(last.kind, RowKind::Empty("(no actions)"));
        assert_eq!(last.scope.event(), Some("quiet"));
    }

    #[test]
    fn reconcile_keeps_unchanged_drafts() {
        let schemas = schemas();
        let config = config();
        let mut tree = render_config(&config, &schemas);
        tree.slot_mut(&param_target("drop", 2)).unwrap().widget.set_text("oops");

        let stats = tree.reconcile(render_config(&config, &schemas));
        assert_eq!(stats.rebuilt, 0);
        assert_eq!(tree.slot(&param_target("drop", 2)).unwrap().widget.text(), "oops");
    }

    #[test]
    fn reconcile_drops_drafts_on_shifted_indices() {
        let schemas = schemas();
        let mut config = config();
        let mut tree = render_config(&config, &schemas);
        tree.slot_mut(&param_target("drop", 1)).unwrap().widget.set_text("draft");

        config.remove_action("drop", 0).unwrap();
        let stats = tree.reconcile(render_config(&config, &schemas));

        // old index 2 (value 2) moved to index 1; the draft on old index 1 must not stick
        let slot = tree.slot(&param_target("drop", 1)).unwrap();
        assert_eq!(slot.widget.extract(), Ok(json!(2)));
        assert!(tree.slot(&param_target("drop", 2)).is_none());
        assert!(stats.rebuilt >= 2);
    }

    #[test]
    fn reindexed_event_keeps_no_action_drafts() {
        let schemas = schemas();
        let mut config = config();
        for action in config.events.get_mut("drop").unwrap() {
            action.params.insert("value".into(), json!(5));
        }
        let mut tree = render_config(&config, &schemas);
        tree.slot_mut(&param_target("drop", 1)).unwrap().widget.set_text("oops");

        config.remove_action("drop", 0).unwrap();
        let stats = tree.reconcile_reindexed(render_config(&config, &schemas), "drop");

        for index in 0..2 {
            assert_eq!(tree.slot(&param_target("drop", index)).unwrap().widget.text(), "5");
        }
        assert_eq!(stats.rebuilt, 2);
        assert_eq!(stats.kept, tree.slots().len() - 2);
    }

    #[test]
    fn reconcile_replaces_changed_values() {
        let schemas = schemas();
        let mut config = config();
        let mut tree = render_config(&config, &schemas);
        config.chains[0].tick_rate = 7;

        let stats = tree.reconcile(render_config(&config, &schemas));
        let target = FieldTarget::Chain { chain: "c1".into(), field: ChainField::TickRate };
        assert_eq!(tree.slot(&target).unwrap().widget.extract(), Ok(json!(7)));
        assert_eq!(stats.rebuilt, 1);
    }

    #[test]
    fn sections_are_found_by_owner() {
        let mut tree = render_config(&config(), &schemas());
        let owner = Owner::Effect { chain: "c1".into(), effect: "e1".into() };
        assert_eq!(tree.section(&owner).unwrap().selector.current(), "strobe");
        let output = Owner::Output { chain: "c1".into() };
        assert_eq!(tree.section_mut(&output).unwrap().selector.current(), "artnet");
        assert!(tree.section(&Owner::Action { event: "drop".into(), index: 3 }).is_none());
    }
}
