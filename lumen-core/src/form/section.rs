//! Sections for chains, events and the polymorphic entities inside them.
//!
//! An effect, output or action renders as fixed fields, a type selector and
//! a parameter block generated from the selected type's schema. Only the
//! parameter block depends on the type, so a type change swaps that block
//! and nothing else.

use serde_json::Value;

use super::field::{self, FieldWidget};
use crate::model::{ArgMap, Chain, ChainUpdate, Effect, EffectUpdate, EventAction, Output, OutputUpdate};
use crate::schema::{DataType, ParameterSchema, Registry, SchemaKind, SchemaSet};

/// The polymorphic entity a parameter block belongs to. Action indices are
/// positional and only valid for the render pass that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    Effect { chain: String, effect: String },
    Output { chain: String },
    Action { event: String, index: usize },
}

impl Owner {
    pub fn kind(&self) -> SchemaKind {
        match self {
            Owner::Effect { .. } => SchemaKind::Effect,
            Owner::Output { .. } => SchemaKind::Output,
            Owner::Action { .. } => SchemaKind::Action,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainField {
    Id,
    Priority,
    TickRate,
    NumLamps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectField {
    Id,
    Enabled,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputField {
    ChannelMapping,
    NumChannelsPerLamp,
}

/// Render key of a field and the model location an edit writes to.
/// Parameter keys include the type so nothing survives a type change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldTarget {
    Chain { chain: String, field: ChainField },
    Effect { chain: String, effect: String, field: EffectField },
    Output { chain: String, field: OutputField },
    Param { owner: Owner, type_key: String, name: String },
}

impl FieldTarget {
    pub fn describe(&self) -> String {
        match self {
            FieldTarget::Chain { chain, field } => format!("{}.{:?}", chain, field),
            FieldTarget::Effect { chain, effect, field } => format!("{}.{}.{:?}", chain, effect, field),
            FieldTarget::Output { chain, field } => format!("{}.output.{:?}", chain, field),
            FieldTarget::Param { owner, name, .. } => match owner {
                Owner::Effect { chain, effect } => format!("{}.{}.{}", chain, effect, name),
                Owner::Output { chain } => format!("{}.output.{}", chain, name),
                Owner::Action { event, index } => format!("{}[{}].{}", event, index, name),
            },
        }
    }

    /// The polymorphic section a parameter field lives in.
    pub fn owner(&self) -> Option<&Owner> {
        match self {
            FieldTarget::Param { owner, .. } => Some(owner),
            _ => None,
        }
    }
}

/// Integers arrive as JSON numbers; fractional input truncates.
fn as_int(value: &Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.trunc() as i64))
        .unwrap_or(0)
}

fn as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl ChainField {
    pub const ALL: [ChainField; 4] = [ChainField::Id, ChainField::Priority, ChainField::TickRate, ChainField::NumLamps];

    fn schema(&self) -> ParameterSchema {
        match self {
            ChainField::Id => ParameterSchema::new("ID", DataType::String).with_display_name("ID"),
            ChainField::Priority => ParameterSchema::new("Priority", DataType::Integer).with_display_name("Priority"),
            ChainField::TickRate => ParameterSchema::new("TickRate", DataType::Integer)
                .with_display_name("Tick rate")
                .with_bounds(Some(1.0), None),
            ChainField::NumLamps => ParameterSchema::new("NumLamps", DataType::Integer)
                .with_display_name("Lamps")
                .with_bounds(Some(0.0), None),
        }
    }

    fn value_of(&self, chain: &Chain) -> Value {
        match self {
            ChainField::Id => Value::String(chain.id.clone()),
            ChainField::Priority => Value::from(chain.priority),
            ChainField::TickRate => Value::from(chain.tick_rate),
            ChainField::NumLamps => Value::from(chain.num_lamps),
        }
    }

    pub fn update(&self, value: &Value) -> ChainUpdate {
        match self {
            ChainField::Id => ChainUpdate::Id(as_string(value)),
            ChainField::Priority => ChainUpdate::Priority(as_int(value)),
            ChainField::TickRate => ChainUpdate::TickRate(as_int(value)),
            ChainField::NumLamps => ChainUpdate::NumLamps(as_int(value)),
        }
    }
}

impl EffectField {
    pub const ALL: [EffectField; 3] = [EffectField::Id, EffectField::Enabled, EffectField::Group];

    fn schema(&self) -> ParameterSchema {
        match self {
            EffectField::Id => ParameterSchema::new("ID", DataType::String).with_display_name("ID"),
            EffectField::Enabled => ParameterSchema::new("Enabled", DataType::Boolean).with_display_name("Enabled"),
            EffectField::Group => ParameterSchema::new("Group", DataType::String).with_display_name("Group"),
        }
    }

    fn value_of(&self, effect: &Effect) -> Value {
        match self {
            EffectField::Id => Value::String(effect.id.clone()),
            EffectField::Enabled => Value::Bool(effect.enabled),
            EffectField::Group => Value::String(effect.group.clone()),
        }
    }

    pub fn update(&self, value: &Value) -> EffectUpdate {
        match self {
            EffectField::Id => EffectUpdate::Id(as_string(value)),
            EffectField::Enabled => EffectUpdate::Enabled(value.as_bool().unwrap_or(true)),
            EffectField::Group => EffectUpdate::Group(as_string(value)),
        }
    }
}

impl OutputField {
    pub const ALL: [OutputField; 2] = [OutputField::ChannelMapping, OutputField::NumChannelsPerLamp];

    fn schema(&self) -> ParameterSchema {
        match self {
            OutputField::ChannelMapping => {
                ParameterSchema::new("ChannelMapping", DataType::String).with_display_name("Channel mapping")
            }
            OutputField::NumChannelsPerLamp => ParameterSchema::new("NumChannelsPerLamp", DataType::Integer)
                .with_display_name("Channels/lamp")
                .with_bounds(Some(1.0), Some(512.0)),
        }
    }

    fn value_of(&self, output: &Output) -> Value {
        match self {
            OutputField::ChannelMapping => Value::String(output.channel_mapping.clone()),
            OutputField::NumChannelsPerLamp => Value::from(output.num_channels_per_lamp),
        }
    }

    pub fn update(&self, value: &Value) -> OutputUpdate {
        match self {
            OutputField::ChannelMapping => OutputUpdate::ChannelMapping(as_string(value)),
            OutputField::NumChannelsPerLamp => OutputUpdate::NumChannelsPerLamp(as_int(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlot {
    pub target: FieldTarget,
    pub widget: FieldWidget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeOption {
    pub key: String,
    pub label: String,
}

/// Options come from the registry in its order. A current type the
/// registry doesn't know is kept as an extra option so it stays visible.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSelector {
    pub options: Vec<TypeOption>,
    pub selected: usize,
}

impl TypeSelector {
    fn new(registry: &Registry, current: &str) -> Self {
        let mut options: Vec<TypeOption> = registry
            .iter()
            .map(|t| TypeOption { key: t.type_key.clone(), label: t.label().to_string() })
            .collect();
        let selected = match options.iter().position(|o| o.key == current) {
            Some(i) => i,
            None => {
                options.push(TypeOption {
                    key: current.to_string(),
                    label: format!("{} (unknown)", current),
                });
                options.len() - 1
            }
        };
        Self { options, selected }
    }

    pub fn current(&self) -> &str {
        self.options.get(self.selected).map_or("", |o| o.key.as_str())
    }

    pub fn current_label(&self) -> &str {
        self.options.get(self.selected).map_or("", |o| o.label.as_str())
    }

    /// Key `direction` steps away from the current one, wrapping.
    pub fn neighbour(&self, direction: i8) -> Option<&str> {
        if self.options.is_empty() {
            return None;
        }
        let len = self.options.len() as isize;
        let next = (self.selected as isize + direction as isize).rem_euclid(len) as usize;
        Some(self.options[next].key.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamBlock {
    pub type_key: String,
    /// False when the type isn't in the registry; the block is then empty
    pub known: bool,
    pub fields: Vec<FieldSlot>,
}

fn render_param_block(owner: &Owner, type_key: &str, registry: &Registry, values: &ArgMap) -> ParamBlock {
    let Some(schema) = registry.get(type_key) else {
        return ParamBlock { type_key: type_key.to_string(), known: false, fields: Vec::new() };
    };
    let fields = schema
        .parameters
        .iter()
        .map(|param| FieldSlot {
            target: FieldTarget::Param {
                owner: owner.clone(),
                type_key: type_key.to_string(),
                name: param.name.clone(),
            },
            widget: field::render(param, values.get(&param.name)),
        })
        .collect();
    ParamBlock { type_key: type_key.to_string(), known: true, fields }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionPhase {
    #[default]
    Stable,
    Retyping,
}

/// One effect, output or action.
#[derive(Debug, Clone, PartialEq)]
pub struct PolySection {
    pub owner: Owner,
    pub title: String,
    pub fixed: Vec<FieldSlot>,
    pub selector: TypeSelector,
    pub params: ParamBlock,
    phase: SectionPhase,
}

impl PolySection {
    fn new(owner: Owner, title: String, fixed: Vec<FieldSlot>, registry: &Registry, type_key: &str, values: &ArgMap) -> Self {
        let params = render_param_block(&owner, type_key, registry, values);
        Self {
            selector: TypeSelector::new(registry, type_key),
            owner,
            title,
            fixed,
            params,
            phase: SectionPhase::Stable,
        }
    }

    pub fn phase(&self) -> SectionPhase {
        self.phase
    }

    /// Rebuild after the model's type has been switched and its values
    /// cleared. The old parameter block is dropped before the new one is
    /// built, so no widget carries over.
    pub fn retype(&mut self, type_key: &str, registry: &Registry) {
        self.phase = SectionPhase::Retyping;
        self.params.fields.clear();
        self.params = render_param_block(&self.owner, type_key, registry, &ArgMap::new());
        self.selector = TypeSelector::new(registry, type_key);
        self.phase = SectionPhase::Stable;
    }

    pub fn slots(&self) -> impl Iterator<Item = &FieldSlot> {
        self.fixed.iter().chain(self.params.fields.iter())
    }

    pub fn slots_mut(&mut self) -> impl Iterator<Item = &mut FieldSlot> {
        self.fixed.iter_mut().chain(self.params.fields.iter_mut())
    }
}

pub fn render_effect(chain_id: &str, effect: &Effect, registry: &Registry) -> PolySection {
    let fixed = EffectField::ALL
        .iter()
        .map(|f| FieldSlot {
            target: FieldTarget::Effect {
                chain: chain_id.to_string(),
                effect: effect.id.clone(),
                field: *f,
            },
            widget: field::render(&f.schema(), Some(&f.value_of(effect))),
        })
        .collect();
    PolySection::new(
        Owner::Effect { chain: chain_id.to_string(), effect: effect.id.clone() },
        format!("Effect {}", effect.id),
        fixed,
        registry,
        &effect.effect_type,
        &effect.args,
    )
}

pub fn render_output(chain_id: &str, output: &Output, registry: &Registry) -> PolySection {
    let fixed = OutputField::ALL
        .iter()
        .map(|f| FieldSlot {
            target: FieldTarget::Output { chain: chain_id.to_string(), field: *f },
            widget: field::render(&f.schema(), Some(&f.value_of(output))),
        })
        .collect();
    PolySection::new(
        Owner::Output { chain: chain_id.to_string() },
        "Output".to_string(),
        fixed,
        registry,
        &output.output_type,
        &output.args,
    )
}

pub fn render_action(event: &str, index: usize, action: &EventAction, registry: &Registry) -> PolySection {
    let mut title = format!("Action {}", index + 1);
    if let Some(chain) = action.chain_id() {
        title.push_str(&format!(" -> {}", chain));
        if let Some(effect) = action.effect_id() {
            title.push_str(&format!("/{}", effect));
        }
    }
    PolySection::new(
        Owner::Action { event: event.to_string(), index },
        title,
        Vec::new(),
        registry,
        &action.action_type,
        &action.params,
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainSection {
    pub id: String,
    pub fields: Vec<FieldSlot>,
    pub output: PolySection,
    pub effects: Vec<PolySection>,
}

pub fn render_chain(chain: &Chain, schemas: &SchemaSet) -> ChainSection {
    let fields = ChainField::ALL
        .iter()
        .map(|f| FieldSlot {
            target: FieldTarget::Chain { chain: chain.id.clone(), field: *f },
            widget: field::render(&f.schema(), Some(&f.value_of(chain))),
        })
        .collect();
    ChainSection {
        id: chain.id.clone(),
        fields,
        output: render_output(&chain.id, &chain.output, &schemas.outputs),
        effects: chain
            .effects
            .iter()
            .map(|e| render_effect(&chain.id, e, &schemas.effects))
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventSection {
    pub name: String,
    pub actions: Vec<PolySection>,
}

pub fn render_event(name: &str, actions: &[EventAction], registry: &Registry) -> EventSection {
    EventSection {
        name: name.to_string(),
        actions: actions
            .iter()
            .enumerate()
            .map(|(i, a)| render_action(name, i, a, registry))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeSchema;
    use serde_json::json;

    fn effects() -> Registry {
        Registry::from_effect_json(
            r##"{
                "solid_color": {"args": {"color": {"type": "string", "default": "#ffffff"}}},
                "strobe": {"args": {"rate": {"type": "number", "default": 4, "min": 0, "max": 30}, "hard": {"type": "bool"}}}
            }"##,
        )
        .unwrap()
    }

    fn strobe_effect() -> Effect {
        let mut effect = Effect::new("e1", "strobe");
        effect.args.insert("rate".into(), json!(12));
        effect
    }

    #[test]
    fn effect_section_layout() {
        let section = render_effect("c1", &strobe_effect(), &effects());

        let fixed: Vec<&str> = section.fixed.iter().map(|s| s.widget.label()).collect();
        assert_eq!(fixed, vec!["ID", "Enabled", "Group"]);
        assert_eq!(section.selector.current(), "strobe");
        assert_eq!(section.selector.options.len(), 2);

        let params: Vec<(&str, Value)> = section
            .params
            .fields
            .iter()
            .map(|s| (s.widget.name(), s.widget.extract().unwrap()))
            .collect();
        assert_eq!(params, vec![("rate", json!(12)), ("hard", json!(false))]);
        assert_eq!(section.phase(), SectionPhase::Stable);
    }

    #[test]
    fn retype_rebuilds_only_the_parameter_block() {
        let registry = effects();
        let mut section = render_effect("c1", &strobe_effect(), &registry);
        let fixed_before = section.fixed.clone();

        section.retype("solid_color", &registry);

        assert_eq!(section.fixed, fixed_before);
        assert_eq!(section.selector.current(), "solid_color");
        assert_eq!(section.params.type_key, "solid_color");
        assert_eq!(section.params.fields.len(), 1);
        let color = &section.params.fields[0];
        assert_eq!(color.widget.extract(), Ok(json!("#ffffff")));
        assert!(matches!(
            &color.target,
            FieldTarget::Param { type_key, name, .. } if type_key == "solid_color" && name == "color"
        ));
        assert_eq!(section.phase(), SectionPhase::Stable);
    }

    #[test]
    fn retype_back_does_not_resurrect_old_values() {
        let registry = effects();
        let mut section = render_effect("c1", &strobe_effect(), &registry);
        section.retype("solid_color", &registry);
        section.retype("strobe", &registry);
        assert_eq!(section.params.fields[0].widget.extract(), Ok(json!(4)));
    }

    #[test]
    fn unknown_type_is_kept_visible() {
        let section = render_effect("c1", &Effect::new("e9", "plasma"), &effects());
        assert_eq!(section.selector.current(), "plasma");
        assert_eq!(section.selector.current_label(), "plasma (unknown)");
        assert!(!section.params.known);
        assert!(section.params.fields.is_empty());
    }

    #[test]
    fn selector_wraps_in_both_directions() {
        let section = render_effect("c1", &strobe_effect(), &effects());
        assert_eq!(section.selector.neighbour(1), Some("solid_color"));
        assert_eq!(section.selector.neighbour(-1), Some("solid_color"));
        assert_eq!(section.selector.neighbour(0), Some("strobe"));
    }

    #[test]
    fn action_sections_are_keyed_by_index() {
        let mut registry = Registry::new();
        registry.insert(TypeSchema {
            type_key: "set_global".into(),
            human_readable_name: Some("Set Global".into()),
            parameters: vec![
                ParameterSchema::new("name", DataType::String).with_default(json!("bpm")),
                ParameterSchema::new("value", DataType::Float),
            ],
        });
        let mut second = EventAction::new("set_global");
        second.params.insert("value".into(), json!(140));
        second.extra.insert("chain_id".into(), json!("c1"));

        let event = render_event("drop", &[EventAction::new("set_global"), second], &registry);
        assert_eq!(event.actions.len(), 2);
        assert_eq!(event.actions[1].owner, Owner::Action { event: "drop".into(), index: 1 });
        assert_eq!(event.actions[1].title, "Action 2 -> c1");
        assert_eq!(event.actions[1].selector.current_label(), "Set Global");
        assert_eq!(event.actions[0].params.fields[0].widget.extract(), Ok(json!("bpm")));
        assert_eq!(event.actions[1].params.fields[1].widget.extract(), Ok(json!(140)));
        assert!(event.actions[0].fixed.is_empty());
    }

    #[test]
    fn chain_section_contains_output_and_effects() {
        let mut chain = Chain::new("c1");
        chain.effects.push(strobe_effect());
        let schemas = SchemaSet::new(effects(), Registry::new());

        let section = render_chain(&chain, &schemas);
        let labels: Vec<&str> = section.fields.iter().map(|s| s.widget.label()).collect();
        assert_eq!(labels, vec!["ID", "Priority", "Tick rate", "Lamps"]);
        assert_eq!(section.fields[2].widget.extract(), Ok(json!(100)));
        assert_eq!(section.output.selector.current(), "artnet");
        assert_eq!(section.output.params.fields[0].widget.extract(), Ok(json!("127.0.0.1")));
        assert_eq!(section.effects.len(), 1);
    }

    #[test]
    fn fixed_field_updates_coerce_values() {
        assert_eq!(ChainField::TickRate.update(&json!(42.9)), ChainUpdate::TickRate(42));
        assert_eq!(ChainField::Id.update(&json!("front")), ChainUpdate::Id("front".into()));
        assert_eq!(EffectField::Enabled.update(&json!(false)), EffectUpdate::Enabled(false));
        assert_eq!(OutputField::NumChannelsPerLamp.update(&json!(4)), OutputUpdate::NumChannelsPerLamp(4));
    }
}
