//! The config editor controller.
//!
//! Owns the one `Config` of a session together with its registries and the
//! retained `FormTree`. Network results are fed in through the `on_*`
//! methods; user edits arrive as calls addressed by `FieldTarget` or
//! `Owner`. Nothing else mutates the config.

use log::{debug, error, info, warn};
use serde_json::Value;

use crate::error::{ApiError, EditError, ModelError};
use crate::form::{self, render_config, FieldTarget, FormTree, Owner};
use crate::model::Config;
use crate::schema::{Registry, SchemaKind, SchemaSet};

#[derive(Debug, Clone, PartialEq)]
pub enum EditorPhase {
    Loading,
    Ready,
    /// Schema or config load failed; editing stays disabled for the session
    Failed(String),
}

/// What a load/reload completion did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Pending,
    Ready,
    Reloaded,
    Failed(String),
    /// Reload failed; the current session is untouched
    ReloadFailed(String),
    Ignored,
}

#[derive(Debug, Default)]
struct PendingLoad {
    effects: Option<Registry>,
    actions: Option<Registry>,
    config: Option<Config>,
}

pub struct ConfigEditor {
    phase: EditorPhase,
    pending: PendingLoad,
    schemas: Option<SchemaSet>,
    config: Config,
    form: FormTree,
    /// Bumped on every successful mutation
    generation: u64,
    saved_generation: u64,
    in_flight_save: Option<u64>,
}

impl Default for ConfigEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigEditor {
    pub fn new() -> Self {
        Self {
            phase: EditorPhase::Loading,
            pending: PendingLoad::default(),
            schemas: None,
            config: Config::default(),
            form: FormTree::default(),
            generation: 0,
            saved_generation: 0,
            in_flight_save: None,
        }
    }

    pub fn phase(&self) -> &EditorPhase {
        &self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == EditorPhase::Ready
    }

    /// Edits exist that the backend hasn't acknowledged.
    pub fn is_dirty(&self) -> bool {
        self.generation != self.saved_generation
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight_save.is_some()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn form(&self) -> &FormTree {
        &self.form
    }

    pub fn schemas(&self) -> Option<&SchemaSet> {
        self.schemas.as_ref()
    }

    // ── Loading ───────────────────────────────────────────────────

    pub fn on_schemas(&mut self, kind: SchemaKind, result: Result<Registry, ApiError>) -> LoadOutcome {
        if self.phase != EditorPhase::Loading {
            debug!("ignoring late {} schemas", kind);
            return LoadOutcome::Ignored;
        }
        match result {
            Ok(registry) => {
                info!("loaded {} {} schemas", registry.len(), kind);
                match kind {
                    SchemaKind::Effect => self.pending.effects = Some(registry),
                    SchemaKind::Action => self.pending.actions = Some(registry),
                    SchemaKind::Output => {}
                }
                self.try_finish_load()
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn on_config(&mut self, result: Result<Config, ApiError>) -> LoadOutcome {
        match (&self.phase, result) {
            (EditorPhase::Loading, Ok(config)) => {
                self.pending.config = Some(config);
                self.try_finish_load()
            }
            (EditorPhase::Loading, Err(e)) => self.fail(e),
            (EditorPhase::Ready, Ok(config)) => {
                self.replace_session(config);
                info!("reloaded config: {} chains, {} events", self.config.chains.len(), self.config.events.len());
                LoadOutcome::Reloaded
            }
            (EditorPhase::Ready, Err(e)) => {
                warn!("reload failed, keeping current session: {}", e);
                LoadOutcome::ReloadFailed(e.to_string())
            }
            (EditorPhase::Failed(_), _) => LoadOutcome::Ignored,
        }
    }

    fn fail(&mut self, e: ApiError) -> LoadOutcome {
        error!("session load failed: {}", e);
        let message = e.to_string();
        self.phase = EditorPhase::Failed(message.clone());
        self.pending = PendingLoad::default();
        LoadOutcome::Failed(message)
    }

    fn try_finish_load(&mut self) -> LoadOutcome {
        if self.pending.effects.is_none() || self.pending.actions.is_none() || self.pending.config.is_none() {
            return LoadOutcome::Pending;
        }
        let pending = std::mem::take(&mut self.pending);
        let (Some(effects), Some(actions), Some(config)) = (pending.effects, pending.actions, pending.config) else {
            return LoadOutcome::Pending;
        };
        self.schemas = Some(SchemaSet::new(effects, actions));
        self.replace_session(config);
        self.phase = EditorPhase::Ready;
        info!("editor ready: {} chains, {} events", self.config.chains.len(), self.config.events.len());
        LoadOutcome::Ready
    }

    /// Swap in a fetched config and a tree rendered from scratch. No widget
    /// state survives; unsaved edits are gone.
    fn replace_session(&mut self, config: Config) {
        self.config = config;
        self.form = match &self.schemas {
            Some(schemas) => render_config(&self.config, schemas),
            None => FormTree::default(),
        };
        self.generation = 0;
        self.saved_generation = 0;
        self.in_flight_save = None;
    }

    // ── Save ──────────────────────────────────────────────────────

    /// Snapshot the config for a save request.
    pub fn begin_save(&mut self) -> Result<Config, EditError> {
        self.ensure_ready()?;
        self.in_flight_save = Some(self.generation);
        Ok(self.config.clone())
    }

    /// The model is never touched here; a failed save can simply be retried.
    pub fn on_saved(&mut self, result: Result<String, ApiError>) -> Result<String, ApiError> {
        let generation = self.in_flight_save.take();
        match result {
            Ok(message) => {
                if let Some(generation) = generation {
                    self.saved_generation = generation;
                }
                info!("config saved: {}", message);
                Ok(message)
            }
            Err(e) => {
                warn!("{}", e);
                Err(e)
            }
        }
    }

    // ── Field edits ───────────────────────────────────────────────

    fn ensure_ready(&self) -> Result<(), EditError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(EditError::NotReady)
        }
    }

    /// Commit typed text into a field. Text that doesn't coerce stays in
    /// the widget as a draft and the model keeps its previous value.
    pub fn commit_text(&mut self, target: &FieldTarget, text: &str) -> Result<(), EditError> {
        self.edit_widget(target, |w| {
            w.set_text(text);
            true
        })
    }

    pub fn toggle(&mut self, target: &FieldTarget) -> Result<(), EditError> {
        self.edit_widget(target, |w| w.toggle())
    }

    pub fn step(&mut self, target: &FieldTarget, direction: i8) -> Result<(), EditError> {
        self.edit_widget(target, |w| w.step(direction))
    }

    fn edit_widget<F>(&mut self, target: &FieldTarget, edit: F) -> Result<(), EditError>
    where
        F: FnOnce(&mut form::FieldWidget) -> bool,
    {
        self.ensure_ready()?;
        let slot = self
            .form
            .slot_mut(target)
            .ok_or_else(|| EditError::UnknownTarget(target.describe()))?;
        if !edit(&mut slot.widget) {
            return Ok(());
        }
        let value = slot.widget.extract().map_err(|e| {
            warn!("rejected edit of {}: {}", target.describe(), e);
            e
        })?;
        if &value == slot.widget.source() {
            return Ok(());
        }
        self.apply_value(target, value)
    }

    fn apply_value(&mut self, target: &FieldTarget, value: Value) -> Result<(), EditError> {
        let renames = match target {
            FieldTarget::Chain { chain, field } => {
                self.config.update_chain_field(chain, field.update(&value))?;
                *field == form::ChainField::Id
            }
            FieldTarget::Effect { chain, effect, field } => {
                self.config.update_effect_field(chain, effect, field.update(&value))?;
                *field == form::EffectField::Id
            }
            FieldTarget::Output { chain, field } => {
                self.config.update_output_field(chain, field.update(&value))?;
                false
            }
            FieldTarget::Param { owner, name, .. } => {
                match owner {
                    Owner::Effect { chain, effect } => self.config.update_effect_arg(chain, effect, name, value.clone())?,
                    Owner::Output { chain } => self.config.update_output_arg(chain, name, value.clone())?,
                    Owner::Action { event, index } => {
                        self.config.update_action_param(event, *index, name, value.clone())?
                    }
                }
                false
            }
        };
        self.generation += 1;
        debug!("{} = {}", target.describe(), value);

        if renames {
            // every key under the renamed chain/effect changed
            self.rerender();
        } else if let Some(slot) = self.form.slot_mut(target) {
            slot.widget = form::render(&slot.widget.schema, Some(&value));
        }
        Ok(())
    }

    // ── Type changes ──────────────────────────────────────────────

    /// Switch the type of an effect, output or action. The model clears
    /// its args/params first, then the section drops and rebuilds its
    /// parameter block against the new schema.
    pub fn change_type(&mut self, owner: &Owner, type_key: &str) -> Result<(), EditError> {
        self.ensure_ready()?;
        let schemas = self.schemas.as_ref().ok_or(EditError::NotReady)?;
        match owner {
            Owner::Effect { chain, effect } => self.config.change_effect_type(chain, effect, type_key)?,
            Owner::Output { chain } => self.config.change_output_type(chain, type_key)?,
            Owner::Action { event, index } => self.config.change_action_type(event, *index, type_key)?,
        }
        self.generation += 1;
        if let Some(section) = self.form.section_mut(owner) {
            section.retype(type_key, schemas.for_kind(owner.kind()));
        }
        debug!("{:?} retyped to {}", owner, type_key);
        Ok(())
    }

    /// Step the type selector of a section to its neighbour.
    pub fn cycle_type(&mut self, owner: &Owner, direction: i8) -> Result<(), EditError> {
        self.ensure_ready()?;
        let section = self
            .form
            .section(owner)
            .ok_or_else(|| EditError::UnknownTarget(format!("{:?}", owner)))?;
        let current = section.selector.current().to_string();
        match section.selector.neighbour(direction) {
            Some(next) if next != current => {
                let next = next.to_string();
                self.change_type(owner, &next)
            }
            _ => Ok(()),
        }
    }

    // ── Structural edits ──────────────────────────────────────────

    fn rerender(&mut self) {
        if let Some(schemas) = &self.schemas {
            let stats = self.form.reconcile(render_config(&self.config, schemas));
            debug!("re-rendered form: {} kept, {} rebuilt", stats.kept, stats.rebuilt);
        }
    }

    fn structural<T>(&mut self, edit: impl FnOnce(&mut Config, &SchemaSet) -> Result<T, ModelError>) -> Result<T, EditError> {
        self.ensure_ready()?;
        let schemas = self.schemas.as_ref().ok_or(EditError::NotReady)?;
        let out = edit(&mut self.config, schemas)?;
        self.generation += 1;
        self.rerender();
        Ok(out)
    }

    pub fn add_chain(&mut self) -> Result<String, EditError> {
        self.structural(|config, _| Ok(config.add_chain().id.clone()))
    }

    /// Removing a chain that is already gone is not an error at this level.
    pub fn remove_chain(&mut self, id: &str) -> Result<(), EditError> {
        match self.structural(|config, _| config.remove_chain(id)) {
            Err(EditError::Model(ModelError::ChainNotFound(_))) => {
                debug!("chain {} already removed", id);
                Ok(())
            }
            other => other,
        }
    }

    pub fn add_effect(&mut self, chain_id: &str) -> Result<String, EditError> {
        self.structural(|config, schemas| Ok(config.add_effect(chain_id, &schemas.effects)?.id.clone()))
    }

    pub fn remove_effect(&mut self, chain_id: &str, effect_id: &str) -> Result<(), EditError> {
        self.structural(|config, _| config.remove_effect(chain_id, effect_id))
    }

    pub fn add_event(&mut self) -> Result<String, EditError> {
        self.structural(|config, _| Ok(config.add_event()))
    }

    pub fn remove_event(&mut self, name: &str) -> Result<(), EditError> {
        self.structural(|config, _| config.remove_event(name))
    }

    pub fn add_action(&mut self, event: &str) -> Result<usize, EditError> {
        self.structural(|config, schemas| config.add_action_to_event(event, &schemas.actions))
    }

    /// Later actions shift down a slot, so the event's widgets are rebuilt
    /// from the model rather than reconciled by position.
    pub fn remove_action(&mut self, event: &str, index: usize) -> Result<(), EditError> {
        self.ensure_ready()?;
        let schemas = self.schemas.as_ref().ok_or(EditError::NotReady)?;
        self.config.remove_action(event, index)?;
        self.generation += 1;
        let stats = self.form.reconcile_reindexed(render_config(&self.config, schemas), event);
        debug!("re-rendered form after {}[{}] removed: {} kept, {} rebuilt", event, index, stats.kept, stats.rebuilt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use crate::form::{ChainField, SectionPhase};
    use serde_json::json;

    fn effects() -> Registry {
        Registry::from_effect_json(
            r##"{
                "solid_color": {"args": {"color": {"type": "string", "default": "#ffffff"}}},
                "strobe": {"args": {"rate": {"type": "number", "default": 4}, "pattern": {"type": "object", "default": [1, 0]}}}
            }"##,
        )
        .unwrap()
    }

    fn actions() -> Registry {
        Registry::from_action_json(
            r#"{
                "set_global": {"Parameters": [{"internal_name": "value", "data_type": "float64", "default_value": 120}]},
                "toggle_effect": {"Parameters": []}
            }"#,
        )
        .unwrap()
    }

    fn wire_config() -> Config {
        serde_json::from_value(json!({
            "Chains": [{
                "ID": "c1", "Priority": 0, "TickRate": 100, "NumLamps": 1,
                "Output": {"Type": "artnet", "Args": {"ip": "127.0.0.1"}, "ChannelMapping": "RGB", "NumChannelsPerLamp": 3},
                "Effects": [{"ID": "e1", "Type": "strobe", "Args": {"rate": 10, "pattern": [1, 1, 0]}}]
            }],
            "events": {"drop": [{"type": "set_global", "params": {"value": 140}}, {"type": "toggle_effect"}]}
        }))
        .unwrap()
    }

    fn ready_editor() -> ConfigEditor {
        let mut editor = ConfigEditor::new();
        assert_eq!(editor.on_config(Ok(wire_config())), LoadOutcome::Pending);
        assert_eq!(editor.on_schemas(SchemaKind::Effect, Ok(effects())), LoadOutcome::Pending);
        assert_eq!(editor.on_schemas(SchemaKind::Action, Ok(actions())), LoadOutcome::Ready);
        editor
    }

    fn effect_owner() -> Owner {
        Owner::Effect { chain: "c1".into(), effect: "e1".into() }
    }

    fn effect_param(type_key: &str, name: &str) -> FieldTarget {
        FieldTarget::Param { owner: effect_owner(), type_key: type_key.into(), name: name.into() }
    }

    #[test]
    fn load_waits_for_all_three_results() {
        let editor = ready_editor();
        assert!(editor.is_ready());
        assert!(!editor.is_dirty());
        assert_eq!(editor.form().chains.len(), 1);
        assert_eq!(editor.form().events[0].actions.len(), 2);
    }

    #[test]
    fn schema_failure_is_terminal() {
        let mut editor = ConfigEditor::new();
        let outcome = editor.on_schemas(SchemaKind::Effect, Err(ApiError::fetch("/api/effects/schema", "refused")));
        assert!(matches!(outcome, LoadOutcome::Failed(_)));
        assert_eq!(editor.on_config(Ok(wire_config())), LoadOutcome::Ignored);
        assert_eq!(editor.on_schemas(SchemaKind::Action, Ok(actions())), LoadOutcome::Ignored);
        assert!(matches!(editor.phase(), EditorPhase::Failed(_)));
        assert_eq!(editor.add_chain(), Err(EditError::NotReady));
        assert_eq!(editor.begin_save().unwrap_err(), EditError::NotReady);
    }

    #[test]
    fn commit_updates_model_and_slot() {
        let mut editor = ready_editor();
        let target = effect_param("strobe", "rate");
        editor.commit_text(&target, "12.5").unwrap();

        assert_eq!(editor.config().chains[0].effects[0].args["rate"], json!(12.5));
        assert_eq!(editor.form().slot(&target).unwrap().widget.source(), &json!(12.5));
        assert!(editor.is_dirty());
    }

    #[test]
    fn malformed_structured_input_never_reaches_the_model() {
        let mut editor = ready_editor();
        let target = effect_param("strobe", "pattern");
        let err = editor.commit_text(&target, "[1, 0").unwrap_err();

        assert!(matches!(err, EditError::Field(FieldError::MalformedInput { .. })));
        assert_eq!(editor.config().chains[0].effects[0].args["pattern"], json!([1, 1, 0]));
        assert_eq!(editor.form().slot(&target).unwrap().widget.text(), "[1, 0");
        assert!(!editor.is_dirty());
    }

    #[test]
    fn unparsable_number_is_rejected() {
        let mut editor = ready_editor();
        let target = FieldTarget::Chain { chain: "c1".into(), field: ChainField::TickRate };
        assert!(editor.commit_text(&target, "fast").is_err());
        assert_eq!(editor.config().chains[0].tick_rate, 100);
    }

    #[test]
    fn type_change_clears_args_and_rebuilds_block() {
        let mut editor = ready_editor();
        editor.change_type(&effect_owner(), "solid_color").unwrap();

        let effect = &editor.config().chains[0].effects[0];
        assert_eq!(effect.effect_type, "solid_color");
        assert!(effect.args.is_empty());

        let section = editor.form().section(&effect_owner()).unwrap();
        assert_eq!(section.phase(), SectionPhase::Stable);
        assert_eq!(section.params.fields.len(), 1);
        assert_eq!(section.params.fields[0].widget.extract(), Ok(json!("#ffffff")));
        assert!(editor.form().slot(&effect_param("strobe", "rate")).is_none());
    }

    #[test]
    fn cycling_action_type_clears_params() {
        let mut editor = ready_editor();
        let owner = Owner::Action { event: "drop".into(), index: 0 };
        editor.cycle_type(&owner, 1).unwrap();

        let action = &editor.config().events["drop"][0];
        assert_eq!(action.action_type, "toggle_effect");
        assert!(action.params.is_empty());
    }

    #[test]
    fn renaming_a_chain_rekeys_the_form() {
        let mut editor = ready_editor();
        let target = FieldTarget::Chain { chain: "c1".into(), field: ChainField::Id };
        editor.commit_text(&target, "front").unwrap();

        assert_eq!(editor.config().chains[0].id, "front");
        assert_eq!(editor.form().chains[0].id, "front");
        assert!(editor.form().slot(&target).is_none());
    }

    #[test]
    fn structural_edits_rerender() {
        let mut editor = ready_editor();
        assert_eq!(editor.add_chain().unwrap(), "newChain2");
        assert_eq!(editor.add_effect("newChain2").unwrap(), "newEffect1");
        assert_eq!(editor.form().chains[1].effects[0].selector.current(), "solid_color");

        editor.remove_chain("newChain2").unwrap();
        editor.remove_chain("newChain2").unwrap();
        assert_eq!(editor.form().chains.len(), 1);

        let event = editor.add_event().unwrap();
        assert_eq!(editor.add_action(&event).unwrap(), 0);
        editor.remove_action("drop", 0).unwrap();
        let remaining = &editor.form().events[0].actions;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].owner, Owner::Action { event: "drop".into(), index: 0 });
        assert_eq!(remaining[0].selector.current(), "toggle_effect");
    }

    #[test]
    fn removing_an_action_drops_drafts_of_equal_neighbours() {
        let mut editor = ready_editor();
        let event = editor.add_event().unwrap();
        let value = |index| FieldTarget::Param {
            owner: Owner::Action { event: event.clone(), index },
            type_key: "set_global".into(),
            name: "value".into(),
        };
        for index in 0..3 {
            assert_eq!(editor.add_action(&event).unwrap(), index);
            editor.commit_text(&value(index), "5").unwrap();
        }
        assert!(editor.commit_text(&value(1), "oops").is_err());

        editor.remove_action(&event, 0).unwrap();
        assert_eq!(editor.config().events[&event].len(), 2);
        for index in 0..2 {
            let widget = &editor.form().slot(&value(index)).unwrap().widget;
            assert_ne!(widget.text(), "oops");
            assert_eq!(widget.extract().as_ref(), Ok(widget.source()));
        }
    }

    #[test]
    fn save_failure_leaves_model_alone() {
        let mut editor = ready_editor();
        editor.toggle(&FieldTarget::Effect {
            chain: "c1".into(),
            effect: "e1".into(),
            field: crate::form::EffectField::Enabled,
        })
        .unwrap();
        let before = editor.config().clone();

        let payload = editor.begin_save().unwrap();
        assert_eq!(payload, before);
        assert!(editor.on_saved(Err(ApiError::Save("500".into()))).is_err());
        assert_eq!(editor.config(), &before);
        assert!(editor.is_dirty());

        editor.begin_save().unwrap();
        assert_eq!(editor.on_saved(Ok("saved".into())), Ok("saved".to_string()));
        assert!(!editor.is_dirty());
    }

    #[test]
    fn edits_during_save_stay_dirty() {
        let mut editor = ready_editor();
        editor.add_event().unwrap();
        editor.begin_save().unwrap();
        editor.add_event().unwrap();
        editor.on_saved(Ok("ok".into())).unwrap();
        assert!(editor.is_dirty());
    }

    #[test]
    fn reload_replaces_everything() {
        let mut editor = ready_editor();
        editor.add_chain().unwrap();
        let target = effect_param("strobe", "rate");
        let _ = editor.commit_text(&target, "bogus");

        assert_eq!(editor.on_config(Ok(wire_config())), LoadOutcome::Reloaded);
        assert_eq!(editor.config(), &wire_config());
        assert_eq!(editor.form().slot(&target).unwrap().widget.text(), "10");
        assert!(!editor.is_dirty());
    }

    #[test]
    fn failed_reload_keeps_session() {
        let mut editor = ready_editor();
        editor.add_chain().unwrap();
        let outcome = editor.on_config(Err(ApiError::fetch("/api/config", "timeout")));
        assert!(matches!(outcome, LoadOutcome::ReloadFailed(_)));
        assert_eq!(editor.config().chains.len(), 2);
        assert!(editor.is_ready());
    }
}
