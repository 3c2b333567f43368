//! Structural edits on the owned `Config`.
//!
//! None of these validate against a schema; the form layer only ever hands
//! them values that already passed field extraction.

use serde_json::Value;

use super::{ArgMap, Chain, Config, Effect, EventAction};
use crate::error::ModelError;
use crate::schema::{Registry, SchemaKind};

#[derive(Debug, Clone, PartialEq)]
pub enum ChainUpdate {
    Id(String),
    Priority(i64),
    TickRate(i64),
    NumLamps(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EffectUpdate {
    Id(String),
    Enabled(bool),
    Group(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutputUpdate {
    ChannelMapping(String),
    NumChannelsPerLamp(i64),
}

impl Config {
    pub fn chain(&self, id: &str) -> Option<&Chain> {
        self.chains.iter().find(|c| c.id == id)
    }

    pub fn chain_mut(&mut self, id: &str) -> Result<&mut Chain, ModelError> {
        self.chains
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ModelError::ChainNotFound(id.to_string()))
    }

    fn effect_mut(&mut self, chain_id: &str, effect_id: &str) -> Result<&mut Effect, ModelError> {
        self.chain_mut(chain_id)?
            .effect_mut(effect_id)
            .ok_or_else(|| ModelError::EffectNotFound {
                chain: chain_id.to_string(),
                effect: effect_id.to_string(),
            })
    }

    fn action_mut(&mut self, event: &str, index: usize) -> Result<&mut EventAction, ModelError> {
        self.events
            .get_mut(event)
            .ok_or_else(|| ModelError::EventNotFound(event.to_string()))?
            .get_mut(index)
            .ok_or_else(|| ModelError::ActionNotFound { event: event.to_string(), index })
    }

    // ── Chains ────────────────────────────────────────────────────

    /// Append a chain with a default artnet output. The generated id is
    /// positional and not checked for collisions.
    pub fn add_chain(&mut self) -> &Chain {
        let id = format!("newChain{}", self.chains.len() + 1);
        self.chains.push(Chain::new(&id));
        &self.chains[self.chains.len() - 1]
    }

    /// Remove every chain carrying `id`.
    pub fn remove_chain(&mut self, id: &str) -> Result<(), ModelError> {
        let before = self.chains.len();
        self.chains.retain(|c| c.id != id);
        if self.chains.len() == before {
            return Err(ModelError::ChainNotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn update_chain_field(&mut self, chain_id: &str, update: ChainUpdate) -> Result<(), ModelError> {
        let chain = self.chain_mut(chain_id)?;
        match update {
            ChainUpdate::Id(id) => chain.id = id,
            ChainUpdate::Priority(v) => chain.priority = v,
            ChainUpdate::TickRate(v) => chain.tick_rate = v,
            ChainUpdate::NumLamps(v) => chain.num_lamps = v,
        }
        Ok(())
    }

    // ── Effects ───────────────────────────────────────────────────

    /// Append an effect of the registry's first type.
    pub fn add_effect(&mut self, chain_id: &str, registry: &Registry) -> Result<&Effect, ModelError> {
        let effect_type = registry
            .default_type()
            .ok_or(ModelError::NoSchema(SchemaKind::Effect))?
            .to_string();
        let chain = self.chain_mut(chain_id)?;
        let id = format!("newEffect{}", chain.effects.len() + 1);
        chain.effects.push(Effect::new(&id, &effect_type));
        Ok(&chain.effects[chain.effects.len() - 1])
    }

    pub fn remove_effect(&mut self, chain_id: &str, effect_id: &str) -> Result<(), ModelError> {
        let chain = self.chain_mut(chain_id)?;
        let index = chain
            .effects
            .iter()
            .position(|e| e.id == effect_id)
            .ok_or_else(|| ModelError::EffectNotFound {
                chain: chain_id.to_string(),
                effect: effect_id.to_string(),
            })?;
        chain.effects.remove(index);
        Ok(())
    }

    pub fn update_effect_field(
        &mut self,
        chain_id: &str,
        effect_id: &str,
        update: EffectUpdate,
    ) -> Result<(), ModelError> {
        let effect = self.effect_mut(chain_id, effect_id)?;
        match update {
            EffectUpdate::Id(id) => effect.id = id,
            EffectUpdate::Enabled(enabled) => effect.enabled = enabled,
            EffectUpdate::Group(group) => effect.group = group,
        }
        Ok(())
    }

    pub fn update_effect_arg(
        &mut self,
        chain_id: &str,
        effect_id: &str,
        name: &str,
        value: Value,
    ) -> Result<(), ModelError> {
        self.effect_mut(chain_id, effect_id)?
            .args
            .insert(name.to_string(), value);
        Ok(())
    }

    /// Switch an effect's type. Args are dropped wholesale, even names the
    /// new type shares with the old one.
    pub fn change_effect_type(
        &mut self,
        chain_id: &str,
        effect_id: &str,
        effect_type: &str,
    ) -> Result<(), ModelError> {
        let effect = self.effect_mut(chain_id, effect_id)?;
        effect.effect_type = effect_type.to_string();
        effect.args = ArgMap::new();
        Ok(())
    }

    // ── Outputs ───────────────────────────────────────────────────

    pub fn change_output_type(&mut self, chain_id: &str, output_type: &str) -> Result<(), ModelError> {
        let output = &mut self.chain_mut(chain_id)?.output;
        output.output_type = output_type.to_string();
        output.args = ArgMap::new();
        Ok(())
    }

    pub fn update_output_field(&mut self, chain_id: &str, update: OutputUpdate) -> Result<(), ModelError> {
        let output = &mut self.chain_mut(chain_id)?.output;
        match update {
            OutputUpdate::ChannelMapping(mapping) => output.channel_mapping = mapping,
            OutputUpdate::NumChannelsPerLamp(n) => output.num_channels_per_lamp = n,
        }
        Ok(())
    }

    pub fn update_output_arg(&mut self, chain_id: &str, name: &str, value: Value) -> Result<(), ModelError> {
        self.chain_mut(chain_id)?
            .output
            .args
            .insert(name.to_string(), value);
        Ok(())
    }

    // ── Events & actions ──────────────────────────────────────────

    /// Add an empty event named `newEvent<N>`. The table is keyed by name,
    /// so N is bumped past any name already taken.
    pub fn add_event(&mut self) -> String {
        let mut n = self.events.len() + 1;
        let mut name = format!("newEvent{}", n);
        while self.events.contains_key(&name) {
            n += 1;
            name = format!("newEvent{}", n);
        }
        self.events.insert(name.clone(), Vec::new());
        name
    }

    pub fn remove_event(&mut self, name: &str) -> Result<(), ModelError> {
        self.events
            .shift_remove(name)
            .map(|_| ())
            .ok_or_else(|| ModelError::EventNotFound(name.to_string()))
    }

    /// Append an action of the registry's first type. Returns its index.
    pub fn add_action_to_event(&mut self, event: &str, registry: &Registry) -> Result<usize, ModelError> {
        let action_type = registry
            .default_type()
            .ok_or(ModelError::NoSchema(SchemaKind::Action))?
            .to_string();
        let actions = self
            .events
            .get_mut(event)
            .ok_or_else(|| ModelError::EventNotFound(event.to_string()))?;
        actions.push(EventAction::new(&action_type));
        Ok(actions.len() - 1)
    }

    /// Remove by position; later actions shift down by one.
    pub fn remove_action(&mut self, event: &str, index: usize) -> Result<EventAction, ModelError> {
        let actions = self
            .events
            .get_mut(event)
            .ok_or_else(|| ModelError::EventNotFound(event.to_string()))?;
        if index >= actions.len() {
            return Err(ModelError::ActionNotFound { event: event.to_string(), index });
        }
        Ok(actions.remove(index))
    }

    pub fn update_action_param(
        &mut self,
        event: &str,
        index: usize,
        name: &str,
        value: Value,
    ) -> Result<(), ModelError> {
        self.action_mut(event, index)?
            .params
            .insert(name.to_string(), value);
        Ok(())
    }

    pub fn change_action_type(&mut self, event: &str, index: usize, action_type: &str) -> Result<(), ModelError> {
        let action = self.action_mut(event, index)?;
        action.action_type = action_type.to_string();
        action.params = ArgMap::new();
        Ok(())
    }
}
