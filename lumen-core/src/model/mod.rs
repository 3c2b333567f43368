//! In-memory mirror of the pipeline configuration.
//!
//! Field names follow the wire casing exactly through serde renames
//! (`Chains`, `ID`, `TickRate`, ... but `events`, `type`, `params`). Every
//! level keeps unknown fields in `extra` so a wholesale save never drops
//! data the editor doesn't model.

mod mutate;

pub use mutate::{ChainUpdate, EffectUpdate, OutputUpdate};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Parameter name to typed value, as stored in `Args` / `params`.
pub type ArgMap = Map<String, Value>;

pub const DEFAULT_OUTPUT_TYPE: &str = "artnet";
pub const DEFAULT_OUTPUT_IP: &str = "127.0.0.1";
pub const DEFAULT_CHANNEL_MAPPING: &str = "RGB";
pub const DEFAULT_CHANNELS_PER_LAMP: i64 = 3;
pub const DEFAULT_TICK_RATE: i64 = 100;

/// The backend serialises empty Go slices and maps as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "Chains", alias = "chains", default, deserialize_with = "null_as_default")]
    pub chains: Vec<Chain>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: IndexMap<String, Vec<EventAction>>,
    #[serde(flatten)]
    pub extra: ArgMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    #[serde(rename = "ID", alias = "id")]
    pub id: String,
    #[serde(rename = "Priority", alias = "priority", default)]
    pub priority: i64,
    #[serde(rename = "TickRate", alias = "tickRate", default)]
    pub tick_rate: i64,
    #[serde(rename = "NumLamps", alias = "numLamps", default)]
    pub num_lamps: i64,
    #[serde(rename = "Output", alias = "output", default)]
    pub output: Output,
    #[serde(rename = "Effects", alias = "effects", default, deserialize_with = "null_as_default")]
    pub effects: Vec<Effect>,
    #[serde(flatten)]
    pub extra: ArgMap,
}

impl Chain {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            priority: 0,
            tick_rate: DEFAULT_TICK_RATE,
            num_lamps: 1,
            output: Output::default_artnet(),
            effects: Vec::new(),
            extra: ArgMap::new(),
        }
    }

    pub fn effect(&self, id: &str) -> Option<&Effect> {
        self.effects.iter().find(|e| e.id == id)
    }

    pub fn effect_mut(&mut self, id: &str) -> Option<&mut Effect> {
        self.effects.iter_mut().find(|e| e.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    #[serde(rename = "ID", alias = "id")]
    pub id: String,
    #[serde(rename = "Type", alias = "type")]
    pub effect_type: String,
    #[serde(rename = "Enabled", alias = "enabled", default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(rename = "Group", alias = "group", default)]
    pub group: String,
    #[serde(rename = "Args", alias = "args", default, deserialize_with = "null_as_default")]
    pub args: ArgMap,
    #[serde(flatten)]
    pub extra: ArgMap,
}

impl Effect {
    pub fn new(id: &str, effect_type: &str) -> Self {
        Self {
            id: id.to_string(),
            effect_type: effect_type.to_string(),
            enabled: true,
            group: String::new(),
            args: ArgMap::new(),
            extra: ArgMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Output {
    #[serde(rename = "Type", alias = "type", default)]
    pub output_type: String,
    #[serde(rename = "Args", alias = "args", default, deserialize_with = "null_as_default")]
    pub args: ArgMap,
    #[serde(rename = "ChannelMapping", alias = "channelMapping", default)]
    pub channel_mapping: String,
    #[serde(rename = "NumChannelsPerLamp", alias = "numChannelsPerLamp", default)]
    pub num_channels_per_lamp: i64,
    #[serde(flatten)]
    pub extra: ArgMap,
}

impl Output {
    /// Seed output for a freshly added chain.
    pub fn default_artnet() -> Self {
        let mut args = ArgMap::new();
        args.insert("ip".to_string(), Value::String(DEFAULT_OUTPUT_IP.to_string()));
        Self {
            output_type: DEFAULT_OUTPUT_TYPE.to_string(),
            args,
            channel_mapping: DEFAULT_CHANNEL_MAPPING.to_string(),
            num_channels_per_lamp: DEFAULT_CHANNELS_PER_LAMP,
            extra: ArgMap::new(),
        }
    }
}

/// One step of an event's action list. Targeting fields such as
/// `chain_id` / `effect_id` ride along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAction {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub params: ArgMap,
    #[serde(flatten)]
    pub extra: ArgMap,
}

impl EventAction {
    pub fn new(action_type: &str) -> Self {
        Self {
            action_type: action_type.to_string(),
            params: ArgMap::new(),
            extra: ArgMap::new(),
        }
    }

    pub fn chain_id(&self) -> Option<&str> {
        self.extra.get("chain_id").and_then(Value::as_str)
    }

    pub fn effect_id(&self) -> Option<&str> {
        self.extra.get("effect_id").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_wire_config() {
        let wire = json!({
            "Chains": [{
                "ID": "c1",
                "Priority": 2,
                "TickRate": 50,
                "NumLamps": 4,
                "Output": {"Type": "artnet", "Args": {"ip": "10.0.0.5"}, "ChannelMapping": "RGBW", "NumChannelsPerLamp": 4},
                "Effects": [
                    {"ID": "e1", "Type": "strobe", "Args": {"rate": 4}},
                    {"ID": "e2", "Type": "solid_color", "Enabled": false, "Group": "a", "Args": null}
                ]
            }],
            "events": {"drop": [{"type": "toggle_effect", "chain_id": "c1", "effect_id": "e1"}]}
        });
        let config: Config = serde_json::from_value(wire).unwrap();

        let chain = &config.chains[0];
        assert_eq!(chain.id, "c1");
        assert_eq!(chain.tick_rate, 50);
        assert_eq!(chain.output.channel_mapping, "RGBW");
        assert!(chain.effects[0].enabled);
        assert!(!chain.effects[1].enabled);
        assert!(chain.effects[1].args.is_empty());

        let action = &config.events["drop"][0];
        assert_eq!(action.action_type, "toggle_effect");
        assert!(action.params.is_empty());
        assert_eq!(action.chain_id(), Some("c1"));
        assert_eq!(action.effect_id(), Some("e1"));
    }

    #[test]
    fn null_collections_read_as_empty() {
        let config: Config = serde_json::from_str(r#"{"Chains": null, "events": null}"#).unwrap();
        assert!(config.chains.is_empty());
        assert!(config.events.is_empty());
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let wire = json!({
            "globals": {"bpm": 128, "color1": "#fff"},
            "midi_port_name": "launchpad",
            "Chains": [{
                "ID": "c1", "Priority": 0, "TickRate": 100, "NumLamps": 1,
                "Output": {"Type": "artnet", "Args": {}, "ChannelMapping": "RGB", "NumChannelsPerLamp": 3, "govee": {"mac": "x"}},
                "Effects": [], "Comment": "front truss"
            }],
            "events": {}
        });
        let config: Config = serde_json::from_value(wire.clone()).unwrap();
        assert_eq!(config.extra["midi_port_name"], json!("launchpad"));

        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back["globals"], wire["globals"]);
        assert_eq!(back["Chains"][0]["Comment"], json!("front truss"));
        assert_eq!(back["Chains"][0]["Output"]["govee"], json!({"mac": "x"}));
    }

    #[test]
    fn lowercase_wire_fields_are_accepted() {
        let config: Config = serde_json::from_value(json!({
            "chains": [{"id": "c1", "tickRate": 20, "effects": [{"id": "e1", "type": "strobe", "args": {}}]}]
        }))
        .unwrap();
        assert_eq!(config.chains[0].tick_rate, 20);
        assert_eq!(config.chains[0].effects[0].effect_type, "strobe");

        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back["Chains"][0]["ID"], json!("c1"));
        assert_eq!(back["Chains"][0]["Effects"][0]["Enabled"], json!(true));
    }

    #[test]
    fn serialises_with_wire_casing() {
        let mut config = Config::default();
        config.chains.push(Chain::new("c1"));
        config.events.insert("go".to_string(), vec![EventAction::new("set_global")]);

        let wire = serde_json::to_value(&config).unwrap();
        assert_eq!(
            wire,
            json!({
                "Chains": [{
                    "ID": "c1", "Priority": 0, "TickRate": 100, "NumLamps": 1,
                    "Output": {"Type": "artnet", "Args": {"ip": "127.0.0.1"}, "ChannelMapping": "RGB", "NumChannelsPerLamp": 3},
                    "Effects": []
                }],
                "events": {"go": [{"type": "set_global", "params": {}}]}
            })
        );
    }
}
