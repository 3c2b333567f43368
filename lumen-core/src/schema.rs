//! Type registries for the polymorphic parts of a config.
//!
//! Effects and actions are described by the backend at runtime, each in its
//! own wire shape. Both are normalised into the same `Registry` of
//! `TypeSchema`s so the form renderer never has to know which endpoint a
//! parameter came from. Outputs have no schema endpoint and use a built-in
//! registry.

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Effect,
    Action,
    Output,
}

impl SchemaKind {
    pub fn name(&self) -> &'static str {
        match self {
            SchemaKind::Effect => "effect",
            SchemaKind::Action => "action",
            SchemaKind::Output => "output",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    String,
    Integer,
    Float,
    Boolean,
    /// Structured JSON, also used for any tag we don't recognise
    Object,
}

impl DataType {
    pub fn from_wire(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "string" | "str" => DataType::String,
            "int" | "integer" => DataType::Integer,
            "float" | "float64" | "float32" | "number" => DataType::Float,
            "bool" | "boolean" => DataType::Boolean,
            _ => DataType::Object,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Boolean => "boolean",
            DataType::Object => "object",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSchema {
    pub name: String,
    pub display_name: String,
    pub data_type: DataType,
    pub default_value: Value,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ParameterSchema {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            display_name: name.to_string(),
            data_type,
            default_value: Value::Null,
            min: None,
            max: None,
        }
    }

    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = display_name.to_string();
        self
    }

    pub fn with_default(mut self, default_value: Value) -> Self {
        self.default_value = default_value;
        self
    }

    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSchema {
    pub type_key: String,
    pub human_readable_name: Option<String>,
    pub parameters: Vec<ParameterSchema>,
}

impl TypeSchema {
    pub fn label(&self) -> &str {
        self.human_readable_name.as_deref().unwrap_or(&self.type_key)
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSchema> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Ordered mapping from type key to its schema. Wire order is kept; the
/// first key is the default type for newly created entities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    types: IndexMap<String, TypeSchema>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, schema: TypeSchema) {
        self.types.insert(schema.type_key.clone(), schema);
    }

    pub fn get(&self, type_key: &str) -> Option<&TypeSchema> {
        self.types.get(type_key)
    }

    pub fn default_type(&self) -> Option<&str> {
        self.types.keys().next().map(String::as_str)
    }

    pub fn type_keys(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeSchema> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Parse `GET /api/effects/schema`:
    /// `{typeKey: {args: {paramName: {type, ...}}}}`.
    pub fn from_effect_json(json: &str) -> Result<Self, serde_json::Error> {
        let wire: IndexMap<String, WireEffectType> = serde_json::from_str(json)?;
        let mut registry = Registry::new();
        for (type_key, effect) in wire {
            let parameters = effect
                .args
                .unwrap_or_default()
                .into_iter()
                .map(|(name, arg)| ParameterSchema {
                    display_name: arg.display_name.unwrap_or_else(|| name.clone()),
                    data_type: DataType::from_wire(&arg.kind),
                    default_value: arg.default,
                    min: bound(arg.min),
                    max: bound(arg.max),
                    name,
                })
                .collect();
            registry.insert(TypeSchema {
                type_key,
                human_readable_name: effect.human_readable_name,
                parameters,
            });
        }
        Ok(registry)
    }

    /// Parse `GET /api/actions/schema`:
    /// `{typeKey: {human_readable_name?, Parameters: [{internal_name, ...}]}}`.
    pub fn from_action_json(json: &str) -> Result<Self, serde_json::Error> {
        let wire: IndexMap<String, WireActionType> = serde_json::from_str(json)?;
        let mut registry = Registry::new();
        for (type_key, action) in wire {
            let parameters = action
                .parameters
                .unwrap_or_default()
                .into_iter()
                .map(|p| ParameterSchema {
                    display_name: p
                        .display_name
                        .filter(|d| !d.is_empty())
                        .unwrap_or_else(|| p.internal_name.clone()),
                    data_type: DataType::from_wire(&p.data_type),
                    default_value: p.default_value,
                    min: bound(p.min_value),
                    max: bound(p.max_value),
                    name: p.internal_name,
                })
                .collect();
            registry.insert(TypeSchema {
                type_key,
                human_readable_name: action.human_readable_name.filter(|n| !n.is_empty()),
                parameters,
            });
        }
        Ok(registry)
    }

    /// Output types understood by the pipeline. There is no endpoint for
    /// these, so the editor ships its own.
    pub fn builtin_outputs() -> Self {
        let mut registry = Registry::new();
        registry.insert(TypeSchema {
            type_key: "artnet".to_string(),
            human_readable_name: Some("Art-Net".to_string()),
            parameters: vec![ParameterSchema::new("ip", DataType::String)
                .with_display_name("IP address")
                .with_default(Value::String("127.0.0.1".to_string()))],
        });
        registry
    }
}

/// Min/max arrive as whatever JSON the backend had; only numbers count.
fn bound(value: Option<Value>) -> Option<f64> {
    value.and_then(|v| v.as_f64())
}

#[derive(Deserialize)]
struct WireEffectType {
    #[serde(default)]
    args: Option<IndexMap<String, WireEffectArg>>,
    #[serde(default)]
    human_readable_name: Option<String>,
}

#[derive(Deserialize)]
struct WireEffectArg {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default, alias = "default_value")]
    default: Value,
    #[serde(default, alias = "min_value")]
    min: Option<Value>,
    #[serde(default, alias = "max_value")]
    max: Option<Value>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct WireActionType {
    #[serde(default)]
    human_readable_name: Option<String>,
    #[serde(default, alias = "Parameters")]
    parameters: Option<Vec<WireActionParam>>,
}

#[derive(Deserialize)]
struct WireActionParam {
    internal_name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    data_type: String,
    #[serde(default)]
    default_value: Value,
    #[serde(default)]
    min_value: Option<Value>,
    #[serde(default)]
    max_value: Option<Value>,
}

/// The three registries an editing session works against.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSet {
    pub effects: Registry,
    pub actions: Registry,
    pub outputs: Registry,
}

impl SchemaSet {
    pub fn new(effects: Registry, actions: Registry) -> Self {
        Self {
            effects,
            actions,
            outputs: Registry::builtin_outputs(),
        }
    }

    pub fn for_kind(&self, kind: SchemaKind) -> &Registry {
        match kind {
            SchemaKind::Effect => &self.effects,
            SchemaKind::Action => &self.actions,
            SchemaKind::Output => &self.outputs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_type_normalises_wire_tags() {
        assert_eq!(DataType::from_wire("float64"), DataType::Float);
        assert_eq!(DataType::from_wire("number"), DataType::Float);
        assert_eq!(DataType::from_wire("int"), DataType::Integer);
        assert_eq!(DataType::from_wire("bool"), DataType::Boolean);
        assert_eq!(DataType::from_wire("string"), DataType::String);
        assert_eq!(DataType::from_wire("color"), DataType::Object);
        assert_eq!(DataType::from_wire(""), DataType::Object);
    }

    #[test]
    fn effect_registry_keeps_wire_order() {
        let json = r##"{
            "strobe": {"args": {"rate": {"type": "number", "min": 0, "max": 50}}},
            "solid_color": {"args": {"color": {"type": "string", "default": "#ff0000"}}},
            "rainbow": {"args": null}
        }"##;
        let registry = Registry::from_effect_json(json).unwrap();
        let keys: Vec<&str> = registry.type_keys().collect();
        assert_eq!(keys, vec!["strobe", "solid_color", "rainbow"]);
        assert_eq!(registry.default_type(), Some("strobe"));

        let rate = &registry.get("strobe").unwrap().parameters[0];
        assert_eq!(rate.data_type, DataType::Float);
        assert_eq!(rate.min, Some(0.0));
        assert_eq!(rate.max, Some(50.0));
        assert_eq!(rate.display_name, "rate");

        let color = registry.get("solid_color").unwrap().parameter("color").unwrap();
        assert_eq!(color.default_value, json!("#ff0000"));
        assert!(registry.get("rainbow").unwrap().parameters.is_empty());
    }

    #[test]
    fn effect_args_keep_declared_order() {
        let json = r#"{"fade": {"args": {"zeta": {"type": "int"}, "alpha": {"type": "bool"}, "mid": {"type": "object"}}}}"#;
        let registry = Registry::from_effect_json(json).unwrap();
        let names: Vec<&str> = registry.get("fade").unwrap().parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn action_registry_parses_parameter_list() {
        let json = r#"{
            "set_global": {
                "human_readable_name": "Set Global",
                "Parameters": [
                    {"internal_name": "name", "display_name": "Name", "data_type": "string", "default_value": "bpm"},
                    {"internal_name": "value", "data_type": "float64", "default_value": 120, "min_value": 20, "max_value": 300}
                ]
            },
            "toggle_effect": {"parameters": []}
        }"#;
        let registry = Registry::from_action_json(json).unwrap();
        assert_eq!(registry.default_type(), Some("set_global"));

        let set_global = registry.get("set_global").unwrap();
        assert_eq!(set_global.label(), "Set Global");
        assert_eq!(set_global.parameters.len(), 2);
        assert_eq!(set_global.parameters[0].display_name, "Name");
        assert_eq!(set_global.parameters[1].display_name, "value");
        assert_eq!(set_global.parameters[1].data_type, DataType::Float);
        assert_eq!(set_global.parameters[1].default_value, json!(120));
        assert_eq!(set_global.parameters[1].max, Some(300.0));

        assert_eq!(registry.get("toggle_effect").unwrap().label(), "toggle_effect");
    }

    #[test]
    fn non_numeric_bounds_are_ignored() {
        let json = r#"{"x": {"Parameters": [{"internal_name": "p", "data_type": "int", "min_value": "low"}]}}"#;
        let registry = Registry::from_action_json(json).unwrap();
        assert_eq!(registry.get("x").unwrap().parameters[0].min, None);
    }

    #[test]
    fn malformed_schema_is_an_error() {
        assert!(Registry::from_effect_json("[1, 2]").is_err());
        assert!(Registry::from_action_json(r#"{"x": {"Parameters": [{"data_type": "int"}]}}"#).is_err());
    }

    #[test]
    fn builtin_outputs_default_to_artnet() {
        let outputs = Registry::builtin_outputs();
        assert_eq!(outputs.default_type(), Some("artnet"));
        let ip = outputs.get("artnet").unwrap().parameter("ip").unwrap();
        assert_eq!(ip.default_value, json!("127.0.0.1"));
    }
}
