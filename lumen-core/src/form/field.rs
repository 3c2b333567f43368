//! Schema-driven field widgets.
//!
//! This is the one place where free-form user text becomes a typed value
//! headed for the config. A widget remembers the value it was rendered
//! from, holds whatever the user typed since, and only hands out a value
//! through `extract`, which rejects anything that doesn't coerce.

use serde_json::{Number, Value};

use crate::error::FieldError;
use crate::schema::{DataType, ParameterSchema};

/// Decimal places kept after stepping a float field.
const FLOAT_STEP_PRECISION: f64 = 1e6;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    Text(String),
    Number {
        text: String,
        integer: bool,
        min: Option<f64>,
        max: Option<f64>,
    },
    Toggle(bool),
    /// Serialized JSON for object and unrecognised parameters
    Structured(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldWidget {
    pub schema: ParameterSchema,
    pub input: FieldInput,
    source: Value,
}

/// Build the widget for `schema`, showing `current` or the schema default
/// when the value is absent.
pub fn render(schema: &ParameterSchema, current: Option<&Value>) -> FieldWidget {
    let value = current.unwrap_or(&schema.default_value);
    let input = match schema.data_type {
        DataType::String => FieldInput::Text(plain_text(value)),
        DataType::Integer | DataType::Float => FieldInput::Number {
            text: match value {
                Value::Null => String::new(),
                other => plain_text(other),
            },
            integer: schema.data_type == DataType::Integer,
            min: schema.min,
            max: schema.max,
        },
        DataType::Boolean => FieldInput::Toggle(value.as_bool().unwrap_or(false)),
        DataType::Object => FieldInput::Structured(value.to_string()),
    };
    FieldWidget {
        schema: schema.clone(),
        input,
        source: value.clone(),
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Some(Number::from(n));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Integer fields drop any fractional part the user typed.
fn parse_integer(text: &str) -> Option<Number> {
    let n = parse_number(text)?;
    n.as_i64()
        .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
        .map(Number::from)
}

impl FieldWidget {
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn label(&self) -> &str {
        &self.schema.display_name
    }

    /// The value this widget was rendered from.
    pub fn source(&self) -> &Value {
        &self.source
    }

    /// Text shown in the row and seeded into the line editor.
    pub fn text(&self) -> String {
        match &self.input {
            FieldInput::Text(text) | FieldInput::Structured(text) => text.clone(),
            FieldInput::Number { text, .. } => text.clone(),
            FieldInput::Toggle(on) => on.to_string(),
        }
    }

    pub fn is_toggle(&self) -> bool {
        matches!(self.input, FieldInput::Toggle(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.input, FieldInput::Number { .. })
    }

    /// Replace the typed text. Toggles accept "true"/"false" and ignore
    /// anything else.
    pub fn set_text(&mut self, new_text: &str) {
        match &mut self.input {
            FieldInput::Text(text) | FieldInput::Structured(text) => *text = new_text.to_string(),
            FieldInput::Number { text, .. } => *text = new_text.to_string(),
            FieldInput::Toggle(on) => match new_text.trim() {
                "true" => *on = true,
                "false" => *on = false,
                _ => {}
            },
        }
    }

    /// Flip a toggle. Returns false for other kinds.
    pub fn toggle(&mut self) -> bool {
        if let FieldInput::Toggle(on) = &mut self.input {
            *on = !*on;
            return true;
        }
        false
    }

    /// Nudge a numeric field by one step, clamped to the soft bounds.
    /// Unparsable text restarts from the lower bound or zero.
    pub fn step(&mut self, direction: i8) -> bool {
        let FieldInput::Number { text, integer, min, max } = &mut self.input else {
            return false;
        };
        let current = parse_number(text).and_then(|n| n.as_f64()).unwrap_or(min.unwrap_or(0.0));
        let step = if *integer { 1.0 } else { 0.1 };
        let mut next = current + step * f64::from(direction);
        if let Some(lo) = min {
            next = next.max(*lo);
        }
        if let Some(hi) = max {
            next = next.min(*hi);
        }
        *text = if *integer {
            format!("{}", next.trunc() as i64)
        } else {
            let rounded = (next * FLOAT_STEP_PRECISION).round() / FLOAT_STEP_PRECISION;
            Number::from_f64(rounded).map(|n| n.to_string()).unwrap_or_default()
        };
        true
    }

    /// True when the current text would extract cleanly.
    pub fn is_valid(&self) -> bool {
        self.extract().is_ok()
    }

    /// Numeric text that parses but sits outside min/max.
    pub fn out_of_range(&self) -> bool {
        let FieldInput::Number { text, min, max, .. } = &self.input else {
            return false;
        };
        match parse_number(text).and_then(|n| n.as_f64()) {
            Some(v) => min.is_some_and(|lo| v < lo) || max.is_some_and(|hi| v > hi),
            None => false,
        }
    }

    /// True when the widget holds something other than what it was
    /// rendered from.
    pub fn is_edited(&self) -> bool {
        self.extract().map_or(true, |v| v != self.source)
    }

    /// Turn the widget's state back into a typed value.
    pub fn extract(&self) -> Result<Value, FieldError> {
        match &self.input {
            FieldInput::Text(text) => Ok(Value::String(text.clone())),
            FieldInput::Toggle(on) => Ok(Value::Bool(*on)),
            FieldInput::Number { text, integer, .. } => {
                let parsed = if *integer { parse_integer(text) } else { parse_number(text) };
                parsed.map(Value::Number).ok_or_else(|| FieldError::NotANumber {
                    param: self.schema.name.clone(),
                    text: text.clone(),
                })
            }
            FieldInput::Structured(text) => {
                serde_json::from_str(text).map_err(|e| FieldError::MalformedInput {
                    param: self.schema.name.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(data_type: DataType) -> ParameterSchema {
        ParameterSchema::new("p", data_type)
    }

    #[test]
    fn round_trips_every_data_type() {
        let cases = vec![
            (DataType::String, json!("hello world")),
            (DataType::String, json!("")),
            (DataType::Integer, json!(42)),
            (DataType::Integer, json!(-7)),
            (DataType::Float, json!(0.25)),
            (DataType::Float, json!(1.0)),
            (DataType::Float, json!(3)),
            (DataType::Boolean, json!(true)),
            (DataType::Boolean, json!(false)),
            (DataType::Object, json!({"r": 255, "g": [1, 2, 3], "nested": {"x": null}})),
            (DataType::Object, json!([1, "two", 3.5])),
            (DataType::Object, json!(null)),
        ];
        for (data_type, value) in cases {
            let widget = render(&schema(data_type), Some(&value));
            assert_eq!(widget.extract(), Ok(value.clone()), "{:?} {}", data_type, value);
            assert!(!widget.is_edited());
        }
    }

    #[test]
    fn absent_value_shows_schema_default() {
        let s = schema(DataType::Float).with_default(json!(0.5));
        let widget = render(&s, None);
        assert_eq!(widget.text(), "0.5");
        assert_eq!(widget.extract(), Ok(json!(0.5)));

        let s = schema(DataType::Object).with_default(json!({"a": 1}));
        assert_eq!(render(&s, None).extract(), Ok(json!({"a": 1})));
    }

    #[test]
    fn string_edit_passes_through() {
        let mut widget = render(&schema(DataType::String), Some(&json!("a")));
        widget.set_text("  spaced  ");
        assert_eq!(widget.extract(), Ok(json!("  spaced  ")));
        assert!(widget.is_edited());
    }

    #[test]
    fn number_edit_is_coerced() {
        let mut widget = render(&schema(DataType::Float), Some(&json!(1.5)));
        widget.set_text(" 12 ");
        assert_eq!(widget.extract(), Ok(json!(12)));
        widget.set_text("0.75");
        assert_eq!(widget.extract(), Ok(json!(0.75)));
    }

    #[test]
    fn integer_field_never_yields_a_fraction() {
        let mut widget = render(&schema(DataType::Integer), Some(&json!(2)));
        widget.set_text("3.7");
        assert_eq!(widget.extract(), Ok(json!(3)));
        widget.set_text("-1.5");
        assert_eq!(widget.extract(), Ok(json!(-1)));
        widget.set_text("4e0");
        assert_eq!(widget.extract(), Ok(json!(4)));

        widget.set_text("3.7");
        assert!(widget.step(1));
        assert_eq!(widget.text(), "4");
        assert!(widget.extract().unwrap().is_i64());
    }

    #[test]
    fn unparsable_number_is_retained_but_rejected() {
        let mut widget = render(&schema(DataType::Integer), Some(&json!(3)));
        widget.set_text("fast");
        assert_eq!(widget.text(), "fast");
        assert!(!widget.is_valid());
        assert_eq!(
            widget.extract(),
            Err(FieldError::NotANumber { param: "p".into(), text: "fast".into() })
        );
        widget.set_text("NaN");
        assert!(widget.extract().is_err());
    }

    #[test]
    fn bounds_are_soft() {
        let s = schema(DataType::Integer).with_bounds(Some(0.0), Some(10.0));
        let mut widget = render(&s, Some(&json!(5)));
        widget.set_text("15");
        assert!(widget.out_of_range());
        assert_eq!(widget.extract(), Ok(json!(15)));
    }

    #[test]
    fn stepping_clamps_to_bounds() {
        let s = schema(DataType::Integer).with_bounds(Some(0.0), Some(10.0));
        let mut widget = render(&s, Some(&json!(9)));
        assert!(widget.step(1));
        assert_eq!(widget.extract(), Ok(json!(10)));
        widget.step(1);
        assert_eq!(widget.extract(), Ok(json!(10)));

        let s = schema(DataType::Float).with_bounds(Some(0.0), Some(1.0));
        let mut widget = render(&s, Some(&json!(0.2)));
        widget.step(1);
        assert_eq!(widget.extract(), Ok(json!(0.3)));
        widget.set_text("junk");
        widget.step(-1);
        assert_eq!(widget.extract(), Ok(json!(0.0)));

        let mut text = render(&schema(DataType::String), None);
        assert!(!text.step(1));
    }

    #[test]
    fn toggle_flips_boolean() {
        let mut widget = render(&schema(DataType::Boolean), Some(&json!(false)));
        assert!(widget.toggle());
        assert_eq!(widget.extract(), Ok(json!(true)));
        widget.set_text("false");
        assert_eq!(widget.extract(), Ok(json!(false)));
        widget.set_text("maybe");
        assert_eq!(widget.extract(), Ok(json!(false)));
    }

    #[test]
    fn malformed_structured_input_is_rejected() {
        let mut widget = render(&schema(DataType::Object), Some(&json!({"a": 1})));
        widget.set_text("{\"a\": ");
        assert!(matches!(widget.extract(), Err(FieldError::MalformedInput { .. })));
        assert_eq!(widget.source(), &json!({"a": 1}));
    }

    #[test]
    fn unknown_tag_renders_as_structured_text() {
        let s = ParameterSchema::new("palette", DataType::from_wire("color_list"));
        let widget = render(&s, Some(&json!(["#f00", "#0f0"])));
        assert!(matches!(widget.input, FieldInput::Structured(_)));
        assert_eq!(widget.text(), r##"["#f00","#0f0"]"##);
    }
}
