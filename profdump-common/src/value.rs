//! String form of typed attribute values.
//!
//! Attribute values arrive as [`AnyValue`] but every report shows them as
//! text. Scalars render the way OTLP SDKs print them; composite values
//! (arrays, key/value lists) render as compact JSON with keys sorted.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Number, Value as JsonValue};

use crate::proto::any_value::Value;
use crate::proto::AnyValue;

impl AnyValue {
    /// Render this value as display text.
    ///
    /// An `AnyValue` with no value set renders as the empty string.
    #[must_use]
    pub fn as_display_string(&self) -> String {
        match &self.value {
            None => String::new(),
            Some(Value::StringValue(s)) => s.clone(),
            Some(Value::BoolValue(b)) => b.to_string(),
            Some(Value::IntValue(i)) => i.to_string(),
            Some(Value::DoubleValue(d)) => format_double(*d),
            Some(Value::BytesValue(bytes)) => STANDARD.encode(bytes),
            Some(Value::ArrayValue(_) | Value::KvlistValue(_)) => to_json(self).to_string(),
        }
    }
}

/// Render an optional value, treating `None` like an unset value.
#[must_use]
pub fn display_value(value: Option<&AnyValue>) -> String {
    value.map(AnyValue::as_display_string).unwrap_or_default()
}

fn format_double(d: f64) -> String {
    if d.is_nan() {
        "NaN".to_string()
    } else if d.is_infinite() {
        let sign = if d > 0.0 { '+' } else { '-' };
        format!("{sign}Inf")
    } else if d.abs() > 0.0 && (d.abs() < 1e-6 || d.abs() >= 1e21) {
        // ES6 number-to-string: exponent form outside [1e-6, 1e21), signed exponent
        let formatted = format!("{d:e}");
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{mantissa}e+{exponent}"),
            _ => formatted,
        }
    } else {
        d.to_string()
    }
}

fn to_json(value: &AnyValue) -> JsonValue {
    match &value.value {
        None => JsonValue::Null,
        Some(Value::StringValue(s)) => JsonValue::String(s.clone()),
        Some(Value::BoolValue(b)) => JsonValue::Bool(*b),
        Some(Value::IntValue(i)) => JsonValue::Number((*i).into()),
        Some(Value::DoubleValue(d)) => {
            Number::from_f64(*d).map_or_else(|| JsonValue::String(format_double(*d)), JsonValue::Number)
        }
        Some(Value::BytesValue(bytes)) => JsonValue::String(STANDARD.encode(bytes)),
        Some(Value::ArrayValue(array)) => JsonValue::Array(array.values.iter().map(to_json).collect()),
        Some(Value::KvlistValue(list)) => {
            let mut map = Map::new();
            for kv in &list.values {
                map.insert(kv.key.clone(), kv.value.as_ref().map_or(JsonValue::Null, to_json));
            }
            JsonValue::Object(map)
        }
    }
}
