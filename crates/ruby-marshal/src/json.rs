//! Projection of a decoded [`Value`] onto `serde_json::Value`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Number};

use crate::value::Value;

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        serde_json::Value::from(&v)
    }
}

/// Shared objects are written out in full at every position they occupy.
impl From<&Value> for serde_json::Value {
    fn from(v: &Value) -> Self {
        match v {
            Value::Nil => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            // Non-finite floats have no JSON representation.
            Value::Float(f) => Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) | Value::Symbol(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Map(pairs) => {
                let mut map = Map::with_capacity(pairs.len());
                for (k, v) in pairs {
                    map.insert(json_key(k), serde_json::Value::from(v));
                }
                serde_json::Value::Object(map)
            }
            Value::Object(obj) => {
                let mut map = Map::with_capacity(obj.properties.len() + 1);
                map.insert("classname".into(), serde_json::Value::from(&obj.classname));
                for (k, v) in &obj.properties {
                    map.insert(k.clone(), serde_json::Value::from(v));
                }
                serde_json::Value::Object(map)
            }
            Value::UserDefined(ud) => {
                let mut map = Map::with_capacity(2);
                map.insert("classname".into(), serde_json::Value::from(&ud.classname));
                map.insert(
                    "data".into(),
                    serde_json::Value::String(STANDARD.encode(&ud.data)),
                );
                serde_json::Value::Object(map)
            }
        }
    }
}

/// Turns a map key into a JSON object key. Text keys are used verbatim,
/// anything else by its compact JSON text.
fn json_key(key: &Value) -> String {
    match key {
        Value::Str(s) | Value::Symbol(s) => s.clone(),
        other => serde_json::Value::from(other).to_string(),
    }
}
