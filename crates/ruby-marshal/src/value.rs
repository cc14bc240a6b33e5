//! [`Value`] — the decoded value tree.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

/// A decoded marshal value.
///
/// Back-references in the stream are resolved while decoding. A tagged object
/// that is linked to more than once is shared: every occurrence holds the same
/// [`Arc`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Integer(i64),
    /// IEEE double, including the infinities and NaN.
    Float(f64),
    Str(String),
    Symbol(String),
    Array(Vec<Value>),
    /// Ordered key-value pairs. Keys are unique: a repeated key in the input
    /// overwrites the earlier entry's value in place.
    Map(Vec<(Value, Value)>),
    Object(Arc<MarshalObject>),
    UserDefined(Box<UserDefined>),
}

/// A tagged object: a class name and its instance variables, with the `@`
/// sigil stripped from each property name.
#[derive(Debug, Clone, PartialEq)]
pub struct MarshalObject {
    pub classname: Value,
    pub properties: IndexMap<String, Value>,
}

/// A class-specific payload that the decoder does not interpret.
#[derive(Debug, Clone, PartialEq)]
pub struct UserDefined {
    pub classname: Value,
    pub data: Vec<u8>,
}

impl Value {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns the text of a `Str` or `Symbol`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Symbol(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Looks up a map entry by key.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        match self {
            Value::Map(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Looks up a tagged-object property by name (without the sigil).
    pub fn property(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(obj) => obj.properties.get(name),
            _ => None,
        }
    }
}

/// Hashable form of the scalar keys a map can hold.
#[derive(Debug, PartialEq, Eq, Hash)]
enum ScalarKey {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(u64),
    Str(String),
    Symbol(String),
}

impl ScalarKey {
    /// `None` for composite keys and NaN, which never equals an earlier key.
    fn of(key: &Value) -> Option<ScalarKey> {
        Some(match key {
            Value::Nil => ScalarKey::Nil,
            Value::Bool(b) => ScalarKey::Bool(*b),
            Value::Integer(i) => ScalarKey::Integer(*i),
            Value::Float(f) if f.is_nan() => return None,
            // -0.0 == 0.0
            Value::Float(f) if *f == 0.0 => ScalarKey::Float(0),
            Value::Float(f) => ScalarKey::Float(f.to_bits()),
            Value::Str(s) => ScalarKey::Str(s.clone()),
            Value::Symbol(s) => ScalarKey::Symbol(s.clone()),
            _ => return None,
        })
    }
}

/// Accumulates map entries in input order. A repeated key overwrites the
/// earlier entry's value in place.
#[derive(Debug, Default)]
pub(crate) struct MapBuilder {
    pairs: Vec<(Value, Value)>,
    scalars: HashMap<ScalarKey, usize>,
    composites: Vec<usize>,
}

impl MapBuilder {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(capacity),
            scalars: HashMap::with_capacity(capacity),
            composites: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, key: Value, value: Value) {
        let next = self.pairs.len();
        match ScalarKey::of(&key) {
            Some(scalar) => match self.scalars.get(&scalar) {
                Some(&slot) => self.pairs[slot].1 = value,
                None => {
                    self.scalars.insert(scalar, next);
                    self.pairs.push((key, value));
                }
            },
            None if matches!(key, Value::Float(_)) => self.pairs.push((key, value)),
            None => {
                let found = self.composites.iter().copied().find(|&slot| self.pairs[slot].0 == key);
                match found {
                    Some(slot) => self.pairs[slot].1 = value,
                    None => {
                        self.composites.push(next);
                        self.pairs.push((key, value));
                    }
                }
            }
        }
    }

    pub(crate) fn finish(self) -> Value {
        Value::Map(self.pairs)
    }
}
