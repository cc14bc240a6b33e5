//! Back-reference tables for symbols and objects.
//!
//! Both tables are append-only and indexed from 0 in the order entries were
//! recorded during the decode. Objects are held behind [`Arc`], so resolving
//! a link shares the registered object instead of copying it.

use std::sync::Arc;

use crate::error::{MarshalError, RefKind};
use crate::value::{MarshalObject, Value};

#[derive(Debug, Default, Clone)]
pub struct RefTables {
    symbols: Vec<String>,
    objects: Vec<Arc<MarshalObject>>,
}

impl RefTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a symbol literal and returns it as a value.
    pub fn intern_symbol(&mut self, text: String) -> Value {
        self.symbols.push(text.clone());
        Value::Symbol(text)
    }

    pub fn resolve_symbol(&self, index: i64) -> Result<Value, MarshalError> {
        lookup(&self.symbols, index)
            .map(|s| Value::Symbol(s.clone()))
            .ok_or(MarshalError::BadReference {
                kind: RefKind::Symbol,
                index,
            })
    }

    pub fn register_object(&mut self, object: Arc<MarshalObject>) {
        self.objects.push(object);
    }

    pub fn resolve_object(&self, index: i64) -> Result<Value, MarshalError> {
        lookup(&self.objects, index)
            .map(|object| Value::Object(Arc::clone(object)))
            .ok_or(MarshalError::BadReference {
                kind: RefKind::Object,
                index,
            })
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

fn lookup<T>(table: &[T], index: i64) -> Option<&T> {
    usize::try_from(index).ok().and_then(|i| table.get(i))
}
