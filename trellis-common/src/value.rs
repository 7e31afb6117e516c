use crate::{Atom, Data};
use serde::Serialize;
use std::{collections::BTreeMap, sync::Arc};

/// A payload tracked by identity rather than by value.
///
/// Data sources are typically large, host-owned collections; adapters record
/// the handle and detect replacement by pointer identity (`Data::same`).
pub type SharedValue = Arc<Value>;

/// A template reference, tagged by the producer.
///
/// A slot is `Pending` until the host has resolved the referenced template
/// into an actual view, and `Resolved` afterwards. Consumers never infer the
/// state from anything but this tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "template", content = "name", rename_all = "snake_case")]
pub enum TemplateSlot {
    Pending(Atom),
    Resolved(Atom),
}

impl TemplateSlot {
    pub fn name(&self) -> &Atom {
        match self {
            TemplateSlot::Pending(name) | TemplateSlot::Resolved(name) => name,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TemplateSlot::Pending(_))
    }

    /// Marks the slot resolved, keeping its name.
    pub fn resolve(&mut self) {
        if let TemplateSlot::Pending(name) = self {
            *self = TemplateSlot::Resolved(name.clone());
        }
    }
}

/// Property values exchanged between declarative children and their owner.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<Atom, Value>),
    /// Identity-tracked payload (see [`SharedValue`]). Serializes as its content.
    Shared(SharedValue),
    /// Tagged template reference (see [`TemplateSlot`]).
    Template(TemplateSlot),
}

impl Value {
    /// Wraps a value in an identity-tracked handle.
    pub fn shared(value: Value) -> Value {
        Value::Shared(Arc::new(value))
    }

    pub fn pending_template(name: impl Into<Atom>) -> Value {
        Value::Template(TemplateSlot::Pending(name.into()))
    }

    pub fn resolved_template(name: impl Into<Atom>) -> Value {
        Value::Template(TemplateSlot::Resolved(name.into()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_pending_template(&self) -> bool {
        matches!(self, Value::Template(slot) if slot.is_pending())
    }

    pub fn as_template(&self) -> Option<&TemplateSlot> {
        match self {
            Value::Template(slot) => Some(slot),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl Data for Value {
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Shared(a), Value::Shared(b)) => Arc::ptr_eq(a, b),
            _ => self == other,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<BTreeMap<Atom, Value>> for Value {
    fn from(v: BTreeMap<Atom, Value>) -> Self {
        Value::Map(v)
    }
}

impl From<SharedValue> for Value {
    fn from(v: SharedValue) -> Self {
        Value::Shared(v)
    }
}
