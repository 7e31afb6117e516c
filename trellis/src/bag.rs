use serde::Serialize;
use std::collections::BTreeMap;
use trellis_common::{Atom, Value};

/// Flat property storage keyed by dotted paths.
///
/// The bag is the adapter-side record of everything the declarative element
/// has set: bound properties, template slots and pulled child snapshots all
/// land here under their property paths. Keys iterate in string order, so a
/// serialized bag is stable across runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PropertyBag {
    entries: BTreeMap<Atom, Value>,
}

impl PropertyBag {
    pub fn new() -> PropertyBag {
        PropertyBag::default()
    }

    pub fn set(&mut self, name: impl Into<Atom>, value: Value) {
        self.entries.insert(name.into(), value);
    }

    pub fn get(&self, name: &Atom) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &Atom) -> bool {
        self.entries.contains_key(name)
    }

    pub fn remove(&mut self, name: &Atom) -> Option<Value> {
        self.entries.remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Atom, &Value)> {
        self.entries.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }

    /// Snapshots the bag as a map value, suitable for handing to an owner.
    pub fn to_value(&self) -> Value {
        Value::Map(self.entries.clone())
    }
}
