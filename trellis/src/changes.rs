use std::collections::BTreeMap;
use trellis_common::{Atom, Value};

bitflags::bitflags! {
    /// What a reconciliation pass observed.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
    pub struct ChangeFlags: u32 {
        /// At least one tracked member carries unconsumed edits.
        const CHILDREN = 1 << 0;
        /// The member set itself changed cardinality.
        const STRUCTURE = 1 << 1;
        /// A member's data source was replaced.
        const SOURCE = 1 << 2;
    }
}

/// One edited property: the value before, the value now, and whether this is
/// the first time the property was ever assigned.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyChange {
    pub previous: Option<Value>,
    pub current: Value,
    pub first: bool,
}

impl PropertyChange {
    pub fn new(previous: Option<Value>, current: Value, first: bool) -> PropertyChange {
        PropertyChange { previous, current, first }
    }

    /// A first-time assignment with no prior value.
    pub fn initial(current: Value) -> PropertyChange {
        PropertyChange { previous: None, current, first: true }
    }

    pub fn from_previous(previous: Value, current: Value) -> PropertyChange {
        PropertyChange { previous: Some(previous), current, first: false }
    }
}

/// A batch of property edits delivered to an adapter in one pass.
///
/// An empty set is meaningful: it still marks the adapter dirty, because the
/// producer decided a pass happened even if nothing survived its own diffing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangeSet {
    changes: BTreeMap<Atom, PropertyChange>,
}

impl ChangeSet {
    pub fn new() -> ChangeSet {
        ChangeSet::default()
    }

    pub fn record(&mut self, name: impl Into<Atom>, change: PropertyChange) {
        self.changes.insert(name.into(), change);
    }

    /// Builder-style `record`.
    pub fn with(mut self, name: impl Into<Atom>, change: PropertyChange) -> ChangeSet {
        self.record(name, change);
        self
    }

    pub fn get(&self, name: &Atom) -> Option<&PropertyChange> {
        self.changes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Atom, &PropertyChange)> {
        self.changes.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// Edits addressed to one member of a collection.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildChange {
    pub index: usize,
    pub changes: ChangeSet,
}

impl ChildChange {
    pub fn new(index: usize, changes: ChangeSet) -> ChildChange {
        ChildChange { index, changes }
    }
}
