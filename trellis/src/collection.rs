//! Adapter for an ordered list of nested configuration objects.

use crate::{
    changes::{ChangeFlags, ChildChange},
    complex::ComplexAdapter,
    fragment::Fragment,
    lifecycle::Hooks,
    template::TemplateSink,
};
use std::{cell::RefCell, fmt, rc::Rc};
use tracing::{trace, warn};
use trellis_common::{Atom, Data, Value};

/// Shared ownership of a collection member.
pub type ComplexHandle = Rc<RefCell<ComplexAdapter>>;

/// Bag key under which a member records its data source.
pub const DATA_SOURCE_KEY: &str = "data_source";

/// The host-owned, externally mutated set of child adapters.
///
/// The collection never owns membership; it snapshots this query on every
/// reconciliation and mirrors whatever the host currently projects.
#[derive(Clone, Debug, Default)]
pub struct ChildQuery {
    items: Rc<RefCell<Vec<ComplexHandle>>>,
}

impl ChildQuery {
    pub fn new() -> ChildQuery {
        ChildQuery::default()
    }

    pub fn set(&self, items: Vec<ComplexHandle>) {
        *self.items.borrow_mut() = items;
    }

    pub fn push(&self, item: ComplexHandle) {
        self.items.borrow_mut().push(item);
    }

    pub fn snapshot(&self) -> Vec<ComplexHandle> {
        self.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

/// Outcome of the last membership comparison.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Membership {
    /// No reconciliation ran yet.
    #[default]
    NotTracked,
    /// The member set was rebuilt this pass.
    Changed,
    /// The member set was compared and left alone.
    Unchanged,
}

/// Mirrors an externally owned child set and aggregates member dirty flags.
///
/// Members are tracked positionally. A cardinality change or a data source
/// swap rebuilds the tracked list from the query, reassigning indices and the
/// shared property label from scratch.
pub struct CollectionAdapter {
    label: Atom,
    children: ChildQuery,
    entries: Vec<ComplexHandle>,
    dirty: bool,
    init_changes: bool,
    membership: Membership,
}

impl CollectionAdapter {
    pub fn new(label: impl Into<Atom>, children: ChildQuery) -> CollectionAdapter {
        CollectionAdapter {
            label: label.into(),
            children,
            entries: Vec::new(),
            dirty: false,
            init_changes: false,
            membership: Membership::NotTracked,
        }
    }

    /// Wraps the adapter for shared ownership.
    pub fn handle(self) -> Rc<RefCell<CollectionAdapter>> {
        Rc::new(RefCell::new(self))
    }

    /// Compares the tracked list against the current query.
    ///
    /// With unchanged cardinality, each member's live data source is compared
    /// by identity against its recorded one; a replaced source is written
    /// back and the member marked dirty. Members without a data source force
    /// a rebuild while they still hold pending templates, since their views
    /// cannot be reused until the host resolves them. A cardinality change or
    /// a serialized source mismatch rebuilds the list from the query.
    pub fn reconcile(&mut self) -> ChangeFlags {
        let query = self.children.snapshot();
        let mut flags = ChangeFlags::empty();
        let resized = query.len() != self.entries.len();
        let mut source_changed = false;
        if !resized {
            let key = Atom::from(DATA_SOURCE_KEY);
            for (entry, queried) in self.entries.iter().zip(query.iter()) {
                let mut member = entry.borrow_mut();
                if member.bag().contains(&key) {
                    if let Some(live) = member.live_source() {
                        let live = Value::from(live);
                        let replaced =
                            member.bag().get(&key).map_or(true, |recorded| !recorded.same(&live));
                        if replaced {
                            member.bag_mut().set(key.clone(), live);
                            member.mark_dirty();
                        }
                    }
                    if !Rc::ptr_eq(entry, queried) {
                        let recorded = member.bag().get(&key).and_then(serialized);
                        let incoming = queried.borrow().bag().get(&key).and_then(serialized);
                        if recorded != incoming {
                            source_changed = true;
                        }
                    }
                } else if member.bag().values().any(Value::is_pending_template) {
                    source_changed = true;
                }
            }
        }
        if resized || source_changed {
            if resized {
                flags |= ChangeFlags::STRUCTURE;
            }
            if source_changed {
                flags |= ChangeFlags::SOURCE;
            }
            self.membership = Membership::Changed;
            trace!(
                "rebuilding {} collection, {} -> {} members",
                self.label,
                self.entries.len(),
                query.len()
            );
            self.adopt(query);
        } else {
            self.membership = Membership::Unchanged;
        }
        if self.entries.iter().any(|entry| entry.borrow().has_changes()) {
            flags |= ChangeFlags::CHILDREN;
        }
        flags
    }

    /// Reconciles and reports whether any tracked member carries unconsumed
    /// edits. An empty collection never reports changes.
    pub fn is_changed(&mut self) -> bool {
        let flags = self.reconcile();
        !self.entries.is_empty() && flags.contains(ChangeFlags::CHILDREN)
    }

    /// Routes a change batch to the member at its index.
    pub fn deliver(&mut self, change: &ChildChange) {
        match self.entries.get(change.index) {
            Some(entry) => entry.borrow_mut().apply_changes(&change.changes),
            None => warn!(
                "dropped change batch for {}[{}], only {} members tracked",
                self.label,
                change.index,
                self.entries.len()
            ),
        }
    }

    /// Snapshots every member's properties, in tracked order.
    pub fn properties(&mut self) -> Vec<Value> {
        self.entries.iter().map(|entry| entry.borrow_mut().properties().to_value()).collect()
    }

    /// Tears down member views for the named templates.
    ///
    /// Owner-relative names like `"series.tooltip"` are rewritten to the
    /// member-relative `"tooltip"` before delegating; names without the
    /// collection's label prefix pass through unchanged.
    pub fn clear_templates(&mut self, names: &[Atom], sink: &mut dyn TemplateSink) {
        let member_names: Vec<Atom> = names
            .iter()
            .map(|name| name.strip_prefix(&self.label).unwrap_or_else(|| name.clone()))
            .collect();
        for entry in &self.entries {
            entry.borrow_mut().clear_templates(&member_names, sink);
        }
    }

    pub fn has_changes(&self) -> bool {
        self.dirty
    }

    pub fn membership(&self) -> Membership {
        self.membership
    }

    pub fn label(&self) -> &Atom {
        &self.label
    }

    pub fn members(&self) -> &[ComplexHandle] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn adopt(&mut self, members: Vec<ComplexHandle>) {
        self.entries = members;
        for (index, entry) in self.entries.iter().enumerate() {
            let mut member = entry.borrow_mut();
            member.set_index(Some(index));
            member.set_label(Some(self.label.clone()));
        }
    }
}

fn serialized(value: &Value) -> Option<String> {
    serde_json::to_string(value).ok()
}

impl Hooks for CollectionAdapter {
    fn on_init(&mut self) {
        self.init_changes = true;
    }

    fn after_content_init(&mut self) {
        let members = self.children.snapshot();
        self.adopt(members);
        self.dirty = true;
    }

    fn after_content_checked(&mut self) {
        self.dirty = self.is_changed();
        for entry in &self.entries {
            entry.borrow_mut().mark_updated();
        }
    }

    fn after_view_init(&mut self) {
        self.init_changes = false;
    }
}

impl Fragment for CollectionAdapter {
    fn has_changes(&self) -> bool {
        self.dirty
    }

    fn properties(&mut self) -> Value {
        Value::List(CollectionAdapter::properties(self))
    }

    fn clear_templates(&mut self, names: &[Atom], sink: &mut dyn TemplateSink) {
        CollectionAdapter::clear_templates(self, names, sink);
    }

    fn is_init_changes(&self) -> bool {
        self.init_changes
    }
}

impl fmt::Debug for CollectionAdapter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CollectionAdapter")
            .field("label", &self.label)
            .field("members", &self.entries.len())
            .field("dirty", &self.dirty)
            .field("membership", &self.membership)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{ChildQuery, CollectionAdapter, ComplexHandle, Membership, DATA_SOURCE_KEY};
    use crate::{
        changes::{ChangeFlags, ChangeSet, ChildChange, PropertyChange},
        complex::{ComplexAdapter, Manifest},
        fragment::Fragment,
        lifecycle::Hooks,
        template::{TemplateSink, ViewHandle},
    };
    use std::{cell::RefCell, rc::Rc, sync::Arc};
    use trellis_common::{Atom, Data, SharedValue, Value};

    fn plain_member() -> ComplexHandle {
        ComplexAdapter::new(Manifest::new()).handle()
    }

    fn query_of(members: &[ComplexHandle]) -> ChildQuery {
        let query = ChildQuery::new();
        query.set(members.to_vec());
        query
    }

    fn acknowledge(member: &ComplexHandle) {
        let mut member = member.borrow_mut();
        member.mark_updated();
        member.after_view_checked();
    }

    #[test]
    fn content_init_assigns_indices_and_label() {
        let members = vec![plain_member(), plain_member(), plain_member()];
        let mut collection = CollectionAdapter::new("series", query_of(&members));
        collection.on_init();
        collection.after_content_init();

        assert!(collection.has_changes());
        assert!(collection.is_init_changes());
        for (expected, member) in members.iter().enumerate() {
            let member = member.borrow();
            assert_eq!(member.index(), Some(expected));
            assert_eq!(member.label(), Some(&Atom::from("series")));
        }
        collection.after_view_init();
        assert!(!collection.is_init_changes());
    }

    #[test]
    fn empty_collection_never_reports_changes() {
        let mut collection = CollectionAdapter::new("series", ChildQuery::new());
        collection.after_content_init();
        assert!(!collection.is_changed());
        assert_eq!(collection.membership(), Membership::Unchanged);
    }

    #[test]
    fn member_edits_aggregate_into_children_flag() {
        let members = vec![plain_member(), plain_member(), plain_member()];
        let mut collection = CollectionAdapter::new("series", query_of(&members));
        collection.after_content_init();
        assert!(!collection.is_changed());

        members[1].borrow_mut().apply_changes(
            &ChangeSet::new().with("width", PropertyChange::initial(Value::from(2))),
        );
        let flags = collection.reconcile();
        assert!(flags.contains(ChangeFlags::CHILDREN));
        assert!(!flags.contains(ChangeFlags::STRUCTURE));
        assert!(collection.is_changed());
    }

    #[test]
    fn shrinking_the_query_rebuilds_with_fresh_indices() {
        let members = vec![plain_member(), plain_member(), plain_member()];
        let query = query_of(&members);
        let mut collection = CollectionAdapter::new("series", query.clone());
        collection.after_content_init();
        assert_eq!(collection.len(), 3);

        query.set(vec![members[0].clone(), members[2].clone()]);
        let flags = collection.reconcile();
        assert!(flags.contains(ChangeFlags::STRUCTURE));
        assert_eq!(collection.membership(), Membership::Changed);
        assert_eq!(collection.len(), 2);
        assert_eq!(members[0].borrow().index(), Some(0));
        assert_eq!(members[2].borrow().index(), Some(1));
    }

    #[test]
    fn replaced_data_source_is_recorded_and_marks_the_member_dirty() {
        let first: SharedValue = Arc::new(Value::List(vec![Value::from(1)]));
        let slot = Rc::new(RefCell::new(Some(first.clone())));
        let reader = slot.clone();
        let member =
            ComplexAdapter::new(Manifest::new().source(move || reader.borrow().clone())).handle();
        member.borrow_mut().apply_changes(
            &ChangeSet::new()
                .with(DATA_SOURCE_KEY, PropertyChange::initial(Value::Shared(first))),
        );
        acknowledge(&member);
        assert!(!member.borrow().has_changes());

        let mut collection = CollectionAdapter::new("series", query_of(&[member.clone()]));
        collection.after_content_init();
        assert!(!collection.is_changed());
        assert_eq!(collection.membership(), Membership::Unchanged);

        let second: SharedValue = Arc::new(Value::List(vec![Value::from(2)]));
        *slot.borrow_mut() = Some(second.clone());
        let flags = collection.reconcile();
        assert!(flags.contains(ChangeFlags::CHILDREN));
        assert!(member.borrow().has_changes());
        let member = member.borrow();
        let recorded = member.bag().get(&Atom::from(DATA_SOURCE_KEY)).unwrap();
        assert!(recorded.same(&Value::Shared(second)));
    }

    #[test]
    fn pending_templates_force_a_rebuild() {
        let member = plain_member();
        member.borrow_mut().apply_changes(
            &ChangeSet::new()
                .with("tooltip", PropertyChange::initial(Value::pending_template("tooltip"))),
        );
        acknowledge(&member);

        let mut collection = CollectionAdapter::new("series", query_of(&[member.clone()]));
        collection.after_content_init();
        let flags = collection.reconcile();
        assert!(flags.contains(ChangeFlags::SOURCE));
        assert_eq!(collection.membership(), Membership::Changed);

        // once resolved, the member stops forcing rebuilds
        member.borrow_mut().apply_changes(
            &ChangeSet::new()
                .with("tooltip", PropertyChange::initial(Value::resolved_template("tooltip"))),
        );
        acknowledge(&member);
        let flags = collection.reconcile();
        assert!(!flags.contains(ChangeFlags::SOURCE));
        assert_eq!(collection.membership(), Membership::Unchanged);
    }

    #[derive(Default)]
    struct CollectingSink {
        cleared: Vec<Atom>,
    }

    impl TemplateSink for CollectingSink {
        fn clear(&mut self, name: &Atom, _views: &[ViewHandle]) {
            self.cleared.push(name.clone());
        }
    }

    #[test]
    fn clear_templates_strips_the_collection_label() {
        let member = plain_member();
        member.borrow_mut().templates_mut().register("tooltip", ViewHandle::new(1));
        let mut collection = CollectionAdapter::new("series", query_of(&[member]));
        collection.after_content_init();

        let mut sink = CollectingSink::default();
        collection.clear_templates(&[Atom::from("series.tooltip")], &mut sink);
        assert_eq!(sink.cleared, vec![Atom::from("tooltip")]);
    }

    #[test]
    fn deliver_routes_by_index() {
        let members = vec![plain_member(), plain_member()];
        let mut collection = CollectionAdapter::new("series", query_of(&members));
        collection.after_content_init();

        collection.deliver(&ChildChange::new(
            1,
            ChangeSet::new().with("width", PropertyChange::initial(Value::from(7))),
        ));
        assert!(!members[0].borrow().has_changes());
        assert!(members[1].borrow().has_changes());
        assert_eq!(members[1].borrow().bag().get(&Atom::from("width")), Some(&Value::from(7)));

        // out of range batches are dropped
        collection.deliver(&ChildChange::new(5, ChangeSet::new()));
    }

    #[test]
    fn content_check_acknowledges_members() {
        let member = plain_member();
        member.borrow_mut().apply_changes(
            &ChangeSet::new().with("width", PropertyChange::initial(Value::from(1))),
        );
        let mut collection = CollectionAdapter::new("series", query_of(&[member.clone()]));
        collection.after_content_init();

        collection.after_content_checked();
        assert!(collection.has_changes());
        // the member was acknowledged, so its next view check clears it
        member.borrow_mut().after_view_checked();
        assert!(!member.borrow().has_changes());
        collection.after_content_checked();
        assert!(!collection.has_changes());
    }

    #[test]
    fn properties_snapshots_members_in_order() {
        let members = vec![plain_member(), plain_member()];
        members[0].borrow_mut().apply_changes(
            &ChangeSet::new().with("name", PropertyChange::initial(Value::from("a"))),
        );
        members[1].borrow_mut().apply_changes(
            &ChangeSet::new().with("name", PropertyChange::initial(Value::from("b"))),
        );
        let mut collection = CollectionAdapter::new("series", query_of(&members));
        collection.after_content_init();

        let json = serde_json::to_string(&Value::List(collection.properties())).unwrap();
        assert_eq!(json, r#"[{"name":"a"},{"name":"b"}]"#);
    }
}
