//! Adapter for a single nested configuration object.

use crate::{
    bag::PropertyBag,
    changes::ChangeSet,
    compat::AdapterOptions,
    events::{EventHandler, EventRegistry},
    fragment::{Fragment, FragmentHandle, WeakFragment},
    lifecycle::Hooks,
    template::{TemplateRegistry, TemplateSink},
};
use smallvec::SmallVec;
use std::{cell::RefCell, fmt, rc::Rc};
use trellis_common::{Atom, SharedValue, Value};

/// Reads the current value of a property off the declarative element.
///
/// Returns `None` when the element has no value for the property, in which
/// case nothing is written to the bag.
pub type Accessor = Box<dyn Fn() -> Option<Value>>;

type SourceAccessor = Box<dyn Fn() -> Option<SharedValue>>;

/// Declares the surface of a [`ComplexAdapter`]: its named children, template
/// properties, bound properties, events and data source.
///
/// The manifest replaces naming-convention reflection. Nothing is discovered
/// at runtime; an adapter tracks exactly what its manifest declares.
#[derive(Default)]
pub struct Manifest {
    children: Vec<(Atom, WeakFragment)>,
    templates: Vec<(Atom, Accessor)>,
    bound: Vec<(Atom, Accessor)>,
    events: Vec<Atom>,
    source: Option<SourceAccessor>,
}

impl Manifest {
    pub fn new() -> Manifest {
        Manifest::default()
    }

    /// Declares a named child fragment. The adapter holds it weakly.
    pub fn child(mut self, name: impl Into<Atom>, fragment: &FragmentHandle) -> Manifest {
        self.children.push((name.into(), Rc::downgrade(fragment)));
        self
    }

    /// Declares a template property read through `accessor`.
    pub fn template(
        mut self,
        path: impl Into<Atom>,
        accessor: impl Fn() -> Option<Value> + 'static,
    ) -> Manifest {
        self.templates.push((path.into(), Box::new(accessor)));
        self
    }

    /// Declares a bound property read through `accessor`.
    pub fn bound(
        mut self,
        name: impl Into<Atom>,
        accessor: impl Fn() -> Option<Value> + 'static,
    ) -> Manifest {
        self.bound.push((name.into(), Box::new(accessor)));
        self
    }

    /// Declares an event output.
    pub fn event(mut self, name: impl Into<Atom>) -> Manifest {
        self.events.push(name.into());
        self
    }

    /// Declares the element's live data source.
    pub fn source(mut self, accessor: impl Fn() -> Option<SharedValue> + 'static) -> Manifest {
        self.source = Some(Box::new(accessor));
        self
    }
}

struct ChildTag {
    name: Atom,
    fragment: WeakFragment,
}

/// Records property edits from one declarative child element and tracks
/// whether the owning component has consumed them.
///
/// `dirty` means "the owner has not consumed the latest edits", `updated`
/// means "the owner acknowledged the current state". A dirty adapter stays
/// dirty across view checks until the owner marks it updated.
pub struct ComplexAdapter {
    label: Option<Atom>,
    index: Option<usize>,
    bag: PropertyBag,
    dirty: bool,
    updated: bool,
    tags: SmallVec<[ChildTag; 4]>,
    manifest: Manifest,
    templates: TemplateRegistry,
    events: EventRegistry,
    options: AdapterOptions,
}

impl ComplexAdapter {
    pub fn new(manifest: Manifest) -> ComplexAdapter {
        ComplexAdapter::with_options(manifest, AdapterOptions::default())
    }

    pub fn with_options(manifest: Manifest, options: AdapterOptions) -> ComplexAdapter {
        ComplexAdapter {
            label: None,
            index: None,
            bag: PropertyBag::new(),
            dirty: false,
            updated: false,
            tags: SmallVec::new(),
            manifest,
            templates: TemplateRegistry::new(),
            events: EventRegistry::new(),
            options,
        }
    }

    /// Wraps the adapter for shared ownership.
    pub fn handle(self) -> Rc<RefCell<ComplexAdapter>> {
        Rc::new(RefCell::new(self))
    }

    /// Records manifest children, seeds template properties and declares
    /// events. In [`CompatMode::LegacySeed`](crate::CompatMode) also copies
    /// bound properties into the bag and marks the adapter dirty.
    pub fn initialize(&mut self) {
        self.tags.clear();
        for (name, fragment) in &self.manifest.children {
            self.tags.push(ChildTag { name: name.clone(), fragment: fragment.clone() });
        }
        self.seed_templates();
        if self.options.compat.seeds_bound_properties() {
            for (name, accessor) in &self.manifest.bound {
                if let Some(value) = accessor() {
                    self.bag.set(name.clone(), value);
                }
            }
            self.dirty = true;
        }
        self.events.declare_all(self.manifest.events.iter().cloned());
    }

    /// Copies a batch of edits into the bag.
    ///
    /// An empty batch still flips the flags: the producer decided a pass
    /// happened, so any prior acknowledgement is void.
    pub fn apply_changes(&mut self, changes: &ChangeSet) {
        for (name, change) in changes.iter() {
            self.bag.set(name.clone(), change.current.clone());
        }
        self.updated = false;
        self.dirty = true;
    }

    /// Pulls child snapshots into the bag and returns it.
    pub fn properties(&mut self) -> &PropertyBag {
        self.pull_children();
        &self.bag
    }

    /// Whether this adapter or any live named child carries unconsumed edits.
    pub fn is_changed(&self) -> bool {
        self.dirty
            || self.tags.iter().any(|tag| {
                tag.fragment.upgrade().map_or(false, |fragment| fragment.borrow().has_changes())
            })
    }

    /// Acknowledges the current state. The dirty flag clears at the next view
    /// check.
    pub fn mark_updated(&mut self) {
        self.updated = true;
    }

    pub fn clear_templates(&mut self, names: &[Atom], sink: &mut dyn TemplateSink) {
        self.templates.clear_into(names, sink);
    }

    pub fn subscribe(&mut self, name: &Atom, handler: EventHandler) -> bool {
        self.events.subscribe(name, handler)
    }

    pub fn emit(&mut self, name: &Atom, payload: &Value) -> bool {
        self.events.emit(name, payload)
    }

    pub fn has_changes(&self) -> bool {
        self.dirty
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn label(&self) -> Option<&Atom> {
        self.label.as_ref()
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn templates_mut(&mut self) -> &mut TemplateRegistry {
        &mut self.templates
    }

    pub(crate) fn bag(&self) -> &PropertyBag {
        &self.bag
    }

    pub(crate) fn bag_mut(&mut self) -> &mut PropertyBag {
        &mut self.bag
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_index(&mut self, index: Option<usize>) {
        self.index = index;
    }

    pub(crate) fn set_label(&mut self, label: Option<Atom>) {
        self.label = label;
    }

    pub(crate) fn live_source(&self) -> Option<SharedValue> {
        self.manifest.source.as_ref().and_then(|accessor| accessor())
    }

    fn seed_templates(&mut self) {
        for (path, accessor) in &self.manifest.templates {
            if let Some(value) = accessor() {
                self.bag.set(path.clone(), value);
            }
        }
    }

    fn pull_children(&mut self) {
        for tag in &self.tags {
            if let Some(fragment) = tag.fragment.upgrade() {
                self.bag.set(tag.name.clone(), fragment.borrow_mut().properties());
            }
        }
    }
}

impl Hooks for ComplexAdapter {
    fn on_init(&mut self) {
        self.initialize();
    }

    fn on_changes(&mut self, changes: &ChangeSet) {
        self.apply_changes(changes);
    }

    fn after_content_checked(&mut self) {
        self.dirty = self.is_changed();
        self.seed_templates();
    }

    fn after_view_checked(&mut self) {
        if self.updated {
            self.updated = false;
            self.dirty = false;
        }
    }
}

impl Fragment for ComplexAdapter {
    fn has_changes(&self) -> bool {
        self.dirty
    }

    fn properties(&mut self) -> Value {
        ComplexAdapter::properties(self).to_value()
    }

    fn clear_templates(&mut self, names: &[Atom], sink: &mut dyn TemplateSink) {
        ComplexAdapter::clear_templates(self, names, sink);
    }

    fn is_init_changes(&self) -> bool {
        false
    }
}

impl fmt::Debug for ComplexAdapter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ComplexAdapter")
            .field("label", &self.label)
            .field("index", &self.index)
            .field("dirty", &self.dirty)
            .field("updated", &self.updated)
            .field("bag", &self.bag)
            .finish_non_exhaustive()
    }
}
