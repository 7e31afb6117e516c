//! Change-tracking adapters between declarative child elements and the host
//! component that owns them.
//!
//! A host component exposes a nested configuration surface (axes, legends,
//! series and the like). Each nested object is fronted by a [`ComplexAdapter`]
//! that records property edits into a [`PropertyBag`] and tracks whether the
//! host has consumed them. Homogeneous lists of such objects are fronted by a
//! [`CollectionAdapter`] that mirrors an externally owned child set,
//! aggregates member dirty flags and rebuilds itself when members come and go.
//!
//! Adapters are driven through an explicit [`lifecycle`] state machine rather
//! than implicit framework callbacks: the host advances a [`Driver`] through
//! init, content and view phases, and the adapters update their flags at the
//! stages the state machine defines.

// Public modules
pub mod collection;
pub mod complex;
pub mod lifecycle;

// Internal modules
mod bag;
mod changes;
mod compat;
mod events;
mod fragment;
mod template;

pub use bag::PropertyBag;
pub use changes::{ChangeFlags, ChangeSet, ChildChange, PropertyChange};
pub use collection::{ChildQuery, CollectionAdapter, ComplexHandle, Membership, DATA_SOURCE_KEY};
pub use compat::{AdapterOptions, CompatMode};
pub use complex::{Accessor, ComplexAdapter, Manifest};
pub use events::{EventHandler, EventRegistry};
pub use fragment::{Fragment, FragmentHandle, WeakFragment};
pub use lifecycle::{Driver, Hooks, Lifecycle, LifecycleError, Stage};
pub use template::{TemplateRegistry, TemplateSink, ViewHandle};

// Re-export shared basic types.
pub use trellis_common::{Atom, Data, SharedValue, TemplateSlot, Value};
