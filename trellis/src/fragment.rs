use crate::template::TemplateSink;
use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};
use trellis_common::{Atom, Value};

/// Shared ownership of a tracked child.
pub type FragmentHandle = Rc<RefCell<dyn Fragment>>;

/// Non-owning reference to a tracked child.
///
/// Owners hold their named children weakly so that dropping the child set
/// does not leak through the parent's tag list.
pub type WeakFragment = Weak<RefCell<dyn Fragment>>;

/// A tracked child as seen by its owner.
///
/// Both adapter kinds implement this, so a complex adapter can own nested
/// complex children and a collection can own complex members through the same
/// interface.
pub trait Fragment {
    /// Whether this child carries edits its owner has not consumed.
    ///
    /// Reads the stored flag, it does not re-derive from descendants.
    fn has_changes(&self) -> bool;

    /// Snapshots the child's current properties.
    fn properties(&mut self) -> Value;

    /// Tears down views for the named templates through `sink`.
    fn clear_templates(&mut self, names: &[Atom], sink: &mut dyn TemplateSink);

    /// Whether the child is still inside its initial change window.
    fn is_init_changes(&self) -> bool;
}
