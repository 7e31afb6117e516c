use std::collections::HashMap;
use trellis_common::Atom;

/// Opaque handle to a host-instantiated view.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ViewHandle(u64);

impl ViewHandle {
    pub fn new(id: u64) -> ViewHandle {
        ViewHandle(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Receives view handles that should be torn down.
pub trait TemplateSink {
    fn clear(&mut self, name: &Atom, views: &[ViewHandle]);
}

/// Tracks which views were instantiated for which template property.
///
/// When a member is about to be dropped, the registry hands the views for the
/// named templates back to the host through a [`TemplateSink`] so they can be
/// destroyed before the member goes away.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    registered: HashMap<Atom, Vec<ViewHandle>>,
}

impl TemplateRegistry {
    pub fn new() -> TemplateRegistry {
        TemplateRegistry::default()
    }

    pub fn register(&mut self, name: impl Into<Atom>, view: ViewHandle) {
        self.registered.entry(name.into()).or_default().push(view);
    }

    pub fn registered(&self, name: &Atom) -> &[ViewHandle] {
        self.registered.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn names(&self) -> impl Iterator<Item = &Atom> {
        self.registered.keys()
    }

    pub fn reset(&mut self) {
        self.registered.clear();
    }

    /// Drains the views registered under `names` into `sink`.
    ///
    /// Names with no registered views are ignored, so callers can pass the
    /// full template name list without checking which ones ever rendered.
    pub fn clear_into(&mut self, names: &[Atom], sink: &mut dyn TemplateSink) {
        for name in names {
            if let Some(views) = self.registered.remove(name) {
                sink.clear(name, &views);
            }
        }
    }
}
