/// Host framework quirks an adapter can be asked to emulate.
///
/// Some host versions deliver the first change batch before bound property
/// getters are wired up, so the element's initial values never reach the bag.
/// `LegacySeed` compensates by copying every bound property into the bag at
/// init time and marking the adapter dirty.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum CompatMode {
    /// Rely on the first change batch to populate the bag.
    #[default]
    Standard,
    /// Seed bound properties into the bag at init and mark dirty.
    LegacySeed,
}

impl CompatMode {
    pub(crate) fn seeds_bound_properties(&self) -> bool {
        matches!(self, CompatMode::LegacySeed)
    }
}

/// Construction-time knobs for adapters.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct AdapterOptions {
    pub compat: CompatMode,
}

impl AdapterOptions {
    pub fn new() -> AdapterOptions {
        AdapterOptions::default()
    }

    pub fn compat(mut self, compat: CompatMode) -> AdapterOptions {
        self.compat = compat;
        self
    }
}
