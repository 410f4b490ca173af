//! Registry of unit kinds.
//!
//! The registry provides the catalog of kinds a graph can hold, enabling
//! loaders and the command line to instantiate units by their kind tag.

use std::collections::HashMap;

use super::module_trait::Unit;

/// Factory function type for creating unit instances with default dials.
pub type UnitFactory<U> = fn() -> U;

/// Catalog of available unit kinds for one graph flavour.
pub struct UnitRegistry<U: Unit> {
    /// Map of kind tag to factory function.
    factories: HashMap<&'static str, UnitFactory<U>>,
    /// Kinds in registration order, for listing.
    kinds: Vec<&'static str>,
}

impl<U: Unit> UnitRegistry<U> {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            kinds: Vec::new(),
        }
    }

    /// Registers a unit kind with the registry.
    ///
    /// A temporary instance is created to read the kind tag, which is then
    /// stored along with the factory.
    ///
    /// # Panics
    ///
    /// Panics if a unit with the same kind is already registered.
    pub fn register(&mut self, factory: UnitFactory<U>) {
        let kind = factory().kind();

        if self.factories.contains_key(kind) {
            panic!("Unit '{}' is already registered", kind);
        }

        self.factories.insert(kind, factory);
        self.kinds.push(kind);
    }

    /// Creates a new instance of a unit by its kind.
    ///
    /// Returns `None` if no unit with the given kind is registered.
    pub fn create(&self, kind: &str) -> Option<U> {
        self.factories.get(kind).map(|factory| factory())
    }

    /// Returns all registered kinds in registration order.
    pub fn kinds(&self) -> &[&'static str] {
        &self.kinds
    }

    /// Returns a default instance of every registered kind.
    pub fn instances(&self) -> impl Iterator<Item = U> + '_ {
        self.kinds.iter().filter_map(|kind| self.create(kind))
    }

    /// Returns the number of registered kinds.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if no kinds are registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Checks if a kind is registered.
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }
}

impl<U: Unit> Default for UnitRegistry<U> {
    fn default() -> Self {
        Self::new()
    }
}
