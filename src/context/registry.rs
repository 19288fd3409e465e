use crate::{InjectionPoint, Producer};
use dashmap::{mapref::entry::Entry, DashMap};
use std::fmt::{Debug, Formatter};

/// Maps injection points to the producers that satisfy them. This is plain
/// storage and can be shared between threads.
#[derive(Default)]
pub struct BindingRegistry {
    producers: DashMap<InjectionPoint, Producer>,
}

impl BindingRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        BindingRegistry::default()
    }

    /// Stores a producer, returning the one it replaced.
    pub fn put(
        &self,
        point: InjectionPoint,
        producer: Producer,
    ) -> Option<Producer> {
        self.producers.insert(point, producer)
    }

    /// Stores a producer unless the point already has one, in which case the
    /// point is handed back.
    pub fn try_put(
        &self,
        point: InjectionPoint,
        producer: Producer,
    ) -> Result<(), InjectionPoint> {
        match self.producers.entry(point) {
            Entry::Occupied(entry) => Err(entry.key().clone()),
            Entry::Vacant(entry) => {
                entry.insert(producer);
                Ok(())
            }
        }
    }

    /// Gets the producer for a point.
    #[must_use]
    pub fn get(&self, point: &InjectionPoint) -> Option<Producer> {
        self.producers.get(point).map(|producer| producer.value().clone())
    }

    /// Whether a point has a producer.
    #[must_use]
    pub fn has(&self, point: &InjectionPoint) -> bool {
        self.producers.contains_key(point)
    }

    /// The number of stored producers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.producers.len()
    }

    /// Whether no producers are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }
}

impl Debug for BindingRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries(self.producers.iter().map(|entry| entry.key().to_string()))
            .finish()
    }
}
