//! Mutation signals with explicit observer registration.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// Kind of entity mutation that just succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    Saved,
    Deleted,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Saved => f.write_str("saved"),
            Self::Deleted => f.write_str("deleted"),
        }
    }
}

/// Receives mutation notifications for entities of type `E`.
///
/// Observers run synchronously inside the mutating call and must not fail it;
/// anything that can go wrong is handled (and logged) by the observer itself.
pub trait MutationObserver<E>: Send + Sync {
    fn on_mutation(&self, mutation: Mutation, entity: &E);
}

/// Observers for one entity type, called in registration order.
pub struct Signals<E> {
    observers: RwLock<Vec<Arc<dyn MutationObserver<E>>>>,
}

impl<E> Signals<E> {
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn connect(&self, observer: Arc<dyn MutationObserver<E>>) {
        self.observers.write().push(observer);
    }

    /// Notify every observer once.
    pub fn send(&self, mutation: Mutation, entity: &E) {
        // Snapshot so observers may connect others without deadlocking.
        let observers = self.observers.read().clone();
        for observer in observers {
            observer.on_mutation(mutation, entity);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }
}

impl<E> Default for Signals<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Signals<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signals")
            .field("observers", &self.observer_count())
            .finish()
    }
}
