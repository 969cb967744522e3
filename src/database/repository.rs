//! Entity repository that announces successful writes.

use anyhow::Result;
use tracing::debug;

use super::{Backend, Entity};
use crate::events::{Mutation, Signals};

/// Reads and writes one entity type, firing [`Signals`] after each
/// successful write and before returning to the caller.
pub struct Repository<E: Entity, B: Backend<E>> {
    backend: B,
    signals: Signals<E>,
}

impl<E: Entity, B: Backend<E>> Repository<E, B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            signals: Signals::new(),
        }
    }

    /// Signals fired by this repository; connect observers here.
    pub fn signals(&self) -> &Signals<E> {
        &self.signals
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn get(&self, pk: i64) -> Result<Option<E>> {
        self.backend.find(pk).await
    }

    /// Insert or update. Observers see `Saved` only if the write succeeded.
    pub async fn save(&self, entity: &E) -> Result<()> {
        self.backend.upsert(entity).await?;
        debug!("Saved {} {}", E::COLLECTION, entity.pk());

        self.signals.send(Mutation::Saved, entity);
        Ok(())
    }

    /// Delete. Observers see `Deleted` only if a record was actually removed.
    pub async fn delete(&self, entity: &E) -> Result<bool> {
        let removed = self.backend.remove(entity.pk()).await?;
        debug!("Deleted {} {}: {}", E::COLLECTION, entity.pk(), removed);

        if removed {
            self.signals.send(Mutation::Deleted, entity);
        }
        Ok(removed)
    }
}
