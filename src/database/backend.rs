//! Storage backends for entities.

use anyhow::Result;
use dashmap::DashMap;
use mongodb::Collection;
use mongodb::bson::doc;
use mongodb::options::ReplaceOptions;

use super::{Database, Entity};

/// Where entities are persisted.
pub trait Backend<E: Entity>: Send + Sync {
    fn find(&self, pk: i64) -> impl Future<Output = Result<Option<E>>> + Send;

    /// Insert or replace the entity with the same primary key.
    fn upsert(&self, entity: &E) -> impl Future<Output = Result<()>> + Send;

    /// Delete by primary key. Returns whether a record was removed.
    fn remove(&self, pk: i64) -> impl Future<Output = Result<bool>> + Send;
}

/// MongoDB-backed storage. Documents are keyed on `_id`.
#[derive(Debug, Clone)]
pub struct MongoBackend<E: Entity> {
    collection: Collection<E>,
}

impl<E: Entity> MongoBackend<E> {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(),
        }
    }
}

impl<E: Entity> Backend<E> for MongoBackend<E> {
    async fn find(&self, pk: i64) -> Result<Option<E>> {
        Ok(self.collection.find_one(doc! { "_id": pk }).await?)
    }

    async fn upsert(&self, entity: &E) -> Result<()> {
        let options = ReplaceOptions::builder().upsert(true).build();

        self.collection
            .replace_one(doc! { "_id": entity.pk() }, entity)
            .with_options(options)
            .await?;

        Ok(())
    }

    async fn remove(&self, pk: i64) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": pk }).await?;
        Ok(result.deleted_count > 0)
    }
}

/// In-process storage, used when no database is configured and in tests.
#[derive(Debug)]
pub struct MemoryBackend<E: Entity> {
    rows: DashMap<i64, E>,
}

impl<E: Entity> MemoryBackend<E> {
    pub fn new() -> Self {
        Self { rows: DashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<E: Entity> Default for MemoryBackend<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Backend<E> for MemoryBackend<E> {
    async fn find(&self, pk: i64) -> Result<Option<E>> {
        Ok(self.rows.get(&pk).map(|row| row.value().clone()))
    }

    async fn upsert(&self, entity: &E) -> Result<()> {
        self.rows.insert(entity.pk(), entity.clone());
        Ok(())
    }

    async fn remove(&self, pk: i64) -> Result<bool> {
        Ok(self.rows.remove(&pk).is_some())
    }
}

/// Backend chosen at startup from configuration.
#[derive(Debug)]
pub enum EntityBackend<E: Entity> {
    Mongo(MongoBackend<E>),
    Memory(MemoryBackend<E>),
}

impl<E: Entity> EntityBackend<E> {
    /// Mongo when a database is connected, memory otherwise.
    pub fn from_database(db: Option<&Database>) -> Self {
        match db {
            Some(db) => Self::Mongo(MongoBackend::new(db)),
            None => Self::Memory(MemoryBackend::new()),
        }
    }
}

impl<E: Entity> Backend<E> for EntityBackend<E> {
    async fn find(&self, pk: i64) -> Result<Option<E>> {
        match self {
            Self::Mongo(b) => b.find(pk).await,
            Self::Memory(b) => b.find(pk).await,
        }
    }

    async fn upsert(&self, entity: &E) -> Result<()> {
        match self {
            Self::Mongo(b) => b.upsert(entity).await,
            Self::Memory(b) => b.upsert(entity).await,
        }
    }

    async fn remove(&self, pk: i64) -> Result<bool> {
        match self {
            Self::Mongo(b) => b.remove(pk).await,
            Self::Memory(b) => b.remove(pk).await,
        }
    }
}
