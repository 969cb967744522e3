//! Per-entity cache namespaces.
//!
//! Values derived from one entity live under keys that embed the entity's
//! current generation. Invalidating the entity bumps the generation, so all of
//! its cached values become unreachable at once and age out of the store.
//!
//! Generations are kept in their own store without a TTL. Sharing the values'
//! TTL would orphan fresh values whenever an old generation key expired.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{CacheError, CacheStore, CalcError, get_or_calc, get_or_calc_many};

/// Something that can drop every cached value belonging to one primary key.
pub trait PkInvalidator: Send + Sync {
    fn invalidate_by_pk(&self, pk: i64) -> Result<(), CacheError>;
}

/// Cache namespace for one entity type.
#[derive(Clone)]
pub struct ModelCache {
    store: Arc<dyn CacheStore>,
    generations: Arc<dyn CacheStore>,
    prefix: Arc<str>,
}

impl ModelCache {
    /// Registry cache name for generation counters.
    pub const GENERATIONS_CACHE_NAME: &'static str = "entity_generations";

    /// `store` holds computed values; `generations` holds the per-pk
    /// counters and should not expire entries by time.
    pub fn new(
        store: Arc<dyn CacheStore>,
        generations: Arc<dyn CacheStore>,
        prefix: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            store,
            generations,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Cached `name` for entity `pk`, computed on a miss.
    pub fn get_or_calc<T, E, F>(&self, pk: i64, name: &str, compute: F) -> Result<T, CalcError<E>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
    {
        let key = self.key(pk, self.generation(pk)?, name);
        get_or_calc(self.store.as_ref(), &key, compute)
    }

    /// Several cached values for entity `pk`.
    ///
    /// `compute_many` receives the missed names (not the full keys), in
    /// input order.
    pub fn get_or_calc_many<T, E, F>(
        &self,
        pk: i64,
        names: &[&str],
        compute_many: F,
    ) -> Result<Vec<T>, CalcError<E>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&[String]) -> Result<Vec<T>, E>,
    {
        let generation = self.generation(pk)?;
        let keys: Vec<String> = names.iter().map(|name| self.key(pk, generation, name)).collect();
        let key_prefix = self.key(pk, generation, "");

        get_or_calc_many(self.store.as_ref(), &keys, |missed| {
            let missed_names: Vec<String> = missed
                .iter()
                .map(|key| key.strip_prefix(&key_prefix).unwrap_or(key).to_string())
                .collect();
            compute_many(&missed_names)
        })
    }

    fn key(&self, pk: i64, generation: i64, name: &str) -> String {
        format!("{}:{}:{}:{}", self.prefix, pk, generation, name)
    }

    fn generation_key(&self, pk: i64) -> String {
        format!("{}:{}:gen", self.prefix, pk)
    }

    /// Current generation for `pk`.
    ///
    /// A missing generation (never set, or evicted) starts a fresh one rather
    /// than falling back to a fixed value, so old entries cannot resurface.
    fn generation(&self, pk: i64) -> Result<i64, CacheError> {
        let key = self.generation_key(pk);
        if let Some(generation) = self.generations.get(&key)?.and_then(|v| v.as_i64()) {
            return Ok(generation);
        }

        let generation = now_micros();
        self.generations.set(&key, Value::from(generation))?;
        Ok(generation)
    }
}

impl PkInvalidator for ModelCache {
    fn invalidate_by_pk(&self, pk: i64) -> Result<(), CacheError> {
        let key = self.generation_key(pk);
        let previous = self.generations.get(&key)?.and_then(|v| v.as_i64()).unwrap_or(0);
        let next = now_micros().max(previous + 1);

        self.generations.set(&key, Value::from(next))?;
        debug!("Invalidated {} {} (generation {})", self.prefix, pk, next);
        Ok(())
    }
}

impl std::fmt::Debug for ModelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelCache").field("prefix", &self.prefix).finish()
    }
}

fn now_micros() -> i64 {
    chrono::Utc::now().timestamp_micros()
}
