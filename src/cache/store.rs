//! Cache store abstraction.
//!
//! Everything above this layer talks to a `dyn CacheStore`, so a networked
//! backend can replace the in-process one without touching callers.

use std::collections::HashMap;

use serde_json::Value;

use super::{CacheConfig, CacheError, CacheRegistry, TypedCache};

/// Synchronous key/value store with store-owned expiry.
pub trait CacheStore: Send + Sync {
    /// Look up a single key.
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Look up several keys at once. Only hits appear in the result.
    fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Value>, CacheError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: Value) -> Result<(), CacheError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Remove several keys. Missing keys are skipped.
    fn delete_many(&self, keys: &[String]) -> Result<(), CacheError> {
        for key in keys {
            self.delete(key)?;
        }
        Ok(())
    }
}

/// In-process store backed by a registry-owned Moka cache.
#[derive(Clone, Debug)]
pub struct MokaStore {
    cache: TypedCache<String, Value>,
}

impl MokaStore {
    /// Name under which the store's cache is registered.
    pub const CACHE_NAME: &'static str = "computed_values";

    /// Attach to (or create) the shared store cache in `registry`.
    pub fn new(registry: &CacheRegistry, config: &CacheConfig) -> Result<Self, CacheError> {
        Self::named(registry, Self::CACHE_NAME, config)
    }

    /// Attach to (or create) the registry cache called `name`.
    pub fn named(registry: &CacheRegistry, name: &str, config: &CacheConfig) -> Result<Self, CacheError> {
        let cache = registry.get_or_create(name, config)?;
        Ok(Self { cache })
    }

    /// Underlying cache handle.
    pub fn cache(&self) -> &TypedCache<String, Value> {
        &self.cache
    }
}

impl CacheStore for MokaStore {
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        Ok(self.cache.get(&key.to_string()))
    }

    fn get_many(&self, keys: &[String]) -> Result<HashMap<String, Value>, CacheError> {
        Ok(keys
            .iter()
            .filter_map(|key| self.cache.get(key).map(|value| (key.clone(), value)))
            .collect())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), CacheError> {
        self.cache.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.cache.invalidate(&key.to_string());
        Ok(())
    }
}

/// Store that refuses reads and/or writes.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FailingStore {
    pub reads: bool,
    pub writes: bool,
}

#[cfg(test)]
impl FailingStore {
    pub fn all() -> Self {
        Self {
            reads: true,
            writes: true,
        }
    }

    fn refuse(&self) -> CacheError {
        CacheError::Unavailable("connection refused".to_string())
    }
}

#[cfg(test)]
impl CacheStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<Value>, CacheError> {
        if self.reads {
            return Err(self.refuse());
        }
        Ok(None)
    }

    fn get_many(&self, _keys: &[String]) -> Result<HashMap<String, Value>, CacheError> {
        if self.reads {
            return Err(self.refuse());
        }
        Ok(HashMap::new())
    }

    fn set(&self, _key: &str, _value: Value) -> Result<(), CacheError> {
        if self.writes {
            return Err(self.refuse());
        }
        Ok(())
    }

    fn delete(&self, _key: &str) -> Result<(), CacheError> {
        if self.writes {
            return Err(self.refuse());
        }
        Ok(())
    }
}
