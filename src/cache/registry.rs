//! Cache registry - central ownership of all named caches.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::{CacheConfig, CacheError, TypedCache};

/// Central registry for named typed caches.
///
/// One registry is built at process start and handed to every component
/// that needs a cache. Asking twice for the same name returns handles to the
/// same underlying cache; asking with different types is an error.
///
/// ```ignore
/// let registry = CacheRegistry::new();
/// let values: TypedCache<String, serde_json::Value> =
///     registry.get_or_create("computed", &CacheConfig::default())?;
/// ```
#[derive(Clone)]
pub struct CacheRegistry {
    caches: Arc<RwLock<HashMap<String, Registered>>>,
}

/// Type-erased cache handle.
struct Registered {
    cache: Box<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl CacheRegistry {
    pub fn new() -> Self {
        info!("Cache registry initialized");
        Self {
            caches: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the cache registered under `name`, creating it with `config` if absent.
    ///
    /// The config only applies on creation.
    pub fn get_or_create<K, V>(
        &self,
        name: &str,
        config: &CacheConfig,
    ) -> Result<TypedCache<K, V>, CacheError>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        if let Some(cache) = self.get(name)? {
            return Ok(cache);
        }

        let mut caches = self.caches.write();

        // Another thread may have registered it between the read and the write lock.
        if let Some(existing) = caches.get(name) {
            return downcast(name, existing);
        }

        debug!("Creating cache: {}", name);
        let cache = TypedCache::<K, V>::new(name, config);
        caches.insert(
            name.to_string(),
            Registered {
                cache: Box::new(cache.clone()),
                type_id: TypeId::of::<TypedCache<K, V>>(),
                type_name: std::any::type_name::<TypedCache<K, V>>(),
            },
        );

        Ok(cache)
    }

    /// Get an existing cache by name.
    pub fn get<K, V>(&self, name: &str) -> Result<Option<TypedCache<K, V>>, CacheError>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let caches = self.caches.read();
        caches.get(name).map(|entry| downcast(name, entry)).transpose()
    }

    /// Drop a cache from the registry. Outstanding handles keep working.
    pub fn remove(&self, name: &str) -> bool {
        let removed = self.caches.write().remove(name).is_some();
        if removed {
            debug!("Removed cache: {}", name);
        }
        removed
    }

    pub fn cache_names(&self) -> Vec<String> {
        self.caches.read().keys().cloned().collect()
    }
}

fn downcast<K, V>(name: &str, entry: &Registered) -> Result<TypedCache<K, V>, CacheError>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let mismatch = || CacheError::TypeMismatch {
        name: name.to_string(),
        existing: entry.type_name,
        requested: std::any::type_name::<TypedCache<K, V>>(),
    };

    if entry.type_id != TypeId::of::<TypedCache<K, V>>() {
        return Err(mismatch());
    }

    entry
        .cache
        .downcast_ref::<TypedCache<K, V>>()
        .cloned()
        .ok_or_else(mismatch)
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let caches = self.caches.read();
        f.debug_struct("CacheRegistry")
            .field("cache_count", &caches.len())
            .field("cache_names", &caches.keys().collect::<Vec<_>>())
            .finish()
    }
}
