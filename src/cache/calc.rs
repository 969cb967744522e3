//! Read-through helpers: return the cached value or compute and store it.
//!
//! Concurrent misses on the same key may both compute; the last write wins.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{CacheError, CacheStore, CalcError};

/// Return the value stored under `key`, or compute, store and return it.
///
/// `compute` runs only on a miss, at most once. If it fails nothing is stored
/// and its error comes back as [`CalcError::Compute`].
pub fn get_or_calc<T, E, F>(store: &dyn CacheStore, key: &str, compute: F) -> Result<T, CalcError<E>>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T, E>,
{
    if let Some(value) = store.get(key)?.and_then(|stored| decode(key, stored)) {
        debug!("cache hit: {}", key);
        return Ok(value);
    }

    debug!("cache miss: {}", key);
    let value = compute().map_err(CalcError::Compute)?;
    store.set(key, encode(key, &value)?)?;
    Ok(value)
}

/// Batch form of [`get_or_calc`].
///
/// Looks all `keys` up in one batch, then calls `compute_many` once with the
/// missed keys in their input order. The result is in `keys` order, cached
/// and computed values interleaved. `compute_many` is not called when
/// everything hits.
///
/// Returning a different number of values than missed keys is a
/// [`CalcError::CountMismatch`]; nothing is stored in that case.
pub fn get_or_calc_many<T, E, F>(
    store: &dyn CacheStore,
    keys: &[String],
    compute_many: F,
) -> Result<Vec<T>, CalcError<E>>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(&[String]) -> Result<Vec<T>, E>,
{
    let hits = store.get_many(keys)?;

    let mut slots: Vec<Option<T>> = Vec::with_capacity(keys.len());
    let mut missed = Vec::new();
    for key in keys {
        let cached = hits.get(key).and_then(|stored| decode(key, stored.clone()));
        if cached.is_none() {
            missed.push(key.clone());
        }
        slots.push(cached);
    }

    debug!("cache batch: {} hits, {} misses", keys.len() - missed.len(), missed.len());

    if !missed.is_empty() {
        let computed = compute_many(&missed).map_err(CalcError::Compute)?;
        if computed.len() != missed.len() {
            return Err(CalcError::CountMismatch {
                expected: missed.len(),
                actual: computed.len(),
            });
        }

        let mut computed = computed.into_iter();
        for (slot, key) in slots.iter_mut().zip(keys) {
            if slot.is_some() {
                continue;
            }
            if let Some(value) = computed.next() {
                store.set(key, encode(key, &value)?)?;
                *slot = Some(value);
            }
        }
    }

    Ok(slots.into_iter().flatten().collect())
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<Value, CacheError> {
    serde_json::to_value(value).map_err(|source| CacheError::Serialization {
        key: key.to_string(),
        source,
    })
}

/// A stored value that no longer fits `T` counts as a miss.
fn decode<T: DeserializeOwned>(key: &str, stored: Value) -> Option<T> {
    match serde_json::from_value(stored) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("discarding undecodable cache value for {}: {}", key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::convert::Infallible;

    use serde_json::json;

    use super::*;
    use crate::cache::{CacheConfig, CacheRegistry, FailingStore, MokaStore};

    fn store() -> MokaStore {
        MokaStore::new(&CacheRegistry::new(), &CacheConfig::default()).unwrap()
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_miss_computes_once_and_stores() {
        let store = store();
        let calls = Cell::new(0);

        let value: i64 = get_or_calc(&store, "key", || {
            calls.set(calls.get() + 1);
            Ok::<_, Infallible>(1)
        })
        .unwrap();

        assert_eq!(value, 1);
        assert_eq!(calls.get(), 1);
        assert_eq!(store.get("key").unwrap(), Some(json!(1)));
    }

    #[test]
    fn test_hit_skips_compute() {
        let store = store();
        store.set("key", json!(2)).unwrap();

        let value: i64 = get_or_calc(&store, "key", || -> Result<i64, Infallible> {
            panic!("compute must not run on a hit")
        })
        .unwrap();

        assert_eq!(value, 2);
    }

    #[test]
    fn test_compute_error_stores_nothing() {
        let store = store();

        let err = get_or_calc::<i64, _, _>(&store, "key", || Err("boom")).unwrap_err();

        assert_eq!(err.into_compute(), Some("boom"));
        assert_eq!(store.get("key").unwrap(), None);
    }

    #[test]
    fn test_undecodable_value_is_recomputed() {
        let store = store();
        store.set("key", json!("not a number")).unwrap();

        let value: i64 = get_or_calc(&store, "key", || Ok::<_, Infallible>(5)).unwrap();

        assert_eq!(value, 5);
        assert_eq!(store.get("key").unwrap(), Some(json!(5)));
    }

    #[test]
    fn test_many_interleaves_hits_and_misses() {
        let store = store();
        store.set("key2", json!(2)).unwrap();
        let seen = RefCell::new(Vec::new());

        let values: Vec<i64> = get_or_calc_many(&store, &keys(&["key1", "key2"]), |missed| {
            seen.borrow_mut().push(missed.to_vec());
            Ok::<_, Infallible>(vec![1; missed.len()])
        })
        .unwrap();

        assert_eq!(values, vec![1, 2]);
        assert_eq!(*seen.borrow(), vec![keys(&["key1"])]);
        assert_eq!(store.get("key1").unwrap(), Some(json!(1)));
    }

    #[test]
    fn test_many_keeps_missed_order() {
        let store = store();
        store.set("b", json!("cached-b")).unwrap();
        store.set("d", json!("cached-d")).unwrap();

        let values: Vec<String> = get_or_calc_many(&store, &keys(&["a", "b", "c", "d", "e"]), |missed| {
            assert_eq!(missed, keys(&["a", "c", "e"]).as_slice());
            Ok::<_, Infallible>(missed.iter().map(|k| format!("fresh-{k}")).collect())
        })
        .unwrap();

        assert_eq!(values, vec!["fresh-a", "cached-b", "fresh-c", "cached-d", "fresh-e"]);
    }

    #[test]
    fn test_many_all_hits_skips_compute() {
        let store = store();
        store.set("a", json!(1)).unwrap();

        let values: Vec<i64> = get_or_calc_many(&store, &keys(&["a", "a"]), |_| -> Result<Vec<i64>, Infallible> {
            panic!("compute must not run when every key hits")
        })
        .unwrap();

        assert_eq!(values, vec![1, 1]);
    }

    #[test]
    fn test_many_count_mismatch() {
        let store = store();

        let err = get_or_calc_many::<i64, Infallible, _>(&store, &keys(&["a", "b"]), |_| Ok(vec![1]))
            .unwrap_err();

        assert!(matches!(err, CalcError::CountMismatch { expected: 2, actual: 1 }));
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn test_many_compute_error_stores_nothing() {
        let store = store();
        store.set("b", json!(2)).unwrap();

        let err = get_or_calc_many::<i64, _, _>(&store, &keys(&["a", "b"]), |_| Err("down")).unwrap_err();

        assert!(matches!(err, CalcError::Compute("down")));
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_store_read_failure_propagates() {
        let store = FailingStore { reads: true, writes: false };
        let calls = Cell::new(0);

        let err = get_or_calc(&store, "key", || {
            calls.set(calls.get() + 1);
            Ok::<_, Infallible>(1)
        })
        .unwrap_err();
        assert!(matches!(err, CalcError::Cache(CacheError::Unavailable(_))));

        let err = get_or_calc_many(&store, &keys(&["a", "b"]), |missed| {
            calls.set(calls.get() + 1);
            Ok::<_, Infallible>(vec![1; missed.len()])
        })
        .unwrap_err();
        assert!(matches!(err, CalcError::Cache(CacheError::Unavailable(_))));

        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_store_write_failure_propagates() {
        let store = FailingStore { reads: false, writes: true };

        let err = get_or_calc(&store, "key", || Ok::<_, Infallible>(1)).unwrap_err();
        assert!(matches!(err, CalcError::Cache(CacheError::Unavailable(_))));

        let err = get_or_calc_many(&store, &keys(&["a", "b"]), |missed| {
            Ok::<_, Infallible>(vec![1; missed.len()])
        })
        .unwrap_err();
        assert!(matches!(err, CalcError::Cache(CacheError::Unavailable(_))));
    }
}
