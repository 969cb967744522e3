//! Cache module - read-through caching over Moka.
//!
//! ## Architecture
//!
//! - `CacheRegistry` - central owner of named typed caches
//! - `CacheStore` - the key/value interface everything else consumes
//! - `MokaStore` - in-process store backed by a registry cache
//! - `get_or_calc` / `get_or_calc_many` - memoize computations in a store
//! - `ModelCache` - per-entity namespace with `invalidate_by_pk`
//!
//! ## Usage
//!
//! ```ignore
//! let registry = CacheRegistry::new();
//! let store = MokaStore::new(&registry, &CacheConfig::default())?;
//!
//! let count: u64 = get_or_calc(&store, "video:42:languages", || count_languages(42))?;
//! ```

mod calc;
mod config;
mod error;
mod model;
mod registry;
mod store;
mod typed;

pub use calc::{get_or_calc, get_or_calc_many};
pub use config::CacheConfig;
pub use error::{CacheError, CalcError};
pub use model::{ModelCache, PkInvalidator};
pub use registry::CacheRegistry;
pub use store::{CacheStore, MokaStore};
#[cfg(test)]
pub(crate) use store::FailingStore;
pub use typed::TypedCache;
