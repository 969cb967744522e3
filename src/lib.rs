//! Caption Cache - caching core for a subtitling platform.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `cache` - Moka-backed store, read-through helpers, per-entity caches
//! - `database` - Entities, MongoDB/in-memory backends, repositories
//! - `events` - Mutation signals and the cache invalidation hook
//! - `migrations` - Legacy `index_together` conversion
//! - `state` - Everything above wired together

pub mod cache;
pub mod config;
pub mod database;
pub mod events;
pub mod migrations;
pub mod state;

pub use state::AppState;
