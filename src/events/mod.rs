//! Entity mutation events.
//!
//! Repositories own a [`Signals`] per entity type and fire it after a write
//! succeeds. Observers are connected explicitly at startup:
//!
//! ```ignore
//! users.signals().connect(Arc::new(InvalidationHook::new(user_cache.clone())));
//! ```

pub mod invalidation;
pub mod signals;

pub use invalidation::InvalidationHook;
pub use signals::{Mutation, MutationObserver, Signals};
