//! Entity trait shared by every persisted model.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A persisted record identified by an integer primary key.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    /// Collection (table) the entity is stored in.
    const COLLECTION: &'static str;

    fn pk(&self) -> i64;
}
