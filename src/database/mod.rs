//! Database module exports.

mod backend;
mod entity;
mod models;
mod mongo;
mod repository;

pub use backend::{Backend, EntityBackend, MemoryBackend, MongoBackend};
pub use entity::Entity;
pub use models::*;
pub use mongo::Database;
pub use repository::Repository;
