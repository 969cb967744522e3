//! MongoDB connection wrapper.

use mongodb::{Client, Collection, options::ClientOptions};
use tracing::info;

use super::Entity;

/// Connected MongoDB database.
#[derive(Debug, Clone)]
pub struct Database {
    db: mongodb::Database,
}

impl Database {
    /// Connect to MongoDB and verify the connection with a ping.
    ///
    /// # Errors
    /// Returns error if the URI is invalid or the server does not answer.
    pub async fn connect(uri: &str, db_name: &str) -> anyhow::Result<Self> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;

        client
            .database("admin")
            .run_command(mongodb::bson::doc! { "ping": 1 })
            .await?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            db: client.database(db_name),
        })
    }

    /// Typed collection for an entity, named by [`Entity::COLLECTION`].
    pub fn collection<E: Entity>(&self) -> Collection<E> {
        self.db.collection(E::COLLECTION)
    }
}
