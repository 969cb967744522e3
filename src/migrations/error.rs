//! Migration error types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MigrationError {
    #[error("model name must not be empty")]
    EmptyModelName,

    #[error("index_together on '{model}' contains an empty field tuple")]
    EmptyIndex { model: String },

    #[error("index_together on '{model}' contains an empty field name")]
    EmptyField { model: String },

    #[error("unknown model '{0}'")]
    UnknownModel(String),

    #[error("index '{name}' already exists on '{model}'")]
    DuplicateIndex { model: String, name: String },
}
