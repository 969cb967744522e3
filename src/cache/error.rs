//! Cache error types.

use thiserror::Error;

/// Errors raised by a cache store or the registry.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backing store could not be reached or refused the operation.
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    /// A value could not be converted to or from its stored form.
    #[error("cache serialization error for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A named cache was requested with different key/value types than it was created with.
    #[error("cache '{name}' already exists as {existing}, requested {requested}")]
    TypeMismatch {
        name: String,
        existing: &'static str,
        requested: &'static str,
    },
}

/// Errors raised by the get-or-calc helpers.
///
/// `E` is the error type of the caller's compute function, returned untouched.
#[derive(Debug, Error)]
pub enum CalcError<E> {
    /// The compute function failed. Nothing was stored for the failed keys.
    #[error("compute failed: {0}")]
    Compute(E),

    /// A batch compute function returned the wrong number of values.
    #[error("batch compute returned {actual} values for {expected} missed keys")]
    CountMismatch { expected: usize, actual: usize },

    /// The cache store failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl<E> CalcError<E> {
    /// Returns the compute function's error, if that is what failed.
    pub fn into_compute(self) -> Option<E> {
        match self {
            Self::Compute(e) => Some(e),
            _ => None,
        }
    }
}
