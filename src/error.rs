use thiserror::Error;

/// Failure modes of the translation record store.
///
/// Only the recognized cases get their own variant; anything unexpected from
/// the transport or the REST layer collapses into `Infrastructure` with the
/// underlying cause attached.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("translation key not found")]
    NotFound,

    #[error("translation key '{0}' already exists")]
    Conflict(String),

    #[error("database error: {0}")]
    Infrastructure(#[source] anyhow::Error),
}

impl StoreError {
    /// Wrap any transport-level cause as an infrastructure failure.
    pub fn infra<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        StoreError::Infrastructure(err.into())
    }
}
