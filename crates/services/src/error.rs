//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::SessionId;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by quiz session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(SessionId),
    #[error("session already completed")]
    Completed,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
