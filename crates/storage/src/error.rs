//! Storage errors.

use iqrah_backend_domain::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),

    #[error("Query error: {0}")]
    Query(#[source] sqlx::Error),
}

impl From<StorageError> for EngineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Query(sqlx::Error::RowNotFound) => {
                EngineError::NotFound("row not found".to_string())
            }
            other => EngineError::Store(match other {
                StorageError::Query(e) => e,
                StorageError::Connection(e) => e,
                StorageError::Migration(e) => sqlx::Error::Configuration(e.to_string().into()),
            }),
        }
    }
}
