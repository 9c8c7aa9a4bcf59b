//! Database error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database connection lock poisoned")]
    LockPoisoned,
}

impl From<DbError> for lingo_core::StoreError {
    fn from(e: DbError) -> Self {
        Self::Backend(e.to_string())
    }
}
