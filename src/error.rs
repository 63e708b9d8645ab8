//! Error type shared by every repository and unit-of-work operation.

use sea_orm::DbErr;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, UnitOfWorkError>;

/// Wraps a failure reported by the underlying ORM, or an argument rejected
/// before anything was forwarded to it.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct UnitOfWorkError {
    message: String,
    #[source]
    source: Option<DbErr>,
}

impl UnitOfWorkError {
    /// Error with a message and no inner cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Error with a message wrapping the ORM failure that caused it.
    pub fn with_source(message: impl Into<String>, source: DbErr) -> Self {
        Self {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The ORM error this one wraps, if any.
    pub fn db_error(&self) -> Option<&DbErr> {
        self.source.as_ref()
    }
}

impl From<DbErr> for UnitOfWorkError {
    fn from(err: DbErr) -> Self {
        Self::with_source("Database operation failed", err)
    }
}

/// Attaches an operation-specific message to ORM results.
pub trait DbResultExt<T> {
    fn context(self, message: &str) -> Result<T>;

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> DbResultExt<T> for std::result::Result<T, DbErr> {
    fn context(self, message: &str) -> Result<T> {
        self.map_err(|e| UnitOfWorkError::with_source(message, e))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| UnitOfWorkError::with_source(f(), e))
    }
}
