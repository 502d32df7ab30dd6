//! Error type shared by every planner operation.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid status: {0} (expected pending, in-progress or completed)")]
    InvalidStatus(String),

    #[error("Invalid priority: {0} (expected low, medium or high)")]
    InvalidPriority(String),

    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Could not find a data directory")]
    NoDataDir,

    #[error("Invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for errors caused by bad input rather than a failing backend.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::InvalidStatus(_)
                | Error::InvalidPriority(_)
                | Error::NotFound(_)
                | Error::NotSignedIn
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
