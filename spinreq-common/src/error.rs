//! Shared error type
//!
//! Covers the failures the shared library itself can produce: database
//! access, filesystem work during database setup, and configuration
//! resolution. Service crates wrap this in their own error enums.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem errors while creating the data folder
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
