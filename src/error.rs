//! Error taxonomy for the NPC memory store
//!
//! Storage errors bubble up to repository callers unmodified. Nothing in the
//! store retries on its own; that policy belongs to whoever drives it.

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// An operation was attempted after the connection was closed
    #[error("database connection is closed")]
    ConnectionClosed,

    /// Embedding blob whose length is not a multiple of 8 bytes
    #[error("malformed embedding vector: {len} bytes is not a multiple of 8")]
    MalformedVector { len: usize },

    /// Embedding provider failed, timed out or returned garbage
    #[error("embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Table creation failed during initialization
    #[error("schema error: {0}")]
    Schema(String),

    #[error("column not found: {0}")]
    MissingColumn(String),

    #[error("column {0} is NULL")]
    NullColumn(String),

    #[error("invalid timestamp in column {column}: {value}")]
    InvalidTimestamp { column: String, value: String },

    /// `blocks_needed` text or map that violates the `name=count` format
    #[error("invalid blocks_needed: {0}")]
    InvalidBlocksNeeded(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The crafting catalog could not be read (e.g. no active game session)
    #[error("crafting catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Bad SQL, out-of-range parameter index or unbound placeholder
    #[error("invalid statement: {0}")]
    InvalidStatement(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether a caller may reasonably retry or degrade instead of giving up
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::EmbeddingUnavailable(_))
    }
}
