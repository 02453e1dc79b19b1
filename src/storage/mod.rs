//! Resource repositories for the NPC memory
//!
//! Each repository owns one table of the shared SQLite database: it knows the
//! schema, embeds the text it is handed through the injected provider, and
//! rebuilds typed records from rows. Rows are never updated or deleted.
//!
//! A row whose embedding blob is malformed, or which lacks a required
//! column, fails the whole read. Corrupt vectors mean the store itself is
//! damaged, so no partial result is returned.
//!
//! # Example
//!
//! ```no_run
//! use ainpc_store::db::SqliteClient;
//! use ainpc_store::embeddings::{create_provider, EmbeddingProvider};
//! use ainpc_store::storage::{ConversationRepository, Repository};
//! use std::sync::Arc;
//!
//! let db = Arc::new(SqliteClient::open("ai-npc_db/ai-npc.db")?);
//! let embedder = create_provider(&Default::default())?;
//! let conversations = ConversationRepository::new(db, embedder);
//! conversations.init()?;
//! conversations.insert("Steve", "Bring me some oak logs")?;
//! # Ok::<(), ainpc_store::StoreError>(())
//! ```

pub mod actions;
pub mod conversations;
pub mod requirements;
pub mod types;

pub use actions::ActionsRepository;
pub use conversations::ConversationRepository;
pub use requirements::{parse_blocks_needed, serialize_blocks_needed, BlocksNeeded, RequirementsRepository};
pub use types::{Action, Conversation, Requirement, Resource};

use crate::db::{Row, SqliteClient};
use crate::error::{Result, StoreError};
use chrono::NaiveDateTime;

/// Common surface of the three resource repositories
pub trait Repository {
    type Record: Resource;

    /// Name of the owned table
    fn table(&self) -> &'static str;

    fn client(&self) -> &SqliteClient;

    /// Create the table if it doesn't exist
    fn create_table(&self) -> Result<()>;

    /// Make the repository ready for use; idempotent
    fn init(&self) -> Result<()> {
        self.create_table()
    }

    /// Every row of the table, in primary key order
    fn select_all(&self) -> Result<Vec<Self::Record>>;

    fn count(&self) -> Result<usize> {
        self.client().count(self.table())
    }
}

/// Decode the embedding blob stored in `column`
pub(crate) fn row_embedding(row: &Row, column: &str) -> Result<Vec<f64>> {
    crate::vector::decode(row.get_blob(column)?)
}

/// Parse a `CURRENT_TIMESTAMP` value (UTC, `YYYY-MM-DD HH:MM:SS`)
pub(crate) fn row_timestamp(row: &Row, column: &str) -> Result<NaiveDateTime> {
    let value = row.get_text(column)?;
    NaiveDateTime::parse_from_str(&value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&value, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|_| StoreError::InvalidTimestamp {
            column: column.to_string(),
            value: value.clone(),
        })
}
