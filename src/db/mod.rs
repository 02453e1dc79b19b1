//! Storage engine for the NPC memory
//!
//! One embedded SQLite connection, shared by every repository. Exposes a
//! deliberately small contract: idempotent DDL, parameterized inserts and
//! materialized read queries.
//!
//! # Example
//! ```no_run
//! use ainpc_store::db::SqliteClient;
//!
//! let db = SqliteClient::open("ai-npc_db/ai-npc.db")?;
//! db.execute_ddl("CREATE TABLE IF NOT EXISTS test (id INTEGER)")?;
//! # Ok::<(), ainpc_store::StoreError>(())
//! ```

pub mod cursor;
pub mod sqlite;

pub use cursor::{ColumnIndex, ResultCursor, Row};
pub use sqlite::{SqlValue, SqliteClient, Statement};
