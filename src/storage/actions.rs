//! Registered NPC actions, retrieved by how well their description fits a prompt

use super::types::Action;
use super::{row_embedding, row_timestamp, Repository};
use crate::db::{Row, SqlValue, SqliteClient};
use crate::embeddings::{embed_text, EmbeddingProvider};
use crate::error::Result;
use crate::vector;
use std::sync::Arc;
use tracing::debug;

pub const TABLE: &str = "actions";

pub struct ActionsRepository {
    client: Arc<SqliteClient>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl ActionsRepository {
    pub fn new(client: Arc<SqliteClient>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { client, embedder }
    }

    /// Register an action, embedding its description
    pub fn insert(&self, name: &str, description: &str, example: &str) -> Result<()> {
        let embedding = embed_text(self.embedder.as_ref(), description)?;
        self.insert_embedded(name, description, &embedding, example)
    }

    pub fn insert_embedded(
        &self,
        name: &str,
        description: &str,
        description_embedding: &[f64],
        example: &str,
    ) -> Result<()> {
        let mut statement = self.client.prepare(
            "INSERT INTO actions (name, description, description_embedding, example) VALUES (?, ?, ?, ?)",
        )?;
        statement
            .bind_text(1, name)
            .bind_text(2, description)
            .bind_blob(3, vector::encode(description_embedding))
            .bind_text(4, example);
        self.client.execute_insert(&statement)?;

        debug!(action = name, "action registered");
        Ok(())
    }

    /// Most recently registered action with this name
    pub fn find_by_name(&self, name: &str) -> Result<Option<Action>> {
        self.client
            .query(
                "SELECT * FROM actions WHERE name = ? ORDER BY id DESC LIMIT 1",
                &[SqlValue::Text(name.to_string())],
            )?
            .next()
            .map(|row| from_row(&row))
            .transpose()
    }
}

impl Repository for ActionsRepository {
    type Record = Action;

    fn table(&self) -> &'static str {
        TABLE
    }

    fn client(&self) -> &SqliteClient {
        &self.client
    }

    fn create_table(&self) -> Result<()> {
        self.client.execute_ddl(
            "CREATE TABLE IF NOT EXISTS actions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                description_embedding BLOB,
                example TEXT NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );",
        )
    }

    fn select_all(&self) -> Result<Vec<Action>> {
        self.client
            .execute_query("SELECT * FROM actions ORDER BY id")?
            .map(|row| from_row(&row))
            .collect()
    }
}

fn from_row(row: &Row) -> Result<Action> {
    Ok(Action {
        id: row.get_i64("id")?,
        name: row.get_text("name")?,
        description: row.get_optional_text("description")?.unwrap_or_default(),
        embedding: row_embedding(row, "description_embedding")?,
        example: row.get_text("example")?,
        created_at: row_timestamp(row, "created_at")?,
    })
}
