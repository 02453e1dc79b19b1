//! Conversation log - one row per NPC dialogue turn, append-only

use super::types::Conversation;
use super::{row_embedding, row_timestamp, Repository};
use crate::db::{Row, SqlValue, SqliteClient};
use crate::embeddings::{embed_text, EmbeddingProvider};
use crate::error::Result;
use crate::vector;
use std::sync::Arc;
use tracing::debug;

pub const TABLE: &str = "conversations";

pub struct ConversationRepository {
    client: Arc<SqliteClient>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl ConversationRepository {
    pub fn new(client: Arc<SqliteClient>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { client, embedder }
    }

    /// Log a dialogue turn, embedding the message text
    pub fn insert(&self, npc_name: &str, message: &str) -> Result<()> {
        let embedding = embed_text(self.embedder.as_ref(), message)?;
        self.insert_embedded(npc_name, message, &embedding)
    }

    /// Log a dialogue turn with an embedding computed elsewhere
    pub fn insert_embedded(&self, npc_name: &str, message: &str, embedding: &[f64]) -> Result<()> {
        let mut statement = self.client.prepare(
            "INSERT INTO conversations (npc_name, conversation, conversation_embedding) VALUES (?, ?, ?)",
        )?;
        statement
            .bind_text(1, npc_name)
            .bind_text(2, message)
            .bind_blob(3, vector::encode(embedding));
        self.client.execute_insert(&statement)?;

        debug!(npc = npc_name, "conversation logged");
        Ok(())
    }

    /// Conversation history of one NPC, oldest first
    pub fn select_by_npc(&self, npc_name: &str) -> Result<Vec<Conversation>> {
        self.client
            .query(
                "SELECT * FROM conversations WHERE npc_name = ? ORDER BY id",
                &[SqlValue::Text(npc_name.to_string())],
            )?
            .map(|row| from_row(&row))
            .collect()
    }
}

impl Repository for ConversationRepository {
    type Record = Conversation;

    fn table(&self) -> &'static str {
        TABLE
    }

    fn client(&self) -> &SqliteClient {
        &self.client
    }

    fn create_table(&self) -> Result<()> {
        self.client.execute_ddl(
            "CREATE TABLE IF NOT EXISTS conversations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                npc_name TEXT NOT NULL,
                conversation TEXT,
                conversation_embedding BLOB,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );",
        )
    }

    fn select_all(&self) -> Result<Vec<Conversation>> {
        self.client
            .execute_query("SELECT * FROM conversations ORDER BY id")?
            .map(|row| from_row(&row))
            .collect()
    }
}

fn from_row(row: &Row) -> Result<Conversation> {
    Ok(Conversation {
        id: row.get_i64("id")?,
        npc_name: row.get_text("npc_name")?,
        message: row.get_optional_text("conversation")?.unwrap_or_default(),
        embedding: row_embedding(row, "conversation_embedding")?,
        created_at: row_timestamp(row, "created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::fixture::FixedEmbedder;
    use crate::error::StoreError;

    fn repository(embedder: FixedEmbedder) -> Result<ConversationRepository> {
        let client = Arc::new(SqliteClient::open_in_memory()?);
        let repo = ConversationRepository::new(client, Arc::new(embedder));
        repo.init()?;
        Ok(repo)
    }

    #[test]
    fn test_insert_then_select() -> Result<()> {
        let repo = repository(FixedEmbedder::new(vec![0.0, 0.0]).with("hello there", vec![0.125, -2.5]))?;
        repo.insert("Steve", "hello there")?;

        let rows = repo.select_all()?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].npc_name, "Steve");
        assert_eq!(rows[0].message, "hello there");
        assert_eq!(rows[0].embedding, vec![0.125, -2.5]);
        Ok(())
    }

    #[test]
    fn test_ids_increase_and_history_filters_by_npc() -> Result<()> {
        let repo = repository(FixedEmbedder::new(vec![1.0]))?;
        repo.insert("Steve", "one")?;
        repo.insert("Alex", "two")?;
        repo.insert("Steve", "three")?;

        let ids: Vec<i64> = repo.select_all()?.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let steve: Vec<String> = repo
            .select_by_npc("Steve")?
            .into_iter()
            .map(|c| c.message)
            .collect();
        assert_eq!(steve, vec!["one", "three"]);
        assert_eq!(repo.count()?, 3);
        Ok(())
    }

    #[test]
    fn test_init_twice_keeps_rows() -> Result<()> {
        let repo = repository(FixedEmbedder::new(vec![1.0]))?;
        repo.insert("Steve", "keep me")?;
        repo.init()?;
        assert_eq!(repo.select_all()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_corrupt_blob_fails_scan() -> Result<()> {
        let repo = repository(FixedEmbedder::new(vec![1.0]))?;
        repo.insert("Steve", "fine")?;

        let mut statement = repo.client().prepare(
            "INSERT INTO conversations (npc_name, conversation, conversation_embedding) VALUES (?, ?, ?)",
        )?;
        statement
            .bind_text(1, "Steve")
            .bind_text(2, "broken")
            .bind_blob(3, vec![0u8; 7]);
        repo.client().execute_insert(&statement)?;

        assert!(matches!(
            repo.select_all(),
            Err(StoreError::MalformedVector { len: 7 })
        ));
        Ok(())
    }
}
