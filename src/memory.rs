//! NPC memory facade - one connection, three repositories, one retriever
//!
//! Opened once when the host starts and closed when it stops. The host calls
//! into [`LifecycleHook`] instead of the store registering itself on a game
//! event bus.

use crate::config::Config;
use crate::db::SqliteClient;
use crate::embeddings::EmbeddingProvider;
use crate::error::Result;
use crate::indexer::{CraftingCatalog, CraftingShape, IndexReport, RequirementsIndexer};
use crate::retrieval::{SimilarityRetriever, DEFAULT_TOP_K};
use crate::storage::{
    Action, ActionsRepository, Conversation, ConversationRepository, Repository, Requirement,
    RequirementsRepository,
};
use std::sync::Arc;
use tracing::info;

/// Callbacks the host environment invokes around its own lifecycle
pub trait LifecycleHook {
    /// The host is shutting down; release resources
    fn on_stopping(&self) -> Result<()>;
}

pub struct NpcMemory {
    client: Arc<SqliteClient>,
    embedder: Arc<dyn EmbeddingProvider>,
    conversations: ConversationRepository,
    requirements: RequirementsRepository,
    actions: ActionsRepository,
    retriever: SimilarityRetriever,
    supported_shape: CraftingShape,
}

impl NpcMemory {
    /// Open the configured database file and make sure every table exists
    pub fn open(config: &Config, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let client = Arc::new(SqliteClient::open(config.database.path())?);
        let retriever = SimilarityRetriever::from_config(Arc::clone(&embedder), &config.retrieval);
        Self::assemble(client, embedder, retriever, config.indexer.supported_shape())
    }

    /// In-memory store with default settings, for tests and tooling
    pub fn in_memory(embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let client = Arc::new(SqliteClient::open_in_memory()?);
        let retriever = SimilarityRetriever::new(Arc::clone(&embedder), DEFAULT_TOP_K);
        Self::assemble(
            client,
            embedder,
            retriever,
            crate::indexer::DEFAULT_SUPPORTED_SHAPE,
        )
    }

    fn assemble(
        client: Arc<SqliteClient>,
        embedder: Arc<dyn EmbeddingProvider>,
        retriever: SimilarityRetriever,
        supported_shape: CraftingShape,
    ) -> Result<Self> {
        let memory = Self {
            conversations: ConversationRepository::new(Arc::clone(&client), Arc::clone(&embedder)),
            requirements: RequirementsRepository::new(Arc::clone(&client), Arc::clone(&embedder)),
            actions: ActionsRepository::new(Arc::clone(&client), Arc::clone(&embedder)),
            client,
            embedder,
            retriever,
            supported_shape,
        };

        memory.conversations.init()?;
        memory.requirements.init()?;
        memory.actions.init()?;
        info!(path = memory.client.location(), model = memory.embedder.model_name(), "NPC memory ready");
        Ok(memory)
    }

    pub fn conversations(&self) -> &ConversationRepository {
        &self.conversations
    }

    pub fn requirements(&self) -> &RequirementsRepository {
        &self.requirements
    }

    pub fn actions(&self) -> &ActionsRepository {
        &self.actions
    }

    pub fn retriever(&self) -> &SimilarityRetriever {
        &self.retriever
    }

    pub fn client(&self) -> &SqliteClient {
        &self.client
    }

    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.embedder.as_ref()
    }

    pub fn relevant_conversations(&self, prompt: &str) -> Result<Vec<Conversation>> {
        self.retriever
            .get_most_relevant_resources(&self.conversations, prompt)
    }

    pub fn relevant_requirements(&self, prompt: &str) -> Result<Vec<Requirement>> {
        self.retriever
            .get_most_relevant_resources(&self.requirements, prompt)
    }

    pub fn relevant_actions(&self, prompt: &str) -> Result<Vec<Action>> {
        self.retriever
            .get_most_relevant_resources(&self.actions, prompt)
    }

    /// Run the requirements indexer against a catalog
    pub fn index_requirements(&self, catalog: &dyn CraftingCatalog) -> Result<IndexReport> {
        RequirementsIndexer::new(
            &self.requirements,
            Arc::clone(&self.embedder),
            self.supported_shape,
        )
        .index(catalog)
    }

    /// Close the shared connection; later calls fail with `ConnectionClosed`
    pub fn shutdown(&self) -> Result<()> {
        self.client.close()
    }
}

impl LifecycleHook for NpcMemory {
    fn on_stopping(&self) -> Result<()> {
        self.shutdown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::fixture::FixedEmbedder;
    use crate::error::StoreError;

    #[test]
    fn test_open_creates_all_tables() -> Result<()> {
        let memory = NpcMemory::in_memory(Arc::new(FixedEmbedder::new(vec![1.0])))?;
        for table in ["conversations", "requirements", "actions"] {
            assert!(memory.client().table_exists(table)?, "missing table {}", table);
        }
        Ok(())
    }

    #[test]
    fn test_stopping_hook_closes_everything() -> Result<()> {
        let memory = NpcMemory::in_memory(Arc::new(FixedEmbedder::new(vec![1.0])))?;
        memory.conversations().insert("Steve", "hi")?;

        let hook: &dyn LifecycleHook = &memory;
        hook.on_stopping()?;

        assert!(matches!(memory.conversations().select_all(), Err(StoreError::ConnectionClosed)));
        assert!(matches!(memory.actions().insert("a", "b", "c"), Err(StoreError::ConnectionClosed)));
        assert!(matches!(memory.requirements().select(&[1]), Err(StoreError::ConnectionClosed)));
        assert!(matches!(memory.relevant_conversations("hi"), Err(StoreError::ConnectionClosed)));
        Ok(())
    }
}
