//! End-to-end tests through the NpcMemory facade

mod common;

use ainpc_store::config::Config;
use ainpc_store::{LifecycleHook, NpcMemory, Repository, StoreError};
use common::{KeywordEmbedder, OfflineEmbedder};
use std::sync::Arc;
use tempfile::TempDir;

fn village_embedder() -> KeywordEmbedder {
    KeywordEmbedder::new(&[0.0, 1.0])
        .with("the village is east", &[1.0, 0.0])
        .with("the village has a well", &[0.9, 0.1])
        .with("I like turtles", &[0.0, 1.0])
        .with("where is the village?", &[1.0, 0.0])
}

fn config_in(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.database.dir = dir.path().join("ai-npc_db");
    config
}

#[test]
fn test_conversations_ranked_by_relevance() {
    let memory = NpcMemory::in_memory(Arc::new(village_embedder())).unwrap();
    for message in ["the village is east", "I like turtles", "the village has a well"] {
        memory.conversations().insert("Steve", message).unwrap();
    }

    let relevant = memory.relevant_conversations("where is the village?").unwrap();
    let messages: Vec<&str> = relevant.iter().map(|c| c.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["the village is east", "the village has a well", "I like turtles"],
        "Closest conversation should come first"
    );
}

#[test]
fn test_top_k_limits_results() {
    let memory = NpcMemory::in_memory(Arc::new(village_embedder())).unwrap();
    for message in ["the village is east", "I like turtles", "the village has a well"] {
        memory.conversations().insert("Alex", message).unwrap();
    }

    let retriever = memory.retriever().clone().with_top_k(1);
    let best = retriever
        .get_most_relevant_resources(memory.conversations(), "where is the village?")
        .unwrap();
    assert_eq!(best.len(), 1);
    assert_eq!(best[0].message, "the village is east");
}

#[test]
fn test_empty_store_returns_nothing() {
    // Empty tables never reach the provider
    let memory = NpcMemory::in_memory(Arc::new(OfflineEmbedder)).unwrap();
    assert!(memory.relevant_conversations("hello").unwrap().is_empty());
    assert!(memory.relevant_requirements("hello").unwrap().is_empty());
    assert!(memory.relevant_actions("hello").unwrap().is_empty());
}

#[test]
fn test_provider_outage_is_recoverable() {
    let memory = NpcMemory::in_memory(Arc::new(OfflineEmbedder)).unwrap();
    let err = memory.conversations().insert("Steve", "hello").unwrap_err();
    assert!(err.is_recoverable(), "Provider outage should be recoverable: {err}");
    assert_eq!(memory.conversations().count().unwrap(), 0, "Nothing should be written");
}

#[test]
fn test_actions_roundtrip_through_retrieval() {
    let embedder = KeywordEmbedder::new(&[0.0, 1.0])
        .with("walk to a position", &[1.0, 0.0])
        .with("mine a block", &[0.0, 1.0])
        .with("go over there", &[0.95, 0.05]);
    let memory = NpcMemory::in_memory(Arc::new(embedder)).unwrap();

    memory
        .actions()
        .insert("walk", "walk to a position", "walk 10 64 -3")
        .unwrap();
    memory
        .actions()
        .insert("mine", "mine a block", "mine oak_log")
        .unwrap();

    let actions = memory.relevant_actions("go over there").unwrap();
    assert_eq!(actions[0].name, "walk");
    assert_eq!(actions[0].example, "walk 10 64 -3");
    assert_eq!(actions[1].name, "mine");
}

#[test]
fn test_reopen_keeps_rows_and_schema() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    {
        let memory = NpcMemory::open(&config, Arc::new(village_embedder())).unwrap();
        memory.conversations().insert("Steve", "the village is east").unwrap();
        memory.on_stopping().unwrap();
    }

    assert!(config.database.path().exists(), "Database file should be created");

    let memory = NpcMemory::open(&config, Arc::new(village_embedder())).unwrap();
    let rows = memory.conversations().select_all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].npc_name, "Steve");
    assert_eq!(rows[0].embedding, vec![1.0, 0.0]);

    memory.conversations().insert("Steve", "I like turtles").unwrap();
    let ids: Vec<i64> = memory
        .conversations()
        .select_all()
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn test_everything_fails_after_stopping() {
    let memory = NpcMemory::in_memory(Arc::new(village_embedder())).unwrap();
    memory.on_stopping().unwrap();

    assert!(matches!(
        memory.conversations().insert("Steve", "hi"),
        Err(StoreError::ConnectionClosed)
    ));
    assert!(matches!(
        memory.relevant_actions("hi"),
        Err(StoreError::ConnectionClosed)
    ));
    assert!(matches!(
        memory.client().execute_query("SELECT 1"),
        Err(StoreError::ConnectionClosed)
    ));

    // Closing twice is harmless
    memory.shutdown().unwrap();
}
