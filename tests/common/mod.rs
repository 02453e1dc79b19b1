//! Shared helpers for integration tests

use ainpc_store::embeddings::EmbeddingProvider;
use ainpc_store::{Result, StoreError};
use std::collections::HashMap;

/// Maps known texts to fixed vectors; anything else embeds to `fallback`
pub struct KeywordEmbedder {
    vectors: HashMap<String, Vec<f64>>,
    fallback: Vec<f64>,
}

impl KeywordEmbedder {
    pub fn new(fallback: &[f64]) -> Self {
        Self {
            vectors: HashMap::new(),
            fallback: fallback.to_vec(),
        }
    }

    pub fn with(mut self, text: &str, vector: &[f64]) -> Self {
        self.vectors.insert(text.to_string(), vector.to_vec());
        self
    }
}

impl EmbeddingProvider for KeywordEmbedder {
    fn generate_embedding(&self, texts: &[String]) -> Result<Vec<f64>> {
        let input = texts.join(" ");
        Ok(self.vectors.get(&input).cloned().unwrap_or_else(|| self.fallback.clone()))
    }

    fn model_name(&self) -> &str {
        "keyword"
    }
}

/// Provider whose backend is always down
pub struct OfflineEmbedder;

impl EmbeddingProvider for OfflineEmbedder {
    fn generate_embedding(&self, _texts: &[String]) -> Result<Vec<f64>> {
        Err(StoreError::EmbeddingUnavailable("connection refused".to_string()))
    }

    fn model_name(&self) -> &str {
        "offline"
    }
}
