//! Deterministic in-process provider for unit tests

use super::{join_input, EmbeddingProvider};
use crate::error::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) struct FixedEmbedder {
    vectors: HashMap<String, Vec<f64>>,
    fallback: Vec<f64>,
    calls: AtomicUsize,
}

impl FixedEmbedder {
    pub(crate) fn new(fallback: Vec<f64>) -> Self {
        Self {
            vectors: HashMap::new(),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with(mut self, text: &str, vector: Vec<f64>) -> Self {
        self.vectors.insert(text.to_string(), vector);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for FixedEmbedder {
    fn generate_embedding(&self, texts: &[String]) -> Result<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let input = join_input(texts)?;
        Ok(self
            .vectors
            .get(&input)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}
