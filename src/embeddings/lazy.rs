//! Provider built on first use
//!
//! Construction waits until a call needs the provider; listing and counting
//! never do. A failed build is retried on the next call.

use super::{create_provider, EmbeddingProvider};
use crate::config::{EmbeddingsConfig, ProviderKind};
use crate::error::Result;
use std::sync::{Arc, OnceLock};

pub struct LazyProvider {
    config: EmbeddingsConfig,
    provider: OnceLock<Arc<dyn EmbeddingProvider>>,
}

impl LazyProvider {
    pub fn new(config: EmbeddingsConfig) -> Self {
        Self {
            config,
            provider: OnceLock::new(),
        }
    }

    /// Whether the underlying provider has been built yet
    pub fn is_built(&self) -> bool {
        self.provider.get().is_some()
    }

    fn get(&self) -> Result<&Arc<dyn EmbeddingProvider>> {
        if let Some(provider) = self.provider.get() {
            return Ok(provider);
        }
        let built = create_provider(&self.config)?;
        Ok(self.provider.get_or_init(|| built))
    }
}

impl EmbeddingProvider for LazyProvider {
    fn generate_embedding(&self, texts: &[String]) -> Result<Vec<f64>> {
        self.get()?.generate_embedding(texts)
    }

    fn model_name(&self) -> &str {
        match self.config.provider {
            ProviderKind::Ollama => &self.config.ollama_model,
            ProviderKind::OpenAi => &self.config.openai_model,
        }
    }

    fn check_reachable(&self) -> Result<()> {
        self.get()?.check_reachable()
    }
}
