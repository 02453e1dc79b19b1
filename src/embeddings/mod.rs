//! Embeddings module - semantic vectors for NPC memory
//!
//! The embedding model is an external service. This module defines the
//! provider seam the repositories depend on, the HTTP clients for the
//! supported backends, and a pooled wrapper that puts a deadline on calls.

#[cfg(test)]
pub(crate) mod fixture;
mod lazy;
mod ollama;
mod openai;
mod pool;
mod similarity;

pub use lazy::LazyProvider;
pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;
pub use pool::PooledEmbedder;
pub use similarity::cosine_similarity;

use crate::config::{EmbeddingsConfig, ProviderKind};
use crate::error::{Result, StoreError};
use std::sync::Arc;
use std::time::Duration;

/// Source of embedding vectors
///
/// Requires Send + Sync: one provider is shared by every repository and may
/// be called from the embedding worker pool.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed the given texts as one input and return a single vector
    ///
    /// Any failure is reported as [`StoreError::EmbeddingUnavailable`].
    fn generate_embedding(&self, texts: &[String]) -> Result<Vec<f64>>;

    /// Model name, for logging
    fn model_name(&self) -> &str;

    /// Health check; Ok if the backing service answers
    fn check_reachable(&self) -> Result<()> {
        Ok(())
    }
}

impl<T: EmbeddingProvider + ?Sized> EmbeddingProvider for Arc<T> {
    fn generate_embedding(&self, texts: &[String]) -> Result<Vec<f64>> {
        (**self).generate_embedding(texts)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn check_reachable(&self) -> Result<()> {
        (**self).check_reachable()
    }
}

/// Convenience for embedding one string
pub fn embed_text(provider: &dyn EmbeddingProvider, text: &str) -> Result<Vec<f64>> {
    provider.generate_embedding(&[text.to_string()])
}

/// Build the configured provider, wrapped in a bounded pool with a deadline
pub fn create_provider(config: &EmbeddingsConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let timeout = Duration::from_secs(config.timeout_secs);

    let inner: Arc<dyn EmbeddingProvider> = match config.provider {
        ProviderKind::Ollama => Arc::new(OllamaEmbedder::new(
            &config.ollama_url,
            &config.ollama_model,
            timeout,
        )?),
        ProviderKind::OpenAi => {
            let api_key = config.api_key().ok_or_else(|| {
                StoreError::EmbeddingUnavailable(format!(
                    "no OpenAI API key configured (set openai_api_key or {})",
                    crate::config::ENV_OPENAI_API_KEY
                ))
            })?;
            Arc::new(OpenAiEmbedder::new(
                &config.openai_base_url,
                &config.openai_model,
                &api_key,
                timeout,
            )?)
        }
    };

    Ok(Arc::new(PooledEmbedder::new(inner, config.workers, timeout)?))
}

/// Join the inputs the way every backend expects a single prompt
pub(crate) fn join_input(texts: &[String]) -> Result<String> {
    if texts.is_empty() {
        return Err(StoreError::EmbeddingUnavailable(
            "no input text to embed".to_string(),
        ));
    }
    Ok(texts.join(" "))
}

pub(crate) fn unavailable(context: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::EmbeddingUnavailable(format!("{}: {}", context, err))
}
