//! Similarity retrieval over stored resources
//!
//! Exhaustive and exact: the prompt is embedded once, every candidate is
//! scored by cosine similarity, and the best `top_k` are returned. Scores
//! tie-break on primary key ascending so results are deterministic for a
//! fixed prompt embedding and fixed data.
//!
//! # Example
//!
//! ```ignore
//! let retriever = SimilarityRetriever::new(embedder, DEFAULT_TOP_K);
//! let relevant = retriever.get_most_relevant_resources(&conversations, "where is the village?")?;
//! ```

use crate::config::RetrievalConfig;
use crate::embeddings::{cosine_similarity, embed_text, EmbeddingProvider};
use crate::error::{Result, StoreError};
use crate::storage::{Repository, Requirement, RequirementsRepository, Resource};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Number of resources returned when nothing else is configured
pub const DEFAULT_TOP_K: usize = 5;

/// A resource paired with its similarity to the query
#[derive(Debug, Clone, Serialize)]
pub struct Scored<R> {
    pub resource: R,
    pub score: f64,
}

/// Score candidates against a query embedding and keep the best `top_k`
///
/// Candidates scoring below `min_score` are dropped. A candidate whose
/// dimension differs from the query fails the whole ranking.
pub fn rank<R: Resource>(
    query: &[f64],
    candidates: Vec<R>,
    top_k: usize,
    min_score: Option<f64>,
) -> Result<Vec<Scored<R>>> {
    let mut scored = Vec::with_capacity(candidates.len());
    for resource in candidates {
        let actual = resource.embedding().len();
        if actual != query.len() {
            return Err(StoreError::DimensionMismatch {
                expected: query.len(),
                actual,
            });
        }

        let score = cosine_similarity(query, resource.embedding());
        if min_score.is_some_and(|min| score < min) {
            continue;
        }
        scored.push(Scored { resource, score });
    }

    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.resource.id().cmp(&b.resource.id()))
    });
    scored.truncate(top_k);
    Ok(scored)
}

#[derive(Clone)]
pub struct SimilarityRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
    min_score: Option<f64>,
}

impl SimilarityRetriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, top_k: usize) -> Self {
        Self {
            embedder,
            top_k,
            min_score: None,
        }
    }

    pub fn from_config(embedder: Arc<dyn EmbeddingProvider>, config: &RetrievalConfig) -> Self {
        Self {
            embedder,
            top_k: config.top_k,
            min_score: config.min_score,
        }
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// The most relevant rows of a repository for a prompt, best first
    pub fn get_most_relevant_resources<R: Repository>(
        &self,
        repository: &R,
        prompt: &str,
    ) -> Result<Vec<R::Record>> {
        Ok(self
            .search_with_scores(repository, prompt)?
            .into_iter()
            .map(|s| s.resource)
            .collect())
    }

    /// Same as [`Self::get_most_relevant_resources`] but keeps the scores
    pub fn search_with_scores<R: Repository>(
        &self,
        repository: &R,
        prompt: &str,
    ) -> Result<Vec<Scored<R::Record>>> {
        let candidates = repository.select_all()?;
        debug!(table = repository.table(), candidates = candidates.len(), "ranking resources");
        self.score_candidates(prompt, candidates)
    }

    /// Rank only the requirements with the given ids
    pub fn get_most_relevant_requirements(
        &self,
        repository: &RequirementsRepository,
        prompt: &str,
        ids: &[i64],
    ) -> Result<Vec<Requirement>> {
        let candidates = repository.select(ids)?;
        Ok(self
            .score_candidates(prompt, candidates)?
            .into_iter()
            .map(|s| s.resource)
            .collect())
    }

    fn score_candidates<R: Resource>(&self, prompt: &str, candidates: Vec<R>) -> Result<Vec<Scored<R>>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let query = embed_text(self.embedder.as_ref(), prompt)?;
        rank(&query, candidates, self.top_k, self.min_score)
    }
}
