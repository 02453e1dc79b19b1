//! OpenAI-compatible embedding client (`POST {base}/embeddings`)

use super::{join_input, unavailable, EmbeddingProvider};
use crate::error::{Result, StoreError};
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub struct OpenAiEmbedder {
    base_url: String,
    model: String,
    api_key: String,
    http: HttpClient,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f64>,
}

impl OpenAiEmbedder {
    pub fn new(base_url: &str, model: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| unavailable("failed to create HTTP client", e))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            http,
        })
    }
}

impl EmbeddingProvider for OpenAiEmbedder {
    fn generate_embedding(&self, texts: &[String]) -> Result<Vec<f64>> {
        let input = join_input(texts)?;

        let response = self
            .http
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: &input,
            })
            .send()
            .map_err(|e| unavailable(&format!("failed to send embedding request to {}", self.base_url), e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(StoreError::EmbeddingUnavailable(format!(
                "embedding request failed ({}): {}",
                status, body
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .map_err(|e| unavailable("failed to parse embedding response", e))?;
        let embedding = first_embedding(body)?;
        debug!(model = %self.model, dimension = embedding.len(), "generated embedding");
        Ok(embedding)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    /// Health check against the models endpoint
    fn check_reachable(&self) -> Result<()> {
        let response = self
            .http
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .map_err(|e| unavailable(&format!("failed to connect to {}", self.base_url), e))?;

        if !response.status().is_success() {
            return Err(StoreError::EmbeddingUnavailable(format!(
                "{} returned status: {}",
                self.base_url,
                response.status()
            )));
        }
        Ok(())
    }
}

fn first_embedding(body: EmbeddingResponse) -> Result<Vec<f64>> {
    body.data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| StoreError::EmbeddingUnavailable("response contained no embedding".to_string()))
}
