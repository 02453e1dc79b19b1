//! Ollama embedding client (`POST /api/embed`)

use super::{join_input, unavailable, EmbeddingProvider};
use crate::error::{Result, StoreError};
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    http: HttpClient,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f64>>,
}

impl OllamaEmbedder {
    /// Create a client for the given address (host:port or full URL)
    pub fn new(address: &str, model: &str, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| unavailable("failed to create HTTP client", e))?;

        Ok(Self {
            base_url: normalize_url(address),
            model: model.to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl EmbeddingProvider for OllamaEmbedder {
    fn generate_embedding(&self, texts: &[String]) -> Result<Vec<f64>> {
        let input = join_input(texts)?;
        let url = format!("{}/api/embed", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&EmbedRequest {
                model: &self.model,
                input: &input,
            })
            .send()
            .map_err(|e| unavailable(&format!("failed to send embed request to {}", self.base_url), e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(StoreError::EmbeddingUnavailable(format!(
                "Ollama embed failed ({}): {}",
                status, body
            )));
        }

        let body: EmbedResponse = response
            .json()
            .map_err(|e| unavailable("failed to parse embed response", e))?;
        let embedding = first_embedding(body)?;
        debug!(model = %self.model, dimension = embedding.len(), "generated embedding");
        Ok(embedding)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    /// Health check - Ok if the Ollama server answers
    fn check_reachable(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| unavailable(&format!("failed to connect to Ollama at {}", self.base_url), e))?;

        if !response.status().is_success() {
            return Err(StoreError::EmbeddingUnavailable(format!(
                "Ollama returned status: {}",
                response.status()
            )));
        }
        Ok(())
    }
}

fn first_embedding(body: EmbedResponse) -> Result<Vec<f64>> {
    body.embeddings
        .into_iter()
        .next()
        .filter(|e| !e.is_empty())
        .ok_or_else(|| StoreError::EmbeddingUnavailable("Ollama returned no embedding".to_string()))
}

fn normalize_url(address: &str) -> String {
    let address = address.trim_end_matches('/');
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    }
}
