//! Configuration for the NPC memory store
//!
//! Read from a TOML file. A missing file is replaced by a default one, so the
//! first run leaves an editable config behind.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::indexer::CraftingShape;

/// Identifier of the mod; names the config and database directories
pub const MOD_ID: &str = "ai-npc";

/// Environment variable consulted when no OpenAI key is configured
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub embeddings: EmbeddingsConfig,
    pub retrieval: RetrievalConfig,
    pub indexer: IndexerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub dir: PathBuf,
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dir: base_dir().join(format!("{}_db", MOD_ID)),
            name: MOD_ID.to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Full path of the SQLite file
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.db", self.name))
    }
}

/// Which embedding backend to talk to (`npc.llm.type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Ollama,
    #[serde(rename = "openai")]
    OpenAi,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    pub provider: ProviderKind,
    pub ollama_url: String,
    pub ollama_model: String,
    pub openai_base_url: String,
    pub openai_model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    /// Deadline for a single embedding call
    pub timeout_secs: u64,
    /// Size of the worker pool embedding calls run on
    pub workers: usize,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "nomic-embed-text".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "text-embedding-3-small".to_string(),
            openai_api_key: None,
            timeout_secs: 30,
            workers: 2,
        }
    }
}

impl EmbeddingsConfig {
    /// Configured OpenAI key, falling back to the environment
    pub fn api_key(&self) -> Option<String> {
        self.openai_api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(ENV_OPENAI_API_KEY).ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of resources returned by a relevance query
    pub top_k: usize,
    /// Drop candidates scoring below this cosine similarity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: crate::retrieval::DEFAULT_TOP_K,
            min_score: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub grid_rows: u32,
    pub grid_columns: u32,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        let shape = crate::indexer::DEFAULT_SUPPORTED_SHAPE;
        Self {
            grid_rows: shape.rows,
            grid_columns: shape.columns,
        }
    }
}

impl IndexerConfig {
    pub fn supported_shape(&self) -> CraftingShape {
        CraftingShape::new(self.grid_rows, self.grid_columns)
    }
}

impl Config {
    /// Default location: `<config dir>/ai-npc/config.toml`
    pub fn default_path() -> PathBuf {
        base_dir().join("config.toml")
    }

    /// Load configuration, writing the defaults first if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Self::create_default(path);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).context("Failed to parse config TOML")
    }

    fn create_default(path: &Path) -> Result<Self> {
        let config = Config::default();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&config).context("Failed to serialize config")?;
        std::fs::write(path, format!("# AI NPC memory configuration\n{}", content))
            .with_context(|| format!("Failed to write default config: {}", path.display()))?;

        Ok(config)
    }
}

fn base_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(MOD_ID)
}
