//! Crafting requirements - one row per indexed recipe
//!
//! `blocks_needed` is stored as `name=count` pairs joined by commas, e.g.
//! `oak_planks=4,stick=2`. An empty map is stored as the empty string.

use super::types::Requirement;
use super::{row_embedding, Repository};
use crate::db::{Row, SqlValue, SqliteClient};
use crate::embeddings::{embed_text, EmbeddingProvider};
use crate::error::{Result, StoreError};
use crate::vector;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

pub const TABLE: &str = "requirements";

/// Block name -> required count
///
/// Names are non-empty and never contain `=` or `,`; insertion enforces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlocksNeeded(BTreeMap<String, u32>);

impl BlocksNeeded {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pairs; later duplicates overwrite earlier ones
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut blocks = Self::new();
        for (name, count) in pairs {
            blocks.insert(name, count)?;
        }
        Ok(blocks)
    }

    /// Set the count for a block
    pub fn insert(&mut self, name: impl Into<String>, count: u32) -> Result<()> {
        let name = validate_name(name.into())?;
        self.0.insert(name, count);
        Ok(())
    }

    /// Add to the count for a block, collapsing duplicates
    pub fn add(&mut self, name: impl Into<String>, count: u32) -> Result<()> {
        let name = validate_name(name.into())?;
        let total = self.0.entry(name).or_insert(0);
        *total = total.checked_add(count).ok_or_else(|| {
            StoreError::InvalidBlocksNeeded(format!("count overflows after adding {}", count))
        })?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }
}

fn validate_name(name: String) -> Result<String> {
    if name.is_empty() || name.contains('=') || name.contains(',') {
        return Err(StoreError::InvalidBlocksNeeded(format!(
            "block name {:?} must be non-empty and free of '=' and ','",
            name
        )));
    }
    Ok(name)
}

/// Render as `name=count` pairs joined by commas
pub fn serialize_blocks_needed(blocks: &BlocksNeeded) -> String {
    blocks
        .iter()
        .map(|(name, count)| format!("{}={}", name, count))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse the column text: split on `,`, then each pair on its first `=`
pub fn parse_blocks_needed(text: &str) -> Result<BlocksNeeded> {
    let mut blocks = BlocksNeeded::new();
    if text.is_empty() {
        return Ok(blocks);
    }

    for pair in text.split(',') {
        let (name, count) = pair.split_once('=').ok_or_else(|| {
            StoreError::InvalidBlocksNeeded(format!("pair {:?} has no '='", pair))
        })?;
        let count: u32 = count.parse().map_err(|_| {
            StoreError::InvalidBlocksNeeded(format!("count {:?} of {:?} is not a number", count, name))
        })?;
        if blocks.get(name).is_some() {
            return Err(StoreError::InvalidBlocksNeeded(format!(
                "block {:?} listed twice",
                name
            )));
        }
        blocks.insert(name, count)?;
    }
    Ok(blocks)
}

impl fmt::Display for BlocksNeeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize_blocks_needed(self))
    }
}

impl FromStr for BlocksNeeded {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        parse_blocks_needed(s)
    }
}

pub struct RequirementsRepository {
    client: Arc<SqliteClient>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl RequirementsRepository {
    pub fn new(client: Arc<SqliteClient>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { client, embedder }
    }

    /// Store a recipe requirement, embedding the recipe name
    pub fn insert(
        &self,
        name: &str,
        crafting_table_needed: bool,
        blocks_needed: &BlocksNeeded,
    ) -> Result<()> {
        let embedding = embed_text(self.embedder.as_ref(), name)?;
        self.insert_embedded(name, &embedding, crafting_table_needed, blocks_needed)
    }

    /// Store a recipe requirement with an embedding computed elsewhere
    pub fn insert_embedded(
        &self,
        name: &str,
        name_embedding: &[f64],
        crafting_table_needed: bool,
        blocks_needed: &BlocksNeeded,
    ) -> Result<()> {
        let mut statement = self.client.prepare(
            "INSERT INTO requirements (name, name_embedding, crafting_table_needed, blocks_needed) VALUES (?, ?, ?, ?)",
        )?;
        statement
            .bind_text(1, name)
            .bind_blob(2, vector::encode(name_embedding))
            .bind_bool(3, crafting_table_needed)
            .bind_text(4, serialize_blocks_needed(blocks_needed));
        self.client.execute_insert(&statement)?;

        debug!(recipe = name, "requirement stored");
        Ok(())
    }

    /// Fetch the requirements with the given ids, in primary key order
    ///
    /// Unknown ids are ignored.
    pub fn select(&self, ids: &[i64]) -> Result<Vec<Requirement>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT * FROM requirements WHERE id IN ({}) ORDER BY id",
            placeholders
        );
        let params: Vec<SqlValue> = ids.iter().map(|&id| SqlValue::Integer(id)).collect();

        self.client
            .query(&sql, &params)?
            .map(|row| from_row(&row))
            .collect()
    }
}

impl Repository for RequirementsRepository {
    type Record = Requirement;

    fn table(&self) -> &'static str {
        TABLE
    }

    fn client(&self) -> &SqliteClient {
        &self.client
    }

    fn create_table(&self) -> Result<()> {
        self.client.execute_ddl(
            "CREATE TABLE IF NOT EXISTS requirements (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                name_embedding BLOB,
                crafting_table_needed BOOLEAN NOT NULL,
                blocks_needed TEXT NOT NULL
            );",
        )
    }

    fn select_all(&self) -> Result<Vec<Requirement>> {
        self.client
            .execute_query("SELECT * FROM requirements ORDER BY id")?
            .map(|row| from_row(&row))
            .collect()
    }
}

fn from_row(row: &Row) -> Result<Requirement> {
    Ok(Requirement {
        id: row.get_i64("id")?,
        name: row.get_text("name")?,
        embedding: row_embedding(row, "name_embedding")?,
        crafting_table_needed: row.get_bool("crafting_table_needed")?,
        blocks_needed: parse_blocks_needed(&row.get_text("blocks_needed")?)?,
    })
}
