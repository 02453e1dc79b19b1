//! Requirements indexer - fills the requirements table from a crafting catalog
//!
//! A one-shot batch job, run on demand rather than on every startup. Only
//! recipes whose shape fits the supported grid are indexed. Every embedding
//! is generated before the first insert, so an unavailable catalog or
//! embedding provider leaves the table untouched. Recipes already stored
//! are skipped, so re-running on the same catalog adds nothing.
//!
//! # Example
//! ```no_run
//! use ainpc_store::indexer::{JsonCatalog, RequirementsIndexer, DEFAULT_SUPPORTED_SHAPE};
//! # fn run(repo: &ainpc_store::storage::RequirementsRepository,
//! #        embedder: std::sync::Arc<dyn ainpc_store::embeddings::EmbeddingProvider>)
//! #        -> ainpc_store::Result<()> {
//! let indexer = RequirementsIndexer::new(repo, embedder, DEFAULT_SUPPORTED_SHAPE);
//! let report = indexer.index(&JsonCatalog::new("recipes.json"))?;
//! println!("indexed {} recipes", report.indexed);
//! # Ok(())
//! # }
//! ```

mod catalog;

pub use catalog::{
    CraftingCatalog, CraftingDefinition, CraftingShape, Ingredient, JsonCatalog, RecipeId,
    DEFAULT_NAMESPACE,
};

use crate::embeddings::{embed_text, EmbeddingProvider};
use crate::error::Result;
use crate::storage::{BlocksNeeded, Repository, RequirementsRepository};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Recipe grid the indexer accepts unless configured otherwise
pub const DEFAULT_SUPPORTED_SHAPE: CraftingShape = CraftingShape::new(2, 2);

/// Crafting grid available without a crafting table
pub const INVENTORY_GRID: CraftingShape = CraftingShape::new(2, 2);

/// Outcome of one indexing run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub scanned: usize,
    pub skipped_shape: usize,
    pub skipped_invalid: usize,
    pub duplicates: usize,
    pub indexed: usize,
}

struct Pending {
    name: String,
    crafting_table_needed: bool,
    blocks_needed: BlocksNeeded,
}

pub struct RequirementsIndexer<'a> {
    repository: &'a RequirementsRepository,
    embedder: Arc<dyn EmbeddingProvider>,
    supported_shape: CraftingShape,
}

impl<'a> RequirementsIndexer<'a> {
    pub fn new(
        repository: &'a RequirementsRepository,
        embedder: Arc<dyn EmbeddingProvider>,
        supported_shape: CraftingShape,
    ) -> Self {
        Self {
            repository,
            embedder,
            supported_shape,
        }
    }

    /// Index every supported recipe of the catalog
    pub fn index(&self, catalog: &dyn CraftingCatalog) -> Result<IndexReport> {
        let recipes = catalog.recipes().map_err(|e| {
            error!(error = %e, "could not read crafting recipes, indexing aborted");
            e
        })?;

        let mut report = IndexReport {
            scanned: recipes.len(),
            ..Default::default()
        };
        let mut seen: HashSet<String> = self
            .repository
            .select_all()?
            .into_iter()
            .map(|r| r.name)
            .collect();
        let pending = self.select(&recipes, &mut seen, &mut report);

        let mut embedded = Vec::with_capacity(pending.len());
        for item in pending {
            let embedding = embed_text(self.embedder.as_ref(), &item.name)?;
            embedded.push((item, embedding));
        }

        for (item, embedding) in &embedded {
            self.repository.insert_embedded(
                &item.name,
                embedding,
                item.crafting_table_needed,
                &item.blocks_needed,
            )?;
        }
        report.indexed = embedded.len();

        info!(
            scanned = report.scanned,
            indexed = report.indexed,
            skipped_shape = report.skipped_shape,
            skipped_invalid = report.skipped_invalid,
            duplicates = report.duplicates,
            shape = %self.supported_shape,
            "requirements indexed"
        );
        Ok(report)
    }

    /// Recipes to insert; names already in `seen` (stored or earlier in the catalog) are duplicates
    fn select(
        &self,
        recipes: &[CraftingDefinition],
        seen: &mut HashSet<String>,
        report: &mut IndexReport,
    ) -> Vec<Pending> {
        let mut pending = Vec::new();

        for recipe in recipes {
            if !recipe.shape.fits(self.supported_shape) {
                debug!(recipe = %recipe.id, shape = %recipe.shape, "unsupported shape");
                report.skipped_shape += 1;
                continue;
            }

            let blocks_needed = match blocks_needed(recipe) {
                Ok(blocks) => blocks,
                Err(e) => {
                    warn!(recipe = %recipe.id, error = %e, "skipping recipe");
                    report.skipped_invalid += 1;
                    continue;
                }
            };

            let name = recipe.id.path.clone();
            if !seen.insert(name.clone()) {
                report.duplicates += 1;
                continue;
            }

            pending.push(Pending {
                name,
                crafting_table_needed: !recipe.shape.fits(INVENTORY_GRID),
                blocks_needed,
            });
        }
        pending
    }
}

/// Ingredient name -> count, using each slot's first alternative
pub fn blocks_needed(recipe: &CraftingDefinition) -> Result<BlocksNeeded> {
    let mut blocks = BlocksNeeded::new();
    for ingredient in &recipe.ingredients {
        if let Some(name) = ingredient.alternatives.first() {
            blocks.add(name.as_str(), ingredient.count)?;
        }
    }
    Ok(blocks)
}
