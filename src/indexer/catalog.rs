//! Crafting definitions as handed over by the host game
//!
//! The indexer only reads a catalog; it never changes it.

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Namespace used when a recipe id is given without one
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// Grid size of a shaped recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingShape {
    pub rows: u32,
    pub columns: u32,
}

impl CraftingShape {
    pub const fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    /// Whether this shape can be laid out inside `grid`
    pub fn fits(&self, grid: CraftingShape) -> bool {
        self.rows <= grid.rows && self.columns <= grid.columns
    }
}

impl fmt::Display for CraftingShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.columns)
    }
}

/// `namespace:path` identifier of a recipe
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecipeId {
    pub namespace: String,
    pub path: String,
}

impl RecipeId {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
        }
    }
}

impl TryFrom<String> for RecipeId {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let (namespace, path) = value
            .split_once(':')
            .unwrap_or((DEFAULT_NAMESPACE, value.as_str()));
        if namespace.is_empty() || path.is_empty() {
            return Err(format!("invalid recipe id {:?}", value));
        }
        Ok(RecipeId::new(namespace, path))
    }
}

impl From<RecipeId> for String {
    fn from(id: RecipeId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

/// One ingredient slot: any of `alternatives` satisfies it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub alternatives: Vec<String>,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

impl Ingredient {
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            alternatives: vec![name.into()],
            count: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingDefinition {
    pub id: RecipeId,
    pub shape: CraftingShape,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

/// Read-only source of crafting definitions
pub trait CraftingCatalog {
    /// All known definitions, or [`StoreError::CatalogUnavailable`]
    fn recipes(&self) -> Result<Vec<CraftingDefinition>>;
}

impl CraftingCatalog for Vec<CraftingDefinition> {
    fn recipes(&self) -> Result<Vec<CraftingDefinition>> {
        Ok(self.clone())
    }
}

/// Catalog exported to a JSON file: an array of crafting definitions
///
/// ```json
/// [{"id": "minecraft:oak_planks", "shape": {"rows": 1, "columns": 1},
///   "ingredients": [{"alternatives": ["oak_log"], "count": 1}]}]
/// ```
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CraftingCatalog for JsonCatalog {
    fn recipes(&self) -> Result<Vec<CraftingDefinition>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            StoreError::CatalogUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            StoreError::CatalogUnavailable(format!("{}: {}", self.path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_fits() {
        let grid = CraftingShape::new(2, 2);
        assert!(CraftingShape::new(2, 2).fits(grid));
        assert!(CraftingShape::new(1, 2).fits(grid));
        assert!(!CraftingShape::new(3, 3).fits(grid));
        assert!(!CraftingShape::new(1, 3).fits(grid));
    }

    #[test]
    fn test_recipe_id_parsing() {
        let id = RecipeId::try_from("mymod:copper_torch".to_string()).unwrap();
        assert_eq!(id.namespace, "mymod");
        assert_eq!(id.path, "copper_torch");

        let id = RecipeId::try_from("stick".to_string()).unwrap();
        assert_eq!(id.to_string(), "minecraft:stick");

        assert!(RecipeId::try_from(":stick".to_string()).is_err());
    }

    #[test]
    fn test_json_catalog() -> Result<()> {
        let temp = tempfile::TempDir::new()?;
        let path = temp.path().join("recipes.json");
        std::fs::write(
            &path,
            r#"[{"id": "minecraft:torch", "shape": {"rows": 2, "columns": 1},
                 "ingredients": [{"alternatives": ["coal", "charcoal"]}, {"alternatives": ["stick"]}]}]"#,
        )?;

        let recipes = JsonCatalog::new(&path).recipes()?;
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].id.path, "torch");
        assert_eq!(recipes[0].shape, CraftingShape::new(2, 1));
        assert_eq!(recipes[0].ingredients[0].count, 1);
        Ok(())
    }

    #[test]
    fn test_missing_json_catalog_is_unavailable() {
        let catalog = JsonCatalog::new("/nonexistent/recipes.json");
        assert!(matches!(
            catalog.recipes(),
            Err(StoreError::CatalogUnavailable(_))
        ));
    }
}
