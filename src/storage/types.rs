//! Domain types for the storage layer
//!
//! These types don't know about SQLite. Repositories handle the translation
//! to and from rows.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::requirements::BlocksNeeded;

/// Any persisted record carrying an embedding, the unit of similarity retrieval
pub trait Resource {
    /// Engine-assigned primary key
    fn id(&self) -> i64;

    fn embedding(&self) -> &[f64];
}

/// One logged dialogue turn of an NPC
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    pub id: i64,
    pub npc_name: String,
    pub message: String,
    #[serde(skip_serializing)]
    pub embedding: Vec<f64>,
    pub created_at: NaiveDateTime,
}

/// What it takes to craft one recipe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Requirement {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing)]
    pub embedding: Vec<f64>,
    pub crafting_table_needed: bool,
    pub blocks_needed: BlocksNeeded,
}

/// A capability the NPC can perform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing)]
    pub embedding: Vec<f64>,
    pub example: String,
    pub created_at: NaiveDateTime,
}

impl Resource for Conversation {
    fn id(&self) -> i64 {
        self.id
    }

    fn embedding(&self) -> &[f64] {
        &self.embedding
    }
}

impl Resource for Requirement {
    fn id(&self) -> i64 {
        self.id
    }

    fn embedding(&self) -> &[f64] {
        &self.embedding
    }
}

impl Resource for Action {
    fn id(&self) -> i64 {
        self.id
    }

    fn embedding(&self) -> &[f64] {
        &self.embedding
    }
}
