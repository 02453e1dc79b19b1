pub mod config;
pub mod db;
pub mod embeddings;
pub mod error;
pub mod indexer;
pub mod logging;
pub mod memory;
pub mod retrieval;
pub mod storage;
pub mod vector;

// Re-export commonly used types
pub use error::{Result, StoreError};
pub use memory::{LifecycleHook, NpcMemory};
pub use storage::{Action, Conversation, Repository, Requirement, Resource};
