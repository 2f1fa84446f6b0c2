//! # Genealogy - family tree record keeping
//!
//! Stores family members and answers relationship queries over them.
//!
//! Genealogy provides:
//! - A `Member` record with direct links to father, mother and partner
//! - A storage-agnostic `MemberRepository` contract with SQLite and in-memory backends
//! - A relationship resolver deriving siblings, cousins, aunts/uncles and grandparents
//! - Find-or-create linking and cascade clean-up after deletions
//! - Member search by name, missing data, life status, birth date and age

pub mod member;
pub mod place;
pub mod relation;
pub mod resolver;
pub mod family;
pub mod search;
pub mod storage;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use member::{Member, MemberField, MemberId};
pub use place::{Country, Place, PlaceId, PlaceSeed, ResolvedPlace};
pub use relation::Relation;
pub use resolver::{RelationshipResolver, Relatives};
pub use search::MemberFilter;
pub use storage::{MemberRepository, MemoryStore, SqliteStore};

/// Result type alias for Genealogy operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Genealogy operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Member not found: {0}")]
    NotFound(MemberId),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
