//! Domain error taxonomy returned by the directory and item store.
//!
//! # Invariants
//! - `Forbidden` and `ItemNotFound` are never conflated: the former means the
//!   id exists under some other owner's partition.
//! - Storage failures stay opaque inside `Storage` and are never retried.

use crate::model::item::ItemId;
use crate::model::owner::OwnerId;
use crate::repo::RepoError;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No owner is registered under the given identity.
    #[error("owner not found: {0}")]
    OwnerNotFound(OwnerId),
    /// No item with this id exists in any partition.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),
    /// The item exists but belongs to a different owner.
    #[error("item {item_id} is not accessible to owner {owner_id}")]
    Forbidden { item_id: ItemId, owner_id: OwnerId },
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("owner is disabled: {0}")]
    Disabled(OwnerId),
    /// A concurrent edit landed between read and write.
    #[error("item was modified concurrently: {0}")]
    Conflict(ItemId),
    #[error(transparent)]
    Storage(#[from] RepoError),
}

impl StoreError {
    /// Stable short code for log lines and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::OwnerNotFound(_) => "owner_not_found",
            Self::ItemNotFound(_) => "item_not_found",
            Self::Forbidden { .. } => "forbidden",
            Self::AlreadyExists(_) => "already_exists",
            Self::InvalidInput(_) => "invalid_input",
            Self::Disabled(_) => "disabled",
            Self::Conflict(_) => "conflict",
            Self::Storage(_) => "storage",
        }
    }
}
