//! Item domain model.
//!
//! # Responsibility
//! - Define the stored study item and its composite storage key.
//! - Provide constructors for the two ways an item comes to exist:
//!   a fresh add and a copy of another item.
//!
//! # Invariants
//! - `text` is set once at creation and never rewritten.
//! - `revision` starts at 1 and grows by one on every successful edit.

use crate::error::{StoreError, StoreResult};
use crate::model::owner::OwnerId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Item identifier, unique within one owner's partition.
pub type ItemId = String;

/// Composite storage key. The owner component is the partition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemKey {
    pub owner_id: OwnerId,
    pub item_id: ItemId,
}

impl ItemKey {
    pub fn new(owner_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            item_id: item_id.into(),
        }
    }
}

impl Display for ItemKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner_id, self.item_id)
    }
}

/// A short text record tracked for periodic review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub owner_id: OwnerId,
    pub text: String,
    pub memo: String,
    pub tag: String,
    pub is_review: bool,
    pub is_input: bool,
    pub count: i64,
    pub priority: i64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
    /// Unix epoch milliseconds.
    pub reviewed_at: i64,
    /// Write counter used for compare-and-swap edits.
    #[serde(default = "initial_revision")]
    pub revision: i64,
}

fn initial_revision() -> i64 {
    1
}

impl Item {
    /// Creates a freshly added item: flagged for review and input,
    /// zero counters, all timestamps at `now_ms`.
    pub fn new(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        text: impl Into<String>,
        now_ms: i64,
    ) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            text: text.into(),
            memo: String::new(),
            tag: String::new(),
            is_review: true,
            is_input: true,
            count: 0,
            priority: 0,
            created_at: now_ms,
            updated_at: now_ms,
            reviewed_at: now_ms,
            revision: initial_revision(),
        }
    }

    /// Builds an independent copy of `source` for `owner_id`.
    ///
    /// Keeps `text` and `priority`; clears `memo`, both flags and `count`,
    /// and resets every timestamp to `now_ms`. `tag` is not carried over.
    pub fn copied_from(
        source: &Item,
        id: impl Into<String>,
        owner_id: impl Into<String>,
        now_ms: i64,
    ) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            text: source.text.clone(),
            memo: String::new(),
            tag: String::new(),
            is_review: false,
            is_input: false,
            count: 0,
            priority: source.priority,
            created_at: now_ms,
            updated_at: now_ms,
            reviewed_at: now_ms,
            revision: initial_revision(),
        }
    }

    pub fn key(&self) -> ItemKey {
        ItemKey::new(self.owner_id.as_str(), self.id.as_str())
    }

    /// Returns the third-party view of this item: memo cleared and both
    /// review flags forced off.
    pub fn redacted(mut self) -> Self {
        self.memo.clear();
        self.is_review = false;
        self.is_input = false;
        self
    }
}

/// Rejects blank item text.
pub fn validate_text(text: &str) -> StoreResult<()> {
    if text.trim().is_empty() {
        return Err(StoreError::InvalidInput(
            "item text must not be empty".to_string(),
        ));
    }
    Ok(())
}
