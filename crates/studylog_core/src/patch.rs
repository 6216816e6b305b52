//! Selective single-field edits.
//!
//! An edit names exactly one mutable field to change. Independently of that
//! selector, `count` and `priority` are overwritten whenever a value is
//! supplied, and the wire payload always supplies both. `reviewed_at` never
//! takes a caller value: selecting it stamps the current time.
//!
//! The wire shape ([`EditRequest`]) carries a `kind` plus candidate values for
//! every field; [`EditRequest::into_patch`] narrows it to the explicit
//! [`ItemPatch`] that [`resolve_patch`] applies.

use crate::error::{StoreError, StoreResult};
use crate::model::item::Item;
use serde::{Deserialize, Serialize};

/// The field an edit is allowed to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchField {
    Memo,
    Tag,
    IsReview,
    IsInput,
    ReviewedAt,
}

impl PatchField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memo => "memo",
            Self::Tag => "tag",
            Self::IsReview => "is_review",
            Self::IsInput => "is_input",
            Self::ReviewedAt => "reviewed_at",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "memo" => Some(Self::Memo),
            "tag" => Some(Self::Tag),
            "is_review" => Some(Self::IsReview),
            "is_input" => Some(Self::IsInput),
            "reviewed_at" => Some(Self::ReviewedAt),
            _ => None,
        }
    }
}

/// The selected field together with its new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Memo(String),
    Tag(String),
    IsReview(bool),
    IsInput(bool),
    /// Marks the item reviewed now.
    ReviewedAt,
}

impl FieldEdit {
    pub fn field(&self) -> PatchField {
        match self {
            Self::Memo(_) => PatchField::Memo,
            Self::Tag(_) => PatchField::Tag,
            Self::IsReview(_) => PatchField::IsReview,
            Self::IsInput(_) => PatchField::IsInput,
            Self::ReviewedAt => PatchField::ReviewedAt,
        }
    }
}

/// Counter values carried by every wire edit regardless of the selected field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub count: i64,
    pub priority: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemPatch {
    pub edit: FieldEdit,
    /// `None` keeps the stored value.
    pub count: Option<i64>,
    /// `None` keeps the stored value.
    pub priority: Option<i64>,
}

impl ItemPatch {
    /// Patch that overwrites both counters.
    pub fn new(edit: FieldEdit, counters: Counters) -> Self {
        Self {
            edit,
            count: Some(counters.count),
            priority: Some(counters.priority),
        }
    }

    /// Patch that changes only `edit` and keeps whatever counters are stored
    /// when it is applied.
    pub fn single(edit: FieldEdit) -> Self {
        Self {
            edit,
            count: None,
            priority: None,
        }
    }
}

/// Edit payload as sent by callers: a `kind` selector plus values for all
/// mutable fields, only one of which is honored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    pub kind: String,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub is_review: bool,
    #[serde(default)]
    pub is_input: bool,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub priority: i64,
    /// Accepted for wire compatibility and always ignored.
    #[serde(default)]
    pub reviewed_at: Option<i64>,
}

impl EditRequest {
    /// Narrows the payload to the single honored field.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidInput`] when `kind` names no mutable field.
    pub fn into_patch(self) -> StoreResult<ItemPatch> {
        let field = PatchField::parse(self.kind.trim()).ok_or_else(|| {
            StoreError::InvalidInput(format!(
                "unknown edit kind `{}`; expected memo|tag|is_review|is_input|reviewed_at",
                self.kind
            ))
        })?;
        let edit = match field {
            PatchField::Memo => FieldEdit::Memo(self.memo),
            PatchField::Tag => FieldEdit::Tag(self.tag),
            PatchField::IsReview => FieldEdit::IsReview(self.is_review),
            PatchField::IsInput => FieldEdit::IsInput(self.is_input),
            PatchField::ReviewedAt => FieldEdit::ReviewedAt,
        };
        Ok(ItemPatch::new(
            edit,
            Counters {
                count: self.count,
                priority: self.priority,
            },
        ))
    }
}

/// Merges `patch` into `current` and returns the record to store.
///
/// `id`, `owner_id`, `text`, `created_at` and `revision` are left untouched;
/// `updated_at` is always set to `now_ms`.
pub fn resolve_patch(current: &Item, patch: &ItemPatch, now_ms: i64) -> Item {
    let mut next = current.clone();
    match &patch.edit {
        FieldEdit::Memo(memo) => next.memo.clone_from(memo),
        FieldEdit::Tag(tag) => next.tag.clone_from(tag),
        FieldEdit::IsReview(value) => next.is_review = *value,
        FieldEdit::IsInput(value) => next.is_input = *value,
        FieldEdit::ReviewedAt => next.reviewed_at = now_ms,
    }
    if let Some(count) = patch.count {
        next.count = count;
    }
    if let Some(priority) = patch.priority {
        next.priority = priority;
    }
    next.updated_at = now_ms;
    next
}
