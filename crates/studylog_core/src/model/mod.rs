//! Domain model for owners and their study items.
//!
//! # Responsibility
//! - Define the two persisted record kinds: `Owner` and `Item`.
//! - Keep input validation next to the records it protects.
//!
//! # Invariants
//! - An item is addressed by the composite key `(owner_id, item_id)`.
//! - `owner_id` of an item never changes after creation.

pub mod item;
pub mod owner;
