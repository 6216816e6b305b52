//! Item Store use-cases.
//!
//! # Responsibility
//! - Add, read, list, edit, copy and delete items inside owner partitions.
//! - Enforce ownership on every item access through the composite key.
//!
//! # Invariants
//! - Input (text, duration) is validated before any storage access.
//! - Items are only ever fetched or removed by `(owner_id, item_id)`; a miss
//!   is classified as `Forbidden` when the id lives in another partition and
//!   as `ItemNotFound` otherwise.
//! - Delete re-derives the key right before removal; it never relies on an
//!   earlier read.
//! - Edit writes with compare-and-swap on `revision` and reports a lost race
//!   as `Conflict`. Nothing is retried.
//! - List results are capped at [`PAGE_SIZE`](crate::query::PAGE_SIZE) with
//!   no continuation cursor.

use crate::clock::{Clock, SystemClock};
use crate::error::{StoreError, StoreResult};
use crate::ids::generate_item_id;
use crate::model::item::{validate_text, Item, ItemId, ItemKey};
use crate::patch::{resolve_patch, ItemPatch};
use crate::query::ListQuery;
use crate::repo::item_repo::ItemRepository;
use crate::repo::owner_repo::OwnerRepository;
use crate::repo::RepoError;
use crate::service::owner_directory::OwnerDirectory;
use log::{debug, error, info, warn};

/// Scoped item store over an item repository and an owner directory.
pub struct ItemStore<I: ItemRepository, O: OwnerRepository, C: Clock = SystemClock> {
    items: I,
    directory: OwnerDirectory<O, C>,
    clock: C,
}

impl<I: ItemRepository, O: OwnerRepository> ItemStore<I, O> {
    /// Creates a store stamped by the wall clock.
    pub fn new(items: I, owners: O) -> Self {
        Self::with_clock(items, owners, SystemClock)
    }
}

impl<I: ItemRepository, O: OwnerRepository, C: Clock + Clone> ItemStore<I, O, C> {
    /// Creates a store whose directory shares `clock`.
    pub fn with_clock(items: I, owners: O, clock: C) -> Self {
        Self {
            items,
            directory: OwnerDirectory::with_clock(owners, clock.clone()),
            clock,
        }
    }

    pub fn directory(&self) -> &OwnerDirectory<O, C> {
        &self.directory
    }

    pub fn items(&self) -> &I {
        &self.items
    }

    /// Adds a new item for `owner_id` and returns its id.
    pub fn add(&self, owner_id: &str, text: &str) -> StoreResult<ItemId> {
        observe("item_add", owner_id, || {
            validate_text(text)?;
            let owner = self.directory.resolve(owner_id)?;
            let item = Item::new(
                generate_item_id(text),
                owner.owner_id,
                text,
                self.clock.now_ms(),
            );
            self.insert(&item)?;
            Ok(item.id)
        })
    }

    /// Reads one item owned by `owner_id`.
    pub fn get(&self, item_id: &str, owner_id: &str) -> StoreResult<Item> {
        observe("item_get", owner_id, || {
            let owner = self.directory.resolve(owner_id)?;
            self.fetch_owned(item_id, &owner.owner_id)
        })
    }

    /// Lists the caller's items.
    ///
    /// With `due` set (a duration such as `24h` or `90m`), only items with
    /// `reviewed_at <= now - due` are returned, most overdue first; without
    /// it the newest items come first. `review_only` composes with both.
    pub fn list(
        &self,
        owner_id: &str,
        review_only: bool,
        due: Option<&str>,
    ) -> StoreResult<Vec<Item>> {
        observe("item_list", owner_id, || {
            let query = ListQuery::parse(review_only, due)?;
            let owner = self.directory.resolve(owner_id)?;
            self.list_partition(&owner.owner_id, &query)
        })
    }

    /// Newest-first listing of `owner_id`'s items with private fields
    /// redacted.
    pub fn list_public(&self, owner_id: &str) -> StoreResult<Vec<Item>> {
        observe("item_list_public", owner_id, || {
            let owner = self.directory.resolve(owner_id)?;
            self.list_redacted(&owner.owner_id)
        })
    }

    /// Same as [`Self::list_public`], addressing the owner by user name.
    pub fn list_public_by_user_name(&self, user_name: &str) -> StoreResult<Vec<Item>> {
        let owner = self.directory.lookup_by_user_name(user_name)?;
        observe("item_list_public", &owner.owner_id, || {
            self.list_redacted(&owner.owner_id)
        })
    }

    /// Applies a single-field patch and returns the stored result.
    ///
    /// Counters left unset in `patch` are taken from the same read that the
    /// compare-and-swap write is checked against.
    pub fn edit(&self, item_id: &str, owner_id: &str, patch: &ItemPatch) -> StoreResult<Item> {
        debug!(
            "event=item_edit module=store status=start owner_id={owner_id} field={}",
            patch.edit.field().as_str()
        );
        observe("item_edit", owner_id, || {
            let owner = self.directory.resolve(owner_id)?;
            let current = self.fetch_owned(item_id, &owner.owner_id)?;

            let mut next = resolve_patch(&current, patch, self.clock.now_ms());
            next.revision = current.revision + 1;
            if self.items.update_item(&next, current.revision)? {
                return Ok(next);
            }

            // The row moved between read and write: either it is gone or
            // someone else bumped its revision.
            let key = ItemKey::new(owner.owner_id.as_str(), item_id);
            match self.items.get_item(&key)? {
                Some(_) => Err(StoreError::Conflict(item_id.to_string())),
                None => Err(self.absence_error(item_id, &owner.owner_id)),
            }
        })
    }

    /// Copies `source_id` from `source_owner_id` into `dest_owner_id`'s
    /// partition and returns the new id. The source is left untouched.
    pub fn copy(
        &self,
        source_id: &str,
        source_owner_id: &str,
        dest_owner_id: &str,
    ) -> StoreResult<ItemId> {
        observe("item_copy", source_owner_id, || {
            let source_owner = self.directory.resolve(source_owner_id)?;
            let dest_owner = self.directory.resolve(dest_owner_id)?;
            let source = self.fetch_owned(source_id, &source_owner.owner_id)?;

            let mut new_id = generate_item_id(&source.text);
            while new_id == source.id {
                new_id = generate_item_id(&source.text);
            }

            let copy =
                Item::copied_from(&source, new_id, dest_owner.owner_id, self.clock.now_ms());
            self.insert(&copy)?;
            Ok(copy.id)
        })
    }

    /// Removes `item_id` from `owner_id`'s partition.
    pub fn delete(&self, item_id: &str, owner_id: &str) -> StoreResult<()> {
        observe("item_delete", owner_id, || {
            let owner = self.directory.resolve(owner_id)?;
            let key = ItemKey::new(owner.owner_id.as_str(), item_id);
            if self.items.delete_item(&key)? {
                return Ok(());
            }
            Err(self.absence_error(item_id, &owner.owner_id))
        })
    }

    fn insert(&self, item: &Item) -> StoreResult<()> {
        match self.items.insert_item(item) {
            Ok(()) => Ok(()),
            Err(RepoError::Duplicate(key)) => Err(StoreError::AlreadyExists(key)),
            Err(err) => Err(err.into()),
        }
    }

    fn fetch_owned(&self, item_id: &str, owner_id: &str) -> StoreResult<Item> {
        match self.items.get_item(&ItemKey::new(owner_id, item_id))? {
            Some(item) => Ok(item),
            None => Err(self.absence_error(item_id, owner_id)),
        }
    }

    /// Classifies a miss under `owner_id`'s partition.
    fn absence_error(&self, item_id: &str, owner_id: &str) -> StoreError {
        match self.items.owners_of(item_id) {
            Ok(owners) if owners.is_empty() => StoreError::ItemNotFound(item_id.to_string()),
            Ok(_) => StoreError::Forbidden {
                item_id: item_id.to_string(),
                owner_id: owner_id.to_string(),
            },
            Err(err) => err.into(),
        }
    }

    fn list_partition(&self, owner_id: &str, query: &ListQuery) -> StoreResult<Vec<Item>> {
        let filter = query.filter_at(self.clock.now_ms());
        Ok(self.items.list_items(owner_id, &filter)?)
    }

    fn list_redacted(&self, owner_id: &str) -> StoreResult<Vec<Item>> {
        let items = self.list_partition(owner_id, &ListQuery::everything())?;
        Ok(items.into_iter().map(Item::redacted).collect())
    }
}

/// Runs one use-case and emits its outcome as a metadata-only event line.
fn observe<T, F>(event: &str, owner_id: &str, run: F) -> StoreResult<T>
where
    F: FnOnce() -> StoreResult<T>,
{
    let result = run();
    match &result {
        Ok(_) => info!("event={event} module=store status=ok owner_id={owner_id}"),
        Err(err @ StoreError::Storage(_)) => error!(
            "event={event} module=store status=error owner_id={owner_id} error_code={} error={err}",
            err.code()
        ),
        Err(err) => warn!(
            "event={event} module=store status=rejected owner_id={owner_id} error_code={}",
            err.code()
        ),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::ItemStore;
    use crate::clock::FixedClock;
    use crate::error::StoreError;
    use crate::patch::{Counters, FieldEdit, ItemPatch};
    use crate::repo::item_repo::ItemRepository;
    use crate::repo::memory::{MemoryItemRepository, MemoryOwnerRepository};

    type MemoryStore = ItemStore<MemoryItemRepository, MemoryOwnerRepository, FixedClock>;

    fn store() -> (MemoryStore, FixedClock) {
        let clock = FixedClock::at(1_000);
        let store = ItemStore::with_clock(
            MemoryItemRepository::new(),
            MemoryOwnerRepository::new(),
            clock.clone(),
        );
        store.directory().register("u1", "alice").unwrap();
        (store, clock)
    }

    #[test]
    fn invalid_input_is_rejected_before_storage() {
        let (store, _) = store();
        store.items().set_simulate_write_error(true);

        assert!(matches!(
            store.add("u1", "   "),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            store.list("u1", false, Some("soon")),
            Err(StoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn unknown_owner_cannot_add() {
        let (store, _) = store();
        assert!(matches!(
            store.add("ghost", "hello"),
            Err(StoreError::OwnerNotFound(_))
        ));
        assert!(store.items().is_empty());
    }

    #[test]
    fn storage_failure_is_not_retried_or_masked() {
        let (store, _) = store();
        let id = store.add("u1", "hello").unwrap();
        store.items().set_simulate_write_error(true);

        let err = store.delete(&id, "u1").unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
        store.items().set_simulate_write_error(false);
        assert!(store.get(&id, "u1").is_ok());
    }

    #[test]
    fn edit_builds_on_latest_stored_revision() {
        let (store, clock) = store();
        let id = store.add("u1", "hello").unwrap();
        let patch = ItemPatch::new(FieldEdit::Memo("m".to_string()), Counters::default());

        // Bump the stored revision behind the store's back.
        let mut raced = store.get(&id, "u1").unwrap();
        raced.revision += 1;
        assert!(store.items().update_item(&raced, 1).unwrap());

        clock.advance(10);
        let edited = store.edit(&id, "u1", &patch).unwrap();
        assert_eq!(edited.revision, 3);
        assert_eq!(edited.updated_at, 1_010);
    }

    #[test]
    fn edit_bumps_revision_each_time() {
        let (store, _) = store();
        let id = store.add("u1", "hello").unwrap();
        let patch = ItemPatch::new(FieldEdit::Tag("t".to_string()), Counters::default());
        assert_eq!(store.edit(&id, "u1", &patch).unwrap().revision, 2);
        assert_eq!(store.edit(&id, "u1", &patch).unwrap().revision, 3);
    }
}
