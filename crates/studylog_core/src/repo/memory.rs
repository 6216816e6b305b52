//! In-memory backends for tests and ephemeral runs.
//!
//! Both repositories hold their state behind a `parking_lot::RwLock`, so a
//! single instance can be shared across threads. Every check-and-write runs
//! under one write-lock acquisition.

use crate::model::item::{Item, ItemKey};
use crate::model::owner::{Owner, OwnerId};
use crate::query::ItemFilter;
use crate::repo::item_repo::ItemRepository;
use crate::repo::owner_repo::OwnerRepository;
use crate::repo::{RepoError, RepoResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct MemoryItemRepository {
    items: RwLock<BTreeMap<ItemKey, Item>>,
    simulate_write_error: AtomicBool,
}

impl MemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with [`RepoError::Unavailable`].
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    fn check_writable(&self) -> RepoResult<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(RepoError::Unavailable("simulated write error".to_string()));
        }
        Ok(())
    }
}

impl ItemRepository for MemoryItemRepository {
    fn insert_item(&self, item: &Item) -> RepoResult<()> {
        self.check_writable()?;
        let key = item.key();
        let mut items = self.items.write();
        if items.contains_key(&key) {
            return Err(RepoError::Duplicate(key.to_string()));
        }
        items.insert(key, item.clone());
        Ok(())
    }

    fn get_item(&self, key: &ItemKey) -> RepoResult<Option<Item>> {
        Ok(self.items.read().get(key).cloned())
    }

    fn owners_of(&self, item_id: &str) -> RepoResult<Vec<OwnerId>> {
        // Keys sort by owner first, so the result comes out ordered.
        Ok(self
            .items
            .read()
            .keys()
            .filter(|key| key.item_id == item_id)
            .map(|key| key.owner_id.clone())
            .collect())
    }

    fn update_item(&self, item: &Item, expected_revision: i64) -> RepoResult<bool> {
        self.check_writable()?;
        let mut items = self.items.write();
        let Some(stored) = items.get_mut(&item.key()) else {
            return Ok(false);
        };
        if stored.revision != expected_revision {
            return Ok(false);
        }

        stored.memo = item.memo.clone();
        stored.tag = item.tag.clone();
        stored.is_review = item.is_review;
        stored.is_input = item.is_input;
        stored.count = item.count;
        stored.priority = item.priority;
        stored.updated_at = item.updated_at;
        stored.reviewed_at = item.reviewed_at;
        stored.revision = item.revision;
        Ok(true)
    }

    fn delete_item(&self, key: &ItemKey) -> RepoResult<bool> {
        self.check_writable()?;
        Ok(self.items.write().remove(key).is_some())
    }

    fn list_items(&self, owner_id: &str, filter: &ItemFilter) -> RepoResult<Vec<Item>> {
        let items = self.items.read();
        let partition = items
            .range(ItemKey::new(owner_id, "")..)
            .take_while(|(key, _)| key.owner_id == owner_id)
            .map(|(_, item)| item.clone());
        Ok(filter.apply(partition))
    }
}

#[derive(Debug, Default)]
pub struct MemoryOwnerRepository {
    owners: RwLock<BTreeMap<OwnerId, Owner>>,
    simulate_write_error: AtomicBool,
}

impl MemoryOwnerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with [`RepoError::Unavailable`].
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    fn check_writable(&self) -> RepoResult<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(RepoError::Unavailable("simulated write error".to_string()));
        }
        Ok(())
    }
}

impl OwnerRepository for MemoryOwnerRepository {
    fn insert_owner(&self, owner: &Owner) -> RepoResult<()> {
        self.check_writable()?;
        let mut owners = self.owners.write();
        if owners.contains_key(&owner.owner_id) {
            return Err(RepoError::Duplicate(owner.owner_id.clone()));
        }
        if owners
            .values()
            .any(|existing| existing.user_name == owner.user_name)
        {
            return Err(RepoError::Duplicate(owner.user_name.clone()));
        }
        owners.insert(owner.owner_id.clone(), owner.clone());
        Ok(())
    }

    fn get_owner(&self, owner_id: &str) -> RepoResult<Option<Owner>> {
        Ok(self.owners.read().get(owner_id).cloned())
    }

    fn find_owner_by_user_name(&self, user_name: &str) -> RepoResult<Option<Owner>> {
        Ok(self
            .owners
            .read()
            .values()
            .find(|owner| owner.user_name == user_name)
            .cloned())
    }

    fn update_owner(&self, owner: &Owner) -> RepoResult<bool> {
        self.check_writable()?;
        let mut owners = self.owners.write();
        let Some(stored) = owners.get_mut(&owner.owner_id) else {
            return Ok(false);
        };
        stored.last_login_at = owner.last_login_at;
        stored.disabled = owner.disabled;
        Ok(true)
    }
}
