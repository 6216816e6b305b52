//! Owner Directory use-cases.
//!
//! # Responsibility
//! - Register owners under an external identity and a unique user name.
//! - Resolve an identity (or a public user name) to an enabled owner.
//! - Flip the administrative `disabled` switch and track last login.
//!
//! # Invariants
//! - A user name is never reused, even after its owner is disabled.
//! - Every lookup of a disabled owner fails with `Disabled`.
//! - Input is validated before the repository is touched.

use crate::clock::{Clock, SystemClock};
use crate::error::{StoreError, StoreResult};
use crate::model::owner::{validate_owner_id, validate_user_name, Owner, Profile};
use crate::repo::owner_repo::OwnerRepository;
use crate::repo::RepoError;
use log::{info, warn};

/// Directory facade over an owner repository.
pub struct OwnerDirectory<R: OwnerRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: OwnerRepository, C: Clock> OwnerDirectory<R, C> {
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Registers `owner_id` under `user_name`.
    ///
    /// Fails with `AlreadyExists` when either the identity is already
    /// registered or the user name belongs to any owner, disabled or not.
    pub fn register(&self, owner_id: &str, user_name: &str) -> StoreResult<Owner> {
        validate_owner_id(owner_id)?;
        validate_user_name(user_name)?;

        if self.repo.get_owner(owner_id)?.is_some() {
            warn!("event=owner_register module=directory status=rejected reason=owner_exists");
            return Err(StoreError::AlreadyExists(format!("owner {owner_id}")));
        }
        if self.repo.find_owner_by_user_name(user_name)?.is_some() {
            warn!("event=owner_register module=directory status=rejected reason=user_name_taken");
            return Err(StoreError::AlreadyExists(format!("user name {user_name}")));
        }

        let owner = Owner::new(owner_id, user_name, self.clock.now_ms());
        match self.repo.insert_owner(&owner) {
            Ok(()) => {}
            // Lost a race against a concurrent registration.
            Err(RepoError::Duplicate(key)) => return Err(StoreError::AlreadyExists(key)),
            Err(err) => return Err(err.into()),
        }

        info!("event=owner_register module=directory status=ok owner_id={owner_id}");
        Ok(owner)
    }

    /// Returns the enabled owner registered under `owner_id`.
    pub fn resolve(&self, owner_id: &str) -> StoreResult<Owner> {
        validate_owner_id(owner_id)?;
        let owner = self
            .repo
            .get_owner(owner_id)?
            .ok_or_else(|| StoreError::OwnerNotFound(owner_id.to_string()))?;
        ensure_enabled(owner)
    }

    /// Returns the enabled owner publishing under `user_name`.
    pub fn lookup_by_user_name(&self, user_name: &str) -> StoreResult<Owner> {
        let owner = self
            .repo
            .find_owner_by_user_name(user_name)?
            .ok_or_else(|| StoreError::OwnerNotFound(user_name.to_string()))?;
        ensure_enabled(owner)
    }

    /// Disables `owner_id`. Disabling an already disabled owner succeeds.
    pub fn disable(&self, owner_id: &str) -> StoreResult<()> {
        validate_owner_id(owner_id)?;
        let mut owner = self
            .repo
            .get_owner(owner_id)?
            .ok_or_else(|| StoreError::OwnerNotFound(owner_id.to_string()))?;
        if owner.disabled {
            return Ok(());
        }

        owner.disabled = true;
        if !self.repo.update_owner(&owner)? {
            return Err(StoreError::OwnerNotFound(owner_id.to_string()));
        }
        info!("event=owner_disable module=directory status=ok owner_id={owner_id}");
        Ok(())
    }

    /// Stamps `last_login_at` with the current time.
    pub fn record_login(&self, owner_id: &str) -> StoreResult<Owner> {
        let mut owner = self.resolve(owner_id)?;
        owner.last_login_at = self.clock.now_ms();
        if !self.repo.update_owner(&owner)? {
            return Err(StoreError::OwnerNotFound(owner_id.to_string()));
        }
        info!("event=owner_login module=directory status=ok owner_id={owner_id}");
        Ok(owner)
    }

    /// Pairs the stored user name with the session's display name.
    pub fn profile(&self, owner_id: &str, display_name: &str) -> StoreResult<Profile> {
        let owner = self.resolve(owner_id)?;
        Ok(Profile {
            user_name: owner.user_name,
            screen_name: display_name.to_string(),
        })
    }
}

fn ensure_enabled(owner: Owner) -> StoreResult<Owner> {
    if owner.disabled {
        return Err(StoreError::Disabled(owner.owner_id));
    }
    Ok(owner)
}

#[cfg(test)]
mod tests {
    use super::OwnerDirectory;
    use crate::clock::FixedClock;
    use crate::error::StoreError;
    use crate::repo::memory::MemoryOwnerRepository;

    fn directory() -> (OwnerDirectory<MemoryOwnerRepository, FixedClock>, FixedClock) {
        let clock = FixedClock::at(1_000);
        (
            OwnerDirectory::with_clock(MemoryOwnerRepository::new(), clock.clone()),
            clock,
        )
    }

    #[test]
    fn register_rejects_invalid_user_name_before_storage() {
        let (directory, _) = directory();
        directory.repository().set_simulate_write_error(true);
        let err = directory.register("u1", "bad name").unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[test]
    fn register_rejects_second_registration_of_same_identity() {
        let (directory, _) = directory();
        directory.register("u1", "alice").unwrap();
        let err = directory.register("u1", "bob").unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[test]
    fn record_login_moves_last_login_forward() {
        let (directory, clock) = directory();
        let owner = directory.register("u1", "alice").unwrap();
        assert_eq!(owner.last_login_at, 1_000);

        clock.advance(500);
        let owner = directory.record_login("u1").unwrap();
        assert_eq!(owner.last_login_at, 1_500);
        assert_eq!(owner.created_at, 1_000);
        assert_eq!(directory.resolve("u1").unwrap().last_login_at, 1_500);
    }

    #[test]
    fn profile_pairs_user_name_with_display_name() {
        let (directory, _) = directory();
        directory.register("u1", "alice").unwrap();
        let profile = directory.profile("u1", "Alice Liddell").unwrap();
        assert_eq!(profile.user_name, "alice");
        assert_eq!(profile.screen_name, "Alice Liddell");
    }

    #[test]
    fn storage_failure_surfaces_as_opaque_storage_error() {
        let (directory, _) = directory();
        directory.repository().set_simulate_write_error(true);
        let err = directory.register("u1", "alice").unwrap_err();
        assert_eq!(err.code(), "storage");
    }
}
