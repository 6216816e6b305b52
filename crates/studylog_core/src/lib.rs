//! Core domain logic for studylog.
//! This crate is the single source of truth for ownership and edit invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod logging;
pub mod model;
pub mod patch;
pub mod query;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{BackendKind, ConfigError, StudylogConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use error::{StoreError, StoreResult};
pub use ids::{generate_item_id, slugify};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::item::{Item, ItemId, ItemKey};
pub use model::owner::{Owner, OwnerId, Profile};
pub use patch::{resolve_patch, Counters, EditRequest, FieldEdit, ItemPatch, PatchField};
pub use query::{parse_duration, ItemFilter, ItemOrder, ListQuery, PAGE_SIZE};
pub use repo::item_repo::{ItemRepository, SqliteItemRepository};
pub use repo::memory::{MemoryItemRepository, MemoryOwnerRepository};
pub use repo::owner_repo::{OwnerRepository, SqliteOwnerRepository};
pub use repo::{RepoError, RepoResult};
pub use service::item_store::ItemStore;
pub use service::owner_directory::OwnerDirectory;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
