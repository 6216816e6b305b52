#![allow(dead_code)]

use studylog_core::{FixedClock, ItemStore};

pub const T0: i64 = 1_700_000_000_000;
pub const MINUTE_MS: i64 = 60_000;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;

pub type Store<I, O> = ItemStore<I, O, FixedClock>;

/// Expands each listed generic scenario `fn name(&Store<I, O>, &FixedClock)`
/// into one `#[test]` per storage backend.
macro_rules! for_each_backend {
    ($($name:ident),* $(,)?) => {
        mod sqlite_backend {
            use studylog_core::{
                open_db_in_memory, FixedClock, ItemStore, SqliteItemRepository,
                SqliteOwnerRepository,
            };

            $(
                #[test]
                fn $name() {
                    let conn = open_db_in_memory().unwrap();
                    let clock = FixedClock::at(crate::common::T0);
                    let store = ItemStore::with_clock(
                        SqliteItemRepository::try_new(&conn).unwrap(),
                        SqliteOwnerRepository::try_new(&conn).unwrap(),
                        clock.clone(),
                    );
                    super::$name(&store, &clock);
                }
            )*
        }

        mod memory_backend {
            use studylog_core::{
                FixedClock, ItemStore, MemoryItemRepository, MemoryOwnerRepository,
            };

            $(
                #[test]
                fn $name() {
                    let clock = FixedClock::at(crate::common::T0);
                    let store = ItemStore::with_clock(
                        MemoryItemRepository::new(),
                        MemoryOwnerRepository::new(),
                        clock.clone(),
                    );
                    super::$name(&store, &clock);
                }
            )*
        }
    };
}
