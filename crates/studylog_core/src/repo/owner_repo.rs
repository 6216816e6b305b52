//! Owner repository contract and SQLite implementation.
//!
//! # Invariants
//! - `user_name` uniqueness is enforced by storage (`UNIQUE` constraint), so
//!   two racing registrations cannot both succeed.
//! - `update_owner` only rewrites `last_login_at` and `disabled`.

use crate::model::owner::Owner;
use crate::repo::{
    bool_to_int, duplicate_or_db, ensure_connection_ready, int_to_bool, RepoResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

const OWNER_SELECT_SQL: &str = "SELECT
    owner_id,
    user_name,
    created_at,
    last_login_at,
    disabled
FROM owners";

/// Storage surface for owner records.
pub trait OwnerRepository {
    /// Inserts a new owner. Fails with `Duplicate` when either the owner id
    /// or the user name is taken.
    fn insert_owner(&self, owner: &Owner) -> RepoResult<()>;
    fn get_owner(&self, owner_id: &str) -> RepoResult<Option<Owner>>;
    fn find_owner_by_user_name(&self, user_name: &str) -> RepoResult<Option<Owner>>;
    /// Writes back mutable owner state. Returns `false` when no row matched.
    fn update_owner(&self, owner: &Owner) -> RepoResult<bool>;
}

/// SQLite-backed owner repository.
pub struct SqliteOwnerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOwnerRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_one(&self, column: &str, value: &str) -> RepoResult<Option<Owner>> {
        let row = self
            .conn
            .query_row(
                &format!("{OWNER_SELECT_SQL} WHERE {column} = ?1;"),
                [value],
                |row| Ok(parse_owner_row(row)),
            )
            .optional()?;
        row.transpose()
    }
}

impl OwnerRepository for SqliteOwnerRepository<'_> {
    fn insert_owner(&self, owner: &Owner) -> RepoResult<()> {
        self.conn
            .execute(
                "INSERT INTO owners (
                    owner_id,
                    user_name,
                    created_at,
                    last_login_at,
                    disabled
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    owner.owner_id,
                    owner.user_name,
                    owner.created_at,
                    owner.last_login_at,
                    bool_to_int(owner.disabled),
                ],
            )
            .map_err(|err| duplicate_or_db(err, owner.owner_id.as_str()))?;
        Ok(())
    }

    fn get_owner(&self, owner_id: &str) -> RepoResult<Option<Owner>> {
        self.query_one("owner_id", owner_id)
    }

    fn find_owner_by_user_name(&self, user_name: &str) -> RepoResult<Option<Owner>> {
        self.query_one("user_name", user_name)
    }

    fn update_owner(&self, owner: &Owner) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE owners
             SET
                last_login_at = ?2,
                disabled = ?3
             WHERE owner_id = ?1;",
            params![
                owner.owner_id,
                owner.last_login_at,
                bool_to_int(owner.disabled),
            ],
        )?;
        Ok(changed == 1)
    }
}

fn parse_owner_row(row: &Row<'_>) -> RepoResult<Owner> {
    Ok(Owner {
        owner_id: row.get("owner_id")?,
        user_name: row.get("user_name")?,
        created_at: row.get("created_at")?,
        last_login_at: row.get("last_login_at")?,
        disabled: int_to_bool(row.get("disabled")?, "owners.disabled")?,
    })
}
