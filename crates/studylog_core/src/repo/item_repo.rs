//! Item repository contract and SQLite implementation.
//!
//! # Invariants
//! - `update_item` is a compare-and-swap on `revision`; it never rewrites
//!   `text`, `owner_id` or `created_at`.
//! - `delete_item` removes by the full composite key only.

use crate::model::item::{Item, ItemKey};
use crate::model::owner::OwnerId;
use crate::query::{ItemFilter, ItemOrder};
use crate::repo::{
    bool_to_int, duplicate_or_db, ensure_connection_ready, int_to_bool, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ITEM_SELECT_SQL: &str = "SELECT
    owner_id,
    item_id,
    text,
    memo,
    tag,
    is_review,
    is_input,
    count,
    priority,
    created_at,
    updated_at,
    reviewed_at,
    revision
FROM items";

/// Storage surface for items, partitioned by owner.
pub trait ItemRepository {
    /// Inserts a new item. Fails with `Duplicate` when the key is taken.
    fn insert_item(&self, item: &Item) -> RepoResult<()>;
    /// Point read by composite key.
    fn get_item(&self, key: &ItemKey) -> RepoResult<Option<Item>>;
    /// Owners whose partition holds an item with this id, sorted.
    fn owners_of(&self, item_id: &str) -> RepoResult<Vec<OwnerId>>;
    /// Replaces mutable fields when the stored revision equals
    /// `expected_revision`. Returns `false` when no row matched.
    fn update_item(&self, item: &Item, expected_revision: i64) -> RepoResult<bool>;
    /// Removes the item at `key`. Returns `false` when nothing was there.
    fn delete_item(&self, key: &ItemKey) -> RepoResult<bool>;
    /// Ranged scan of one owner's partition.
    fn list_items(&self, owner_id: &str, filter: &ItemFilter) -> RepoResult<Vec<Item>>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn insert_item(&self, item: &Item) -> RepoResult<()> {
        self.conn
            .execute(
                "INSERT INTO items (
                    owner_id,
                    item_id,
                    text,
                    memo,
                    tag,
                    is_review,
                    is_input,
                    count,
                    priority,
                    created_at,
                    updated_at,
                    reviewed_at,
                    revision
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
                params![
                    item.owner_id,
                    item.id,
                    item.text,
                    item.memo,
                    item.tag,
                    bool_to_int(item.is_review),
                    bool_to_int(item.is_input),
                    item.count,
                    item.priority,
                    item.created_at,
                    item.updated_at,
                    item.reviewed_at,
                    item.revision,
                ],
            )
            .map_err(|err| duplicate_or_db(err, item.key().to_string()))?;
        Ok(())
    }

    fn get_item(&self, key: &ItemKey) -> RepoResult<Option<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE owner_id = ?1
               AND item_id = ?2;"
        ))?;

        let mut rows = stmt.query(params![key.owner_id, key.item_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }

        Ok(None)
    }

    fn owners_of(&self, item_id: &str) -> RepoResult<Vec<OwnerId>> {
        let mut stmt = self.conn.prepare(
            "SELECT owner_id
             FROM items
             WHERE item_id = ?1
             ORDER BY owner_id ASC;",
        )?;
        let owners = stmt
            .query_map([item_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(owners)
    }

    fn update_item(&self, item: &Item, expected_revision: i64) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE items
             SET
                memo = ?3,
                tag = ?4,
                is_review = ?5,
                is_input = ?6,
                count = ?7,
                priority = ?8,
                updated_at = ?9,
                reviewed_at = ?10,
                revision = ?11
             WHERE owner_id = ?1
               AND item_id = ?2
               AND revision = ?12;",
            params![
                item.owner_id,
                item.id,
                item.memo,
                item.tag,
                bool_to_int(item.is_review),
                bool_to_int(item.is_input),
                item.count,
                item.priority,
                item.updated_at,
                item.reviewed_at,
                item.revision,
                expected_revision,
            ],
        )?;
        Ok(changed == 1)
    }

    fn delete_item(&self, key: &ItemKey) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM items
             WHERE owner_id = ?1
               AND item_id = ?2;",
            params![key.owner_id, key.item_id],
        )?;
        Ok(changed == 1)
    }

    fn list_items(&self, owner_id: &str, filter: &ItemFilter) -> RepoResult<Vec<Item>> {
        let mut sql = format!("{ITEM_SELECT_SQL} WHERE owner_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(owner_id.to_string())];

        if filter.review_only {
            sql.push_str(" AND is_review = 1");
        }

        if let Some(cutoff) = filter.reviewed_before {
            sql.push_str(" AND reviewed_at <= ?");
            bind_values.push(Value::Integer(cutoff));
        }

        match filter.order {
            ItemOrder::CreatedDesc => sql.push_str(" ORDER BY created_at DESC, item_id ASC"),
            ItemOrder::ReviewedAsc => sql.push_str(" ORDER BY reviewed_at ASC, item_id ASC"),
        }

        sql.push_str(" LIMIT ?");
        bind_values.push(Value::Integer(i64::from(filter.limit)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(items)
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    Ok(Item {
        id: row.get("item_id")?,
        owner_id: row.get("owner_id")?,
        text: row.get("text")?,
        memo: row.get("memo")?,
        tag: row.get("tag")?,
        is_review: int_to_bool(row.get("is_review")?, "items.is_review")?,
        is_input: int_to_bool(row.get("is_input")?, "items.is_input")?,
        count: row.get("count")?,
        priority: row.get("priority")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        reviewed_at: row.get("reviewed_at")?,
        revision: row.get("revision")?,
    })
}
