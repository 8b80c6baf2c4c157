//! Item repository contract and the write path shared by both fetch
//! strategies.
//!
//! # Responsibility
//! - Define the item CRUD/list contract implemented by the join-fetch and
//!   deferred repositories.
//! - Own item writes: parent checks, `sku` uniqueness, timestamping.
//! - Own the item count query used by both strategies.
//!
//! # Invariants
//! - Writes check the parent category inside the unit of work; a missing
//!   parent is `ForeignKeyMissing`, never `NotFound`.
//! - `update` checks run in order: item exists, parent exists, sku free.
//! - The count query depends only on the filter, never on the strategy.

use super::deferred_repo::DeferredItemRepository;
use super::join_fetch_repo::JoinFetchItemRepository;
use super::{
    category_exists, now_epoch_ms, violated_constraint, Constraint, Entity, RepoError,
    RepoResult,
};
use crate::config::FetchStrategy;
use crate::model::category::CategoryId;
use crate::model::item::{price_from_cents, price_to_cents, Item, ItemDraft, ItemId, ItemRecord};
use crate::model::validation::ValidationError;
use crate::page::{PageRequest, Slice};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(crate) const ITEM_SELECT_SQL: &str = "SELECT
    id,
    sku,
    name,
    price_cents,
    stock,
    category_id,
    updated_at
FROM items";

/// Query options for listing items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemListQuery {
    /// Restricts rows to one owning category.
    pub category_id: Option<CategoryId>,
    /// Fails with `NotFound` instead of returning an empty page when the
    /// filtered category does not exist.
    pub require_category: bool,
    pub page: PageRequest,
}

impl ItemListQuery {
    pub fn all(page: PageRequest) -> Self {
        Self {
            category_id: None,
            require_category: false,
            page,
        }
    }

    pub fn by_category(category_id: CategoryId, page: PageRequest) -> Self {
        Self {
            category_id: Some(category_id),
            require_category: false,
            page,
        }
    }

    /// Like `by_category`, but a missing category is `NotFound`.
    pub fn within_category(category_id: CategoryId, page: PageRequest) -> Self {
        Self {
            require_category: true,
            ..Self::by_category(category_id, page)
        }
    }
}

/// Repository interface for item operations.
///
/// Implementations differ only in how they resolve `category_code` and
/// `category_name`; returned records are identical.
pub trait ItemRepository {
    /// Strategy this implementation uses for category resolution.
    fn strategy(&self) -> FetchStrategy;
    fn create_item(&self, draft: &ItemDraft) -> RepoResult<ItemRecord>;
    fn find_item(&self, id: ItemId) -> RepoResult<ItemRecord>;
    fn update_item(&self, id: ItemId, draft: &ItemDraft) -> RepoResult<ItemRecord>;
    fn delete_item(&self, id: ItemId) -> RepoResult<()>;
    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Slice<ItemRecord>>;
}

impl<R: ItemRepository + ?Sized> ItemRepository for Box<R> {
    fn strategy(&self) -> FetchStrategy {
        (**self).strategy()
    }

    fn create_item(&self, draft: &ItemDraft) -> RepoResult<ItemRecord> {
        (**self).create_item(draft)
    }

    fn find_item(&self, id: ItemId) -> RepoResult<ItemRecord> {
        (**self).find_item(id)
    }

    fn update_item(&self, id: ItemId, draft: &ItemDraft) -> RepoResult<ItemRecord> {
        (**self).update_item(id, draft)
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        (**self).delete_item(id)
    }

    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Slice<ItemRecord>> {
        (**self).list_items(query)
    }
}

/// Builds the item repository variant for `strategy`.
pub fn item_repository(
    conn: &Connection,
    strategy: FetchStrategy,
) -> RepoResult<Box<dyn ItemRepository + '_>> {
    let repo: Box<dyn ItemRepository + '_> = match strategy {
        FetchStrategy::JoinFetch => Box::new(JoinFetchItemRepository::try_new(conn)?),
        FetchStrategy::Deferred => Box::new(DeferredItemRepository::try_new(conn)?),
    };
    Ok(repo)
}

/// Inserts one validated item inside an open unit of work.
pub(crate) fn insert_item(conn: &Connection, draft: &ItemDraft) -> RepoResult<ItemId> {
    if !category_exists(conn, draft.category_id)? {
        return Err(RepoError::ForeignKeyMissing {
            category_id: draft.category_id,
        });
    }
    ensure_sku_free(conn, &draft.sku, None)?;

    conn.execute(
        "INSERT INTO items (
            sku,
            name,
            price_cents,
            stock,
            category_id,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            draft.sku.as_str(),
            draft.name.as_str(),
            draft_price_cents(draft)?,
            draft.stock,
            draft.category_id,
            now_epoch_ms(),
        ],
    )
    .map_err(|err| classify_write_error(err, draft))?;

    Ok(conn.last_insert_rowid())
}

/// Replaces every caller-editable field of one item inside an open unit of
/// work.
pub(crate) fn replace_item(conn: &Connection, id: ItemId, draft: &ItemDraft) -> RepoResult<()> {
    if !item_exists(conn, id)? {
        return Err(RepoError::not_found(Entity::Item, id));
    }
    if !category_exists(conn, draft.category_id)? {
        return Err(RepoError::ForeignKeyMissing {
            category_id: draft.category_id,
        });
    }
    ensure_sku_free(conn, &draft.sku, Some(id))?;

    conn.execute(
        "UPDATE items
         SET
            sku = ?2,
            name = ?3,
            price_cents = ?4,
            stock = ?5,
            category_id = ?6,
            updated_at = ?7
         WHERE id = ?1;",
        params![
            id,
            draft.sku.as_str(),
            draft.name.as_str(),
            draft_price_cents(draft)?,
            draft.stock,
            draft.category_id,
            now_epoch_ms(),
        ],
    )
    .map_err(|err| classify_write_error(err, draft))?;

    Ok(())
}

/// Removes one item inside an open unit of work.
pub(crate) fn remove_item(conn: &Connection, id: ItemId) -> RepoResult<()> {
    let changed = conn.execute("DELETE FROM items WHERE id = ?1;", [id])?;
    if changed == 0 {
        return Err(RepoError::not_found(Entity::Item, id));
    }
    Ok(())
}

/// Counts items matching the list filter.
/// Counts the rows matching `query`, checking a required category first.
///
/// Runs on the caller's read snapshot so the existence check and the count
/// see the same data.
pub(crate) fn count_items(conn: &Connection, query: &ItemListQuery) -> RepoResult<i64> {
    if let Some(category_id) = query.category_id {
        if query.require_category && !category_exists(conn, category_id)? {
            return Err(RepoError::not_found(Entity::Category, category_id));
        }
    }
    let total = match query.category_id {
        Some(category_id) => conn.query_row(
            "SELECT COUNT(*) FROM items WHERE category_id = ?1;",
            [category_id],
            |row| row.get(0),
        )?,
        None => conn.query_row("SELECT COUNT(*) FROM items;", [], |row| row.get(0))?,
    };
    Ok(total)
}

/// Appends the filter, ordering and window of an item list query.
///
/// `column_prefix` qualifies column names when the select joins tables.
pub(crate) fn push_list_clauses(
    sql: &mut String,
    bind_values: &mut Vec<Value>,
    query: &ItemListQuery,
    column_prefix: &str,
) {
    if let Some(category_id) = query.category_id {
        sql.push_str(&format!(" WHERE {column_prefix}category_id = ?"));
        bind_values.push(Value::Integer(category_id));
    }

    sql.push_str(&format!(" ORDER BY {column_prefix}id ASC"));
    sql.push_str(" LIMIT ? OFFSET ?");
    bind_values.push(Value::Integer(query.page.limit()));
    bind_values.push(Value::Integer(query.page.offset()));
}

/// Loads one item row without its category.
pub(crate) fn load_item(conn: &Connection, id: ItemId) -> RepoResult<Item> {
    let mut stmt = conn.prepare_cached(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;
    stmt.query_row([id], |row| Ok(parse_item_row(row)))
        .optional()?
        .unwrap_or_else(|| Err(RepoError::not_found(Entity::Item, id)))
}

fn item_exists(conn: &Connection, id: ItemId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM items WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn ensure_sku_free(conn: &Connection, sku: &str, except: Option<ItemId>) -> RepoResult<()> {
    let holder: Option<ItemId> = conn
        .query_row("SELECT id FROM items WHERE sku = ?1;", [sku], |row| {
            row.get(0)
        })
        .optional()?;

    match holder {
        Some(holder) if Some(holder) != except => Err(RepoError::DuplicateKey {
            entity: Entity::Item,
            field: "sku",
            value: sku.to_string(),
        }),
        _ => Ok(()),
    }
}

fn draft_price_cents(draft: &ItemDraft) -> RepoResult<i64> {
    price_to_cents(draft.price).ok_or_else(|| ValidationError::PriceScale(draft.price).into())
}

fn classify_write_error(err: rusqlite::Error, draft: &ItemDraft) -> RepoError {
    match violated_constraint(&err) {
        Some(Constraint::Unique) => RepoError::DuplicateKey {
            entity: Entity::Item,
            field: "sku",
            value: draft.sku.clone(),
        },
        Some(Constraint::ForeignKey) => RepoError::ForeignKeyMissing {
            category_id: draft.category_id,
        },
        None => err.into(),
    }
}

/// Parses the item columns of a row, with or without joined category
/// columns present.
pub(crate) fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let id: ItemId = row.get("id")?;

    let price_cents: i64 = row.get("price_cents")?;
    if price_cents < 0 {
        return Err(RepoError::InvalidData(format!(
            "negative price_cents `{price_cents}` in items.price_cents for item {id}"
        )));
    }

    let stock: i32 = row.get("stock")?;
    if stock < 0 {
        return Err(RepoError::InvalidData(format!(
            "negative stock `{stock}` in items.stock for item {id}"
        )));
    }

    Ok(Item {
        id,
        sku: row.get("sku")?,
        name: row.get("name")?,
        price: price_from_cents(price_cents),
        stock,
        category_id: row.get("category_id")?,
        updated_at: row.get("updated_at")?,
    })
}
