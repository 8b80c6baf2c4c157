//! Item repository that resolves categories inline.
//!
//! Every read is one statement joining `items` with `categories`, so a page
//! of N items costs the count query plus one select.

use super::item_repo::{
    count_items, insert_item, parse_item_row, push_list_clauses, remove_item, replace_item,
    ItemListQuery, ItemRepository,
};
use super::{ensure_catalog_connection_ready, Entity, RepoError, RepoResult};
use crate::config::FetchStrategy;
use crate::db::{begin_read, run_in_unit_of_work};
use crate::model::item::{ItemDraft, ItemId, ItemRecord};
use crate::page::Slice;
use log::{debug, info};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};

const ITEM_JOIN_SELECT_SQL: &str = "SELECT
    i.id AS id,
    i.sku AS sku,
    i.name AS name,
    i.price_cents AS price_cents,
    i.stock AS stock,
    i.category_id AS category_id,
    i.updated_at AS updated_at,
    c.code AS category_code,
    c.name AS category_name
FROM items i
INNER JOIN categories c ON c.id = i.category_id";

/// SQLite-backed item repository using one combined read per query.
pub struct JoinFetchItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> JoinFetchItemRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_catalog_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ItemRepository for JoinFetchItemRepository<'_> {
    fn strategy(&self) -> FetchStrategy {
        FetchStrategy::JoinFetch
    }

    fn create_item(&self, draft: &ItemDraft) -> RepoResult<ItemRecord> {
        draft.validate()?;

        let record = run_in_unit_of_work(self.conn, "item_create", |uow| {
            let id = insert_item(uow, draft)?;
            load_record(uow, id)
        })?;

        info!(
            "event=item_create module=repo status=ok item_id={} category_id={}",
            record.id, record.category_id
        );
        Ok(record)
    }

    fn find_item(&self, id: ItemId) -> RepoResult<ItemRecord> {
        load_record(self.conn, id)
    }

    fn update_item(&self, id: ItemId, draft: &ItemDraft) -> RepoResult<ItemRecord> {
        draft.validate()?;

        let record = run_in_unit_of_work(self.conn, "item_update", |uow| {
            replace_item(uow, id, draft)?;
            load_record(uow, id)
        })?;

        info!("event=item_update module=repo status=ok item_id={id}");
        Ok(record)
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        run_in_unit_of_work(self.conn, "item_delete", |uow| remove_item(uow, id))?;
        info!("event=item_delete module=repo status=ok item_id={id}");
        Ok(())
    }

    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Slice<ItemRecord>> {
        let snapshot = begin_read(self.conn)?;
        let total = count_items(&snapshot, query)?;

        let mut sql = String::from(ITEM_JOIN_SELECT_SQL);
        let mut bind_values: Vec<Value> = Vec::new();
        push_list_clauses(&mut sql, &mut bind_values, query, "i.");

        let mut stmt = snapshot.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        debug!(
            "event=item_list module=repo strategy=join rows={} total={} round_trips=2",
            records.len(),
            total
        );
        Ok(Slice {
            rows: records,
            total,
        })
    }
}

fn load_record(conn: &Connection, id: ItemId) -> RepoResult<ItemRecord> {
    let mut stmt = conn.prepare_cached(&format!("{ITEM_JOIN_SELECT_SQL} WHERE i.id = ?1;"))?;
    stmt.query_row([id], |row| Ok(parse_record_row(row)))
        .optional()?
        .unwrap_or_else(|| Err(RepoError::not_found(Entity::Item, id)))
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<ItemRecord> {
    let item = parse_item_row(row)?;
    Ok(ItemRecord {
        id: item.id,
        sku: item.sku,
        name: item.name,
        price: item.price,
        stock: item.stock,
        category_id: item.category_id,
        category_code: row.get("category_code")?,
        category_name: row.get("category_name")?,
        updated_at: item.updated_at,
    })
}
