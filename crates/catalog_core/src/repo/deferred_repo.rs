//! Item repository that resolves categories after the item read.
//!
//! # Responsibility
//! - Read item rows alone, then look up each owning category separately.
//! - Count the category lookups it issues so the extra round trips are
//!   observable.
//!
//! # Invariants
//! - A list issues at most one lookup per distinct category on the page.
//! - A single-item read issues exactly one lookup.
//! - Records are identical to the join-fetch repository's for the same rows.

use super::category_repo::load_category;
use super::item_repo::{
    count_items, insert_item, load_item, parse_item_row, push_list_clauses, remove_item,
    replace_item, ItemListQuery, ItemRepository, ITEM_SELECT_SQL,
};
use super::{ensure_catalog_connection_ready, Entity, RepoError, RepoResult};
use crate::config::FetchStrategy;
use crate::db::{begin_read, run_in_unit_of_work};
use crate::model::category::{Category, CategoryId};
use crate::model::item::{Item, ItemDraft, ItemId, ItemRecord};
use crate::page::Slice;
use log::{debug, info};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::cell::Cell;
use std::collections::HashMap;

/// SQLite-backed item repository with per-category follow-up lookups.
pub struct DeferredItemRepository<'conn> {
    conn: &'conn Connection,
    lookups: Cell<u64>,
}

impl<'conn> DeferredItemRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_catalog_connection_ready(conn)?;
        Ok(Self {
            conn,
            lookups: Cell::new(0),
        })
    }

    /// Number of category lookups issued by this repository so far.
    pub fn category_lookups(&self) -> u64 {
        self.lookups.get()
    }

    fn lookup_category(&self, conn: &Connection, id: CategoryId) -> RepoResult<Category> {
        self.lookups.set(self.lookups.get() + 1);
        load_category(conn, id).map_err(|err| match err {
            RepoError::NotFound { .. } => {
                RepoError::InvalidData(format!("item references missing category {id}"))
            }
            other => other,
        })
    }

    fn resolve(&self, conn: &Connection, item: Item) -> RepoResult<ItemRecord> {
        let category = self.lookup_category(conn, item.category_id)?;
        Ok(ItemRecord::from_parts(item, &category))
    }

    fn load_record(&self, conn: &Connection, id: ItemId) -> RepoResult<ItemRecord> {
        let item = load_item(conn, id)?;
        self.resolve(conn, item)
    }
}

impl ItemRepository for DeferredItemRepository<'_> {
    fn strategy(&self) -> FetchStrategy {
        FetchStrategy::Deferred
    }

    fn create_item(&self, draft: &ItemDraft) -> RepoResult<ItemRecord> {
        draft.validate()?;

        let record = run_in_unit_of_work(self.conn, "item_create", |uow| {
            let id = insert_item(uow, draft)?;
            self.load_record(uow, id)
        })?;

        info!(
            "event=item_create module=repo status=ok item_id={} category_id={}",
            record.id, record.category_id
        );
        Ok(record)
    }

    fn find_item(&self, id: ItemId) -> RepoResult<ItemRecord> {
        self.load_record(self.conn, id)
    }

    fn update_item(&self, id: ItemId, draft: &ItemDraft) -> RepoResult<ItemRecord> {
        draft.validate()?;

        let record = run_in_unit_of_work(self.conn, "item_update", |uow| {
            replace_item(uow, id, draft)?;
            self.load_record(uow, id)
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

        let mut sql = String::from(ITEM_SELECT_SQL);
        let mut bind_values: Vec<Value> = Vec::new();
        push_list_clauses(&mut sql, &mut bind_values, query, "");

        let mut items = Vec::new();
        {
            let mut stmt = snapshot.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            while let Some(row) = rows.next()? {
                items.push(parse_item_row(row)?);
            }
        }

        let lookups_before = self.category_lookups();
        let mut categories: HashMap<CategoryId, Category> = HashMap::new();
        let mut records = Vec::with_capacity(items.len());
        for item in items {
            if !categories.contains_key(&item.category_id) {
                let category = self.lookup_category(&snapshot, item.category_id)?;
                categories.insert(item.category_id, category);
            }
            let category = categories.get(&item.category_id).ok_or_else(|| {
                RepoError::not_found(Entity::Category, item.category_id)
            })?;
            records.push(ItemRecord::from_parts(item, category));
        }

        debug!(
            "event=item_list module=repo strategy=deferred rows={} total={} round_trips={}",
            records.len(),
            total,
            2 + self.category_lookups() - lookups_before
        );
        Ok(Slice {
            rows: records,
            total,
        })
    }
}
