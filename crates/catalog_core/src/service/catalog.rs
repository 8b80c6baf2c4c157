//! Catalog facade over the category and item services.
//!
//! # Responsibility
//! - Expose every catalog operation behind one borrowed connection.
//! - Pick the item repository variant for the configured fetch strategy.
//!
//! # Invariants
//! - Listing items of a missing category is `NotFound`, unlike the filtered
//!   `list_items`, which yields an empty page.

use crate::config::{fetch_strategy, FetchStrategy};
use crate::model::category::{Category, CategoryDraft, CategoryId};
use crate::model::item::{ItemDraft, ItemId, ItemRecord};
use crate::page::{Page, PageRequest};
use crate::repo::category_repo::SqliteCategoryRepository;
use crate::repo::item_repo::{item_repository, ItemRepository};
use crate::repo::RepoResult;
use crate::service::category_service::CategoryService;
use crate::service::item_service::ItemService;
use rusqlite::Connection;

/// Entry point for callers of the catalog core.
pub struct Catalog<'conn> {
    categories: CategoryService<SqliteCategoryRepository<'conn>>,
    items: ItemService<Box<dyn ItemRepository + 'conn>>,
}

impl<'conn> Catalog<'conn> {
    /// Builds a catalog resolving item categories with `strategy`.
    ///
    /// # Errors
    /// - Returns schema errors when `conn` was not opened through
    ///   `db::open_db*`.
    pub fn new(conn: &'conn Connection, strategy: FetchStrategy) -> RepoResult<Self> {
        Ok(Self {
            categories: CategoryService::new(SqliteCategoryRepository::try_new(conn)?),
            items: ItemService::new(item_repository(conn, strategy)?),
        })
    }

    /// Builds a catalog using the process-wide fetch strategy.
    pub fn with_configured_strategy(conn: &'conn Connection) -> RepoResult<Self> {
        Self::new(conn, fetch_strategy())
    }

    pub fn strategy(&self) -> FetchStrategy {
        self.items.strategy()
    }

    pub fn list_categories(&self, request: PageRequest) -> RepoResult<Page<Category>> {
        self.categories.list_categories(request)
    }

    pub fn get_category(&self, id: CategoryId) -> RepoResult<Category> {
        self.categories.get_category(id)
    }

    /// Lists the items of one category.
    ///
    /// # Errors
    /// - `NotFound` when the category does not exist.
    pub fn list_items_by_category(
        &self,
        category_id: CategoryId,
        request: PageRequest,
    ) -> RepoResult<Page<ItemRecord>> {
        self.items.list_items_within_category(category_id, request)
    }

    pub fn create_category(&self, draft: &CategoryDraft) -> RepoResult<Category> {
        self.categories.create_category(draft)
    }

    pub fn update_category(&self, id: CategoryId, draft: &CategoryDraft) -> RepoResult<Category> {
        self.categories.update_category(id, draft)
    }

    /// Deletes a category and its items in one unit of work.
    pub fn delete_category(&self, id: CategoryId) -> RepoResult<()> {
        self.categories.delete_category(id)
    }

    pub fn list_items(
        &self,
        category_id: Option<CategoryId>,
        request: PageRequest,
    ) -> RepoResult<Page<ItemRecord>> {
        self.items.list_items(category_id, request)
    }

    pub fn get_item(&self, id: ItemId) -> RepoResult<ItemRecord> {
        self.items.get_item(id)
    }

    pub fn create_item(&self, draft: &ItemDraft) -> RepoResult<ItemRecord> {
        self.items.create_item(draft)
    }

    pub fn update_item(&self, id: ItemId, draft: &ItemDraft) -> RepoResult<ItemRecord> {
        self.items.update_item(id, draft)
    }

    pub fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        self.items.delete_item(id)
    }
}
