//! Item use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for items under one fetch strategy.
//! - Turn repository slices into page envelopes.

use crate::config::FetchStrategy;
use crate::model::category::CategoryId;
use crate::model::item::{ItemDraft, ItemId, ItemRecord};
use crate::page::{Page, PageRequest};
use crate::repo::item_repo::{ItemListQuery, ItemRepository};
use crate::repo::RepoResult;

/// Use-case service wrapper for item operations.
pub struct ItemService<R: ItemRepository> {
    repo: R,
}

impl<R: ItemRepository> ItemService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Strategy the underlying repository resolves categories with.
    pub fn strategy(&self) -> FetchStrategy {
        self.repo.strategy()
    }

    /// Lists items ordered by id, optionally restricted to one category.
    ///
    /// A filter on a missing category yields an empty page.
    pub fn list_items(
        &self,
        category_id: Option<CategoryId>,
        request: PageRequest,
    ) -> RepoResult<Page<ItemRecord>> {
        let query = match category_id {
            Some(category_id) => ItemListQuery::by_category(category_id, request),
            None => ItemListQuery::all(request),
        };
        let slice = self.repo.list_items(&query)?;
        Ok(Page::from_slice(slice, request))
    }

    /// Lists the items of one category.
    ///
    /// # Errors
    /// - `NotFound` when the category does not exist when the read begins.
    pub fn list_items_within_category(
        &self,
        category_id: CategoryId,
        request: PageRequest,
    ) -> RepoResult<Page<ItemRecord>> {
        let query = ItemListQuery::within_category(category_id, request);
        let slice = self.repo.list_items(&query)?;
        Ok(Page::from_slice(slice, request))
    }

    pub fn get_item(&self, id: ItemId) -> RepoResult<ItemRecord> {
        self.repo.find_item(id)
    }

    /// Creates an item under an existing category.
    ///
    /// # Contract
    /// - Missing category is `ForeignKeyMissing`, checked before `sku`.
    /// - Taken `sku` is `DuplicateKey`.
    pub fn create_item(&self, draft: &ItemDraft) -> RepoResult<ItemRecord> {
        self.repo.create_item(draft)
    }

    /// Replaces every editable field of an existing item.
    pub fn update_item(&self, id: ItemId, draft: &ItemDraft) -> RepoResult<ItemRecord> {
        self.repo.update_item(id, draft)
    }

    pub fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        self.repo.delete_item(id)
    }
}
