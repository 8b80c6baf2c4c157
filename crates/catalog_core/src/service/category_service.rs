//! Category use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for categories.
//! - Turn repository slices into page envelopes.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::category::{Category, CategoryDraft, CategoryId};
use crate::page::{Page, PageRequest};
use crate::repo::category_repo::CategoryRepository;
use crate::repo::RepoResult;

/// Use-case service wrapper for category operations.
pub struct CategoryService<R: CategoryRepository> {
    repo: R,
}

impl<R: CategoryRepository> CategoryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists categories ordered by id.
    pub fn list_categories(&self, request: PageRequest) -> RepoResult<Page<Category>> {
        let slice = self.repo.list_categories(request)?;
        Ok(Page::from_slice(slice, request))
    }

    pub fn get_category(&self, id: CategoryId) -> RepoResult<Category> {
        self.repo.find_category(id)
    }

    /// Creates a category. Returns `DuplicateKey` when `code` is taken.
    pub fn create_category(&self, draft: &CategoryDraft) -> RepoResult<Category> {
        self.repo.create_category(draft)
    }

    /// Replaces every editable field of an existing category.
    pub fn update_category(&self, id: CategoryId, draft: &CategoryDraft) -> RepoResult<Category> {
        self.repo.update_category(id, draft)
    }

    /// Deletes the category together with its items.
    pub fn delete_category(&self, id: CategoryId) -> RepoResult<()> {
        self.repo.delete_category(id)
    }
}
