//! Core data access for the product catalog.
//! This crate is the single source of truth for category and item invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod page;
pub mod repo;
pub mod seed;
pub mod service;

pub use config::{fetch_strategy, init_fetch_strategy, FetchStrategy, USE_JOIN_FETCH_ENV};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::{Category, CategoryDraft, CategoryId};
pub use model::item::{Item, ItemDraft, ItemId, ItemRecord};
pub use model::validation::ValidationError;
pub use page::{Page, PageRequest, DEFAULT_PAGE_SIZE};
pub use repo::category_repo::{CategoryRepository, SqliteCategoryRepository};
pub use repo::deferred_repo::DeferredItemRepository;
pub use repo::item_repo::{item_repository, ItemListQuery, ItemRepository};
pub use repo::join_fetch_repo::JoinFetchItemRepository;
pub use repo::{Entity, ErrorKind, RepoError, RepoResult};
pub use seed::{seed_catalog, SeedPlan, SeedReport};
pub use service::catalog::Catalog;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
