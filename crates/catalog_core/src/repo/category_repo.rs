//! Category repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and paged listing over the `categories` table.
//! - Own cascade deletion of a category's items.
//!
//! # Invariants
//! - `code` uniqueness is checked inside the write unit of work and backed
//!   by a UNIQUE index for concurrent writers.
//! - Deleting a category removes its items first, in the same unit of work.

use super::{
    category_exists, ensure_catalog_connection_ready, now_epoch_ms, violated_constraint,
    Constraint, Entity, RepoError, RepoResult,
};
use crate::db::{begin_read, run_in_unit_of_work};
use crate::model::category::{Category, CategoryDraft, CategoryId};
use crate::page::{PageRequest, Slice};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

const CATEGORY_SELECT_SQL: &str = "SELECT
    id,
    code,
    name,
    updated_at
FROM categories";

/// Repository interface for category operations.
pub trait CategoryRepository {
    fn create_category(&self, draft: &CategoryDraft) -> RepoResult<Category>;
    fn find_category(&self, id: CategoryId) -> RepoResult<Category>;
    fn update_category(&self, id: CategoryId, draft: &CategoryDraft) -> RepoResult<Category>;
    /// Deletes the category and every item it owns.
    fn delete_category(&self, id: CategoryId) -> RepoResult<()>;
    fn list_categories(&self, request: PageRequest) -> RepoResult<Slice<Category>>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_catalog_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create_category(&self, draft: &CategoryDraft) -> RepoResult<Category> {
        draft.validate()?;

        let category = run_in_unit_of_work(self.conn, "category_create", |uow| {
            let id = insert_category(uow, draft)?;
            load_category(uow, id)
        })?;

        info!(
            "event=category_create module=repo status=ok category_id={}",
            category.id
        );
        Ok(category)
    }

    fn find_category(&self, id: CategoryId) -> RepoResult<Category> {
        load_category(self.conn, id)
    }

    fn update_category(&self, id: CategoryId, draft: &CategoryDraft) -> RepoResult<Category> {
        draft.validate()?;

        let category = run_in_unit_of_work(self.conn, "category_update", |uow| {
            if !category_exists(uow, id)? {
                return Err(RepoError::not_found(Entity::Category, id));
            }
            ensure_code_free(uow, &draft.code, Some(id))?;

            uow.execute(
                "UPDATE categories
                 SET
                    code = ?2,
                    name = ?3,
                    updated_at = ?4
                 WHERE id = ?1;",
                params![id, draft.code.as_str(), draft.name.as_str(), now_epoch_ms()],
            )
            .map_err(|err| classify_write_error(err, draft))?;

            load_category(uow, id)
        })?;

        info!("event=category_update module=repo status=ok category_id={id}");
        Ok(category)
    }

    fn delete_category(&self, id: CategoryId) -> RepoResult<()> {
        let items_removed = run_in_unit_of_work(self.conn, "category_delete", |uow| {
            if !category_exists(uow, id)? {
                return Err(RepoError::not_found(Entity::Category, id));
            }
            let items_removed = uow.execute("DELETE FROM items WHERE category_id = ?1;", [id])?;
            uow.execute("DELETE FROM categories WHERE id = ?1;", [id])?;
            Ok(items_removed)
        })?;

        info!(
            "event=category_delete module=repo status=ok category_id={id} items_removed={items_removed}"
        );
        Ok(())
    }

    fn list_categories(&self, request: PageRequest) -> RepoResult<Slice<Category>> {
        let snapshot = begin_read(self.conn)?;

        let total: i64 =
            snapshot.query_row("SELECT COUNT(*) FROM categories;", [], |row| row.get(0))?;

        let mut stmt = snapshot.prepare(&format!(
            "{CATEGORY_SELECT_SQL}
             ORDER BY id ASC
             LIMIT ?1 OFFSET ?2;"
        ))?;
        let mut rows = stmt.query(params![request.limit(), request.offset()])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(parse_category_row(row)?);
        }

        Ok(Slice {
            rows: categories,
            total,
        })
    }
}

/// Inserts one validated category inside an open unit of work.
pub(crate) fn insert_category(conn: &Connection, draft: &CategoryDraft) -> RepoResult<CategoryId> {
    ensure_code_free(conn, &draft.code, None)?;

    conn.execute(
        "INSERT INTO categories (
            code,
            name,
            updated_at
        ) VALUES (?1, ?2, ?3);",
        params![draft.code.as_str(), draft.name.as_str(), now_epoch_ms()],
    )
    .map_err(|err| classify_write_error(err, draft))?;

    Ok(conn.last_insert_rowid())
}

/// Loads one category or reports `NotFound`.
pub(crate) fn load_category(conn: &Connection, id: CategoryId) -> RepoResult<Category> {
    let mut stmt = conn.prepare_cached(&format!("{CATEGORY_SELECT_SQL} WHERE id = ?1;"))?;
    stmt.query_row([id], |row| Ok(parse_category_row(row)))
        .optional()?
        .unwrap_or_else(|| Err(RepoError::not_found(Entity::Category, id)))
}

fn ensure_code_free(conn: &Connection, code: &str, except: Option<CategoryId>) -> RepoResult<()> {
    let holder: Option<CategoryId> = conn
        .query_row(
            "SELECT id FROM categories WHERE code = ?1;",
            [code],
            |row| row.get(0),
        )
        .optional()?;

    match holder {
        Some(holder) if Some(holder) != except => Err(RepoError::DuplicateKey {
            entity: Entity::Category,
            field: "code",
            value: code.to_string(),
        }),
        _ => Ok(()),
    }
}

fn classify_write_error(err: rusqlite::Error, draft: &CategoryDraft) -> RepoError {
    match violated_constraint(&err) {
        Some(Constraint::Unique) => RepoError::DuplicateKey {
            entity: Entity::Category,
            field: "code",
            value: draft.code.clone(),
        },
        _ => err.into(),
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    Ok(Category {
        id: row.get("id")?,
        code: row.get("code")?,
        name: row.get("name")?,
        updated_at: row.get("updated_at")?,
    })
}
