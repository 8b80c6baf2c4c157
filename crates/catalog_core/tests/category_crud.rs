use catalog_core::db::open_db_in_memory;
use catalog_core::{
    Catalog, CategoryDraft, CategoryRepository, Entity, ErrorKind, FetchStrategy, ItemDraft,
    PageRequest, RepoError, SqliteCategoryRepository, ValidationError,
};
use rusqlite::Connection;
use rust_decimal::Decimal;

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();

    let created = repo
        .create_category(&CategoryDraft::new("CAT0001", "Electronics"))
        .unwrap();
    assert!(created.id > 0);
    assert!(created.updated_at > 0);

    let loaded = repo.find_category(created.id).unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.code, "CAT0001");
    assert_eq!(loaded.name, "Electronics");
}

#[test]
fn get_missing_category_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let catalog = Catalog::new(&conn, FetchStrategy::JoinFetch).unwrap();

    let err = catalog.get_category(404).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: Entity::Category,
            id: 404
        }
    ));
}

#[test]
fn duplicate_code_is_rejected_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let catalog = Catalog::new(&conn, FetchStrategy::JoinFetch).unwrap();

    catalog
        .create_category(&CategoryDraft::new("CAT0001", "First"))
        .unwrap();
    let err = catalog
        .create_category(&CategoryDraft::new("CAT0001", "Second"))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DuplicateKey);
    assert_eq!(category_count(&conn), 1);
}

#[test]
fn invalid_drafts_fail_validation() {
    let conn = open_db_in_memory().unwrap();
    let catalog = Catalog::new(&conn, FetchStrategy::JoinFetch).unwrap();

    let err = catalog
        .create_category(&CategoryDraft::new("   ", "Blank code"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::Blank { field: "code" })
    ));

    let err = catalog
        .create_category(&CategoryDraft::new("C".repeat(33), "Too long"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);

    let accepted = catalog
        .create_category(&CategoryDraft::new("C".repeat(32), "N".repeat(128)))
        .unwrap();
    assert_eq!(accepted.code.len(), 32);
    assert_eq!(category_count(&conn), 1);
}

#[test]
fn update_replaces_fields_and_keeps_id() {
    let conn = open_db_in_memory().unwrap();
    let catalog = Catalog::new(&conn, FetchStrategy::JoinFetch).unwrap();

    let created = catalog
        .create_category(&CategoryDraft::new("CAT0001", "Old"))
        .unwrap();
    let updated = catalog
        .update_category(created.id, &CategoryDraft::new("CAT0009", "New"))
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.code, "CAT0009");
    assert_eq!(updated.name, "New");
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(catalog.get_category(created.id).unwrap(), updated);
}

#[test]
fn update_may_keep_own_code() {
    let conn = open_db_in_memory().unwrap();
    let catalog = Catalog::new(&conn, FetchStrategy::JoinFetch).unwrap();

    let created = catalog
        .create_category(&CategoryDraft::new("CAT0001", "Old"))
        .unwrap();
    let mut draft = created.to_draft();
    draft.name = "Renamed".to_string();

    let updated = catalog.update_category(created.id, &draft).unwrap();
    assert_eq!(updated.code, "CAT0001");
    assert_eq!(updated.name, "Renamed");
}

#[test]
fn update_missing_category_is_not_found_before_duplicate_check() {
    let conn = open_db_in_memory().unwrap();
    let catalog = Catalog::new(&conn, FetchStrategy::JoinFetch).unwrap();

    catalog
        .create_category(&CategoryDraft::new("CAT0001", "Taken"))
        .unwrap();
    let err = catalog
        .update_category(999, &CategoryDraft::new("CAT0001", "Taken"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn update_to_code_of_other_category_is_duplicate() {
    let conn = open_db_in_memory().unwrap();
    let catalog = Catalog::new(&conn, FetchStrategy::JoinFetch).unwrap();

    catalog
        .create_category(&CategoryDraft::new("CAT0001", "First"))
        .unwrap();
    let second = catalog
        .create_category(&CategoryDraft::new("CAT0002", "Second"))
        .unwrap();

    let err = catalog
        .update_category(second.id, &CategoryDraft::new("CAT0001", "Second"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::DuplicateKey {
            entity: Entity::Category,
            field: "code",
            ..
        }
    ));
    assert_eq!(catalog.get_category(second.id).unwrap().code, "CAT0002");
}

#[test]
fn delete_category_removes_its_items_atomically() {
    let conn = open_db_in_memory().unwrap();
    let catalog = Catalog::new(&conn, FetchStrategy::JoinFetch).unwrap();

    let doomed = catalog
        .create_category(&CategoryDraft::new("CAT0001", "Doomed"))
        .unwrap();
    let kept = catalog
        .create_category(&CategoryDraft::new("CAT0002", "Kept"))
        .unwrap();
    let mut doomed_items = Vec::new();
    for n in 0..3 {
        let record = catalog
            .create_item(&ItemDraft::new(
                format!("SKU-D{n}"),
                "Doomed item",
                Decimal::new(999, 2),
                1,
                doomed.id,
            ))
            .unwrap();
        doomed_items.push(record.id);
    }
    let survivor = catalog
        .create_item(&ItemDraft::new(
            "SKU-K",
            "Kept item",
            Decimal::new(100, 2),
            1,
            kept.id,
        ))
        .unwrap();

    assert_eq!(category_count(&conn), 2);
    catalog.delete_category(doomed.id).unwrap();
    assert_eq!(category_count(&conn), 1);

    assert_eq!(
        catalog.get_category(doomed.id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    for id in doomed_items {
        assert_eq!(catalog.get_item(id).unwrap_err().kind(), ErrorKind::NotFound);
    }
    let orphans: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM items WHERE category_id = ?1;",
            [doomed.id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphans, 0);
    assert_eq!(catalog.get_item(survivor.id).unwrap(), survivor);
}

#[test]
fn delete_missing_category_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let catalog = Catalog::new(&conn, FetchStrategy::JoinFetch).unwrap();

    let err = catalog.delete_category(77).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn list_categories_orders_by_id_and_reports_totals() {
    let conn = open_db_in_memory().unwrap();
    let catalog = Catalog::new(&conn, FetchStrategy::JoinFetch).unwrap();

    let mut ids = Vec::new();
    for n in 1..=5 {
        let created = catalog
            .create_category(&CategoryDraft::new(format!("CAT{n:04}"), format!("C{n}")))
            .unwrap();
        ids.push(created.id);
    }

    let page = catalog
        .list_categories(PageRequest::new(1, 2).unwrap())
        .unwrap();
    assert_eq!(
        page.content.iter().map(|c| c.id).collect::<Vec<_>>(),
        ids[2..4].to_vec()
    );
    assert_eq!(page.total_elements, 5);
    assert_eq!(page.total_pages, 3);
    assert!(!page.first);
    assert!(!page.last);
}

#[test]
fn list_on_empty_store_is_first_and_last() {
    let conn = open_db_in_memory().unwrap();
    let catalog = Catalog::new(&conn, FetchStrategy::JoinFetch).unwrap();

    let page = catalog.list_categories(PageRequest::default()).unwrap();
    assert!(page.content.is_empty());
    assert_eq!(page.total_elements, 0);
    assert_eq!(page.total_pages, 0);
    assert!(page.first);
    assert!(page.last);
}

fn category_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM categories;", [], |row| row.get(0))
        .unwrap()
}
