use catalog_core::db::open_db;
use catalog_core::{Catalog, CategoryDraft, ErrorKind, FetchStrategy, ItemDraft, PageRequest};
use rust_decimal::Decimal;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn concurrent_creates_of_same_sku_have_exactly_one_winner() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.db");

    let category_id = {
        let conn = open_db(&path).unwrap();
        let catalog = Catalog::new(&conn, FetchStrategy::JoinFetch).unwrap();
        catalog
            .create_category(&CategoryDraft::new("CAT0001", "Tools"))
            .unwrap()
            .id
    };

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|n| {
            let barrier = Arc::clone(&barrier);
            let path = path.clone();
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let catalog = Catalog::new(&conn, FetchStrategy::Deferred).unwrap();
                let draft = ItemDraft::new(
                    "SKU-RACE",
                    format!("Contender {n}"),
                    Decimal::new(100, 2),
                    1,
                    category_id,
                );
                barrier.wait();
                catalog.create_item(&draft).map_err(|err| err.kind())
            })
        })
        .collect();

    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|outcome| *outcome == Err(ErrorKind::DuplicateKey)));

    let conn = open_db(&path).unwrap();
    let catalog = Catalog::new(&conn, FetchStrategy::JoinFetch).unwrap();
    let page = catalog.list_items(None, PageRequest::default()).unwrap();
    assert_eq!(page.total_elements, 1);
}

#[test]
fn readers_on_other_connections_see_committed_writes_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("visibility.db");

    let writer_conn = open_db(&path).unwrap();
    let writer = Catalog::new(&writer_conn, FetchStrategy::JoinFetch).unwrap();
    let reader_conn = open_db(&path).unwrap();
    let reader = Catalog::new(&reader_conn, FetchStrategy::JoinFetch).unwrap();

    let category = writer
        .create_category(&CategoryDraft::new("CAT0001", "Tools"))
        .unwrap();
    let err = writer
        .create_item(&ItemDraft::new(
            "SKU1",
            "n",
            Decimal::new(-1, 2),
            1,
            category.id,
        ))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);

    assert_eq!(reader.get_category(category.id).unwrap(), category);
    let items = reader.list_items(None, PageRequest::default()).unwrap();
    assert!(items.content.is_empty());
}
