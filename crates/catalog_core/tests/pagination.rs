use catalog_core::db::open_db_in_memory;
use catalog_core::{seed_catalog, Catalog, FetchStrategy, PageRequest, SeedPlan, ValidationError};
use std::collections::HashSet;

#[test]
fn successive_windows_partition_all_items() {
    let conn = open_db_in_memory().unwrap();
    seed_catalog(
        &conn,
        &SeedPlan {
            categories: 5,
            items_per_category: 7,
            seed: 3,
        },
    )
    .unwrap();
    let catalog = Catalog::new(&conn, FetchStrategy::JoinFetch).unwrap();

    for size in [1_u32, 4, 7, 10, 35, 36] {
        let mut request = PageRequest::first(size);
        let mut seen = Vec::new();
        loop {
            let page = catalog.list_items(None, request).unwrap();
            assert_eq!(page.total_elements, 35);
            assert_eq!(page.total_pages, (35 + i64::from(size) - 1) / i64::from(size));
            assert!(page.content.len() <= size as usize);
            seen.extend(page.content.iter().map(|record| record.id));
            if page.last {
                break;
            }
            request = request.next();
        }

        let unique: HashSet<_> = seen.iter().copied().collect();
        assert_eq!(unique.len(), seen.len(), "overlap at size={size}");
        assert_eq!(seen, (1..=35).collect::<Vec<i64>>(), "size={size}");
    }
}

#[test]
fn window_past_end_is_empty_and_last() {
    let conn = open_db_in_memory().unwrap();
    seed_catalog(
        &conn,
        &SeedPlan {
            categories: 1,
            items_per_category: 3,
            seed: 3,
        },
    )
    .unwrap();
    let catalog = Catalog::new(&conn, FetchStrategy::Deferred).unwrap();

    let page = catalog
        .list_items(None, PageRequest::new(5, 2).unwrap())
        .unwrap();
    assert!(page.content.is_empty());
    assert_eq!(page.total_elements, 3);
    assert_eq!(page.total_pages, 2);
    assert!(!page.first);
    assert!(page.last);

    let last_full = catalog
        .list_items(None, PageRequest::new(1, 2).unwrap())
        .unwrap();
    assert_eq!(last_full.content.len(), 1);
    assert!(last_full.last);
}

#[test]
fn by_category_windows_respect_filter() {
    let conn = open_db_in_memory().unwrap();
    seed_catalog(
        &conn,
        &SeedPlan {
            categories: 3,
            items_per_category: 5,
            seed: 9,
        },
    )
    .unwrap();
    let catalog = Catalog::new(&conn, FetchStrategy::JoinFetch).unwrap();

    let page = catalog
        .list_items_by_category(2, PageRequest::new(1, 2).unwrap())
        .unwrap();
    assert_eq!(page.total_elements, 5);
    assert_eq!(page.total_pages, 3);
    assert_eq!(
        page.content.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![8, 9]
    );
    assert!(page.content.iter().all(|r| r.category_id == 2));
}

#[test]
fn invalid_page_input_is_rejected_before_querying() {
    assert_eq!(
        PageRequest::new(-1, 10),
        Err(ValidationError::NegativePage(-1))
    );
    assert_eq!(
        PageRequest::new(0, -5),
        Err(ValidationError::NonPositivePageSize(-5))
    );
}
