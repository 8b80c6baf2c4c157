use catalog_core::db::open_db_in_memory;
use catalog_core::{
    item_repository, seed_catalog, Catalog, DeferredItemRepository, Entity, ErrorKind,
    FetchStrategy, ItemListQuery, ItemRepository, JoinFetchItemRepository, PageRequest, RepoError,
    SeedPlan,
};

fn seeded() -> rusqlite::Connection {
    let conn = open_db_in_memory().unwrap();
    seed_catalog(
        &conn,
        &SeedPlan {
            categories: 3,
            items_per_category: 4,
            seed: 11,
        },
    )
    .unwrap();
    conn
}

#[test]
fn both_strategies_return_identical_pages() {
    let conn = seeded();
    let join = Catalog::new(&conn, FetchStrategy::JoinFetch).unwrap();
    let deferred = Catalog::new(&conn, FetchStrategy::Deferred).unwrap();

    for size in [1_i64, 3, 5, 12, 50] {
        for page in 0..=4_i64 {
            let request = PageRequest::new(page, size).unwrap();
            assert_eq!(
                join.list_items(None, request).unwrap(),
                deferred.list_items(None, request).unwrap(),
                "page={page} size={size}"
            );
            assert_eq!(
                join.list_items_by_category(2, request).unwrap(),
                deferred.list_items_by_category(2, request).unwrap(),
                "category page={page} size={size}"
            );
        }
    }

    for id in 1..=12 {
        assert_eq!(join.get_item(id).unwrap(), deferred.get_item(id).unwrap());
    }
}

#[test]
fn records_carry_owning_category() {
    let conn = seeded();
    let catalog = Catalog::new(&conn, FetchStrategy::Deferred).unwrap();

    let page = catalog
        .list_items(None, PageRequest::new(0, 100).unwrap())
        .unwrap();
    assert_eq!(page.content.len(), 12);
    for record in &page.content {
        let category = catalog.get_category(record.category_id).unwrap();
        assert_eq!(record.category_code, category.code);
        assert_eq!(record.category_name, category.name);
    }
}

#[test]
fn deferred_issues_one_lookup_per_distinct_category() {
    let conn = seeded();
    let repo = DeferredItemRepository::try_new(&conn).unwrap();
    assert_eq!(repo.category_lookups(), 0);

    let everything = repo
        .list_items(&ItemListQuery::all(PageRequest::new(0, 100).unwrap()))
        .unwrap();
    assert_eq!(everything.rows.len(), 12);
    assert_eq!(repo.category_lookups(), 3);

    // Items 1 and 2 both belong to the first category.
    repo.list_items(&ItemListQuery::all(PageRequest::new(0, 2).unwrap()))
        .unwrap();
    assert_eq!(repo.category_lookups(), 4);

    repo.find_item(5).unwrap();
    assert_eq!(repo.category_lookups(), 5);

    let empty = repo
        .list_items(&ItemListQuery::all(PageRequest::new(9, 10).unwrap()))
        .unwrap();
    assert!(empty.rows.is_empty());
    assert_eq!(repo.category_lookups(), 5);
}

#[test]
fn factory_builds_requested_variant() {
    let conn = seeded();
    for strategy in [FetchStrategy::JoinFetch, FetchStrategy::Deferred] {
        let repo = item_repository(&conn, strategy).unwrap();
        assert_eq!(repo.strategy(), strategy);
        assert_eq!(
            Catalog::new(&conn, strategy).unwrap().strategy(),
            strategy
        );
    }
    assert_eq!(
        JoinFetchItemRepository::try_new(&conn).unwrap().strategy(),
        FetchStrategy::JoinFetch
    );
}

#[test]
fn count_is_independent_of_strategy() {
    let conn = seeded();
    let query = ItemListQuery::by_category(3, PageRequest::new(0, 1).unwrap());

    let join = JoinFetchItemRepository::try_new(&conn)
        .unwrap()
        .list_items(&query)
        .unwrap();
    let deferred = DeferredItemRepository::try_new(&conn)
        .unwrap()
        .list_items(&query)
        .unwrap();

    assert_eq!(join.total, 4);
    assert_eq!(deferred.total, 4);
    assert_eq!(join.rows, deferred.rows);
}

#[test]
fn filter_on_missing_category_differs_from_by_category_listing() {
    let conn = seeded();
    for strategy in [FetchStrategy::JoinFetch, FetchStrategy::Deferred] {
        let catalog = Catalog::new(&conn, strategy).unwrap();

        let filtered = catalog
            .list_items(Some(404), PageRequest::default())
            .unwrap();
        assert!(filtered.content.is_empty());
        assert_eq!(filtered.total_elements, 0);
        assert!(filtered.first);
        assert!(filtered.last);

        let err = catalog
            .list_items_by_category(404, PageRequest::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

#[test]
fn required_category_is_checked_by_both_repositories() {
    let conn = seeded();
    let missing = ItemListQuery::within_category(404, PageRequest::default());
    let present = ItemListQuery::within_category(2, PageRequest::new(0, 10).unwrap());

    for strategy in [FetchStrategy::JoinFetch, FetchStrategy::Deferred] {
        let repo = item_repository(&conn, strategy).unwrap();
        assert!(matches!(
            repo.list_items(&missing),
            Err(RepoError::NotFound {
                entity: Entity::Category,
                id: 404
            })
        ));

        let slice = repo.list_items(&present).unwrap();
        assert_eq!(slice.total, 4);
        assert!(slice.rows.iter().all(|record| record.category_id == 2));

        let filtered = repo
            .list_items(&ItemListQuery::by_category(404, PageRequest::default()))
            .unwrap();
        assert_eq!(filtered.total, 0);
    }
}
