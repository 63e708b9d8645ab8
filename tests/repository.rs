mod common;

use common::{new_product, product, seeded_unit, setup_db, supplier, ProductPrice};
use sea_orm::{ColumnTrait, Condition, IntoActiveModel, RelationTrait};
use sea_uow::paging::PageRequest;
use sea_uow::query::QueryOptions;
use sea_uow::repository::Repository;

#[tokio::test]
async fn test_paged_list_first_page() {
    let uow = seeded_unit().await;
    let products = uow.repository::<product::Entity>().unwrap();

    let page = products
        .get_paged_list(
            QueryOptions::new().order_by_asc(product::Column::Id),
            PageRequest::new(1, 2),
        )
        .await
        .unwrap();

    assert_eq!(page.total_count, 5);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.page_index, 1);
    let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["anvil", "rocket"]);
    assert!(!page.has_previous_page());
    assert!(page.has_next_page());
}

#[tokio::test]
async fn test_paged_list_last_and_past_end() {
    let uow = seeded_unit().await;
    let products = uow.repository::<product::Entity>().unwrap();
    let ordered = || QueryOptions::new().order_by_asc(product::Column::Id);

    let last = products
        .get_paged_list(ordered(), PageRequest::new(3, 2))
        .await
        .unwrap();
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.items[0].name, "gadget");
    assert!(!last.has_next_page());

    let beyond = products
        .get_paged_list(ordered(), PageRequest::new(9, 2))
        .await
        .unwrap();
    assert!(beyond.is_empty());
    assert_eq!(beyond.total_count, 5);
    assert_eq!(beyond.total_pages, 3);
}

#[tokio::test]
async fn test_paged_list_rejects_invalid_page() {
    let uow = seeded_unit().await;
    let products = uow.repository::<product::Entity>().unwrap();

    let err = products
        .get_paged_list(QueryOptions::new(), PageRequest::new(0, 10))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("page_index"));
    assert!(err.db_error().is_none());

    let err = products
        .get_paged_list(QueryOptions::new(), PageRequest::new(1, 0))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("page_size"));
}

#[tokio::test]
async fn test_paged_list_rejects_offset_overflow() {
    let uow = seeded_unit().await;
    let products = uow.repository::<product::Entity>().unwrap();

    let err = products
        .get_paged_list(QueryOptions::new(), PageRequest::new(u64::MAX / 2, 20))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("out of range"));
    assert!(err.db_error().is_none());

    let err = products
        .get_paged_list_as::<ProductPrice>(QueryOptions::new(), PageRequest::new(1 << 62, 4))
        .await
        .unwrap_err();
    assert!(err.db_error().is_none());
}

#[tokio::test]
async fn test_invalid_page_never_reaches_database() {
    let db = setup_db().await;
    let closed = db.clone();
    db.close().await.unwrap();
    let products = Repository::<product::Entity, _>::new(&closed);

    // A valid request fails in the database
    let err = products
        .get_paged_list(QueryOptions::new(), PageRequest::new(1, 10))
        .await
        .unwrap_err();
    assert!(err.db_error().is_some());

    // Invalid requests are rejected before any query is issued
    for page in [
        PageRequest::new(0, 10),
        PageRequest::new(1, 0),
        PageRequest::new(u64::MAX, 2),
    ] {
        let err = products
            .get_paged_list(QueryOptions::new(), page)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("page_"), "{}", err);
        assert!(err.db_error().is_none());
    }
}

#[tokio::test]
async fn test_paged_list_with_filter_and_order() {
    let uow = seeded_unit().await;
    let products = uow.repository::<product::Entity>().unwrap();

    let page = products
        .get_paged_list(
            QueryOptions::new()
                .filter(product::Column::Price.gte(800))
                .order_by_desc(product::Column::Price),
            PageRequest::default(),
        )
        .await
        .unwrap();

    let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["rocket", "anvil", "gadget", "magnet"]);
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn test_include_filters_on_related_columns() {
    let uow = seeded_unit().await;
    let products = uow.repository::<product::Entity>().unwrap();

    let globex = products
        .get_by_filter(
            QueryOptions::new()
                .include(product::Relation::Supplier.def())
                .filter(supplier::Column::Name.eq("Globex"))
                .order_by_asc(product::Column::Name),
        )
        .await
        .unwrap();

    let names: Vec<_> = globex.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["gadget", "widget"]);
}

#[tokio::test]
async fn test_paged_projection() {
    let uow = seeded_unit().await;
    let products = uow.repository::<product::Entity>().unwrap();

    let page = products
        .get_paged_list_as::<ProductPrice>(
            QueryOptions::new().order_by_asc(product::Column::Price),
            PageRequest::new(1, 2),
        )
        .await
        .unwrap();

    assert_eq!(page.total_count, 5);
    assert_eq!(
        page.items,
        vec![
            ProductPrice {
                name: "widget".to_string(),
                price: 250
            },
            ProductPrice {
                name: "magnet".to_string(),
                price: 800
            },
        ]
    );
}

#[tokio::test]
async fn test_paged_list_over_base_query() {
    let uow = seeded_unit().await;
    let products = uow.repository::<product::Entity>().unwrap();

    let in_stock = products.query_with(QueryOptions::new().filter(product::Column::Quantity.gt(0)));
    let page = products
        .get_paged_list_from(
            in_stock,
            QueryOptions::new()
                .filter(product::Column::SupplierId.eq(1))
                .order_by_asc(product::Column::Id),
            PageRequest::new(1, 10),
        )
        .await
        .unwrap();

    assert_eq!(page.total_count, 3);
    assert_eq!(page.items[0].name, "anvil");
}

#[tokio::test]
async fn test_first_or_default() {
    let uow = seeded_unit().await;
    let products = uow.repository::<product::Entity>().unwrap();

    let cheapest = products
        .get_first_or_default(QueryOptions::new().order_by_asc(product::Column::Price))
        .await
        .unwrap();
    assert_eq!(cheapest.map(|p| p.name), Some("widget".to_string()));

    let missing = products
        .get_first_or_default(QueryOptions::new().filter(product::Column::Name.eq("teleporter")))
        .await
        .unwrap();
    assert!(missing.is_none());

    let projected = products
        .get_first_or_default_as::<ProductPrice>(QueryOptions::new().filter(product::Column::Name.eq("rocket")))
        .await
        .unwrap();
    assert_eq!(projected.map(|p| p.price), Some(12000));
}

#[tokio::test]
async fn test_find_and_get_all() {
    let uow = seeded_unit().await;
    let products = uow.repository::<product::Entity>().unwrap();

    let magnet = products.find(3).await.unwrap().unwrap();
    assert_eq!(magnet.name, "magnet");
    assert!(products.find(99).await.unwrap().is_none());

    assert_eq!(products.get_all().await.unwrap().len(), 5);

    let top = products
        .get_top(QueryOptions::new().order_by_desc(product::Column::Quantity), 2)
        .await
        .unwrap();
    let names: Vec<_> = top.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["widget", "magnet"]);
}

#[tokio::test]
async fn test_raw_sql_selector() {
    let uow = seeded_unit().await;
    let products = uow.repository::<product::Entity>().unwrap();

    let cheap = products
        .raw_sql("SELECT * FROM products WHERE price < ? ORDER BY price", [1000i64.into()])
        .all(products.connection())
        .await
        .unwrap();

    let names: Vec<_> = cheap.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["widget", "magnet"]);
}

#[tokio::test]
async fn test_counts_and_exists() {
    let uow = seeded_unit().await;
    let products = uow.repository::<product::Entity>().unwrap();

    assert_eq!(products.count(None).await.unwrap(), 5);
    assert_eq!(
        products
            .count(Some(Condition::all().add(product::Column::SupplierId.eq(2))))
            .await
            .unwrap(),
        2
    );
    assert_eq!(
        products
            .count_all([
                Condition::all().add(product::Column::SupplierId.eq(1)),
                Condition::all().add(product::Column::Price.gt(1000)),
            ])
            .await
            .unwrap(),
        2
    );
    assert_eq!(products.count_all(Vec::new()).await.unwrap(), 5);

    assert!(products
        .exists(Condition::all().add(product::Column::Quantity.eq(0)))
        .await
        .unwrap());
    assert!(!products
        .exists(Condition::all().add(product::Column::Price.gt(100_000)))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_aggregates() {
    let uow = seeded_unit().await;
    let products = uow.repository::<product::Entity>().unwrap();

    let max: Option<i64> = products.max(product::Column::Price, None).await.unwrap();
    assert_eq!(max, Some(12000));

    let min: Option<i64> = products
        .min(
            product::Column::Price,
            Some(Condition::all().add(product::Column::SupplierId.eq(1))),
        )
        .await
        .unwrap();
    assert_eq!(min, Some(800));

    let stock: Option<i64> = products.sum(product::Column::Quantity, None).await.unwrap();
    assert_eq!(stock, Some(54));

    let average: Option<f64> = products
        .average(
            product::Column::Price,
            Some(Condition::all().add(product::Column::SupplierId.eq(2))),
        )
        .await
        .unwrap();
    assert_eq!(average, Some(875.0));
}

#[tokio::test]
async fn test_aggregates_over_no_rows() {
    let uow = seeded_unit().await;
    let products = uow.repository::<product::Entity>().unwrap();
    let nothing = || Some(Condition::all().add(product::Column::Price.lt(0)));

    let max: Option<i64> = products.max(product::Column::Price, nothing()).await.unwrap();
    let sum: Option<i64> = products.sum(product::Column::Price, nothing()).await.unwrap();
    let average: Option<f64> = products.average(product::Column::Price, nothing()).await.unwrap();
    assert_eq!(max, None);
    assert_eq!(sum, None);
    assert_eq!(average, None);
}

#[tokio::test]
async fn test_updates_and_deletes() {
    let uow = seeded_unit().await;
    let products = uow.repository::<product::Entity>().unwrap();

    let mut anvil = products.find(1).await.unwrap().unwrap().into_active_model();
    anvil.price = sea_orm::ActiveValue::Set(4500);
    let updated = products.update(anvil).await.unwrap();
    assert_eq!(updated.price, 4500);

    let rocket = products.find(2).await.unwrap().unwrap();
    assert_eq!(products.delete(rocket.into_active_model()).await.unwrap(), 1);
    assert_eq!(products.delete_by_id(3).await.unwrap(), 1);
    assert_eq!(products.delete_by_id(3).await.unwrap(), 0);

    let removed = products
        .delete_where(Condition::all().add(product::Column::SupplierId.eq(2)))
        .await
        .unwrap();
    assert_eq!(removed, 2);

    let remaining = products.get_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "anvil");
}

#[tokio::test]
async fn test_standalone_repository_on_connection() {
    let db = setup_db().await;
    let suppliers = Repository::<supplier::Entity, _>::new(&db);
    let acme = suppliers.insert(common::new_supplier("Acme")).await.unwrap();

    let products = Repository::<product::Entity, _>::new(&db);
    assert_eq!(products.insert_many(Vec::<product::ActiveModel>::new()).await.unwrap(), 0);
    assert_eq!(
        products
            .insert_many([new_product(acme.id, "anvil", 5000, 3), new_product(acme.id, "rope", 300, 12)])
            .await
            .unwrap(),
        2
    );

    let updated = products
        .update_many(
            products
                .get_all()
                .await
                .unwrap()
                .into_iter()
                .map(|p| {
                    let mut model = p.into_active_model();
                    model.quantity = sea_orm::ActiveValue::Set(0);
                    model
                }),
        )
        .await
        .unwrap();
    assert!(updated.iter().all(|p| p.quantity == 0));

    let all = products.get_all().await.unwrap();
    let deleted = products
        .delete_many(all.into_iter().map(|p| p.into_active_model()))
        .await
        .unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(products.count(None).await.unwrap(), 0);
}
