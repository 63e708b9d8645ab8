#![allow(dead_code)]

use sea_orm::{ActiveValue, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use sea_uow::unit_of_work::{ensure_auto_history_table, UnitOfWork};

pub mod supplier {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "suppliers")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::product::Entity")]
        Products,
    }

    impl Related<super::product::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Products.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod product {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "products")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub supplier_id: i32,
        pub name: String,
        pub price: i64,
        pub quantity: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::supplier::Entity",
            from = "Column::SupplierId",
            to = "super::supplier::Column::Id",
            on_delete = "Cascade"
        )]
        Supplier,
    }

    impl Related<super::supplier::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Supplier.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Name and price of a product, selected without the other columns.
#[derive(Debug, PartialEq, sea_orm::DerivePartialModel, sea_orm::FromQueryResult)]
#[sea_orm(entity = "product::Entity")]
pub struct ProductPrice {
    pub name: String,
    pub price: i64,
}

/// Fresh in-memory database with the test tables and `auto_history`.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.min_connections(1).max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.expect("in-memory database");

    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(supplier::Entity)))
        .await
        .expect("create suppliers");
    db.execute(backend.build(&schema.create_table_from_entity(product::Entity)))
        .await
        .expect("create products");
    ensure_auto_history_table(&db).await.expect("create auto_history");
    db
}

pub fn new_supplier(name: &str) -> supplier::ActiveModel {
    supplier::ActiveModel {
        name: ActiveValue::Set(name.to_string()),
        ..Default::default()
    }
}

pub fn new_product(supplier_id: i32, name: &str, price: i64, quantity: i32) -> product::ActiveModel {
    product::ActiveModel {
        supplier_id: ActiveValue::Set(supplier_id),
        name: ActiveValue::Set(name.to_string()),
        price: ActiveValue::Set(price),
        quantity: ActiveValue::Set(quantity),
        ..Default::default()
    }
}

/// Unit of work over a seeded catalogue:
///
/// | id | supplier | name    | price | quantity |
/// |----|----------|---------|-------|----------|
/// | 1  | Acme     | anvil   | 5000  | 3        |
/// | 2  | Acme     | rocket  | 12000 | 1        |
/// | 3  | Acme     | magnet  | 800   | 10       |
/// | 4  | Globex   | widget  | 250   | 40       |
/// | 5  | Globex   | gadget  | 1500  | 0        |
pub async fn seeded_unit() -> UnitOfWork {
    let mut uow = UnitOfWork::new(setup_db().await).await.expect("unit of work");
    {
        let suppliers = uow.repository::<supplier::Entity>().unwrap();
        let acme = suppliers.insert(new_supplier("Acme")).await.unwrap();
        let globex = suppliers.insert(new_supplier("Globex")).await.unwrap();

        let products = uow.repository::<product::Entity>().unwrap();
        products
            .insert_many([
                new_product(acme.id, "anvil", 5000, 3),
                new_product(acme.id, "rocket", 12000, 1),
                new_product(acme.id, "magnet", 800, 10),
                new_product(globex.id, "widget", 250, 40),
                new_product(globex.id, "gadget", 1500, 0),
            ])
            .await
            .unwrap();
    }
    uow.save_changes(false).await.expect("seed");
    uow
}
