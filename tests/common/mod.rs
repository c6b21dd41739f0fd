#![allow(dead_code)]

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseBackend, EntityTrait, Set, Statement};
use shop_billing::{
    config::StockPolicy,
    db::{create_orm_conn, run_migrations},
    entity::{
        BillItems, Bills,
        customers::ActiveModel as CustomerActive,
        products::{ActiveModel as ProductActive, Entity as Products},
    },
    state::AppState,
};

/// Fresh state on an in-memory SQLite database. Set `TEST_DATABASE_URL` to
/// run against another server instead; its tables are emptied first, so run
/// with `--test-threads=1` in that case.
pub async fn setup_state(policy: StockPolicy) -> anyhow::Result<AppState> {
    let database_url =
        std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string());
    let orm = create_orm_conn(&database_url, 1).await?;
    run_migrations(&orm).await?;

    if orm.get_database_backend() == DatabaseBackend::Postgres {
        orm.execute(Statement::from_string(
            DatabaseBackend::Postgres,
            "TRUNCATE TABLE bill_items, bills, audit_logs, products, customers, users RESTART IDENTITY CASCADE",
        ))
        .await?;
    }

    Ok(AppState::new(orm, policy))
}

pub async fn create_product(
    state: &AppState,
    name: &str,
    price_cents: i64,
    stock: i32,
) -> anyhow::Result<i32> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let product = ProductActive {
        id: NotSet,
        name: Set(name.into()),
        description: Set(Some(format!("{name} for testing"))),
        price: Set(price_cents),
        stock_quantity: Set(stock),
        category: Set(Some("Test".into())),
        barcode: Set(None),
        image_path: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.orm)
    .await?;

    Ok(product.id)
}

pub async fn create_customer(state: &AppState, name: &str) -> anyhow::Result<i32> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let customer = CustomerActive {
        id: NotSet,
        name: Set(name.into()),
        username: Set(None),
        email: Set(None),
        phone: Set(None),
        address: Set(None),
        password: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.orm)
    .await?;

    Ok(customer.id)
}

pub async fn stock_of(state: &AppState, product_id: i32) -> anyhow::Result<i32> {
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product {product_id} missing"))?;
    Ok(product.stock_quantity)
}

pub async fn bill_row_count(state: &AppState) -> anyhow::Result<usize> {
    Ok(Bills::find().all(&state.orm).await?.len())
}

pub async fn item_row_count(state: &AppState) -> anyhow::Result<usize> {
    Ok(BillItems::find().all(&state.orm).await?.len())
}
