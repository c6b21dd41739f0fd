use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::MigratorTrait;
use shop_billing::{
    config::StockPolicy,
    db::create_orm_conn,
    dto::{
        bills::{PlaceBillItem, PlaceBillRequest},
        products::CreateProductRequest,
    },
    entity::sea_orm_active_enums::BillStatus,
    migration::Migrator,
    models::Money,
    services::{bill_service, catalog_service, report_service},
    state::AppState,
};

#[tokio::test]
async fn rows_from_first_schema_version_read_as_completed() -> anyhow::Result<()> {
    let orm = create_orm_conn("sqlite::memory:", 1).await?;
    Migrator::up(&orm, Some(1)).await?;

    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "INSERT INTO bills (customer_id, total_amount, discount_amount, tax_amount, final_amount, payment_method, bill_date) \
         VALUES (NULL, 5000, 0, 600, 5600, 'CASH', '2024-01-01T10:00:00+00:00')",
    ))
    .await?;

    Migrator::up(&orm, None).await?;
    let state = AppState::new(orm, StockPolicy::Reject);

    let legacy = bill_service::list_bills(&state).await?;
    assert_eq!(legacy.len(), 1);
    assert_eq!(legacy[0].status(), BillStatus::Completed);
    assert_eq!(legacy[0].created_by_user_id(), None);
    assert_eq!(report_service::total_revenue(&state.orm).await?, Money::from_cents(5600));

    let product = catalog_service::create_product(
        &state,
        CreateProductRequest {
            name: "Pen".into(),
            description: None,
            price: Money::from_cents(1000),
            stock_quantity: 5,
            category: None,
            barcode: None,
            image_path: None,
        },
    )
    .await?;
    let mut bill = bill_service::draft_bill(
        &state,
        PlaceBillRequest {
            customer_id: None,
            created_by_user_id: None,
            payment_method: None,
            discount: None,
            items: vec![PlaceBillItem {
                product_id: product.id,
                quantity: 1,
            }],
        },
    )
    .await?;
    bill_service::place(&state, &mut bill).await?;

    let reread = bill_service::get_bill(&state, bill.id().expect("placed bill has an id")).await?;
    assert_eq!(reread.status(), BillStatus::Pending);
    assert_eq!(report_service::total_revenue(&state.orm).await?, Money::from_cents(5600));

    Ok(())
}
