mod common;

use chrono::Utc;
use common::{create_product, setup_state};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};
use shop_billing::{
    config::StockPolicy,
    dto::bills::{PlaceBillItem, PlaceBillRequest},
    entity::{bills::ActiveModel as BillActive, sea_orm_active_enums::BillStatus},
    models::Money,
    services::{bill_service, party_service, report_service},
    state::AppState,
};

async fn place(state: &AppState, product_id: i32, quantity: i32) -> anyhow::Result<i32> {
    let request = PlaceBillRequest {
        customer_id: None,
        created_by_user_id: None,
        payment_method: None,
        discount: None,
        items: vec![PlaceBillItem {
            product_id,
            quantity,
        }],
    };
    let mut bill = bill_service::draft_bill(state, request).await?;
    bill_service::place(state, &mut bill).await?;
    bill.id().ok_or_else(|| anyhow::anyhow!("bill was not assigned an id"))
}

#[tokio::test]
async fn empty_store_reports_zero() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;

    assert_eq!(report_service::total_revenue(&state.orm).await?, Money::ZERO);
    assert_eq!(report_service::highest_bill_amount(&state.orm).await?, Money::ZERO);
    assert_eq!(report_service::lowest_bill_amount(&state.orm).await?, Money::ZERO);

    let summary = report_service::sales_summary(&state).await?;
    assert_eq!(summary.completed_bills, 0);

    Ok(())
}

#[tokio::test]
async fn pending_bills_do_not_count() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;
    let pen = create_product(&state, "Pen", 1000, 100).await?;

    place(&state, pen, 5).await?;

    assert_eq!(report_service::total_revenue(&state.orm).await?, Money::ZERO);
    assert_eq!(report_service::highest_bill_amount(&state.orm).await?, Money::ZERO);

    Ok(())
}

#[tokio::test]
async fn aggregates_cover_completed_bills_only() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;
    let pen = create_product(&state, "Pen", 1000, 100).await?;

    // Grand totals: 1 x 10.00 -> 11.20, 3 x 10.00 -> 33.60.
    let small = place(&state, pen, 1).await?;
    let large = place(&state, pen, 3).await?;
    place(&state, pen, 10).await?;
    bill_service::confirm(&state, small).await?;
    bill_service::confirm(&state, large).await?;

    assert_eq!(report_service::total_revenue(&state.orm).await?, Money::from_cents(4480));
    assert_eq!(report_service::highest_bill_amount(&state.orm).await?, Money::from_cents(3360));
    assert_eq!(report_service::lowest_bill_amount(&state.orm).await?, Money::from_cents(1120));

    let summary = report_service::sales_summary(&state).await?;
    assert_eq!(summary.completed_bills, 2);
    assert_eq!(summary.total_revenue, Money::from_cents(4480));

    Ok(())
}

#[tokio::test]
async fn legacy_rows_without_status_count_as_completed() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;
    let walk_in = party_service::ensure_walk_in_customer(&state.orm).await?;

    let legacy = BillActive {
        id: NotSet,
        customer_id: Set(Some(walk_in)),
        created_by_user_id: Set(None),
        total_amount: Set(5000),
        discount_amount: Set(0),
        tax_amount: Set(600),
        final_amount: Set(5600),
        payment_method: Set("CASH".into()),
        bill_date: Set(Utc::now().into()),
        status: Set(None),
    }
    .insert(&state.orm)
    .await?;

    assert_eq!(report_service::total_revenue(&state.orm).await?, Money::from_cents(5600));
    assert_eq!(report_service::lowest_bill_amount(&state.orm).await?, Money::from_cents(5600));

    let bill = bill_service::get_bill(&state, legacy.id).await?;
    assert_eq!(bill.status(), BillStatus::Completed);
    let completed = bill_service::list_bills_by_status(&state, BillStatus::Completed).await?;
    assert_eq!(completed.len(), 1);

    Ok(())
}
