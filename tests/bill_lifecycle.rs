mod common;

use common::{bill_row_count, create_customer, create_product, item_row_count, setup_state, stock_of};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use shop_billing::{
    config::StockPolicy,
    dto::bills::{PlaceBillItem, PlaceBillRequest},
    entity::{
        products::{ActiveModel as ProductActive, Entity as Products},
        sea_orm_active_enums::BillStatus,
    },
    error::AppError,
    models::{Bill, BillItem, Money},
    services::{bill_service, party_service},
    state::AppState,
};

fn request(customer_id: Option<i32>, lines: &[(i32, i32)]) -> PlaceBillRequest {
    PlaceBillRequest {
        customer_id,
        created_by_user_id: None,
        payment_method: None,
        discount: None,
        items: lines
            .iter()
            .map(|&(product_id, quantity)| PlaceBillItem {
                product_id,
                quantity,
            })
            .collect(),
    }
}

async fn place(state: &AppState, customer_id: Option<i32>, lines: &[(i32, i32)]) -> anyhow::Result<Bill> {
    let mut bill = bill_service::draft_bill(state, request(customer_id, lines)).await?;
    bill_service::place(state, &mut bill).await?;
    Ok(bill)
}

#[tokio::test]
async fn place_then_confirm_deducts_stock_once() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;
    let pen = create_product(&state, "Pen", 1000, 10).await?;
    let pad = create_product(&state, "Pad", 500, 3).await?;

    let bill = place(&state, None, &[(pen, 2), (pad, 1)]).await?;
    let bill_id = bill.id().expect("placed bill has an id");

    assert_eq!(bill.status(), BillStatus::Pending);
    assert_eq!(bill.subtotal(), Money::from_cents(2500));
    assert_eq!(bill.tax(), Money::from_cents(300));
    assert_eq!(bill.grand_total(), Money::from_cents(2800));
    assert!(bill.created_at().is_some());
    assert_eq!(bill.items().len(), 2);
    assert!(bill.items().iter().all(|item| item.id().is_some()));
    assert!(bill.items().iter().all(|item| item.bill_id() == Some(bill_id)));

    // Placement leaves stock alone.
    assert_eq!(stock_of(&state, pen).await?, 10);
    assert_eq!(stock_of(&state, pad).await?, 3);

    let confirmed = bill_service::confirm(&state, bill_id).await?;
    assert_eq!(confirmed.status(), BillStatus::Completed);
    assert_eq!(confirmed.grand_total(), Money::from_cents(2800));
    assert_eq!(stock_of(&state, pen).await?, 8);
    assert_eq!(stock_of(&state, pad).await?, 2);

    let reread = bill_service::get_bill(&state, bill_id).await?;
    assert_eq!(reread.status(), BillStatus::Completed);
    assert_eq!(reread.items().len(), 2);
    let pen_line = reread
        .items()
        .iter()
        .find(|item| item.product_id() == pen)
        .expect("pen line");
    assert_eq!(pen_line.quantity(), 2);
    assert_eq!(pen_line.unit_price(), Money::from_cents(1000));
    assert_eq!(pen_line.total_price(), Money::from_cents(2000));
    assert_eq!(pen_line.product().map(|p| p.name.as_str()), Some("Pen"));

    Ok(())
}

#[tokio::test]
async fn confirming_twice_is_rejected_without_touching_stock() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;
    let pen = create_product(&state, "Pen", 1000, 10).await?;

    let bill = place(&state, None, &[(pen, 4)]).await?;
    let bill_id = bill.id().expect("placed bill has an id");

    bill_service::confirm(&state, bill_id).await?;
    assert_eq!(stock_of(&state, pen).await?, 6);

    let second = bill_service::confirm(&state, bill_id).await;
    assert!(matches!(second, Err(AppError::Conflict(_))));
    assert_eq!(stock_of(&state, pen).await?, 6);

    Ok(())
}

#[tokio::test]
async fn confirming_unknown_bill_is_not_found() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;

    let result = bill_service::confirm(&state, 9_999).await;
    assert!(matches!(result, Err(AppError::NotFound)));

    Ok(())
}

#[tokio::test]
async fn failed_line_insert_leaves_no_bill_behind() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;
    let pen = create_product(&state, "Pen", 1000, 10).await?;

    let mut bill = Bill::new();
    bill.add_item(BillItem::new(pen, 1, Money::from_cents(1000))?)?;
    bill.add_item(BillItem::new(9_999, 1, Money::from_cents(700))?)?;

    let result = bill_service::place(&state, &mut bill).await;
    assert!(result.is_err());
    assert_eq!(bill.id(), None);
    assert_eq!(bill_row_count(&state).await?, 0);
    assert_eq!(item_row_count(&state).await?, 0);
    assert_eq!(stock_of(&state, pen).await?, 10);

    Ok(())
}

#[tokio::test]
async fn draft_rejects_unknown_products_and_empty_bills() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;

    let unknown = bill_service::draft_bill(&state, request(None, &[(42, 1)])).await;
    assert!(matches!(unknown, Err(AppError::BadRequest(_))));

    let mut empty = Bill::new();
    let placed = bill_service::place(&state, &mut empty).await;
    assert!(matches!(placed, Err(AppError::BadRequest(_))));
    assert_eq!(bill_row_count(&state).await?, 0);

    Ok(())
}

#[tokio::test]
async fn placing_an_already_placed_bill_conflicts() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;
    let pen = create_product(&state, "Pen", 1000, 10).await?;

    let mut bill = place(&state, None, &[(pen, 1)]).await?;
    let again = bill_service::place(&state, &mut bill).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
    assert_eq!(bill_row_count(&state).await?, 1);

    Ok(())
}

#[tokio::test]
async fn insufficient_stock_rolls_back_the_whole_confirmation() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;
    let pen = create_product(&state, "Pen", 1000, 10).await?;
    let pad = create_product(&state, "Pad", 500, 1).await?;

    let bill = place(&state, None, &[(pen, 2), (pad, 5)]).await?;
    let bill_id = bill.id().expect("placed bill has an id");

    let result = bill_service::confirm(&state, bill_id).await;
    assert!(matches!(
        result,
        Err(AppError::InsufficientStock { product_id, requested: 5 }) if product_id == pad
    ));

    assert_eq!(stock_of(&state, pen).await?, 10);
    assert_eq!(stock_of(&state, pad).await?, 1);
    let reread = bill_service::get_bill(&state, bill_id).await?;
    assert_eq!(reread.status(), BillStatus::Pending);

    Ok(())
}

#[tokio::test]
async fn repeated_product_lines_are_deducted_together() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;
    let pen = create_product(&state, "Pen", 1000, 5).await?;

    // 3 + 3 exceeds the stock of 5 even though each line fits.
    let bill = place(&state, None, &[(pen, 3), (pen, 3)]).await?;
    let bill_id = bill.id().expect("placed bill has an id");

    let result = bill_service::confirm(&state, bill_id).await;
    assert!(matches!(result, Err(AppError::InsufficientStock { requested: 6, .. })));
    assert_eq!(stock_of(&state, pen).await?, 5);

    Ok(())
}

#[tokio::test]
async fn backorder_policy_lets_stock_go_negative() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Backorder).await?;
    let pad = create_product(&state, "Pad", 500, 1).await?;

    let bill = place(&state, None, &[(pad, 3)]).await?;
    let confirmed = bill_service::confirm(&state, bill.id().expect("placed bill has an id")).await?;

    assert_eq!(confirmed.status(), BillStatus::Completed);
    assert_eq!(stock_of(&state, pad).await?, -2);

    Ok(())
}

#[tokio::test]
async fn delete_removes_bill_and_lines_but_not_stock() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;
    let pen = create_product(&state, "Pen", 1000, 10).await?;

    let kept = place(&state, None, &[(pen, 1)]).await?;
    let doomed = place(&state, None, &[(pen, 2), (pen, 1)]).await?;
    let doomed_id = doomed.id().expect("placed bill has an id");
    bill_service::confirm(&state, doomed_id).await?;
    assert_eq!(item_row_count(&state).await?, 3);

    bill_service::delete(&state, doomed_id).await?;

    assert!(matches!(
        bill_service::get_bill(&state, doomed_id).await,
        Err(AppError::NotFound)
    ));
    assert_eq!(item_row_count(&state).await?, 1);
    assert_eq!(bill_row_count(&state).await?, 1);
    assert!(bill_service::get_bill(&state, kept.id().expect("id")).await.is_ok());
    assert_eq!(stock_of(&state, pen).await?, 7);

    let missing = bill_service::delete(&state, doomed_id).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    Ok(())
}

#[tokio::test]
async fn listings_are_newest_first_and_filterable() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;
    let pen = create_product(&state, "Pen", 1000, 100).await?;
    let alice = create_customer(&state, "Alice").await?;
    let bob = create_customer(&state, "Bob").await?;

    let first = place(&state, Some(alice), &[(pen, 1)]).await?;
    let second = place(&state, Some(bob), &[(pen, 2)]).await?;
    let third = place(&state, Some(alice), &[(pen, 3)]).await?;
    let first_id = first.id().expect("id");
    let second_id = second.id().expect("id");
    let third_id = third.id().expect("id");
    bill_service::confirm(&state, second_id).await?;

    let all: Vec<i32> = bill_service::list_bills(&state)
        .await?
        .iter()
        .filter_map(Bill::id)
        .collect();
    assert_eq!(all, vec![third_id, second_id, first_id]);

    let pending: Vec<i32> = bill_service::list_bills_by_status(&state, BillStatus::Pending)
        .await?
        .iter()
        .filter_map(Bill::id)
        .collect();
    assert_eq!(pending, vec![third_id, first_id]);

    let completed: Vec<i32> = bill_service::list_bills_by_status(&state, BillStatus::Completed)
        .await?
        .iter()
        .filter_map(Bill::id)
        .collect();
    assert_eq!(completed, vec![second_id]);

    let alices = bill_service::list_bills_by_customer(&state, alice).await?;
    assert_eq!(
        alices.iter().filter_map(Bill::id).collect::<Vec<_>>(),
        vec![third_id, first_id]
    );
    assert!(alices.iter().all(|b| b.customer().map(|c| c.name.as_str()) == Some("Alice")));

    assert!(bill_service::list_bills_by_customer(&state, 9_999).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn bills_without_customer_go_to_walk_in() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;
    let pen = create_product(&state, "Pen", 1000, 10).await?;

    let first = place(&state, None, &[(pen, 1)]).await?;
    let second = place(&state, None, &[(pen, 1)]).await?;

    let walk_in = party_service::ensure_walk_in_customer(&state.orm).await?;
    assert_eq!(first.customer_id(), Some(walk_in));
    assert_eq!(second.customer_id(), Some(walk_in));

    let customers = party_service::list_customers(&state.orm).await?;
    let walk_ins = customers
        .iter()
        .filter(|c| c.username.as_deref() == Some(party_service::WALK_IN_USERNAME))
        .count();
    assert_eq!(walk_ins, 1);

    Ok(())
}

#[tokio::test]
async fn discount_and_payment_method_survive_placement() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;
    let pen = create_product(&state, "Pen", 1000, 10).await?;
    let staff = party_service::create_user(&state.orm, "cashier", "secret", "Cashier One", "staff")
        .await?;

    let mut req = request(None, &[(pen, 3)]);
    req.discount = Some(Money::from_cents(500));
    req.payment_method = Some("CARD".into());
    req.created_by_user_id = Some(staff.id);

    let mut bill = bill_service::draft_bill(&state, req).await?;
    bill_service::place(&state, &mut bill).await?;

    let reread = bill_service::get_bill(&state, bill.id().expect("id")).await?;
    assert_eq!(reread.subtotal(), Money::from_cents(3000));
    assert_eq!(reread.discount(), Money::from_cents(500));
    assert_eq!(
        reread.grand_total().cents(),
        reread.subtotal().cents() - reread.discount().cents() + reread.tax().cents()
    );
    assert_eq!(reread.payment_method(), "CARD");
    assert_eq!(reread.created_by_user_id(), Some(staff.id));

    Ok(())
}

#[tokio::test]
async fn line_price_is_fixed_at_placement_but_description_follows_catalog() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;
    let pen = create_product(&state, "Pen", 1000, 10).await?;

    let bill = place(&state, None, &[(pen, 2)]).await?;
    let bill_id = bill.id().expect("placed bill has an id");

    let stored = Products::find_by_id(pen)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product missing"))?;
    let mut active: ProductActive = stored.into();
    active.price = Set(9999);
    active.name = Set("Pen v2".into());
    active.update(&state.orm).await?;

    let reread = bill_service::get_bill(&state, bill_id).await?;
    let line = &reread.items()[0];
    assert_eq!(line.unit_price(), Money::from_cents(1000));
    assert_eq!(line.total_price(), Money::from_cents(2000));
    assert_eq!(line.product().map(|p| p.name.as_str()), Some("Pen v2"));
    assert_eq!(reread.grand_total(), Money::from_cents(2240));

    Ok(())
}

#[tokio::test]
async fn out_of_range_prices_are_rejected_instead_of_overflowing() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;
    // Written directly, as a row from an older writer would be.
    let huge = create_product(&state, "Gold bar", i64::MAX, 10).await?;
    let pricey = create_product(&state, "Yacht", 9_999_999_999, 10).await?;

    let single = bill_service::draft_bill(&state, request(None, &[(huge, 1)])).await;
    assert!(matches!(single, Err(AppError::BadRequest(_))));

    let many = bill_service::draft_bill(&state, request(None, &[(pricey, i32::MAX)])).await;
    assert!(matches!(many, Err(AppError::BadRequest(_))));

    let summed = bill_service::draft_bill(
        &state,
        request(None, &[(pricey, 400_000_000), (pricey, 400_000_000), (pricey, 400_000_000)]),
    )
    .await;
    assert!(matches!(summed, Err(AppError::BadRequest(_))));
    assert_eq!(bill_row_count(&state).await?, 0);

    Ok(())
}

#[tokio::test]
async fn concurrent_walk_in_resolution_yields_one_customer() -> anyhow::Result<()> {
    let state = setup_state(StockPolicy::Reject).await?;

    let (first, second, third) = tokio::join!(
        party_service::ensure_walk_in_customer(&state.orm),
        party_service::ensure_walk_in_customer(&state.orm),
        party_service::ensure_walk_in_customer(&state.orm),
    );
    let first = first?;
    assert_eq!(second?, first);
    assert_eq!(third?, first);
    assert_eq!(party_service::count_customers(&state.orm).await?, 1);

    Ok(())
}
