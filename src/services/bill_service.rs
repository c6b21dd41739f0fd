//! Order lifecycle engine: placement, confirmation and deletion of bills.
//!
//! Placement persists a bill as PENDING and never touches stock.
//! Confirmation is the single point where inventory is committed: it flips
//! the status and deducts every line from stock inside one transaction.

use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::TransactionTrait;

use crate::{
    audit::log_audit,
    dto::bills::PlaceBillRequest,
    entity::sea_orm_active_enums::BillStatus,
    error::{AppError, AppResult},
    models::{Bill, BillItem},
    services::{
        bill_repository::{self, BillFilter},
        catalog_service, party_service,
    },
    state::AppState,
};

/// Persist `bill` as PENDING together with all of its lines, atomically.
/// On success the bill carries its generated id and creation time.
pub async fn place(state: &AppState, bill: &mut Bill) -> AppResult<()> {
    validate_for_placement(bill)?;

    let txn = state.orm.begin().await?;

    let customer_id = match bill.customer_id() {
        Some(id) => id,
        None => party_service::ensure_walk_in_customer(&txn).await?,
    };

    let created_at = Utc::now();
    let row = bill_repository::insert_bill(&txn, bill, customer_id, created_at).await?;
    bill_repository::insert_items(&txn, row.id, bill.items()).await?;
    let items = bill_repository::find_items(&txn, &[row.id])
        .await?
        .remove(&row.id)
        .unwrap_or_default();

    txn.commit().await?;

    bill.mark_placed(row.id, customer_id, created_at, items);
    tracing::info!(
        bill_id = row.id,
        customer_id,
        lines = bill.items().len(),
        grand_total = %bill.grand_total(),
        "bill placed"
    );

    if let Err(err) = log_audit(
        &state.orm,
        bill.created_by_user_id(),
        "bill_placed",
        Some("bills"),
        Some(serde_json::json!({
            "bill_id": row.id,
            "grand_total": bill.grand_total().cents(),
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(())
}

/// Move a PENDING bill to COMPLETED and deduct its lines from stock.
///
/// Fails with `NotFound` for an unknown id and `Conflict` for a bill that is
/// not pending; confirming twice never succeeds. Any failure rolls back both
/// the status change and every deduction already applied.
pub async fn confirm(state: &AppState, bill_id: i32) -> AppResult<Bill> {
    let txn = state.orm.begin().await?;

    let updated = bill_repository::mark_completed(&txn, bill_id).await?;
    if updated == 0 {
        let exists = bill_repository::bill_exists(&txn, bill_id).await?;
        tracing::warn!(bill_id, exists, "bill confirmation rejected");
        return Err(if exists {
            AppError::Conflict(format!("bill {bill_id} is not pending"))
        } else {
            AppError::NotFound
        });
    }

    let items = bill_repository::find_items(&txn, &[bill_id])
        .await?
        .remove(&bill_id)
        .unwrap_or_default();

    // One statement per product, in id order, so concurrent confirmations
    // over overlapping products lock rows in the same order.
    let mut deductions: BTreeMap<i32, i32> = BTreeMap::new();
    for item in &items {
        let total = deductions.entry(item.product_id()).or_insert(0);
        *total = total.checked_add(item.quantity()).ok_or_else(|| {
            AppError::BadRequest(format!(
                "quantity overflow for product {}",
                item.product_id()
            ))
        })?;
    }

    for (product_id, quantity) in &deductions {
        if let Err(err) =
            catalog_service::decrement_stock(&txn, *product_id, *quantity, state.stock_policy).await
        {
            tracing::warn!(bill_id, product_id, quantity, error = %err, "stock deduction failed");
            return Err(err);
        }
    }

    let bill = bill_repository::find_bill(&txn, bill_id)
        .await?
        .ok_or(AppError::NotFound)?;

    txn.commit().await?;

    tracing::info!(bill_id, products = deductions.len(), "bill confirmed");

    if let Err(err) = log_audit(
        &state.orm,
        bill.created_by_user_id(),
        "bill_confirmed",
        Some("bills"),
        Some(serde_json::json!({
            "bill_id": bill_id,
            "deductions": deductions,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(bill)
}

/// Remove a bill and its lines. Stock already deducted by a confirmation is
/// not restored.
pub async fn delete(state: &AppState, bill_id: i32) -> AppResult<()> {
    let txn = state.orm.begin().await?;
    let removed = bill_repository::delete_bill(&txn, bill_id).await?;
    if removed == 0 {
        return Err(AppError::NotFound);
    }
    txn.commit().await?;

    tracing::info!(bill_id, "bill deleted");

    if let Err(err) = log_audit(
        &state.orm,
        None,
        "bill_deleted",
        Some("bills"),
        Some(serde_json::json!({ "bill_id": bill_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(())
}

pub async fn get_bill(state: &AppState, bill_id: i32) -> AppResult<Bill> {
    match bill_repository::find_bill(&state.orm, bill_id).await? {
        Some(bill) => Ok(bill),
        None => Err(AppError::NotFound),
    }
}

pub async fn list_bills(state: &AppState) -> AppResult<Vec<Bill>> {
    bill_repository::find_bills(&state.orm, BillFilter::default()).await
}

pub async fn list_bills_by_status(state: &AppState, status: BillStatus) -> AppResult<Vec<Bill>> {
    let filter = BillFilter {
        status: Some(status),
        ..Default::default()
    };
    bill_repository::find_bills(&state.orm, filter).await
}

pub async fn list_bills_by_customer(state: &AppState, customer_id: i32) -> AppResult<Vec<Bill>> {
    let filter = BillFilter {
        customer_id: Some(customer_id),
        ..Default::default()
    };
    bill_repository::find_bills(&state.orm, filter).await
}

pub async fn list_bills_filtered(state: &AppState, filter: BillFilter) -> AppResult<Vec<Bill>> {
    bill_repository::find_bills(&state.orm, filter).await
}

/// Build an unplaced bill from a request, snapshotting each product's
/// current price.
pub async fn draft_bill(state: &AppState, request: PlaceBillRequest) -> AppResult<Bill> {
    let mut bill = match request.customer_id {
        Some(customer_id) => Bill::for_customer(customer_id),
        None => Bill::new(),
    };
    if let Some(user_id) = request.created_by_user_id {
        bill = bill.created_by(user_id);
    }
    if let Some(method) = request.payment_method.filter(|m| !m.trim().is_empty()) {
        bill = bill.with_payment_method(method);
    }

    for line in request.items {
        let product = catalog_service::find_product(&state.orm, line.product_id)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("unknown product {}", line.product_id)))?;
        bill.add_item(BillItem::for_product(&product, line.quantity)?)?;
    }

    if let Some(discount) = request.discount {
        bill.set_discount(discount)?;
    }

    Ok(bill)
}

fn validate_for_placement(bill: &Bill) -> AppResult<()> {
    if bill.id().is_some() {
        return Err(AppError::Conflict("bill has already been placed".into()));
    }
    if bill.status() != BillStatus::Pending {
        return Err(AppError::BadRequest("only pending bills can be placed".into()));
    }
    if bill.items().is_empty() {
        return Err(AppError::BadRequest("bill has no items".into()));
    }
    for item in bill.items() {
        item.validate()?;
    }
    Ok(())
}
