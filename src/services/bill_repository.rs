//! Row mapping for bills and their lines. No business rules live here; the
//! lifecycle engine composes these primitives inside its transactions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select, Set,
};

use crate::{
    entity::{
        bill_items::{ActiveModel as ItemActive, Column as ItemCol, Entity as BillItems},
        bills::{ActiveModel as BillActive, Column as BillCol, Entity as Bills, Model as BillModel},
        customers::{Entity as Customers, Model as CustomerModel},
        products::{Entity as Products, Model as ProductModel},
        sea_orm_active_enums::BillStatus,
    },
    error::{AppError, AppResult},
    models::{Bill, BillItem, BillParts, CustomerSummary, Money, ProductSnapshot},
};

/// Which bills a listing returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BillFilter {
    pub status: Option<BillStatus>,
    pub customer_id: Option<i32>,
}

/// Rows whose status counts as completed. Legacy rows have NULL status and
/// are completed sales.
pub(crate) fn completed_condition() -> Condition {
    Condition::any()
        .add(BillCol::Status.eq(BillStatus::Completed))
        .add(BillCol::Status.is_null())
}

fn status_condition(status: BillStatus) -> Condition {
    match status {
        BillStatus::Completed => completed_condition(),
        BillStatus::Pending => Condition::all().add(BillCol::Status.eq(BillStatus::Pending)),
    }
}

pub async fn insert_bill<C: ConnectionTrait>(
    db: &C,
    bill: &Bill,
    customer_id: i32,
    created_at: DateTime<Utc>,
) -> AppResult<BillModel> {
    let row = BillActive {
        id: NotSet,
        customer_id: Set(Some(customer_id)),
        created_by_user_id: Set(bill.created_by_user_id()),
        total_amount: Set(bill.subtotal().cents()),
        discount_amount: Set(bill.discount().cents()),
        tax_amount: Set(bill.tax().cents()),
        final_amount: Set(bill.grand_total().cents()),
        payment_method: Set(bill.payment_method().to_owned()),
        bill_date: Set(created_at.into()),
        status: Set(Some(bill.status())),
    }
    .insert(db)
    .await?;

    Ok(row)
}

/// Insert every line of a bill in one statement.
pub async fn insert_items<C: ConnectionTrait>(
    db: &C,
    bill_id: i32,
    items: &[BillItem],
) -> AppResult<()> {
    if items.is_empty() {
        return Ok(());
    }

    let rows = items.iter().map(|item| ItemActive {
        id: NotSet,
        bill_id: Set(bill_id),
        product_id: Set(item.product_id()),
        quantity: Set(item.quantity()),
        unit_price: Set(item.unit_price().cents()),
        total_price: Set(item.total_price().cents()),
    });

    let inserted = BillItems::insert_many(rows).exec_without_returning(db).await?;
    if inserted != items.len() as u64 {
        return Err(AppError::Internal(anyhow::anyhow!(
            "expected {} bill items, inserted {}",
            items.len(),
            inserted
        )));
    }

    Ok(())
}

/// Flip a bill from PENDING to COMPLETED. Returns the number of rows
/// changed; zero means the bill is missing or not pending.
pub async fn mark_completed<C: ConnectionTrait>(db: &C, bill_id: i32) -> AppResult<u64> {
    let result = Bills::update_many()
        .set(BillActive {
            status: Set(Some(BillStatus::Completed)),
            ..Default::default()
        })
        .filter(BillCol::Id.eq(bill_id))
        .filter(BillCol::Status.eq(BillStatus::Pending))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

pub async fn bill_exists<C: ConnectionTrait>(db: &C, bill_id: i32) -> AppResult<bool> {
    let count = Bills::find()
        .filter(BillCol::Id.eq(bill_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Remove a bill and its lines. Returns the number of bill rows removed.
pub async fn delete_bill<C: ConnectionTrait>(db: &C, bill_id: i32) -> AppResult<u64> {
    // Lines first; the foreign key also cascades where it is enforced.
    BillItems::delete_many()
        .filter(ItemCol::BillId.eq(bill_id))
        .exec(db)
        .await?;

    let result = Bills::delete_by_id(bill_id).exec(db).await?;
    Ok(result.rows_affected)
}

/// Lines of the given bills with the current catalog values of their
/// products, keyed by bill id and in insertion order.
pub async fn find_items<C: ConnectionTrait>(
    db: &C,
    bill_ids: &[i32],
) -> AppResult<HashMap<i32, Vec<BillItem>>> {
    let mut grouped: HashMap<i32, Vec<BillItem>> = HashMap::new();
    if bill_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = BillItems::find()
        .filter(ItemCol::BillId.is_in(bill_ids.iter().copied()))
        .find_also_related(Products)
        .order_by_asc(ItemCol::Id)
        .all(db)
        .await?;

    for (item, product) in rows {
        let snapshot = product.map(product_snapshot);
        grouped.entry(item.bill_id).or_default().push(BillItem::restore(
            item.id,
            item.bill_id,
            item.product_id,
            item.quantity,
            Money::from_cents(item.unit_price),
            Money::from_cents(item.total_price),
            snapshot,
        ));
    }

    Ok(grouped)
}

pub async fn find_bill<C: ConnectionTrait>(db: &C, bill_id: i32) -> AppResult<Option<Bill>> {
    let bills = load(db, Bills::find().filter(BillCol::Id.eq(bill_id))).await?;
    Ok(bills.into_iter().next())
}

/// Bills matching `filter`, most recent first.
pub async fn find_bills<C: ConnectionTrait>(db: &C, filter: BillFilter) -> AppResult<Vec<Bill>> {
    let mut condition = Condition::all();
    if let Some(status) = filter.status {
        condition = condition.add(status_condition(status));
    }
    if let Some(customer_id) = filter.customer_id {
        condition = condition.add(BillCol::CustomerId.eq(customer_id));
    }

    let finder = Bills::find()
        .filter(condition)
        .order_by_desc(BillCol::BillDate)
        .order_by_desc(BillCol::Id);

    load(db, finder).await
}

async fn load<C: ConnectionTrait>(db: &C, finder: Select<Bills>) -> AppResult<Vec<Bill>> {
    let rows = finder.find_also_related(Customers).all(db).await?;

    let ids: Vec<i32> = rows.iter().map(|(bill, _)| bill.id).collect();
    let mut items = find_items(db, &ids).await?;

    let bills = rows
        .into_iter()
        .map(|(bill, customer)| {
            let lines = items.remove(&bill.id).unwrap_or_default();
            bill_from_entity(bill, customer, lines)
        })
        .collect();

    Ok(bills)
}

fn bill_from_entity(
    model: BillModel,
    customer: Option<CustomerModel>,
    items: Vec<BillItem>,
) -> Bill {
    Bill::restore(BillParts {
        id: model.id,
        customer_id: model.customer_id,
        created_by_user_id: model.created_by_user_id,
        customer: customer.map(customer_summary),
        items,
        subtotal: Money::from_cents(model.total_amount),
        discount: Money::from_cents(model.discount_amount),
        tax: Money::from_cents(model.tax_amount),
        grand_total: Money::from_cents(model.final_amount),
        payment_method: model.payment_method,
        status: BillStatus::from_column(model.status),
        created_at: model.bill_date.with_timezone(&Utc),
    })
}

fn customer_summary(model: CustomerModel) -> CustomerSummary {
    CustomerSummary {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        address: model.address,
    }
}

fn product_snapshot(model: ProductModel) -> ProductSnapshot {
    ProductSnapshot {
        name: model.name,
        description: model.description,
        category: model.category,
        barcode: model.barcode,
    }
}
