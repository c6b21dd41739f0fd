use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::sea_orm_active_enums::BillStatus,
    error::{AppError, AppResult},
};

/// Sales tax applied to every bill subtotal, in percent.
pub const TAX_RATE_PERCENT: i64 = 12;

/// Largest unit price a product or line may carry: 99,999,999.99, the range
/// of a `DECIMAL(10,2)` price column.
pub const MAX_UNIT_PRICE: Money = Money(9_999_999_999);

/// Payment method stored when the caller does not name one.
pub const DEFAULT_PAYMENT_METHOD: &str = "CASH";

/// Monetary amount with two fraction digits, held as minor units (cents).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    ToSchema,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(&self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(&self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    pub fn checked_mul(&self, quantity: i32) -> Option<Money> {
        self.0.checked_mul(i64::from(quantity)).map(Money)
    }

    /// `percent`% of this amount, rounded half-up to the cent.
    pub fn percent(&self, percent: i64) -> Money {
        let scaled = i128::from(self.0) * i128::from(percent);
        let rounded = if scaled >= 0 {
            (scaled + 50) / 100
        } else {
            (scaled - 50) / 100
        };
        Money(rounded as i64)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock_quantity: i32,
    pub category: Option<String>,
    pub barcode: Option<String>,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Customer fields joined onto a bill when it is read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CustomerSummary {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Current catalog values of the product a line points at, joined at read
/// time. Never persisted alongside the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductSnapshot {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub barcode: Option<String>,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            barcode: product.barcode.clone(),
        }
    }
}

/// One product/quantity/price entry of a bill. The unit price is a snapshot
/// taken when the line is created.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BillItem {
    id: Option<i32>,
    bill_id: Option<i32>,
    product_id: i32,
    quantity: i32,
    unit_price: Money,
    total_price: Money,
    product: Option<ProductSnapshot>,
}

impl BillItem {
    pub fn new(product_id: i32, quantity: i32, unit_price: Money) -> AppResult<Self> {
        if quantity <= 0 {
            return Err(AppError::BadRequest(format!(
                "quantity for product {product_id} must be positive"
            )));
        }
        if unit_price.is_negative() {
            return Err(AppError::BadRequest(format!(
                "unit price for product {product_id} must not be negative"
            )));
        }
        if unit_price > MAX_UNIT_PRICE {
            return Err(AppError::BadRequest(format!(
                "unit price for product {product_id} exceeds {MAX_UNIT_PRICE}"
            )));
        }
        let total_price = unit_price
            .checked_mul(quantity)
            .ok_or_else(|| AppError::BadRequest("line total overflows".into()))?;

        Ok(Self {
            id: None,
            bill_id: None,
            product_id,
            quantity,
            unit_price,
            total_price,
            product: None,
        })
    }

    /// Line for `product` at its current catalog price.
    pub fn for_product(product: &Product, quantity: i32) -> AppResult<Self> {
        let mut item = Self::new(product.id, quantity, product.price)?;
        item.product = Some(ProductSnapshot::from(product));
        Ok(item)
    }

    pub(crate) fn restore(
        id: i32,
        bill_id: i32,
        product_id: i32,
        quantity: i32,
        unit_price: Money,
        total_price: Money,
        product: Option<ProductSnapshot>,
    ) -> Self {
        Self {
            id: Some(id),
            bill_id: Some(bill_id),
            product_id,
            quantity,
            unit_price,
            total_price,
            product,
        }
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }

    pub fn bill_id(&self) -> Option<i32> {
        self.bill_id
    }

    pub fn product_id(&self) -> i32 {
        self.product_id
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }

    pub fn product(&self) -> Option<&ProductSnapshot> {
        self.product.as_ref()
    }

    pub(crate) fn validate(&self) -> AppResult<()> {
        if self.quantity <= 0 {
            return Err(AppError::BadRequest(format!(
                "quantity for product {} must be positive",
                self.product_id
            )));
        }
        if self.unit_price.is_negative() {
            return Err(AppError::BadRequest(format!(
                "unit price for product {} must not be negative",
                self.product_id
            )));
        }
        Ok(())
    }
}

/// Stored column values of a bill, used to rebuild it on the read path.
pub(crate) struct BillParts {
    pub id: i32,
    pub customer_id: Option<i32>,
    pub created_by_user_id: Option<i32>,
    pub customer: Option<CustomerSummary>,
    pub items: Vec<BillItem>,
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub grand_total: Money,
    pub payment_method: String,
    pub status: BillStatus,
    pub created_at: DateTime<Utc>,
}

/// A customer purchase. Built in memory, placed once, then only its status
/// changes.
///
/// `subtotal`, `tax` and `grand_total` are derived and recomputed on every
/// line or discount change:
/// `grand_total = subtotal + round(subtotal * 12%) - discount`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Bill {
    id: Option<i32>,
    customer_id: Option<i32>,
    created_by_user_id: Option<i32>,
    customer: Option<CustomerSummary>,
    items: Vec<BillItem>,
    subtotal: Money,
    discount: Money,
    tax: Money,
    grand_total: Money,
    payment_method: String,
    status: BillStatus,
    created_at: Option<DateTime<Utc>>,
}

impl Default for Bill {
    fn default() -> Self {
        Self::new()
    }
}

impl Bill {
    /// Empty pending bill for the walk-in customer.
    pub fn new() -> Self {
        Self {
            id: None,
            customer_id: None,
            created_by_user_id: None,
            customer: None,
            items: Vec::new(),
            subtotal: Money::ZERO,
            discount: Money::ZERO,
            tax: Money::ZERO,
            grand_total: Money::ZERO,
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
            status: BillStatus::Pending,
            created_at: None,
        }
    }

    pub fn for_customer(customer_id: i32) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Self::new()
        }
    }

    pub fn created_by(mut self, user_id: i32) -> Self {
        self.created_by_user_id = Some(user_id);
        self
    }

    pub fn with_payment_method(mut self, payment_method: impl Into<String>) -> Self {
        self.payment_method = payment_method.into();
        self
    }

    /// Append a line. Fails, leaving the bill untouched, when the totals
    /// would leave the representable range.
    pub fn add_item(&mut self, item: BillItem) -> AppResult<()> {
        self.items.push(item);
        if let Err(err) = self.recalculate() {
            self.items.pop();
            return Err(err);
        }
        Ok(())
    }

    pub fn remove_item(&mut self, index: usize) -> AppResult<Option<BillItem>> {
        if index >= self.items.len() {
            return Ok(None);
        }
        let removed = self.items.remove(index);
        if let Err(err) = self.recalculate() {
            self.items.insert(index, removed);
            return Err(err);
        }
        Ok(Some(removed))
    }

    pub fn set_discount(&mut self, discount: Money) -> AppResult<()> {
        if discount.is_negative() {
            return Err(AppError::BadRequest("discount must not be negative".into()));
        }
        let previous = std::mem::replace(&mut self.discount, discount);
        if let Err(err) = self.recalculate() {
            self.discount = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Recompute the derived totals. On overflow nothing is assigned.
    fn recalculate(&mut self) -> AppResult<()> {
        let overflow = || AppError::BadRequest("bill total is out of range".into());

        let mut subtotal = Money::ZERO;
        for item in &self.items {
            subtotal = subtotal.checked_add(item.total_price()).ok_or_else(overflow)?;
        }
        let tax = subtotal.percent(TAX_RATE_PERCENT);
        let grand_total = subtotal
            .checked_add(tax)
            .and_then(|gross| gross.checked_sub(self.discount))
            .ok_or_else(overflow)?;

        self.subtotal = subtotal;
        self.tax = tax;
        self.grand_total = grand_total;
        Ok(())
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }

    pub fn customer_id(&self) -> Option<i32> {
        self.customer_id
    }

    pub fn created_by_user_id(&self) -> Option<i32> {
        self.created_by_user_id
    }

    pub fn customer(&self) -> Option<&CustomerSummary> {
        self.customer.as_ref()
    }

    pub fn items(&self) -> &[BillItem] {
        &self.items
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn tax(&self) -> Money {
        self.tax
    }

    pub fn grand_total(&self) -> Money {
        self.grand_total
    }

    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    pub fn status(&self) -> BillStatus {
        self.status
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub(crate) fn mark_placed(
        &mut self,
        id: i32,
        customer_id: i32,
        created_at: DateTime<Utc>,
        items: Vec<BillItem>,
    ) {
        self.id = Some(id);
        self.customer_id = Some(customer_id);
        self.created_at = Some(created_at);
        self.items = items;
    }

    pub(crate) fn restore(parts: BillParts) -> Self {
        Self {
            id: Some(parts.id),
            customer_id: parts.customer_id,
            created_by_user_id: parts.created_by_user_id,
            customer: parts.customer,
            items: parts.items,
            subtotal: parts.subtotal,
            discount: parts.discount,
            tax: parts.tax,
            grand_total: parts.grand_total,
            payment_method: parts.payment_method,
            status: parts.status,
            created_at: Some(parts.created_at),
        }
    }
}
