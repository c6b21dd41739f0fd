use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Bill, Money};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceBillItem {
    pub product_id: i32,
    pub quantity: i32,
}

/// A bill as submitted by the till. Unit prices are taken from the catalog
/// at submission time, never from the client.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceBillRequest {
    /// Omit for the walk-in customer.
    pub customer_id: Option<i32>,
    pub created_by_user_id: Option<i32>,
    pub payment_method: Option<String>,
    pub discount: Option<Money>,
    pub items: Vec<PlaceBillItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BillList {
    pub items: Vec<Bill>,
}
