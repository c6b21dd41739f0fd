use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Money, Product};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub stock_quantity: i32,
    pub category: Option<String>,
    pub barcode: Option<String>,
    pub image_path: Option<String>,
}

/// Partial update; absent fields keep their stored value. An empty barcode
/// or image path clears it.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub stock_quantity: Option<i32>,
    pub category: Option<String>,
    pub barcode: Option<String>,
    pub image_path: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStockRequest {
    pub stock_quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountData {
    pub total: u64,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
