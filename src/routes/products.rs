use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};

use crate::{
    dto::products::{
        CountData, CreateProductRequest, ProductList, SetStockRequest, UpdateProductRequest,
    },
    error::AppResult,
    models::Product,
    response::{ApiResponse, Meta},
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/count", get(count_products))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/stock", put(set_stock))
        .route("/barcode/{barcode}", get(get_product_by_barcode))
}

#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "List products", body = ApiResponse<ProductList>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let items = catalog_service::list_products(&state.orm).await?;
    let meta = Meta::total(items.len() as i64);
    Ok(Json(ApiResponse::success("Products", ProductList { items }, Some(meta))))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = catalog_service::get_product(&state.orm, id).await?;
    Ok(Json(ApiResponse::success("Product", product, None)))
}

#[utoipa::path(
    get,
    path = "/api/products/barcode/{barcode}",
    params(("barcode" = String, Path, description = "Product barcode")),
    responses(
        (status = 200, description = "Product with this barcode", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product_by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = catalog_service::get_product_by_barcode(&state.orm, &barcode).await?;
    Ok(Json(ApiResponse::success("Product", product, None)))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Create product", body = ApiResponse<Product>),
        (status = 400, description = "Invalid name or price"),
        (status = 409, description = "Duplicate barcode"),
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let product = catalog_service::create_product(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Product created", product, Some(Meta::empty()))),
    ))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}/stock",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = SetStockRequest,
    responses(
        (status = 200, description = "Stock overwritten", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn set_stock(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<SetStockRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = catalog_service::set_stock(&state, id, payload.stock_quantity).await?;
    Ok(Json(ApiResponse::success("Stock updated", product, Some(Meta::empty()))))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<Product>),
        (status = 400, description = "Invalid name or price"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Duplicate barcode"),
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = catalog_service::update_product(&state, id, payload).await?;
    Ok(Json(ApiResponse::success("Updated", product, Some(Meta::empty()))))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Product is referenced by bill lines"),
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    catalog_service::delete_product(&state, id).await?;
    Ok(Json(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/products/count",
    responses(
        (status = 200, description = "Number of products", body = ApiResponse<CountData>),
    ),
    tag = "Products"
)]
pub async fn count_products(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CountData>>> {
    let total = catalog_service::count_products(&state.orm).await?;
    Ok(Json(ApiResponse::success("Products", CountData { total }, None)))
}
