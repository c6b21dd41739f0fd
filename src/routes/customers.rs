use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::{
        bills::BillList,
        customers::{CreateCustomerRequest, CustomerList, UpdateCustomerRequest},
        products::CountData,
    },
    error::AppResult,
    models::Customer,
    response::{ApiResponse, Meta},
    services::{bill_service, party_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/count", get(count_customers))
        .route(
            "/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/{id}/bills", get(list_customer_bills))
}

#[utoipa::path(
    get,
    path = "/api/customers",
    responses(
        (status = 200, description = "List customers", body = ApiResponse<CustomerList>)
    ),
    tag = "Customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CustomerList>>> {
    let items = party_service::list_customers(&state.orm).await?;
    let meta = Meta::total(items.len() as i64);
    Ok(Json(ApiResponse::success("Customers", CustomerList { items }, Some(meta))))
}

#[utoipa::path(
    post,
    path = "/api/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = ApiResponse<Customer>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Username already taken"),
    ),
    tag = "Customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Customer>>)> {
    let customer = party_service::create_customer(&state.orm, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Customer created", customer, None)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(("id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Get customer", body = ApiResponse<Customer>),
        (status = 404, description = "Customer not found"),
    ),
    tag = "Customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let customer = party_service::get_customer(&state.orm, id).await?;
    Ok(Json(ApiResponse::success("Customer", customer, None)))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}/bills",
    params(("id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Bills of a customer, most recent first", body = ApiResponse<BillList>),
    ),
    tag = "Customers"
)]
pub async fn list_customer_bills(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<BillList>>> {
    let items = bill_service::list_bills_by_customer(&state, id).await?;
    let meta = Meta::total(items.len() as i64);
    Ok(Json(ApiResponse::success("Bills", BillList { items }, Some(meta))))
}

#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    params(("id" = i32, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = ApiResponse<Customer>),
        (status = 404, description = "Customer not found"),
        (status = 409, description = "Username taken or walk-in customer"),
    ),
    tag = "Customers"
)]
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let customer = party_service::update_customer(&state.orm, id, payload).await?;
    Ok(Json(ApiResponse::success("Updated", customer, None)))
}

#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    params(("id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer deleted"),
        (status = 404, description = "Customer not found"),
        (status = 409, description = "Customer has bills or is the walk-in customer"),
    ),
    tag = "Customers"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    party_service::delete_customer(&state.orm, id).await?;
    Ok(Json(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/customers/count",
    responses(
        (status = 200, description = "Number of customers", body = ApiResponse<CountData>),
    ),
    tag = "Customers"
)]
pub async fn count_customers(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CountData>>> {
    let total = party_service::count_customers(&state.orm).await?;
    Ok(Json(ApiResponse::success("Customers", CountData { total }, None)))
}
