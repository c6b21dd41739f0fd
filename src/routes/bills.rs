use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::bills::{BillList, PlaceBillRequest},
    error::AppResult,
    models::Bill,
    response::{ApiResponse, Meta},
    routes::params::BillListQuery,
    services::bill_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bills).post(place_bill))
        .route("/{id}", get(get_bill).delete(delete_bill))
        .route("/{id}/confirm", post(confirm_bill))
}

#[utoipa::path(
    get,
    path = "/api/bills",
    params(BillListQuery),
    responses(
        (status = 200, description = "Bills, most recent first", body = ApiResponse<BillList>),
    ),
    tag = "Bills"
)]
pub async fn list_bills(
    State(state): State<AppState>,
    Query(query): Query<BillListQuery>,
) -> AppResult<Json<ApiResponse<BillList>>> {
    let items = bill_service::list_bills_filtered(&state, query.into()).await?;
    let total = items.len() as i64;
    let data = BillList { items };
    Ok(Json(ApiResponse::success("Bills", data, Some(Meta::total(total)))))
}

#[utoipa::path(
    post,
    path = "/api/bills",
    request_body = PlaceBillRequest,
    responses(
        (status = 201, description = "Bill placed as PENDING; stock untouched", body = ApiResponse<Bill>),
        (status = 400, description = "Invalid bill"),
        (status = 409, description = "Constraint violation"),
    ),
    tag = "Bills"
)]
pub async fn place_bill(
    State(state): State<AppState>,
    Json(payload): Json<PlaceBillRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Bill>>)> {
    let mut bill = bill_service::draft_bill(&state, payload).await?;
    bill_service::place(&state, &mut bill).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Bill placed", bill, Some(Meta::empty()))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/bills/{id}",
    params(("id" = i32, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Bill with its items", body = ApiResponse<Bill>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Bills"
)]
pub async fn get_bill(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Bill>>> {
    let bill = bill_service::get_bill(&state, id).await?;
    Ok(Json(ApiResponse::success("Bill", bill, Some(Meta::empty()))))
}

#[utoipa::path(
    post,
    path = "/api/bills/{id}/confirm",
    params(("id" = i32, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Bill completed and stock deducted", body = ApiResponse<Bill>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Bill is not pending or stock is insufficient"),
    ),
    tag = "Bills"
)]
pub async fn confirm_bill(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Bill>>> {
    let bill = bill_service::confirm(&state, id).await?;
    Ok(Json(ApiResponse::success("Bill confirmed", bill, Some(Meta::empty()))))
}

#[utoipa::path(
    delete,
    path = "/api/bills/{id}",
    params(("id" = i32, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Bill and its items deleted"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Bills"
)]
pub async fn delete_bill(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    bill_service::delete(&state, id).await?;
    Ok(Json(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    )))
}
