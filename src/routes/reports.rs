use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::reports::SalesSummary,
    error::AppResult,
    response::{ApiResponse, Meta},
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/sales", get(sales_summary))
}

#[utoipa::path(
    get,
    path = "/api/reports/sales",
    responses(
        (status = 200, description = "Revenue, highest and lowest bill over completed bills", body = ApiResponse<SalesSummary>)
    ),
    tag = "Reports"
)]
pub async fn sales_summary(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<SalesSummary>>> {
    let summary = report_service::sales_summary(&state).await?;
    Ok(Json(ApiResponse::success("Sales summary", summary, Some(Meta::empty()))))
}
