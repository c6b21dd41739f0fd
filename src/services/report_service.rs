use sea_orm::{
    ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QuerySelect,
    sea_query::{Alias, Expr, Func, SimpleExpr},
};

use crate::{
    dto::reports::SalesSummary,
    entity::bills::{Column as BillCol, Entity as Bills},
    error::AppResult,
    models::Money,
    services::bill_repository::completed_condition,
    state::AppState,
};

#[derive(Debug, FromQueryResult)]
struct AmountRow {
    amount: Option<i64>,
}

/// Sum of grand totals over completed bills; zero when there are none.
pub async fn total_revenue<C: ConnectionTrait>(db: &C) -> AppResult<Money> {
    // SUM over BIGINT is NUMERIC on Postgres.
    let sum = SimpleExpr::from(Func::cast_as(
        Expr::col(BillCol::FinalAmount).sum(),
        Alias::new("BIGINT"),
    ));
    completed_aggregate(db, sum).await
}

pub async fn highest_bill_amount<C: ConnectionTrait>(db: &C) -> AppResult<Money> {
    completed_aggregate(db, Expr::col(BillCol::FinalAmount).max()).await
}

pub async fn lowest_bill_amount<C: ConnectionTrait>(db: &C) -> AppResult<Money> {
    completed_aggregate(db, Expr::col(BillCol::FinalAmount).min()).await
}

pub async fn sales_summary(state: &AppState) -> AppResult<SalesSummary> {
    let completed_bills = Bills::find()
        .filter(completed_condition())
        .count(&state.orm)
        .await?;

    Ok(SalesSummary {
        completed_bills,
        total_revenue: total_revenue(&state.orm).await?,
        highest_bill_amount: highest_bill_amount(&state.orm).await?,
        lowest_bill_amount: lowest_bill_amount(&state.orm).await?,
    })
}

async fn completed_aggregate<C: ConnectionTrait>(db: &C, expr: SimpleExpr) -> AppResult<Money> {
    let row = Bills::find()
        .select_only()
        .column_as(expr, "amount")
        .filter(completed_condition())
        .into_model::<AmountRow>()
        .one(db)
        .await?;

    Ok(row
        .and_then(|r| r.amount)
        .map(Money::from_cents)
        .unwrap_or(Money::ZERO))
}
