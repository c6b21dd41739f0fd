use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Money;

/// Rollup over completed bills. Pending bills never contribute.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SalesSummary {
    pub completed_bills: u64,
    pub total_revenue: Money,
    pub highest_bill_amount: Money,
    pub lowest_bill_amount: Money,
}
