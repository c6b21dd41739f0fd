use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{entity::sea_orm_active_enums::BillStatus, services::bill_repository::BillFilter};

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BillListQuery {
    /// PENDING or COMPLETED
    pub status: Option<BillStatus>,
    pub customer_id: Option<i32>,
}

impl From<BillListQuery> for BillFilter {
    fn from(query: BillListQuery) -> Self {
        BillFilter {
            status: query.status,
            customer_id: query.customer_id,
        }
    }
}
