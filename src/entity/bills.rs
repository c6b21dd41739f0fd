use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::BillStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bills")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub customer_id: Option<i32>,
    /// Added by the second schema version; NULL when unset or on older rows.
    pub created_by_user_id: Option<i32>,
    pub total_amount: i64,
    pub discount_amount: i64,
    pub tax_amount: i64,
    pub final_amount: i64,
    pub payment_method: String,
    pub bill_date: DateTimeWithTimeZone,
    /// Added by the second schema version; NULL reads as COMPLETED.
    pub status: Option<BillStatus>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id"
    )]
    Customers,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedByUserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::bill_items::Entity")]
    BillItems,
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::bill_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BillItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
