pub mod audit_logs;
pub mod bill_items;
pub mod bills;
pub mod customers;
pub mod products;
pub mod sea_orm_active_enums;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use bill_items::Entity as BillItems;
pub use bills::Entity as Bills;
pub use customers::Entity as Customers;
pub use products::Entity as Products;
pub use users::Entity as Users;
